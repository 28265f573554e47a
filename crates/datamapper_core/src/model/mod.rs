//! Data object contracts shared by both representation families.
//!
//! # Responsibility
//! - Define how a value declares whether it is a transfer or storage object.
//! - Provide runtime type descriptors used as registry keys.
//!
//! # Invariants
//! - Registry keys compare by exact `TypeId`, never by name.
//! - The core only reads data objects; it never mutates caller values.

pub mod object;
pub mod type_key;
