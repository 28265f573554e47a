//! Converter contract.
//!
//! # Responsibility
//! - Define the two-way contract between one transfer and one storage type.
//! - Erase converter types so the registry can hold them side by side.
//!
//! # Invariants
//! - A converter's declared pair is fixed by its associated types.
//! - Erased calls downcast exactly once, to the declared type, and report a
//!   mismatch instead of panicking.

mod erased;

use crate::error::MappingResult;
use crate::model::object::{StorageObject, TransferObject};

pub(crate) use erased::{ErasedConverter, ObjectRef, TypedConverter};
pub use erased::ConverterRef;

/// Bidirectional conversion for exactly one (transfer, storage) pair.
///
/// Converters that need nested conversions keep the `MapperHandle` their
/// factory receives and delegate through it.
pub trait Converter: Send + Sync + 'static {
    type Transfer: TransferObject;
    type Storage: StorageObject;

    fn to_storage(&self, transfer: &Self::Transfer) -> MappingResult<Self::Storage>;

    fn to_transfer(&self, storage: &Self::Storage) -> MappingResult<Self::Transfer>;

    /// Name used in logs and registry snapshots.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
