//! Runtime type descriptors used as registry keys.

use crate::model::object::DataObject;
use std::any::TypeId;
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};

/// Runtime identity of one concrete type.
///
/// Equality and hashing use the `TypeId` only; `name` is for diagnostics.
#[derive(Debug, Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Key of the concrete type behind `value`, even through `dyn DataObject`.
    pub fn of_value<V: DataObject + ?Sized>(value: &V) -> Self {
        Self {
            id: value.as_any().type_id(),
            name: value.object_type_name(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Display for TypeKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name)
    }
}

/// Ordered (transfer, storage) key of one registry entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypePair {
    pub transfer: TypeKey,
    pub storage: TypeKey,
}

impl TypePair {
    pub fn new(transfer: TypeKey, storage: TypeKey) -> Self {
        Self { transfer, storage }
    }

    pub fn of<T: 'static, S: 'static>() -> Self {
        Self::new(TypeKey::of::<T>(), TypeKey::of::<S>())
    }
}

impl Display for TypePair {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} <-> {}", self.transfer, self.storage)
    }
}
