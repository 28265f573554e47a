//! Transfer/storage object traits.

use crate::error::{MappingError, MappingResult};
use crate::validation::engine::ValidationEngine;
use crate::validation::rule::RuleTable;
use serde::Serialize;
use std::any::Any;
use std::fmt::Debug;
use uuid::Uuid;

/// Runtime type identity for any `'static` value.
///
/// Blanket-implemented; data objects never implement this by hand.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
    fn object_type_name(&self) -> &'static str;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }

    fn object_type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// Representation families a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Capabilities {
    pub transfer: bool,
    pub storage: bool,
}

impl Capabilities {
    pub const NONE: Self = Self {
        transfer: false,
        storage: false,
    };
    pub const TRANSFER: Self = Self {
        transfer: true,
        storage: false,
    };
    pub const STORAGE: Self = Self {
        transfer: false,
        storage: true,
    };
    pub const BOTH: Self = Self {
        transfer: true,
        storage: true,
    };

    /// Resolves the conversion direction for a value with these capabilities.
    ///
    /// # Errors
    /// - `UnsupportedInput` when neither family is declared.
    /// - `AmbiguousInputType` when both are declared.
    pub fn direction(self, type_name: &'static str) -> MappingResult<Direction> {
        match (self.transfer, self.storage) {
            (true, false) => Ok(Direction::ToStorage),
            (false, true) => Ok(Direction::ToTransfer),
            (false, false) => Err(MappingError::UnsupportedInput(type_name)),
            (true, true) => Err(MappingError::AmbiguousInputType(type_name)),
        }
    }
}

/// Conversion direction inferred from the source value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Transfer value in, storage value out.
    ToStorage,
    /// Storage value in, transfer value out.
    ToTransfer,
}

/// Object-safe base contract for every convertible value.
pub trait DataObject: AsAny + Debug + Send + Sync {
    /// Declared representation families.
    fn capabilities(&self) -> Capabilities;
}

/// External-facing representation, subject to field validation.
pub trait TransferObject: DataObject + Sized {
    /// Field-level rules for this type. Built once per process and memoized.
    fn rule_table() -> RuleTable<Self> {
        RuleTable::new()
    }

    /// Marks types that the mapper validates before storage conversion.
    fn requires_validation() -> bool {
        false
    }

    /// Runs this type's rule table against `self`.
    fn validate(&self) -> MappingResult<bool> {
        ValidationEngine::shared().validate(self)
    }
}

/// Persistence-facing representation. Carries no validation metadata.
pub trait StorageObject: DataObject + Sized {}

/// Storage record with a stable identity.
pub trait StorageModel: StorageObject {
    fn id(&self) -> Uuid;

    fn set_id(&mut self, id: Uuid);

    /// Assigns a fresh random identity and returns it.
    fn assign_new_id(&mut self) -> Uuid {
        let id = Uuid::new_v4();
        self.set_id(id);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::{Capabilities, DataObject, Direction, StorageModel, StorageObject};
    use crate::error::MappingError;
    use uuid::Uuid;

    #[derive(Debug)]
    struct Record {
        id: Uuid,
    }

    impl DataObject for Record {
        fn capabilities(&self) -> Capabilities {
            Capabilities::STORAGE
        }
    }

    impl StorageObject for Record {}

    impl StorageModel for Record {
        fn id(&self) -> Uuid {
            self.id
        }

        fn set_id(&mut self, id: Uuid) {
            self.id = id;
        }
    }

    #[test]
    fn direction_follows_declared_capabilities() {
        assert_eq!(
            Capabilities::TRANSFER.direction("A").expect("transfer"),
            Direction::ToStorage
        );
        assert_eq!(
            Capabilities::STORAGE.direction("A").expect("storage"),
            Direction::ToTransfer
        );
        assert_eq!(
            Capabilities::NONE.direction("A").unwrap_err(),
            MappingError::UnsupportedInput("A")
        );
        assert_eq!(
            Capabilities::BOTH.direction("A").unwrap_err(),
            MappingError::AmbiguousInputType("A")
        );
    }

    #[test]
    fn trait_object_reports_concrete_type() {
        let record = Record { id: Uuid::nil() };
        let object: &dyn DataObject = &record;
        assert!(object.as_any().downcast_ref::<Record>().is_some());
        assert!(object.object_type_name().ends_with("Record"));
    }

    #[test]
    fn assign_new_id_replaces_identity() {
        let mut record = Record { id: Uuid::nil() };
        let id = record.assign_new_id();
        assert!(!id.is_nil());
        assert_eq!(record.id(), id);
    }
}
