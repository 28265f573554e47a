//! Bidirectional mapping between transfer and storage representations.
//! Converters are registered per type pair and dispatched at runtime.

pub mod config;
pub mod convert;
pub mod error;
pub mod logging;
pub mod mapper;
pub mod model;
pub mod registry;
pub mod validation;

pub use config::{MapperConfig, ValidationPolicy};
pub use convert::{Converter, ConverterRef};
pub use error::{MappingError, MappingResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig, LoggingError};
pub use mapper::{DataMapper, Mapped, MapperHandle};
pub use model::object::{
    AsAny, Capabilities, DataObject, Direction, StorageModel, StorageObject, TransferObject,
};
pub use model::type_key::{TypeKey, TypePair};
pub use registry::discovery::{
    normalize_scope, ConverterCatalog, ConverterDefinition, ConverterDiscovery,
};
pub use registry::{ConverterInfo, ConverterRegistry, ConverterSource, DiscoveryReport};
pub use validation::engine::{ValidationEngine, ValidationReport, Violation};
pub use validation::rule::{RuleKind, RuleTable, ValidationRule};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
