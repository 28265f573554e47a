//! Dispatch engine: the public mapping API.
//!
//! # Responsibility
//! - Infer conversion direction from the source value's capabilities.
//! - Resolve the converter through the registry and invoke it.
//! - Gate transfer-to-storage conversions on validation per `MapperConfig`.
//!
//! # Invariants
//! - Absent input yields absent output without touching the registry.
//! - Typed results are produced by one checked downcast, justified by an
//!   exact type-pair match; a mismatch is reported, never assumed away.
//! - The registry lock is released before any converter runs, so converters
//!   may delegate nested conversions through their `MapperHandle`.
//! - Bulk operations fail as a unit on the first failing element.

use crate::config::MapperConfig;
use crate::convert::{Converter, ConverterRef, ObjectRef};
use crate::error::{MappingError, MappingResult};
use crate::model::object::{DataObject, Direction};
use crate::model::type_key::{TypeKey, TypePair};
use crate::registry::discovery::ConverterDiscovery;
use crate::registry::{ConverterInfo, ConverterRegistry, DiscoveryReport};
use crate::validation::engine::ValidationEngine;
use log::debug;
use std::collections::HashSet;
use std::hash::Hash;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

struct MapperShared {
    config: MapperConfig,
    registry: RwLock<ConverterRegistry>,
}

/// Converted value tagged with the side it belongs to.
#[derive(Debug)]
pub enum Mapped {
    Storage(Box<dyn DataObject>),
    Transfer(Box<dyn DataObject>),
}

impl Mapped {
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_))
    }

    pub fn is_transfer(&self) -> bool {
        matches!(self, Self::Transfer(_))
    }

    /// Concrete type name of the converted value.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Storage(value) | Self::Transfer(value) => (**value).object_type_name(),
        }
    }

    pub fn into_inner(self) -> Box<dyn DataObject> {
        match self {
            Self::Storage(value) | Self::Transfer(value) => value,
        }
    }

    /// Takes the converted value as `T`.
    ///
    /// # Errors
    /// - `TypeMismatch` when the value is not a `T`.
    pub fn downcast<T: DataObject>(self) -> MappingResult<T> {
        let actual = self.type_name();
        self.into_inner()
            .into_any()
            .downcast::<T>()
            .map(|value| *value)
            .map_err(|_| MappingError::TypeMismatch {
                expected: std::any::type_name::<T>(),
                actual,
            })
    }
}

/// Weak back-reference to a `DataMapper`, handed to converter factories.
#[derive(Debug, Clone)]
pub struct MapperHandle {
    shared: Weak<MapperShared>,
}

impl MapperHandle {
    /// Handle bound to no mapper; every use fails with `EngineUnavailable`.
    pub fn detached() -> Self {
        Self {
            shared: Weak::new(),
        }
    }

    /// Upgrades to the owning mapper.
    ///
    /// # Errors
    /// - `EngineUnavailable` once the mapper has been dropped.
    pub fn mapper(&self) -> MappingResult<DataMapper> {
        self.shared
            .upgrade()
            .map(|shared| DataMapper { shared })
            .ok_or(MappingError::EngineUnavailable)
    }
}

/// Registry-backed mapper between transfer and storage representations.
///
/// Cloning is cheap; clones share one registry.
#[derive(Clone)]
pub struct DataMapper {
    shared: Arc<MapperShared>,
}

impl Default for DataMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl DataMapper {
    pub fn new() -> Self {
        Self::with_config(MapperConfig::default())
    }

    pub fn with_config(config: MapperConfig) -> Self {
        Self {
            shared: Arc::new(MapperShared {
                config,
                registry: RwLock::new(ConverterRegistry::new()),
            }),
        }
    }

    pub fn config(&self) -> &MapperConfig {
        &self.shared.config
    }

    pub fn handle(&self) -> MapperHandle {
        MapperHandle {
            shared: Arc::downgrade(&self.shared),
        }
    }

    /// Builds a converter from this mapper's handle and registers it.
    ///
    /// # Errors
    /// - `DuplicateConverter` when the pair is already registered.
    pub fn register<C, F>(&self, factory: F) -> MappingResult<()>
    where
        C: Converter,
        F: FnOnce(MapperHandle) -> C,
    {
        let converter = factory(self.handle());
        self.write_registry().register(converter)
    }

    /// Registers a converter, replacing any existing one for its pair.
    pub fn register_override<C, F>(&self, factory: F) -> Option<&'static str>
    where
        C: Converter,
        F: FnOnce(MapperHandle) -> C,
    {
        let converter = factory(self.handle());
        self.write_registry().register_override(converter)
    }

    /// Registers every converter `discovery` finds under `scope`, skipping
    /// pairs that are already registered.
    pub fn register_from_discovery(
        &self,
        scope: &str,
        discovery: &dyn ConverterDiscovery,
    ) -> MappingResult<DiscoveryReport> {
        let definitions = discovery.discover(scope)?;
        let handle = self.handle();
        self.write_registry()
            .register_discovered(scope.trim(), definitions, &handle)
    }

    pub fn converter_count(&self) -> usize {
        self.read_registry().len()
    }

    pub fn registry_snapshot(&self) -> Vec<ConverterInfo> {
        self.read_registry().snapshot()
    }

    /// Exact pair lookup.
    pub fn resolve<T: 'static, S: 'static>(&self) -> Option<ConverterRef> {
        self.read_registry().resolve(TypePair::of::<T, S>())
    }

    /// Converts `value` to its counterpart, inferring the target from the
    /// registry.
    ///
    /// # Errors
    /// - `UnsupportedInput` / `AmbiguousInputType` for undeclared or dual
    ///   capabilities.
    /// - `NoConverterFound` naming the source type.
    /// - `InvalidField` / `ValidationFailed` from the validation gate.
    pub fn map(&self, value: Option<&(impl DataObject + ?Sized)>) -> MappingResult<Option<Mapped>> {
        let Some(value) = value else {
            return Ok(None);
        };
        let source = TypeKey::of_value(value);
        let object = object_ref(value, source);

        match value.capabilities().direction(source.name())? {
            Direction::ToStorage => {
                let converter = self
                    .read_registry()
                    .resolve_by_transfer(source)
                    .ok_or_else(|| no_converter(source, None))?;
                self.convert_to_storage(&converter, object)
                    .map(|value| Some(Mapped::Storage(value)))
            }
            Direction::ToTransfer => {
                let converter = self
                    .read_registry()
                    .resolve_by_storage(source)
                    .ok_or_else(|| no_converter(source, None))?;
                self.convert_to_transfer(&converter, object)
                    .map(|value| Some(Mapped::Transfer(value)))
            }
        }
    }

    /// Converts `value` into `T` using the converter registered for the exact
    /// (source, `T`) pair.
    ///
    /// # Errors
    /// Same as [`DataMapper::map`]; `NoConverterFound` names both types.
    pub fn map_to<T: DataObject>(
        &self,
        value: Option<&(impl DataObject + ?Sized)>,
    ) -> MappingResult<Option<T>> {
        value.map(|value| self.convert_one(value)).transpose()
    }

    /// Maps every element of `values` into `T`, preserving order.
    ///
    /// # Errors
    /// - `BatchElement` wrapping the first failing element; no partial output.
    pub fn map_all<T: DataObject>(
        &self,
        values: Option<&[impl DataObject]>,
    ) -> MappingResult<Option<Vec<T>>> {
        self.map_iter::<T, Vec<T>>(values.map(|values| values.iter()))
    }

    /// Maps every element of a set into a set of `T`.
    pub fn map_all_set<T: DataObject + Eq + Hash>(
        &self,
        values: Option<&HashSet<impl DataObject>>,
    ) -> MappingResult<Option<HashSet<T>>> {
        self.map_iter::<T, HashSet<T>>(values.map(|values| values.iter()))
    }

    /// Maps any iterable of data objects into container `C`.
    ///
    /// Accepts heterogeneous input as `&dyn DataObject` items.
    pub fn map_iter<'a, T, C>(
        &self,
        values: Option<impl IntoIterator<Item = &'a (impl DataObject + ?Sized + 'a)>>,
    ) -> MappingResult<Option<C>>
    where
        T: DataObject,
        C: FromIterator<T>,
    {
        let Some(values) = values else {
            return Ok(None);
        };
        values
            .into_iter()
            .enumerate()
            .map(|(index, value)| {
                self.convert_one::<T>(value)
                    .map_err(|source| MappingError::BatchElement {
                        index,
                        source: Box::new(source),
                    })
            })
            .collect::<MappingResult<C>>()
            .map(Some)
    }

    fn convert_one<T: DataObject>(&self, value: &(impl DataObject + ?Sized)) -> MappingResult<T> {
        let source = TypeKey::of_value(value);
        let target = TypeKey::of::<T>();
        let object = object_ref(value, source);

        let converted = match value.capabilities().direction(source.name())? {
            Direction::ToStorage => {
                let converter = self
                    .read_registry()
                    .resolve(TypePair::new(source, target))
                    .ok_or_else(|| no_converter(source, Some(target)))?;
                self.convert_to_storage(&converter, object)?
            }
            Direction::ToTransfer => {
                let converter = self
                    .read_registry()
                    .resolve(TypePair::new(target, source))
                    .ok_or_else(|| no_converter(source, Some(target)))?;
                self.convert_to_transfer(&converter, object)?
            }
        };

        let actual = (*converted).object_type_name();
        converted
            .into_any()
            .downcast::<T>()
            .map(|value| *value)
            .map_err(|_| MappingError::TypeMismatch {
                expected: target.name(),
                actual,
            })
    }

    fn convert_to_storage(
        &self,
        converter: &ConverterRef,
        object: ObjectRef<'_>,
    ) -> MappingResult<Box<dyn DataObject>> {
        let config = &self.shared.config;
        let valid = converter.inner.check_transfer(
            object,
            ValidationEngine::shared(),
            config.validation,
        )?;
        if !valid && config.reject_invalid {
            return Err(MappingError::ValidationFailed(object.type_name));
        }
        debug!(
            "event=map module=mapper status=ok direction=to_storage converter={} source={}",
            converter.name(),
            object.type_name
        );
        converter.inner.to_storage(object)
    }

    fn convert_to_transfer(
        &self,
        converter: &ConverterRef,
        object: ObjectRef<'_>,
    ) -> MappingResult<Box<dyn DataObject>> {
        debug!(
            "event=map module=mapper status=ok direction=to_transfer converter={} source={}",
            converter.name(),
            object.type_name
        );
        converter.inner.to_transfer(object)
    }

    fn read_registry(&self) -> RwLockReadGuard<'_, ConverterRegistry> {
        self.shared
            .registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write_registry(&self) -> RwLockWriteGuard<'_, ConverterRegistry> {
        self.shared
            .registry
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

fn object_ref<V: DataObject + ?Sized>(value: &V, key: TypeKey) -> ObjectRef<'_> {
    ObjectRef {
        value: value.as_any(),
        type_name: key.name(),
    }
}

fn no_converter(source: TypeKey, target: Option<TypeKey>) -> MappingError {
    MappingError::NoConverterFound {
        source_type: source.name(),
        target_type: target.map(|target| target.name()),
    }
}
