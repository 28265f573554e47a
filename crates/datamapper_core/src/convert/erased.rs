use crate::config::ValidationPolicy;
use crate::convert::Converter;
use crate::error::{MappingError, MappingResult};
use crate::model::object::{DataObject, TransferObject};
use crate::model::type_key::TypePair;
use crate::validation::engine::ValidationEngine;
use std::any::Any;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// Borrowed source value with its runtime type name.
#[derive(Clone, Copy)]
pub(crate) struct ObjectRef<'a> {
    pub(crate) value: &'a dyn Any,
    pub(crate) type_name: &'static str,
}

impl<'a> ObjectRef<'a> {
    pub(crate) fn downcast<T: 'static>(self) -> MappingResult<&'a T> {
        self.value
            .downcast_ref::<T>()
            .ok_or(MappingError::TypeMismatch {
                expected: std::any::type_name::<T>(),
                actual: self.type_name,
            })
    }
}

pub(crate) trait ErasedConverter: Send + Sync {
    fn name(&self) -> &'static str;
    fn pair(&self) -> TypePair;
    fn to_storage(&self, value: ObjectRef<'_>) -> MappingResult<Box<dyn DataObject>>;
    fn to_transfer(&self, value: ObjectRef<'_>) -> MappingResult<Box<dyn DataObject>>;
    /// Runs transfer-side validation when `policy` asks for it. Skipped checks
    /// count as passing.
    fn check_transfer(
        &self,
        value: ObjectRef<'_>,
        engine: &ValidationEngine,
        policy: ValidationPolicy,
    ) -> MappingResult<bool>;
}

pub(crate) struct TypedConverter<C: Converter> {
    inner: C,
}

impl<C: Converter> TypedConverter<C> {
    pub(crate) fn erase(inner: C) -> Arc<dyn ErasedConverter> {
        Arc::new(Self { inner })
    }
}

impl<C: Converter> ErasedConverter for TypedConverter<C> {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn pair(&self) -> TypePair {
        TypePair::of::<C::Transfer, C::Storage>()
    }

    fn to_storage(&self, value: ObjectRef<'_>) -> MappingResult<Box<dyn DataObject>> {
        let transfer = value.downcast::<C::Transfer>()?;
        Ok(Box::new(self.inner.to_storage(transfer)?))
    }

    fn to_transfer(&self, value: ObjectRef<'_>) -> MappingResult<Box<dyn DataObject>> {
        let storage = value.downcast::<C::Storage>()?;
        Ok(Box::new(self.inner.to_transfer(storage)?))
    }

    fn check_transfer(
        &self,
        value: ObjectRef<'_>,
        engine: &ValidationEngine,
        policy: ValidationPolicy,
    ) -> MappingResult<bool> {
        let required = match policy {
            ValidationPolicy::Never => false,
            ValidationPolicy::Declared => <C::Transfer as TransferObject>::requires_validation(),
            ValidationPolicy::Always => true,
        };
        if !required {
            return Ok(true);
        }
        engine.validate(value.downcast::<C::Transfer>()?)
    }
}

/// Shared handle to one registered converter.
#[derive(Clone)]
pub struct ConverterRef {
    pub(crate) inner: Arc<dyn ErasedConverter>,
}

impl ConverterRef {
    pub fn name(&self) -> &'static str {
        self.inner.name()
    }

    pub fn pair(&self) -> TypePair {
        self.inner.pair()
    }
}

impl Debug for ConverterRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConverterRef")
            .field("name", &self.name())
            .field("pair", &self.pair())
            .finish()
    }
}
