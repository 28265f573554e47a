//! Converter discovery contract and in-process catalog.
//!
//! Discovery only enumerates definitions; the registry instantiates them.

use crate::convert::{Converter, ErasedConverter, TypedConverter};
use crate::error::{MappingError, MappingResult};
use crate::mapper::MapperHandle;
use crate::model::type_key::TypePair;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

static SCOPE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z_][a-z0-9_]*(\.[a-z_][a-z0-9_]*)*$").expect("scope pattern is valid")
});

type Factory = Arc<dyn Fn(MapperHandle) -> Arc<dyn ErasedConverter> + Send + Sync>;

/// Enumerates converter definitions eligible for auto-registration.
pub trait ConverterDiscovery {
    fn discover(&self, scope: &str) -> MappingResult<Vec<ConverterDefinition>>;
}

/// Converter type descriptor plus the factory that builds it.
#[derive(Clone)]
pub struct ConverterDefinition {
    name: &'static str,
    pair: TypePair,
    factory: Factory,
}

impl ConverterDefinition {
    /// Declares converter `C`, built from the owning mapper's handle.
    pub fn new<C, F>(factory: F) -> Self
    where
        C: Converter,
        F: Fn(MapperHandle) -> C + Send + Sync + 'static,
    {
        Self {
            name: std::any::type_name::<C>(),
            pair: TypePair::of::<C::Transfer, C::Storage>(),
            factory: Arc::new(move |handle| TypedConverter::erase(factory(handle))),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn pair(&self) -> TypePair {
        self.pair
    }

    pub(crate) fn instantiate(&self, handle: MapperHandle) -> Arc<dyn ErasedConverter> {
        (self.factory)(handle)
    }
}

impl Debug for ConverterDefinition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConverterDefinition")
            .field("name", &self.name)
            .field("pair", &self.pair)
            .finish()
    }
}

/// Validates and normalizes a dotted scope path such as `app.billing`.
pub fn normalize_scope(scope: &str) -> MappingResult<&str> {
    let trimmed = scope.trim();
    if !SCOPE_PATTERN.is_match(trimmed) {
        return Err(MappingError::InvalidScope(scope.to_string()));
    }
    Ok(trimmed)
}

#[derive(Debug, Clone)]
struct CatalogEntry {
    scope: String,
    definition: ConverterDefinition,
}

/// In-process discovery source: definitions filed under dotted scopes.
///
/// `discover("app")` yields entries filed under `app` and any nested scope
/// such as `app.billing`, but not siblings like `application`.
#[derive(Debug, Clone, Default)]
pub struct ConverterCatalog {
    entries: Vec<CatalogEntry>,
}

impl ConverterCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Files one definition under `scope`.
    pub fn add(&mut self, scope: &str, definition: ConverterDefinition) -> MappingResult<()> {
        let scope = normalize_scope(scope)?.to_string();
        self.entries.push(CatalogEntry { scope, definition });
        Ok(())
    }

    /// Builder form of [`ConverterCatalog::add`].
    pub fn with<C, F>(mut self, scope: &str, factory: F) -> MappingResult<Self>
    where
        C: Converter,
        F: Fn(MapperHandle) -> C + Send + Sync + 'static,
    {
        self.add(scope, ConverterDefinition::new(factory))?;
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ConverterDiscovery for ConverterCatalog {
    fn discover(&self, scope: &str) -> MappingResult<Vec<ConverterDefinition>> {
        let scope = normalize_scope(scope)?;
        Ok(self
            .entries
            .iter()
            .filter(|entry| is_within(&entry.scope, scope))
            .map(|entry| entry.definition.clone())
            .collect())
    }
}

fn is_within(entry_scope: &str, scope: &str) -> bool {
    match entry_scope.strip_prefix(scope) {
        Some(rest) => rest.is_empty() || rest.starts_with('.'),
        None => false,
    }
}
