//! Converter registry.
//!
//! # Responsibility
//! - Hold registered converters in registration order, keyed by type pair.
//! - Resolve converters by full pair or by one side of the pair.
//! - Merge discovered converters without displacing manual registrations.
//!
//! # Invariants
//! - At most one entry exists per (transfer, storage) pair.
//! - `register` rejects duplicates; only `register_override` replaces.
//! - A discovery batch is inserted entirely or not at all.

pub mod discovery;

use crate::convert::{Converter, ConverterRef, ErasedConverter, TypedConverter};
use crate::error::{MappingError, MappingResult};
use crate::mapper::MapperHandle;
use crate::model::type_key::{TypeKey, TypePair};
use discovery::ConverterDefinition;
use log::{info, warn};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// How an entry got into the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConverterSource {
    Manual,
    Override,
    Discovered,
}

impl ConverterSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Override => "override",
            Self::Discovered => "discovered",
        }
    }
}

/// Diagnostic row describing one registry entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConverterInfo {
    pub converter: &'static str,
    pub transfer_type: &'static str,
    pub storage_type: &'static str,
    pub source: ConverterSource,
}

/// Result of one discovery registration pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoveryReport {
    pub scope: String,
    pub registered: Vec<&'static str>,
    /// Definitions whose pair was already registered.
    pub skipped: Vec<&'static str>,
}

struct RegistryEntry {
    converter: Arc<dyn ErasedConverter>,
    source: ConverterSource,
}

/// Ordered converter collection with a pair index.
#[derive(Default)]
pub struct ConverterRegistry {
    entries: Vec<RegistryEntry>,
    index: HashMap<TypePair, usize>,
}

impl ConverterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one converter.
    ///
    /// # Errors
    /// - `DuplicateConverter` when the pair is already registered.
    pub fn register<C: Converter>(&mut self, converter: C) -> MappingResult<()> {
        let converter = TypedConverter::erase(converter);
        let pair = converter.pair();
        if self.index.contains_key(&pair) {
            return Err(duplicate(pair));
        }
        self.push(converter, ConverterSource::Manual);
        Ok(())
    }

    /// Registers `converter`, replacing any entry for the same pair in place.
    ///
    /// Returns the name of the replaced converter, if any.
    pub fn register_override<C: Converter>(&mut self, converter: C) -> Option<&'static str> {
        let converter = TypedConverter::erase(converter);
        let pair = converter.pair();
        let Some(position) = self.index.get(&pair).copied() else {
            self.push(converter, ConverterSource::Override);
            return None;
        };

        let name = converter.name();
        let previous = std::mem::replace(
            &mut self.entries[position],
            RegistryEntry {
                converter,
                source: ConverterSource::Override,
            },
        );
        info!(
            "event=converter_override module=registry status=ok converter={} replaced={} pair={}",
            name,
            previous.converter.name(),
            pair
        );
        Some(previous.converter.name())
    }

    /// Instantiates and registers discovered definitions.
    ///
    /// Definitions whose pair is already registered are skipped, so manual
    /// registrations made before discovery always win. Factories run while
    /// the caller holds the registry; they must not dispatch through `handle`.
    ///
    /// # Errors
    /// - `DuplicateConverter` when the batch itself holds two definitions for
    ///   one pair. Nothing is registered in that case.
    pub fn register_discovered(
        &mut self,
        scope: &str,
        definitions: Vec<ConverterDefinition>,
        handle: &MapperHandle,
    ) -> MappingResult<DiscoveryReport> {
        let mut pending = Vec::with_capacity(definitions.len());
        let mut skipped = Vec::new();
        let mut seen = HashSet::new();
        for definition in definitions {
            let pair = definition.pair();
            if self.index.contains_key(&pair) {
                skipped.push(definition.name());
                continue;
            }
            if !seen.insert(pair) {
                return Err(duplicate(pair));
            }
            pending.push(definition);
        }

        let mut registered = Vec::with_capacity(pending.len());
        for definition in pending {
            let converter = definition.instantiate(handle.clone());
            registered.push(definition.name());
            self.push(converter, ConverterSource::Discovered);
        }

        info!(
            "event=converter_discovery module=registry status=ok scope={} registered={} skipped={}",
            scope,
            registered.len(),
            skipped.len()
        );
        Ok(DiscoveryReport {
            scope: scope.to_string(),
            registered,
            skipped,
        })
    }

    /// Exact pair lookup.
    pub fn resolve(&self, pair: TypePair) -> Option<ConverterRef> {
        let position = *self.index.get(&pair)?;
        Some(ConverterRef {
            inner: self.entries[position].converter.clone(),
        })
    }

    /// First converter, in registration order, whose transfer type is `transfer`.
    pub fn resolve_by_transfer(&self, transfer: TypeKey) -> Option<ConverterRef> {
        self.resolve_one_side(transfer, "transfer", |pair| pair.transfer)
    }

    /// First converter, in registration order, whose storage type is `storage`.
    pub fn resolve_by_storage(&self, storage: TypeKey) -> Option<ConverterRef> {
        self.resolve_one_side(storage, "storage", |pair| pair.storage)
    }

    pub fn contains(&self, pair: TypePair) -> bool {
        self.index.contains_key(&pair)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in registration order.
    pub fn snapshot(&self) -> Vec<ConverterInfo> {
        self.entries
            .iter()
            .map(|entry| {
                let pair = entry.converter.pair();
                ConverterInfo {
                    converter: entry.converter.name(),
                    transfer_type: pair.transfer.name(),
                    storage_type: pair.storage.name(),
                    source: entry.source,
                }
            })
            .collect()
    }

    fn resolve_one_side(
        &self,
        key: TypeKey,
        side: &'static str,
        select: fn(&TypePair) -> TypeKey,
    ) -> Option<ConverterRef> {
        let mut matches = self
            .entries
            .iter()
            .filter(|entry| select(&entry.converter.pair()) == key);
        let first = matches.next()?;
        let others = matches.count();
        if others > 0 {
            warn!(
                "event=converter_lookup module=registry status=ambiguous side={} type={} candidates={} selected={}",
                side,
                key,
                others + 1,
                first.converter.name()
            );
        }
        Some(ConverterRef {
            inner: first.converter.clone(),
        })
    }

    fn push(&mut self, converter: Arc<dyn ErasedConverter>, source: ConverterSource) {
        let pair = converter.pair();
        if source != ConverterSource::Discovered {
            info!(
                "event=converter_register module=registry status=ok source={} converter={} pair={}",
                source.as_str(),
                converter.name(),
                pair
            );
        }
        self.index.insert(pair, self.entries.len());
        self.entries.push(RegistryEntry { converter, source });
    }
}

fn duplicate(pair: TypePair) -> MappingError {
    MappingError::DuplicateConverter {
        transfer_type: pair.transfer.name(),
        storage_type: pair.storage.name(),
    }
}
