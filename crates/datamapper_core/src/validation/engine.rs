//! Validation engine over memoized rule tables.

use crate::error::{MappingError, MappingResult};
use crate::model::object::TransferObject;
use crate::validation::rule::{
    FieldAccessor, FieldRules, RuleKind, RuleTable, ValidationRule, NOT_EMPTY_ON_NON_TEXT_MESSAGE,
};
use log::warn;
use once_cell::sync::Lazy;
use serde::Serialize;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

static SHARED_ENGINE: Lazy<ValidationEngine> = Lazy::new(ValidationEngine::new);

type CachedTable = Arc<dyn Any + Send + Sync>;

/// One soft (non-aborting) rule violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub field: &'static str,
    pub kind: RuleKind,
    pub message: String,
    /// Rule is misconfigured for its field rather than violated by the value.
    pub configuration: bool,
}

/// Outcome of validating one transfer value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub type_name: &'static str,
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Evaluates rule tables against transfer values.
///
/// # Invariants
/// - Each type's table is built at most once per engine.
/// - The first fail-hard violation aborts the whole call.
#[derive(Default)]
pub struct ValidationEngine {
    tables: RwLock<HashMap<TypeId, CachedTable>>,
}

impl ValidationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide engine used by `TransferObject::validate` and the mapper.
    pub fn shared() -> &'static ValidationEngine {
        &SHARED_ENGINE
    }

    /// Returns `true` only when every rule on every field passes.
    ///
    /// # Errors
    /// - `InvalidField` for the first violated rule with `fail_hard` set.
    pub fn validate<T: TransferObject>(&self, value: &T) -> MappingResult<bool> {
        self.inspect(value).map(|report| report.is_valid())
    }

    /// Validates `value` and lists every soft violation.
    pub fn inspect<T: TransferObject>(&self, value: &T) -> MappingResult<ValidationReport> {
        let table = self.table_for::<T>();
        let type_name = std::any::type_name::<T>();
        let mut violations = Vec::new();

        for field in table.fields() {
            for rule in field.rules() {
                let Some(violation) = check_rule(field, rule, value) else {
                    continue;
                };
                if rule.fail_hard {
                    return Err(MappingError::InvalidField {
                        field: field.name().to_string(),
                        message: violation.message,
                    });
                }
                if rule.log {
                    warn!(
                        "event=validation_violation module=validation status=soft_fail type={} field={} configuration={} message={}",
                        type_name, violation.field, violation.configuration, violation.message
                    );
                }
                violations.push(violation);
            }
        }

        Ok(ValidationReport {
            type_name,
            violations,
        })
    }

    /// Number of memoized rule tables.
    pub fn cached_tables(&self) -> usize {
        self.tables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn table_for<T: TransferObject>(&self) -> Arc<RuleTable<T>> {
        let key = TypeId::of::<T>();
        let cached = self
            .tables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned();
        if let Some(table) = cached.and_then(|table| table.downcast::<RuleTable<T>>().ok()) {
            return table;
        }

        let built = Arc::new(T::rule_table());
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        let entry = tables
            .entry(key)
            .or_insert_with(|| built.clone() as CachedTable)
            .clone();
        entry.downcast::<RuleTable<T>>().unwrap_or(built)
    }
}

fn check_rule<T>(field: &FieldRules<T>, rule: &ValidationRule, value: &T) -> Option<Violation> {
    let violation = |message: &str, configuration: bool| Violation {
        field: field.name(),
        kind: rule.kind,
        message: message.to_string(),
        configuration,
    };

    match (rule.kind, field.accessor()) {
        (RuleKind::NotNull, FieldAccessor::Text(read)) => {
            read(value).is_none().then(|| violation(&rule.message, false))
        }
        (RuleKind::NotNull, FieldAccessor::Value(is_present)) => {
            (!is_present(value)).then(|| violation(&rule.message, false))
        }
        (RuleKind::NotEmpty, FieldAccessor::Text(read)) => read(value)
            .map_or(true, str::is_empty)
            .then(|| violation(&rule.message, false)),
        // Misplaced rule; reported regardless of the field's value.
        (RuleKind::NotEmpty, FieldAccessor::Value(_)) => {
            Some(violation(NOT_EMPTY_ON_NON_TEXT_MESSAGE, true))
        }
    }
}
