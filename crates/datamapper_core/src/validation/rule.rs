//! Field-level validation rules and per-type rule tables.

use serde::Serialize;

/// Default message for presence rules.
pub const DEFAULT_NOT_NULL_MESSAGE: &str = "Value should not be null.";
/// Default message for non-empty rules.
pub const DEFAULT_NOT_EMPTY_MESSAGE: &str = "Value should not be empty.";
/// Message used when a non-empty rule sits on a non-text field.
pub const NOT_EMPTY_ON_NON_TEXT_MESSAGE: &str = "not-empty rule can only be used on text fields.";

/// Kind of check a rule performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    /// Field value must be present.
    NotNull,
    /// Text field must be present and non-empty.
    NotEmpty,
}

/// One rule attached to one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationRule {
    pub kind: RuleKind,
    pub message: String,
    /// Abort validation with `InvalidField` on violation.
    pub fail_hard: bool,
    /// Emit a warning event on violation.
    pub log: bool,
}

impl ValidationRule {
    pub fn not_null() -> Self {
        Self {
            kind: RuleKind::NotNull,
            message: DEFAULT_NOT_NULL_MESSAGE.to_string(),
            fail_hard: true,
            log: true,
        }
    }

    pub fn not_empty() -> Self {
        Self {
            kind: RuleKind::NotEmpty,
            message: DEFAULT_NOT_EMPTY_MESSAGE.to_string(),
            fail_hard: true,
            log: true,
        }
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn fail_hard(mut self, fail_hard: bool) -> Self {
        self.fail_hard = fail_hard;
        self
    }

    pub fn log(mut self, log: bool) -> Self {
        self.log = log;
        self
    }

    /// Shorthand for a log-only rule that never aborts.
    pub fn soft(self) -> Self {
        self.fail_hard(false).log(true)
    }
}

/// How the engine reads one field.
pub enum FieldAccessor<T> {
    /// Text field; `None` means absent.
    Text(fn(&T) -> Option<&str>),
    /// Any other field, reduced to a presence check.
    Value(fn(&T) -> bool),
}

impl<T> FieldAccessor<T> {
    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }
}

/// Rules declared on one field.
pub struct FieldRules<T> {
    name: &'static str,
    accessor: FieldAccessor<T>,
    rules: Vec<ValidationRule>,
}

impl<T> FieldRules<T> {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn accessor(&self) -> &FieldAccessor<T> {
        &self.accessor
    }

    pub fn rules(&self) -> &[ValidationRule] {
        &self.rules
    }
}

/// Static rule table published by one transfer type.
///
/// Fields are checked in declaration order.
pub struct RuleTable<T> {
    fields: Vec<FieldRules<T>>,
}

impl<T> RuleTable<T> {
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Declares rules on a text field.
    pub fn text(
        mut self,
        name: &'static str,
        accessor: fn(&T) -> Option<&str>,
        rules: impl IntoIterator<Item = ValidationRule>,
    ) -> Self {
        self.fields.push(FieldRules {
            name,
            accessor: FieldAccessor::Text(accessor),
            rules: rules.into_iter().collect(),
        });
        self
    }

    /// Declares rules on a non-text field. `is_present` reports whether the
    /// field currently holds a value.
    pub fn value(
        mut self,
        name: &'static str,
        is_present: fn(&T) -> bool,
        rules: impl IntoIterator<Item = ValidationRule>,
    ) -> Self {
        self.fields.push(FieldRules {
            name,
            accessor: FieldAccessor::Value(is_present),
            rules: rules.into_iter().collect(),
        });
        self
    }

    pub fn fields(&self) -> &[FieldRules<T>] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<T> Default for RuleTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{RuleKind, RuleTable, ValidationRule, DEFAULT_NOT_NULL_MESSAGE};

    struct Form {
        title: Option<String>,
        count: Option<u32>,
    }

    #[test]
    fn rule_defaults_fail_hard_and_log() {
        let rule = ValidationRule::not_null();
        assert_eq!(rule.kind, RuleKind::NotNull);
        assert_eq!(rule.message, DEFAULT_NOT_NULL_MESSAGE);
        assert!(rule.fail_hard);
        assert!(rule.log);

        let soft = ValidationRule::not_empty().message("title required").soft();
        assert!(!soft.fail_hard);
        assert!(soft.log);
        assert_eq!(soft.message, "title required");
    }

    #[test]
    fn table_keeps_declaration_order() {
        let table = RuleTable::<Form>::new()
            .text("title", |form| form.title.as_deref(), [ValidationRule::not_empty()])
            .value("count", |form| form.count.is_some(), [ValidationRule::not_null()]);

        let names: Vec<_> = table.fields().iter().map(|field| field.name()).collect();
        assert_eq!(names, vec!["title", "count"]);
        assert!(table.fields()[0].accessor().is_text());
        assert!(!table.fields()[1].accessor().is_text());
        assert_eq!(table.len(), 2);
    }
}
