//! Single-field predicates used by remap rules.

use std::fmt;

use tessera_common::{Result, error::Error};
use tessera_shard::{FieldType, TermRef};

/// How a condition compares a document's value with its operand.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ConditionKind {
    /// The value equals the operand.
    Equality,
    /// The value is greater than or equal to the operand: numerically for
    /// integer fields, bytewise lexicographically for string fields.
    Inequality,
}

/// The typed right-hand side of a condition.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Operand {
    Int(i64),
    Str(String),
}

impl Operand {
    pub fn field_type(&self) -> FieldType {
        match self {
            Operand::Int(_) => FieldType::Int,
            Operand::Str(_) => FieldType::Str,
        }
    }
}

/// A predicate over one field's value.
///
/// Conditions are plain immutable values; evaluating one has no side effects.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RegroupCondition {
    field: String,
    kind: ConditionKind,
    operand: Operand,
}

impl RegroupCondition {
    pub fn new(field: impl Into<String>, kind: ConditionKind, operand: Operand) -> Self {
        RegroupCondition {
            field: field.into(),
            kind,
            operand,
        }
    }

    pub fn int_equality(field: impl Into<String>, term: i64) -> Self {
        Self::new(field, ConditionKind::Equality, Operand::Int(term))
    }

    pub fn int_inequality(field: impl Into<String>, term: i64) -> Self {
        Self::new(field, ConditionKind::Inequality, Operand::Int(term))
    }

    pub fn str_equality(field: impl Into<String>, term: impl Into<String>) -> Self {
        Self::new(field, ConditionKind::Equality, Operand::Str(term.into()))
    }

    pub fn str_inequality(field: impl Into<String>, term: impl Into<String>) -> Self {
        Self::new(field, ConditionKind::Inequality, Operand::Str(term.into()))
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn kind(&self) -> ConditionKind {
        self.kind
    }

    pub fn operand(&self) -> &Operand {
        &self.operand
    }

    /// Type of field this condition is meant to be evaluated against.
    pub fn field_type(&self) -> FieldType {
        self.operand.field_type()
    }

    /// Evaluates the condition against one document's field value.
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` if `value` does not have the condition's type
    /// (an integer condition against a string field or vice versa).
    pub fn matches(&self, value: TermRef) -> Result<bool> {
        match (&self.operand, value) {
            (Operand::Int(operand), TermRef::Int(value)) => Ok(match self.kind {
                ConditionKind::Equality => value == *operand,
                ConditionKind::Inequality => value >= *operand,
            }),
            (Operand::Str(operand), TermRef::Str(value)) => Ok(match self.kind {
                ConditionKind::Equality => value == operand.as_str(),
                ConditionKind::Inequality => value >= operand.as_str(),
            }),
            (operand, value) => Err(Error::type_mismatch(
                &self.field,
                operand.field_type().name(),
                value.field_type().name(),
            )),
        }
    }
}

impl fmt::Display for RegroupCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self.kind {
            ConditionKind::Equality => "=",
            ConditionKind::Inequality => ">=",
        };
        match &self.operand {
            Operand::Int(v) => write!(f, "{} {op} {v}", self.field),
            Operand::Str(v) => write!(f, "{} {op} \"{v}\"", self.field),
        }
    }
}
