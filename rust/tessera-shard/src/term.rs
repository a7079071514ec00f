//! Scalar column values.
//!
//! A field is declared either as an integer field or a string field. All of its
//! terms share that type and are totally ordered: integers numerically, strings
//! bytewise lexicographically.

use std::fmt;

/// Declared value type of a field.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FieldType {
    Int,
    Str,
}

impl FieldType {
    pub const fn name(&self) -> &'static str {
        match self {
            FieldType::Int => "int",
            FieldType::Str => "string",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An owned term value.
///
/// The derived ordering places every integer term before every string term.
/// Within one field only one variant ever occurs, so that cross-type order is
/// never observed by a merge.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Term {
    Int(i64),
    Str(String),
}

impl Term {
    pub fn field_type(&self) -> FieldType {
        match self {
            Term::Int(_) => FieldType::Int,
            Term::Str(_) => FieldType::Str,
        }
    }

    pub fn as_term_ref(&self) -> TermRef<'_> {
        match self {
            Term::Int(v) => TermRef::Int(*v),
            Term::Str(s) => TermRef::Str(s),
        }
    }

    /// Stable 64-bit hash of the term value, independent of the process
    /// and of the shard the term came from.
    pub fn hash64(&self) -> u64 {
        self.as_term_ref().hash64()
    }
}

impl From<i64> for Term {
    fn from(value: i64) -> Self {
        Term::Int(value)
    }
}

impl From<&str> for Term {
    fn from(value: &str) -> Self {
        Term::Str(value.to_string())
    }
}

impl From<String> for Term {
    fn from(value: String) -> Self {
        Term::Str(value)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_term_ref().fmt(f)
    }
}

/// A borrowed term value, as read from a shard column.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TermRef<'a> {
    Int(i64),
    Str(&'a str),
}

impl TermRef<'_> {
    pub fn field_type(&self) -> FieldType {
        match self {
            TermRef::Int(_) => FieldType::Int,
            TermRef::Str(_) => FieldType::Str,
        }
    }

    pub fn to_term(&self) -> Term {
        match *self {
            TermRef::Int(v) => Term::Int(v),
            TermRef::Str(s) => Term::Str(s.to_string()),
        }
    }

    pub fn hash64(&self) -> u64 {
        match *self {
            TermRef::Int(v) => xxhash_rust::xxh3::xxh3_64(&v.to_le_bytes()),
            TermRef::Str(s) => xxhash_rust::xxh3::xxh3_64(s.as_bytes()),
        }
    }
}

impl fmt::Display for TermRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TermRef::Int(v) => write!(f, "{v}"),
            TermRef::Str(s) => write!(f, "\"{s}\""),
        }
    }
}
