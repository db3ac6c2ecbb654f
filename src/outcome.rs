use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::validate::{Violation, join_path};

/// Dotted field path → message, in first-violation order.
pub type FieldErrors = IndexMap<String, String>;

/// Result of a completed decode: exactly one of data or errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Outcome<T, E = FieldErrors> {
    Valid { data: T },
    Invalid { errors: E },
}

impl<T, E> Outcome<T, E> {
    pub fn is_valid(&self) -> bool {
        matches!(self, Outcome::Valid { .. })
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, Outcome::Invalid { .. })
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Outcome::Valid { data } => Some(data),
            Outcome::Invalid { .. } => None,
        }
    }

    pub fn errors(&self) -> Option<&E> {
        match self {
            Outcome::Valid { .. } => None,
            Outcome::Invalid { errors } => Some(errors),
        }
    }

    pub fn into_result(self) -> Result<T, E> {
        match self {
            Outcome::Valid { data } => Ok(data),
            Outcome::Invalid { errors } => Err(errors),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U, E> {
        match self {
            Outcome::Valid { data } => Outcome::Valid { data: f(data) },
            Outcome::Invalid { errors } => Outcome::Invalid { errors },
        }
    }

    pub fn map_errors<F>(self, f: impl FnOnce(E) -> F) -> Outcome<T, F> {
        match self {
            Outcome::Valid { data } => Outcome::Valid { data },
            Outcome::Invalid { errors } => Outcome::Invalid { errors: f(errors) },
        }
    }
}

/// Later violations at the same path overwrite earlier messages.
pub fn project_violations(violations: impl IntoIterator<Item = Violation>) -> FieldErrors {
    let mut errors = FieldErrors::new();
    for violation in violations {
        errors.insert(join_path(&violation.path), violation.message);
    }
    errors
}
