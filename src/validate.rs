//! Structural validation of decoded trees.
//!
//! The decoder only needs the [`Validator`] capability; [`SchemaNode`] ships
//! an implementation with messages in the usual form-validation vocabulary
//! (`Required`, `Expected number, received nan`, ...).
use std::fmt;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::schema::{Check, PrimitiveKind, Refinement, SchemaNode};
use crate::value::FormValue;

static EMAIL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(key) => f.write_str(key),
            PathSegment::Index(index) => write!(f, "{index}"),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(value: &str) -> Self {
        PathSegment::Key(value.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(value: String) -> Self {
        PathSegment::Key(value)
    }
}

impl From<usize> for PathSegment {
    fn from(value: usize) -> Self {
        PathSegment::Index(value)
    }
}

pub fn join_path(segments: &[PathSegment]) -> String {
    segments.iter().map(ToString::to_string).collect::<Vec<_>>().join(".")
}

/// One rejected location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub path: Vec<PathSegment>,
    pub message: String,
}

pub trait Validator {
    /// Accepted value (object fields not in the schema are dropped), or every
    /// violation found.
    fn validate(&self, value: FormValue) -> Result<FormValue, Vec<Violation>>;
}

impl Validator for SchemaNode {
    fn validate(&self, value: FormValue) -> Result<FormValue, Vec<Violation>> {
        let mut run = Run::default();
        let value = run.check(self, value);
        if run.violations.is_empty() {
            Ok(value)
        } else {
            Err(run.violations)
        }
    }
}

#[derive(Default)]
struct Run {
    path: Vec<PathSegment>,
    violations: Vec<Violation>,
}

impl Run {
    fn fail(&mut self, message: impl Into<String>) {
        self.violations.push(Violation { path: self.path.clone(), message: message.into() });
    }

    fn check(&mut self, node: &SchemaNode, value: FormValue) -> FormValue {
        match node {
            SchemaNode::Wrapped { inner, refinement } => {
                if refinement.check == Check::Optional && value.is_undefined() {
                    return value;
                }
                let before = self.violations.len();
                let value = self.check(inner, value);
                // refinements only see values their inner node accepted
                if self.violations.len() == before {
                    self.refine(refinement, &value);
                }
                value
            }
            SchemaNode::Object { fields } => {
                let FormValue::Object(mut map) = value else {
                    self.mismatch("object", &value);
                    return value;
                };
                let mut out = IndexMap::with_capacity(fields.len());
                for (name, child) in fields {
                    let field = map.shift_remove(name).unwrap_or(FormValue::Undefined);
                    self.path.push(PathSegment::Key(name.clone()));
                    let field = self.check(child, field);
                    self.path.pop();
                    out.insert(name.clone(), field);
                }
                FormValue::Object(out)
            }
            SchemaNode::Array { element } => {
                let FormValue::Array(items) = value else {
                    self.mismatch("array", &value);
                    return value;
                };
                let mut out = Vec::with_capacity(items.len());
                for (index, item) in items.into_iter().enumerate() {
                    self.path.push(PathSegment::Index(index));
                    out.push(self.check(element, item));
                    self.path.pop();
                }
                FormValue::Array(out)
            }
            SchemaNode::Primitive { kind } => {
                self.primitive(*kind, &value);
                value
            }
            SchemaNode::Unsupported { kind } => {
                self.fail(format!("Unsupported schema kind: {kind}"));
                value
            }
        }
    }

    fn mismatch(&mut self, expected: &str, value: &FormValue) {
        if value.is_undefined() {
            self.fail("Required");
        } else {
            self.fail(format!("Expected {expected}, received {}", value.type_name()));
        }
    }

    fn primitive(&mut self, kind: PrimitiveKind, value: &FormValue) {
        let accepted = match (kind, value) {
            (PrimitiveKind::String, FormValue::String(_)) => true,
            (PrimitiveKind::Number, FormValue::Number(n)) => !n.is_nan(),
            (PrimitiveKind::Boolean, FormValue::Bool(_)) => true,
            (PrimitiveKind::Date, FormValue::Date(Some(_))) => true,
            (PrimitiveKind::Date, FormValue::Date(None)) => {
                self.fail("Invalid date");
                return;
            }
            (PrimitiveKind::BigInt, FormValue::BigInt(_)) => true,
            (PrimitiveKind::Undefined, FormValue::Undefined) => true,
            (PrimitiveKind::Null, FormValue::Null) => true,
            _ => false,
        };
        if !accepted {
            self.mismatch(kind.name(), value);
        }
    }

    fn refine(&mut self, refinement: &Refinement, value: &FormValue) {
        let failure = match &refinement.check {
            Check::Optional => None,
            Check::NonEmpty => too_short(value, 1),
            Check::MinLength { value: min } => too_short(value, *min),
            Check::MaxLength { value: max } => measure(value)
                .filter(|(len, _, _)| len > max)
                .map(|(_, what, unit)| format!("{what} must contain at most {max} {unit}")),
            Check::Min { value: min } => value
                .as_f64()
                .filter(|n| *n < min.0)
                .map(|_| format!("Number must be greater than or equal to {min}")),
            Check::Max { value: max } => value
                .as_f64()
                .filter(|n| *n > max.0)
                .map(|_| format!("Number must be less than or equal to {max}")),
            Check::Integer => value
                .as_f64()
                .filter(|n| n.is_finite() && n.fract() != 0.0)
                .map(|_| "Expected integer, received float".to_string()),
            Check::Pattern { regex } => value
                .as_str()
                .filter(|text| !regex.is_match(text))
                .map(|_| "Invalid".to_string()),
            Check::Email => value
                .as_str()
                .filter(|text| !EMAIL.is_match(text))
                .map(|_| "Invalid email".to_string()),
        };
        if let Some(default) = failure {
            self.fail(refinement.message.clone().unwrap_or(default));
        }
    }
}

fn measure(value: &FormValue) -> Option<(usize, &'static str, &'static str)> {
    match value {
        FormValue::String(text) => Some((text.chars().count(), "String", "character(s)")),
        FormValue::Array(items) => Some((items.len(), "Array", "element(s)")),
        _ => None,
    }
}

fn too_short(value: &FormValue, min: usize) -> Option<String> {
    measure(value)
        .filter(|(len, _, _)| *len < min)
        .map(|(_, what, unit)| format!("{what} must contain at least {min} {unit}"))
}
