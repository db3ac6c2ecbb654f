//! Declarative schema tree.
//!
//! A closed set of node kinds; the decoder never inspects anything but the
//! shape reported through [`crate::shape::Introspect`].
use std::fmt;

use indexmap::IndexMap;
use ordered_float::OrderedFloat;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveKind {
    String,
    Number,
    Boolean,
    Date,
    #[serde(rename = "bigint")]
    BigInt,
    Undefined,
    Null,
}

impl PrimitiveKind {
    pub fn name(self) -> &'static str {
        match self {
            PrimitiveKind::String => "string",
            PrimitiveKind::Number => "number",
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Date => "date",
            PrimitiveKind::BigInt => "bigint",
            PrimitiveKind::Undefined => "undefined",
            PrimitiveKind::Null => "null",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SchemaNode {
    Object {
        fields: IndexMap<String, SchemaNode>, // declaration order is decode order
    },
    Array {
        element: Box<SchemaNode>,
    },
    Primitive {
        kind: PrimitiveKind,
    },
    Wrapped {
        inner: Box<SchemaNode>,
        refinement: Refinement,
    },
    Unsupported {
        kind: String, // e.g. "union", "file", "record"
    },
}

/// A check layered over another node. Decoding ignores it; validation
/// runs it after the inner node accepted the value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Refinement {
    #[serde(flatten)]
    pub check: Check,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "check", rename_all = "snake_case")]
pub enum Check {
    /// Absence is accepted.
    Optional,
    NonEmpty,
    MinLength { value: usize },
    MaxLength { value: usize },
    Min { value: OrderedFloat<f64> },
    Max { value: OrderedFloat<f64> },
    Integer,
    Pattern { regex: Pattern },
    Email,
}

/// A regular expression compiled when the schema is built or loaded, so a
/// malformed pattern is a schema error rather than a field error.
#[derive(Clone)]
pub struct Pattern(Regex);

impl Pattern {
    pub fn new(src: &str) -> Result<Self, regex::Error> {
        Regex::new(src).map(Pattern)
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.0.is_match(text)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pattern({:?})", self.as_str())
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for Pattern {}

impl Serialize for Pattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Pattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let src = String::deserialize(deserializer)?;
        Pattern::new(&src).map_err(serde::de::Error::custom)
    }
}

impl SchemaNode {
    pub fn object<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, SchemaNode)>,
        K: Into<String>,
    {
        SchemaNode::Object {
            fields: fields.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    pub fn array(element: SchemaNode) -> Self {
        SchemaNode::Array { element: Box::new(element) }
    }

    pub fn primitive(kind: PrimitiveKind) -> Self {
        SchemaNode::Primitive { kind }
    }

    pub fn string() -> Self { Self::primitive(PrimitiveKind::String) }
    pub fn number() -> Self { Self::primitive(PrimitiveKind::Number) }
    pub fn boolean() -> Self { Self::primitive(PrimitiveKind::Boolean) }
    pub fn date() -> Self { Self::primitive(PrimitiveKind::Date) }
    pub fn bigint() -> Self { Self::primitive(PrimitiveKind::BigInt) }
    pub fn undefined() -> Self { Self::primitive(PrimitiveKind::Undefined) }
    pub fn null() -> Self { Self::primitive(PrimitiveKind::Null) }

    pub fn unsupported(kind: impl Into<String>) -> Self {
        SchemaNode::Unsupported { kind: kind.into() }
    }

    /// Wrap this node in a refinement using the default message.
    pub fn refine(self, check: Check) -> Self {
        SchemaNode::Wrapped {
            inner: Box::new(self),
            refinement: Refinement { check, message: None },
        }
    }

    pub fn refine_with(self, check: Check, message: impl Into<String>) -> Self {
        SchemaNode::Wrapped {
            inner: Box::new(self),
            refinement: Refinement { check, message: Some(message.into()) },
        }
    }

    pub fn optional(self) -> Self {
        self.refine(Check::Optional)
    }

    pub fn min(self, value: f64) -> Self {
        self.refine(Check::Min { value: OrderedFloat(value) })
    }

    pub fn max(self, value: f64) -> Self {
        self.refine(Check::Max { value: OrderedFloat(value) })
    }

    pub fn min_length(self, value: usize) -> Self {
        self.refine(Check::MinLength { value })
    }

    pub fn max_length(self, value: usize) -> Self {
        self.refine(Check::MaxLength { value })
    }

    pub fn pattern(self, src: &str) -> Result<Self, regex::Error> {
        Ok(self.refine(Check::Pattern { regex: Pattern::new(src)? }))
    }

    /// Absence is accepted when any wrapper layer is `optional`.
    pub fn is_optional(&self) -> bool {
        let mut node = self;
        while let SchemaNode::Wrapped { inner, refinement } = node {
            if refinement.check == Check::Optional {
                return true;
            }
            node = inner;
        }
        false
    }

    /// Innermost non-wrapped node. Iterative, so stacked refinements of any
    /// depth are fine.
    pub fn unwrapped(&self) -> &SchemaNode {
        let mut node = self;
        while let SchemaNode::Wrapped { inner, .. } = node {
            node = inner;
        }
        node
    }
}
