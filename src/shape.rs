//! Shape introspection: what a schema node looks like once refinements are
//! stripped away.
use crate::schema::{PrimitiveKind, SchemaNode};

/// Effective shape of a node. Never `Wrapped`.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape<'a, S> {
    Object(Vec<(&'a str, &'a S)>), // declaration order
    Array(&'a S),
    Primitive(PrimitiveKind),
    Unsupported,
}

/// Read-only queries the decoder needs from a schema representation.
pub trait Introspect: Sized {
    /// Shape after unwrapping every transform layer.
    fn shape(&self) -> Shape<'_, Self>;

    /// Whether absence is acceptable for this node. The decoder then records a
    /// missing entry as absent instead of coercing it.
    fn is_optional(&self) -> bool {
        false
    }

    fn is_object(&self) -> bool {
        matches!(self.shape(), Shape::Object(_))
    }

    fn is_array(&self) -> bool {
        matches!(self.shape(), Shape::Array(_))
    }

    fn primitive_kind(&self) -> Option<PrimitiveKind> {
        match self.shape() {
            Shape::Primitive(kind) => Some(kind),
            _ => None,
        }
    }
}

impl Introspect for SchemaNode {
    fn is_optional(&self) -> bool {
        SchemaNode::is_optional(self)
    }

    fn shape(&self) -> Shape<'_, Self> {
        match self.unwrapped() {
            SchemaNode::Object { fields } => {
                Shape::Object(fields.iter().map(|(name, node)| (name.as_str(), node)).collect())
            }
            SchemaNode::Array { element } => Shape::Array(element),
            SchemaNode::Primitive { kind } => Shape::Primitive(*kind),
            // `unwrapped` never stops on a wrapper
            SchemaNode::Wrapped { .. } | SchemaNode::Unsupported { .. } => Shape::Unsupported,
        }
    }
}
