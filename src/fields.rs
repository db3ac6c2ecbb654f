//! Field path names for rendering inputs and looking up errors.
//!
//! Pure helpers over the schema; the decoder never uses them.
use std::fmt;

use crate::error::PathError;
use crate::shape::{Introspect, Shape};
use crate::validate::{PathSegment, join_path};

/// Placeholder for array positions in [`FieldPaths::leaves`].
pub const INDEX_PLACEHOLDER: &str = "N";

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<PathSegment>,
}

impl FieldPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.segments.push(PathSegment::Key(name.into()));
        self
    }

    pub fn index(mut self, index: usize) -> Self {
        self.segments.push(PathSegment::Index(index));
        self
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&join_path(&self.segments))
    }
}

impl From<Vec<PathSegment>> for FieldPath {
    fn from(segments: Vec<PathSegment>) -> Self {
        FieldPath { segments }
    }
}

/// Schema-checked path names.
#[derive(Debug, Clone, Copy)]
pub struct FieldPaths<'s, S> {
    schema: &'s S,
}

impl<'s, S: Introspect> FieldPaths<'s, S> {
    pub fn new(schema: &'s S) -> Self {
        FieldPaths { schema }
    }

    /// Resolve a dotted path (`address.zip`, `items.2.price`) against the
    /// schema. The empty string is the root.
    pub fn resolve(&self, dotted: &str) -> Result<FieldPath, PathError> {
        let mut path = FieldPath::root();
        if dotted.is_empty() {
            return Ok(path);
        }
        let mut node = self.schema;
        for segment in dotted.split('.') {
            match node.shape() {
                Shape::Object(fields) => {
                    let Some((_, child)) = fields.into_iter().find(|(name, _)| *name == segment) else {
                        return Err(PathError::UnknownField {
                            path: path.to_string(),
                            field: segment.to_string(),
                        });
                    };
                    path = path.field(segment);
                    node = child;
                }
                Shape::Array(element) => {
                    let index = segment.parse::<usize>().map_err(|_| PathError::InvalidIndex {
                        path: path.to_string(),
                        segment: segment.to_string(),
                    })?;
                    path = path.index(index);
                    node = element;
                }
                Shape::Primitive(_) | Shape::Unsupported => {
                    return Err(PathError::NotAContainer {
                        path: path.to_string(),
                        segment: segment.to_string(),
                    });
                }
            }
        }
        Ok(path)
    }

    /// Resolved dotted name, ready to use as an input name or error key.
    pub fn name(&self, dotted: &str) -> Result<String, PathError> {
        self.resolve(dotted).map(|path| path.to_string())
    }

    /// Every leaf path in declaration order, arrays shown as `N`.
    pub fn leaves(&self) -> Vec<String> {
        let mut out = Vec::new();
        collect_leaves(self.schema, &mut Vec::new(), &mut out);
        out
    }
}

fn collect_leaves<S: Introspect>(node: &S, prefix: &mut Vec<String>, out: &mut Vec<String>) {
    match node.shape() {
        Shape::Object(fields) => {
            for (name, child) in fields {
                prefix.push(name.to_string());
                collect_leaves(child, prefix, out);
                prefix.pop();
            }
        }
        Shape::Array(element) => {
            if element.is_object() || element.is_array() {
                prefix.push(INDEX_PLACEHOLDER.to_string());
                collect_leaves(element, prefix, out);
                prefix.pop();
            } else {
                // primitive arrays repeat one key
                out.push(prefix.join("."));
            }
        }
        Shape::Primitive(_) | Shape::Unsupported => out.push(prefix.join(".")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaNode;
    use pretty_assertions::assert_eq;

    fn profile() -> SchemaNode {
        SchemaNode::object([
            ("name", SchemaNode::string()),
            ("tags", SchemaNode::array(SchemaNode::string())),
            (
                "address",
                SchemaNode::array(SchemaNode::object([
                    ("street", SchemaNode::string()),
                    ("zip", SchemaNode::string().min_length(4)),
                ])),
            ),
        ])
        .optional()
    }

    #[test]
    fn builds_paths() {
        let path = FieldPath::root().field("address").index(2).field("zip");
        assert_eq!(path.to_string(), "address.2.zip");
        assert!(FieldPath::root().is_root());
    }

    #[test]
    fn resolves_known_paths() {
        let schema = profile();
        let fields = FieldPaths::new(&schema);
        assert_eq!(fields.name("name").unwrap(), "name");
        assert_eq!(fields.name("address.0").unwrap(), "address.0");
        assert_eq!(fields.name("address.3.zip").unwrap(), "address.3.zip");
        assert_eq!(fields.name("").unwrap(), "");
    }

    #[test]
    fn rejects_unknown_paths() {
        let schema = profile();
        let fields = FieldPaths::new(&schema);
        assert_eq!(
            fields.resolve("address.0.city"),
            Err(PathError::UnknownField { path: "address.0".to_string(), field: "city".to_string() })
        );
        assert_eq!(
            fields.resolve("address.first"),
            Err(PathError::InvalidIndex { path: "address".to_string(), segment: "first".to_string() })
        );
        assert_eq!(
            fields.resolve("name.length"),
            Err(PathError::NotAContainer { path: "name".to_string(), segment: "length".to_string() })
        );
    }

    #[test]
    fn lists_leaves() {
        let schema = profile();
        assert_eq!(
            FieldPaths::new(&schema).leaves(),
            ["name", "tags", "address.N.street", "address.N.zip"]
        );
    }
}
