//! Arrays: repeated keys for primitives, keyed or positional elements for
//! objects.
use tracing::debug;

use super::{Walk, child_path, coerce};
use crate::config::ArrayStrategy;
use crate::error::DecodeError;
use crate::shape::{Introspect, Shape};
use crate::value::FormValue;

impl Walk<'_> {
    pub(super) fn array<S: Introspect>(
        &self,
        element: &S,
        path: &str,
    ) -> Result<FormValue, DecodeError> {
        match element.shape() {
            Shape::Primitive(kind) => {
                let items = self
                    .submission
                    .get_all(path)
                    .iter()
                    .map(|entry| coerce::leaf(kind, Some(entry), path))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(FormValue::Array(items))
            }
            Shape::Object(fields) => {
                let key_path = self.config.key_path(path);
                let keyed = match self.config.array_strategy {
                    ArrayStrategy::KeyThenIndex => self.submission.has(&key_path),
                    ArrayStrategy::KeyOnly => true,
                    ArrayStrategy::IndexOnly => false,
                };
                let items = if keyed {
                    self.keyed(element, path, &key_path)?
                } else {
                    self.indexed(element, &fields, path)?
                };
                debug!(path, keyed, elements = items.len(), "decoded object array");
                Ok(FormValue::Array(items))
            }
            // left absent so validation rejects the field
            Shape::Array(_) | Shape::Unsupported => {
                debug!(path, "unsupported array element shape, field left absent");
                Ok(FormValue::Undefined)
            }
        }
    }

    /// One element per submitted key, in submission order. Duplicate keys
    /// yield duplicate elements.
    fn keyed<S: Introspect>(
        &self,
        element: &S,
        path: &str,
        key_path: &str,
    ) -> Result<Vec<FormValue>, DecodeError> {
        let mut items = Vec::new();
        for entry in self.submission.get_all(key_path) {
            let key = coerce::require_text(entry, key_path)?;
            items.push(self.node(element, &format!("{path}[{key}]"))?);
        }
        Ok(items)
    }

    /// Elements 0, 1, ... up to the first index with none of the element's
    /// fields present.
    fn indexed<S: Introspect>(
        &self,
        element: &S,
        fields: &[(&str, &S)],
        path: &str,
    ) -> Result<Vec<FormValue>, DecodeError> {
        let mut items = Vec::new();
        loop {
            let element_path = self.config.index_notation.element_path(path, items.len());
            if !self.element_present(fields, &element_path) {
                break;
            }
            items.push(self.node(element, &element_path)?);
        }
        Ok(items)
    }

    fn element_present<S: Introspect>(&self, fields: &[(&str, &S)], element_path: &str) -> bool {
        fields.iter().any(|(name, child)| {
            let field_path = child_path(element_path, name);
            match child.shape() {
                Shape::Primitive(_) | Shape::Unsupported => self.submission.has(&field_path),
                // containers never have a key of their own
                Shape::Object(_) | Shape::Array(_) => self.submission.has_under(&field_path),
            }
        })
    }
}
