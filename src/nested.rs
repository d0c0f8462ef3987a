use serde_json::Value;
use thiserror::Error;

/// A dotted path that did not resolve against a JSON document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("missing {path} in payload")]
pub struct MissingPath {
    pub path: String,
}

/// Read-only dotted-path access into a JSON document (`"result.grid.columns"`).
///
/// Each segment must name a key of an object. A segment that lands on a
/// non-object, an absent key or an explicit `null` fails the whole lookup.
#[derive(Debug, Clone, Copy)]
pub struct NestedAccessor<'a> {
    root: &'a Value,
}

impl<'a> NestedAccessor<'a> {
    pub fn new(root: &'a Value) -> Self {
        Self { root }
    }

    pub fn get(&self, path: &str) -> Result<&'a Value, MissingPath> {
        let missing = || MissingPath {
            path: path.to_string(),
        };

        let mut current = self.root;
        for segment in path.split('.') {
            current = match current {
                Value::Object(map) => map.get(segment).ok_or_else(missing)?,
                _ => return Err(missing()),
            };
            if current.is_null() {
                return Err(missing());
            }
        }
        Ok(current)
    }
}
