//! Helper functions could be used in webhook/, services/, ...

use serde_json::Value;

/// One step into a JSON document: an object key or an array index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathSegment<'a> {
    Key(&'a str),
    Index(usize),
}

impl<'a> PathSegment<'a> {
    /// Splits a dotted path such as `entry.0.changes.0.value` into segments.
    /// Purely numeric segments become array indices.
    pub fn parse_dotted(path: &'a str) -> Vec<PathSegment<'a>> {
        path.split('.')
            .filter(|segment| !segment.is_empty())
            .map(|segment| match segment.parse::<usize>() {
                Ok(index) => PathSegment::Index(index),
                Err(_) => PathSegment::Key(segment),
            })
            .collect()
    }
}

/// Walks `path` from `root`, returning `None` as soon as a step can't be taken.
pub fn try_resolve<'v>(root: &'v Value, path: &[PathSegment<'_>]) -> Option<&'v Value> {
    path.iter()
        .try_fold(root, |node, segment| match (segment, node) {
            (PathSegment::Key(key), Value::Object(fields)) => fields.get(*key),
            (PathSegment::Index(index), Value::Array(items)) => items.get(*index),
            _ => None,
        })
}

/// Returns the value at `path`, or `default` when any segment is missing,
/// out of range or applied to a node of the wrong type.
pub fn resolve<'v>(root: &'v Value, path: &[PathSegment<'_>], default: &'v Value) -> &'v Value {
    try_resolve(root, path).unwrap_or(default)
}

/// [`resolve`] with a dotted path string.
pub fn resolve_dotted<'v>(root: &'v Value, path: &str, default: &'v Value) -> &'v Value {
    resolve(root, &PathSegment::parse_dotted(path), default)
}
