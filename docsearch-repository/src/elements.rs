//! In-memory mutation of object and array fields.
//!
//! Used by the read-modify-write element operations of the facade: the
//! document is fetched, mutated here, and written back under a version guard.
//! Paths are dotted (`author.tags`); a numeric segment addresses an array
//! position.

use serde_json::{Map, Value};

use crate::errors::SearchError;
use crate::types::ElementSelector;
use docsearch_shared::Document;

/// A mutation of one element inside the field at a path.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementOp {
    /// Append to an array (unless an equal element exists) or merge members
    /// into an object. Creates the field when it is absent.
    Upsert(Value),
    /// Remove the selected element.
    Remove(ElementSelector),
    /// Replace the selected element.
    Replace(ElementSelector, Value),
}

/// Apply `op` to the field at `path` inside `source`.
pub fn apply(source: Document, path: &str, op: ElementOp) -> Result<Document, SearchError> {
    let segments = split_path(path)?;
    let mut root = Value::Object(source);

    match op {
        ElementOp::Upsert(element) => upsert(&mut root, &segments, path, element)?,
        ElementOp::Remove(selector) => {
            let container = resolve(&mut root, &segments)
                .ok_or_else(|| SearchError::element_not_found(format!("path '{}'", path)))?;
            remove(container, path, &selector)?;
        }
        ElementOp::Replace(selector, element) => {
            let container = resolve(&mut root, &segments)
                .ok_or_else(|| SearchError::element_not_found(format!("path '{}'", path)))?;
            let slot = select(container, path, &selector)?;
            *slot = element;
        }
    }

    match root {
        Value::Object(document) => Ok(document),
        _ => Err(SearchError::invalid_request("document root is not an object")),
    }
}

fn split_path(path: &str) -> Result<Vec<&str>, SearchError> {
    let segments: Vec<&str> = path.split('.').collect();
    if segments.iter().any(|segment| segment.is_empty()) {
        return Err(SearchError::invalid_request(format!(
            "invalid element path '{}'",
            path
        )));
    }
    Ok(segments)
}

fn child_mut<'a>(parent: &'a mut Value, segment: &str) -> Option<&'a mut Value> {
    match parent {
        Value::Object(map) => map.get_mut(segment),
        Value::Array(items) => segment
            .parse::<usize>()
            .ok()
            .and_then(move |position| items.get_mut(position)),
        _ => None,
    }
}

fn resolve<'a>(root: &'a mut Value, segments: &[&str]) -> Option<&'a mut Value> {
    let mut current = root;
    for segment in segments {
        current = child_mut(current, segment)?;
    }
    Some(current)
}

/// Walk `segments`, creating missing object members along the way.
fn resolve_or_create<'a>(
    root: &'a mut Value,
    segments: &[&str],
    path: &str,
) -> Result<&'a mut Value, SearchError> {
    let mut current = root;
    for segment in segments {
        current = match current {
            Value::Object(map) => map
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new())),
            Value::Array(items) => segment
                .parse::<usize>()
                .ok()
                .and_then(move |position| items.get_mut(position))
                .ok_or_else(|| {
                    SearchError::element_not_found(format!("'{}' in path '{}'", segment, path))
                })?,
            _ => {
                return Err(SearchError::invalid_request(format!(
                    "cannot descend into '{}' of path '{}': not an object or array",
                    segment, path
                )))
            }
        };
    }
    Ok(current)
}

fn upsert(
    root: &mut Value,
    segments: &[&str],
    path: &str,
    element: Value,
) -> Result<(), SearchError> {
    let Some((last, parents)) = segments.split_last() else {
        return Err(SearchError::invalid_request("empty element path"));
    };
    let parent = resolve_or_create(root, parents, path)?;

    let present = child_mut(parent, last).is_some_and(|value| !value.is_null());
    if !present {
        // Objects start the field as-is; anything else starts a one-element array
        let initial = match element {
            Value::Object(_) => element,
            other => Value::Array(vec![other]),
        };
        return insert_child(parent, last, path, initial);
    }

    match child_mut(parent, last) {
        Some(Value::Array(items)) => {
            if !items.contains(&element) {
                items.push(element);
            }
            Ok(())
        }
        Some(Value::Object(members)) => match element {
            Value::Object(new_members) => {
                members.extend(new_members);
                Ok(())
            }
            _ => Err(SearchError::invalid_request(format!(
                "field '{}' is an object; upserted element must be an object",
                path
            ))),
        },
        _ => Err(SearchError::invalid_request(format!(
            "field '{}' is not an object or array",
            path
        ))),
    }
}

fn insert_child(
    parent: &mut Value,
    segment: &str,
    path: &str,
    value: Value,
) -> Result<(), SearchError> {
    match parent {
        Value::Object(map) => {
            map.insert(segment.to_string(), value);
            Ok(())
        }
        Value::Array(_) => match child_mut(parent, segment) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(SearchError::element_not_found(format!("path '{}'", path))),
        },
        _ => Err(SearchError::invalid_request(format!(
            "parent of '{}' is not an object or array",
            path
        ))),
    }
}

fn position_of(items: &[Value], path: &str, selector: &ElementSelector) -> Result<usize, SearchError> {
    let found = match selector {
        ElementSelector::Position(position) => Some(*position).filter(|p| *p < items.len()),
        ElementSelector::Equals(value) => items.iter().position(|item| item == value),
        ElementSelector::Key(_) => {
            return Err(SearchError::invalid_request(format!(
                "field '{}' is an array; select elements by position or value",
                path
            )))
        }
    };
    found.ok_or_else(|| SearchError::element_not_found(format!("{} in '{}'", selector, path)))
}

fn select<'a>(
    container: &'a mut Value,
    path: &str,
    selector: &ElementSelector,
) -> Result<&'a mut Value, SearchError> {
    match container {
        Value::Array(items) => {
            let position = position_of(items, path, selector)?;
            Ok(&mut items[position])
        }
        Value::Object(members) => match selector {
            ElementSelector::Key(key) => members.get_mut(key).ok_or_else(|| {
                SearchError::element_not_found(format!("{} in '{}'", selector, path))
            }),
            _ => Err(SearchError::invalid_request(format!(
                "field '{}' is an object; select members by key",
                path
            ))),
        },
        _ => Err(SearchError::invalid_request(format!(
            "field '{}' is not an object or array",
            path
        ))),
    }
}

fn remove(container: &mut Value, path: &str, selector: &ElementSelector) -> Result<(), SearchError> {
    match container {
        Value::Array(items) => {
            let position = position_of(items, path, selector)?;
            items.remove(position);
            Ok(())
        }
        Value::Object(members) => match selector {
            ElementSelector::Key(key) => members.remove(key).map(|_| ()).ok_or_else(|| {
                SearchError::element_not_found(format!("{} in '{}'", selector, path))
            }),
            _ => Err(SearchError::invalid_request(format!(
                "field '{}' is an object; select members by key",
                path
            ))),
        },
        _ => Err(SearchError::invalid_request(format!(
            "field '{}' is not an object or array",
            path
        ))),
    }
}
