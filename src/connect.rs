//! Wire-level connection bookkeeping between layouts.
//!
//! `connect()` is a pure function over two [`Layout`]s: it does not touch
//! any `Stream`, it only computes the per-field assignment a connection
//! would perform, so callers (and tests) can check wiring before any
//! block is constructed. Registration is opt-in via an explicit
//! [`ConnectionRegistry`] rather than process-global state.
use std::collections::HashMap;

use crate::layout::Layout;
use crate::{Error, Result};

/// One field assignment emitted by [`connect`]: `sink_field = source_field`,
/// unless `transformed` names a `fn` entry that replaces the direct copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    /// Field name on the sink side.
    pub sink_field: String,
    /// Field name on the source side feeding it.
    pub source_field: String,
    /// True if this assignment is driven by a caller-supplied transform
    /// rather than a direct copy.
    pub transformed: bool,
}

/// A record of one `connect()` call, kept by a [`ConnectionRegistry`] for
/// later visualization/diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionRecord {
    /// Name of the source block/port, for diagnostics.
    pub source: String,
    /// Name of the sink block/port, for diagnostics.
    pub sink: String,
    /// The assignments this connection performs.
    pub assignments: Vec<Assignment>,
}

/// An explicit construction-time context that accumulates
/// [`ConnectionRecord`]s, instead of a process-global list. Threaded
/// through a build function by the caller; dropped once elaboration is
/// done.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    records: Vec<ConnectionRecord>,
}

impl ConnectionRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All connections recorded so far, in call order.
    #[must_use]
    pub fn records(&self) -> &[ConnectionRecord] {
        &self.records
    }
}

/// A fully-resolved connection plan between two layouts: the per-field
/// assignments `connect()` would emit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectPlan {
    /// The emitted assignments, in source-layout field order.
    pub assignments: Vec<Assignment>,
}

/// Compute the wiring between `source` and `sink`.
///
/// Each field `N` of `source` is bound to `mapping.get(N).unwrap_or(N)` in
/// `sink`, unless `N` is in `exclude`. An entry in `transform` overrides
/// the copy with a caller-defined step, recorded as `transformed: true`.
/// `valid`/`first`/`last`/`ready` are part of the `Stream` handshake
/// itself, not payload fields, and are not represented here.
///
/// Errors with [`Error::UnconsumedTransform`] if `transform` names a field
/// that `exclude` removes or that isn't present in `source`.
pub fn connect(
    source: &Layout,
    sink: &Layout,
    exclude: &[&str],
    mapping: &HashMap<String, String>,
    transform: &[&str],
) -> Result<ConnectPlan> {
    let mut assignments = Vec::new();
    let mut consumed: std::collections::HashSet<&str> = std::collections::HashSet::new();

    for (name, _) in source.fields() {
        if exclude.contains(&name.as_str()) {
            continue;
        }
        let sink_field = mapping.get(name).cloned().unwrap_or_else(|| name.clone());
        if !sink.has_field(&sink_field) {
            continue;
        }
        let transformed = transform.contains(&name.as_str());
        if transformed {
            consumed.insert(name.as_str());
        }
        assignments.push(Assignment {
            sink_field,
            source_field: name.clone(),
            transformed,
        });
    }

    for t in transform {
        if !consumed.contains(t) {
            return Err(Error::UnconsumedTransform((*t).to_string()));
        }
    }

    Ok(ConnectPlan { assignments })
}

/// `connect()`, additionally appending a [`ConnectionRecord`] to `registry`
/// for later inspection. Pass `silent=true` to skip registration without
/// it being an error.
pub fn connect_registered(
    registry: &mut ConnectionRegistry,
    source_name: &str,
    sink_name: &str,
    source: &Layout,
    sink: &Layout,
    exclude: &[&str],
    mapping: &HashMap<String, String>,
    transform: &[&str],
    silent: bool,
) -> Result<ConnectPlan> {
    let plan = connect(source, sink, exclude, mapping, transform)?;
    if !silent {
        registry.records.push(ConnectionRecord {
            source: source_name.to_string(),
            sink: sink_name.to_string(),
            assignments: plan.assignments.clone(),
        });
    }
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_binds_matching_fields_by_name() {
        let source = Layout::new(vec![("data", 8), ("addr", 4)]).unwrap();
        let sink = Layout::new(vec![("data", 8)]).unwrap();
        let plan = connect(&source, &sink, &[], &HashMap::new(), &[]).unwrap();
        assert_eq!(plan.assignments.len(), 1);
        assert_eq!(plan.assignments[0].source_field, "data");
        assert_eq!(plan.assignments[0].sink_field, "data");
    }

    #[test]
    fn connect_rejects_transform_on_excluded_field() {
        let source = Layout::new(vec![("data", 8)]).unwrap();
        let sink = Layout::new(vec![("data", 8)]).unwrap();
        let err = connect(&source, &sink, &["data"], &HashMap::new(), &["data"]).unwrap_err();
        assert_eq!(err, Error::UnconsumedTransform("data".to_string()));
    }

    #[test]
    fn connect_registered_appends_one_record() {
        let mut registry = ConnectionRegistry::new();
        let source = Layout::new(vec![("data", 8)]).unwrap();
        let sink = Layout::new(vec![("data", 8)]).unwrap();
        connect_registered(&mut registry, "src", "dst", &source, &sink, &[], &HashMap::new(), &[], false).unwrap();
        assert_eq!(registry.records().len(), 1);
        assert_eq!(registry.records()[0].source, "src");
    }
}
