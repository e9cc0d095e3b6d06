//! Diagnostics for graph construction.
//!
//! The graph never fails hard (see the error taxonomy in the crate docs):
//! ambiguities in the source universe are reported here and resolved by
//! keeping the first-seen value. Callers own a [`DiagnosticCollector`] and
//! pass it to ingestion; what accumulates is theirs to render or assert on.

use serde::Serialize;
use tracing::warn;

use crate::node::NodeId;

/// What kind of ambiguity was observed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum GraphDiagnosticKind {
    /// A class-or-interface node was fed a second, different constructible
    /// prototype (name or package). The first recording wins; the producer
    /// is warned because the source universe genuinely contains declarations
    /// reachable under multiple prototypes.
    ConflictingPrototype,
}

/// One non-fatal finding about a node.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GraphDiagnostic {
    pub node: NodeId,
    pub kind: GraphDiagnosticKind,
    pub message: String,
}

/// Accumulates [`GraphDiagnostic`]s across ingestion calls.
#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<GraphDiagnostic>,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        DiagnosticCollector {
            diagnostics: Vec::new(),
        }
    }

    pub fn report(&mut self, diagnostic: GraphDiagnostic) {
        warn!(
            node = diagnostic.node.0,
            kind = ?diagnostic.kind,
            message = %diagnostic.message,
            "graph diagnostic"
        );
        self.diagnostics.push(diagnostic);
    }

    pub fn report_conflicting_prototype(
        &mut self,
        node: NodeId,
        kept: &str,
        ignored: &str,
    ) {
        let message =
            format!("multiple prototypes observed: keeping '{kept}', ignoring '{ignored}'");
        self.report(GraphDiagnostic {
            node,
            kind: GraphDiagnosticKind::ConflictingPrototype,
            message,
        });
    }

    /// All diagnostics reported so far.
    pub fn diagnostics(&self) -> &[GraphDiagnostic] {
        &self.diagnostics
    }

    /// Take ownership of the accumulated diagnostics, leaving the collector
    /// empty.
    pub fn take_diagnostics(&mut self) -> Vec<GraphDiagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }
}
