//! Intermediate Type Graph
//!
//! This crate holds the type graph standing between a source declaration
//! universe and target-language emission. A producer resolves source
//! declarations into nodes and merges structural facts into them; a consumer
//! reads names, members, hierarchy depth, and union common-base sets back
//! out to print declarations. It uses:
//!
//! - **Arena + ids**: nodes live in one `Vec`, addressed by `NodeId`, so the
//!   graph can be cyclic and shared without reference counting
//! - **Exhaustive matching**: node kinds are one `TypeNode` enum; every walk
//!   dispatches with a `match`, no downcasting
//! - **In-place substitution**: one engine rewrites subgraphs under a
//!   caller-supplied replacement function, memoized per pass so sharing is
//!   preserved and cycles terminate
//!
//! Identity is positional: two nodes are the same entity iff they have the
//! same `NodeId`, never because their contents look alike.

mod diagnostics;
mod format;
mod graph;
mod hierarchy;
mod ingest;
mod node;
mod source;
mod substitute;
mod visitor;

pub use diagnostics::{DiagnosticCollector, GraphDiagnostic, GraphDiagnosticKind};
pub use format::GraphFormatter;
pub use graph::{GraphConfig, STRUCTURAL_TYPE_PLACEHOLDER, TypeGraph};
pub use ingest::{DEFAULT_CALL_METHOD_NAME, SYNTHETIC_CALLER_SUFFIX};
pub use node::{
    CallSignature, ClassOrInterfaceNode, FxIndexSet, NodeId, NodeList, Param, ParamList,
    PrimitiveNode, PropertyEntry, ReferenceNode, TypeNode, TypeParameterNode, UnionNode,
};
pub use source::{
    MemberFact, OccurrenceFlags, OriginId, ParamFact, PrototypeFact, SignatureFact,
    SourceOccurrence, TypeParamFact,
};
pub use substitute::{SubstitutionPass, TypeBindings, bind_type_parameters, substitute};
pub use visitor::{NodeKind, NodeVisitor, collect_child_nodes, is_node_kind, node_kind};

// Test modules: unit tests are loaded by their source files via
// #[path = "tests/..."] declarations; only the end-to-end module lives here.
#[cfg(test)]
#[path = "../tests/graph_end_to_end.rs"]
mod graph_end_to_end;
