//! Closed-variant dispatch over node kinds.
//!
//! Derived computations branch on what a node is without downcasting: they
//! implement [`NodeVisitor`], overriding the kinds they care about, and every
//! other kind routes to [`default_output`](NodeVisitor::default_output). The
//! dump formatter dispatches through it in-crate; the trait is public because
//! emission consumers branch the same way on completed graphs.

use crate::graph::TypeGraph;
use crate::node::{
    ClassOrInterfaceNode, NodeId, PrimitiveNode, ReferenceNode, TypeNode, TypeParameterNode,
    UnionNode,
};

/// Tag of a node variant, for cheap branching and log output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    ClassOrInterface,
    Union,
    Reference,
    TypeParameter,
    Primitive,
}

impl TypeNode {
    pub fn kind(&self) -> NodeKind {
        match self {
            TypeNode::ClassOrInterface(_) => NodeKind::ClassOrInterface,
            TypeNode::Union(_) => NodeKind::Union,
            TypeNode::Reference(_) => NodeKind::Reference,
            TypeNode::TypeParameter(_) => NodeKind::TypeParameter,
            TypeNode::Primitive(_) => NodeKind::Primitive,
        }
    }
}

/// Visitor over the closed set of node kinds.
///
/// `default_output` is the mandatory "other" route: any `visit_*` method not
/// overridden lands there, so a visitor only spells out the kinds it
/// understands.
pub trait NodeVisitor: Sized {
    type Output;

    /// Output for node kinds the visitor does not handle.
    fn default_output() -> Self::Output;

    fn visit_class_or_interface(
        &mut self,
        graph: &TypeGraph,
        id: NodeId,
        data: &ClassOrInterfaceNode,
    ) -> Self::Output {
        let _ = (graph, id, data);
        Self::default_output()
    }

    fn visit_union(&mut self, graph: &TypeGraph, id: NodeId, data: &UnionNode) -> Self::Output {
        let _ = (graph, id, data);
        Self::default_output()
    }

    fn visit_reference(
        &mut self,
        graph: &TypeGraph,
        id: NodeId,
        data: &ReferenceNode,
    ) -> Self::Output {
        let _ = (graph, id, data);
        Self::default_output()
    }

    fn visit_type_parameter(
        &mut self,
        graph: &TypeGraph,
        id: NodeId,
        data: &TypeParameterNode,
    ) -> Self::Output {
        let _ = (graph, id, data);
        Self::default_output()
    }

    fn visit_primitive(
        &mut self,
        graph: &TypeGraph,
        id: NodeId,
        data: &PrimitiveNode,
    ) -> Self::Output {
        let _ = (graph, id, data);
        Self::default_output()
    }

    /// Dispatch on the node's kind.
    fn visit_node(&mut self, graph: &TypeGraph, id: NodeId) -> Self::Output {
        match graph.node(id) {
            TypeNode::ClassOrInterface(data) => self.visit_class_or_interface(graph, id, data),
            TypeNode::Union(data) => self.visit_union(graph, id, data),
            TypeNode::Reference(data) => self.visit_reference(graph, id, data),
            TypeNode::TypeParameter(data) => self.visit_type_parameter(graph, id, data),
            TypeNode::Primitive(data) => self.visit_primitive(graph, id, data),
        }
    }
}

/// The kind tag of a node.
pub fn node_kind(graph: &TypeGraph, id: NodeId) -> NodeKind {
    graph.node(id).kind()
}

/// Whether a node is of the given kind.
pub fn is_node_kind(graph: &TypeGraph, id: NodeId, kind: NodeKind) -> bool {
    node_kind(graph, id) == kind
}

/// Collects the immediate structural children of a node: every node id one
/// owned edge away.
struct ChildCollector;

impl NodeVisitor for ChildCollector {
    type Output = Vec<NodeId>;

    fn default_output() -> Vec<NodeId> {
        Vec::new()
    }

    fn visit_class_or_interface(
        &mut self,
        _graph: &TypeGraph,
        _id: NodeId,
        data: &ClassOrInterfaceNode,
    ) -> Vec<NodeId> {
        let mut children = Vec::new();
        children.extend(data.type_params.iter().copied());
        children.extend(data.base_types.iter().copied());
        for signature in data.constructors.iter().chain(data.methods.iter()) {
            children.extend(signature.type_params.iter().copied());
            children.extend(signature.params.iter().map(|p| p.type_id));
            children.extend(signature.return_type);
        }
        children.extend(data.properties.iter().map(|p| p.type_id));
        children.extend(data.number_index_type);
        children.extend(data.string_index_type);
        children
    }

    fn visit_union(&mut self, _graph: &TypeGraph, _id: NodeId, data: &UnionNode) -> Vec<NodeId> {
        data.members.clone()
    }

    fn visit_reference(
        &mut self,
        _graph: &TypeGraph,
        _id: NodeId,
        data: &ReferenceNode,
    ) -> Vec<NodeId> {
        let mut children = vec![data.target];
        children.extend(data.args.iter().copied());
        children
    }

    fn visit_type_parameter(
        &mut self,
        _graph: &TypeGraph,
        _id: NodeId,
        data: &TypeParameterNode,
    ) -> Vec<NodeId> {
        data.constraint.into_iter().collect()
    }
}

/// The immediate structural children of `id` (owned edges only, in payload
/// order). Primitives have none.
pub fn collect_child_nodes(graph: &TypeGraph, id: NodeId) -> Vec<NodeId> {
    ChildCollector.visit_node(graph, id)
}

#[cfg(test)]
#[path = "tests/visitor_tests.rs"]
mod tests;
