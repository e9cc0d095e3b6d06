//! The type graph arena.
//!
//! [`TypeGraph`] owns every node, the name interner, the origin registry,
//! and the counters behind synthetic names. Nodes are reached through
//! [`NodeId`]s handed out by the allocation methods; the registry maps
//! producer-side [`OriginId`]s to nodes get-or-create style so a declaration
//! discovered many times keeps one identity.
//!
//! The base contract every node kind answers (simple name, package,
//! type parameters, class-likeness) lives here as queries on the graph;
//! per-kind behavior is one `match` per query. Derived computations with
//! real algorithms behind them (hierarchy depth, union ancestors,
//! substitution, ingestion) live in their own modules as further `impl`
//! blocks on [`TypeGraph`].

use rustc_hash::FxHashMap;
use tracing::{debug, trace};
use tsj_common::{Atom, Interner};

use crate::node::{
    CallSignature, ClassOrInterfaceNode, NodeId, NodeList, PrimitiveNode, PropertyEntry,
    ReferenceNode, TypeNode, TypeParameterNode, UnionNode,
};
use crate::source::OriginId;

/// The source universe's placeholder name for anonymous structural types.
/// Never adopted as a simple name.
pub const STRUCTURAL_TYPE_PLACEHOLDER: &str = "__type";

/// Behavior knobs for graph construction.
#[derive(Clone, Debug)]
pub struct GraphConfig {
    /// Member-name prefixes marking event-handler slots: callable members
    /// matching one are dropped during ingestion rather than carried into
    /// the target declaration. The `on` convention is the only known case.
    pub event_handler_prefixes: Vec<String>,
}

impl Default for GraphConfig {
    fn default() -> Self {
        GraphConfig {
            event_handler_prefixes: vec!["on".to_string()],
        }
    }
}

impl GraphConfig {
    /// Whether `name` looks like an event-handler-style member.
    pub fn is_event_handler_name(&self, name: &str) -> bool {
        self.event_handler_prefixes
            .iter()
            .any(|prefix| name.starts_with(prefix.as_str()))
    }
}

/// Arena of type nodes plus the identity bookkeeping around them.
pub struct TypeGraph {
    nodes: Vec<TypeNode>,
    names: Interner,
    origin_to_node: FxHashMap<OriginId, NodeId>,
    next_union_id: u32,
    next_anonymous_id: u32,
    config: GraphConfig,
}

impl TypeGraph {
    pub fn new() -> Self {
        TypeGraph::with_config(GraphConfig::default())
    }

    pub fn with_config(config: GraphConfig) -> Self {
        let mut names = Interner::new();
        names.intern_common();
        let mut graph = TypeGraph {
            nodes: Vec::new(),
            names,
            origin_to_node: FxHashMap::default(),
            next_union_id: 1,
            next_anonymous_id: 1,
            config,
        };
        graph.seed_primitives();
        graph
    }

    /// Pre-seed the well-known leaves at their fixed ids.
    fn seed_primitives(&mut self) {
        let java_lang = self.names.intern("java.lang");
        for (constant, name, package) in [
            (NodeId::OBJECT, "Object", Some(java_lang)),
            (NodeId::STRING, "String", Some(java_lang)),
            (NodeId::NUMBER, "Number", Some(java_lang)),
            (NodeId::BOOLEAN, "Boolean", Some(java_lang)),
            (NodeId::VOID, "void", None),
        ] {
            let name = self.names.intern(name);
            let id = self.alloc(TypeNode::Primitive(PrimitiveNode { name, package }));
            debug_assert_eq!(id, constant);
        }
        debug_assert_eq!(self.nodes.len() as u32, NodeId::FIRST_DYNAMIC);
    }

    // =========================================================================
    // Allocation
    // =========================================================================

    fn alloc(&mut self, node: TypeNode) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        trace!(node = id.0, kind = ?node.kind(), "allocated node");
        self.nodes.push(node);
        id
    }

    /// A fresh, empty class-or-interface node; ingestion fills it in.
    pub fn add_class_or_interface(&mut self) -> NodeId {
        self.alloc(TypeNode::ClassOrInterface(ClassOrInterfaceNode::default()))
    }

    /// A fresh union with the next per-graph union id.
    pub fn add_union(&mut self) -> NodeId {
        let union_id = self.next_union_id;
        self.next_union_id += 1;
        self.alloc(TypeNode::Union(UnionNode::new(union_id)))
    }

    /// A parameterized use-site of `target`.
    pub fn add_reference(
        &mut self,
        target: NodeId,
        args: impl IntoIterator<Item = NodeId>,
    ) -> NodeId {
        let args: NodeList = args.into_iter().collect();
        self.alloc(TypeNode::Reference(ReferenceNode { target, args }))
    }

    pub fn add_type_parameter(&mut self, name: &str, constraint: Option<NodeId>) -> NodeId {
        let name = self.names.intern(name);
        self.alloc(TypeNode::TypeParameter(TypeParameterNode { name, constraint }))
    }

    pub fn add_primitive(&mut self, name: &str, package: Option<&str>) -> NodeId {
        let name = self.names.intern(name);
        let package = package.map(|p| self.names.intern(p));
        self.alloc(TypeNode::Primitive(PrimitiveNode { name, package }))
    }

    // =========================================================================
    // Access
    // =========================================================================

    /// The node behind `id`. Ids come from this graph's allocation methods;
    /// indexing with a foreign id is a caller bug.
    #[inline]
    pub fn node(&self, id: NodeId) -> &TypeNode {
        &self.nodes[id.index()]
    }

    #[inline]
    pub fn node_mut(&mut self, id: NodeId) -> &mut TypeNode {
        &mut self.nodes[id.index()]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All node ids in allocation order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + use<> {
        (0..self.nodes.len() as u32).map(NodeId)
    }

    pub fn class_or_interface(&self, id: NodeId) -> Option<&ClassOrInterfaceNode> {
        match self.node(id) {
            TypeNode::ClassOrInterface(data) => Some(data),
            _ => None,
        }
    }

    pub fn class_or_interface_mut(&mut self, id: NodeId) -> Option<&mut ClassOrInterfaceNode> {
        match self.node_mut(id) {
            TypeNode::ClassOrInterface(data) => Some(data),
            _ => None,
        }
    }

    pub fn union(&self, id: NodeId) -> Option<&UnionNode> {
        match self.node(id) {
            TypeNode::Union(data) => Some(data),
            _ => None,
        }
    }

    pub fn union_mut(&mut self, id: NodeId) -> Option<&mut UnionNode> {
        match self.node_mut(id) {
            TypeNode::Union(data) => Some(data),
            _ => None,
        }
    }

    pub fn reference(&self, id: NodeId) -> Option<&ReferenceNode> {
        match self.node(id) {
            TypeNode::Reference(data) => Some(data),
            _ => None,
        }
    }

    pub fn reference_mut(&mut self, id: NodeId) -> Option<&mut ReferenceNode> {
        match self.node_mut(id) {
            TypeNode::Reference(data) => Some(data),
            _ => None,
        }
    }

    pub fn type_parameter(&self, id: NodeId) -> Option<&TypeParameterNode> {
        match self.node(id) {
            TypeNode::TypeParameter(data) => Some(data),
            _ => None,
        }
    }

    pub fn type_parameter_mut(&mut self, id: NodeId) -> Option<&mut TypeParameterNode> {
        match self.node_mut(id) {
            TypeNode::TypeParameter(data) => Some(data),
            _ => None,
        }
    }

    pub fn primitive(&self, id: NodeId) -> Option<&PrimitiveNode> {
        match self.node(id) {
            TypeNode::Primitive(data) => Some(data),
            _ => None,
        }
    }

    // =========================================================================
    // Origin registry
    // =========================================================================

    /// The node already registered for `origin`, if any.
    pub fn node_for_origin(&self, origin: OriginId) -> Option<NodeId> {
        self.origin_to_node.get(&origin).copied()
    }

    /// Get or create the class-or-interface node for `origin`. The kind only
    /// applies on creation; an origin already registered returns its node
    /// whatever the kind.
    pub fn class_or_interface_for_origin(&mut self, origin: OriginId) -> NodeId {
        if let Some(&node) = self.origin_to_node.get(&origin) {
            trace!(origin = origin.0, node = node.0, "origin registry hit");
            return node;
        }
        let node = self.add_class_or_interface();
        trace!(origin = origin.0, node = node.0, "registered class-or-interface for origin");
        self.origin_to_node.insert(origin, node);
        node
    }

    /// Get or create the union node for `origin`.
    pub fn union_for_origin(&mut self, origin: OriginId) -> NodeId {
        if let Some(&node) = self.origin_to_node.get(&origin) {
            trace!(origin = origin.0, node = node.0, "origin registry hit");
            return node;
        }
        let node = self.add_union();
        trace!(origin = origin.0, node = node.0, "registered union for origin");
        self.origin_to_node.insert(origin, node);
        node
    }

    // =========================================================================
    // Names and packages
    // =========================================================================

    #[inline]
    pub fn intern(&mut self, s: &str) -> Atom {
        self.names.intern(s)
    }

    #[inline]
    pub fn resolve(&self, atom: Atom) -> &str {
        self.names.resolve(atom)
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// The node's simple name. Class-or-interface nodes answer their
    /// set-once name (absent until named); unions always answer their
    /// synthetic name; references delegate to the target; type parameters
    /// and primitives answer their fixed name.
    pub fn simple_name(&self, id: NodeId) -> Option<String> {
        match self.node(id) {
            TypeNode::ClassOrInterface(data) => data
                .simple_name
                .copied()
                .map(|atom| self.resolve(atom).to_string()),
            TypeNode::Union(data) => Some(self.union_display_name(data)),
            TypeNode::Reference(data) => self.simple_name(data.target),
            TypeNode::TypeParameter(data) => Some(self.resolve(data.name).to_string()),
            TypeNode::Primitive(data) => Some(self.resolve(data.name).to_string()),
        }
    }

    /// Whether `id` already carries a name: a set declaration name, a
    /// computed union name, or a fixed one. Only an unnamed
    /// class-or-interface node answers `false`.
    pub fn has_simple_name(&self, id: NodeId) -> bool {
        match self.node(id) {
            TypeNode::ClassOrInterface(data) => data.simple_name.is_set(),
            TypeNode::Reference(data) => self.has_simple_name(data.target),
            TypeNode::Union(_) | TypeNode::TypeParameter(_) | TypeNode::Primitive(_) => true,
        }
    }

    /// Assign a simple name, first write wins. The structural placeholder
    /// `__type` is never adopted. Nodes whose name is computed or fixed
    /// ignore the call.
    pub fn set_simple_name(&mut self, id: NodeId, name: &str) {
        if name == STRUCTURAL_TYPE_PLACEHOLDER {
            debug!(node = id.0, "ignoring structural placeholder name");
            return;
        }
        let atom = self.names.intern(name);
        match self.node_mut(id) {
            TypeNode::ClassOrInterface(data) => {
                if !data.simple_name.set(atom) {
                    debug!(node = id.0, name, "simple name already set, keeping first");
                }
            }
            _ => {
                trace!(node = id.0, name, "node kind has a fixed name, ignoring");
            }
        }
    }

    pub fn package_name(&self, id: NodeId) -> Option<String> {
        match self.node(id) {
            TypeNode::ClassOrInterface(data) => data
                .package_name
                .copied()
                .map(|atom| self.resolve(atom).to_string()),
            TypeNode::Union(data) => data
                .package_name
                .copied()
                .map(|atom| self.resolve(atom).to_string()),
            TypeNode::Reference(data) => self.package_name(data.target),
            TypeNode::TypeParameter(_) => None,
            TypeNode::Primitive(data) => {
                data.package.map(|atom| self.resolve(atom).to_string())
            }
        }
    }

    /// Assign an owning package, first write wins; only declarations and
    /// unions have a settable package.
    pub fn set_package_name(&mut self, id: NodeId, package: &str) {
        let atom = self.names.intern(package);
        match self.node_mut(id) {
            TypeNode::ClassOrInterface(data) => {
                if !data.package_name.set(atom) {
                    debug!(node = id.0, package, "package already set, keeping first");
                }
            }
            TypeNode::Union(data) => {
                if !data.package_name.set(atom) {
                    debug!(node = id.0, package, "package already set, keeping first");
                }
            }
            _ => {
                trace!(node = id.0, package, "node kind has no settable package, ignoring");
            }
        }
    }

    /// Synthetic union name: members' names joined with `And`, suffixed with
    /// the per-graph union id so distinct unions never collide. A nameless
    /// member contributes `Unknown`; a memberless union is `EmptyUnion`.
    fn union_display_name(&self, data: &UnionNode) -> String {
        if data.members.is_empty() {
            return format!("EmptyUnion_id_{}", data.union_id);
        }
        let mut parts = String::from("UnionOf");
        for (index, member) in data.members.iter().enumerate() {
            if index > 0 {
                parts.push_str("And");
            }
            match self.simple_name(*member) {
                Some(name) => parts.push_str(&name),
                None => parts.push_str("Unknown"),
            }
        }
        format!("{parts}_id_{}", data.union_id)
    }

    /// Mint a name for an anonymous declaration.
    pub(crate) fn mint_anonymous_name(&mut self) -> String {
        let id = self.next_anonymous_id;
        self.next_anonymous_id += 1;
        format!("AnonymousType{id}")
    }

    // =========================================================================
    // Classification queries
    // =========================================================================

    /// Class-like nodes have identity in the target system: declarations and
    /// unions, plus references to them. Type parameters and primitives are
    /// structural.
    pub fn is_class_like(&self, id: NodeId) -> bool {
        match self.node(id) {
            TypeNode::ClassOrInterface(_) | TypeNode::Union(_) => true,
            TypeNode::Reference(data) => self.is_class_like(data.target),
            TypeNode::TypeParameter(_) | TypeNode::Primitive(_) => false,
        }
    }

    /// Whether a constructible prototype has been recorded for the node.
    pub fn is_constructible_class(&self, id: NodeId) -> bool {
        self.class_or_interface(id).is_some_and(|data| data.is_class)
    }

    /// The plain-data-record test of the class-or-interface invariant;
    /// false for every other node kind.
    pub fn has_only_properties(&self, id: NodeId) -> bool {
        self.class_or_interface(id)
            .is_some_and(ClassOrInterfaceNode::has_only_properties)
    }

    /// Declared type-parameter nodes; empty for every kind but
    /// class-or-interface.
    pub fn type_parameters(&self, id: NodeId) -> &[NodeId] {
        match self.node(id) {
            TypeNode::ClassOrInterface(data) => &data.type_params,
            _ => &[],
        }
    }

    /// Prototype names observed for a declaration (diagnostics and dump).
    pub fn prototype_names(&self, id: NodeId) -> &[Atom] {
        match self.node(id) {
            TypeNode::ClassOrInterface(data) => &data.prototype_names,
            _ => &[],
        }
    }

    /// How many source occurrences have fed the node.
    pub fn source_origin_count(&self, id: NodeId) -> usize {
        self.class_or_interface(id)
            .map_or(0, |data| data.source_origins.len())
    }

    // =========================================================================
    // Maintenance operations
    // =========================================================================

    /// Identity-deduplicated base-type insert; returns whether the base was
    /// new. No-op on non-declaration nodes.
    pub fn add_base_type(&mut self, node: NodeId, base: NodeId) -> bool {
        match self.class_or_interface_mut(node) {
            Some(data) => data.add_base_type(base),
            None => false,
        }
    }

    /// Push a property entry onto a declaration node.
    pub fn add_property(&mut self, node: NodeId, property: PropertyEntry) {
        if let Some(data) = self.class_or_interface_mut(node) {
            data.add_property(property);
        }
    }

    /// Delete a method by signature equality; no-op when absent or when the
    /// node is not a declaration.
    pub fn remove_method(&mut self, node: NodeId, signature: &CallSignature) -> bool {
        match self.class_or_interface_mut(node) {
            Some(data) => data.remove_method(signature),
            None => false,
        }
    }
}

impl Default for TypeGraph {
    fn default() -> Self {
        TypeGraph::new()
    }
}

#[cfg(test)]
#[path = "tests/graph_tests.rs"]
mod tests;
