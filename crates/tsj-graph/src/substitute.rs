//! The substitution engine.
//!
//! One algorithm rewrites any subgraph: walk from a root, ask a
//! caller-supplied replacement function about every node reached, and
//! recurse structurally where the replacer keeps the node. The engine
//! mutates nodes in place and returns ids, so repeated reachability
//! resolves to shared results and cycles terminate instead of recursing
//! forever; callers that need the original intact clone it first.
//!
//! The replacer's answer for a node steers everything:
//!
//! - `None`: the node is dropped; containing collections filter it out, and
//!   signatures whose parameter or return types drop are dropped wholesale.
//! - a different id: that id is the result as-is, with no deeper recursion.
//!   The replacer fully owns substitution for that node, which is what makes
//!   one-step type-parameter binding and whole-node swaps work.
//! - the same id: the engine recurses into every owned edge (type
//!   parameters, base types, signatures, properties, index types, union
//!   members, reference targets and arguments, constraints), rewriting each
//!   in place, and the node itself is the result.
//!
//! Per-call state lives in a [`SubstitutionPass`]: the memo of results for
//! this pass (one environment), plus the caller-seeded pass-through set. The
//! engine records a node as its own result *before* recursing, so a cyclic
//! re-entry sees the (possibly still-being-built) node instead of looping.

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::trace;
use tsj_common::Atom;
use tsj_common::limits::{STACK_GROWTH, STACK_RED_ZONE};

use crate::graph::TypeGraph;
use crate::node::{CallSignature, FxIndexSet, NodeId, NodeList, ParamList};
use crate::visitor::NodeKind;

/// State of one top-level substitution call: the per-pass result memo and
/// the pass-through set. A fresh pass means a fresh memo; reusing a pass
/// across roots keeps sharing across those roots (same environment).
#[derive(Debug, Default)]
pub struct SubstitutionPass {
    cache: FxHashMap<NodeId, Option<NodeId>>,
    pass_through: FxHashSet<NodeId>,
}

impl SubstitutionPass {
    pub fn new() -> Self {
        SubstitutionPass::default()
    }

    /// A pass whose pass-through set is pre-seeded: those nodes come back
    /// unchanged without recursion. The engine only reads the set.
    pub fn with_pass_through(nodes: impl IntoIterator<Item = NodeId>) -> Self {
        SubstitutionPass {
            cache: FxHashMap::default(),
            pass_through: nodes.into_iter().collect(),
        }
    }

    pub fn add_pass_through(&mut self, node: NodeId) {
        self.pass_through.insert(node);
    }

    /// The memoized result for `node`, if this pass has one.
    pub fn cached(&self, node: NodeId) -> Option<Option<NodeId>> {
        self.cache.get(&node).copied()
    }
}

/// Substitute the subgraph rooted at `node`. Returns the node standing in
/// for `node` after the pass, or `None` when the replacer dropped it.
pub fn substitute<R>(
    graph: &mut TypeGraph,
    node: NodeId,
    replace: &mut R,
    pass: &mut SubstitutionPass,
) -> Option<NodeId>
where
    R: FnMut(&mut TypeGraph, NodeId) -> Option<NodeId>,
{
    // Type structure nests arbitrarily deep in generated declaration files;
    // grow the stack instead of capping the depth.
    stacker::maybe_grow(STACK_RED_ZONE, STACK_GROWTH, || {
        substitute_inner(graph, node, replace, pass)
    })
}

fn substitute_inner<R>(
    graph: &mut TypeGraph,
    node: NodeId,
    replace: &mut R,
    pass: &mut SubstitutionPass,
) -> Option<NodeId>
where
    R: FnMut(&mut TypeGraph, NodeId) -> Option<NodeId>,
{
    if pass.pass_through.contains(&node) {
        return Some(node);
    }
    if let Some(&cached) = pass.cache.get(&node) {
        return cached;
    }

    match replace(graph, node) {
        None => {
            trace!(node = node.0, "node dropped by replacer");
            pass.cache.insert(node, None);
            None
        }
        Some(other) if other != node => {
            trace!(node = node.0, replacement = other.0, "node swapped by replacer");
            pass.cache.insert(node, Some(other));
            Some(other)
        }
        Some(_) => {
            // Mark before recursing: a cyclic re-entry must resolve to this
            // node rather than recurse.
            pass.cache.insert(node, Some(node));
            let result = rewrite_children(graph, node, replace, pass);
            if result != Some(node) {
                pass.cache.insert(node, result);
            }
            result
        }
    }
}

/// Recurse into the owned edges of `node`, rewriting them in place. Only a
/// reference can change the verdict here: it drops when its target drops.
fn rewrite_children<R>(
    graph: &mut TypeGraph,
    node: NodeId,
    replace: &mut R,
    pass: &mut SubstitutionPass,
) -> Option<NodeId>
where
    R: FnMut(&mut TypeGraph, NodeId) -> Option<NodeId>,
{
    match graph.node(node).kind() {
        NodeKind::ClassOrInterface => {
            rewrite_class_or_interface(graph, node, replace, pass);
            Some(node)
        }
        NodeKind::Union => {
            rewrite_union(graph, node, replace, pass);
            Some(node)
        }
        NodeKind::Reference => rewrite_reference(graph, node, replace, pass),
        NodeKind::TypeParameter => {
            rewrite_type_parameter(graph, node, replace, pass);
            Some(node)
        }
        NodeKind::Primitive => Some(node),
    }
}

fn rewrite_class_or_interface<R>(
    graph: &mut TypeGraph,
    node: NodeId,
    replace: &mut R,
    pass: &mut SubstitutionPass,
) where
    R: FnMut(&mut TypeGraph, NodeId) -> Option<NodeId>,
{
    // Take the payload's edges out, rewrite, write back. A cyclic re-entry
    // during the rewrite resolves through the pass memo and never reads the
    // half-moved payload.
    let Some(data) = graph.class_or_interface_mut(node) else {
        return;
    };
    let type_params = std::mem::take(&mut data.type_params);
    let base_types = std::mem::take(&mut data.base_types);
    let constructors = std::mem::take(&mut data.constructors);
    let properties = std::mem::take(&mut data.properties);
    let methods = std::mem::take(&mut data.methods);
    let number_index = data.number_index_type.take();
    let string_index = data.string_index_type.take();

    let mut new_type_params = NodeList::new();
    for param in type_params {
        if let Some(id) = substitute(graph, param, replace, pass) {
            new_type_params.push(id);
        }
    }

    let mut new_base_types = FxIndexSet::default();
    for base in base_types {
        if let Some(id) = substitute(graph, base, replace, pass) {
            new_base_types.insert(id);
        }
    }

    let mut new_constructors = Vec::with_capacity(constructors.len());
    for signature in constructors {
        if let Some(signature) = substitute_signature(graph, signature, replace, pass) {
            new_constructors.push(signature);
        }
    }

    let mut new_properties = Vec::with_capacity(properties.len());
    for mut property in properties {
        match substitute(graph, property.type_id, replace, pass) {
            Some(id) => {
                property.type_id = id;
                new_properties.push(property);
            }
            None => {
                trace!(
                    node = node.0,
                    property = graph.resolve(property.name),
                    "property dropped by substitution"
                );
            }
        }
    }

    let mut new_methods = Vec::with_capacity(methods.len());
    for signature in methods {
        if let Some(signature) = substitute_signature(graph, signature, replace, pass) {
            new_methods.push(signature);
        }
    }

    let new_number_index = number_index.and_then(|id| substitute(graph, id, replace, pass));
    let new_string_index = string_index.and_then(|id| substitute(graph, id, replace, pass));

    let Some(data) = graph.class_or_interface_mut(node) else {
        return;
    };
    data.type_params = new_type_params;
    data.base_types = new_base_types;
    data.constructors = new_constructors;
    data.properties = new_properties;
    data.methods = new_methods;
    data.number_index_type = new_number_index;
    data.string_index_type = new_string_index;
}

fn rewrite_union<R>(
    graph: &mut TypeGraph,
    node: NodeId,
    replace: &mut R,
    pass: &mut SubstitutionPass,
) where
    R: FnMut(&mut TypeGraph, NodeId) -> Option<NodeId>,
{
    let Some(data) = graph.union_mut(node) else {
        return;
    };
    let members = std::mem::take(&mut data.members);

    let mut new_members = Vec::with_capacity(members.len());
    let mut seen = FxHashSet::default();
    for member in members {
        if let Some(id) = substitute(graph, member, replace, pass) {
            if seen.insert(id) {
                new_members.push(id);
            }
        }
    }

    let Some(data) = graph.union_mut(node) else {
        return;
    };
    data.members = new_members;
    data.invalidate_common_bases();
}

fn rewrite_reference<R>(
    graph: &mut TypeGraph,
    node: NodeId,
    replace: &mut R,
    pass: &mut SubstitutionPass,
) -> Option<NodeId>
where
    R: FnMut(&mut TypeGraph, NodeId) -> Option<NodeId>,
{
    let Some(data) = graph.reference(node) else {
        return Some(node);
    };
    let target = data.target;
    let args = data.args.clone();

    let Some(new_target) = substitute(graph, target, replace, pass) else {
        trace!(node = node.0, "reference dropped: target dropped");
        return None;
    };

    let mut new_args = NodeList::new();
    for arg in args {
        if let Some(id) = substitute(graph, arg, replace, pass) {
            new_args.push(id);
        }
    }

    if let Some(data) = graph.reference_mut(node) {
        data.target = new_target;
        data.args = new_args;
    }
    Some(node)
}

fn rewrite_type_parameter<R>(
    graph: &mut TypeGraph,
    node: NodeId,
    replace: &mut R,
    pass: &mut SubstitutionPass,
) where
    R: FnMut(&mut TypeGraph, NodeId) -> Option<NodeId>,
{
    let Some(constraint) = graph.type_parameter(node).and_then(|data| data.constraint) else {
        return;
    };
    let new_constraint = substitute(graph, constraint, replace, pass);
    if let Some(data) = graph.type_parameter_mut(node) {
        data.constraint = new_constraint;
    }
}

/// Rewrite one signature: type parameters filter dropped entries, but a
/// dropped parameter type or return type drops the signature wholesale (a
/// target-language signature cannot lose a parameter and stay the same
/// member).
fn substitute_signature<R>(
    graph: &mut TypeGraph,
    mut signature: CallSignature,
    replace: &mut R,
    pass: &mut SubstitutionPass,
) -> Option<CallSignature>
where
    R: FnMut(&mut TypeGraph, NodeId) -> Option<NodeId>,
{
    let type_params = std::mem::take(&mut signature.type_params);
    for param in type_params {
        if let Some(id) = substitute(graph, param, replace, pass) {
            signature.type_params.push(id);
        }
    }

    let params = std::mem::take(&mut signature.params);
    let mut new_params = ParamList::with_capacity(params.len());
    for mut param in params {
        match substitute(graph, param.type_id, replace, pass) {
            Some(id) => {
                param.type_id = id;
                new_params.push(param);
            }
            None => return None,
        }
    }
    signature.params = new_params;

    if let Some(return_type) = signature.return_type {
        match substitute(graph, return_type, replace, pass) {
            Some(id) => signature.return_type = Some(id),
            None => return None,
        }
    }

    Some(signature)
}

// =============================================================================
// Type-parameter bindings
// =============================================================================

/// Environment mapping type-parameter names to concrete nodes.
#[derive(Clone, Debug, Default)]
pub struct TypeBindings {
    map: FxHashMap<Atom, NodeId>,
}

impl TypeBindings {
    pub fn new() -> Self {
        TypeBindings::default()
    }

    pub fn insert(&mut self, name: Atom, node: NodeId) {
        self.map.insert(name, node);
    }

    pub fn get(&self, name: Atom) -> Option<NodeId> {
        self.map.get(&name).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Bindings pairing a declaration's type-parameter nodes with applied
    /// arguments, positionally. Surplus on either side is ignored.
    pub fn from_args(graph: &TypeGraph, params: &[NodeId], args: &[NodeId]) -> Self {
        let mut bindings = TypeBindings::new();
        for (&param, &arg) in params.iter().zip(args.iter()) {
            if let Some(data) = graph.type_parameter(param) {
                bindings.insert(data.name, arg);
            }
        }
        bindings
    }
}

/// One-step generic instantiation: run the engine with a replacer that swaps
/// every bound type parameter for its binding and keeps everything else.
pub fn bind_type_parameters(
    graph: &mut TypeGraph,
    root: NodeId,
    bindings: &TypeBindings,
    pass: &mut SubstitutionPass,
) -> Option<NodeId> {
    let mut replace = |graph: &mut TypeGraph, id: NodeId| -> Option<NodeId> {
        if let Some(data) = graph.type_parameter(id) {
            if let Some(bound) = bindings.get(data.name) {
                return Some(bound);
            }
        }
        Some(id)
    };
    substitute(graph, root, &mut replace, pass)
}

impl TypeGraph {
    /// The substituted view of a declaration's type-parameter list: each
    /// parameter mapped through `bindings` by name, unbound parameters
    /// unchanged. Read-only; the consumer-facing counterpart of
    /// [`bind_type_parameters`].
    pub fn type_parameters_with(&self, id: NodeId, bindings: &TypeBindings) -> Vec<NodeId> {
        self.type_parameters(id)
            .iter()
            .map(|&param| match self.type_parameter(param) {
                Some(data) => bindings.get(data.name).unwrap_or(param),
                None => param,
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "tests/substitute_tests.rs"]
mod tests;
