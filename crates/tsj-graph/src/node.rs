//! Node variants of the intermediate type graph.
//!
//! Every type the generator reasons about is one arena slot holding a
//! [`TypeNode`]: a class-or-interface declaration, a union, a parameterized
//! reference to another node, a generic type parameter, or a primitive.
//! Nodes are addressed by [`NodeId`]; identity is the id, never structural
//! equality, so two structurally identical declarations remain distinct
//! entities and a union may legitimately hold look-alike members.
//!
//! The payload structs here are plain data plus small list-maintenance
//! helpers. Everything that needs to see more than one node (naming,
//! ingestion, substitution, hierarchy walks) lives on [`TypeGraph`].
//!
//! [`TypeGraph`]: crate::graph::TypeGraph

use indexmap::IndexSet;
use rustc_hash::{FxBuildHasher, FxHashSet};
use serde::Serialize;
use smallvec::SmallVec;
use tsj_common::{Atom, SetOnce};

use crate::source::OriginId;

/// Insertion-ordered set with the Fx hasher; used wherever order is
/// observable (base types, ancestor closures, occurrence sets).
pub type FxIndexSet<T> = IndexSet<T, FxBuildHasher>;

/// Inline-friendly list of node ids (type parameters, type arguments).
pub type NodeList = SmallVec<[NodeId; 4]>;

/// Inline-friendly list of signature parameters.
pub type ParamList = SmallVec<[Param; 4]>;

// =============================================================================
// NodeId
// =============================================================================

/// Stable handle of one node in the type graph arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub u32);

impl NodeId {
    /// `java.lang.Object`, the root of the target type system.
    pub const OBJECT: NodeId = NodeId(0);
    /// `java.lang.String`.
    pub const STRING: NodeId = NodeId(1);
    /// `java.lang.Number`.
    pub const NUMBER: NodeId = NodeId(2);
    /// `java.lang.Boolean`.
    pub const BOOLEAN: NodeId = NodeId(3);
    /// The `void` pseudo-type.
    pub const VOID: NodeId = NodeId(4);

    /// First id handed out after the pre-seeded primitives.
    pub(crate) const FIRST_DYNAMIC: u32 = 5;

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

// =============================================================================
// Signatures
// =============================================================================

/// One parameter of a constructor or method signature.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Param {
    pub name: Atom,
    /// Node of the parameter's type.
    pub type_id: NodeId,
    pub optional: bool,
    /// Variadic trailing parameter.
    pub rest: bool,
}

impl Param {
    pub fn new(name: Atom, type_id: NodeId) -> Self {
        Param {
            name,
            type_id,
            optional: false,
            rest: false,
        }
    }
}

/// A constructor or method signature.
///
/// Constructors carry no name and no return type. Equality deliberately
/// ignores documentation: `remove_method` deletes by shape (name, type
/// parameters, parameters, return type), and two extractions of the same
/// source signature must compare equal even when only one saw the comments.
#[derive(Clone, Debug, Default)]
pub struct CallSignature {
    /// Method name; `None` marks a constructor.
    pub name: Option<Atom>,
    /// Type-parameter nodes introduced by the signature itself.
    pub type_params: SmallVec<[NodeId; 2]>,
    pub params: ParamList,
    /// Return type node; `None` for constructors.
    pub return_type: Option<NodeId>,
    pub doc_lines: Vec<String>,
}

impl PartialEq for CallSignature {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.type_params == other.type_params
            && self.params == other.params
            && self.return_type == other.return_type
    }
}

impl Eq for CallSignature {}

impl CallSignature {
    /// A method signature with no type parameters of its own.
    pub fn method(name: Atom, params: ParamList, return_type: NodeId) -> Self {
        CallSignature {
            name: Some(name),
            type_params: SmallVec::new(),
            params,
            return_type: Some(return_type),
            doc_lines: Vec::new(),
        }
    }

    /// A constructor signature.
    pub fn constructor(params: ParamList) -> Self {
        CallSignature {
            name: None,
            type_params: SmallVec::new(),
            params,
            return_type: None,
            doc_lines: Vec::new(),
        }
    }

    #[inline]
    pub fn is_constructor(&self) -> bool {
        self.name.is_none()
    }
}

/// One instance property of a class-or-interface node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyEntry {
    pub name: Atom,
    /// Node of the property's value type.
    pub type_id: NodeId,
    pub writable: bool,
    pub doc_lines: Vec<String>,
}

impl PropertyEntry {
    pub fn new(name: Atom, type_id: NodeId) -> Self {
        PropertyEntry {
            name,
            type_id,
            writable: true,
            doc_lines: Vec::new(),
        }
    }
}

// =============================================================================
// Node payloads
// =============================================================================

/// A declaration-level node: a class or interface of the target type system.
///
/// Built up incrementally by ingestion as source occurrences of the same
/// logical declaration are discovered; the occurrence set makes re-ingestion
/// of a known occurrence a no-op.
#[derive(Clone, Debug, Default)]
pub struct ClassOrInterfaceNode {
    /// Source occurrences already absorbed into this node.
    pub source_origins: FxIndexSet<OriginId>,
    /// Prototype names observed for this declaration; the first one recorded
    /// is authoritative, later differing ones only produce a diagnostic.
    pub prototype_names: Vec<Atom>,
    pub simple_name: SetOnce<Atom>,
    pub package_name: SetOnce<Atom>,
    /// True once a constructible prototype origin has been recorded.
    pub is_class: bool,
    /// Declared type-parameter nodes, in declaration order.
    pub type_params: NodeList,
    /// Base types, insertion-ordered and deduplicated by identity.
    pub base_types: FxIndexSet<NodeId>,
    pub constructors: Vec<CallSignature>,
    pub properties: Vec<PropertyEntry>,
    pub methods: Vec<CallSignature>,
    /// Element type of a numeric indexer, when the declaration has one.
    pub number_index_type: Option<NodeId>,
    /// Element type of a string indexer.
    pub string_index_type: Option<NodeId>,
    pub doc_lines: Vec<String>,
}

impl ClassOrInterfaceNode {
    /// Identity-deduplicated insert; returns whether the base was new.
    pub fn add_base_type(&mut self, base: NodeId) -> bool {
        self.base_types.insert(base)
    }

    pub fn add_property(&mut self, property: PropertyEntry) {
        self.properties.push(property);
    }

    pub fn add_method(&mut self, method: CallSignature) {
        self.methods.push(method);
    }

    /// Delete a method by signature equality. No-op when absent.
    pub fn remove_method(&mut self, signature: &CallSignature) -> bool {
        match self.methods.iter().position(|m| m == signature) {
            Some(index) => {
                self.methods.remove(index);
                true
            }
            None => false,
        }
    }

    /// A node with no bases, no constructors, and no methods is a plain data
    /// record; the emission stage may print it as a bag of fields.
    pub fn has_only_properties(&self) -> bool {
        self.base_types.is_empty() && self.constructors.is_empty() && self.methods.is_empty()
    }
}

/// A sum type over a deduplicated, insertion-ordered member list.
#[derive(Clone, Debug)]
pub struct UnionNode {
    /// Per-graph monotone id, assigned at construction; guarantees the
    /// synthetic fallback name is unique.
    pub union_id: u32,
    /// Members, first-seen order, no duplicate ids.
    pub members: Vec<NodeId>,
    pub package_name: SetOnce<Atom>,
    /// Cached common-base-types result. Outer `None`: not computed since the
    /// last member change. Inner `None`: computed, no common ancestor.
    pub common_bases: Option<Option<FxIndexSet<NodeId>>>,
}

impl UnionNode {
    pub(crate) fn new(union_id: u32) -> Self {
        UnionNode {
            union_id,
            members: Vec::new(),
            package_name: SetOnce::empty(),
            common_bases: None,
        }
    }

    /// Replace the member list with the identity-deduplicated,
    /// order-preserving form of `members`, invalidating the cached
    /// common-base-types result.
    pub fn set_members(&mut self, members: &[NodeId]) {
        let mut seen = FxHashSet::default();
        self.members = members
            .iter()
            .copied()
            .filter(|m| seen.insert(*m))
            .collect();
        self.invalidate_common_bases();
    }

    pub fn invalidate_common_bases(&mut self) {
        self.common_bases = None;
    }
}

/// A parameterized use-site of a generic declaration: target plus applied
/// type arguments. Name, package, class-likeness, and depth all delegate to
/// the target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReferenceNode {
    pub target: NodeId,
    pub args: NodeList,
}

/// A named generic parameter with an optional constraint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeParameterNode {
    pub name: Atom,
    pub constraint: Option<NodeId>,
}

/// A fixed leaf type of the target system (`java.lang.Object`, `void`, ...).
/// Name and package are chosen at construction and never change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrimitiveNode {
    pub name: Atom,
    pub package: Option<Atom>,
}

// =============================================================================
// TypeNode
// =============================================================================

/// One arena slot of the type graph.
#[derive(Clone, Debug)]
pub enum TypeNode {
    ClassOrInterface(ClassOrInterfaceNode),
    Union(UnionNode),
    Reference(ReferenceNode),
    TypeParameter(TypeParameterNode),
    Primitive(PrimitiveNode),
}

#[cfg(test)]
#[path = "tests/node_tests.rs"]
mod tests;
