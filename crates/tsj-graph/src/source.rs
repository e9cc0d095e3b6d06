//! Producer-facing occurrence records.
//!
//! The front-end that walks the source type universe does its own symbol
//! resolution; what reaches the graph is a [`SourceOccurrence`]: one sighting
//! of a logical declaration with every referenced type already resolved to a
//! [`NodeId`] (via the origin registry, recursively). A fact the producer
//! could not resolve arrives as `None` and ingestion skips it silently — by
//! the time an occurrence is built, unusable declarations are assumed to be
//! filtered out.
//!
//! [`NodeId`]: crate::node::NodeId

use bitflags::bitflags;
use serde::Serialize;

use crate::node::NodeId;

/// Stable identity of a source declaration, allocated by the producer
/// (opaque to the graph). The origin registry keys node lookup on it, so a
/// declaration discovered twice lands on the same node, and the occurrence
/// set on each node keys ingestion idempotency on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct OriginId(pub u64);

bitflags! {
    /// Shape bits of one source occurrence.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
    pub struct OccurrenceFlags: u8 {
        /// Anonymous structural type: no declared name of its own. Gets a
        /// minted name and may adopt inherited type parameters.
        const ANONYMOUS = 1 << 0;
    }
}

/// Constructible-prototype fact: where the declaration's runtime constructor
/// lives. Recording a second, different one on the same node is the
/// ambiguity diagnosed as `ConflictingPrototype`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrototypeFact {
    pub name: String,
    pub package: String,
}

/// A declared type parameter, constraint pre-resolved by the producer.
#[derive(Clone, Debug)]
pub struct TypeParamFact {
    pub name: String,
    pub constraint: Option<NodeId>,
}

/// One parameter of a signature fact. `type_id: None` means the producer
/// could not resolve the parameter's type; the whole signature is skipped.
#[derive(Clone, Debug)]
pub struct ParamFact {
    pub name: String,
    pub type_id: Option<NodeId>,
    pub optional: bool,
    pub rest: bool,
}

impl ParamFact {
    pub fn new(name: impl Into<String>, type_id: NodeId) -> Self {
        ParamFact {
            name: name.into(),
            type_id: Some(type_id),
            optional: false,
            rest: false,
        }
    }
}

/// A constructor, method, or call signature as extracted from the source.
/// The method name is not part of the fact: ingestion names it from context
/// (the member name, the reserved default call name, or nothing for
/// constructors).
#[derive(Clone, Debug, Default)]
pub struct SignatureFact {
    pub type_params: Vec<TypeParamFact>,
    pub params: Vec<ParamFact>,
    /// Return type; `None` means unresolvable (the signature is skipped).
    /// Ignored for constructor facts.
    pub return_type: Option<NodeId>,
    pub doc_lines: Vec<String>,
}

/// One declared member of the occurrence.
#[derive(Clone, Debug)]
pub struct MemberFact {
    pub name: String,
    /// Resolved value type; `None` means unresolvable (the member is
    /// skipped when it is not callable).
    pub type_id: Option<NodeId>,
    pub writable: bool,
    pub doc_lines: Vec<String>,
    /// Call signatures of the member's own type; non-empty marks the member
    /// as callable.
    pub call_signatures: Vec<SignatureFact>,
}

impl MemberFact {
    pub fn property(name: impl Into<String>, type_id: NodeId) -> Self {
        MemberFact {
            name: name.into(),
            type_id: Some(type_id),
            writable: true,
            doc_lines: Vec::new(),
            call_signatures: Vec::new(),
        }
    }
}

/// One sighting of a source declaration, fully resolved, ready to ingest.
#[derive(Clone, Debug)]
pub struct SourceOccurrence {
    pub origin: OriginId,
    pub flags: OccurrenceFlags,
    /// Declared name; absent for anonymous structural types.
    pub declared_name: Option<String>,
    pub prototype: Option<PrototypeFact>,
    pub doc_lines: Vec<String>,
    pub type_params: Vec<TypeParamFact>,
    pub number_index_type: Option<NodeId>,
    pub string_index_type: Option<NodeId>,
    pub base_types: Vec<NodeId>,
    pub constructors: Vec<SignatureFact>,
    pub members: Vec<MemberFact>,
    /// Call signatures of the declaration itself (directly callable types).
    pub call_signatures: Vec<SignatureFact>,
}

impl SourceOccurrence {
    /// An empty occurrence for `origin`; callers fill in the facts they have.
    pub fn new(origin: OriginId) -> Self {
        SourceOccurrence {
            origin,
            flags: OccurrenceFlags::empty(),
            declared_name: None,
            prototype: None,
            doc_lines: Vec::new(),
            type_params: Vec::new(),
            number_index_type: None,
            string_index_type: None,
            base_types: Vec::new(),
            constructors: Vec::new(),
            members: Vec::new(),
            call_signatures: Vec::new(),
        }
    }

    /// An occurrence of a named declaration.
    pub fn named(origin: OriginId, name: impl Into<String>) -> Self {
        let mut occurrence = SourceOccurrence::new(origin);
        occurrence.declared_name = Some(name.into());
        occurrence
    }

    /// An occurrence of an anonymous structural type.
    pub fn anonymous(origin: OriginId) -> Self {
        let mut occurrence = SourceOccurrence::new(origin);
        occurrence.flags |= OccurrenceFlags::ANONYMOUS;
        occurrence
    }

    #[inline]
    pub fn is_anonymous(&self) -> bool {
        self.flags.contains(OccurrenceFlags::ANONYMOUS)
    }
}
