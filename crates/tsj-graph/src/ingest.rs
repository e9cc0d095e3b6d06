//! The producer-facing ingestion contract.
//!
//! A front end walking source declarations resolves each occurrence's types
//! to graph nodes, packs the structural facts into a [`SourceOccurrence`],
//! and calls [`TypeGraph::ingest_class_or_interface`] on the node registered
//! for that declaration's origin. The same node absorbs any number of
//! occurrences; re-ingesting an origin already absorbed is a no-op, and
//! every merge step tolerates partial facts (an unresolvable piece skips
//! that contribution, never fails the call).
//!
//! Union-shaped source types go through [`TypeGraph::set_union_members`]
//! with their members already resolved to nodes.

use smallvec::SmallVec;
use tracing::{debug, trace, warn};
use tsj_common::Atom;

use crate::diagnostics::DiagnosticCollector;
use crate::graph::TypeGraph;
use crate::node::{CallSignature, NodeId, NodeList, Param, ParamList, PropertyEntry};
use crate::source::{ParamFact, SignatureFact, SourceOccurrence};

/// Method name given to a declaration's own call signatures, so a directly
/// callable declaration comes out as a single-abstract-method interface.
pub const DEFAULT_CALL_METHOD_NAME: &str = "execute";

/// Suffix for the synthetic name given to an anonymous callable type that
/// appears as a property's value type, derived from the property name.
pub const SYNTHETIC_CALLER_SUFFIX: &str = "Caller";

impl TypeGraph {
    /// Absorb one source occurrence into the declaration node `node`.
    ///
    /// Steps run in a fixed order, each optional based on what the
    /// occurrence exposes: naming, prototype and package, constructors,
    /// documentation, type parameters, index types, base types, members,
    /// and the occurrence's own call signatures. Name and package keep
    /// their first written value; base types and signatures merge without
    /// duplicating entries already present.
    pub fn ingest_class_or_interface(
        &mut self,
        node: NodeId,
        occurrence: &SourceOccurrence,
        inherited_type_params: &[NodeId],
        diagnostics: &mut DiagnosticCollector,
    ) {
        let Some(data) = self.class_or_interface_mut(node) else {
            warn!(node = node.0, "ingest target is not a class-or-interface node");
            return;
        };
        if !data.source_origins.insert(occurrence.origin) {
            debug!(
                node = node.0,
                origin = occurrence.origin.0,
                "occurrence already ingested"
            );
            return;
        }
        debug!(
            node = node.0,
            origin = occurrence.origin.0,
            name = occurrence.declared_name.as_deref(),
            "ingesting source occurrence"
        );

        self.ingest_name(node, occurrence);
        self.ingest_prototype(node, occurrence, diagnostics);
        self.ingest_constructors(node, occurrence);
        self.ingest_docs(node, occurrence);
        self.ingest_type_params(node, occurrence, inherited_type_params);
        self.ingest_index_types(node, occurrence);
        for &base in &occurrence.base_types {
            self.add_base_type(node, base);
        }
        self.ingest_members(node, occurrence);
        self.ingest_call_signatures(node, occurrence);
    }

    /// Replace the member list of the union `id` with `members`, dropping
    /// duplicate identities and invalidating the cached common-base-types
    /// result. Ignored for non-union nodes.
    pub fn set_union_members(&mut self, id: NodeId, members: &[NodeId]) {
        if let Some(data) = self.union_mut(id) {
            data.set_members(members);
            debug!(union = id.0, members = data.members.len(), "union members set");
        } else {
            trace!(node = id.0, "set_union_members on non-union node ignored");
        }
    }

    fn ingest_name(&mut self, node: NodeId, occurrence: &SourceOccurrence) {
        if let Some(name) = &occurrence.declared_name {
            self.set_simple_name(node, name);
        }
        // An anonymous occurrence whose node is still unnamed (the declared
        // name may have been the structural placeholder) gets a minted one.
        if occurrence.is_anonymous() && !self.has_simple_name(node) {
            let minted = self.mint_anonymous_name();
            self.set_simple_name(node, &minted);
        }
    }

    fn ingest_prototype(
        &mut self,
        node: NodeId,
        occurrence: &SourceOccurrence,
        diagnostics: &mut DiagnosticCollector,
    ) {
        let Some(prototype) = &occurrence.prototype else {
            return;
        };
        let qualifier = self.intern(&prototype.name);
        let package = self.intern(&prototype.package);

        let mut conflict = None;
        if let Some(data) = self.class_or_interface_mut(node) {
            data.is_class = true;
            match data.prototype_names.first().copied() {
                None => {
                    data.prototype_names.push(qualifier);
                    data.package_name.set(package);
                }
                Some(first) => {
                    let first_package = data.package_name.copied();
                    if first != qualifier || first_package != Some(package) {
                        // Recorded for inspection, but the first value stays
                        // authoritative.
                        data.prototype_names.push(qualifier);
                        conflict = Some((first, first_package));
                    }
                }
            }
        }
        if let Some((kept_name, kept_package)) = conflict {
            let kept = self.qualified_prototype(kept_package, kept_name);
            let ignored = self.qualified_prototype(Some(package), qualifier);
            diagnostics.report_conflicting_prototype(node, &kept, &ignored);
        }
    }

    fn qualified_prototype(&self, package: Option<Atom>, name: Atom) -> String {
        let name = self.resolve(name);
        match package {
            Some(package) if !package.is_none() => {
                format!("{}.{}", self.resolve(package), name)
            }
            _ => name.to_string(),
        }
    }

    fn ingest_constructors(&mut self, node: NodeId, occurrence: &SourceOccurrence) {
        for fact in &occurrence.constructors {
            if let Some(signature) = self.convert_constructor(fact) {
                self.push_constructor(node, signature);
            }
        }
    }

    fn ingest_docs(&mut self, node: NodeId, occurrence: &SourceOccurrence) {
        if occurrence.doc_lines.is_empty() {
            return;
        }
        if let Some(data) = self.class_or_interface_mut(node) {
            data.doc_lines.extend(occurrence.doc_lines.iter().cloned());
        }
    }

    fn ingest_type_params(
        &mut self,
        node: NodeId,
        occurrence: &SourceOccurrence,
        inherited: &[NodeId],
    ) {
        let already_has = self
            .class_or_interface(node)
            .map(|data| !data.type_params.is_empty())
            .unwrap_or(true);
        if already_has {
            return;
        }
        if occurrence.is_anonymous() {
            // Structural types have no parameter list of their own; they
            // see the enclosing declaration's.
            if !inherited.is_empty() {
                if let Some(data) = self.class_or_interface_mut(node) {
                    data.type_params.extend_from_slice(inherited);
                }
            }
        } else if !occurrence.type_params.is_empty() {
            let mut built = NodeList::new();
            for fact in &occurrence.type_params {
                built.push(self.add_type_parameter(&fact.name, fact.constraint));
            }
            if let Some(data) = self.class_or_interface_mut(node) {
                data.type_params = built;
            }
        }
    }

    fn ingest_index_types(&mut self, node: NodeId, occurrence: &SourceOccurrence) {
        if let Some(data) = self.class_or_interface_mut(node) {
            if data.number_index_type.is_none() {
                data.number_index_type = occurrence.number_index_type;
            }
            if data.string_index_type.is_none() {
                data.string_index_type = occurrence.string_index_type;
            }
        }
    }

    fn ingest_members(&mut self, node: NodeId, occurrence: &SourceOccurrence) {
        for member in &occurrence.members {
            if !member.call_signatures.is_empty() {
                if self.config().is_event_handler_name(&member.name) {
                    debug!(
                        node = node.0,
                        member = member.name.as_str(),
                        "skipping event handler member"
                    );
                    continue;
                }
                let name = self.intern(&member.name);
                for fact in &member.call_signatures {
                    if let Some(signature) = self.convert_method(name, fact) {
                        self.push_method(node, signature);
                    }
                }
                continue;
            }

            let Some(type_id) = member.type_id else {
                trace!(
                    node = node.0,
                    member = member.name.as_str(),
                    "skipping member with unresolved type"
                );
                continue;
            };
            // An anonymous declaration standing in as this property's value
            // type is named after the property, so per-property callback
            // types stay distinct across declarations. No-op once named.
            if self.class_or_interface(type_id).is_some() {
                let synthetic = format!(
                    "{}{}",
                    capitalize_first(&member.name),
                    SYNTHETIC_CALLER_SUFFIX
                );
                self.set_simple_name(type_id, &synthetic);
            }
            let name = self.intern(&member.name);
            let property = PropertyEntry {
                name,
                type_id,
                writable: member.writable,
                doc_lines: member.doc_lines.clone(),
            };
            self.push_property(node, property);
        }
    }

    fn ingest_call_signatures(&mut self, node: NodeId, occurrence: &SourceOccurrence) {
        if occurrence.call_signatures.is_empty() {
            return;
        }
        let name = self.intern(DEFAULT_CALL_METHOD_NAME);
        for fact in &occurrence.call_signatures {
            if let Some(signature) = self.convert_method(name, fact) {
                self.push_method(node, signature);
            }
        }
    }

    // =========================================================================
    // Fact conversion
    // =========================================================================

    fn convert_method(&mut self, name: Atom, fact: &SignatureFact) -> Option<CallSignature> {
        let Some(return_type) = fact.return_type else {
            trace!(
                method = self.resolve(name),
                "signature dropped: return type unresolved"
            );
            return None;
        };
        let params = self.convert_params(&fact.params)?;
        let mut type_params = SmallVec::new();
        for tp in &fact.type_params {
            type_params.push(self.add_type_parameter(&tp.name, tp.constraint));
        }
        Some(CallSignature {
            name: Some(name),
            type_params,
            params,
            return_type: Some(return_type),
            doc_lines: fact.doc_lines.clone(),
        })
    }

    /// Constructors carry no return type and use the node's own type
    /// parameters rather than introducing any.
    fn convert_constructor(&mut self, fact: &SignatureFact) -> Option<CallSignature> {
        let params = self.convert_params(&fact.params)?;
        let mut signature = CallSignature::constructor(params);
        signature.doc_lines = fact.doc_lines.clone();
        Some(signature)
    }

    fn convert_params(&mut self, facts: &[ParamFact]) -> Option<ParamList> {
        let mut params = ParamList::with_capacity(facts.len());
        for fact in facts {
            let Some(type_id) = fact.type_id else {
                trace!(
                    param = fact.name.as_str(),
                    "signature dropped: parameter type unresolved"
                );
                return None;
            };
            let name = self.intern(&fact.name);
            params.push(Param {
                name,
                type_id,
                optional: fact.optional,
                rest: fact.rest,
            });
        }
        Some(params)
    }

    // =========================================================================
    // Deduplicating member insertion
    // =========================================================================

    fn push_constructor(&mut self, node: NodeId, signature: CallSignature) {
        if let Some(data) = self.class_or_interface_mut(node) {
            if !data.constructors.contains(&signature) {
                data.constructors.push(signature);
            }
        }
    }

    fn push_method(&mut self, node: NodeId, signature: CallSignature) {
        if let Some(data) = self.class_or_interface_mut(node) {
            if !data.methods.contains(&signature) {
                data.add_method(signature);
            }
        }
    }

    fn push_property(&mut self, node: NodeId, property: PropertyEntry) {
        if let Some(data) = self.class_or_interface_mut(node) {
            let duplicate = data
                .properties
                .iter()
                .any(|p| p.name == property.name && p.type_id == property.type_id);
            if !duplicate {
                data.add_property(property);
            }
        }
    }
}

fn capitalize_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
#[path = "tests/ingest_tests.rs"]
mod tests;
