//! Derived hierarchy queries: ancestor closures, the cached common-base-type
//! set of a union, and hierarchy depth.
//!
//! All walks here are read-only and dispatch on node kind with an exhaustive
//! match. Cycles through base types, constraints, and reference targets are
//! cut with a per-walk visiting set; unions that feed into their own
//! common-base computation are cut with a separate in-progress set that
//! spans the whole computation.

use rustc_hash::FxHashSet;
use tracing::debug;
use tsj_common::limits::{STACK_GROWTH, STACK_RED_ZONE};

use crate::graph::TypeGraph;
use crate::node::{FxIndexSet, NodeId, TypeNode};

impl TypeGraph {
    /// The ancestor closure of `id`: the node itself (resolved through
    /// references) plus every declaration reachable through base-type edges,
    /// type-parameter constraints, and union common-base sets. Reference and
    /// union nodes never appear in the result, only what they resolve to.
    pub fn ancestor_closure(&self, id: NodeId) -> FxIndexSet<NodeId> {
        let mut active_unions = FxHashSet::default();
        self.member_ancestor_closure(id, &mut active_unions)
    }

    /// Common base types of the union `id`: the minimized intersection of
    /// every member's ancestor closure. Absent when the members share no
    /// ancestor at all or the union has no members. Cached on the node until
    /// the member list changes; returns `None` for non-union nodes.
    pub fn union_common_base_types(&mut self, id: NodeId) -> Option<FxIndexSet<NodeId>> {
        let data = self.union(id)?;
        if let Some(cached) = &data.common_bases {
            return cached.clone();
        }

        let mut active_unions = FxHashSet::default();
        let result = self.compute_common_bases(id, &mut active_unions);
        debug!(
            union = id.0,
            common = result.as_ref().map(|set| set.len()),
            "computed union common base types"
        );
        if let Some(data) = self.union_mut(id) {
            data.common_bases = Some(result.clone());
        }
        result
    }

    /// Longest base-type chain length: 1 for a node with no base types,
    /// otherwise 1 plus the deepest base. References take their target's
    /// depth; unions, type parameters, and primitives sit at depth 1. Used
    /// to emit bases before their subtypes.
    pub fn hierarchy_depth(&self, id: NodeId) -> u32 {
        let mut visiting = FxHashSet::default();
        self.depth_inner(id, &mut visiting)
    }

    fn depth_inner(&self, id: NodeId, visiting: &mut FxHashSet<NodeId>) -> u32 {
        // A base reachable from itself contributes nothing on re-entry.
        if !visiting.insert(id) {
            return 0;
        }
        let depth = stacker::maybe_grow(STACK_RED_ZONE, STACK_GROWTH, || match self.node(id) {
            TypeNode::ClassOrInterface(data) => {
                1 + data
                    .base_types
                    .iter()
                    .map(|&base| self.depth_inner(base, visiting))
                    .max()
                    .unwrap_or(0)
            }
            TypeNode::Reference(data) => self.depth_inner(data.target, visiting),
            TypeNode::Union(_) | TypeNode::TypeParameter(_) | TypeNode::Primitive(_) => 1,
        });
        visiting.remove(&id);
        depth
    }

    fn compute_common_bases(
        &self,
        id: NodeId,
        active_unions: &mut FxHashSet<NodeId>,
    ) -> Option<FxIndexSet<NodeId>> {
        // A union reached again while its own computation is in progress
        // contributes no ancestors.
        if !active_unions.insert(id) {
            return None;
        }

        let result = self.intersect_member_closures(id, active_unions);

        active_unions.remove(&id);
        result
    }

    fn intersect_member_closures(
        &self,
        id: NodeId,
        active_unions: &mut FxHashSet<NodeId>,
    ) -> Option<FxIndexSet<NodeId>> {
        let data = self.union(id)?;
        let mut members = data.members.iter();

        let first = *members.next()?;
        let mut common = self.member_ancestor_closure(first, active_unions);
        for &member in members {
            if common.is_empty() {
                break;
            }
            let closure = self.member_ancestor_closure(member, active_unions);
            common.retain(|node| closure.contains(node));
        }
        if common.is_empty() {
            return None;
        }

        self.minimize_ancestors(&mut common, active_unions);
        Some(common)
    }

    fn member_ancestor_closure(
        &self,
        node: NodeId,
        active_unions: &mut FxHashSet<NodeId>,
    ) -> FxIndexSet<NodeId> {
        let mut closure = FxIndexSet::default();
        let mut visiting = FxHashSet::default();
        self.collect_ancestors(node, &mut closure, &mut visiting, active_unions);
        closure
    }

    fn collect_ancestors(
        &self,
        node: NodeId,
        closure: &mut FxIndexSet<NodeId>,
        visiting: &mut FxHashSet<NodeId>,
        active_unions: &mut FxHashSet<NodeId>,
    ) {
        if !visiting.insert(node) {
            return;
        }
        // Base chains in generated declaration files can run deep; grow the
        // stack rather than capping the walk.
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROWTH, || match self.node(node) {
            TypeNode::ClassOrInterface(data) => {
                closure.insert(node);
                for &base in &data.base_types {
                    self.collect_ancestors(base, closure, visiting, active_unions);
                }
            }
            TypeNode::Union(data) => {
                let bases = match &data.common_bases {
                    Some(cached) => cached.clone().unwrap_or_default(),
                    None => self
                        .compute_common_bases(node, active_unions)
                        .unwrap_or_default(),
                };
                for base in bases {
                    self.collect_ancestors(base, closure, visiting, active_unions);
                }
            }
            TypeNode::Reference(data) => {
                self.collect_ancestors(data.target, closure, visiting, active_unions);
            }
            TypeNode::TypeParameter(data) => {
                closure.insert(node);
                if let Some(constraint) = data.constraint {
                    self.collect_ancestors(constraint, closure, visiting, active_unions);
                }
            }
            TypeNode::Primitive(_) => {
                closure.insert(node);
            }
        });
    }

    /// Drop every element that is a strict ancestor of another element,
    /// keeping only the most specific common ancestors.
    fn minimize_ancestors(
        &self,
        common: &mut FxIndexSet<NodeId>,
        active_unions: &mut FxHashSet<NodeId>,
    ) {
        let elements: Vec<NodeId> = common.iter().copied().collect();
        let mut dominated = FxHashSet::default();
        for &element in &elements {
            let closure = self.member_ancestor_closure(element, active_unions);
            for &other in &elements {
                if other != element && closure.contains(&other) {
                    dominated.insert(other);
                }
            }
        }
        common.retain(|node| !dominated.contains(node));
    }
}

#[cfg(test)]
#[path = "tests/hierarchy_tests.rs"]
mod tests;
