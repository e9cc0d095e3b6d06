//! Human-readable rendering of nodes and whole graphs.
//!
//! Diagnostics output, not a machine interface. The dump format is free to
//! change; nothing should parse it.

use std::fmt;

use crate::graph::TypeGraph;
use crate::node::{
    CallSignature, ClassOrInterfaceNode, NodeId, PrimitiveNode, ReferenceNode, TypeNode,
    TypeParameterNode, UnionNode,
};
use crate::visitor::NodeVisitor;

/// Display depth cap; reference chains past this render as `...`.
const MAX_DISPLAY_DEPTH: usize = 8;

/// Borrowing pretty-printer over a graph.
pub struct GraphFormatter<'a> {
    graph: &'a TypeGraph,
}

impl<'a> GraphFormatter<'a> {
    pub fn new(graph: &'a TypeGraph) -> Self {
        GraphFormatter { graph }
    }

    /// The use-site rendering of a type: its simple name, references with
    /// their applied arguments in angle brackets.
    pub fn type_display(&self, id: NodeId) -> String {
        self.type_display_inner(id, 0)
    }

    fn type_display_inner(&self, id: NodeId, depth: usize) -> String {
        if depth > MAX_DISPLAY_DEPTH {
            return "...".to_string();
        }
        match self.graph.node(id) {
            TypeNode::Reference(data) => {
                let mut out = self.type_display_inner(data.target, depth + 1);
                if !data.args.is_empty() {
                    out.push('<');
                    for (i, &arg) in data.args.iter().enumerate() {
                        if i > 0 {
                            out.push_str(", ");
                        }
                        out.push_str(&self.type_display_inner(arg, depth + 1));
                    }
                    out.push('>');
                }
                out
            }
            _ => self
                .graph
                .simple_name(id)
                .unwrap_or_else(|| format!("<unnamed #{}>", id.0)),
        }
    }

    /// A declaration-site type parameter: `T` or `T extends Base`.
    pub fn type_parameter_display(&self, id: NodeId) -> String {
        match self.graph.type_parameter(id) {
            Some(data) => {
                let mut out = self.graph.resolve(data.name).to_string();
                if let Some(constraint) = data.constraint {
                    out.push_str(" extends ");
                    out.push_str(&self.type_display(constraint));
                }
                out
            }
            None => self.type_display(id),
        }
    }

    /// One signature: `name<T>(a: X, b?: Y, ...rest: Z): R`, or
    /// `constructor(...)` for constructor entries.
    pub fn signature_display(&self, signature: &CallSignature) -> String {
        let mut out = String::new();
        match signature.name {
            Some(name) => out.push_str(self.graph.resolve(name)),
            None => out.push_str("constructor"),
        }
        if !signature.type_params.is_empty() {
            out.push('<');
            for (i, &tp) in signature.type_params.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(&self.type_parameter_display(tp));
            }
            out.push('>');
        }
        out.push('(');
        for (i, param) in signature.params.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            if param.rest {
                out.push_str("...");
            }
            out.push_str(self.graph.resolve(param.name));
            if param.optional {
                out.push('?');
            }
            out.push_str(": ");
            out.push_str(&self.type_display(param.type_id));
        }
        out.push(')');
        if let Some(return_type) = signature.return_type {
            out.push_str(": ");
            out.push_str(&self.type_display(return_type));
        }
        out
    }

    /// Write the full listing of one node.
    pub fn dump_node(&self, out: &mut impl fmt::Write, id: NodeId) -> fmt::Result {
        let mut dumper = NodeDumper {
            formatter: self,
            out,
        };
        dumper.visit_node(self.graph, id)
    }

    /// Write the listing of every node in the graph, in id order.
    pub fn dump(&self, out: &mut impl fmt::Write) -> fmt::Result {
        writeln!(out, "type graph: {} nodes", self.graph.len())?;
        for id in self.graph.node_ids() {
            self.dump_node(out, id)?;
        }
        Ok(())
    }

    pub fn dump_to_string(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.dump(&mut out);
        out
    }

    fn dump_class_or_interface(
        &self,
        out: &mut impl fmt::Write,
        id: NodeId,
        data: &ClassOrInterfaceNode,
    ) -> fmt::Result {
        let keyword = if data.is_class { "class" } else { "interface" };
        let name = self
            .graph
            .simple_name(id)
            .unwrap_or_else(|| "<unnamed>".to_string());
        write!(out, "#{} {keyword} {name}", id.0)?;
        if !data.type_params.is_empty() {
            let params: Vec<String> = data
                .type_params
                .iter()
                .map(|&tp| self.type_parameter_display(tp))
                .collect();
            write!(out, "<{}>", params.join(", "))?;
        }
        if let Some(package) = self.graph.package_name(id) {
            write!(out, " [{package}]")?;
        }
        writeln!(out, " depth {}", self.graph.hierarchy_depth(id))?;

        if !data.prototype_names.is_empty() {
            let names: Vec<String> = data
                .prototype_names
                .iter()
                .map(|&name| self.graph.resolve(name).to_string())
                .collect();
            writeln!(out, "  prototype: {}", names.join(", "))?;
        }
        if !data.base_types.is_empty() {
            let bases: Vec<String> = data
                .base_types
                .iter()
                .map(|&base| self.type_display(base))
                .collect();
            writeln!(out, "  extends: {}", bases.join(", "))?;
        }
        for signature in &data.constructors {
            writeln!(out, "  {}", self.signature_display(signature))?;
        }
        for property in &data.properties {
            write!(
                out,
                "  property {}: {}",
                self.graph.resolve(property.name),
                self.type_display(property.type_id)
            )?;
            if !property.writable {
                write!(out, " (readonly)")?;
            }
            writeln!(out)?;
        }
        for signature in &data.methods {
            writeln!(out, "  method {}", self.signature_display(signature))?;
        }
        if let Some(index) = data.number_index_type {
            writeln!(out, "  [number index]: {}", self.type_display(index))?;
        }
        if let Some(index) = data.string_index_type {
            writeln!(out, "  [string index]: {}", self.type_display(index))?;
        }
        Ok(())
    }

    fn dump_union(&self, out: &mut impl fmt::Write, id: NodeId, data: &UnionNode) -> fmt::Result {
        let name = self.graph.simple_name(id).unwrap_or_default();
        writeln!(out, "#{} union {name}", id.0)?;
        if !data.members.is_empty() {
            let members: Vec<String> = data
                .members
                .iter()
                .map(|&member| self.type_display(member))
                .collect();
            writeln!(out, "  members: {}", members.join(", "))?;
        }
        match &data.common_bases {
            Some(Some(bases)) => {
                let bases: Vec<String> = bases.iter().map(|&base| self.type_display(base)).collect();
                writeln!(out, "  common bases: {}", bases.join(", "))?;
            }
            Some(None) => writeln!(out, "  common bases: none")?,
            None => {}
        }
        Ok(())
    }

    fn dump_reference(&self, out: &mut impl fmt::Write, id: NodeId) -> fmt::Result {
        writeln!(out, "#{} reference {}", id.0, self.type_display(id))
    }

    fn dump_type_parameter(&self, out: &mut impl fmt::Write, id: NodeId) -> fmt::Result {
        writeln!(
            out,
            "#{} type parameter {}",
            id.0,
            self.type_parameter_display(id)
        )
    }

    fn dump_primitive(
        &self,
        out: &mut impl fmt::Write,
        id: NodeId,
        data: &PrimitiveNode,
    ) -> fmt::Result {
        write!(out, "#{} primitive {}", id.0, self.graph.resolve(data.name))?;
        if let Some(package) = data.package {
            write!(out, " [{}]", self.graph.resolve(package))?;
        }
        writeln!(out)
    }
}

/// Routes each node kind to its section renderer.
struct NodeDumper<'f, 'g, W> {
    formatter: &'f GraphFormatter<'g>,
    out: &'f mut W,
}

impl<W: fmt::Write> NodeVisitor for NodeDumper<'_, '_, W> {
    type Output = fmt::Result;

    fn default_output() -> fmt::Result {
        Ok(())
    }

    fn visit_class_or_interface(
        &mut self,
        _graph: &TypeGraph,
        id: NodeId,
        data: &ClassOrInterfaceNode,
    ) -> fmt::Result {
        self.formatter
            .dump_class_or_interface(&mut *self.out, id, data)
    }

    fn visit_union(&mut self, _graph: &TypeGraph, id: NodeId, data: &UnionNode) -> fmt::Result {
        self.formatter.dump_union(&mut *self.out, id, data)
    }

    fn visit_reference(
        &mut self,
        _graph: &TypeGraph,
        id: NodeId,
        _data: &ReferenceNode,
    ) -> fmt::Result {
        self.formatter.dump_reference(&mut *self.out, id)
    }

    fn visit_type_parameter(
        &mut self,
        _graph: &TypeGraph,
        id: NodeId,
        _data: &TypeParameterNode,
    ) -> fmt::Result {
        self.formatter.dump_type_parameter(&mut *self.out, id)
    }

    fn visit_primitive(
        &mut self,
        _graph: &TypeGraph,
        id: NodeId,
        data: &PrimitiveNode,
    ) -> fmt::Result {
        self.formatter.dump_primitive(&mut *self.out, id, data)
    }
}

#[cfg(test)]
#[path = "tests/format_tests.rs"]
mod tests;
