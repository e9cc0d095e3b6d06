//! End-to-end exercise over a small DOM-flavored type universe: occurrences
//! flow in through the origin registry, the graph settles names, hierarchy,
//! and unions, and a consumer instantiates a generic declaration.

use super::*;

struct DomUniverse {
    graph: TypeGraph,
    event_target: NodeId,
    listener: NodeId,
    element: NodeId,
    div: NodeId,
    span: NodeId,
}

fn signature(params: Vec<ParamFact>, return_type: NodeId) -> SignatureFact {
    SignatureFact {
        params,
        return_type: Some(return_type),
        ..SignatureFact::default()
    }
}

fn method_member(name: &str, fact: SignatureFact) -> MemberFact {
    MemberFact {
        name: name.to_string(),
        type_id: None,
        writable: true,
        doc_lines: Vec::new(),
        call_signatures: vec![fact],
    }
}

fn listener_occurrence() -> SourceOccurrence {
    let mut occurrence = SourceOccurrence::named(OriginId(2), "EventListener");
    occurrence.call_signatures.push(signature(
        vec![ParamFact::new("event", NodeId::OBJECT)],
        NodeId::VOID,
    ));
    occurrence
}

fn event_target_occurrence(listener: NodeId) -> SourceOccurrence {
    let mut occurrence = SourceOccurrence::named(OriginId(1), "EventTarget");
    occurrence.members.push(method_member(
        "addEventListener",
        signature(
            vec![
                ParamFact::new("type", NodeId::STRING),
                ParamFact::new("listener", listener),
            ],
            NodeId::VOID,
        ),
    ));
    occurrence
}

fn element_occurrence(event_target: NodeId, listener: NodeId) -> SourceOccurrence {
    let mut occurrence = SourceOccurrence::named(OriginId(3), "Element");
    occurrence.base_types.push(event_target);
    occurrence.members.push(MemberFact::property("tagName", NodeId::STRING));
    occurrence.members.push(method_member(
        "getAttribute",
        signature(vec![ParamFact::new("name", NodeId::STRING)], NodeId::STRING),
    ));
    // Event handler slot: resolvable, still never carried over.
    let mut handler = method_member(
        "onclick",
        signature(vec![ParamFact::new("event", NodeId::OBJECT)], NodeId::VOID),
    );
    handler.type_id = Some(listener);
    occurrence.members.push(handler);
    occurrence
}

fn div_occurrence(element: NodeId) -> SourceOccurrence {
    let mut occurrence = SourceOccurrence::named(OriginId(4), "HTMLDivElement");
    occurrence.base_types.push(element);
    occurrence.prototype = Some(PrototypeFact {
        name: "HTMLDivElement".to_string(),
        package: "org.w3c.dom".to_string(),
    });
    occurrence.constructors.push(SignatureFact::default());
    occurrence
}

fn span_occurrence(element: NodeId) -> SourceOccurrence {
    let mut occurrence = SourceOccurrence::named(OriginId(5), "HTMLSpanElement");
    occurrence.base_types.push(element);
    occurrence.prototype = Some(PrototypeFact {
        name: "HTMLSpanElement".to_string(),
        package: "org.w3c.dom".to_string(),
    });
    occurrence
}

fn build_dom_universe() -> DomUniverse {
    let mut graph = TypeGraph::new();
    let mut diagnostics = DiagnosticCollector::new();

    let event_target = graph.class_or_interface_for_origin(OriginId(1));
    let listener = graph.class_or_interface_for_origin(OriginId(2));
    let element = graph.class_or_interface_for_origin(OriginId(3));
    let div = graph.class_or_interface_for_origin(OriginId(4));
    let span = graph.class_or_interface_for_origin(OriginId(5));

    graph.ingest_class_or_interface(listener, &listener_occurrence(), &[], &mut diagnostics);
    graph.ingest_class_or_interface(
        event_target,
        &event_target_occurrence(listener),
        &[],
        &mut diagnostics,
    );
    graph.ingest_class_or_interface(
        element,
        &element_occurrence(event_target, listener),
        &[],
        &mut diagnostics,
    );
    graph.ingest_class_or_interface(div, &div_occurrence(element), &[], &mut diagnostics);
    graph.ingest_class_or_interface(span, &span_occurrence(element), &[], &mut diagnostics);
    assert!(diagnostics.is_empty());

    DomUniverse {
        graph,
        event_target,
        listener,
        element,
        div,
        span,
    }
}

fn method_names(graph: &TypeGraph, node: NodeId) -> Vec<String> {
    graph
        .class_or_interface(node)
        .map(|data| {
            data.methods
                .iter()
                .filter_map(|m| m.name.map(|name| graph.resolve(name).to_string()))
                .collect()
        })
        .unwrap_or_default()
}

#[test]
fn test_universe_shape() {
    let universe = build_dom_universe();
    let graph = &universe.graph;

    assert_eq!(graph.simple_name(universe.element), Some("Element".to_string()));
    assert_eq!(
        graph.simple_name(universe.div),
        Some("HTMLDivElement".to_string())
    );

    // Directly callable declaration came out as a single-method interface.
    assert_eq!(
        method_names(graph, universe.listener),
        vec![DEFAULT_CALL_METHOD_NAME.to_string()]
    );

    // The handler slot is gone; the ordinary member survived.
    assert_eq!(method_names(graph, universe.element), vec!["getAttribute"]);
    let element = graph.class_or_interface(universe.element).unwrap();
    assert_eq!(element.properties.len(), 1);
    assert_eq!(graph.resolve(element.properties[0].name), "tagName");
    assert!(element.base_types.contains(&universe.event_target));

    // Parameter types were taken as resolved by the producer.
    let target = graph.class_or_interface(universe.event_target).unwrap();
    assert_eq!(target.methods[0].params[1].type_id, universe.listener);

    // Prototype facts make a constructible class with a package.
    assert!(graph.is_constructible_class(universe.div));
    assert!(!graph.is_constructible_class(universe.element));
    assert_eq!(
        graph.package_name(universe.div),
        Some("org.w3c.dom".to_string())
    );
    let div = graph.class_or_interface(universe.div).unwrap();
    assert_eq!(div.constructors.len(), 1);
    assert!(div.constructors[0].is_constructor());
}

#[test]
fn test_emission_order_follows_hierarchy_depth() {
    let universe = build_dom_universe();
    let graph = &universe.graph;

    assert_eq!(graph.hierarchy_depth(universe.event_target), 1);
    assert_eq!(graph.hierarchy_depth(universe.element), 2);
    assert_eq!(graph.hierarchy_depth(universe.div), 3);
    assert_eq!(graph.hierarchy_depth(universe.span), 3);

    let mut order = vec![universe.span, universe.element, universe.event_target];
    order.sort_by_key(|&id| graph.hierarchy_depth(id));
    assert_eq!(order, vec![universe.event_target, universe.element, universe.span]);
}

#[test]
fn test_union_of_sibling_elements() {
    let mut universe = build_dom_universe();
    let graph = &mut universe.graph;

    let union = graph.union_for_origin(OriginId(10));
    graph.set_union_members(union, &[universe.div, universe.span]);
    graph.set_package_name(union, "org.w3c.dom");

    let common = graph.union_common_base_types(union).unwrap();
    assert_eq!(
        common.iter().copied().collect::<Vec<_>>(),
        vec![universe.element]
    );
    assert_eq!(
        graph.simple_name(union),
        Some("UnionOfHTMLDivElementAndHTMLSpanElement_id_1".to_string())
    );
    assert_eq!(graph.package_name(union), Some("org.w3c.dom".to_string()));

    // Same origin keeps resolving to the same union node.
    assert_eq!(graph.union_for_origin(OriginId(10)), union);
}

#[test]
fn test_generic_list_instantiation() {
    let mut universe = build_dom_universe();
    let graph = &mut universe.graph;
    let mut diagnostics = DiagnosticCollector::new();

    // First occurrence declares the parameter list; the producer then reads
    // the built nodes back to resolve the member occurrence against them.
    let list = graph.class_or_interface_for_origin(OriginId(6));
    let mut shell = SourceOccurrence::named(OriginId(6), "NodeListOf");
    shell.type_params.push(TypeParamFact {
        name: "TNode".to_string(),
        constraint: Some(universe.element),
    });
    graph.ingest_class_or_interface(list, &shell, &[], &mut diagnostics);

    let tp = graph.type_parameters(list)[0];
    let mut body = SourceOccurrence::named(OriginId(7), "NodeListOf");
    body.members.push(MemberFact::property("length", NodeId::NUMBER));
    body.members.push(method_member(
        "item",
        signature(vec![ParamFact::new("index", NodeId::NUMBER)], tp),
    ));
    graph.ingest_class_or_interface(list, &body, &[], &mut diagnostics);
    assert!(diagnostics.is_empty());

    // Instantiate for HTMLDivElement on a copy, leaving the declaration as is.
    let snapshot = graph.node(list).clone();
    let instance = graph.add_class_or_interface();
    *graph.node_mut(instance) = snapshot;

    let bindings = TypeBindings::from_args(graph, graph.type_parameters(instance), &[universe.div]);
    let mut pass = SubstitutionPass::new();
    let result = bind_type_parameters(graph, instance, &bindings, &mut pass);
    assert_eq!(result, Some(instance));

    let instantiated = graph.class_or_interface(instance).unwrap();
    assert_eq!(instantiated.type_params.as_slice(), &[universe.div]);
    assert_eq!(instantiated.methods[0].return_type, Some(universe.div));
    assert_eq!(instantiated.properties[0].type_id, NodeId::NUMBER);

    let declaration = graph.class_or_interface(list).unwrap();
    assert_eq!(declaration.type_params.as_slice(), &[tp]);
    assert_eq!(declaration.methods[0].return_type, Some(tp));
}

#[test]
fn test_reingestion_is_idempotent() {
    let mut universe = build_dom_universe();
    let graph = &mut universe.graph;
    let mut diagnostics = DiagnosticCollector::new();

    let before = graph.class_or_interface(universe.element).unwrap().clone();
    graph.ingest_class_or_interface(
        universe.element,
        &element_occurrence(universe.event_target, universe.listener),
        &[],
        &mut diagnostics,
    );

    let after = graph.class_or_interface(universe.element).unwrap();
    assert_eq!(after.properties.len(), before.properties.len());
    assert_eq!(after.methods.len(), before.methods.len());
    assert_eq!(after.base_types.len(), before.base_types.len());
    assert_eq!(graph.source_origin_count(universe.element), 1);
    assert!(diagnostics.is_empty());
}

#[test]
fn test_conflicting_prototype_surfaces_diagnostic() {
    let mut universe = build_dom_universe();
    let graph = &mut universe.graph;
    let mut diagnostics = DiagnosticCollector::new();

    let mut relocated = div_occurrence(universe.element);
    relocated.origin = OriginId(8);
    relocated.prototype = Some(PrototypeFact {
        name: "HTMLDivElement".to_string(),
        package: "com.example.shim".to_string(),
    });
    graph.ingest_class_or_interface(universe.div, &relocated, &[], &mut diagnostics);

    let reported = diagnostics.diagnostics();
    assert_eq!(reported.len(), 1);
    assert_eq!(reported[0].kind, GraphDiagnosticKind::ConflictingPrototype);
    // First recording stays authoritative.
    assert_eq!(
        graph.package_name(universe.div),
        Some("org.w3c.dom".to_string())
    );
}

#[test]
fn test_dump_renders_declarations() {
    let universe = build_dom_universe();
    let out = GraphFormatter::new(&universe.graph).dump_to_string();

    assert!(out.contains("interface EventTarget"));
    assert!(out.contains("interface Element"));
    assert!(out.contains("class HTMLDivElement [org.w3c.dom]"));
    assert!(out.contains("method addEventListener(type: String, listener: EventListener): void"));
    assert!(out.contains("extends: Element"));
}
