use super::*;
use crate::diagnostics::{DiagnosticCollector, GraphDiagnosticKind};
use crate::graph::{GraphConfig, TypeGraph};
use crate::node::NodeId;
use crate::source::{
    MemberFact, OriginId, ParamFact, PrototypeFact, SignatureFact, SourceOccurrence, TypeParamFact,
};

fn ingest(graph: &mut TypeGraph, node: NodeId, occurrence: &SourceOccurrence) -> DiagnosticCollector {
    let mut diagnostics = DiagnosticCollector::new();
    graph.ingest_class_or_interface(node, occurrence, &[], &mut diagnostics);
    diagnostics
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

#[test]
fn test_declared_name_is_first_write_wins() {
    let mut graph = TypeGraph::new();
    let node = graph.add_class_or_interface();

    ingest(&mut graph, node, &SourceOccurrence::named(OriginId(1), "Element"));
    ingest(&mut graph, node, &SourceOccurrence::named(OriginId(2), "Node"));

    assert_eq!(graph.simple_name(node), Some("Element".to_string()));
}

#[test]
fn test_anonymous_occurrences_get_minted_names() {
    let mut graph = TypeGraph::new();
    let first = graph.add_class_or_interface();
    let second = graph.add_class_or_interface();

    ingest(&mut graph, first, &SourceOccurrence::anonymous(OriginId(1)));
    ingest(&mut graph, second, &SourceOccurrence::anonymous(OriginId(2)));

    assert_eq!(graph.simple_name(first), Some("AnonymousType1".to_string()));
    assert_eq!(graph.simple_name(second), Some("AnonymousType2".to_string()));
}

#[test]
fn test_placeholder_name_falls_back_to_minted() {
    let mut graph = TypeGraph::new();
    let node = graph.add_class_or_interface();
    let mut occurrence = SourceOccurrence::anonymous(OriginId(1));
    occurrence.declared_name = Some("__type".to_string());

    ingest(&mut graph, node, &occurrence);

    assert_eq!(graph.simple_name(node), Some("AnonymousType1".to_string()));
}

#[test]
fn test_reingesting_an_origin_is_a_noop() {
    let mut graph = TypeGraph::new();
    let node = graph.add_class_or_interface();
    let mut occurrence = SourceOccurrence::named(OriginId(1), "Element");
    occurrence.members.push(MemberFact::property("tagName", NodeId::STRING));
    occurrence.constructors.push(signature(Vec::new(), NodeId::VOID));

    ingest(&mut graph, node, &occurrence);
    ingest(&mut graph, node, &occurrence);

    let data = graph.class_or_interface(node).unwrap();
    assert_eq!(data.properties.len(), 1);
    assert_eq!(data.constructors.len(), 1);
    assert_eq!(graph.source_origin_count(node), 1);
}

#[test]
fn test_occurrences_merge_without_duplicates() {
    let mut graph = TypeGraph::new();
    let node = graph.add_class_or_interface();
    let base = graph.add_class_or_interface();
    graph.set_simple_name(base, "EventTarget");

    let mut first = SourceOccurrence::named(OriginId(1), "Element");
    first.base_types.push(base);
    first.members.push(MemberFact::property("tagName", NodeId::STRING));
    first.members.push(method_member(
        "remove",
        signature(Vec::new(), NodeId::VOID),
    ));

    let mut second = SourceOccurrence::named(OriginId(2), "Element");
    second.base_types.push(base);
    second.members.push(MemberFact::property("tagName", NodeId::STRING));
    second.members.push(MemberFact::property("id", NodeId::STRING));
    second.members.push(method_member(
        "remove",
        signature(Vec::new(), NodeId::VOID),
    ));

    ingest(&mut graph, node, &first);
    ingest(&mut graph, node, &second);

    let data = graph.class_or_interface(node).unwrap();
    assert_eq!(data.base_types.len(), 1);
    assert_eq!(data.properties.len(), 2);
    assert_eq!(data.methods.len(), 1);
    assert_eq!(graph.source_origin_count(node), 2);
}

#[test]
fn test_prototype_marks_constructible() {
    let mut graph = TypeGraph::new();
    let node = graph.add_class_or_interface();
    let mut occurrence = SourceOccurrence::named(OriginId(1), "HTMLDivElement");
    occurrence.prototype = Some(PrototypeFact {
        name: "HTMLDivElement".to_string(),
        package: "org.w3c.dom".to_string(),
    });

    let diagnostics = ingest(&mut graph, node, &occurrence);

    assert!(diagnostics.is_empty());
    assert!(graph.is_constructible_class(node));
    assert_eq!(graph.package_name(node), Some("org.w3c.dom".to_string()));
    let names = graph.prototype_names(node);
    assert_eq!(names.len(), 1);
    assert_eq!(graph.resolve(names[0]), "HTMLDivElement");
}

#[test]
fn test_conflicting_prototype_is_diagnosed() {
    let mut graph = TypeGraph::new();
    let node = graph.add_class_or_interface();
    let mut first = SourceOccurrence::named(OriginId(1), "Element");
    first.prototype = Some(PrototypeFact {
        name: "Element".to_string(),
        package: "org.w3c.dom".to_string(),
    });
    let mut second = SourceOccurrence::named(OriginId(2), "Element");
    second.prototype = Some(PrototypeFact {
        name: "Element".to_string(),
        package: "com.example".to_string(),
    });

    ingest(&mut graph, node, &first);
    let diagnostics = ingest(&mut graph, node, &second);

    let reported = diagnostics.diagnostics();
    assert_eq!(reported.len(), 1);
    assert_eq!(reported[0].node, node);
    assert_eq!(reported[0].kind, GraphDiagnosticKind::ConflictingPrototype);
    assert!(reported[0].message.contains("org.w3c.dom.Element"));
    assert!(reported[0].message.contains("com.example.Element"));

    // The first recording stays authoritative; the loser is still listed.
    assert_eq!(graph.package_name(node), Some("org.w3c.dom".to_string()));
    assert_eq!(graph.prototype_names(node).len(), 2);
}

#[test]
fn test_repeated_identical_prototype_is_fine() {
    let mut graph = TypeGraph::new();
    let node = graph.add_class_or_interface();
    for origin in 1..=2 {
        let mut occurrence = SourceOccurrence::named(OriginId(origin), "Element");
        occurrence.prototype = Some(PrototypeFact {
            name: "Element".to_string(),
            package: "org.w3c.dom".to_string(),
        });
        let diagnostics = ingest(&mut graph, node, &occurrence);
        assert!(diagnostics.is_empty());
    }
    assert_eq!(graph.prototype_names(node).len(), 1);
}

#[test]
fn test_constructor_conversion() {
    let mut graph = TypeGraph::new();
    let node = graph.add_class_or_interface();
    let mut occurrence = SourceOccurrence::named(OriginId(1), "Event");
    let mut param = ParamFact::new("kind", NodeId::STRING);
    param.optional = true;
    occurrence.constructors.push(signature(vec![param], NodeId::VOID));

    ingest(&mut graph, node, &occurrence);

    let data = graph.class_or_interface(node).unwrap();
    assert_eq!(data.constructors.len(), 1);
    let constructor = &data.constructors[0];
    assert!(constructor.is_constructor());
    assert_eq!(constructor.name, None);
    assert_eq!(constructor.return_type, None);
    assert_eq!(constructor.params.len(), 1);
    assert!(constructor.params[0].optional);
}

#[test]
fn test_constructor_with_unresolved_param_is_skipped() {
    let mut graph = TypeGraph::new();
    let node = graph.add_class_or_interface();
    let mut occurrence = SourceOccurrence::named(OriginId(1), "Event");
    let mut fact = SignatureFact::default();
    fact.params.push(ParamFact {
        name: "detail".to_string(),
        type_id: None,
        optional: false,
        rest: false,
    });
    occurrence.constructors.push(fact);

    ingest(&mut graph, node, &occurrence);

    assert!(graph.class_or_interface(node).unwrap().constructors.is_empty());
}

#[test]
fn test_docs_append_across_occurrences() {
    let mut graph = TypeGraph::new();
    let node = graph.add_class_or_interface();
    let mut first = SourceOccurrence::named(OriginId(1), "Element");
    first.doc_lines.push("An element.".to_string());
    let mut second = SourceOccurrence::named(OriginId(2), "Element");
    second.doc_lines.push("Also a node.".to_string());

    ingest(&mut graph, node, &first);
    ingest(&mut graph, node, &second);

    assert_eq!(
        graph.class_or_interface(node).unwrap().doc_lines,
        vec!["An element.".to_string(), "Also a node.".to_string()]
    );
}

#[test]
fn test_declared_type_params_built_once() {
    let mut graph = TypeGraph::new();
    let node = graph.add_class_or_interface();
    let constraint = graph.add_class_or_interface();
    graph.set_simple_name(constraint, "Node");

    let mut first = SourceOccurrence::named(OriginId(1), "NodeListOf");
    first.type_params.push(TypeParamFact {
        name: "TNode".to_string(),
        constraint: Some(constraint),
    });
    ingest(&mut graph, node, &first);

    let params = graph.type_parameters(node).to_vec();
    assert_eq!(params.len(), 1);
    let built = graph.type_parameter(params[0]).unwrap();
    assert_eq!(graph.resolve(built.name), "TNode");
    assert_eq!(built.constraint, Some(constraint));

    // A later occurrence never rebuilds the list.
    let mut second = SourceOccurrence::named(OriginId(2), "NodeListOf");
    second.type_params.push(TypeParamFact {
        name: "Other".to_string(),
        constraint: None,
    });
    ingest(&mut graph, node, &second);
    assert_eq!(graph.type_parameters(node), params.as_slice());
}

#[test]
fn test_anonymous_occurrence_adopts_inherited_type_params() {
    let mut graph = TypeGraph::new();
    let node = graph.add_class_or_interface();
    let inherited = graph.add_type_parameter("T", None);

    let mut diagnostics = DiagnosticCollector::new();
    graph.ingest_class_or_interface(
        node,
        &SourceOccurrence::anonymous(OriginId(1)),
        &[inherited],
        &mut diagnostics,
    );

    assert_eq!(graph.type_parameters(node), &[inherited]);
}

#[test]
fn test_named_occurrence_ignores_inherited_type_params() {
    let mut graph = TypeGraph::new();
    let node = graph.add_class_or_interface();
    let inherited = graph.add_type_parameter("T", None);

    let mut diagnostics = DiagnosticCollector::new();
    graph.ingest_class_or_interface(
        node,
        &SourceOccurrence::named(OriginId(1), "Element"),
        &[inherited],
        &mut diagnostics,
    );

    assert!(graph.type_parameters(node).is_empty());
}

#[test]
fn test_index_types_set_once() {
    let mut graph = TypeGraph::new();
    let node = graph.add_class_or_interface();
    let mut first = SourceOccurrence::named(OriginId(1), "NodeList");
    first.number_index_type = Some(NodeId::OBJECT);
    let mut second = SourceOccurrence::named(OriginId(2), "NodeList");
    second.number_index_type = Some(NodeId::STRING);
    second.string_index_type = Some(NodeId::STRING);

    ingest(&mut graph, node, &first);
    ingest(&mut graph, node, &second);

    let data = graph.class_or_interface(node).unwrap();
    assert_eq!(data.number_index_type, Some(NodeId::OBJECT));
    assert_eq!(data.string_index_type, Some(NodeId::STRING));
}

#[test]
fn test_members_split_into_properties_and_methods() {
    let mut graph = TypeGraph::new();
    let node = graph.add_class_or_interface();
    let mut occurrence = SourceOccurrence::named(OriginId(1), "Element");
    occurrence.members.push(MemberFact::property("tagName", NodeId::STRING));
    occurrence.members.push(method_member(
        "getAttribute",
        signature(vec![ParamFact::new("name", NodeId::STRING)], NodeId::STRING),
    ));

    ingest(&mut graph, node, &occurrence);

    let data = graph.class_or_interface(node).unwrap();
    assert_eq!(data.properties.len(), 1);
    assert_eq!(graph.resolve(data.properties[0].name), "tagName");
    assert_eq!(data.methods.len(), 1);
    let method = &data.methods[0];
    assert_eq!(
        method.name.map(|name| graph.resolve(name).to_string()),
        Some("getAttribute".to_string())
    );
    assert_eq!(method.return_type, Some(NodeId::STRING));
}

#[test]
fn test_event_handler_members_are_skipped() {
    let mut graph = TypeGraph::new();
    let node = graph.add_class_or_interface();
    let mut occurrence = SourceOccurrence::named(OriginId(1), "Element");
    occurrence.members.push(method_member(
        "onclick",
        signature(Vec::new(), NodeId::VOID),
    ));

    ingest(&mut graph, node, &occurrence);

    let data = graph.class_or_interface(node).unwrap();
    assert!(data.methods.is_empty());
    assert!(data.properties.is_empty());
}

#[test]
fn test_event_handler_prefix_follows_config() {
    let config = GraphConfig {
        event_handler_prefixes: vec!["handle".to_string()],
    };
    let mut graph = TypeGraph::with_config(config);
    let node = graph.add_class_or_interface();
    let mut occurrence = SourceOccurrence::named(OriginId(1), "Element");
    occurrence.members.push(method_member(
        "handleClick",
        signature(Vec::new(), NodeId::VOID),
    ));
    occurrence.members.push(method_member(
        "onclick",
        signature(Vec::new(), NodeId::VOID),
    ));

    ingest(&mut graph, node, &occurrence);

    // With the default prefix replaced, "on" names are ordinary methods.
    let data = graph.class_or_interface(node).unwrap();
    assert_eq!(data.methods.len(), 1);
    assert_eq!(
        data.methods[0].name.map(|name| graph.resolve(name).to_string()),
        Some("onclick".to_string())
    );
}

#[test]
fn test_property_value_type_named_after_property() {
    let mut graph = TypeGraph::new();
    let node = graph.add_class_or_interface();
    let callback = graph.add_class_or_interface();
    let mut occurrence = SourceOccurrence::named(OriginId(1), "Element");
    occurrence.members.push(MemberFact::property("callback", callback));

    ingest(&mut graph, node, &occurrence);

    assert_eq!(graph.simple_name(callback), Some("CallbackCaller".to_string()));
}

#[test]
fn test_named_property_value_type_keeps_its_name() {
    let mut graph = TypeGraph::new();
    let node = graph.add_class_or_interface();
    let observer = graph.add_class_or_interface();
    graph.set_simple_name(observer, "Observer");
    let mut occurrence = SourceOccurrence::named(OriginId(1), "Element");
    occurrence.members.push(MemberFact::property("callback", observer));

    ingest(&mut graph, node, &occurrence);

    assert_eq!(graph.simple_name(observer), Some("Observer".to_string()));
}

#[test]
fn test_own_call_signatures_become_execute_methods() {
    let mut graph = TypeGraph::new();
    let node = graph.add_class_or_interface();
    let mut occurrence = SourceOccurrence::anonymous(OriginId(1));
    occurrence.call_signatures.push(signature(
        vec![ParamFact::new("event", NodeId::OBJECT)],
        NodeId::VOID,
    ));

    ingest(&mut graph, node, &occurrence);

    let data = graph.class_or_interface(node).unwrap();
    assert_eq!(data.methods.len(), 1);
    assert_eq!(
        data.methods[0].name.map(|name| graph.resolve(name).to_string()),
        Some(DEFAULT_CALL_METHOD_NAME.to_string())
    );
}

#[test]
fn test_unresolved_member_type_is_skipped() {
    let mut graph = TypeGraph::new();
    let node = graph.add_class_or_interface();
    let mut occurrence = SourceOccurrence::named(OriginId(1), "Element");
    occurrence.members.push(MemberFact {
        name: "broken".to_string(),
        type_id: None,
        writable: true,
        doc_lines: Vec::new(),
        call_signatures: Vec::new(),
    });

    ingest(&mut graph, node, &occurrence);

    assert!(graph.class_or_interface(node).unwrap().properties.is_empty());
}

#[test]
fn test_unresolved_return_type_drops_the_signature() {
    let mut graph = TypeGraph::new();
    let node = graph.add_class_or_interface();
    let mut occurrence = SourceOccurrence::named(OriginId(1), "Element");
    occurrence.members.push(method_member("poll", SignatureFact::default()));

    ingest(&mut graph, node, &occurrence);

    assert!(graph.class_or_interface(node).unwrap().methods.is_empty());
}

#[test]
fn test_generic_method_builds_type_parameter_nodes() {
    let mut graph = TypeGraph::new();
    let node = graph.add_class_or_interface();
    let element = graph.add_class_or_interface();
    graph.set_simple_name(element, "Element");

    let mut fact = signature(Vec::new(), NodeId::OBJECT);
    fact.type_params.push(TypeParamFact {
        name: "T".to_string(),
        constraint: Some(element),
    });
    let mut occurrence = SourceOccurrence::named(OriginId(1), "Document");
    occurrence.members.push(method_member("createElement", fact));

    ingest(&mut graph, node, &occurrence);

    let data = graph.class_or_interface(node).unwrap();
    assert_eq!(data.methods[0].type_params.len(), 1);
    let built = graph.type_parameter(data.methods[0].type_params[0]).unwrap();
    assert_eq!(graph.resolve(built.name), "T");
    assert_eq!(built.constraint, Some(element));
}

#[test]
fn test_ingest_on_non_class_node_is_a_noop() {
    let mut graph = TypeGraph::new();
    let union = graph.add_union();

    let diagnostics = ingest(&mut graph, union, &SourceOccurrence::named(OriginId(1), "Mix"));

    assert!(diagnostics.is_empty());
    assert!(graph.union(union).unwrap().members.is_empty());
}
