#![allow(non_snake_case)]

use super::*;
use crate::graph;
use crate::model::{QualifiedName, TypeRef};

fn def(full_name: &str, layer: u32) -> Definition {
    Definition::new(
        full_name,
        TypeRef::Boxed(QualifiedName::parse("Thing")),
        false,
        layer,
    )
}

fn render(items: &[SequenceItem<'_>]) -> Vec<String> {
    items
        .iter()
        .map(|item| match item {
            SequenceItem::OpenLayer(layer) => format!("+L{layer}"),
            SequenceItem::OpenNamespace(ns) => format!("+{ns}"),
            SequenceItem::Declare(d) => d.full_name(),
            SequenceItem::CloseNamespace(ns) => format!("-{ns}"),
            SequenceItem::CloseLayer(layer) => format!("-L{layer}"),
        })
        .collect()
}

fn sequenced(defs: &[Definition]) -> Vec<String> {
    let graph = graph::build(defs);
    render(&sequence(&graph.types))
}

#[test]
fn sequence___empty_partition___no_items() {
    assert!(sequenced(&[]).is_empty());
}

#[test]
fn sequence___single_namespace_single_layer___opened_once() {
    let items = sequenced(&[def("help.a", 1), def("help.b", 1)]);

    assert_eq!(items, vec!["+L1", "+help", "help.a", "help.b", "-help", "-L1"]);
}

#[test]
fn sequence___unqualified___no_namespace_block() {
    let items = sequenced(&[def("ping", 1), def("pong", 1)]);

    assert_eq!(items, vec!["+L1", "ping", "pong", "-L1"]);
}

#[test]
fn sequence___same_namespace_two_layers___separate_blocks_namespace_reopened() {
    let items = sequenced(&[def("help.b", 2), def("help.a", 1)]);

    assert_eq!(
        items,
        vec!["+L1", "+help", "help.a", "-help", "-L1", "+L2", "+help", "help.b", "-help", "-L2"]
    );
}

#[test]
fn sequence___namespace_change_same_layer___layer_kept_open() {
    let items = sequenced(&[def("auth.a", 1), def("b", 1), def("help.c", 1)]);

    assert_eq!(
        items,
        vec!["+L1", "+auth", "auth.a", "-auth", "b", "+help", "help.c", "-help", "-L1"]
    );
}

#[test]
fn sequence___every_open___closed_exactly_once() {
    let defs = [
        def("help.a", 1),
        def("c", 2),
        def("help.b", 3),
        def("auth.x", 3),
        def("d", 1),
    ];
    let graph = graph::build(&defs);

    let items = sequence(&graph.types);

    let mut depth: i32 = 0;
    for item in &items {
        match item {
            SequenceItem::OpenLayer(_) | SequenceItem::OpenNamespace(_) => depth += 1,
            SequenceItem::CloseLayer(_) | SequenceItem::CloseNamespace(_) => depth -= 1,
            SequenceItem::Declare(_) => assert!(depth >= 1),
        }
        assert!(depth >= 0);
    }
    assert_eq!(depth, 0);
    let declared = items
        .iter()
        .filter(|i| matches!(i, SequenceItem::Declare(_)))
        .count();
    assert_eq!(declared, defs.len());
}
