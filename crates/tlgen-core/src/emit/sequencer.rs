//! Namespace/layer sequencer.
//!
//! Turns a sorted [`Partition`] into a flat list of block open/close events
//! around each declaration. A layer block wraps namespace blocks; a block is
//! only closed and reopened when its key changes. Unqualified definitions
//! sit directly inside their layer block.

use crate::graph::Partition;
use crate::model::Definition;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceItem<'a> {
    OpenLayer(u32),
    OpenNamespace(&'a str),
    Declare(&'a Definition),
    CloseNamespace(&'a str),
    CloseLayer(u32),
}

/// The block structure for every definition of `partition`.
pub fn sequence<'a>(partition: &'a Partition<'_>) -> Vec<SequenceItem<'a>> {
    let mut items = Vec::new();
    let mut layer: Option<u32> = None;
    let mut namespace: Option<&str> = None;

    for name in partition.namespaces() {
        for &definition in partition.definitions(name) {
            let layer_changed = layer != Some(definition.layer);
            let namespace_changed = namespace != Some(name.as_str());

            if (layer_changed || namespace_changed)
                && let Some(open) = namespace.take()
                && !open.is_empty()
            {
                items.push(SequenceItem::CloseNamespace(open));
            }
            if layer_changed {
                if let Some(open) = layer {
                    items.push(SequenceItem::CloseLayer(open));
                }
                items.push(SequenceItem::OpenLayer(definition.layer));
                layer = Some(definition.layer);
            }
            if namespace.is_none() {
                if !name.is_empty() {
                    items.push(SequenceItem::OpenNamespace(name));
                }
                namespace = Some(name);
            }

            items.push(SequenceItem::Declare(definition));
        }
    }

    if let Some(open) = namespace
        && !open.is_empty()
    {
        items.push(SequenceItem::CloseNamespace(open));
    }
    if let Some(open) = layer {
        items.push(SequenceItem::CloseLayer(open));
    }
    items
}

#[cfg(test)]
#[path = "sequencer/sequencer_tests.rs"]
mod sequencer_tests;
