use crate::types::{Batch, HierarchyNode};
use std::collections::BTreeMap;

/// Partition a resolved node set into ordered submission batches.
///
/// Nodes sharing a level and an immediate parent go together; batches
/// come out level-ascending, then parent-name-ascending within a level,
/// with members sorted by full name. Shallower names must exist on-chain
/// before anything deeper can resolve its parent, so this order is the
/// dependency order. The whole pass is a pure function of its input;
/// preview and execution both consume the exact sequence it emits.
pub fn group_batches(nodes: &[HierarchyNode]) -> Vec<Batch> {
    let mut groups: BTreeMap<(u32, String), Vec<HierarchyNode>> = BTreeMap::new();
    for node in nodes {
        groups
            .entry((node.level, node.immediate_parent.clone()))
            .or_default()
            .push(node.clone());
    }

    groups
        .into_iter()
        .map(|((level, parent_name), mut members)| {
            members.sort_by(|a, b| a.full_name.cmp(&b.full_name));
            Batch {
                parent_name,
                level,
                members,
            }
        })
        .collect()
}

/// All real (non-placeholder) nodes in the flattened order their batches
/// were produced. Reverse-record steps follow this order.
pub fn real_nodes_in_batch_order(batches: &[Batch]) -> Vec<HierarchyNode> {
    batches
        .iter()
        .flat_map(|b| b.members.iter())
        .filter(|n| !n.is_placeholder())
        .cloned()
        .collect()
}
