use crate::types::{Address, HierarchyNode, NamingEntry};
use std::collections::BTreeMap;

/// Normalize `name` to a lowercase full name under `root`.
///
/// A name already ending in the root passes through; a bare label (or a
/// partial path) gets the root appended.
pub fn qualify(name: &str, root: &str) -> String {
    let name = name.trim().to_lowercase();
    let root = root.trim().to_lowercase();
    if name == root || name.ends_with(&format!(".{}", root)) {
        name
    } else {
        format!("{}.{}", name, root)
    }
}

/// Hierarchy depth of `full_name` relative to `root`: label count of the
/// name minus label count of the root. The root itself is level 0.
pub fn level_of(full_name: &str, root: &str) -> u32 {
    let name_labels = full_name.split('.').count();
    let root_labels = root.split('.').count();
    name_labels.saturating_sub(root_labels) as u32
}

/// Full name one label shallower.
pub fn parent_of(full_name: &str) -> String {
    match full_name.split_once('.') {
        Some((_, rest)) => rest.to_string(),
        None => String::new(),
    }
}

/// Resolve the final node set for one planning pass.
///
/// Explicit entries are merged with synthesized placeholder ancestors so
/// that every node's parent chain down to the root exists. The output is
/// keyed and ordered by full name, which makes the pass deterministic:
/// the same input set always yields the identical node list. Nothing is
/// persisted between passes; callers re-run this on every input change.
pub fn resolve_hierarchy(root_name: &str, entries: &[NamingEntry]) -> Vec<HierarchyNode> {
    let root = root_name.trim().to_lowercase();
    if root.is_empty() {
        return Vec::new();
    }

    // Explicit nodes first; they win over placeholders for the same name.
    let mut nodes: BTreeMap<String, HierarchyNode> = BTreeMap::new();
    for entry in entries.iter().filter(|e| e.is_valid()) {
        let address = match entry.parsed_address() {
            Some(addr) => addr,
            None => continue,
        };
        let full_name = qualify(&entry.name, &root);
        let level = level_of(&full_name, &root);
        if level == 0 {
            // The root itself is never a member of its own plan.
            continue;
        }
        nodes.insert(
            full_name.clone(),
            HierarchyNode {
                immediate_parent: parent_of(&full_name),
                full_name,
                address,
                level,
            },
        );
    }

    // Walk every strict intermediate ancestor between each node and the
    // root; any ancestor without an explicit entry becomes a placeholder.
    let explicit: Vec<String> = nodes.keys().cloned().collect();
    for full_name in &explicit {
        let mut ancestor = parent_of(full_name);
        while ancestor != root && !ancestor.is_empty() {
            if !nodes.contains_key(&ancestor) {
                nodes.insert(
                    ancestor.clone(),
                    HierarchyNode {
                        full_name: ancestor.clone(),
                        address: Address::ZERO,
                        level: level_of(&ancestor, &root),
                        immediate_parent: parent_of(&ancestor),
                    },
                );
            }
            ancestor = parent_of(&ancestor);
        }
    }

    nodes.into_values().collect()
}
