use crate::error::ValidationError;
use crate::hierarchy::qualify;
use crate::types::{Address, NamingEntry};
use std::collections::{HashMap, HashSet};
use std::str::FromStr;
use uuid::Uuid;

/// Check address shape. Empty input is deferred, not invalid.
pub fn validate_address(address: &str) -> Option<ValidationError> {
    let address = address.trim();
    if address.is_empty() {
        return None;
    }
    match Address::from_str(address) {
        Ok(_) => None,
        Err(_) => Some(ValidationError::InvalidAddress),
    }
}

/// Check a label (or full name) against the parent domain it will be
/// created under. Empty input is deferred, not invalid.
///
/// A value containing a dot is treated as a full name: it must end in
/// `.{parent_domain}` (case-insensitive) with a non-empty remainder.
pub fn validate_label(label: &str, parent_domain: &str) -> Option<ValidationError> {
    let label = label.trim();
    if label.is_empty() {
        return None;
    }
    let parent = parent_domain.trim().to_lowercase();
    if parent.is_empty() {
        return Some(ValidationError::MissingParent);
    }

    let lowered = label.to_lowercase();
    if lowered.split('.').any(|segment| segment.is_empty()) {
        return Some(ValidationError::MalformedName);
    }
    if lowered.chars().any(char::is_whitespace) {
        return Some(ValidationError::MalformedName);
    }

    if lowered.contains('.') {
        // The parent itself is not a valid entry: at least one label must
        // sit underneath it.
        if lowered == parent {
            return Some(ValidationError::MalformedName);
        }
        let suffix = format!(".{}", parent);
        if !lowered.ends_with(&suffix) {
            return Some(ValidationError::ParentMismatch { parent });
        }
        let remainder = &lowered[..lowered.len() - suffix.len()];
        if remainder.is_empty() {
            return Some(ValidationError::MalformedName);
        }
    }

    None
}

/// Ids of entries that collide with another live entry, either by
/// address (case-insensitive, zero placeholder exempt) or by resolved
/// full name (case-insensitive).
pub fn find_duplicates(entries: &[NamingEntry], root_name: &str) -> HashSet<Uuid> {
    let (by_address, by_name) = duplicate_sets(entries, root_name);
    by_address.union(&by_name).copied().collect()
}

fn duplicate_sets(entries: &[NamingEntry], root_name: &str) -> (HashSet<Uuid>, HashSet<Uuid>) {
    let root = root_name.trim().to_lowercase();

    let mut addresses: HashMap<String, Vec<Uuid>> = HashMap::new();
    let mut names: HashMap<String, Vec<Uuid>> = HashMap::new();
    for entry in entries {
        let address = entry.address.trim().to_lowercase();
        if !address.is_empty() {
            // The zero placeholder may legitimately appear many times.
            let is_placeholder = entry
                .parsed_address()
                .map(|a| a.is_zero())
                .unwrap_or(false);
            if !is_placeholder {
                addresses.entry(address).or_default().push(entry.id);
            }
        }
        if !entry.name.trim().is_empty() && !root.is_empty() {
            names
                .entry(qualify(&entry.name, &root))
                .or_default()
                .push(entry.id);
        }
    }

    let collect = |map: HashMap<String, Vec<Uuid>>| {
        map.into_values()
            .filter(|ids| ids.len() > 1)
            .flatten()
            .collect::<HashSet<Uuid>>()
    };
    (collect(addresses), collect(names))
}

/// Run the full validation pass over an entry set and return the
/// re-annotated entries. Pure: the input is untouched, the caller
/// replaces its working set with the result. Must be re-run whenever the
/// root name changes, since labels validate against the new parent.
pub fn validate_entries(entries: &[NamingEntry], root_name: &str) -> Vec<NamingEntry> {
    let mut out: Vec<NamingEntry> = entries
        .iter()
        .cloned()
        .map(|mut entry| {
            entry.address_error = validate_address(&entry.address);
            entry.label_error = validate_label(&entry.name, root_name);
            entry
        })
        .collect();

    let (address_dups, name_dups) = duplicate_sets(&out, root_name);
    for entry in &mut out {
        if entry.address_error.is_none() && address_dups.contains(&entry.id) {
            entry.address_error = Some(ValidationError::Duplicate);
        }
        if entry.label_error.is_none() && name_dups.contains(&entry.id) {
            entry.label_error = Some(ValidationError::Duplicate);
        }
    }
    out
}
