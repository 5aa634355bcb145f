//! Filename-based instance selection.

use crate::error::{BridgeError, Result};
use crate::registry::{InstanceMap, InstanceRecord};
use binja_protocol::SelectionMatch;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Exact matches first, then by filename, then by id.
    pub matches: Vec<SelectionMatch>,
    pub selected: String,
}

/// Case-insensitive substring match of `query` against every instance's filename.
///
/// A match is exact when the query equals the full filename or its basename. An empty query
/// is a substring of every filename.
pub fn select(instances: &InstanceMap, query: &str) -> Result<Selection> {
    let needle = query.to_lowercase();

    let mut matches: Vec<SelectionMatch> = instances
        .values()
        .filter_map(|record| match_record(record, &needle))
        .collect();

    if matches.is_empty() {
        return Err(BridgeError::NoMatch {
            query: query.to_string(),
            available: instances
                .values()
                .map(|record| record.filename.clone())
                .collect(),
        });
    }

    matches.sort_by(|a, b| {
        b.exact_match
            .cmp(&a.exact_match)
            .then_with(|| a.filename.cmp(&b.filename))
            .then_with(|| a.binary_id.cmp(&b.binary_id))
    });
    let selected = matches[0].binary_id.clone();
    Ok(Selection { matches, selected })
}

fn match_record(record: &InstanceRecord, needle: &str) -> Option<SelectionMatch> {
    let filename = record.filename.to_lowercase();
    if !filename.contains(needle) {
        return None;
    }
    let exact = filename == needle || record.display_name.to_lowercase() == needle;
    Some(SelectionMatch {
        binary_id: record.id.clone(),
        filename: record.filename.clone(),
        port: record.port,
        exact_match: exact,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::instance_id_for_port;
    use pretty_assertions::assert_eq;
    use serde_json::Value;

    fn instances(files: &[(u16, &str)]) -> InstanceMap {
        files
            .iter()
            .map(|(port, filename)| {
                let id = instance_id_for_port(*port);
                let display_name = filename.rsplit('/').next().unwrap_or(filename).to_string();
                (
                    id.clone(),
                    InstanceRecord {
                        id,
                        url: format!("http://localhost:{port}"),
                        port: *port,
                        filename: filename.to_string(),
                        display_name,
                        last_seen_ms: 0,
                        status: Value::Null,
                    },
                )
            })
            .collect()
    }

    #[test]
    fn substring_matches_are_ordered_by_filename() {
        let map = instances(&[(9010, "ab.exe"), (9009, "a.exe")]);
        let selection = select(&map, "a").expect("match");
        let names: Vec<_> = selection.matches.iter().map(|m| m.filename.as_str()).collect();
        assert_eq!(names, vec!["a.exe", "ab.exe"]);
        assert_eq!(selection.selected, "port_9009");
        assert!(selection.matches.iter().all(|m| !m.exact_match));
    }

    #[test]
    fn exact_match_wins_over_earlier_filename() {
        let map = instances(&[(9009, "/bins/a.exe"), (9010, "/bins/notepad.exe"), (9011, "notepad.exe.bak")]);
        let selection = select(&map, "NOTEPAD.EXE").expect("match");
        assert_eq!(selection.selected, "port_9010");
        assert!(selection.matches[0].exact_match);
        assert_eq!(selection.matches.len(), 2);
        assert!(!selection.matches[1].exact_match);
    }

    #[test]
    fn equal_filenames_tie_break_on_id() {
        let map = instances(&[(9012, "same.bin"), (9010, "same.bin")]);
        let selection = select(&map, "same.bin").expect("match");
        assert_eq!(selection.selected, "port_9010");
        assert_eq!(selection.matches[1].binary_id, "port_9012");
    }

    #[test]
    fn no_match_lists_available_filenames() {
        let map = instances(&[(9009, "a.exe"), (9010, "b.dll")]);
        assert_eq!(
            select(&map, "kernel"),
            Err(BridgeError::NoMatch {
                query: "kernel".to_string(),
                available: vec!["a.exe".to_string(), "b.dll".to_string()],
            })
        );
    }

    #[test]
    fn empty_query_matches_every_instance() {
        let map = instances(&[(9010, "b.dll"), (9009, "a.exe")]);
        let selection = select(&map, "").expect("match");
        let names: Vec<_> = selection.matches.iter().map(|m| m.filename.as_str()).collect();
        assert_eq!(names, vec!["a.exe", "b.dll"]);
        assert_eq!(selection.selected, "port_9009");
        assert!(selection.matches.iter().all(|m| !m.exact_match));
    }

    #[test]
    fn query_whitespace_is_part_of_the_needle() {
        let map = instances(&[(9009, "a.exe")]);
        assert!(matches!(select(&map, " a.exe "), Err(BridgeError::NoMatch { .. })));
    }

    #[test]
    fn empty_query_without_instances_is_no_match() {
        assert_eq!(
            select(&InstanceMap::new(), ""),
            Err(BridgeError::NoMatch {
                query: String::new(),
                available: Vec::new(),
            })
        );
    }
}
