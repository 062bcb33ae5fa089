//! Listing import
//!
//! Parses a line-oriented path listing into a seed node collection. Each line
//! is one `/`-separated path, optionally prefixed with `~/`:
//!
//! ```text
//! ~/projects/survey/raw data/answers 01-05-2023.csv
//! ~/projects/survey/README
//! ```
//!
//! Every segment but the last becomes a Folder, the last becomes a File.
//! Prefixes shared between lines resolve to the same folder node.

use crate::models::{Node, NodeKind};
use std::collections::HashMap;

/// Counts gathered while parsing a listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListingStats {
    /// Non-blank lines consumed
    pub lines: usize,
    pub folders: usize,
    pub files: usize,
}

/// Parse a listing into nodes in creation order
///
/// # Examples
///
/// ```rust
/// use fairtree_core::utils::parse_listing;
///
/// let nodes = parse_listing("~/data/a.csv\n~/data/b.csv\n");
/// assert_eq!(nodes.len(), 3);
/// assert_eq!(nodes[0].name, "data");
/// assert_eq!(nodes[1].parent_id, Some(nodes[0].id.clone()));
/// assert_eq!(nodes[2].parent_id, Some(nodes[0].id.clone()));
/// ```
pub fn parse_listing(text: &str) -> Vec<Node> {
    parse_listing_with_stats(text).0
}

/// Parse a listing and report what was created
pub fn parse_listing_with_stats(text: &str) -> (Vec<Node>, ListingStats) {
    let mut nodes: Vec<Node> = Vec::new();
    // full path -> index into `nodes`
    let mut existing_paths: HashMap<String, usize> = HashMap::new();
    let mut stats = ListingStats::default();

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        stats.lines += 1;

        let clean = line.strip_prefix("~/").unwrap_or(line);
        let parts: Vec<&str> = clean.split('/').collect();
        let last_index = parts.len() - 1;

        let mut parent_id: Option<String> = None;
        let mut current_path = String::new();

        for (index, part) in parts.iter().enumerate() {
            if part.is_empty() {
                continue;
            }

            let is_last = index == last_index;
            if !current_path.is_empty() {
                current_path.push('/');
            }
            current_path.push_str(part);

            if let Some(&existing) = existing_paths.get(&current_path) {
                let node = &mut nodes[existing];
                if !is_last && node.is_file() {
                    // A file cannot hold children; the later, deeper path wins
                    node.kind = NodeKind::Folder;
                    node.content = None;
                    stats.files -= 1;
                    stats.folders += 1;
                }
                parent_id = Some(node.id.clone());
                continue;
            }

            let node = if is_last {
                stats.files += 1;
                Node::new_file(*part, parent_id.take())
            } else {
                stats.folders += 1;
                Node::new_folder(*part, parent_id.take())
            };

            parent_id = Some(node.id.clone());
            existing_paths.insert(current_path.clone(), nodes.len());
            nodes.push(node);
        }
    }

    tracing::debug!(
        "Parsed listing: {} lines, {} folders, {} files",
        stats.lines,
        stats.folders,
        stats.files
    );

    (nodes, stats)
}
