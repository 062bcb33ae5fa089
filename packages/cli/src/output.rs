//! Text rendering for CLI commands.
//!
//! Renderers return `String` so they can be tested without capturing stdout.

use fairtree_core::config::ViewMode;
use fairtree_core::models::Node;
use fairtree_core::services::{ComplianceReport, Severity, TreeStore, TreeStoreError};
use std::fmt::Write;

const GRID_COLUMNS: usize = 4;
const GRID_CELL_WIDTH: usize = 24;

fn display_name(node: &Node) -> String {
    if node.is_folder() {
        format!("{}/", node.name)
    } else {
        node.name.clone()
    }
}

/// Whole collection as an indented tree, children in insertion order
///
/// Subtrees whose parent is missing (possible in lenient mode) are listed
/// under a trailing `(detached)` heading so no node is hidden.
pub fn render_tree(store: &TreeStore) -> String {
    let mut out = String::new();
    for node in store.children_of(None) {
        render_subtree(store, node, 0, &mut out);
    }

    let detached: Vec<&Node> = store
        .nodes()
        .iter()
        .filter(|n| n.parent_id.as_deref().is_some_and(|p| !store.contains(p)))
        .collect();
    if !detached.is_empty() {
        out.push_str("(detached)\n");
        for node in detached {
            render_subtree(store, node, 1, &mut out);
        }
    }

    if out.is_empty() {
        out.push_str("(empty)\n");
    }
    out
}

fn render_subtree(store: &TreeStore, node: &Node, depth: usize, out: &mut String) {
    let _ = writeln!(out, "{}{}", "  ".repeat(depth), display_name(node));
    for child in store.children_of(Some(&node.id)) {
        render_subtree(store, child, depth + 1, out);
    }
}

/// Folder contents in the configured view mode
pub fn render_listing(nodes: &[&Node], view_mode: ViewMode) -> String {
    if nodes.is_empty() {
        return "(empty)\n".to_string();
    }

    let mut out = String::new();
    match view_mode {
        ViewMode::Grid => {
            for row in nodes.chunks(GRID_COLUMNS) {
                let cells: Vec<String> = row
                    .iter()
                    .map(|n| format!("{:<width$}", display_name(n), width = GRID_CELL_WIDTH))
                    .collect();
                let _ = writeln!(out, "{}", cells.concat().trim_end());
            }
        }
        ViewMode::List => {
            for node in nodes {
                let _ = writeln!(
                    out,
                    "{:<6} {}  {}  {}",
                    node.kind,
                    node.created_at.format("%Y-%m-%d %H:%M"),
                    node.id,
                    display_name(node)
                );
            }
        }
    }
    out
}

/// Breadcrumb line followed by one `name  id` line per segment
pub fn render_path(path: &[&Node]) -> String {
    let mut out = String::from("/");
    let names: Vec<&str> = path.iter().map(|n| n.name.as_str()).collect();
    out.push_str(&names.join(" > "));
    out.push('\n');

    for node in path {
        let _ = writeln!(out, "  {:<32} {}", display_name(node), node.id);
    }
    out
}

/// Human-readable compliance report
pub fn render_report(report: &ComplianceReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Score: {}/100 ({:?})", report.score, report.grade);
    let _ = writeln!(out, "{}", report.summary());
    let _ = writeln!(out, "Checked {} nodes", report.nodes_checked);

    for issue in &report.issues {
        let marker = match issue.category.severity() {
            Severity::Error => "✗",
            Severity::Warning => "⚠",
        };
        let _ = writeln!(out, "  {} {}: {}", marker, issue.name, issue.message);
    }
    out
}

/// Print a success message
pub fn print_success(msg: &str) {
    println!("✓ {}", msg);
}

/// One-line description of a failed command
///
/// Rejections the user can act on (bad move, unknown node, blank name) are
/// shown as notices; everything else is an error with its full cause chain.
pub fn render_failure(err: &anyhow::Error) -> String {
    match err.downcast_ref::<TreeStoreError>() {
        Some(notice) if notice.is_user_facing() => format!("⚠ {}", notice),
        _ => format!("✗ {:#}", err),
    }
}

/// Print a failed command to stderr
pub fn print_failure(err: &anyhow::Error) {
    eprintln!("{}", render_failure(err));
}
