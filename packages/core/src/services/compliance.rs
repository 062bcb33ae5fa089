//! Compliance Scorer
//!
//! Scores every node name against a fixed set of naming rules and produces
//! an aggregate 0-100 score with an ordered issue list. The scorer is a pure
//! function of the collection: it holds no state and never fails.
//!
//! # Rules
//!
//! Each node starts at 100:
//!
//! | Rule                 | Penalty | Applies to |
//! |----------------------|---------|------------|
//! | contains a space     | 20      | all        |
//! | special characters   | 20      | all        |
//! | non-canonical date   | 20      | all        |
//! | no `.` in the name   | 30      | files      |
//! | shorter than 3 units | 10      | all        |
//! | longer than 50 units | 10      | all        |
//!
//! The per-node score is floored at 0 and the aggregate is the rounded mean.

use crate::models::{Node, NodeKind};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

const PERFECT_SCORE: u32 = 100;
const MIN_NAME_UNITS: usize = 3;
const MAX_NAME_UNITS: usize = 50;

/// Anything shaped like a date: `YYYY?MM?DD` or `DD?MM?YYYY` with `-._/` separators
static LOOSE_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[0-9]{4}[-._/][0-9]{2}[-._/][0-9]{2}|[0-9]{2}[-._/][0-9]{2}[-._/][0-9]{4}")
        .unwrap()
});

/// Canonical dates: `YYYY-MM-DD` or `YYYY_MM_DD`
static STRICT_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]{4}-[0-9]{2}-[0-9]{2}|[0-9]{4}_[0-9]{2}_[0-9]{2}").unwrap());

static SPECIAL_CHARACTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9._-]").unwrap());

/// How serious an issue is for display purposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// Category of a naming issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueCategory {
    ContainsSpaces,
    SpecialCharacters,
    BadDateFormat,
    MissingExtension,
    TooShort,
    TooLong,
}

impl IssueCategory {
    /// Sort key for the report; lower sorts first
    pub fn priority(&self) -> u8 {
        match self {
            IssueCategory::ContainsSpaces => 0,
            IssueCategory::BadDateFormat => 1,
            IssueCategory::SpecialCharacters => 2,
            IssueCategory::MissingExtension => 3,
            IssueCategory::TooShort | IssueCategory::TooLong => 4,
        }
    }

    /// Points deducted from the node's score
    pub fn penalty(&self) -> u32 {
        match self {
            IssueCategory::ContainsSpaces
            | IssueCategory::SpecialCharacters
            | IssueCategory::BadDateFormat => 20,
            IssueCategory::MissingExtension => 30,
            IssueCategory::TooShort | IssueCategory::TooLong => 10,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            IssueCategory::ContainsSpaces => "Contains spaces (use underscores or hyphens)",
            IssueCategory::SpecialCharacters => "Contains special characters",
            IssueCategory::BadDateFormat => {
                "Uses the wrong date format (use YYYY-MM-DD or YYYY_MM_DD)"
            }
            IssueCategory::MissingExtension => "Missing file extension",
            IssueCategory::TooShort => "Name is too short",
            IssueCategory::TooLong => "Name is too long",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            IssueCategory::TooShort | IssueCategory::TooLong => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

/// One rule violation on one node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceIssue {
    pub node_id: String,
    pub name: String,
    pub category: IssueCategory,
    pub message: String,
}

/// Result of applying the rules to a single name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameCheck {
    /// Per-node score, floored at 0
    pub score: u32,
    /// Violations in rule order
    pub issues: Vec<IssueCategory>,
}

impl NameCheck {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Coarse band of the aggregate score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreGrade {
    Excellent,
    Fair,
    Poor,
}

impl ScoreGrade {
    pub fn from_score(score: u8) -> Self {
        match score {
            90.. => ScoreGrade::Excellent,
            70..=89 => ScoreGrade::Fair,
            _ => ScoreGrade::Poor,
        }
    }
}

/// Aggregate score and ordered issue list for a collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceReport {
    /// Rounded mean of per-node scores, 100 for an empty collection
    pub score: u8,
    pub grade: ScoreGrade,
    pub nodes_checked: usize,
    /// Sorted by category priority, emission order within a category
    pub issues: Vec<ComplianceIssue>,
}

impl ComplianceReport {
    pub fn summary(&self) -> &'static str {
        if self.score == 100 {
            "Excellent! Your file names follow best practices."
        } else {
            "Some file names could be improved."
        }
    }
}

/// Apply every naming rule to `name`
///
/// # Examples
///
/// ```rust
/// use fairtree_core::models::NodeKind;
/// use fairtree_core::services::{check_name, IssueCategory};
///
/// let check = check_name("My File", NodeKind::File);
/// assert_eq!(check.score, 50);
/// assert_eq!(
///     check.issues,
///     vec![IssueCategory::ContainsSpaces, IssueCategory::MissingExtension]
/// );
/// ```
pub fn check_name(name: &str, kind: NodeKind) -> NameCheck {
    let mut issues = Vec::new();

    if name.contains(' ') {
        issues.push(IssueCategory::ContainsSpaces);
    }

    let without_spaces = name.replace(' ', "");
    if SPECIAL_CHARACTER.is_match(&without_spaces) {
        issues.push(IssueCategory::SpecialCharacters);
    }

    if LOOSE_DATE.is_match(name) && !STRICT_DATE.is_match(name) {
        issues.push(IssueCategory::BadDateFormat);
    }

    if kind == NodeKind::File && !name.contains('.') {
        issues.push(IssueCategory::MissingExtension);
    }

    // UTF-16 code units, so astral characters count twice
    let length = name.encode_utf16().count();
    if length < MIN_NAME_UNITS {
        issues.push(IssueCategory::TooShort);
    } else if length > MAX_NAME_UNITS {
        issues.push(IssueCategory::TooLong);
    }

    let deducted: u32 = issues.iter().map(IssueCategory::penalty).sum();

    NameCheck {
        score: PERFECT_SCORE.saturating_sub(deducted),
        issues,
    }
}

/// Score a collection of nodes
pub fn score_nodes<'a, I>(nodes: I) -> ComplianceReport
where
    I: IntoIterator<Item = &'a Node>,
{
    let mut total: u64 = 0;
    let mut nodes_checked = 0usize;
    let mut issues = Vec::new();

    for node in nodes {
        let check = check_name(&node.name, node.kind);
        total += u64::from(check.score);
        nodes_checked += 1;

        issues.extend(check.issues.into_iter().map(|category| ComplianceIssue {
            node_id: node.id.clone(),
            name: node.name.clone(),
            category,
            message: category.message().to_string(),
        }));
    }

    // Vec::sort_by_key is stable
    issues.sort_by_key(|issue| issue.category.priority());

    let score = if nodes_checked == 0 {
        PERFECT_SCORE as u8
    } else {
        let n = nodes_checked as u64;
        // Half-up rounding of total / n
        ((2 * total + n) / (2 * n)) as u8
    };

    tracing::debug!(
        "Scored {} nodes: {} ({} issues)",
        nodes_checked,
        score,
        issues.len()
    );

    ComplianceReport {
        score,
        grade: ScoreGrade::from_score(score),
        nodes_checked,
        issues,
    }
}
