//! NCEA qualification summary decoding.
//!
//! Credit cells follow the portal's blank-over-zero display policy: an
//! absent field and a zero field both render as the empty string, never
//! `"0"`. That policy is deliberate and preserved exactly.

use serde::{Deserialize, Serialize};

use crate::error::KamarError;
use crate::xml::Node;

/// The six credit columns, as display strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreditSix {
    pub not_achieved: String,
    pub achieved: String,
    pub merit: String,
    pub excellence: String,
    pub total: String,
    pub attempted: String,
}

/// This year's credit buckets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditBuckets {
    pub internal: CreditSix,
    pub external: CreditSix,
    pub total: CreditSix,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NceaSummary {
    /// Six fixed rows: Level 1/2/3 NCEA status, UE literacy, Level 1
    /// literacy, numeracy.
    pub qualifications: Vec<(String, String)>,
    pub this_year: CreditBuckets,
    /// Per-year credit rows as an HTML row block.
    pub year_table: String,
    /// Per-level credit rows as an HTML row block.
    pub level_table: String,
}

/// Decode `GetStudentNCEASummaryResults`.
pub fn decode_ncea_summary(body: &Node) -> Result<NceaSummary, KamarError> {
    let student = body.walk(&["Students", "Student"])?;
    let ncea = student.require("NCEA")?;

    let qualifications = [
        ("Level 1", "NCEAL1"),
        ("Level 2", "NCEAL2"),
        ("Level 3", "NCEAL3"),
        ("UE Literacy", "NCEAUELIT"),
        ("Level 1 Literacy", "NCEAL1LIT"),
        ("Numeracy", "NCEANUM"),
    ]
    .into_iter()
    .map(|(label, tag)| (label.to_string(), ncea.leaf(tag).unwrap_or("").to_string()))
    .collect();

    let internal = credit_six(student.first("CreditsInternal"));
    let external = credit_six(student.first("CreditsExternal"));
    let mut total = credit_six(student.first("CreditsTotal"));
    // The Total row's Merit cell reads from the internal bucket; the portal's
    // own summary page does the same, so a "corrected" value would disagree
    // with what users see there.
    total.merit = internal.merit.clone();

    Ok(NceaSummary {
        qualifications,
        this_year: CreditBuckets {
            internal,
            external,
            total,
        },
        year_table: rows(student.first("YearTotals"), "YearTotal", "Year"),
        level_table: rows(student.first("LevelTotals"), "LevelTotal", "Level"),
    })
}

/// Blank-over-zero credit cell: absent, empty, and `"0"` all render empty.
fn cell(node: Option<&Node>, tag: &str) -> String {
    match node.and_then(|n| n.leaf(tag)) {
        Some(s) if !s.is_empty() && s != "0" => s.to_string(),
        _ => String::new(),
    }
}

fn credit_six(node: Option<&Node>) -> CreditSix {
    CreditSix {
        not_achieved: cell(node, "NotAchieved"),
        achieved: cell(node, "Achieved"),
        merit: cell(node, "Merit"),
        excellence: cell(node, "Excellence"),
        total: cell(node, "Total"),
        attempted: cell(node, "Attempted"),
    }
}

/// Render a totals table as one HTML row per period: the period label then
/// the six credit columns, blank-over-zero throughout.
fn rows(parent: Option<&Node>, row_tag: &str, label_tag: &str) -> String {
    let Some(parent) = parent else {
        return String::new();
    };

    parent
        .all(row_tag)
        .iter()
        .map(|row| {
            let row = Some(row);
            let cells = [
                cell(row, label_tag),
                cell(row, "NotAchieved"),
                cell(row, "Achieved"),
                cell(row, "Merit"),
                cell(row, "Excellence"),
                cell(row, "Total"),
                cell(row, "Attempted"),
            ];
            format!(
                "<tr>{}</tr>",
                cells
                    .iter()
                    .map(|c| format!("<td>{c}</td>"))
                    .collect::<String>()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
