//! Academic results decoding and grade normalization.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::KamarError;
use crate::xml::Node;

/// Normalized grade. Classification is first-match over the raw grade text;
/// anything unmatched is `Unknown`, which is a value, never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "E")]
    Excellence,
    #[serde(rename = "M")]
    Merit,
    #[serde(rename = "N")]
    NotAchieved,
    #[serde(rename = "A")]
    Achieved,
    Unknown,
}

/// Classify a raw grade string. First match wins, in this order:
/// Excellence, Merit, Not, Achieve(ment|d).
pub fn normalize_grade(raw: &str) -> Grade {
    static ACHIEVE_RE: OnceLock<Regex> = OnceLock::new();
    let achieve = ACHIEVE_RE.get_or_init(|| Regex::new(r"Achieve(ment|d)").unwrap());

    if raw.contains("Excellence") {
        Grade::Excellence
    } else if raw.contains("Merit") {
        Grade::Merit
    } else if raw.contains("Not") {
        Grade::NotAchieved
    } else if achieve.is_match(raw) {
        Grade::Achieved
    } else {
        log::debug!("unclassified grade text: {raw:?}");
        Grade::Unknown
    }
}

/// One decoded standard result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultRecord {
    pub title: String,
    pub raw_grade: String,
    pub grade: Grade,
    pub date_published: String,
    /// `"<Number> v<Version>"` for NCEA levels, else empty.
    pub standard_id: String,
    /// `"<passed>/<total>"` when total credits are non-zero, else empty.
    pub credits: String,
    /// `"Level <N>"` for NCEA levels, else empty.
    pub ncea_level_label: String,
}

/// Decoded result levels: an is-NCEA flag per level and the level's records,
/// index-aligned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultLevels {
    pub is_ncea: Vec<bool>,
    pub levels: Vec<Vec<ResultRecord>>,
}

/// Decode `StudentResultsResults`.
pub fn decode_results(body: &Node) -> Result<ResultLevels, KamarError> {
    let mut is_ncea = Vec::new();
    let mut levels = Vec::new();

    for level in body.require("ResultLevels")?.all("ResultLevel") {
        let ncea_level = level.int("NCEALevel")?;
        let ncea = ncea_level != 0;

        let mut records = Vec::new();
        let results = level.first("Results").map(|r| r.all("Result")).unwrap_or(&[]);
        for result in results {
            records.push(decode_record(result, ncea, ncea_level)?);
        }

        is_ncea.push(ncea);
        levels.push(records);
    }

    Ok(ResultLevels { is_ncea, levels })
}

fn decode_record(result: &Node, ncea: bool, ncea_level: i32) -> Result<ResultRecord, KamarError> {
    let raw_grade = result.leaf("Grade").unwrap_or("").to_string();

    let total = result.int("CreditsTotal")?;
    let credits = if total != 0 {
        format!("{}/{}", result.int("CreditsPassed")?, total)
    } else {
        String::new()
    };

    let (standard_id, ncea_level_label) = if ncea {
        (
            format!(
                "{} v{}",
                result.leaf("Number").unwrap_or(""),
                result.leaf("Version").unwrap_or("")
            ),
            format!("Level {ncea_level}"),
        )
    } else {
        (String::new(), String::new())
    };

    Ok(ResultRecord {
        title: result.leaf("Title").unwrap_or("").to_string(),
        grade: normalize_grade(&raw_grade),
        raw_grade,
        date_published: result.leaf("Date").unwrap_or("").to_string(),
        standard_id,
        credits,
        ncea_level_label,
    })
}
