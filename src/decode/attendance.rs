//! Attendance and absence-statistics decoding.
//!
//! Attendance is also where the week index comes from: the number of decoded
//! weeks is the 1-based ordinal of the current school week, which the
//! timetable decoder needs. The decoder reports it in its output; only the
//! client façade writes it into the session.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::KamarError;
use crate::xml::Node;

/// Status string for a day with no recorded periods.
pub const DAY_PLACEHOLDER: &str = "-------";

/// One school week: the Monday date plus a 7-character per-period status
/// code string for each weekday, Mon..Fri.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeekAttendance {
    pub week_start: String,
    pub days: [String; 5],
}

/// Decoded attendance plus the week index it establishes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attendance {
    pub weeks: Vec<WeekAttendance>,
    pub week_index: u32,
}

/// Decode `StudentAttendanceResults`.
///
/// A response without `Weeks` means attendance is not configured for this
/// portal; that surfaces as a recoverable state error and the caller should
/// assume week 1.
pub fn decode_attendance(body: &Node) -> Result<Attendance, KamarError> {
    let Some(weeks_node) = body.first("Weeks") else {
        return Err(KamarError::state_recoverable(
            "no attendance configured, assuming week 1",
        ));
    };

    let mut weeks = Vec::new();
    for week in weeks_node.all("Week") {
        let week_start = week.require_leaf("WeekStart")?.to_string();
        let slots = week.first("Days").map(|d| d.all("Day")).unwrap_or(&[]);
        let days = std::array::from_fn(|i| {
            fit_seven(slots.get(i).map(Node::text).unwrap_or(DAY_PLACEHOLDER))
        });
        weeks.push(WeekAttendance { week_start, days });
    }

    let week_index = weeks.len() as u32;
    Ok(Attendance { weeks, week_index })
}

/// Decode `StudentAbsenceStatsResults` into the first student record,
/// verbatim. The upstream shape is already a flat field map.
pub fn decode_absence_stats(body: &Node) -> Result<BTreeMap<String, String>, KamarError> {
    let records = body.int("NumberRecords")?;
    if records == 0 {
        return Err(KamarError::decode("NumberRecords", "no absence records"));
    }
    Ok(body.walk(&["Students", "Student"])?.fields())
}

/// Force a status code to exactly 7 characters.
fn fit_seven(s: &str) -> String {
    let mut out: String = s.chars().take(7).collect();
    while out.chars().count() < 7 {
        out.push('-');
    }
    out
}
