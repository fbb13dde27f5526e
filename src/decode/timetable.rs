//! Timetable grid decoding — the most intricate response shape.
//!
//! `TimetableData` keys weeks as `W<n>` and days as `D1`..`D5`. Each day is
//! one compact string: 8 pipe-delimited slots where slot 0 is an unused
//! header and slots 1..7 are periods 1..7. Each period is dash-delimited;
//! field 2 is the subject, field 3 the teacher, field 4 the room, with the
//! room falling back to the subject name when no room is recorded.
//!
//! Decoding needs the week index previously established by attendance; it is
//! taken as an explicit argument rather than read from ambient state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::KamarError;
use crate::xml::Node;

/// Weekday keys, Mon..Fri, in grid order.
pub const WEEKDAYS: [&str; 5] = ["MO", "TU", "WE", "TH", "FR"];

const SLOTS_PER_DAY: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimetablePeriod {
    pub subject: String,
    pub teacher: String,
    pub location: String,
}

/// One decoded week: weekday abbreviation to the ordered 7-period sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimetableWeek {
    pub week_number: u32,
    pub days: BTreeMap<String, Vec<TimetablePeriod>>,
}

/// This week and next week.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timetable {
    pub this_week: TimetableWeek,
    pub next_week: TimetableWeek,
}

/// Decode `TimetableData` for the week pair starting at `week_index`.
pub fn decode_timetable(body: &Node, week_index: u32) -> Result<Timetable, KamarError> {
    let grid = body.require("TimetableData")?;
    Ok(Timetable {
        this_week: decode_week(grid, week_index)?,
        next_week: decode_week(grid, week_index + 1)?,
    })
}

fn decode_week(grid: &Node, week_number: u32) -> Result<TimetableWeek, KamarError> {
    let key = format!("W{week_number}");
    let week = grid
        .first(&key)
        .ok_or_else(|| KamarError::decode(&key, "week not present in timetable grid"))?;

    let mut days = BTreeMap::new();
    for (d, abbr) in WEEKDAYS.iter().enumerate() {
        let raw = week.leaf(&format!("D{}", d + 1)).unwrap_or("");
        days.insert((*abbr).to_string(), decode_day(raw));
    }
    Ok(TimetableWeek { week_number, days })
}

/// Split a day string into its 8 slots (pad or truncate) and decode periods
/// 1..7. Slot 0 is the header and is dropped.
fn decode_day(raw: &str) -> Vec<TimetablePeriod> {
    let mut slots: Vec<&str> = raw.split('|').collect();
    slots.resize(SLOTS_PER_DAY, "");
    slots.truncate(SLOTS_PER_DAY);
    slots[1..].iter().map(|s| decode_period(s)).collect()
}

fn decode_period(slot: &str) -> TimetablePeriod {
    let fields: Vec<&str> = slot.split('-').collect();
    let field = |i: usize| fields.get(i).copied().unwrap_or("");

    let subject = field(2).to_string();
    let location = if field(4).is_empty() {
        subject.clone()
    } else {
        field(4).to_string()
    };
    TimetablePeriod {
        subject,
        teacher: field(3).to_string(),
        location,
    }
}
