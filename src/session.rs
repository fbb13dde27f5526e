//! Per-user session configuration and sequencing state.

use serde::{Deserialize, Serialize};
use url::Url;

/// The user agent the service whitelists for API access.
pub const DEFAULT_USER_AGENT: &str = "KAMAR/1548 CFNetwork/897.15 Darwin/17.5.0";

/// Configuration for one portal user, plus the single piece of
/// call-sequencing state: `week_index` is written by the attendance path and
/// read by the timetable path. A `Session` is therefore not safe for
/// concurrent overlapping use; serialize attendance-then-timetable per
/// session, or give each concurrent user their own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Portal host, e.g. `demo.school.nz`.
    pub portal: String,
    /// Calendar year the timetable grid belongs to.
    pub year: i32,
    /// Named scheduling configuration, e.g. `2024TT`.
    pub timetable_grid_id: String,
    pub user_agent: String,
    /// 1-based ordinal of the current school week. Established by decoding
    /// attendance; unset on a fresh session.
    pub week_index: Option<u32>,
}

impl Session {
    pub fn new(
        portal: impl Into<String>,
        year: i32,
        timetable_grid_id: impl Into<String>,
    ) -> Self {
        Session {
            portal: portal.into(),
            year,
            timetable_grid_id: timetable_grid_id.into(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            week_index: None,
        }
    }

    /// API endpoint all commands POST to.
    pub fn api_url(&self) -> String {
        format!("https://{}/api/api.php", self.portal)
    }

    /// Photo endpoint for a student, keyed by the logon key.
    pub fn photo_url(&self, key: &str, student_id: &str) -> String {
        let mut url = match Url::parse(&format!("https://{}/api/img.php", self.portal)) {
            Ok(url) => url,
            // Unparseable hosts only arise from caller-supplied config;
            // fall back to the plain endpoint rather than panic.
            Err(_) => return format!("https://{}/api/img.php", self.portal),
        };
        url.query_pairs_mut()
            .append_pair("Key", key)
            .append_pair("StudentID", student_id);
        url.to_string()
    }
}
