//! Typed client for the KAMAR school-management command/XML API.
//!
//! The service speaks a command protocol: every call is one form-encoded
//! POST carrying a `Command` name and a routing `Key`, answered with an XML
//! document whose single top-level element names the result shape and whose
//! leaf scalars are each wrapped in a one-element sequence. This crate turns
//! those irregular payloads into stable records: attendance, timetable,
//! academic results, NCEA summaries, personal details, student search.
//!
//! The decoders are pure and synchronous; [`dispatch`] is the only async
//! boundary. One sequencing rule spans two of them: decoding the timetable
//! needs the school-week index that decoding attendance establishes. The
//! [`client::Kamar`] façade tracks that for you; the decoders themselves
//! take it as an explicit argument.

pub mod client;
pub mod decode;
pub mod dispatch;
pub mod envelope;
pub mod error;
pub mod session;
pub mod transport;
pub mod vcard;
pub mod xml;

pub use client::Kamar;
pub use decode::attendance::{Attendance, WeekAttendance, DAY_PLACEHOLDER};
pub use decode::auth::Credentials;
pub use decode::details::PersonalDetails;
pub use decode::ncea::NceaSummary;
pub use decode::results::{Grade, ResultLevels, ResultRecord};
pub use decode::search::StudentMatch;
pub use decode::timetable::{Timetable, TimetablePeriod, TimetableWeek};
pub use dispatch::{Command, BOOTSTRAP_KEY};
pub use envelope::Envelope;
pub use error::KamarError;
pub use session::Session;
pub use transport::{HttpTransport, Transport};
