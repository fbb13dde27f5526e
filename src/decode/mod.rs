//! Response decoders, one per result shape.
//!
//! All decoders are pure and synchronous: they consume an unwrapped result
//! element (see [`crate::envelope`]) plus any explicit parameters, and build
//! a typed record. Structural mismatches propagate as decode errors; the two
//! documented lenient policies (blank-over-missing credit cells and
//! Unknown-over-unmatched grades) are the only exceptions.

pub mod attendance;
pub mod auth;
pub mod details;
pub mod ncea;
pub mod results;
pub mod search;
pub mod timetable;
