//! Logon response decoding.

use serde::{Deserialize, Serialize};

use crate::error::KamarError;
use crate::xml::Node;

/// A successful logon: the routing key every authenticated command needs,
/// plus the access level that selects the timetable command variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub key: String,
    pub auth_level: i32,
}

/// Access level the service assigns to teacher accounts.
pub const TEACHER_AUTH_LEVEL: i32 = 10;

/// Decode `LogonResults`. Success iff `Success[0] == "YES"`.
pub fn decode_logon(username: &str, body: &Node) -> Result<Credentials, KamarError> {
    if body.leaf("Success") != Some("YES") {
        // The envelope unwrapper catches an explicit Error pair; a refusal
        // without one still carries whatever message the service attached.
        return Err(KamarError::Remote {
            message: body
                .leaf("Error")
                .unwrap_or("logon refused")
                .to_string(),
            code: body.leaf("ErrorCode").and_then(|s| s.parse().ok()).unwrap_or(0),
        });
    }

    Ok(Credentials {
        username: username.to_string(),
        key: body.require_leaf("Key")?.to_string(),
        auth_level: body.int("LogonLevel")?,
    })
}
