//! Envelope unwrapping.
//!
//! Every KAMAR response is a document with a single top-level result element
//! (`LogonResults`, `StudentAttendanceResults`, ...). A remote-reported
//! failure puts an `Error`/`ErrorCode` pair directly on that element, in any
//! response kind, and must win over shape decoding.

use crate::error::KamarError;
use crate::xml::Node;

/// An unwrapped response: the result element's tag plus its body.
#[derive(Debug, Clone)]
pub struct Envelope {
    pub result_key: String,
    pub body: Node,
}

/// Locate the sole top-level result element and check the error pair.
pub fn unwrap_envelope(root: Node) -> Result<Envelope, KamarError> {
    let (result_key, body) = root.into_sole_child()?;

    if let Some(message) = body.leaf("Error") {
        let code = body
            .leaf("ErrorCode")
            .and_then(|s| s.parse().ok())
            .unwrap_or(0);
        return Err(KamarError::Remote {
            message: message.to_string(),
            code,
        });
    }

    Ok(Envelope { result_key, body })
}
