//! Command building and dispatch.
//!
//! `dispatch` is the single async boundary: serialize the command as form
//! data, POST it, parse the XML body, unwrap the envelope. Everything after
//! that — the per-shape decoders — is synchronous and pure.

use crate::envelope::{unwrap_envelope, Envelope};
use crate::error::KamarError;
use crate::session::Session;
use crate::transport::Transport;
use crate::xml::Node;

/// Fixed key for the two commands that work without a logon
/// (`Logon` itself and `GetCalendar`).
pub const BOOTSTRAP_KEY: &str = "vtku";

/// One outbound command: a name plus its extra form fields.
/// `Command` and the routing `Key` are always added at dispatch time.
#[derive(Debug, Clone)]
pub struct Command {
    name: String,
    fields: Vec<(String, String)>,
}

impl Command {
    pub fn new(name: impl Into<String>) -> Self {
        Command {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((key.into(), value.into()));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The full form body for this command under the given routing key.
    pub fn form(&self, key: &str) -> Vec<(String, String)> {
        let mut form = Vec::with_capacity(self.fields.len() + 2);
        form.push(("Command".to_string(), self.name.clone()));
        form.push(("Key".to_string(), key.to_string()));
        form.extend(self.fields.iter().cloned());
        form
    }
}

/// Send one command and return the unwrapped result element.
///
/// Transport failures surface as-is; a body that fails to parse is a decode
/// error; an `Error`/`ErrorCode` pair on the result element is a remote
/// error. Otherwise the caller picks the decoder matching `result_key`.
pub async fn dispatch(
    session: &Session,
    transport: &dyn Transport,
    key: &str,
    command: &Command,
) -> Result<Envelope, KamarError> {
    let url = session.api_url();
    log::debug!("dispatch {} -> {url}", command.name());

    let body = transport
        .send(&url, &command.form(key), &session.user_agent)
        .await?;
    let root = Node::parse(&body)?;
    unwrap_envelope(root)
}
