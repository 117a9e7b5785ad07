use std::fmt;

use crate::error::{Result, SessionError};

/// Every server greeting is an XML service description.
pub const GREETING_PREFIX: &str = "<?xml";

/// Channels requested when none are configured: local quaternion and
/// positional constraint.
pub const DEFAULT_CHANNELS: [&str; 2] = ["Lq", "c"];

/// Channel selection sent to the server right after the greeting.
///
/// Serializes to `<configurable>` with one empty element per channel, in
/// request order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurableRequest {
    channels: Vec<String>,
}

impl ConfigurableRequest {
    /// Requested channel names.
    pub fn channels(&self) -> &[String] {
        &self.channels
    }

    /// The wire payload for this request.
    pub fn to_xml(&self) -> String {
        self.to_string()
    }
}

impl Default for ConfigurableRequest {
    fn default() -> Self {
        Self {
            channels: DEFAULT_CHANNELS.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl fmt::Display for ConfigurableRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<configurable>")?;
        for channel in &self.channels {
            write!(f, "<{channel}/>")?;
        }
        f.write_str("</configurable>")
    }
}

/// Check that the first server message is the XML service greeting.
pub fn validate_greeting(payload: &[u8]) -> Result<()> {
    if payload.starts_with(GREETING_PREFIX.as_bytes()) {
        return Ok(());
    }

    let preview: String = String::from_utf8_lossy(&payload[..payload.len().min(16)]).into_owned();
    Err(SessionError::HandshakeFailed(format!(
        "unexpected greeting {preview:?} ({} bytes, expected {GREETING_PREFIX:?} prefix)",
        payload.len()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_request_selects_local_quaternion_and_constraint() {
        let request = ConfigurableRequest::default();
        assert_eq!(request.to_xml(), "<configurable><Lq/><c/></configurable>");
    }

    #[test]
    fn display_matches_wire_payload() {
        let request = ConfigurableRequest::default();
        assert_eq!(request.channels(), DEFAULT_CHANNELS);
        assert_eq!(request.to_string(), request.to_xml());
    }

    #[test]
    fn greeting_must_be_xml() {
        assert!(validate_greeting(b"<?xml version=\"1.0\"?><service/>").is_ok());

        let err = validate_greeting(b"HTTP/1.1 400 Bad Request").unwrap_err();
        let msg = err.to_string();
        assert!(msg.starts_with("handshake failed: unexpected greeting"));
        assert!(msg.contains("24 bytes"));
    }

    #[test]
    fn empty_greeting_is_rejected() {
        assert!(matches!(
            validate_greeting(b""),
            Err(SessionError::HandshakeFailed(_))
        ));
    }
}
