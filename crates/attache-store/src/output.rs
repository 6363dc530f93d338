//! Delivery response description for attachment output.
//!
//! HTTP serving itself is an external collaborator; this module only
//! describes the response (status, headers, body) the proxy emits and
//! the pre-output hook that may veto delivery.

use attache_core::defaults::OUTPUT_CACHE_CONTROL;
use attache_core::models::AttachmentRecord;
use attache_crypto::Disposition;

/// Hook consulted before attachment bytes are emitted.
///
/// Returning `false` vetoes delivery. A veto is a normal negative
/// result, not an error.
pub trait OutputHook: Send + Sync {
    fn before_output(&self, record: &AttachmentRecord) -> bool;
}

impl<F> OutputHook for F
where
    F: Fn(&AttachmentRecord) -> bool + Send + Sync,
{
    fn before_output(&self, record: &AttachmentRecord) -> bool {
        self(record)
    }
}

/// Fully described file response for the download proxy.
#[derive(Debug, Clone)]
pub struct AttachmentOutput {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl AttachmentOutput {
    /// Build the response for `record` with `disposition` delivery.
    pub fn build(record: &AttachmentRecord, disposition: Disposition, body: Vec<u8>) -> Self {
        // Quoted filename with embedded quotes neutralized
        let safe_name = record.filename.replace('"', "'");

        let headers = vec![
            ("Content-Type".to_string(), record.filetype.clone()),
            (
                "Content-Disposition".to_string(),
                format!("{}; filename=\"{}\"", disposition, safe_name),
            ),
            ("Cache-Control".to_string(), OUTPUT_CACHE_CONTROL.to_string()),
            ("Accept-Ranges".to_string(), "bytes".to_string()),
            ("Content-Length".to_string(), body.len().to_string()),
        ];

        Self {
            status: 200,
            headers,
            body,
        }
    }

    /// Header lookup by name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}
