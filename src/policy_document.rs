//! Upload gate deciding whether a partner file counts as an MFA policy document.
//!
//! Only the file name is inspected. Content validation is not done here yet;
//! the optional existence check is the only I/O the gate performs.

use std::path::Path;

pub const POLICY_DOCUMENT_EXTENSIONS: [&str; 4] = ["pdf", "doc", "docx", "txt"];

#[derive(Debug, Clone, Copy, Default)]
pub struct PolicyDocumentGate {
    verify_exists: bool,
}

impl PolicyDocumentGate {
    pub fn new(verify_exists: bool) -> Self {
        Self { verify_exists }
    }

    pub fn from_config(config: &crate::config::PolicyDocumentConfig) -> Self {
        Self::new(config.verify_exists)
    }

    /// Returns true when `path` qualifies as a policy document. Never fails:
    /// unreadable paths are simply not policy documents.
    pub async fn validate(&self, path: &str) -> bool {
        if !has_allowed_extension(path) {
            log::debug!("Rejected policy document candidate by extension: {}", path);
            return false;
        }

        if !self.verify_exists {
            return true;
        }

        match tokio::fs::metadata(path).await {
            Ok(metadata) if metadata.is_file() => true,
            Ok(_) => {
                log::warn!("Policy document path is not a regular file: {}", path);
                false
            }
            Err(e) => {
                log::warn!("Could not access policy document {}: {}", path, e);
                false
            }
        }
    }
}

/// Extension-only gate used when no existence check is configured.
pub async fn validate_policy_document(path: &str) -> bool {
    PolicyDocumentGate::default().validate(path).await
}

fn has_allowed_extension(path: &str) -> bool {
    Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext_lower = ext.to_lowercase();
            POLICY_DOCUMENT_EXTENSIONS.contains(&ext_lower.as_str())
        })
        .unwrap_or(false)
}
