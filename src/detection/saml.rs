use super::{
    DetectionLogger, DetectionResult, EvidenceTier, LogCrateLogger, UPLOAD_POLICY_RECOMMENDATION,
};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const MFA_KEYWORDS: [&str; 2] = ["multifactor", "multi-factor"];

/// Parsed SAML metadata. Everything besides the entity id is kept as raw JSON
/// so the keyword scan sees every field the parser produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SamlMetadataResult {
    pub entity_id: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl SamlMetadataResult {
    pub fn new(entity_id: impl Into<String>) -> Self {
        Self {
            entity_id: entity_id.into(),
            fields: Map::new(),
        }
    }

    pub fn from_value(value: Value) -> anyhow::Result<Self> {
        serde_json::from_value(value).context("invalid input shape: SAML metadata")
    }

    pub fn with_field(mut self, name: impl Into<String>, value: Value) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    /// Substring scan over the whole serialized metadata. Coarse on purpose:
    /// any field, name or value mentioning multifactor counts.
    fn mentions_multifactor(&self) -> bool {
        let text = match serde_json::to_string(self) {
            Ok(text) => text.to_lowercase(),
            Err(_) => return false,
        };
        MFA_KEYWORDS.iter().any(|keyword| text.contains(keyword))
    }
}

/// Classify a SAML IdP, logging through the `log` facade.
pub fn detect_saml_mfa(metadata: &SamlMetadataResult, has_policy_doc: bool) -> DetectionResult {
    classify(metadata, has_policy_doc, &LogCrateLogger)
}

pub(crate) fn classify(
    metadata: &SamlMetadataResult,
    has_policy_doc: bool,
    logger: &dyn DetectionLogger,
) -> DetectionResult {
    if has_policy_doc {
        logger.info(&metadata.entity_id, "MFA evidence taken from policy document");
        return DetectionResult::policy_document();
    }

    if metadata.mentions_multifactor() {
        logger.info(&metadata.entity_id, "metadata mentions a MultiFactor context");
        return DetectionResult::from_tier(
            EvidenceTier::ExplicitProtocol,
            vec!["SAML metadata references a MultiFactor authentication context".to_string()],
            Vec::new(),
        );
    }

    logger.debug(&metadata.entity_id, "no MFA evidence in metadata");
    DetectionResult::from_tier(
        EvidenceTier::None,
        Vec::new(),
        vec![
            UPLOAD_POLICY_RECOMMENDATION.to_string(),
            "Ensure the SAML metadata declares a MultiFactor AuthnContextClassRef".to_string(),
        ],
    )
}
