use super::{
    DetectionLogger, DetectionResult, EvidenceTier, LogCrateLogger, UPLOAD_POLICY_RECOMMENDATION,
};
use serde::{Deserialize, Serialize};

/// Prober summary of an IdP's OpenID Connect discovery document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OidcDiscoveryResult {
    pub issuer: String,
    #[serde(default)]
    pub mfa_support: MfaSupport,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MfaSupport {
    #[serde(default)]
    pub detected: bool,
    #[serde(default)]
    pub acr_values: Vec<String>,
}

/// Classify an OIDC IdP, logging through the `log` facade.
pub fn detect_oidc_mfa(discovery: &OidcDiscoveryResult, has_policy_doc: bool) -> DetectionResult {
    classify(discovery, has_policy_doc, &LogCrateLogger)
}

pub(crate) fn classify(
    discovery: &OidcDiscoveryResult,
    has_policy_doc: bool,
    logger: &dyn DetectionLogger,
) -> DetectionResult {
    if has_policy_doc {
        logger.info(&discovery.issuer, "MFA evidence taken from policy document");
        return DetectionResult::policy_document();
    }

    // ACR values only count once the prober has flagged MFA support
    if discovery.mfa_support.detected {
        let acr_values = &discovery.mfa_support.acr_values;
        if !acr_values.is_empty() {
            logger.info(&discovery.issuer, "MFA advertised through ACR values");
            return DetectionResult::from_tier(
                EvidenceTier::ExplicitProtocol,
                vec![format!(
                    "OIDC discovery advertises ACR values: {}",
                    acr_values.join(", ")
                )],
                Vec::new(),
            );
        }

        logger.info(&discovery.issuer, "MFA inferred without explicit ACR values");
        return DetectionResult::from_tier(
            EvidenceTier::ImplicitProtocol,
            vec![
                "MFA support detected via AMR claims or scopes, but no explicit ACR values are published"
                    .to_string(),
            ],
            Vec::new(),
        );
    }

    logger.debug(&discovery.issuer, "no MFA evidence in discovery document");
    DetectionResult::from_tier(
        EvidenceTier::None,
        Vec::new(),
        vec![
            UPLOAD_POLICY_RECOMMENDATION.to_string(),
            "Configure acr_values_supported in the OIDC discovery document to advertise MFA"
                .to_string(),
        ],
    )
}
