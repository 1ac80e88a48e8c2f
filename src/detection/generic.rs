use super::{DetectionLogger, DetectionResult, EvidenceTier, LogCrateLogger};

const GENERIC_SUBJECT: &str = "generic";

/// Classify an IdP with no protocol metadata; only a policy document counts.
pub fn detect_generic_mfa(has_policy_doc: bool) -> DetectionResult {
    classify(has_policy_doc, &LogCrateLogger)
}

pub(crate) fn classify(has_policy_doc: bool, logger: &dyn DetectionLogger) -> DetectionResult {
    if has_policy_doc {
        logger.info(GENERIC_SUBJECT, "MFA evidence taken from policy document");
        return DetectionResult::policy_document();
    }

    logger.debug(GENERIC_SUBJECT, "no protocol metadata and no policy document");
    DetectionResult::from_tier(
        EvidenceTier::None,
        Vec::new(),
        vec!["Upload an MFA policy document or provide OIDC/SAML metadata for verification"
            .to_string()],
    )
}
