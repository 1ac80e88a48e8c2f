pub mod generic;
pub mod oidc;
pub mod saml;

use anyhow::{anyhow, bail, Context};
use serde::{Deserialize, Serialize};

pub use generic::detect_generic_mfa;
pub use oidc::{detect_oidc_mfa, MfaSupport, OidcDiscoveryResult};
pub use saml::{detect_saml_mfa, SamlMetadataResult};

/// Highest score a single MFA check can contribute to a partner assessment.
pub const MAX_MFA_SCORE: u8 = 20;

pub(crate) const POLICY_DOCUMENT_EVIDENCE: &str =
    "Partner provided MFA policy documentation";
pub(crate) const UPLOAD_POLICY_RECOMMENDATION: &str =
    "Upload an MFA policy document describing how multi-factor authentication is enforced";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

/// Strength of the evidence behind a verdict. Each tier fixes its score and
/// confidence so the two can never drift apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvidenceTier {
    PolicyDocument,
    ExplicitProtocol,
    ImplicitProtocol,
    None,
}

impl EvidenceTier {
    pub fn score(self) -> u8 {
        match self {
            EvidenceTier::PolicyDocument => MAX_MFA_SCORE,
            EvidenceTier::ExplicitProtocol => 15,
            EvidenceTier::ImplicitProtocol => 10,
            EvidenceTier::None => 0,
        }
    }

    pub fn confidence(self) -> Confidence {
        match self {
            EvidenceTier::PolicyDocument | EvidenceTier::ExplicitProtocol => Confidence::High,
            EvidenceTier::ImplicitProtocol => Confidence::Medium,
            EvidenceTier::None => Confidence::Low,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionResult {
    pub detected: bool,
    pub evidence: Vec<String>,
    pub score: u8,
    pub confidence: Confidence,
    pub recommendations: Vec<String>,
}

impl DetectionResult {
    pub(crate) fn from_tier(
        tier: EvidenceTier,
        evidence: Vec<String>,
        recommendations: Vec<String>,
    ) -> Self {
        Self {
            detected: tier != EvidenceTier::None,
            evidence,
            score: tier.score(),
            confidence: tier.confidence(),
            recommendations,
        }
    }

    pub(crate) fn policy_document() -> Self {
        Self::from_tier(
            EvidenceTier::PolicyDocument,
            vec![POLICY_DOCUMENT_EVIDENCE.to_string()],
            Vec::new(),
        )
    }

    /// Recover the evidence tier a result was built from.
    pub fn tier(&self) -> EvidenceTier {
        match (self.score, self.confidence) {
            (20, Confidence::High) => EvidenceTier::PolicyDocument,
            (15, Confidence::High) => EvidenceTier::ExplicitProtocol,
            (10, Confidence::Medium) => EvidenceTier::ImplicitProtocol,
            _ => EvidenceTier::None,
        }
    }
}

/// Diagnostic sink for the classifiers. Messages are keyed by the IdP
/// identifier (issuer or entity id) and carry no contract.
pub trait DetectionLogger: Send + Sync {
    fn info(&self, subject: &str, message: &str);
    fn debug(&self, subject: &str, message: &str);
}

/// Forwards to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogCrateLogger;

impl DetectionLogger for LogCrateLogger {
    fn info(&self, subject: &str, message: &str) {
        log::info!("[{}] {}", subject, message);
    }

    fn debug(&self, subject: &str, message: &str) {
        log::debug!("[{}] {}", subject, message);
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NullLogger;

impl DetectionLogger for NullLogger {
    fn info(&self, _subject: &str, _message: &str) {}
    fn debug(&self, _subject: &str, _message: &str) {}
}

/// Protocol metadata available for an IdP, if any.
#[derive(Debug, Clone, PartialEq)]
pub enum DetectionInput {
    Oidc(OidcDiscoveryResult),
    Saml(SamlMetadataResult),
    Generic,
}

impl DetectionInput {
    /// Build an input from a JSON document produced by a discovery or
    /// metadata collaborator. `value` is ignored for the generic protocol.
    pub fn from_json(protocol: &str, value: serde_json::Value) -> anyhow::Result<Self> {
        match protocol.to_lowercase().as_str() {
            "oidc" => {
                require_object(&value, "issuer")?;
                let discovery = serde_json::from_value(value)
                    .map_err(|e| anyhow!("invalid input shape: {}", e))
                    .context("Failed to read OIDC discovery result")?;
                Ok(DetectionInput::Oidc(discovery))
            }
            "saml" => {
                require_object(&value, "entityId")?;
                let metadata = serde_json::from_value(value)
                    .map_err(|e| anyhow!("invalid input shape: {}", e))
                    .context("Failed to read SAML metadata result")?;
                Ok(DetectionInput::Saml(metadata))
            }
            "generic" => Ok(DetectionInput::Generic),
            other => bail!("invalid input shape: unknown protocol '{}'", other),
        }
    }

    pub fn protocol(&self) -> &'static str {
        match self {
            DetectionInput::Oidc(_) => "oidc",
            DetectionInput::Saml(_) => "saml",
            DetectionInput::Generic => "generic",
        }
    }
}

fn require_object(value: &serde_json::Value, identifier: &str) -> anyhow::Result<()> {
    let Some(object) = value.as_object() else {
        bail!("invalid input shape: expected a JSON object");
    };
    match object.get(identifier) {
        Some(serde_json::Value::String(_)) => Ok(()),
        Some(_) => bail!("invalid input shape: '{}' must be a string", identifier),
        None => bail!("invalid input shape: missing '{}'", identifier),
    }
}

/// Runs the MFA classifiers with an injected logging port.
pub struct MfaClassifier<L: DetectionLogger = LogCrateLogger> {
    logger: L,
}

impl Default for MfaClassifier<LogCrateLogger> {
    fn default() -> Self {
        Self::new(LogCrateLogger)
    }
}

impl<L: DetectionLogger> MfaClassifier<L> {
    pub fn new(logger: L) -> Self {
        Self { logger }
    }

    pub fn detect_oidc(
        &self,
        discovery: &OidcDiscoveryResult,
        has_policy_doc: bool,
    ) -> DetectionResult {
        oidc::classify(discovery, has_policy_doc, &self.logger)
    }

    pub fn detect_saml(&self, metadata: &SamlMetadataResult, has_policy_doc: bool) -> DetectionResult {
        saml::classify(metadata, has_policy_doc, &self.logger)
    }

    pub fn detect_generic(&self, has_policy_doc: bool) -> DetectionResult {
        generic::classify(has_policy_doc, &self.logger)
    }

    pub fn classify(&self, input: &DetectionInput, has_policy_doc: bool) -> DetectionResult {
        match input {
            DetectionInput::Oidc(discovery) => self.detect_oidc(discovery, has_policy_doc),
            DetectionInput::Saml(metadata) => self.detect_saml(metadata, has_policy_doc),
            DetectionInput::Generic => self.detect_generic(has_policy_doc),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    /// Captures log lines so tests can check what was keyed to which IdP.
    #[derive(Default)]
    pub(crate) struct RecordingLogger {
        pub(crate) lines: Mutex<Vec<String>>,
    }

    impl DetectionLogger for RecordingLogger {
        fn info(&self, subject: &str, message: &str) {
            self.lines
                .lock()
                .unwrap()
                .push(format!("INFO {}: {}", subject, message));
        }

        fn debug(&self, subject: &str, message: &str) {
            self.lines
                .lock()
                .unwrap()
                .push(format!("DEBUG {}: {}", subject, message));
        }
    }

    fn oidc(detected: bool, acr_values: &[&str]) -> OidcDiscoveryResult {
        OidcDiscoveryResult {
            issuer: "https://login.partner.example".to_string(),
            mfa_support: MfaSupport {
                detected,
                acr_values: acr_values.iter().map(|s| s.to_string()).collect(),
            },
        }
    }

    fn saml(authn_context: &str) -> SamlMetadataResult {
        SamlMetadataResult::from_value(json!({
            "entityId": "https://idp.example.org",
            "authnContext": authn_context,
        }))
        .unwrap()
    }

    fn assert_pairing(result: &DetectionResult) {
        match result.score {
            20 => assert_eq!(result.confidence, Confidence::High),
            15 => assert_eq!(result.confidence, Confidence::High),
            10 => assert_eq!(result.confidence, Confidence::Medium),
            0 => assert_eq!(result.confidence, Confidence::Low),
            other => panic!("unexpected score {}", other),
        }
        assert_eq!(result.detected, result.score > 0);
        assert_eq!(result.confidence, result.tier().confidence());
        assert_eq!(result.score, result.tier().score());
    }

    #[test]
    fn test_tier_pairing() {
        assert_eq!(EvidenceTier::PolicyDocument.score(), 20);
        assert_eq!(EvidenceTier::ExplicitProtocol.score(), 15);
        assert_eq!(EvidenceTier::ImplicitProtocol.score(), 10);
        assert_eq!(EvidenceTier::None.score(), 0);
        assert_eq!(EvidenceTier::ImplicitProtocol.confidence(), Confidence::Medium);
        assert_eq!(EvidenceTier::None.confidence(), Confidence::Low);
    }

    #[test]
    fn test_every_branch_keeps_score_confidence_pairing() {
        let classifier = MfaClassifier::new(NullLogger);
        let mut results = Vec::new();

        for has_policy_doc in [true, false] {
            results.push(classifier.detect_oidc(&oidc(true, &["mfa"]), has_policy_doc));
            results.push(classifier.detect_oidc(&oidc(true, &[]), has_policy_doc));
            results.push(classifier.detect_oidc(&oidc(false, &["mfa"]), has_policy_doc));
            results.push(classifier.detect_oidc(&oidc(false, &[]), has_policy_doc));
            results.push(classifier.detect_saml(&saml("urn:MultiFactor"), has_policy_doc));
            results.push(classifier.detect_saml(&saml("urn:Password"), has_policy_doc));
            results.push(classifier.detect_generic(has_policy_doc));
        }

        for result in &results {
            assert_pairing(result);
        }

        let scores: Vec<u8> = results.iter().map(|r| r.score).collect();
        for expected in [0, 10, 15, 20] {
            assert!(scores.contains(&expected), "score {} never reached", expected);
        }
    }

    #[test]
    fn test_policy_document_wins_for_every_protocol() {
        let classifier = MfaClassifier::new(NullLogger);
        let contradictory = SamlMetadataResult::from_value(json!({
            "entityId": "",
            "warnings": [null, 42, {"nested": []}],
        }))
        .unwrap();
        let inputs = [
            DetectionInput::Oidc(oidc(false, &["", ""])),
            DetectionInput::Saml(contradictory),
            DetectionInput::Generic,
        ];

        for input in &inputs {
            let result = classifier.classify(input, true);
            assert_eq!(result, DetectionResult::policy_document());
            assert_eq!(result.tier(), EvidenceTier::PolicyDocument);
        }
    }

    #[test]
    fn test_classify_dispatches_by_protocol() {
        let classifier = MfaClassifier::new(NullLogger);

        let result = classifier.classify(&DetectionInput::Oidc(oidc(true, &[])), false);
        assert_eq!(result.tier(), EvidenceTier::ImplicitProtocol);

        let result = classifier.classify(&DetectionInput::Saml(saml("urn:MultiFactor")), false);
        assert_eq!(result.tier(), EvidenceTier::ExplicitProtocol);

        let result = classifier.classify(&DetectionInput::Generic, false);
        assert_eq!(result.tier(), EvidenceTier::None);
        assert_eq!(result.recommendations.len(), 1);
    }

    #[test]
    fn test_repeated_calls_are_identical() {
        let classifier = MfaClassifier::new(NullLogger);
        let input = DetectionInput::Oidc(oidc(true, &["mfa", "otp"]));

        assert_eq!(
            classifier.classify(&input, false),
            classifier.classify(&input, false)
        );
        assert_eq!(classifier.detect_generic(false), classifier.detect_generic(false));
    }

    #[test]
    fn test_logger_is_keyed_by_identifier() {
        let logger = RecordingLogger::default();
        let classifier = MfaClassifier::new(logger);
        classifier.detect_oidc(&oidc(true, &["mfa"]), false);
        classifier.detect_saml(&saml("urn:Password"), true);

        let lines = classifier.logger.lines.lock().unwrap();
        assert!(lines
            .iter()
            .any(|l| l.contains("https://login.partner.example")));
        assert!(lines.iter().any(|l| l.contains("https://idp.example.org")));
    }

    #[test]
    fn test_result_serializes_camel_case() {
        let result = detect_generic_mfa(false);
        let value = serde_json::to_value(&result).unwrap();

        assert_eq!(value["confidence"], "low");
        assert_eq!(value["score"], 0);
        assert!(value["recommendations"].is_array());
    }

    #[test]
    fn test_from_json_builds_inputs() {
        let input = DetectionInput::from_json(
            "OIDC",
            json!({
                "issuer": "https://login.partner.example",
                "mfaSupport": {"detected": true, "acrValues": ["mfa"]},
            }),
        )
        .unwrap();
        assert_eq!(input, DetectionInput::Oidc(oidc(true, &["mfa"])));

        let input = DetectionInput::from_json(
            "oidc",
            json!({"issuer": "https://login.partner.example"}),
        )
        .unwrap();
        assert_eq!(input, DetectionInput::Oidc(oidc(false, &[])));

        let input = DetectionInput::from_json("saml", json!({"entityId": "urn:idp"})).unwrap();
        assert_eq!(input.protocol(), "saml");

        let input = DetectionInput::from_json("generic", serde_json::Value::Null).unwrap();
        assert_eq!(input, DetectionInput::Generic);
    }

    #[test]
    fn test_from_json_rejects_bad_shapes() {
        let cases = [
            ("oidc", json!({"mfaSupport": {"detected": true}})),
            ("oidc", json!({"issuer": 7})),
            ("oidc", json!({"issuer": "x", "mfaSupport": {"detected": "yes"}})),
            ("saml", json!(["entityId"])),
            ("saml", json!({"authnContext": "urn:MultiFactor"})),
            ("ldap", json!({})),
        ];

        for (protocol, value) in cases {
            let err = DetectionInput::from_json(protocol, value).unwrap_err();
            assert!(
                format!("{:#}", err).contains("invalid input shape"),
                "unexpected error: {:#}",
                err
            );
        }
    }
}
