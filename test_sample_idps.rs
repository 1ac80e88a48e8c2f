#![allow(clippy::uninlined_format_args)]

use mfa_detector::detection::{DetectionInput, MfaClassifier};
use mfa_detector::policy_document::validate_policy_document;
use serde_json::json;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    println!("Testing MFA detection against sample IdPs...");

    let classifier = MfaClassifier::default();

    let samples = [
        (
            "OIDC partner with ACR values",
            DetectionInput::from_json(
                "oidc",
                json!({
                    "issuer": "https://login.partner-a.example",
                    "mfaSupport": {"detected": true, "acrValues": ["mfa", "urn:example:loa:3"]},
                }),
            )?,
        ),
        (
            "OIDC partner with AMR claims only",
            DetectionInput::from_json(
                "oidc",
                json!({
                    "issuer": "https://login.partner-b.example",
                    "mfaSupport": {"detected": true, "acrValues": []},
                }),
            )?,
        ),
        (
            "SAML partner with MultiFactor context",
            DetectionInput::from_json(
                "saml",
                json!({
                    "entityId": "https://idp.partner-c.example/saml",
                    "authnContexts": ["urn:oasis:names:tc:SAML:2.0:ac:classes:MultiFactor"],
                    "warnings": [],
                }),
            )?,
        ),
        (
            "SAML partner with password only",
            DetectionInput::from_json(
                "saml",
                json!({
                    "entityId": "https://idp.partner-d.example/saml",
                    "authnContexts": ["urn:oasis:names:tc:SAML:2.0:ac:classes:Password"],
                }),
            )?,
        ),
        ("Partner without metadata", DetectionInput::Generic),
    ];

    for (name, input) in &samples {
        let result = classifier.classify(input, false);
        println!("\n=== {} ===", name);
        println!("Detected: {}", result.detected);
        println!("Score: {} ({:?})", result.score, result.confidence);
        println!("Evidence: {:?}", result.evidence);
        println!("Recommendations: {:?}", result.recommendations);
    }

    println!("\n=== Policy document uploads ===");
    for upload in ["mfa-policy.PDF", "mfa-policy.docx", "installer.exe", "policy"] {
        let has_policy_doc = validate_policy_document(upload).await;
        let result = classifier.classify(&DetectionInput::Generic, has_policy_doc);
        println!(
            "{}: accepted={} score={}",
            upload, has_policy_doc, result.score
        );
    }

    Ok(())
}
