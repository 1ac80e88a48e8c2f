pub mod config;
pub mod detection;
pub mod policy_document;

pub use config::Config;
pub use detection::{
    detect_generic_mfa, detect_oidc_mfa, detect_saml_mfa, Confidence, DetectionInput,
    DetectionLogger, DetectionResult, EvidenceTier, MfaClassifier, OidcDiscoveryResult,
    SamlMetadataResult,
};
pub use policy_document::{validate_policy_document, PolicyDocumentGate};
