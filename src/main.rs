use clap::{Arg, Command};
use log::LevelFilter;
use mfa_detector::config::{Config, OutputFormat};
use mfa_detector::detection::{DetectionInput, DetectionResult, MfaClassifier};
use mfa_detector::policy_document::PolicyDocumentGate;
use std::process;

#[tokio::main]
async fn main() {
    let matches = Command::new("mfa-detector")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Infer MFA support of a partner identity provider from discovery evidence")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("/etc/mfa-detector.yaml"),
        )
        .arg(
            Arg::new("generate-config")
                .long("generate-config")
                .value_name("FILE")
                .help("Generate a default configuration file")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("protocol")
                .short('p')
                .long("protocol")
                .value_name("PROTOCOL")
                .help("Protocol of the supplied metadata")
                .value_parser(["oidc", "saml", "generic"])
                .default_value("generic"),
        )
        .arg(
            Arg::new("metadata")
                .short('m')
                .long("metadata")
                .value_name("FILE")
                .help("JSON discovery result (oidc) or parsed metadata (saml)")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("policy-doc")
                .long("policy-doc")
                .value_name("PATH")
                .help("Uploaded MFA policy document")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let log_level = if matches.get_flag("verbose") {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    if let Some(generate_path) = matches.get_one::<String>("generate-config") {
        generate_default_config(generate_path);
        return;
    }

    let config_path = matches
        .get_one::<String>("config")
        .map(String::as_str)
        .unwrap_or("/etc/mfa-detector.yaml");
    let config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {e:#}");
            process::exit(1);
        }
    };

    let protocol = matches
        .get_one::<String>("protocol")
        .map(String::as_str)
        .unwrap_or("generic");
    let input = match load_input(protocol, matches.get_one::<String>("metadata")) {
        Ok(input) => input,
        Err(e) => {
            eprintln!("Error reading metadata: {e:#}");
            process::exit(1);
        }
    };

    let has_policy_doc = match matches.get_one::<String>("policy-doc") {
        Some(path) => {
            PolicyDocumentGate::from_config(&config.policy_document)
                .validate(path)
                .await
        }
        None => false,
    };

    let result = MfaClassifier::default().classify(&input, has_policy_doc);

    match config.output.format {
        OutputFormat::Json => match serde_json::to_string_pretty(&result) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error serializing result: {e}");
                process::exit(1);
            }
        },
        OutputFormat::Text => print_report(&input, &result),
    }
}

fn load_config(path: &str) -> anyhow::Result<Config> {
    if std::path::Path::new(path).exists() {
        Config::from_file(path)
    } else {
        log::warn!("Configuration file '{path}' not found, using default configuration");
        Ok(Config::default())
    }
}

fn generate_default_config(path: &str) {
    let config = Config::default();
    match config.to_file(path) {
        Ok(()) => {
            println!("Default configuration written to: {path}");
        }
        Err(e) => {
            eprintln!("Error writing configuration file: {e}");
            process::exit(1);
        }
    }
}

fn load_input(protocol: &str, metadata_path: Option<&String>) -> anyhow::Result<DetectionInput> {
    use anyhow::Context;

    if protocol == "generic" {
        return Ok(DetectionInput::Generic);
    }

    let Some(path) = metadata_path else {
        anyhow::bail!("--metadata is required for the {protocol} protocol");
    };
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read metadata file: {path}"))?;
    let value: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse JSON metadata: {path}"))?;

    DetectionInput::from_json(protocol, value)
}

fn print_report(input: &DetectionInput, result: &DetectionResult) {
    println!("MFA detection ({})", input.protocol());
    println!("  Detected:   {}", if result.detected { "yes" } else { "no" });
    println!("  Score:      {}", result.score);
    println!("  Confidence: {:?}", result.confidence);

    if !result.evidence.is_empty() {
        println!("  Evidence:");
        for item in &result.evidence {
            println!("    - {item}");
        }
    }

    if !result.recommendations.is_empty() {
        println!("  Recommendations:");
        for item in &result.recommendations {
            println!("    - {item}");
        }
    }
}
