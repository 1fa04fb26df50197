//! funcguard - operator CLI for FuncGuard.
//!
//! Provisions the verifier's configuration and inspects subscription
//! filter envelopes with the exact pipeline the deployed verifier
//! runs.
//!
//! ## Usage
//!
//! ```bash
//! # Provision a configuration file and print the environment blob
//! funcguard init \
//!     --region us-east-1 \
//!     --bucket funcguard-artifacts \
//!     --key cosign.pub \
//!     --action notify
//!
//! # Decode an envelope and print the admitted lifecycle events
//! funcguard inspect --envelope delivery.b64
//!
//! # Show the verification requests the events would produce
//! funcguard inspect --envelope delivery.b64 --requests
//! ```

use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use funcguard_core::{
    admitted_events, decode_envelope, Configuration, VerificationRequest, CONFIG_ENV,
};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Operator CLI for FuncGuard.
///
/// FuncGuard watches a cloud audit-log stream for function lifecycle
/// events and triggers cryptographic integrity verification of each
/// deployed artifact against a trust root.
#[derive(Parser)]
#[command(name = "funcguard")]
#[command(version = VERSION)]
#[command(about = "Tamper detection for serverless deployments")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Provision the verifier configuration
    Init {
        /// Cloud access key (empty for ambient credentials)
        #[arg(long, default_value = "")]
        access_key: String,

        /// Cloud secret key (empty for ambient credentials)
        #[arg(long, default_value = "")]
        secret_key: String,

        /// Home region of the verifier deployment
        #[arg(long)]
        region: String,

        /// Storage bucket for signatures and artifacts
        #[arg(long)]
        bucket: String,

        /// Public key reference (omit for keyless trust)
        #[arg(long, default_value = "")]
        key: String,

        /// Use keyless trust instead of an operator-supplied key
        #[arg(long)]
        keyless: bool,

        /// Post-verification action (e.g. notify, tag, quarantine)
        #[arg(long, default_value = "")]
        action: String,

        /// Notification topic for verification results
        #[arg(long, default_value = "")]
        sns_topic_arn: String,

        /// Function tag keys to scope verification to (repeatable)
        #[arg(long = "tag-key")]
        tag_keys: Vec<String>,

        /// Regions to scope verification to (repeatable)
        #[arg(long = "include-region")]
        include_regions: Vec<String>,

        /// Audit-trail name created during provisioning
        #[arg(long, default_value = "funcguard-trail")]
        trail_name: String,

        /// Configuration file path (default: $HOME/.funcguard)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Decode an envelope and print its lifecycle events
    Inspect {
        /// Envelope file, or '-' for stdin
        #[arg(long, default_value = "-")]
        envelope: PathBuf,

        /// Print the verification requests the admitted events would
        /// produce (requires a configuration file)
        #[arg(long)]
        requests: bool,

        /// Configuration file to resolve requests against
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_target(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_target(false)
            .init();
    }

    match cli.command {
        Commands::Init {
            access_key,
            secret_key,
            region,
            bucket,
            key,
            keyless,
            action,
            sns_topic_arn,
            tag_keys,
            include_regions,
            trail_name,
            output,
        } => {
            let config = Configuration {
                access_key,
                secret_key,
                region,
                bucket,
                public_key: key,
                is_keyless: keyless,
                action,
                sns_topic_arn,
                included_func_tag_keys: tag_keys,
                included_func_regions: include_regions,
                cloud_trail_name: trail_name,
            };
            let path = match output {
                Some(path) => path,
                None => default_config_path()?,
            };
            run_init(&config, &path)
        }
        Commands::Inspect {
            envelope,
            requests,
            config,
        } => {
            let data = read_envelope(&envelope)?;
            let config = match (requests, config) {
                (true, Some(path)) => Some(load_config(&path)?),
                (true, None) => anyhow::bail!("--requests needs --config <file>"),
                (false, _) => None,
            };
            run_inspect(&data, config.as_ref())
        }
    }
}

fn default_config_path() -> anyhow::Result<PathBuf> {
    let home = std::env::var_os("HOME").context("HOME is not set; pass --output explicitly")?;
    Ok(PathBuf::from(home).join(".funcguard"))
}

/// Write the configuration file and print the environment blob to
/// attach to the deployed verifier function.
fn run_init(config: &Configuration, path: &std::path::Path) -> anyhow::Result<()> {
    let yaml = serde_yaml::to_string(config).context("failed to serialize configuration")?;
    std::fs::write(path, &yaml)
        .with_context(|| format!("failed to write configuration to {}", path.display()))?;
    tracing::info!(path = %path.display(), "Configuration written");

    let blob = config
        .to_env_blob()
        .context("failed to encode configuration blob")?;
    println!("Set on the verifier function:");
    println!("  {CONFIG_ENV}={blob}");
    Ok(())
}

fn read_envelope(path: &std::path::Path) -> anyhow::Result<String> {
    if path.as_os_str() == "-" {
        let mut data = String::new();
        std::io::stdin()
            .read_to_string(&mut data)
            .context("failed to read envelope from stdin")?;
        Ok(data)
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read envelope from {}", path.display()))
    }
}

fn load_config(path: &std::path::Path) -> anyhow::Result<Configuration> {
    let yaml = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read configuration from {}", path.display()))?;
    serde_yaml::from_str(&yaml).context("configuration file does not match expected shape")
}

/// Decode the envelope and print admitted events (or the requests
/// they would produce) as JSON.
fn run_inspect(envelope: &str, config: Option<&Configuration>) -> anyhow::Result<()> {
    let batch = decode_envelope(envelope)?;
    let events = admitted_events(&batch);
    tracing::debug!(
        records = batch.log_events.len(),
        admitted = events.len(),
        "Envelope decoded"
    );

    match config {
        Some(config) => {
            let requests: Vec<VerificationRequest> = events
                .iter()
                .map(|event| VerificationRequest::for_event(event, config))
                .collect();
            println!("{}", serde_json::to_string_pretty(&requests)?);
        }
        None => {
            println!("{}", serde_json::to_string_pretty(&events)?);
        }
    }
    Ok(())
}
