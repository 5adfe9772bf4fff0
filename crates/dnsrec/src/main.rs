// # dnsrec - DNS record reconciler
//
// Thin command-line shell over `dnsrec-core`. All record logic lives in the
// core crate; this binary only:
// 1. Reads configuration from flags and environment variables
// 2. Initializes logging and the runtime
// 3. Wires the HTTP transport, state store and reconciler together
// 4. Runs one command and maps the outcome to an exit code
//
// ## Configuration
//
// ### API
// - `DOMENESHOP_TOKEN`: API token (required for API commands)
// - `DOMENESHOP_SECRET`: API secret (required for API commands)
// - `DOMENESHOP_API_URL`: Base URL (default `https://api.domeneshop.no/v0`)
// - `DOMENESHOP_TIMEOUT_SECS`: Request timeout (default 20)
//
// ### State
// - `DNSREC_STATE_PATH`: State file (default `dnsrec.state.json`)
//
// ### Logging
// - `DNSREC_LOG_LEVEL`: trace, debug, info, warn, error (default info)
//
// ## Example
//
// ```bash
// export DOMENESHOP_TOKEN=your_token
// export DOMENESHOP_SECRET=your_secret
//
// dnsrec apply --manifest records.json
// dnsrec import mail 42/100
// dnsrec show
// ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dnsrec_core::config::{DEFAULT_API_BASE, DEFAULT_TIMEOUT_SECS};
use dnsrec_core::{
    ApplyResult, Manifest, NotFoundPolicy, ProviderConfig, Reconciler, ReconcilerConfig,
    RecordController, RefreshResult, ResourceState, StateStoreConfig,
};
use dnsrec_transport_http::HttpTransport;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for different termination scenarios
///
/// - 0: Every requested operation succeeded
/// - 1: Configuration or usage error
/// - 2: Runtime error (API, transport or state failure)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DnsrecExitCode {
    Success = 0,
    ConfigError = 1,
    RuntimeError = 2,
}

impl From<DnsrecExitCode> for ExitCode {
    fn from(code: DnsrecExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Manage DNS records on a domain-hosting API
#[derive(Debug, Parser)]
#[command(name = "dnsrec", version, about)]
struct Cli {
    /// API token
    #[arg(long, env = "DOMENESHOP_TOKEN", hide_env_values = true, default_value = "")]
    token: String,

    /// API secret
    #[arg(long, env = "DOMENESHOP_SECRET", hide_env_values = true, default_value = "")]
    secret: String,

    /// API base URL
    #[arg(long, env = "DOMENESHOP_API_URL", default_value = DEFAULT_API_BASE)]
    api_url: String,

    /// Per-request timeout in seconds
    #[arg(long, env = "DOMENESHOP_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,

    /// State file
    #[arg(long, env = "DNSREC_STATE_PATH", default_value = "dnsrec.state.json")]
    state: PathBuf,

    /// Keep state in memory only
    #[arg(long)]
    ephemeral: bool,

    /// Fail instead of forgetting records the API reports as gone
    #[arg(long)]
    strict: bool,

    /// Log level
    #[arg(long, env = "DNSREC_LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create, update or replace every record declared in a manifest
    Apply {
        /// JSON manifest of declared records
        #[arg(long)]
        manifest: PathBuf,
    },
    /// Read managed records back from the API
    Refresh {
        /// Resource to refresh (all when omitted)
        name: Option<String>,
    },
    /// Delete a managed record
    Destroy { name: String },
    /// Adopt an existing record as `{domainId}/{recordId}`
    Import { name: String, id: String },
    /// Print stored state as JSON
    Show,
}

impl Command {
    fn needs_api(&self) -> bool {
        !matches!(self, Command::Show)
    }
}

/// Configuration resolved before the runtime starts
#[derive(Debug)]
struct Settings {
    provider: ProviderConfig,
    state_store: StateStoreConfig,
    reconciler: ReconcilerConfig,
    manifest: Option<Manifest>,
}

impl Settings {
    /// Resolve and validate everything the command needs
    fn from_cli(cli: &Cli) -> Result<Self> {
        let provider = ProviderConfig::new(cli.token.clone(), cli.secret.clone())
            .with_api_base(cli.api_url.clone())
            .with_timeout_secs(cli.timeout_secs);
        if cli.command.needs_api() {
            provider.validate()?;
        }

        let state_store = if cli.ephemeral {
            StateStoreConfig::Memory
        } else {
            if cli.state.as_os_str().is_empty() {
                anyhow::bail!("DNSREC_STATE_PATH cannot be empty");
            }
            StateStoreConfig::File {
                path: cli.state.display().to_string(),
            }
        };

        let manifest = match &cli.command {
            Command::Apply { manifest } => {
                let text = std::fs::read_to_string(manifest)
                    .with_context(|| format!("Failed to read manifest {}", manifest.display()))?;
                Some(Manifest::from_json(&text)?)
            }
            _ => None,
        };

        let mut reconciler = manifest
            .as_ref()
            .map(|m| m.reconciler.clone())
            .unwrap_or_default();
        if cli.strict {
            reconciler.not_found = NotFoundPolicy::Error;
        }

        Ok(Self {
            provider,
            state_store,
            reconciler,
            manifest,
        })
    }
}

fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => anyhow::bail!(
            "DNSREC_LOG_LEVEL '{}' is not valid. \
            Valid levels: trace, debug, info, warn, error",
            level
        ),
    }
}

/// Usage and validation failures exit with 1, everything else with 2
fn exit_code_for(err: &anyhow::Error) -> DnsrecExitCode {
    match err.downcast_ref::<dnsrec_core::Error>() {
        Some(
            dnsrec_core::Error::Config(_)
            | dnsrec_core::Error::Parse { .. }
            | dnsrec_core::Error::Validation(_)
            | dnsrec_core::Error::ImmutableFieldChanged { .. },
        ) => DnsrecExitCode::ConfigError,
        _ => DnsrecExitCode::RuntimeError,
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                DnsrecExitCode::ConfigError.into()
            } else {
                DnsrecExitCode::Success.into()
            };
        }
    };

    let log_level = match parse_log_level(&cli.log_level) {
        Ok(level) => level,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return DnsrecExitCode::ConfigError.into();
        }
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DnsrecExitCode::ConfigError.into();
    }

    let settings = match Settings::from_cli(&cli) {
        Ok(settings) => settings,
        Err(e) => {
            error!("Configuration error: {:#}", e);
            return DnsrecExitCode::ConfigError.into();
        }
    };

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DnsrecExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(run(cli.command, settings));

    match result {
        Ok(()) => DnsrecExitCode::Success.into(),
        Err(e) => {
            error!("{:#}", e);
            exit_code_for(&e).into()
        }
    }
}

/// Run one command
async fn run(command: Command, settings: Settings) -> Result<()> {
    let state_store = dnsrec_core::state::open(&settings.state_store).await?;

    if let Command::Show = command {
        return show(&*state_store).await;
    }

    let transport = HttpTransport::new(&settings.provider)?;
    info!("Using API at {}", transport.base_url());
    let reconciler = Reconciler::new(
        RecordController::new(Box::new(transport)),
        state_store,
        settings.reconciler,
    );

    let result = match command {
        Command::Apply { .. } => {
            let manifest = settings
                .manifest
                .context("Manifest was not loaded")?;
            apply(&reconciler, &manifest).await
        }
        Command::Refresh { name } => refresh(&reconciler, name).await,
        Command::Destroy { name } => {
            reconciler.destroy(&name).await?;
            println!("{name}: destroyed");
            Ok(())
        }
        Command::Import { name, id } => {
            let refreshed = reconciler.import(&name, &id).await?;
            report_refresh(&name, &refreshed);
            Ok(())
        }
        Command::Show => Ok(()),
    };

    reconciler.flush().await?;
    result
}

async fn apply(reconciler: &Reconciler, manifest: &Manifest) -> Result<()> {
    let mut failures = 0usize;

    for resource in &manifest.resources {
        match reconciler.apply(&resource.name, &resource.spec).await {
            Ok(outcome) => report_apply(&resource.name, &outcome),
            Err(e) => {
                error!("Resource {} failed: {}", resource.name, e);
                failures += 1;
            }
        }
    }

    for name in reconciler.managed().await? {
        if !manifest.resources.iter().any(|r| r.name == name) {
            warn!(
                "Resource {} is managed but no longer declared; run `dnsrec destroy {}` to remove it",
                name, name
            );
        }
    }

    if failures > 0 {
        anyhow::bail!(
            "{} of {} resource(s) failed",
            failures,
            manifest.resources.len()
        );
    }
    Ok(())
}

async fn refresh(reconciler: &Reconciler, name: Option<String>) -> Result<()> {
    let names = match name {
        Some(name) => vec![name],
        None => reconciler.managed().await?,
    };

    // A single named refresh keeps its own error so the exit code reflects it
    if let [name] = names.as_slice() {
        let refreshed = reconciler.refresh(name).await?;
        report_refresh(name, &refreshed);
        return Ok(());
    }

    let mut failures = 0usize;
    for name in &names {
        match reconciler.refresh(name).await {
            Ok(refreshed) => report_refresh(name, &refreshed),
            Err(e) => {
                error!("Resource {} failed: {}", name, e);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{} of {} resource(s) failed", failures, names.len());
    }
    Ok(())
}

async fn show(state_store: &dyn dnsrec_core::StateStore) -> Result<()> {
    let mut states: BTreeMap<String, ResourceState> = BTreeMap::new();
    for name in state_store.list().await? {
        if let Some(state) = state_store.get(&name).await? {
            states.insert(name, state);
        }
    }

    println!("{}", serde_json::to_string_pretty(&states)?);
    Ok(())
}

fn report_apply(name: &str, outcome: &ApplyResult) {
    match outcome {
        ApplyResult::Created { identity, .. } => println!("{name}: created {identity}"),
        ApplyResult::Replaced {
            previous,
            identity,
            field,
            ..
        } => println!("{name}: replaced {previous} with {identity} ({field} changed)"),
        ApplyResult::Updated {
            identity, changed, ..
        } => {
            let fields: Vec<&str> = changed.iter().map(|f| f.as_str()).collect();
            println!("{name}: updated {identity} ({})", fields.join(", "));
        }
        ApplyResult::Unchanged { identity, .. } => println!("{name}: unchanged {identity}"),
    }
}

fn report_refresh(name: &str, refreshed: &RefreshResult) {
    match refreshed {
        RefreshResult::Present(record) => println!(
            "{name}: {} {} {} ttl={}",
            record.record_type, record.host, record.data, record.ttl
        ),
        RefreshResult::Gone => println!("{name}: gone, removed from state"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("dnsrec").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_parse_log_level() {
        assert_eq!(parse_log_level("DEBUG").unwrap(), Level::DEBUG);
        assert!(parse_log_level("verbose").is_err());
    }

    #[test]
    fn test_show_needs_no_credentials() {
        let cli = parse(&["--token", "", "--secret", "", "show"]);
        let settings = Settings::from_cli(&cli).unwrap();
        assert!(settings.manifest.is_none());
    }

    #[test]
    fn test_api_commands_need_credentials() {
        let cli = parse(&["--token", "", "--secret", "", "destroy", "www"]);
        let err = Settings::from_cli(&cli).unwrap_err();
        assert!(err.to_string().contains("`token` not set"));
        assert_eq!(exit_code_for(&err), DnsrecExitCode::ConfigError);
    }

    #[test]
    fn test_settings_debug_hides_credentials() {
        let cli = parse(&["--token", "tok-123", "--secret", "sec-456", "show"]);
        let rendered = format!("{:?}", Settings::from_cli(&cli).unwrap());
        assert!(rendered.contains("<REDACTED>"));
        assert!(!rendered.contains("tok-123"));
        assert!(!rendered.contains("sec-456"));
    }

    #[test]
    fn test_strict_flag_sets_error_policy() {
        let cli = parse(&["--token", "t", "--secret", "s", "--strict", "refresh"]);
        let settings = Settings::from_cli(&cli).unwrap();
        assert_eq!(settings.reconciler.not_found, NotFoundPolicy::Error);
    }

    #[test]
    fn test_ephemeral_uses_memory_store() {
        let cli = parse(&["--token", "t", "--secret", "s", "--ephemeral", "refresh", "www"]);
        let settings = Settings::from_cli(&cli).unwrap();
        assert!(matches!(settings.state_store, StateStoreConfig::Memory));
    }

    #[test]
    fn test_missing_manifest_is_config_error() {
        let cli = parse(&[
            "--token",
            "t",
            "--secret",
            "s",
            "apply",
            "--manifest",
            "/nonexistent/records.json",
        ]);
        assert!(Settings::from_cli(&cli).is_err());
    }

    #[test]
    fn test_runtime_errors_exit_with_2() {
        let err = anyhow::Error::new(dnsrec_core::Error::transport("connection refused"));
        assert_eq!(exit_code_for(&err), DnsrecExitCode::RuntimeError);

        let err = anyhow::Error::new(dnsrec_core::Error::config("Resource www is not managed"));
        assert_eq!(exit_code_for(&err), DnsrecExitCode::ConfigError);
    }
}
