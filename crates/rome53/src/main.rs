// # rome53 - Route 53 Dynamic DNS Updater
//
// Points an existing Route 53 A record at this host's WAN IP address.
//
// This binary is a thin integration layer:
// 1. Parsing arguments and environment settings
// 2. Initializing logging and the runtime
// 3. Wiring the Route 53 provider and the OpenDNS resolver
// 4. Running the rome53-core workflow and mapping its result to an exit code
//
// All decisions about records live in rome53-core.
//
// ## Usage
//
// ```bash
// export AWS_ACCESS_KEY_ID=...
// export AWS_SECRET_ACCESS_KEY=...
//
// rome53 home.example.com
// rome53 -q home.example.com          # prints only "home.example.com.<TAB>1.2.3.4"
// rome53 --ip 192.0.2.10 home.example.com
// rome53 --dry-run home.example.com
// ```
//
// ## Environment
//
// - `ROME53_LOG_LEVEL`: Diagnostic log level on stderr (default: warn)
// - `ROME53_MODE`: `live` (default) or `dry-run`
//
// ## Exit Codes
//
// - 0: Updated, already correct, or wait interrupted
// - 1: AWS credentials missing or rejected
// - 2: Record is not an A record (also used by the argument parser)
// - 3: Record has multiple values
// - 4: Domain not found in the account
// - 5: Any other failure

use anyhow::Result;
use clap::Parser;
use rome53_core::{
    DomainName, Error, ExitStatus, Mode, Reporter, RunConfig, Updater, cancellation,
};
use rome53_ip_dns::OpenDnsResolver;
use rome53_route53::Route53Provider;
use std::env;
use std::net::Ipv4Addr;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{Level, debug, error, info};
use tracing_subscriber::FmtSubscriber;

/// Update a Route 53 A record to point at this host's WAN IP
#[derive(Debug, Parser)]
#[command(name = "rome53", version, about)]
struct Args {
    /// Fully qualified name of an existing A record
    #[arg(value_parser = parse_domain)]
    domain: DomainName,

    /// Print only the final "domain<TAB>ip" line
    #[arg(short, long)]
    quiet: bool,

    /// Use this address instead of looking up the WAN IP
    #[arg(long, value_name = "IPv4")]
    ip: Option<Ipv4Addr>,

    /// Submit the change without waiting for it to propagate
    #[arg(long)]
    no_wait: bool,

    /// Look everything up but do not submit a change
    #[arg(long)]
    dry_run: bool,
}

fn parse_domain(raw: &str) -> std::result::Result<DomainName, String> {
    DomainName::new(raw).map_err(|e| e.to_string())
}

/// Environment-level configuration
#[derive(Debug)]
struct Config {
    log_level: String,
    mode: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            log_level: var("ROME53_LOG_LEVEL").unwrap_or_else(|| "warn".to_string()),
            mode: var("ROME53_MODE").unwrap_or_else(|| "live".to_string()),
        }
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        self.level()?;
        self.mode()?;
        Ok(())
    }

    fn level(&self) -> Result<Level> {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Ok(Level::TRACE),
            "debug" => Ok(Level::DEBUG),
            "info" => Ok(Level::INFO),
            "warn" => Ok(Level::WARN),
            "error" => Ok(Level::ERROR),
            _ => anyhow::bail!(
                "ROME53_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }
    }

    fn mode(&self) -> Result<Mode> {
        match self.mode.to_lowercase().as_str() {
            "live" => Ok(Mode::Live),
            "dry-run" => Ok(Mode::DryRun),
            _ => anyhow::bail!(
                "ROME53_MODE '{}' is not valid. Valid modes: live, dry-run",
                self.mode
            ),
        }
    }
}

/// Build the run configuration from arguments and environment
///
/// `--dry-run` wins over `ROME53_MODE=live`.
fn run_config(args: Args, config: &Config) -> Result<RunConfig> {
    let mode = if args.dry_run {
        Mode::DryRun
    } else {
        config.mode()?
    };

    Ok(RunConfig::new(args.domain)
        .with_quiet(args.quiet)
        .with_override_ip(args.ip)
        .with_wait_for_sync(!args.no_wait)
        .with_mode(mode))
}

fn main() -> ExitCode {
    // Usage errors exit here with clap's own code
    let args = Args::parse();
    let quiet = args.quiet;

    let config = Config::from_env();
    if let Err(e) = config.validate() {
        Reporter::stdio(quiet).error(Error::config(e.to_string()));
        return ExitStatus::RuntimeError.into();
    }

    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.level().unwrap_or(Level::WARN))
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return ExitStatus::RuntimeError.into();
    }

    let run_config = match run_config(args, &config) {
        Ok(cfg) => cfg,
        Err(e) => {
            Reporter::stdio(quiet).error(Error::config(e.to_string()));
            return ExitStatus::RuntimeError.into();
        }
    };

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            Reporter::stdio(quiet).error(format!("Failed to start: {}", e));
            return ExitStatus::RuntimeError.into();
        }
    };

    rt.block_on(run(run_config)).into()
}

/// Wire the components and run the workflow once
async fn run(config: RunConfig) -> ExitStatus {
    let quiet = config.quiet;
    info!("Starting rome53 for {} ({:?})", config.domain, config.mode);

    let (handle, mut token) = cancellation();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received SIGINT");
                handle.cancel();
            }
            Err(e) => error!("Failed to listen for Ctrl-C: {}", e),
        }
    });

    let connected = tokio::select! {
        biased;
        _ = token.cancelled() => Err(Error::Interrupted),
        result = Route53Provider::connect() => result,
    };
    let provider = match connected {
        Ok(provider) => Arc::new(provider),
        Err(e) => return fail(&mut Reporter::stdio(quiet), e),
    };

    let mut updater = match Updater::new(
        Box::new(OpenDnsResolver::new()),
        provider.clone(),
        provider,
        config,
        Reporter::stdio(quiet),
    ) {
        Ok(updater) => updater,
        Err(e) => return fail(&mut Reporter::stdio(quiet), e),
    };

    match updater.run(token).await {
        Ok(outcome) => {
            debug!("Run finished: {:?}", outcome);
            ExitStatus::Success
        }
        Err(e) => fail(updater.reporter_mut(), e),
    }
}

fn fail(reporter: &mut Reporter, err: Error) -> ExitStatus {
    debug!("Run failed: {:?}", err);
    reporter.error(&err);
    err.exit_status()
}
