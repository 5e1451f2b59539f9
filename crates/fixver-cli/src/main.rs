//! fixver - which product version shipped each bug fix
//!
//! Searches Bugzilla for bugs of a product/component/version, follows each
//! bug's RELEASE_PENDING comment to its Errata advisory and prints the
//! `X.Y.Z` version named in the advisory synopsis:
//!
//! ```text
//! fixver -t <bugzilla api key> [-v 4.8]
//! ===== Found 57 bugs
//! Bug 1970000: Insights Operator reports wrong archive size Version: 4.8.13
//! ```
//!
//! The Errata Tool requires Kerberos. Built with `--features kerberos`, each
//! advisory request gets a fresh SPNEGO token from the credential cache
//! (`kinit` first). `--negotiate-token` replays one fixed token instead.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use fixver_clients::bugzilla::DEFAULT_BUGZILLA_URL;
use fixver_clients::errata::DEFAULT_ERRATA_URL;
use fixver_clients::{BugzillaClient, BugzillaConfig, ErrataClient, ErrataConfig};
use fixver_core::{
    BugFilter, LinkMarker, LogTarget, Pipeline, ReportDocument, RunConfig, RunSpan,
    DEFAULT_COMPONENT, DEFAULT_MARKER_CREATOR, DEFAULT_MARKER_PHRASE, DEFAULT_PRODUCT,
    DEFAULT_PRODUCT_VERSION, DEFAULT_STATUS,
};
use tracing::Level;

#[derive(Parser, Debug)]
#[command(name = "fixver")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Resolve the product version that shipped each Bugzilla fix", long_about = None)]
struct Cli {
    /// Bugzilla API key
    #[arg(short = 't', long = "token", env = "FIXVER_BUGZILLA_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Product version (release line) to search
    #[arg(
        short = 'v',
        long = "product-version",
        env = "FIXVER_PRODUCT_VERSION",
        default_value = DEFAULT_PRODUCT_VERSION
    )]
    product_version: String,

    /// Bugzilla product
    #[arg(long, env = "FIXVER_PRODUCT", default_value = DEFAULT_PRODUCT)]
    product: String,

    /// Bugzilla component
    #[arg(long, env = "FIXVER_COMPONENT", default_value = DEFAULT_COMPONENT)]
    component: String,

    /// Comma-separated bug statuses
    #[arg(long, env = "FIXVER_STATUS", default_value = DEFAULT_STATUS)]
    status: String,

    /// Bugzilla REST root
    #[arg(long, env = "FIXVER_BUGZILLA_URL", default_value = DEFAULT_BUGZILLA_URL)]
    bugzilla_url: String,

    /// Errata Tool erratum API root
    #[arg(long, env = "FIXVER_ERRATA_URL", default_value = DEFAULT_ERRATA_URL)]
    errata_url: String,

    /// Fixed SPNEGO token for the Errata Tool, overriding the credential cache
    #[arg(long, env = "FIXVER_ERRATA_NEGOTIATE_TOKEN", hide_env_values = true)]
    negotiate_token: Option<String>,

    /// Skip TLS certificate verification for the Errata Tool
    #[arg(long, env = "FIXVER_ERRATA_INSECURE_TLS")]
    insecure_errata_tls: bool,

    /// Per-request timeout in seconds
    #[arg(
        long,
        env = "FIXVER_TIMEOUT_SECS",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    timeout_secs: Option<u64>,

    /// Account that posts the RELEASE_PENDING comment
    #[arg(long, env = "FIXVER_MARKER_CREATOR", default_value = DEFAULT_MARKER_CREATOR)]
    marker_creator: String,

    /// Phrase identifying the RELEASE_PENDING comment
    #[arg(long, env = "FIXVER_MARKER_PHRASE", default_value = DEFAULT_MARKER_PHRASE)]
    marker_phrase: String,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Enable verbose output
    #[arg(long)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    log_json: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// `Bug <id>: <summary> Version: <version>` lines
    Text,
    /// One JSON document with entries and run counters
    Json,
}

/// Why the credential is unusable; each maps to its own exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenProblem {
    Missing,
    Empty,
}

impl TokenProblem {
    fn exit_code(self) -> i32 {
        match self {
            TokenProblem::Missing => 1,
            TokenProblem::Empty => 2,
        }
    }

    fn message(self) -> &'static str {
        match self {
            TokenProblem::Missing => "Please provide your Bugzilla Key with -t param",
            TokenProblem::Empty => "Bugzilla authentication was not successful!",
        }
    }
}

fn check_token(token: Option<&str>) -> std::result::Result<&str, TokenProblem> {
    match token {
        None => Err(TokenProblem::Missing),
        Some(t) if t.trim().is_empty() => Err(TokenProblem::Empty),
        Some(t) => Ok(t.trim()),
    }
}

impl Cli {
    fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    fn run_config(&self) -> RunConfig {
        let filter = BugFilter::for_version(self.product_version.trim())
            .with_product(self.product.trim())
            .with_component(self.component.trim())
            .with_statuses(self.status.split(','));
        RunConfig::new(filter).with_marker(LinkMarker::new(
            self.marker_creator.as_str(),
            self.marker_phrase.as_str(),
        ))
    }

    fn bugzilla_config(&self, api_key: &str) -> BugzillaConfig {
        let config = BugzillaConfig::new(&self.bugzilla_url).with_api_key(api_key);
        match self.timeout() {
            Some(timeout) => config.with_timeout(timeout),
            None => config,
        }
    }

    fn errata_config(&self) -> ErrataConfig {
        let mut config =
            ErrataConfig::new(&self.errata_url).with_accept_invalid_certs(self.insecure_errata_tls);
        if let Some(token) = self.negotiate_token.as_deref().filter(|t| !t.is_empty()) {
            config = config.with_negotiate_token(token);
        }
        if let Some(timeout) = self.timeout() {
            config = config.with_timeout(timeout);
        }
        config
    }

    fn log_target(&self) -> LogTarget {
        match self.format {
            OutputFormat::Text => LogTarget::Stdout,
            OutputFormat::Json => LogTarget::Stderr,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is the normal case.
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    fixver_core::init_tracing(cli.log_json, level, cli.log_target());

    let token = match check_token(cli.token.as_deref()) {
        Ok(token) => token.to_string(),
        Err(problem) => {
            println!("{}", problem.message());
            std::process::exit(problem.exit_code());
        }
    };

    cmd_run(&cli, &token).await
}

async fn cmd_run(cli: &Cli, token: &str) -> Result<()> {
    let run_id = uuid::Uuid::new_v4().to_string();
    let _span = RunSpan::enter(&run_id);

    let config = cli.run_config();
    config.validate()?;

    let tracker = BugzillaClient::new(cli.bugzilla_config(token))
        .context("Failed to set up the Bugzilla client")?;
    let errata =
        ErrataClient::new(cli.errata_config()).context("Failed to set up the Errata client")?;
    let pipeline = Pipeline::new(&tracker, &errata, config);

    let text = cli.format == OutputFormat::Text;
    let outcome = pipeline
        .run(|bugs| {
            if text {
                println!("===== Found {} bugs", bugs.len());
            }
        })
        .await
        .context("fixver run failed")?;

    match cli.format {
        OutputFormat::Text => print!("{}", outcome.report.render_text()),
        OutputFormat::Json => {
            let document = ReportDocument::new(
                &pipeline.config().filter,
                outcome.summary,
                &outcome.report,
            );
            println!("{}", serde_json::to_string_pretty(&document)?);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["fixver"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&["-t", "key"]);
        assert_eq!(cli.token.as_deref(), Some("key"));
        assert_eq!(cli.product_version, "4.8");
        assert_eq!(cli.format, OutputFormat::Text);
        assert!(!cli.insecure_errata_tls);

        let config = cli.run_config();
        assert_eq!(config.filter, BugFilter::default());
        assert_eq!(config.marker, LinkMarker::default());
    }

    #[test]
    fn test_short_version_flag_sets_release_line() {
        let cli = parse(&["-t", "key", "-v", "4.6"]);
        assert_eq!(cli.run_config().filter.version, "4.6");
    }

    #[test]
    fn test_status_list_normalised() {
        let cli = parse(&["-t", "key", "--status", "CLOSED, ON_QA,"]);
        assert_eq!(cli.run_config().filter.status, "CLOSED,ON_QA");
    }

    #[test]
    fn test_missing_token_exit_code() {
        let problem = check_token(None).unwrap_err();
        assert_eq!(problem, TokenProblem::Missing);
        assert_eq!(problem.exit_code(), 1);
        assert!(problem.message().contains("-t param"));
    }

    #[test]
    fn test_empty_token_exit_code() {
        let problem = check_token(Some("  ")).unwrap_err();
        assert_eq!(problem, TokenProblem::Empty);
        assert_eq!(problem.exit_code(), 2);
    }

    #[test]
    fn test_token_trimmed() {
        assert_eq!(check_token(Some(" abc ")), Ok("abc"));
    }

    #[test]
    fn test_errata_config_from_flags() {
        let cli = parse(&[
            "-t",
            "key",
            "--errata-url",
            "https://errata.example.com/api/v1/erratum",
            "--negotiate-token",
            "YII",
            "--insecure-errata-tls",
            "--timeout-secs",
            "15",
        ]);
        let config = cli.errata_config();
        assert_eq!(config.base_url, "https://errata.example.com/api/v1/erratum");
        assert_eq!(config.negotiate_token.as_deref(), Some("YII"));
        assert!(config.accept_invalid_certs);
        assert_eq!(config.timeout, Some(Duration::from_secs(15)));
    }

    #[test]
    fn test_bugzilla_config_carries_token() {
        let cli = parse(&["-t", "key", "--bugzilla-url", "https://bz.example.com/rest"]);
        let config = cli.bugzilla_config("key");
        assert_eq!(config.api_key.as_deref(), Some("key"));
        assert_eq!(config.base_url, "https://bz.example.com/rest");
        assert!(config.timeout.is_none());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = Cli::try_parse_from(["fixver", "-t", "key", "--timeout-secs", "0"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
        assert!(Cli::try_parse_from(["fixver", "-t", "key", "--timeout-secs", "1"]).is_ok());
    }

    #[test]
    fn test_json_format_logs_to_stderr() {
        let cli = parse(&["-t", "key", "--format", "json"]);
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.log_target(), LogTarget::Stderr);
    }
}
