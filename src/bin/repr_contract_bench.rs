use clap::{Parser, Subcommand, ValueEnum};
use rayon::prelude::*;
use repr_contract_bench::harness::{BenchConfig, Deadline, Profile, DEFAULT_SEED};
use repr_contract_bench::schema::{
    BenchmarkRequest, ContractReport, RunMeta, ValidateTypesRequest,
};
use repr_contract_bench::stream::JsonLinesTransport;
use repr_contract_bench::ValidationService;
use serde_json::json;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ProfileArg {
    Quick,
    Full,
}

impl From<ProfileArg> for Profile {
    fn from(v: ProfileArg) -> Self {
        match v {
            ProfileArg::Quick => Profile::Quick,
            ProfileArg::Full => Profile::Full,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check every registered field contract against fresh generated instances.
    Validate {
        /// Scenario label (basic|performance); other labels validate everything.
        #[arg(long = "scenario", value_name = "NAME", num_args = 1.., action = clap::ArgAction::Append)]
        scenarios: Vec<String>,

        /// Also validate populated instances of each message.
        #[arg(long, default_value_t = false)]
        deep: bool,

        /// Number of independent validation calls issued in parallel.
        #[arg(long, default_value_t = 1)]
        concurrency: usize,
    },

    /// Value-collection vs reference-collection micro-benchmarks.
    Bench {
        #[arg(long, default_value_t = 1_000, allow_negative_numbers = true)]
        iterations: i64,

        #[arg(long, default_value_t = 100, allow_negative_numbers = true)]
        data_size: i64,

        /// Benchmark name or alias (value_slice|pointer_slice|memory|serialization).
        #[arg(long = "name", value_name = "NAME", num_args = 1.., action = clap::ArgAction::Append)]
        names: Vec<String>,
    },

    /// Streaming validation: JSON-lines requests on stdin, responses on stdout.
    Stream,

    /// Readiness smoke check.
    Ready,
}

#[derive(Parser, Debug)]
#[command(name = "repr-contract-bench")]
#[command(about = "Representation contract validator and layout benchmark runner (JSON output)")]
struct Args {
    #[arg(long, value_enum, default_value_t = ProfileArg::Quick, global = true)]
    profile: ProfileArg,

    #[arg(long, default_value_t = DEFAULT_SEED, global = true)]
    seed: u64,

    /// Where to write the JSON report. If omitted, prints to stdout.
    #[arg(long, global = true)]
    out: Option<PathBuf>,

    /// Abort before the next phase once this many milliseconds have passed.
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    /// Log filter used when RUST_LOG is unset.
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    cmd: Command,
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let fmt_layer = fmt::layer().with_writer(io::stderr).with_target(true);
    tracing_subscriber::registry().with(filter).with(fmt_layer).init();
}

fn now_utc_rfc3339() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    format!("unix:{secs}")
}

fn git_sha_short() -> Option<String> {
    std::env::var("GIT_SHA")
        .ok()
        .or_else(|| std::env::var("GITHUB_SHA").ok())
        .map(|s| s.chars().take(12).collect())
}

fn write_json(out: Option<&PathBuf>, value: &impl serde::Serialize) -> io::Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
    if let Some(out) = out {
        fs::write(out, json)?;
    } else {
        println!("{json}");
    }
    Ok(())
}

fn main() -> io::Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    let cfg = BenchConfig {
        profile: args.profile.into(),
        seed: args.seed,
    };
    let deadline = args
        .timeout_ms
        .map(|ms| Deadline::after(Duration::from_millis(ms)))
        .unwrap_or_default();
    let service = ValidationService::new(cfg.clone());

    let mut report = ContractReport {
        run: RunMeta {
            schema_version: 1,
            bench_version: env!("CARGO_PKG_VERSION").to_string(),
            profile: cfg.profile.as_str().to_string(),
            seed: cfg.seed,
            timestamp_utc: now_utc_rfc3339(),
            git_sha: git_sha_short(),
        },
        validation: Vec::new(),
        benchmarks: None,
    };

    match &args.cmd {
        Command::Validate {
            scenarios,
            deep,
            concurrency,
        } => {
            let request = ValidateTypesRequest {
                scenarios: scenarios.clone(),
                deep_validation: *deep,
            };
            let calls = (*concurrency).max(1);
            let responses: Result<Vec<_>, _> = (0..calls)
                .into_par_iter()
                .map(|_| service.validate_types(&request, &deadline))
                .collect();
            report.validation = responses?;
        }
        Command::Bench {
            iterations,
            data_size,
            names,
        } => {
            let request = BenchmarkRequest {
                iterations: *iterations,
                data_size: *data_size,
                names: names.clone(),
            };
            report.benchmarks = Some(service.run_benchmarks(&request, &deadline)?);
        }
        Command::Stream => {
            let stdin = io::stdin().lock();
            let stdout = io::stdout().lock();
            let mut transport = JsonLinesTransport::new(stdin, stdout);
            let served = service.stream_validate(&mut transport)?;
            info!(responses = served as u64, "stream finished");
            // Stream output is the response lines themselves.
            return Ok(());
        }
        Command::Ready => {
            return match service.readiness() {
                Ok(()) => write_json(
                    args.out.as_ref(),
                    &json!({"status": "ready", "timestamp": now_utc_rfc3339()}),
                ),
                Err(e) => {
                    error!(error = %e, "readiness check failed");
                    write_json(
                        args.out.as_ref(),
                        &json!({"status": "not ready", "error": e.to_string()}),
                    )?;
                    Err(e.into())
                }
            };
        }
    }

    write_json(args.out.as_ref(), &report)?;

    if !report.success() {
        return Err(io::Error::other("one or more representation contracts failed"));
    }
    Ok(())
}
