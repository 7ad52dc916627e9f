mod args;

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use tracing_subscriber::EnvFilter;
use utf8_lanes::HarnessConfig;
use utf8_lanes::bench::PlatformInfo;
use utf8_lanes::harness::validators::create_all;
use utf8_lanes::harness::{
    BlockPool, FileSet, HarnessError, RandomSet, Runner, RunnerOptions, StandardSet, TestItem, Validator,
    Verdict,
};

use args::Cli;

/// Exit status when any validator of ours got an item wrong
const EXIT_FAILURE_RECORDED: u8 = 2;

/// Items up to this size are dumped in hex at -vvv
const HEX_DUMP_LIMIT: usize = 256;

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<HarnessConfig, HarnessError> {
    let explicit = cli
        .config
        .as_deref()
        .map(|path| PathBuf::from(shellexpand::tilde(path).into_owned()));
    HarnessConfig::load_with_overrides(explicit.as_deref()).map_err(|e| HarnessError::Config(e.to_string()))
}

fn select_validators(cli: &Cli) -> Result<Vec<Box<dyn Validator>>, HarnessError> {
    match &cli.check {
        Some(name) => {
            let chosen: Vec<Box<dyn Validator>> =
                create_all(true).into_iter().filter(|v| v.name() == name.as_str()).collect();
            if chosen.is_empty() {
                return Err(HarnessError::UnknownValidator(name.clone()));
            }
            Ok(chosen)
        }
        None => Ok(create_all(cli.broken)),
    }
}

fn list() {
    println!("Platform: {}", PlatformInfo::detect().display());
    println!("Vector backend: {}", utf8_lanes::simd::backend_name());
    println!("\nValidators:");
    for validator in create_all(true) {
        let origin = if validator.ours() { "ours" } else { "independent" };
        let note = if validator.name() == "lenient" { ", only with -b or -c" } else { "" };
        println!("  {:<12} {}{}", validator.name(), origin, note);
    }
}

/// The one item source the invocation asks for.
fn items(cli: &Cli, config: &HarnessConfig) -> Result<Box<dyn Iterator<Item = TestItem>>, HarnessError> {
    let random = cli.wants_random();
    let chosen = [cli.standard, random, !cli.files.is_empty()].iter().filter(|&&on| on).count();
    if chosen != 1 {
        return Err(HarnessError::InvalidInvocation(
            "choose exactly one of -s (standard), -r (random) or a list of files".to_string(),
        ));
    }

    if cli.standard {
        return Ok(Box::new(StandardSet::new()));
    }
    if random {
        let settings = &config.random;
        let min = cli.min_length.unwrap_or(settings.min_length);
        let max = cli.max_length.unwrap_or(settings.max_length);
        let set = RandomSet::new(cli.seed.unwrap_or(settings.seed), min, max)?
            .with_limit(cli.random_count.unwrap_or(settings.count))
            .entirely_valid(cli.valid_only);
        return Ok(Box::new(set));
    }
    Ok(Box::new(FileSet::new(&cli.files)?))
}

pub fn run() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.list {
        list();
        return Ok(ExitCode::SUCCESS);
    }

    let config = load_config(&cli)?;
    let items = items(&cli, &config)?;
    let validators = select_validators(&cli)?;

    let options = RunnerOptions {
        keep_going: cli.keep_going,
        alignment: cli.alignment(),
        repeat: if cli.timings { config.timing.repeat } else { 1 },
        record_timings: cli.timings,
    };
    let pool = BlockPool::new();
    let mut runner = Runner::new(validators, options, &pool);
    tracing::info!(
        validators = ?runner.validator_names(),
        backend = utf8_lanes::simd::backend_name(),
        "starting run"
    );

    let verbose = cli.verbose;
    let totals = runner.run_all(items, |item, report| {
        if verbose >= 3 {
            println!("### {} ({} bytes)", item.description, item.bytes.len());
            if item.bytes.len() <= HEX_DUMP_LIMIT {
                println!("    {}", hex::encode(&item.bytes));
            }
        }
        if verbose >= 2 || report.verdict != Verdict::Good {
            println!("{}", report.line());
        }
    })?;

    println!("{}", totals);
    if cli.timings {
        print!("{}", runner.timing_csv());
    }

    if totals.failed > 0 {
        Ok(ExitCode::from(EXIT_FAILURE_RECORDED))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
