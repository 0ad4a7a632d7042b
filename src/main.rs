use anyhow::{Context, Result};
use clap::{crate_version, Arg, ArgAction, ArgMatches, Command};
use flatsource::{execute, plan, AppConfig, FlattenConfig, FlattenPlan, OutputFormat, RunReport};
use std::path::PathBuf;
use tracing::{debug, error, info, Level};
use tracing_subscriber::EnvFilter;

const EPILOG: &str = "\
EXAMPLES:
  1. Mixed mapping (specific outputs):
     flatsource --dest ./backup --in-ext js css html --out-ext txt css html
     (Result: .js->.txt, .css->.css, .html->.html)

  2. Default fallback (missing output extensions default to .txt):
     flatsource --dest ./backup --in-ext js css html --out-ext txt css
     (Result: .js->.txt, .css->.css, .html->.txt)

  3. Single output (convert everything to .txt):
     flatsource --dest ./backup --in-ext js css html --out-ext txt";

fn main() -> Result<()> {
    let matches = build_cli().get_matches();

    // Initialize configuration from command line arguments
    let config = create_app_config(&matches)?;

    // Load .env before the filter reads RUST_LOG
    let dotenv_loaded = dotenvy::dotenv().is_ok();

    initialize_logging(&config.log_level)?;
    if !dotenv_loaded {
        debug!("No .env file found, using system environment variables");
    }

    run_application(config)
}

fn build_cli() -> Command {
    Command::new("flatsource")
        .version(crate_version!())
        .about("Recursive scan, flatten, and smart extension mapping into one directory")
        .after_help(EPILOG)
        .arg(
            Arg::new("root")
                .long("root")
                .value_name("DIR")
                .help("Root directory to scan")
                .default_value("."),
        )
        .arg(
            Arg::new("dest")
                .long("dest")
                .value_name("DIR")
                .help("Destination directory")
                .required(true),
        )
        .arg(
            Arg::new("in-ext")
                .long("in-ext")
                .value_name("EXT")
                .help("Input extensions (e.g. js css html)")
                .num_args(1..)
                .required(true),
        )
        .arg(
            Arg::new("out-ext")
                .long("out-ext")
                .value_name("EXT")
                .help("Output extensions, mapped 1-to-1 with inputs")
                .num_args(1..)
                .required(true),
        )
        .arg(
            Arg::new("exclude")
                .long("exclude")
                .value_name("PATTERN")
                .help("Folder or file name patterns to exclude (shell glob)")
                .num_args(0..),
        )
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .help("Simulate the process without writing anything")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_name("LEVEL")
                .help("Set the log level (trace, debug, info, warn, error)")
                .default_value("info"),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .value_name("FORMAT")
                .help("Plan and report output format")
                .value_parser(["text", "json"])
                .default_value("text"),
        )
}

/// Pure function to create application configuration from CLI arguments
fn create_app_config(matches: &ArgMatches) -> Result<AppConfig> {
    let strings = |id: &str| -> Vec<String> {
        matches
            .get_many::<String>(id)
            .map(|values| values.cloned().collect())
            .unwrap_or_default()
    };

    let root = matches
        .get_one::<String>("root")
        .map(PathBuf::from)
        .context("missing --root value")?;
    let destination = matches
        .get_one::<String>("dest")
        .map(PathBuf::from)
        .context("missing --dest value")?;
    let log_level = matches
        .get_one::<String>("log-level")
        .cloned()
        .unwrap_or_else(|| "info".to_string());
    let format = match matches.get_one::<String>("format").map(String::as_str) {
        Some("json") => OutputFormat::Json,
        _ => OutputFormat::Text,
    };

    Ok(AppConfig {
        flatten: FlattenConfig {
            root,
            destination,
            in_exts: strings("in-ext"),
            out_exts: strings("out-ext"),
            exclude: strings("exclude"),
            dry_run: matches.get_flag("dry-run"),
        },
        log_level,
        format,
    })
}

/// Initialize structured logging with tracing
fn initialize_logging(log_level: &str) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

fn run_application(config: AppConfig) -> Result<()> {
    let plan = plan(&config.flatten).context("Invalid configuration")?;
    print_plan(&plan, config.format)?;

    match execute(&plan) {
        Ok(report) => {
            print_report(&report, &plan, config.format)?;
            Ok(())
        }
        Err(aborted) => {
            print_report(&aborted.report, &plan, config.format)?;
            Err(anyhow::Error::new(aborted))
        }
    }
}

/// Print the resolved plan before any file is touched
fn print_plan(plan: &FlattenPlan, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(plan)?);
        return Ok(());
    }

    info!("=== CONFIGURATION ===");
    info!("Mode:      {}", plan.mode);
    info!("Root:      {}", plan.root.display());
    info!("Dest:      {}", plan.destination.display());
    info!("Excluding: {:?}", plan.exclusions.patterns());
    info!("Mappings ({:?}):", plan.mapping.policy());
    for entry in plan.mapping.entries() {
        let marker = if entry.fallback { " (fallback)" } else { "" };
        info!("  {:<8} -> .{}{}", format!(".{}", entry.input), entry.output, marker);
    }
    Ok(())
}

/// Print the run summary, complete or aborted
fn print_report(report: &RunReport, plan: &FlattenPlan, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    for outcome in &report.outcomes {
        debug!("  {} -> {}", outcome.relative_path, outcome.destination_name);
    }

    let label = if plan.mode.is_dry_run() { "Simulation" } else { "Operation" };
    if report.completed {
        info!("=== {} COMPLETE ===", label.to_uppercase());
    } else {
        error!("=== {} ABORTED ===", label.to_uppercase());
    }
    info!("Files scanned:   {}", report.files_scanned);
    info!("Files processed: {}", report.files_written);
    info!("Files skipped:   {}", report.files_skipped);
    info!("Dirs pruned:     {}", report.dirs_pruned);
    info!("Bytes:           {}", report.bytes_written);
    if report.errors > 0 {
        error!("Errors:          {}", report.errors);
    }
    Ok(())
}
