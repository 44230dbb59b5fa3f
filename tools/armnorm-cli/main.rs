use armnorm::prelude::*;
use clap::Parser;
use std::fs;
use std::process::ExitCode;
use std::time::Instant;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// Normalize exported Azure Resource Manager templates for redeployment
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Template files to normalize
    #[arg(required = true)]
    templates: Vec<String>,

    /// Only report which templates would change; write nothing
    #[arg(long, conflicts_with = "stdout")]
    check: bool,

    /// Print normalized templates instead of writing them back
    #[arg(long)]
    stdout: bool,

    /// JSON file with extra substitution rules: [{"find": "...", "replace": "..."}]
    #[arg(long, value_name = "FILE")]
    rules: Option<String>,

    /// Use the rules file instead of the built-in substitution table
    #[arg(long, requires = "rules")]
    replace_rules: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Default)]
struct BatchSummary {
    changed: Vec<String>,
    unchanged: Vec<String>,
    failed: Vec<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let normalizer = build_normalizer(&cli).unwrap_or_else(|e| exit_with_error(&e.to_string()));
    let summary = run_batch(&normalizer, &cli);

    print_summary(&summary, cli.check);

    if !summary.failed.is_empty() || (cli.check && !summary.changed.is_empty()) {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(format!("armnorm={},armnorm_cli={}", level, level)))
        .with_target(verbose >= 2)
        .with_writer(std::io::stderr)
        .init();
}

fn build_normalizer(cli: &Cli) -> Result<Normalizer> {
    let mut builder = Normalizer::builder();
    if let Some(rules_path) = &cli.rules {
        let text = fs::read_to_string(rules_path)
            .map_err(|e| format!("Failed to read rules file '{}': {}", rules_path, e))?;
        let rules = SubstitutionTable::from_json(&text)?;
        info!(rules = rules.len(), path = %rules_path, "Loaded substitution rules");
        for rule in rules.rules() {
            debug!(find = %rule.find, replace = %rule.replace, "Substitution rule");
        }
        if cli.replace_rules && rules.is_empty() {
            warn!(path = %rules_path, "Rules file is empty; no substitutions will run");
        }
        builder = if cli.replace_rules {
            builder.with_substitutions(rules)
        } else {
            builder.with_extra_substitutions(rules)
        };
    }
    Ok(builder.build())
}

/// Each template is handled on its own; a failure is reported and the batch moves on.
fn run_batch(normalizer: &Normalizer, cli: &Cli) -> BatchSummary {
    let mut summary = BatchSummary::default();

    for path in &cli.templates {
        let start = Instant::now();
        let outcome = if cli.stdout {
            normalizer.preview_file(path).map(|(outcome, text)| {
                println!("{}", text);
                outcome
            })
        } else if cli.check {
            normalizer.check_file(path)
        } else {
            normalizer.transform_file(path)
        };
        debug!(path = %path, elapsed = ?start.elapsed(), "Template processed");

        match outcome {
            Ok(FileOutcome::Changed) => summary.changed.push(path.clone()),
            Ok(FileOutcome::Unchanged) => summary.unchanged.push(path.clone()),
            Err(e) => {
                eprintln!("{} has error: {}", path, e);
                summary.failed.push(path.clone());
            }
        }
    }

    summary
}

fn print_summary(summary: &BatchSummary, check: bool) {
    let verb = if check { "Would rewrite" } else { "Changed" };
    for path in &summary.changed {
        eprintln!("  -> {} {}", verb, path);
    }
    for path in &summary.unchanged {
        eprintln!("  -> No changes: {}", path);
    }
    eprintln!(
        "\nDone: {} changed, {} unchanged, {} failed",
        summary.changed.len(),
        summary.unchanged.len(),
        summary.failed.len()
    );
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
