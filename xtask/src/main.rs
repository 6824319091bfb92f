use std::path::Path;
use std::process::{exit, Command, ExitStatus};

use clap::{Parser, Subcommand, ValueEnum};

// ── CLI definition ─────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "xtask",
    about = "Task runner for the hypercube queueing workspace",
    long_about = "A unified CLI for running the zone report, design sweeps,\n\
                  benchmarks, and CI checks in the hypercube queueing workspace."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve the 5-atom corridor under both capacities and print its metrics
    Run {
        /// Log filter passed to the example
        #[arg(long, env = "RUST_LOG", default_value = "hq_core=debug")]
        log: String,
    },
    /// Run a zone-design sweep over a synthetic grid region
    Sweep {
        /// Log filter passed to the example
        #[arg(long, env = "RUST_LOG", default_value = "warn")]
        log: String,
    },
    /// Run Criterion benchmarks
    Bench,
    /// Compare benchmarks: stash changes, create baseline, restore, compare
    BenchCompare,
    /// Run CI checks (fmt, clippy, tests, examples, benchmarks)
    Ci {
        /// Job to run
        #[arg(value_enum, default_value_t = CiJob::Check)]
        job: CiJob,
    },
    /// Run load tests (ignored large-model tests in hq_core)
    LoadTest,
}

#[derive(Clone, ValueEnum)]
enum CiJob {
    /// Formatting, clippy, and tests
    Check,
    /// Build and run examples
    Examples,
    /// Run benchmarks
    Bench,
    /// Run check + examples + bench
    All,
}

// ── helpers ────────────────────────────────────────────────────────

fn step(label: &str) {
    eprintln!("\n=== {label} ===");
}

fn cargo(args: &[&str], log: Option<&str>) -> ExitStatus {
    eprintln!("+ cargo {}", args.join(" "));
    let mut command = Command::new("cargo");
    command.args(args);
    if let Some(filter) = log {
        command.env("RUST_LOG", filter);
    }
    command.status().unwrap_or_else(|error| {
        eprintln!("failed to execute cargo: {error}");
        exit(1)
    })
}

fn git(args: &[&str]) -> ExitStatus {
    eprintln!("+ git {}", args.join(" "));
    Command::new("git").args(args).status().unwrap_or_else(|error| {
        eprintln!("failed to execute git: {error}");
        exit(1)
    })
}

fn exit_on_failure(status: ExitStatus) {
    if !status.success() {
        exit(status.code().unwrap_or(1));
    }
}

fn run_cargo(args: &[&str]) {
    exit_on_failure(cargo(args, None));
}

fn run_cargo_logged(args: &[&str], log: &str) {
    exit_on_failure(cargo(args, Some(log)));
}

fn run_git(args: &[&str]) {
    exit_on_failure(git(args));
}

const ZONE_REPORT: [&str; 6] = [
    "run",
    "-p",
    "hq_core",
    "--example",
    "zone_report",
    "--release",
];
const DESIGN_SWEEP: [&str; 6] = [
    "run",
    "-p",
    "hq_experiments",
    "--example",
    "design_sweep",
    "--release",
];
const BENCH: [&str; 5] = ["bench", "--package", "hq_core", "--bench", "performance"];

fn bench_with<'a>(criterion_args: &[&'a str]) -> Vec<&'a str> {
    BENCH
        .iter()
        .copied()
        .chain(std::iter::once("--"))
        .chain(criterion_args.iter().copied())
        .collect()
}

// ── CI jobs ────────────────────────────────────────────────────────

fn ci_check() {
    step("Check formatting");
    run_cargo(&["fmt", "--all", "--", "--check"]);

    step("Clippy");
    run_cargo(&[
        "clippy",
        "--all-targets",
        "--all-features",
        "--",
        "-D",
        "warnings",
    ]);

    step("Test hq_core");
    run_cargo(&["test", "-p", "hq_core"]);

    step("Test hq_experiments");
    run_cargo(&["test", "-p", "hq_experiments"]);
}

fn ci_examples() {
    step("Run zone_report (5-atom corridor)");
    run_cargo(&ZONE_REPORT);

    step("Run design_sweep (3x4 grid, 20 designs)");
    run_cargo(&DESIGN_SWEEP);
}

fn ci_bench() {
    step("Run benchmarks");
    run_cargo(&BENCH);
}

// ── main ───────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { log } => {
            run_cargo_logged(&ZONE_REPORT, &log);
        }
        Commands::Sweep { log } => {
            run_cargo_logged(&DESIGN_SWEEP, &log);
        }
        Commands::Bench => {
            run_cargo(&BENCH);
        }
        Commands::BenchCompare => {
            let baseline_dir = Path::new("target/criterion");
            if baseline_dir.exists() {
                step("Removing existing benchmark data");
                if let Err(error) = std::fs::remove_dir_all(baseline_dir) {
                    eprintln!("failed to remove target/criterion: {error}");
                    exit(1);
                }
            }

            step("Stashing current changes");
            run_git(&[
                "stash",
                "push",
                "-m",
                "Temporary stash for benchmark comparison",
            ]);

            step("Running benchmark to create baseline");
            run_cargo(&bench_with(&["--save-baseline", "main"]));

            step("Reapplying changes");
            run_git(&["stash", "pop"]);

            step("Running benchmark comparing against baseline");
            run_cargo(&bench_with(&["--baseline", "main"]));

            eprintln!("\nDone! Check the output above to see performance comparison.");
        }
        Commands::Ci { job } => {
            match job {
                CiJob::Check => ci_check(),
                CiJob::Examples => ci_examples(),
                CiJob::Bench => ci_bench(),
                CiJob::All => {
                    ci_check();
                    ci_examples();
                    ci_bench();
                }
            }
            eprintln!("\nCI job passed.");
        }
        Commands::LoadTest => {
            run_cargo(&[
                "test",
                "-p",
                "hq_core",
                "--release",
                "--test",
                "load_tests",
                "--",
                "--ignored",
            ]);
        }
    }
}
