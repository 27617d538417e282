use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use log::{debug, info};
use oxdeps_no_extraneous_import::{Config, OutputFormat};
use std::io::{BufWriter, Write};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "oxdeps")]
#[command(about = "Checks that JavaScript/TypeScript imports are declared dependencies", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Report imports of packages missing from package.json
    NoExtraneousImport(Config),
}

fn main() -> Result<()> {
    env_logger::init();

    // stdio is blocked by LineWriter, use a BufWriter to reduce syscalls.
    // See https://github.com/rust-lang/rust/issues/60673
    let mut stdout = BufWriter::new(std::io::stdout());

    let cli = Cli::parse();
    debug!("Parsed CLI arguments: {:?}", cli.command);

    let start = Instant::now();

    match cli.command {
        Commands::NoExtraneousImport(mut cfg) => {
            let num_threads = rayon::current_num_threads();
            info!("Running no-extraneous-import check (using {} threads)", num_threads);

            // Resolve the root up front so the report can relativize paths
            cfg.initialize()?;
            debug!("Config: root={:?}, include={:?}", cfg.root, cfg.include);

            let result = oxdeps_no_extraneous_import::run_no_extraneous_import_check(cfg.clone())?;
            debug!(
                "Found {} diagnostics, {} manifest errors",
                result.diagnostics.len(),
                result.manifest_errors.len()
            );

            let elapsed_ms = start.elapsed().as_millis();

            match cfg.format {
                OutputFormat::Json => {
                    oxdeps_no_extraneous_import::print_json(&mut stdout, &result)?;
                }
                OutputFormat::Tree => {
                    if result.has_failures() {
                        oxdeps_no_extraneous_import::print_diagnostics_tree(
                            &mut stdout,
                            &result,
                            &cfg,
                        )?;
                    } else {
                        info!("No extraneous imports");
                        oxdeps_no_extraneous_import::print_no_extraneous_message(
                            &mut stdout,
                            result.files_analyzed,
                        )?;
                    }
                    writeln!(
                        stdout,
                        "\n{} Finished in {}ms on {} files (using {} threads).",
                        "●".bright_blue(),
                        elapsed_ms.to_string().cyan(),
                        result.files_analyzed.to_string().cyan(),
                        num_threads.to_string().cyan()
                    )?;
                }
            }
            stdout.flush()?;

            if result.has_failures() {
                // Non-zero exit to fail CI
                std::process::exit(1);
            }

            Ok(())
        }
    }
}
