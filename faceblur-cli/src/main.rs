// ============================================================================
// faceblur-cli/src/main.rs
// ============================================================================
//
// MAIN ENTRY POINT: FaceBlur CLI Application
//
// Parses arguments, installs logging, dispatches to the selected command
// and maps the outcome to the process exit code. Any error is printed in
// red on stderr and exits with status 1.
//
// AI-ASSISTANT-INFO: Main entry point for the FaceBlur CLI application

use clap::Parser;
use faceblur_cli::{Cli, Commands, logging, run_blur, run_models};
use faceblur_core::CoreError;
use owo_colors::OwoColorize;
use std::process;

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Models => {
            logging::init(None, false);
            run_models();
            Ok(())
        }
        Commands::Run(args) => {
            let log_file = match args.log_dir.as_deref().map(logging::prepare_log_file).transpose() {
                Ok(path) => path,
                Err(e) => {
                    report_error(&e);
                    process::exit(1);
                }
            };
            logging::init(log_file.as_deref(), args.verbose);
            if let Some(path) = &log_file {
                log::debug!("Logging to {}", path.display());
            }
            run_blur(args).map(|_| ())
        }
    };

    if let Err(e) = result {
        log::debug!("Exiting after error: {:?}", e);
        report_error(&e);
        process::exit(1);
    }
}

fn report_error(e: &CoreError) {
    if std::env::var_os("NO_COLOR").is_some() {
        eprintln!("Error: {e}");
    } else {
        eprintln!("{}", format!("Error: {e}").red().bold());
    }
}
