//! archgraph CLI entry point.

use std::{process, str::FromStr};

use clap::Parser;
use log::{LevelFilter, debug, error, info};

use archgraph_cli::{Args, error_adapter::to_reportables};

fn main() {
    miette::set_panic_hook();

    let args = Args::parse();

    let log_level = LevelFilter::from_str(&args.log_level).unwrap_or_else(|_| {
        eprintln!("Unknown log level `{}`, logging warnings only", args.log_level);
        LevelFilter::Warn
    });

    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();

    info!(log_level:?; "Starting archgraph");
    debug!(args:?; "Parsed arguments");

    match archgraph_cli::run(&args) {
        Ok(summary) => {
            println!("{summary}");
            info!("Completed successfully");
        }
        Err(err) => {
            let reporter = miette::GraphicalReportHandler::new();

            for reportable in to_reportables(&err) {
                let mut rendered = String::new();
                if reporter.render_report(&mut rendered, &reportable).is_err() {
                    rendered = reportable.to_string();
                }
                error!("{rendered}");
            }

            process::exit(1);
        }
    }
}
