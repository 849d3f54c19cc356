#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(coverage_nightly, coverage(off))]

//! Binary entry point for the ishybrid tool.
//!
//! This module is excluded from mutation testing because testing process entry/exit behavior
//! is impractical - it requires spawning subprocesses and checking exit codes.

use std::process::ExitCode;

use argh::FromArgs;
use ishybrid::{CoreClassifier, ProcessorId, RangeLayout, RunOptions};
use tracing_subscriber::EnvFilter;

/// Detects whether the processor has a hybrid design and which logical processors are
/// performance or efficiency cores.
#[derive(FromArgs)]
struct Args {
    /// inspect only this logical processor instead of classifying all of them
    #[argh(option, short = 'p')]
    processor: Option<ProcessorId>,

    /// list the exact ranges of each core type instead of one first-to-last range
    #[argh(switch)]
    disjoint: bool,

    /// log diagnostic details to stderr
    #[argh(switch, short = 'v')]
    verbose: bool,
}

#[cfg_attr(test, mutants::skip)]
fn main() -> ExitCode {
    let args: Args = argh::from_env();

    // RUST_LOG takes precedence over --verbose.
    let default_directive = if args.verbose { "debug" } else { "warn" };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_directive)),
        )
        .with_writer(std::io::stderr)
        .init();

    let options = RunOptions {
        processor: args.processor,
        layout: if args.disjoint {
            RangeLayout::Disjoint
        } else {
            RangeLayout::Contiguous
        },
    };

    match CoreClassifier::new().run(&options) {
        Ok(report) => {
            print!("{report}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
