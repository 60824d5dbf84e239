//! tasc-stubs
//!
//! Writes the generated interface of every bundled domain to a directory:
//! `<domain>.rs` (a `<Domain>Operations` trait) and `<domain>.json`.
//!
//! Usage: `tasc-stubs [DIR]`. DIR defaults to `$TASC_STUB_DIR`, then
//! `./stubs`. `--list` prints operation names per domain instead.

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use tasc::{logging, standard_builder, ToolkitConfig};
use tasc_ops::{write_stubs, STUB_DIR_ENV};
use tracing::{error, info};

fn stub_dir(arg: Option<String>) -> PathBuf {
    arg.map(PathBuf::from)
        .or_else(|| env::var(STUB_DIR_ENV).ok().filter(|d| !d.trim().is_empty()).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("stubs"))
}

fn main() -> ExitCode {
    logging::init_logging();

    let arg = env::args().nth(1);
    // Generation is explicit here; the toolkit must not write on its own
    let toolkit = standard_builder()
        .with_config(ToolkitConfig::default().with_stub_generation(false))
        .init();

    if arg.as_deref() == Some("--list") {
        for (domain, names) in toolkit.registry().list_available_operations(None) {
            println!("{} ({})", domain, names.len());
            for name in names {
                println!("  {}", name);
            }
        }
        return ExitCode::SUCCESS;
    }

    let dir = stub_dir(arg);
    let result = toolkit
        .generate_stubs()
        .and_then(|stubs| write_stubs(&stubs, &dir));
    match result {
        Ok(written) => {
            info!(dir = %dir.display(), files = written.len(), "stubs written");
            for path in written {
                println!("{}", path.display());
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "stub generation failed");
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
