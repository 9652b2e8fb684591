//! Capture command
//!
//! Usage: valuelog capture <FILE> [--pretty]

use clap::Args;
use std::path::PathBuf;
use std::time::Instant;

use valuelog_core::{capture, log_op_end, log_op_start};

const OP_CAPTURE_FILE: &str = "capture_file";

#[derive(Debug, Args)]
pub struct CaptureArgs {
    /// JSON document to capture
    pub file: PathBuf,

    /// Indent the output
    #[arg(long)]
    pub pretty: bool,
}

pub fn execute(args: CaptureArgs) -> Result<(), Box<dyn std::error::Error>> {
    let start = Instant::now();
    log_op_start!(OP_CAPTURE_FILE, path = %args.file.display());

    let document = super::read_document(&args.file)?;
    let tree = capture(&document)?;
    let out = if args.pretty {
        serde_json::to_string_pretty(&tree)?
    } else {
        tree.to_json()?
    };
    println!("{}", out);

    log_op_end!(
        OP_CAPTURE_FILE,
        duration_ms = start.elapsed().as_millis() as u64
    );
    Ok(())
}
