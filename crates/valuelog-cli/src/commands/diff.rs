//! Diff command
//!
//! Usage: valuelog diff <BEFORE> <AFTER> [--exit-code]
//!
//! Prints the diff tokens on one line; prints nothing when the documents
//! do not differ.

use clap::Args;
use std::path::PathBuf;
use std::time::Instant;

use valuelog_core::{diff_objects, log_op_end, log_op_start};

const OP_DIFF_FILES: &str = "diff_files";

#[derive(Debug, Args)]
pub struct DiffArgs {
    /// Document before the change
    pub before: PathBuf,

    /// Document after the change
    pub after: PathBuf,

    /// Exit with status 1 when the documents differ
    #[arg(long)]
    pub exit_code: bool,
}

/// Returns the process exit status.
pub fn execute(args: DiffArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let start = Instant::now();
    log_op_start!(OP_DIFF_FILES);

    let before = super::read_document(&args.before)?;
    let after = super::read_document(&args.after)?;
    let out = diff_objects(&before, &after)?;
    if !out.is_empty() {
        println!("{}", out);
    }

    log_op_end!(
        OP_DIFF_FILES,
        duration_ms = start.elapsed().as_millis() as u64,
        diff_len = out.len()
    );
    Ok(if args.exit_code && !out.is_empty() { 1 } else { 0 })
}
