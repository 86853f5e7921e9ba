//! Convert a cLoops loop table to BEDPE.
//!
//! ```shell
//! loop2bedpe 35233.loop /output 1
//! ```
//!
//! writes `/output/loops.bedpe`, keeping only significant loops.
use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{ArgAction, Parser};
use env_logger::{Builder, Env};
use loopoverlap::io::cloops;

#[derive(Parser)]
#[command(
    name = "loop2bedpe",
    author,
    version,
    about = "Convert cLoops loops to BEDPE",
    long_about = None
)]
struct Args {
    /// Loop table written by cLoops
    input: PathBuf,

    /// Directory to write `loops.bedpe` to
    output_dir: PathBuf,

    /// 1 to only keep significant loops, 0 to keep all loops
    #[arg(action = ArgAction::Set, value_parser = significance_flag)]
    significant: bool,
}

fn significance_flag(s: &str) -> Result<bool> {
    match s {
        "1" => Ok(true),
        "0" => Ok(false),
        _ => bail!("expected 1 (significant loops only) or 0 (all loops), got '{s}'"),
    }
}

fn main() -> Result<()> {
    Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    cloops::convert_loop_file(&args.input, &args.output_dir, args.significant)?;

    Ok(())
}
