mod bootstrap_helpers;

use anyhow::Result;
use clap::Parser;
use quill_cli::{run_cli, Cli};

use crate::bootstrap_helpers::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    run_cli(Cli::parse()).await
}
