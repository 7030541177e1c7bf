pub mod handlers;

use crate::presentation::cli::{Cli, Commands};
use chef_core::error::Result;
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

pub fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let done = match cli.command {
        Commands::Encode { text, codec } => handlers::handle_encode(text, codec),
        Commands::Decode { artifact, codec } => handlers::handle_decode(artifact, codec),
        Commands::EncodeFile {
            input,
            output,
            codec,
        } => handlers::handle_encode_file(input, output, codec),
        Commands::DecodeFile {
            input,
            output,
            codec,
        } => handlers::handle_decode_file(input, output, codec),
        Commands::Batch {
            operation,
            out_dir,
            inputs,
            codec,
            plan,
        } => return handlers::handle_batch(operation, out_dir, inputs, codec, plan),
        Commands::Info { path, json } => handlers::handle_info(path, json),
        Commands::Recipes { json } => handlers::handle_recipes(json),
    };
    done.map(|()| ExitCode::SUCCESS)
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    // a subscriber may already be installed when embedded
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
