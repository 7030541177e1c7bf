use chef_core::pipeline::DEFAULT_LEVEL;
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about = "chefdev: cook bytes into emoji and back", long_about = None)]
pub struct Cli {
    /// Log more to stderr (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Clone, Debug)]
pub struct CodecArgs {
    /// quick (64), light (128), classic (256) or gourmet (1024)
    #[arg(long)]
    pub recipe: Option<String>,

    /// none, zlib or zstd
    #[arg(long, default_value = "none")]
    pub compression: String,

    /// none, crc32, sha256 or blake3
    #[arg(long, default_value = "none")]
    pub verification: String,

    #[arg(long, default_value_t = DEFAULT_LEVEL)]
    pub level: i32,
}

#[derive(Args, Clone, Debug)]
pub struct PlanArgs {
    /// Memory budget in MiB (default: half of available memory)
    #[arg(long = "memory-mb")]
    pub memory_mb: Option<u64>,

    /// Worker limit (default: all logical cores)
    #[arg(long)]
    pub cores: Option<usize>,

    /// JSON file with planner tunables
    #[arg(long)]
    pub policy: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Encode text (argument or stdin) and print the artifact
    Encode {
        text: Option<String>,
        #[command(flatten)]
        codec: CodecArgs,
    },

    /// Decode an artifact (argument or stdin) back to text
    Decode {
        artifact: Option<String>,
        #[command(flatten)]
        codec: CodecArgs,
    },

    /// Encode one file into a `.emoji` artifact
    EncodeFile {
        input: PathBuf,
        /// defaults to `<input>.emoji`
        output: Option<PathBuf>,
        #[command(flatten)]
        codec: CodecArgs,
    },

    /// Decode one `.emoji` artifact back into a file
    DecodeFile {
        input: PathBuf,
        /// defaults to `<stem>_decoded.<ext>` next to the input
        output: Option<PathBuf>,
        #[command(flatten)]
        codec: CodecArgs,
    },

    /// Encode or decode many files in parallel
    Batch {
        /// encode or decode
        operation: String,
        out_dir: PathBuf,
        /// files or directories
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        #[command(flatten)]
        codec: CodecArgs,
        #[command(flatten)]
        plan: PlanArgs,
    },

    /// Size, mime type and suggested recipe for a file
    Info {
        path: PathBuf,
        #[arg(long)]
        json: bool,
    },

    /// List the available recipes
    Recipes {
        #[arg(long)]
        json: bool,
    },
}
