#![forbid(unsafe_code)]

pub mod error;
pub mod policy;

pub mod alphabet;
pub mod transcode;

pub mod codec;
pub mod verify;

pub mod container;
pub mod payload;
pub mod pipeline;

pub mod domain;
pub mod mime;
pub mod stats;

pub mod store;
pub mod store_factory;
pub mod store_fs;

pub mod batch;
pub mod plan;

// Re-exports: stable API surface
pub use alphabet::{Alphabet, Recipe};
pub use batch::{BatchReport, CancelToken, FileJob, JobOutcome, Operation, jobs_for};
pub use batch::{run_batch, run_batch_with_cancel};
pub use codec::CompressionMethod;
pub use error::{ChefError, Result};
pub use payload::EncodedPayload;
pub use pipeline::{Codec, CodecConfig};
pub use plan::{MemoryBudget, ResourcePlan, plan_batch};
pub use policy::PlannerPolicy;
pub use stats::{EncodingStats, ProcessingStats};
pub use verify::VerificationMethod;
