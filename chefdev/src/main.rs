mod application;

mod presentation {
    pub mod cli;
}

use chef_core::error::Result;
use std::process::ExitCode;

fn main() -> Result<ExitCode> {
    application::run()
}
