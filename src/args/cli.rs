use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Scripted load driver for OAuth-protected accounting APIs: warm-up, batched main phase, and injected faults."
)]
pub struct DriverArgs {
    /// Path to config file (TOML or JSON). Defaults to ./apiload.toml, then ./apiload.json
    #[arg(long = "config", short = 'c')]
    pub config: Option<PathBuf>,

    /// Enable debug logging (overridden by APILOAD_LOG or RUST_LOG)
    #[arg(long = "verbose", short = 'v')]
    pub verbose: bool,

    /// Disable colored status codes in the report (also honours NO_COLOR)
    #[arg(long = "no-color")]
    pub no_color: bool,
}
