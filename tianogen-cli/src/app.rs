use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// tianogen - AutoGen glue-code generation for EDK firmware modules
#[derive(Debug, Parser)]
#[command(name = "tianogen", version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOptions,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared across all subcommands.
#[derive(Debug, Parser)]
pub struct GlobalOptions {
    /// Emit output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose (debug-level) logging output.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate AutoGen.h and AutoGen.c for one module or for every module of a workspace.
    Generate {
        /// Path to the workspace document.
        #[arg(value_name = "WORKSPACE")]
        path: PathBuf,

        /// Target architecture: IA32, X64, IPF, or EBC.
        #[arg(short, long, default_value = "IA32")]
        arch: String,

        /// Base name of the module to generate.
        #[arg(short, long, required_unless_present = "all", conflicts_with = "all")]
        module: Option<String>,

        /// Generate every non-library module into <OUTPUT>/<MODULE>/<ARCH>.
        #[arg(long)]
        all: bool,

        /// Output directory.
        #[arg(short, long, value_name = "DIR")]
        output: PathBuf,

        /// Firmware-volume directory holding the legacy FlashMap.h.
        #[arg(long, value_name = "DIR")]
        fv_dir: Option<PathBuf>,

        /// Unload dispatcher policy: run-all or stop-on-error.
        #[arg(long, default_value = "run-all")]
        unload_policy: String,

        /// PCD header fragment appended to AutoGen.h.
        #[arg(long, value_name = "FILE")]
        pcd_header: Option<PathBuf>,

        /// PCD source fragment appended to AutoGen.c.
        #[arg(long, value_name = "FILE")]
        pcd_source: Option<PathBuf>,
    },

    /// Show the library constructor and destructor order of a module.
    Order {
        /// Path to the workspace document.
        #[arg(value_name = "WORKSPACE")]
        path: PathBuf,

        /// Target architecture: IA32, X64, IPF, or EBC.
        #[arg(short, long, default_value = "IA32")]
        arch: String,

        /// Base name of the module.
        #[arg(short, long)]
        module: String,
    },

    /// Show the aggregated and resolved PPIs, protocols and GUIDs of a module.
    Capabilities {
        /// Path to the workspace document.
        #[arg(value_name = "WORKSPACE")]
        path: PathBuf,

        /// Target architecture: IA32, X64, IPF, or EBC.
        #[arg(short, long, default_value = "IA32")]
        arch: String,

        /// Base name of the module.
        #[arg(short, long)]
        module: String,
    },
}
