//! Command line definitions

use clap::{Parser, Subcommand};
use mdz_bundler::{PayloadEncoding, CONFIG_FILE, MARKER};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mdz-build")]
#[command(
    about = "Build the markup WebAssembly module and embed it into host sources",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Print a JSON report on stdout
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run toolchain, bundles and docs from a config file
    Build {
        #[arg(short, long, value_name = "CONFIG", default_value = CONFIG_FILE)]
        config: PathBuf,
    },

    /// Splice one module into one template
    Splice {
        /// Template holding the marker
        #[arg(value_name = "TEMPLATE")]
        template: PathBuf,

        /// Compiled module
        #[arg(value_name = "ARTIFACT")]
        artifact: PathBuf,

        /// Generated source
        #[arg(short, long, value_name = "OUTPUT")]
        output: PathBuf,

        /// byte-array, base64 or fetch
        #[arg(short, long, default_value = "base64")]
        encoding: PayloadEncoding,

        #[arg(short, long, default_value = MARKER)]
        marker: String,

        /// Type declarations copied next to the output
        #[arg(short, long, value_name = "DECLARATIONS")]
        declarations: Option<PathBuf>,

        /// URL written in place of the marker for the fetch encoding
        #[arg(long, value_name = "URL")]
        module_url: Option<String>,
    },

    /// Extract a README from the annotated specification source
    Docs {
        #[arg(value_name = "SOURCE")]
        source: PathBuf,

        #[arg(short, long, value_name = "OUTPUT", default_value = "README.md")]
        output: PathBuf,
    },
}
