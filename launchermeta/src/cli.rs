//! CLI argument definitions for the launcher metadata generator.
//!
//! Each subcommand maps to one build step. The binary is invoked by the
//! product's build after the relevant artifacts exist.

use crate::config::DEFAULT_CONFIG_FILE;
use crate::staging::StagingInputs;
use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use log::LevelFilter;

/// Generate integrity and update metadata for launcher distributions.
#[derive(Parser, Debug)]
#[command(name = "launchermeta")]
#[command(version, about)]
#[command(after_help = concat!(
    "EXAMPLES:\n",
    "  Export the trust manifest for the launcher:\n",
    "    $ launchermeta export-cnl --dependencies build/deps.json --output build/cloudnet.cnl\n\n",
    "  Refresh the module registry and stage the self-update files:\n",
    "    $ launchermeta post-build --node node.jar --launcher launcher.jar \\\n",
    "        --launcher-patcher launcher-patcher.jar",
))]
pub struct Cli {
    /// Path to the generator configuration.
    #[arg(short, long, global = true, value_name = "FILE", default_value = DEFAULT_CONFIG_FILE)]
    pub config: Utf8PathBuf,

    /// Increase log output (repeat for more).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log warnings and errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Build step to run.
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Log level selected by `-v` and `-q`.
    #[must_use]
    pub fn log_level(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::Warn;
        }
        match self.verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Write the CNL trust manifest for the resolved runtime dependencies.
    ExportCnl(ExportCnlArgs),

    /// Refresh the module registry and publish module archives.
    UpdateRegistry,

    /// Rebuild the self-update staging directory.
    PrepareStaging(StagingArgs),

    /// Run `update-registry` followed by `prepare-staging`.
    PostBuild(StagingArgs),

    /// Check the staging directory against its checksum file.
    VerifyStaging,
}

/// Arguments for `export-cnl`.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct ExportCnlArgs {
    /// JSON list of resolved dependencies written by the build tool.
    #[arg(short, long, value_name = "FILE")]
    pub dependencies: Utf8PathBuf,

    /// Destination of the manifest.
    #[arg(short, long, value_name = "FILE")]
    pub output: Utf8PathBuf,
}

/// Build outputs for the staging steps.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct StagingArgs {
    /// The built core runtime archive.
    #[arg(long, value_name = "FILE")]
    pub node: Utf8PathBuf,

    /// The built launcher archive.
    #[arg(long, value_name = "FILE")]
    pub launcher: Utf8PathBuf,

    /// The built launcher patcher archive.
    #[arg(long, value_name = "FILE")]
    pub launcher_patcher: Utf8PathBuf,
}

impl StagingArgs {
    /// Staging inputs using `registry` as the module registry document.
    #[must_use]
    pub fn into_inputs(self, registry: Utf8PathBuf) -> StagingInputs {
        StagingInputs {
            node: self.node,
            launcher: self.launcher,
            launcher_patcher: self.launcher_patcher,
            registry,
        }
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
