// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! uniboot - Unikernel run manifest resolution CLI

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result, WrapErr};

mod cmd_check;
mod cmd_init;
mod cmd_persist;
mod cmd_runtimes;
mod cmd_show;
mod cmd_template;

use cmd_check::CmdCheck;
use cmd_init::CmdInit;
use cmd_persist::CmdPersist;
use cmd_runtimes::CmdRuntimes;
use cmd_show::CmdShow;
use cmd_template::CmdTemplate;

#[cfg(test)]
#[path = "./main_test.rs"]
mod main_test;

#[derive(Parser)]
#[clap(
    name = "uniboot",
    about = "Unikernel run manifest resolver",
    version,
    long_about = "Validate package run manifests and generate the boot commands of their configuration sets"
)]
struct Opt {
    #[clap(flatten)]
    logging: Logging,

    #[clap(subcommand)]
    cmd: Command,
}

#[derive(Parser)]
struct Logging {
    /// Increase verbosity (-v, -vv, -vvv)
    #[clap(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[clap(short, long, global = true)]
    quiet: bool,
}

/// A package given on the command line as `NAME=DIR`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackageArg {
    pub name: String,
    pub dir: PathBuf,
}

fn parse_package_arg(value: &str) -> std::result::Result<PackageArg, String> {
    let (name, dir) = value
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=DIR, got '{value}'"))?;
    if name.is_empty() || dir.is_empty() {
        return Err(format!("expected NAME=DIR, got '{value}'"));
    }
    Ok(PackageArg {
        name: name.to_string(),
        dir: PathBuf::from(dir),
    })
}

#[derive(Parser, Clone, Debug, Default)]
pub struct PackageFlags {
    /// Package to include as NAME=DIR, dependencies first
    #[clap(
        long = "package",
        short = 'p',
        env = "UNIBOOT_PACKAGES",
        value_delimiter = ',',
        value_parser = parse_package_arg,
        required = true
    )]
    pub packages: Vec<PackageArg>,
}

impl PackageFlags {
    /// Load the run manifest of every package, in the order given.
    ///
    /// Packages without a run manifest are skipped.
    pub fn build_registry(&self) -> Result<uniboot::ConfigRegistry> {
        let mut registry = uniboot::ConfigRegistry::new();
        for package in &self.packages {
            let dir = uniboot::resolve_package_dir(&package.dir)?;
            match uniboot::RunManifest::load_package(&dir)
                .wrap_err_with(|| format!("Failed to load package '{}'", package.name))?
            {
                Some(manifest) => registry.add(package.name.as_str(), manifest),
                None => tracing::warn!(
                    package = %package.name,
                    dir = ?dir,
                    "no {} found, skipping package",
                    uniboot::RUN_MANIFEST_PATH
                ),
            }
        }
        Ok(registry)
    }
}

/// Image root that `run/` and the lock file are written under.
#[derive(Parser, Clone, Debug)]
pub struct OutputFlags {
    /// Root directory of the image contents
    #[clap(long = "output", short = 'o', env = "UNIBOOT_OUTPUT", default_value = ".")]
    pub output: PathBuf,
}

impl OutputFlags {
    pub fn lock_path(&self) -> PathBuf {
        self.output
            .join(uniboot::RUN_DIR_NAME)
            .join(uniboot::UNIBOOT_LOCK_FILENAME)
    }
}

#[derive(Subcommand)]
enum Command {
    /// Create a new meta/run.yaml file
    Init(CmdInit),

    /// List supported runtimes
    Runtimes(CmdRuntimes),

    /// Print the run manifest template of a runtime
    Template(CmdTemplate),

    /// Display the resolved boot command of a configuration set
    Show(CmdShow),

    /// Write boot commands of all configuration sets
    Persist(CmdPersist),

    /// Verify boot commands match the lock file
    Check(CmdCheck),
}

impl Opt {
    fn run(self) -> Result<i32> {
        // Setup logging
        let log_level = match (self.logging.quiet, self.logging.verbose) {
            (true, _) => tracing::Level::ERROR,
            (false, 0) => tracing::Level::WARN,
            (false, 1) => tracing::Level::INFO,
            (false, 2) => tracing::Level::DEBUG,
            (false, _) => tracing::Level::TRACE,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_writer(std::io::stderr)
            .init();

        // Dispatch to command
        match self.cmd {
            Command::Init(mut cmd) => cmd.run(),
            Command::Runtimes(mut cmd) => cmd.run(),
            Command::Template(mut cmd) => cmd.run(),
            Command::Show(mut cmd) => cmd.run(),
            Command::Persist(mut cmd) => cmd.run(),
            Command::Check(mut cmd) => cmd.run(),
        }
    }
}

/// Write `content` to `path`, creating missing parent directories.
pub(crate) fn write_file(path: &std::path::Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to create {parent:?}"))?;
    }
    std::fs::write(path, content)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to write {path:?}"))
}

fn main() -> Result<()> {
    let opt = Opt::parse();
    let code = opt.run()?;
    std::process::exit(code);
}
