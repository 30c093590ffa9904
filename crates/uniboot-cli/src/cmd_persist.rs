// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Write boot commands of every configuration set into the image root.

use clap::Args;
use colored::Colorize;
use miette::Result;

/// Write boot commands of all configuration sets
#[derive(Debug, Args)]
pub struct CmdPersist {
    #[clap(flatten)]
    packages: crate::PackageFlags,

    #[clap(flatten)]
    output: crate::OutputFlags,

    /// Also record the sources and results in a lock file
    #[clap(long)]
    lock: bool,
}

impl CmdPersist {
    pub fn run(&mut self) -> Result<i32> {
        let registry = self.packages.build_registry()?;
        if registry.is_empty() {
            println!("No run manifests found, nothing to persist");
            return Ok(0);
        }

        let resolved = registry.resolve_all()?;
        let artifacts = uniboot::persist_resolved(&self.output.output, &resolved)?;
        for artifact in &artifacts {
            println!(
                "  {}:{} -> {}",
                artifact.package.cyan(),
                artifact.config_set.cyan(),
                artifact.path.display()
            );
        }
        println!("Wrote {} boot command(s)", artifacts.len());

        if self.lock {
            let lock = uniboot::generate_lock(&registry, &resolved)?;
            let lock_path = self.output.lock_path();
            lock.save(&lock_path)?;
            println!("Generated lock file: {:?}", lock_path);
        }

        Ok(0)
    }
}
