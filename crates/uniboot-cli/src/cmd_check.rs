// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Verify that the current run manifests match the lock file.

use clap::Args;
use miette::Result;
use uniboot::{LockChange, LockChangeKind};

/// Verify boot commands match the lock file
#[derive(Debug, Args)]
pub struct CmdCheck {
    #[clap(flatten)]
    packages: crate::PackageFlags,

    #[clap(flatten)]
    output: crate::OutputFlags,

    /// Exit with error on mismatch
    #[clap(long)]
    strict: bool,
}

impl CmdCheck {
    pub fn run(&mut self) -> Result<i32> {
        let registry = self.packages.build_registry()?;
        let resolved = registry.resolve_all()?;

        let lock_path = self.output.lock_path();
        if !lock_path.exists() {
            if self.strict {
                return Err(miette::miette!("No lock file found at {:?}", lock_path));
            } else {
                println!("Warning: No lock file found");
                return Ok(2);
            }
        }

        let lock = uniboot::LockFile::load(&lock_path)?;
        let changes = uniboot::verify_lock(&lock, &registry, &resolved)?;

        if changes.is_empty() {
            println!("✓ Boot commands match lock file");
            return Ok(0);
        }

        // Report changes
        if self.strict {
            eprintln!("Error: Boot commands differ from lock file:");
        } else {
            println!("Warning: Boot commands differ from lock file:");
        }

        for change in &changes {
            println!("{}", describe_change(change));
        }

        if self.strict {
            return Ok(1);
        }

        println!("\nRun 'uniboot persist --lock' to update the lock file");
        Ok(0)
    }
}

fn describe_change(change: &LockChange) -> String {
    match change.kind {
        LockChangeKind::SourceFileChanged => {
            format!("  - Run manifest '{}' was modified", change.reference)
        }
        LockChangeKind::SourceFileRemoved => {
            format!("  - Run manifest '{}' is no longer included", change.reference)
        }
        LockChangeKind::ArtifactChanged => {
            format!("  - Boot command of '{}' changed", change.reference)
        }
        LockChangeKind::ArtifactRemoved => {
            format!("  - Configuration set '{}' was removed", change.reference)
        }
        LockChangeKind::ArtifactAdded => {
            format!("  - Configuration set '{}' is not locked", change.reference)
        }
    }
}
