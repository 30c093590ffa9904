// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Implementation of the `uniboot init` command.

use std::path::PathBuf;

use clap::Args;
use miette::Result;
use uniboot::{RunManifest, RuntimeKind};

/// Create a new meta/run.yaml file
#[derive(Debug, Args)]
pub struct CmdInit {
    /// Package directory to create the file in
    #[clap(default_value = ".")]
    path: PathBuf,

    /// Runtime of the package (native, node, java, python)
    #[clap(long, short = 'r')]
    runtime: RuntimeKind,

    /// Leave out the explanatory comments
    #[clap(long)]
    plain: bool,

    /// Overwrite an existing run manifest
    #[clap(long)]
    force: bool,
}

impl CmdInit {
    pub fn run(&mut self) -> Result<i32> {
        let manifest_path = self.path.join(uniboot::RUN_MANIFEST_PATH);

        if manifest_path.exists() && !self.force {
            return Err(miette::miette!(
                help = "Use --force to overwrite it",
                "{} already exists at {:?}",
                uniboot::RUN_MANIFEST_PATH,
                manifest_path
            ));
        }

        let content = render_template(self.runtime, self.plain);
        crate::write_file(&manifest_path, &content)?;
        tracing::info!(path = ?manifest_path, runtime = %self.runtime, "created run manifest");

        println!("Created {} at {:?}", uniboot::RUN_MANIFEST_PATH, manifest_path);
        println!();
        println!("Next steps:");
        println!("  1. Fill in the 'default' configuration set");
        println!("  2. Run 'uniboot show -p NAME={}' to preview the boot command", self.path.display());
        println!("  3. Run 'uniboot persist' to write the boot commands");

        Ok(0)
    }
}

/// Manifest template for a runtime, optionally without comments.
pub fn render_template(kind: RuntimeKind, plain: bool) -> String {
    let template = RunManifest::template(kind);
    if plain {
        uniboot::strip_comments(&template)
    } else {
        template
    }
}
