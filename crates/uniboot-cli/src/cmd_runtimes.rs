// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Implementation of the `uniboot runtimes` command.

use clap::Args;
use colored::Colorize;
use miette::Result;
use uniboot::{Runtime, SUPPORTED_RUNTIMES};

/// List supported runtimes
#[derive(Debug, Args)]
pub struct CmdRuntimes {}

impl CmdRuntimes {
    pub fn run(&mut self) -> Result<i32> {
        println!("{}", "Supported Runtimes:".bold());
        println!();

        for kind in SUPPORTED_RUNTIMES {
            let runtime = Runtime::blank(*kind);
            println!("  {} {}", format!("{kind:<8}").cyan(), runtime.description());
            let dependencies = runtime.dependencies();
            if !dependencies.is_empty() {
                println!("  {:<8} {}", "", format!("requires: {}", dependencies.join(", ")).dimmed());
            }
        }

        println!();
        println!("Total: {} runtime(s)", SUPPORTED_RUNTIMES.len());
        Ok(0)
    }
}
