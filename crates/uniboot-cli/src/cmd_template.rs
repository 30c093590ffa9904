// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Implementation of the `uniboot template` command.

use clap::Args;
use miette::Result;
use uniboot::RuntimeKind;

/// Print the run manifest template of a runtime
#[derive(Debug, Args)]
pub struct CmdTemplate {
    /// Runtime to print the template for
    #[clap(long, short = 'r')]
    runtime: RuntimeKind,

    /// Leave out the explanatory comments
    #[clap(long)]
    plain: bool,
}

impl CmdTemplate {
    pub fn run(&mut self) -> Result<i32> {
        print!("{}", crate::cmd_init::render_template(self.runtime, self.plain));
        Ok(0)
    }
}
