// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Implementation of the `uniboot show` command.

use clap::Args;
use colored::Colorize;
use miette::{IntoDiagnostic, Result};
use serde_yaml::{Mapping, Value};
use uniboot::ResolvedConfigSet;

/// Display the resolved boot command of a configuration set
#[derive(Debug, Args)]
pub struct CmdShow {
    #[clap(flatten)]
    packages: crate::PackageFlags,

    /// Configuration set of the last package to show
    #[clap(long, short = 'c')]
    config_set: Option<String>,

    /// Output format: table, yaml
    #[clap(long, default_value = "table")]
    format: String,
}

impl CmdShow {
    pub fn run(&mut self) -> Result<i32> {
        let registry = self.packages.build_registry()?;

        // The package being shown is the last one given; the others only
        // provide configuration sets to inherit from.
        let Some((package, _)) = registry.packages().last() else {
            return Err(miette::miette!(
                help = "Check that each package directory contains meta/run.yaml",
                "No run manifest found in any of the given packages"
            ));
        };
        let resolved = registry.resolve(package, self.config_set.as_deref())?;

        if self.format == "yaml" {
            self.show_yaml(&resolved)?;
        } else {
            self.show_table(&resolved);
        }

        Ok(0)
    }

    fn show_table(&self, resolved: &ResolvedConfigSet) {
        println!("{}", "Configuration Set:".bold());
        println!();
        println!(
            "  {}:{}",
            resolved.package.cyan(),
            resolved.config_set.cyan()
        );
        println!("  {}", resolved.description.dimmed());

        println!();
        println!("{}", "Boot Command:".bold());
        println!();
        for token in resolved.boot_command.env_tokens() {
            if token.contains("?=") {
                println!("  {}", token.yellow());
            } else {
                println!("  {}", token.green());
            }
        }
        println!("  {}", resolved.boot_command.command);

        println!();
        println!("{}", "Required Packages:".bold());
        println!();
        if resolved.dependencies.is_empty() {
            println!("  {}", "(none)".dimmed());
        } else {
            for (i, dependency) in resolved.dependencies.iter().enumerate() {
                println!("  {}. {}", i + 1, dependency.green());
            }
        }

        println!();
        println!(
            "Run with: {}",
            uniboot::runscript_command(&resolved.config_set).cyan()
        );
    }

    fn show_yaml(&self, resolved: &ResolvedConfigSet) -> Result<()> {
        let yaml = serde_yaml::to_string(&to_yaml_value(resolved)).into_diagnostic()?;
        print!("{yaml}");
        Ok(())
    }
}

fn to_yaml_value(resolved: &ResolvedConfigSet) -> Value {
    let mut mapping = Mapping::new();
    mapping.insert("package".into(), resolved.package.clone().into());
    mapping.insert("config_set".into(), resolved.config_set.clone().into());
    mapping.insert("description".into(), resolved.description.clone().into());
    mapping.insert(
        "dependencies".into(),
        Value::Sequence(
            resolved
                .dependencies
                .iter()
                .cloned()
                .map(Value::from)
                .collect(),
        ),
    );
    mapping.insert(
        "boot_command".into(),
        resolved.boot_command.to_string().into(),
    );
    mapping.insert(
        "runscript".into(),
        uniboot::runscript_command(&resolved.config_set).into(),
    );
    Value::Mapping(mapping)
}
