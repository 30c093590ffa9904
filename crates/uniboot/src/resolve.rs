// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Boot command generation across `base` references.
//!
//! A configuration set with a `base` does not declare a command of its own.
//! Its boot command is the one of the referenced configuration set, with the
//! inheriting environment layered on top:
//!
//! - keys the base already declares are overridden before the base command is
//!   generated, so they end up as hard `KEY=VALUE` assignments;
//! - keys the base does not know about are added as soft `KEY?=VALUE`
//!   assignments and only take effect when unset at run time.
//!
//! The referenced configuration set is cloned before being overridden, so the
//! registry never observes the merge.

use std::fmt;

use crate::env::BootCommand;
use crate::registry::ConfigRegistry;
use crate::runtime::Runtime;
use crate::Error;

#[cfg(test)]
#[path = "./resolve_test.rs"]
mod resolve_test;

/// A parsed `<package>:<config_set>` reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseRef {
    pub package: String,
    pub config_set: String,
}

impl BaseRef {
    pub fn parse(reference: &str) -> crate::Result<Self> {
        let (package, config_set) = reference
            .split_once(':')
            .ok_or_else(|| Error::InvalidBaseFormat(reference.to_string()))?;
        Ok(Self {
            package: package.to_string(),
            config_set: config_set.to_string(),
        })
    }
}

impl fmt::Display for BaseRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.package, self.config_set)
    }
}

/// Build the boot command of `runtime`, following its `base` chain.
pub fn build_boot_command(runtime: &Runtime, registry: &ConfigRegistry) -> crate::Result<BootCommand> {
    let mut chain = Vec::new();
    build_with_chain(runtime, registry, &mut chain)
}

/// Build the boot command of a configuration set registered as `package:config_set`.
///
/// The set itself starts the chain, so a set that names itself as its base
/// is reported as a cycle right away.
pub(crate) fn build_registered(
    runtime: &Runtime,
    package: &str,
    config_set: &str,
    registry: &ConfigRegistry,
) -> crate::Result<BootCommand> {
    let mut chain = vec![BaseRef {
        package: package.to_string(),
        config_set: config_set.to_string(),
    }];
    build_with_chain(runtime, registry, &mut chain)
}

fn build_with_chain(
    runtime: &Runtime,
    registry: &ConfigRegistry,
    chain: &mut Vec<BaseRef>,
) -> crate::Result<BootCommand> {
    if !runtime.inherits() {
        return Ok(runtime.terminal_boot_command());
    }

    let reference = BaseRef::parse(runtime.base())?;
    if chain.contains(&reference) {
        let mut names: Vec<String> = chain.iter().map(ToString::to_string).collect();
        names.push(reference.to_string());
        return Err(Error::CyclicReference { chain: names });
    }

    let original = registry.lookup(&reference)?;

    // Push our environment into a copy of the base and let it build the command.
    let mut base = original.clone();
    base.materialize_defaults();
    let updated = base.override_env(runtime.env());
    tracing::debug!(base = %reference, ?updated, "inheriting boot command");

    chain.push(reference);
    let mut boot_command = build_with_chain(&base, registry, chain)?;
    chain.pop();

    // Keys the base does not recognize are only defaults at run time.
    for (key, value) in runtime.env() {
        if !updated.contains(key) {
            boot_command.push_soft(key.as_str(), value.as_str());
        }
    }

    Ok(boot_command)
}
