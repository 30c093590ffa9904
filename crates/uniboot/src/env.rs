// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Environment maps and boot command rendering.

use std::collections::BTreeMap;
use std::fmt;

use crate::Error;

#[cfg(test)]
#[path = "./env_test.rs"]
mod env_test;

/// Environment variables declared by a configuration set.
pub type EnvMap = BTreeMap<String, String>;

/// Check that no key or value contains a space.
///
/// Entries are emitted as space-separated `--env=KEY=VALUE` tokens, so a
/// space would split one assignment into two.
pub fn validate_env(env: &EnvMap) -> crate::Result<()> {
    for (key, value) in env {
        if key.contains(' ') || value.contains(' ') {
            return Err(Error::InvalidEnvEntry {
                key: key.clone(),
                value: value.clone(),
            });
        }
    }
    Ok(())
}

/// Update the keys of `target` that also appear in `values`.
///
/// Keys unknown to `target` are ignored. Returns the updated keys in order.
pub fn override_env(target: &mut EnvMap, values: &EnvMap) -> Vec<String> {
    let mut updated = Vec::new();
    for (key, value) in values {
        if let Some(existing) = target.get_mut(key) {
            *existing = value.clone();
            updated.push(key.clone());
        }
    }
    updated
}

/// Insert `defaults` for keys `target` does not declare yet.
///
/// Empty default values are skipped. Returns the inserted keys in order.
pub fn set_default_env<I, K, V>(target: &mut EnvMap, defaults: I) -> Vec<String>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    let mut inserted = Vec::new();
    for (key, value) in defaults {
        let value = value.into();
        if value.is_empty() {
            continue;
        }
        let key = key.into();
        if !target.contains_key(&key) {
            inserted.push(key.clone());
            target.insert(key, value);
        }
    }
    inserted
}

/// Kind of `--env` assignment understood by the unikernel command interpreter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assignment {
    /// `KEY=VALUE`, always overwrites.
    Hard,
    /// `KEY?=VALUE`, only sets the variable when it is unset at run time.
    Soft,
}

impl Assignment {
    pub fn operator(&self) -> &'static str {
        match self {
            Self::Hard => "=",
            Self::Soft => "?=",
        }
    }
}

/// A generated boot command.
///
/// Renders as hard assignments, then soft assignments, then the command:
/// `--env=A=1 --env=B?=2 /bin/app`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootCommand {
    /// Always-overwrite assignments.
    pub hard: EnvMap,
    /// Set-only-if-unset assignments.
    pub soft: EnvMap,
    /// Runtime command executed after the environment is applied.
    pub command: String,
}

impl BootCommand {
    pub fn new<S: Into<String>>(command: S) -> Self {
        Self {
            command: command.into(),
            ..Default::default()
        }
    }

    /// Add every entry of `env` as a hard assignment.
    pub fn with_hard_env(mut self, env: &EnvMap) -> Self {
        self.hard
            .extend(env.iter().map(|(k, v)| (k.clone(), v.clone())));
        self
    }

    /// Add a soft assignment, replacing an earlier soft value for the same key.
    pub fn push_soft<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        self.soft.insert(key.into(), value.into());
    }

    /// The assignments as `--env=` tokens, hard ones first.
    pub fn env_tokens(&self) -> Vec<String> {
        let hard = self.hard.iter().map(|(k, v)| (Assignment::Hard, k, v));
        let soft = self.soft.iter().map(|(k, v)| (Assignment::Soft, k, v));
        hard.chain(soft)
            .map(|(kind, k, v)| format!("--env={k}{}{v}", kind.operator()))
            .collect()
    }
}

impl fmt::Display for BootCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for token in self.env_tokens() {
            write!(f, "{token} ")?;
        }
        f.write_str(&self.command)
    }
}
