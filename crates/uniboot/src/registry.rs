// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Registry of run manifests across all packages of an image.

use std::path::{Path, PathBuf};

use crate::env::BootCommand;
use crate::manifest::RunManifest;
use crate::resolve::BaseRef;
use crate::runtime::Runtime;
use crate::{Error, RUN_DIR_NAME};

#[cfg(test)]
#[path = "./registry_test.rs"]
mod registry_test;

/// Run manifests of every package, in dependency order.
///
/// A configuration set may only inherit from a package that is registered,
/// so packages are expected to be added dependencies first.
#[derive(Debug, Clone, Default)]
pub struct ConfigRegistry {
    packages: Vec<(String, RunManifest)>,
}

/// Everything a launcher needs to boot one configuration set.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfigSet {
    pub package: String,
    pub config_set: String,
    pub boot_command: BootCommand,
    /// Packages providing the interpreter of this configuration set's runtime.
    pub dependencies: Vec<String>,
    pub description: String,
}

/// A boot command written to disk.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedArtifact {
    pub package: String,
    pub config_set: String,
    pub path: PathBuf,
    pub boot_command: String,
}

impl ConfigRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a package manifest.
    ///
    /// Adding a package name twice replaces its manifest but keeps the
    /// position of the first registration.
    pub fn add<S: Into<String>>(&mut self, package: S, manifest: RunManifest) {
        let package = package.into();
        match self.packages.iter().position(|(name, _)| *name == package) {
            Some(pos) => {
                tracing::warn!(%package, "package registered twice, replacing run manifest");
                self.packages[pos].1 = manifest;
            }
            None => {
                tracing::debug!(%package, config_sets = ?manifest.config_set_names(), "registered package");
                self.packages.push((package, manifest));
            }
        }
    }

    pub fn get(&self, package: &str) -> Option<&RunManifest> {
        self.packages
            .iter()
            .find(|(name, _)| name == package)
            .map(|(_, manifest)| manifest)
    }

    /// Registered packages, in registration order.
    pub fn packages(&self) -> impl Iterator<Item = (&str, &RunManifest)> {
        self.packages.iter().map(|(name, m)| (name.as_str(), m))
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Find the configuration set a `base` reference points at.
    pub fn lookup(&self, reference: &BaseRef) -> crate::Result<&Runtime> {
        let manifest = self
            .get(&reference.package)
            .ok_or_else(|| Error::UnresolvedReference {
                reference: reference.to_string(),
                reason: "package not included or has no meta/run.yaml".to_string(),
            })?;
        manifest
            .config_sets
            .get(&reference.config_set)
            .ok_or_else(|| Error::UnresolvedReference {
                reference: reference.to_string(),
                reason: "config_set does not exist".to_string(),
            })
    }

    /// Validate and resolve a single configuration set.
    ///
    /// Without a configuration set name the package's selection rules apply.
    pub fn resolve(
        &self,
        package: &str,
        config_set: Option<&str>,
    ) -> crate::Result<ResolvedConfigSet> {
        let manifest = self.get(package).ok_or_else(|| Error::UnresolvedReference {
            reference: package.to_string(),
            reason: "package not included or has no meta/run.yaml".to_string(),
        })?;
        let (name, runtime) = manifest.select_config_set(config_set)?;
        self.resolve_runtime(package, name, runtime)
            .map_err(|e| e.in_config_set(package, name))
    }

    /// Validate and resolve every configuration set of every package.
    ///
    /// Stops at the first failure; nothing is returned for a partial pass.
    pub fn resolve_all(&self) -> crate::Result<Vec<ResolvedConfigSet>> {
        let mut resolved = Vec::new();
        for (package, manifest) in &self.packages {
            for (name, runtime) in &manifest.config_sets {
                let item = self
                    .resolve_runtime(package, name, runtime)
                    .map_err(|e| e.in_config_set(package, name))?;
                resolved.push(item);
            }
        }
        Ok(resolved)
    }

    fn resolve_runtime(
        &self,
        package: &str,
        config_set: &str,
        runtime: &Runtime,
    ) -> crate::Result<ResolvedConfigSet> {
        runtime.validate()?;
        let boot_command = crate::resolve::build_registered(runtime, package, config_set, self)?;
        tracing::debug!(%package, %config_set, %boot_command, "resolved boot command");
        Ok(ResolvedConfigSet {
            package: package.to_string(),
            config_set: config_set.to_string(),
            boot_command,
            dependencies: runtime.dependencies(),
            description: runtime.description().to_string(),
        })
    }

    /// Resolve every configuration set and write its boot command to
    /// `<root>/run/<config_set>`.
    ///
    /// Configuration sets are written in resolution order, so a later
    /// package's set replaces an earlier one of the same name. Artifacts
    /// left behind by a failed pass must not be used.
    pub fn persist<P: AsRef<Path>>(&self, root: P) -> crate::Result<Vec<PersistedArtifact>> {
        let resolved = self.resolve_all()?;
        persist_resolved(root, &resolved)
    }
}

/// Write already resolved configuration sets to `<root>/run/<config_set>`.
pub fn persist_resolved<P: AsRef<Path>>(
    root: P,
    resolved: &[ResolvedConfigSet],
) -> crate::Result<Vec<PersistedArtifact>> {
    let target_dir = root.as_ref().join(RUN_DIR_NAME);
    std::fs::create_dir_all(&target_dir).map_err(|e| Error::WriteFailed {
        path: target_dir.clone(),
        error: e,
    })?;

    let mut artifacts = Vec::with_capacity(resolved.len());
    for item in resolved {
        let path = target_dir.join(&item.config_set);
        let boot_command = item.boot_command.to_string();
        std::fs::write(&path, &boot_command).map_err(|e| Error::WriteFailed {
            path: path.clone(),
            error: e,
        })?;
        tracing::info!(package = %item.package, config_set = %item.config_set, ?path, "wrote boot command");

        artifacts.push(PersistedArtifact {
            package: item.package.clone(),
            config_set: item.config_set.clone(),
            path,
            boot_command,
        });
    }

    Ok(artifacts)
}

/// Command used to run a persisted configuration set inside the image.
pub fn runscript_command(config_set: &str) -> String {
    if config_set.is_empty() {
        return String::new();
    }
    format!("runscript /{RUN_DIR_NAME}/{config_set}")
}
