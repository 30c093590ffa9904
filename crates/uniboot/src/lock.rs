// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Lock file recording which manifests produced which boot commands.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest as ShaDigest, Sha256};

use crate::registry::{ConfigRegistry, ResolvedConfigSet};
use crate::Error;

#[cfg(test)]
#[path = "./lock_test.rs"]
mod lock_test;

/// Lock file API version.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub enum LockApiVersion {
    #[serde(rename = "uniboot/v0/lock")]
    V0,
}

/// Lock file structure capturing source manifests and generated boot commands.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct LockFile {
    pub api: LockApiVersion,
    pub generated: GenerationMetadata,
    pub sources: Vec<SourceFile>,
    pub artifacts: Vec<LockedArtifact>,
}

/// Metadata about when and where the lock was generated.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct GenerationMetadata {
    pub timestamp: DateTime<Utc>,
    pub uniboot_version: String,
    pub hostname: String,
}

/// Run manifest tracked by the lock.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct SourceFile {
    pub package: String,
    pub path: PathBuf,
    pub sha256: String,
}

/// Boot command generated for one configuration set.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct LockedArtifact {
    pub package: String,
    pub config_set: String,
    pub sha256: String,
}

/// Difference between a lock file and the current manifests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockChange {
    pub kind: LockChangeKind,
    pub reference: String,
    pub expected: Option<String>,
    pub actual: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockChangeKind {
    SourceFileChanged,
    SourceFileRemoved,
    ArtifactChanged,
    ArtifactRemoved,
    ArtifactAdded,
}

impl LockFile {
    /// Load a lock file from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|e| Error::ReadFailed {
            path: path.to_path_buf(),
            error: e,
        })?;
        serde_yaml::from_str(&yaml).map_err(|e| Error::InvalidLock {
            path: path.to_path_buf(),
            error: e,
        })
    }

    /// Write this lock file to disk.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> crate::Result<()> {
        let path = path.as_ref();
        let yaml = serde_yaml::to_string(self).map_err(|e| Error::SerializeLock {
            path: path.to_path_buf(),
            error: e,
        })?;
        std::fs::write(path, yaml).map_err(|e| Error::WriteFailed {
            path: path.to_path_buf(),
            error: e,
        })
    }
}

fn sha256_hex(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

fn artifact_reference(package: &str, config_set: &str) -> String {
    format!("{package}:{config_set}")
}

/// Generate a lock file from the registry and the result of its resolution pass.
pub fn generate_lock(
    registry: &ConfigRegistry,
    resolved: &[ResolvedConfigSet],
) -> crate::Result<LockFile> {
    // Hash source manifests
    let mut sources = Vec::new();
    for (package, manifest) in registry.packages() {
        let Some(path) = &manifest.source_path else {
            continue;
        };
        let content = std::fs::read(path).map_err(|e| Error::ReadFailed {
            path: path.clone(),
            error: e,
        })?;
        sources.push(SourceFile {
            package: package.to_string(),
            path: path.clone(),
            sha256: sha256_hex(&content),
        });
    }

    let artifacts = resolved
        .iter()
        .map(|item| LockedArtifact {
            package: item.package.clone(),
            config_set: item.config_set.clone(),
            sha256: sha256_hex(item.boot_command.to_string().as_bytes()),
        })
        .collect();

    Ok(LockFile {
        api: LockApiVersion::V0,
        generated: GenerationMetadata {
            timestamp: Utc::now(),
            uniboot_version: env!("CARGO_PKG_VERSION").to_string(),
            hostname: hostname::get()
                .ok()
                .and_then(|h| h.into_string().ok())
                .unwrap_or_else(|| "unknown".to_string()),
        },
        sources,
        artifacts,
    })
}

/// Verify a lock file against the current manifests and boot commands.
pub fn verify_lock(
    lock: &LockFile,
    registry: &ConfigRegistry,
    resolved: &[ResolvedConfigSet],
) -> crate::Result<Vec<LockChange>> {
    let mut changes = Vec::new();

    // Check source manifest hashes
    for source in &lock.sources {
        let current_path = registry
            .get(&source.package)
            .and_then(|m| m.source_path.as_ref());
        let content = current_path.and_then(|p| std::fs::read(p).ok());

        match content {
            None => changes.push(LockChange {
                kind: LockChangeKind::SourceFileRemoved,
                reference: source.path.display().to_string(),
                expected: Some(source.sha256.clone()),
                actual: None,
            }),
            Some(content) => {
                let actual = sha256_hex(&content);
                if actual != source.sha256 {
                    changes.push(LockChange {
                        kind: LockChangeKind::SourceFileChanged,
                        reference: source.path.display().to_string(),
                        expected: Some(source.sha256.clone()),
                        actual: Some(actual),
                    });
                }
            }
        }
    }

    // Check generated boot commands
    for locked in &lock.artifacts {
        let current = resolved
            .iter()
            .find(|r| r.package == locked.package && r.config_set == locked.config_set);
        let reference = artifact_reference(&locked.package, &locked.config_set);

        match current {
            None => changes.push(LockChange {
                kind: LockChangeKind::ArtifactRemoved,
                reference,
                expected: Some(locked.sha256.clone()),
                actual: None,
            }),
            Some(current) => {
                let actual = sha256_hex(current.boot_command.to_string().as_bytes());
                if actual != locked.sha256 {
                    changes.push(LockChange {
                        kind: LockChangeKind::ArtifactChanged,
                        reference,
                        expected: Some(locked.sha256.clone()),
                        actual: Some(actual),
                    });
                }
            }
        }
    }

    // Configuration sets beyond those in the lock are reported as added.
    for item in resolved {
        let known = lock
            .artifacts
            .iter()
            .any(|a| a.package == item.package && a.config_set == item.config_set);
        if !known {
            changes.push(LockChange {
                kind: LockChangeKind::ArtifactAdded,
                reference: artifact_reference(&item.package, &item.config_set),
                expected: None,
                actual: None,
            });
        }
    }

    Ok(changes)
}
