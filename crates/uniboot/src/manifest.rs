// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Run manifest parsing for `meta/run.yaml` files.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use serde::Deserialize;

use crate::runtime::{Runtime, RuntimeKind};
use crate::{Error, RUN_MANIFEST_PATH};

#[cfg(test)]
#[path = "./manifest_test.rs"]
mod manifest_test;

/// Outer shape of a run manifest; config sets are decoded per runtime later.
#[derive(Deserialize)]
struct RunManifestMapping {
    runtime: String,
    #[serde(default)]
    config_set: Option<BTreeMap<String, serde_yaml::Value>>,
    #[serde(default)]
    config_set_default: Option<String>,
}

/// Parsed run manifest of a single package.
#[derive(Debug, Clone, PartialEq)]
pub struct RunManifest {
    /// Runtime shared by every configuration set of this package.
    pub runtime: RuntimeKind,

    /// Configuration set used when none is requested explicitly (may be empty).
    pub config_set_default: String,

    /// Available configuration sets by name.
    pub config_sets: BTreeMap<String, Runtime>,

    /// Path to the file this was loaded from (not serialized).
    pub source_path: Option<PathBuf>,
}

impl RunManifest {
    /// Parse a manifest from YAML.
    pub fn from_yaml<S: Into<String>>(yaml: S) -> crate::Result<Self> {
        let yaml = yaml.into();

        // Stage 1: the outer shape, leaving each config set opaque
        let mapping: RunManifestMapping =
            serde_yaml::from_str(&yaml).map_err(|e| Error::ManifestParse {
                error: e,
                yaml_content: yaml.clone(),
            })?;
        let runtime: RuntimeKind = mapping.runtime.parse()?;
        tracing::debug!(%runtime, "resolved runtime");

        // Stage 2: each config set into the runtime's own structure
        let mut config_sets = BTreeMap::new();
        for (name, value) in mapping.config_set.unwrap_or_default() {
            validate_config_set_name(&name)?;
            let parsed = Runtime::from_value(runtime, &name, value)?;
            config_sets.insert(name, parsed);
        }

        if config_sets.is_empty() {
            return Err(Error::EmptyConfigSet);
        }

        Ok(Self {
            runtime,
            config_set_default: mapping.config_set_default.unwrap_or_default(),
            config_sets,
            source_path: None,
        })
    }

    /// Load a manifest from a file path.
    pub fn load<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();
        let yaml = read_manifest(path)?;
        let mut manifest = Self::from_yaml(yaml)?;
        manifest.source_path = Some(path.to_path_buf());
        Ok(manifest)
    }

    /// Load `meta/run.yaml` from a package directory.
    ///
    /// Packages are not required to have a run manifest, so a missing file
    /// yields `None`. A manifest that exists but does not parse is an error.
    pub fn load_package<P: AsRef<Path>>(package_dir: P) -> crate::Result<Option<Self>> {
        let path = package_dir.as_ref().join(RUN_MANIFEST_PATH);
        if !path.is_file() {
            tracing::debug!(?path, "package has no run manifest");
            return Ok(None);
        }
        Self::load(path).map(Some)
    }

    /// Read only the runtime of a manifest and return a blank runtime for it.
    ///
    /// Answers questions such as "which packages does this runtime require"
    /// without decoding any configuration set. Returns `None` if the file does
    /// not exist.
    pub fn general<P: AsRef<Path>>(path: P) -> crate::Result<Option<Runtime>> {
        let path = path.as_ref();
        if !path.is_file() {
            return Ok(None);
        }

        let yaml = read_manifest(path)?;
        let mapping: RunManifestMapping =
            serde_yaml::from_str(&yaml).map_err(|e| Error::ManifestParse {
                error: e,
                yaml_content: yaml.clone(),
            })?;
        crate::runtime::pick_runtime(&mapping.runtime).map(Some)
    }

    /// Packages required by this manifest's runtime.
    pub fn dependencies(&self) -> Vec<String> {
        Runtime::blank(self.runtime).dependencies()
    }

    /// Names of all configuration sets, in order.
    pub fn config_set_names(&self) -> Vec<String> {
        self.config_sets.keys().cloned().collect()
    }

    /// Select a configuration set by name.
    ///
    /// Without a name the `config_set_default` is used, and without a default
    /// a lone configuration set is picked implicitly.
    pub fn select_config_set(&self, name: Option<&str>) -> crate::Result<(&str, &Runtime)> {
        let name = name
            .filter(|n| !n.is_empty())
            .or_else(|| Some(self.config_set_default.as_str()).filter(|n| !n.is_empty()));

        match name {
            Some(name) => self
                .config_sets
                .get_key_value(name)
                .map(|(k, v)| (k.as_str(), v))
                .ok_or_else(|| Error::ConfigSetNotFound {
                    name: name.to_string(),
                    available: self.config_set_names(),
                }),
            None if self.config_sets.len() == 1 => self
                .config_sets
                .iter()
                .next()
                .map(|(k, v)| (k.as_str(), v))
                .ok_or(Error::EmptyConfigSet),
            None => Err(Error::AmbiguousConfigSet {
                available: self.config_set_names(),
            }),
        }
    }

    /// Starter `meta/run.yaml` content for the given runtime, with a single
    /// `default` configuration set built from the runtime's template.
    pub fn template(kind: RuntimeKind) -> String {
        let mut out = format!(
            "# Runtime this package uses.\n\
             runtime: {kind}\n\
             \n\
             # Configuration set to use when none is named.\n\
             config_set_default: default\n\
             \n\
             config_set:\n  \
               default:\n"
        );
        for line in Runtime::blank(kind).yaml_template().lines() {
            if line.is_empty() {
                out.push('\n');
            } else {
                out.push_str("    ");
                out.push_str(line);
                out.push('\n');
            }
        }
        out
    }
}

/// Drop comment lines and collapse runs of blank lines.
pub fn strip_comments(template: &str) -> String {
    let mut out = String::with_capacity(template.len());
    let mut previous_blank = true;
    for line in template.lines() {
        if line.trim_start().starts_with('#') {
            continue;
        }
        let blank = line.trim().is_empty();
        if blank && previous_blank {
            continue;
        }
        out.push_str(line);
        out.push('\n');
        previous_blank = blank;
    }
    out
}

/// Config set names are written as files under `run/` and must stay there.
fn validate_config_set_name(name: &str) -> crate::Result<()> {
    let mut components = Path::new(name).components();
    let single_normal = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );
    if !single_normal || name.contains(['/', '\\']) {
        return Err(Error::InvalidConfigSetName {
            name: name.to_string(),
        });
    }
    Ok(())
}

fn read_manifest(path: &Path) -> crate::Result<String> {
    std::fs::read_to_string(path).map_err(|e| Error::ReadFailed {
        path: path.to_path_buf(),
        error: e,
    })
}

/// Resolve a package argument into the directory holding `meta/run.yaml`.
///
/// Accepts absolute, home-relative (`~/`) and relative paths. A path to the
/// manifest file itself is reduced to its package directory.
pub fn resolve_package_dir<P: AsRef<Path>>(path: P) -> crate::Result<PathBuf> {
    let path = path.as_ref();
    let expanded = match path.strip_prefix("~") {
        Ok(rel) => {
            let home = dirs::home_dir().ok_or_else(|| Error::ReadFailed {
                path: path.to_path_buf(),
                error: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "cannot resolve ~ without HOME",
                ),
            })?;
            home.join(rel)
        }
        Err(_) => path.to_path_buf(),
    };

    let canonical = dunce::canonicalize(&expanded).map_err(|e| Error::ReadFailed {
        path: expanded.clone(),
        error: e,
    })?;

    if canonical.is_file() && canonical.ends_with(RUN_MANIFEST_PATH) {
        // <pkg>/meta/run.yaml -> <pkg>
        if let Some(dir) = canonical.parent().and_then(Path::parent) {
            return Ok(dir.to_path_buf());
        }
    }
    Ok(canonical)
}
