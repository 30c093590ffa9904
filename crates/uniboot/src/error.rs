// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Error types for uniboot operations.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

use crate::runtime::RuntimeKind;

/// Convenience Result type with uniboot Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while decoding manifests and resolving boot commands.
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Invalid YAML in a run manifest
    #[error("Failed to parse run manifest: {error}")]
    #[diagnostic(
        code(uniboot::manifest_parse),
        help("A run manifest needs a 'runtime' and a 'config_set' mapping")
    )]
    ManifestParse {
        #[source]
        error: serde_yaml::Error,
        yaml_content: String,
    },

    /// A single configuration set could not be decoded for its runtime
    #[error("Failed to parse data for config set '{config_set}': {error}")]
    #[diagnostic(code(uniboot::config_set_parse))]
    ConfigSetParse {
        config_set: String,
        #[source]
        error: serde_yaml::Error,
    },

    /// Failed to read file
    #[error("Failed to read file: {path:?}")]
    #[diagnostic(code(uniboot::read_failed))]
    ReadFailed {
        path: PathBuf,
        #[source]
        error: std::io::Error,
    },

    /// Failed to write file
    #[error("Failed to write file: {path:?}")]
    #[diagnostic(code(uniboot::write_failed))]
    WriteFailed {
        path: PathBuf,
        #[source]
        error: std::io::Error,
    },

    /// Runtime name is not one of the known runtimes
    #[error("Unknown runtime: '{name}'")]
    #[diagnostic(
        code(uniboot::unsupported_runtime),
        help("Supported runtimes: {}", supported.join(", "))
    )]
    UnsupportedRuntime {
        name: String,
        supported: Vec<String>,
    },

    /// Manifest declared no configuration sets
    #[error("At least one config_set must be provided")]
    #[diagnostic(code(uniboot::empty_config_set))]
    EmptyConfigSet,

    /// A runtime-specific field is required when not inheriting
    #[error("'{field}' must be provided for {runtime} runtime")]
    #[diagnostic(
        code(uniboot::missing_field),
        help("Set '{field}', or inherit the boot command with 'base: <package>:<config_set>'")
    )]
    MissingField {
        runtime: RuntimeKind,
        field: &'static str,
    },

    /// Environment keys and values end up space-separated in the boot command
    #[error("Spaces not allowed in env key/value: '{key}':'{value}'")]
    #[diagnostic(code(uniboot::invalid_env_entry))]
    InvalidEnvEntry { key: String, value: String },

    /// Base reference without a ':' separator
    #[error("Invalid base reference '{0}'")]
    #[diagnostic(
        code(uniboot::invalid_base_format),
        help("'base' must be in format <package>:<config_set>")
    )]
    InvalidBaseFormat(String),

    /// Base reference points at a package or config set that is not registered
    #[error("Failed to inherit from '{reference}': {reason}")]
    #[diagnostic(
        code(uniboot::unresolved_reference),
        help("Packages must be registered before the packages that inherit from them")
    )]
    UnresolvedReference { reference: String, reason: String },

    /// Base references form a loop
    #[error("Cyclic base reference: {}", chain.join(" -> "))]
    #[diagnostic(
        code(uniboot::cyclic_reference),
        help("Remove the circular reference in your 'base' fields")
    )]
    CyclicReference { chain: Vec<String> },

    /// Requested configuration set does not exist
    #[error("Configuration set name '{name}' not one of {}", quoted_list(available))]
    #[diagnostic(code(uniboot::config_set_not_found))]
    ConfigSetNotFound {
        name: String,
        available: Vec<String>,
    },

    /// No configuration set was named and several are declared
    #[error("Could not select which configuration set to run, available names: {}", quoted_list(available))]
    #[diagnostic(
        code(uniboot::ambiguous_config_set),
        help("Pass a configuration set name or set 'config_set_default' in meta/run.yaml")
    )]
    AmbiguousConfigSet { available: Vec<String> },

    /// Configuration set name that cannot be used as a file name under run/
    #[error("Invalid config_set name: '{name}'")]
    #[diagnostic(
        code(uniboot::invalid_config_set_name),
        help("Config set names become files in run/, use a plain name without '/' or '..'")
    )]
    InvalidConfigSetName { name: String },

    /// Context for an error raised while handling one configuration set
    #[error("Configuration set '{package}:{config_set}' failed: {source}")]
    #[diagnostic(code(uniboot::config_set))]
    InConfigSet {
        package: String,
        config_set: String,
        #[source]
        source: Box<Error>,
    },

    /// Invalid YAML in a lock file
    #[error("Invalid lock file {path:?}: {error}")]
    #[diagnostic(code(uniboot::invalid_lock))]
    InvalidLock {
        path: PathBuf,
        #[source]
        error: serde_yaml::Error,
    },

    /// Lock file could not be rendered as YAML
    #[error("Failed to serialize lock file {path:?}: {error}")]
    #[diagnostic(code(uniboot::serialize_lock))]
    SerializeLock {
        path: PathBuf,
        #[source]
        error: serde_yaml::Error,
    },

    /// IO error passthrough
    #[error(transparent)]
    #[diagnostic(code(uniboot::io_error))]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Strip any configuration set context, returning the underlying error.
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::InConfigSet { source, .. } => source.root_cause(),
            other => other,
        }
    }

    pub(crate) fn in_config_set(self, package: &str, config_set: &str) -> Self {
        Error::InConfigSet {
            package: package.to_string(),
            config_set: config_set.to_string(),
            source: Box::new(self),
        }
    }
}

fn quoted_list(names: &[String]) -> String {
    format!("['{}']", names.join("', '"))
}
