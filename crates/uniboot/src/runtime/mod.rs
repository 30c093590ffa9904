// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Runtime variants describing how a unikernel image is booted.
//!
//! Every configuration set in a run manifest is decoded into one [`Runtime`].
//! The manifest's `runtime:` field picks the variant, and the fields of the
//! configuration set populate it:
//!
//! ```yaml
//! runtime: java
//! config_set:
//!   hello:
//!     main: main.Hello
//!     classpath:
//!       - /app
//!     env:
//!       PORT: "8000"
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::env::{BootCommand, EnvMap};
use crate::registry::ConfigRegistry;
use crate::{Error, Result};

mod common;
mod java;
mod native;
mod node;
mod python;

pub use common::CommonRuntime;
pub use java::JavaRuntime;
pub use native::NativeRuntime;
pub use node::NodeRuntime;
pub use python::PythonRuntime;


/// Identifies which variant shape a configuration set uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum RuntimeKind {
    #[serde(rename = "native")]
    Native,
    #[serde(rename = "node", alias = "nodejs")]
    Node,
    #[serde(rename = "java")]
    Java,
    #[serde(rename = "python")]
    Python,
}

/// All runtimes known to this build.
pub const SUPPORTED_RUNTIMES: &[RuntimeKind] = &[
    RuntimeKind::Native,
    RuntimeKind::Node,
    RuntimeKind::Java,
    RuntimeKind::Python,
];

impl RuntimeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Native => "native",
            Self::Node => "node",
            Self::Java => "java",
            Self::Python => "python",
        }
    }
}

impl fmt::Display for RuntimeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for RuntimeKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "native" => Ok(Self::Native),
            "node" | "nodejs" => Ok(Self::Node),
            "java" => Ok(Self::Java),
            "python" => Ok(Self::Python),
            _ => Err(Error::UnsupportedRuntime {
                name: s.to_string(),
                supported: SUPPORTED_RUNTIMES
                    .iter()
                    .map(|k| k.as_str().to_string())
                    .collect(),
            }),
        }
    }
}

/// Behavior each concrete runtime provides on top of [`CommonRuntime`].
pub trait RuntimeVariant {
    fn kind(&self) -> RuntimeKind;

    fn common(&self) -> &CommonRuntime;

    fn common_mut(&mut self) -> &mut CommonRuntime;

    /// Short description of what the runtime is used for.
    fn description(&self) -> &'static str;

    /// Packages providing the interpreter this runtime launches.
    fn dependencies(&self) -> &'static [&'static str];

    /// Commented YAML for the runtime-specific fields only.
    fn yaml_template(&self) -> &'static str;

    /// First required field left unset, checked only when not inheriting.
    fn missing_field(&self) -> Option<&'static str>;

    /// Command executed when this configuration set does not inherit.
    fn launch_command(&self) -> String;

    /// Environment exported ahead of [`Self::launch_command`].
    fn launch_env(&self) -> EnvMap {
        self.common().env.clone()
    }
}

/// A fully populated configuration set.
#[derive(Debug, Clone, PartialEq)]
pub enum Runtime {
    Native(NativeRuntime),
    Node(NodeRuntime),
    Java(JavaRuntime),
    Python(PythonRuntime),
}

/// Map a runtime name into a blank runtime of the matching variant.
pub fn pick_runtime(name: &str) -> Result<Runtime> {
    let kind: RuntimeKind = name.parse()?;
    Ok(Runtime::blank(kind))
}

impl Runtime {
    /// A runtime of the given kind with no fields populated.
    pub fn blank(kind: RuntimeKind) -> Self {
        match kind {
            RuntimeKind::Native => Self::Native(NativeRuntime::default()),
            RuntimeKind::Node => Self::Node(NodeRuntime::default()),
            RuntimeKind::Java => Self::Java(JavaRuntime::default()),
            RuntimeKind::Python => Self::Python(PythonRuntime::default()),
        }
    }

    /// Populate a runtime of the given kind from one `config_set` entry.
    pub fn from_value(
        kind: RuntimeKind,
        config_set: &str,
        value: serde_yaml::Value,
    ) -> Result<Self> {
        // `name:` with no fields below it is a valid, empty config set
        let value = match value {
            serde_yaml::Value::Null => serde_yaml::Value::Mapping(Default::default()),
            other => other,
        };
        let map_err = |error| Error::ConfigSetParse {
            config_set: config_set.to_string(),
            error,
        };
        let runtime = match kind {
            RuntimeKind::Native => Self::Native(serde_yaml::from_value(value).map_err(map_err)?),
            RuntimeKind::Node => Self::Node(serde_yaml::from_value(value).map_err(map_err)?),
            RuntimeKind::Java => Self::Java(serde_yaml::from_value(value).map_err(map_err)?),
            RuntimeKind::Python => Self::Python(serde_yaml::from_value(value).map_err(map_err)?),
        };
        Ok(runtime)
    }

    fn variant(&self) -> &dyn RuntimeVariant {
        match self {
            Self::Native(r) => r,
            Self::Node(r) => r,
            Self::Java(r) => r,
            Self::Python(r) => r,
        }
    }

    fn variant_mut(&mut self) -> &mut dyn RuntimeVariant {
        match self {
            Self::Native(r) => r,
            Self::Node(r) => r,
            Self::Java(r) => r,
            Self::Python(r) => r,
        }
    }

    pub fn kind(&self) -> RuntimeKind {
        self.variant().kind()
    }

    pub fn description(&self) -> &'static str {
        self.variant().description()
    }

    pub fn dependencies(&self) -> Vec<String> {
        self.variant()
            .dependencies()
            .iter()
            .map(|d| d.to_string())
            .collect()
    }

    /// Commented YAML describing every field this runtime accepts.
    pub fn yaml_template(&self) -> String {
        format!(
            "{}{}",
            self.variant().yaml_template(),
            CommonRuntime::YAML_TEMPLATE
        )
    }

    pub fn common(&self) -> &CommonRuntime {
        self.variant().common()
    }

    pub fn env(&self) -> &EnvMap {
        &self.common().env
    }

    pub fn base(&self) -> &str {
        &self.common().base
    }

    /// Whether the boot command comes from a `base` reference.
    pub fn inherits(&self) -> bool {
        !self.base().is_empty()
    }

    /// Overwrite environment keys this runtime already declares.
    ///
    /// Returns the keys that were updated; unknown keys are ignored.
    pub fn override_env(&mut self, values: &EnvMap) -> Vec<String> {
        crate::env::override_env(&mut self.variant_mut().common_mut().env, values)
    }

    /// Write the launcher's placeholder defaults into the declared env.
    ///
    /// Afterwards every value the terminal boot command exports is a key of
    /// [`Self::env`], so [`Self::override_env`] can replace it. Inheriting
    /// runtimes never launch their own command and are left unchanged.
    pub fn materialize_defaults(&mut self) {
        if self.inherits() {
            return;
        }
        let env = self.variant().launch_env();
        self.variant_mut().common_mut().env = env;
    }

    /// Validate values that were read from the manifest.
    ///
    /// Inheriting configuration sets are exempt from runtime-specific
    /// required fields.
    pub fn validate(&self) -> Result<()> {
        let variant = self.variant();
        if !self.inherits() {
            if let Some(field) = variant.missing_field() {
                return Err(Error::MissingField {
                    runtime: variant.kind(),
                    field,
                });
            }
        }
        variant.common().validate()
    }

    /// Boot command for this runtime when it does not inherit.
    pub fn terminal_boot_command(&self) -> BootCommand {
        let variant = self.variant();
        BootCommand::new(variant.launch_command()).with_hard_env(&variant.launch_env())
    }

    /// Produce the boot command, following `base` references through `registry`.
    pub fn build_boot_command(&self, registry: &ConfigRegistry) -> Result<BootCommand> {
        crate::resolve::build_boot_command(self, registry)
    }
}

/// Join list fields that are exported through a single environment variable.
fn join_args(args: &[String]) -> String {
    args.join(" ")
}
