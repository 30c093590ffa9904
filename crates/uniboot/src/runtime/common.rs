// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Deserializer};

use crate::env::{validate_env, EnvMap};
use crate::Error;

/// Fields shared by every runtime.
///
/// These are set for each configuration set separately, nothing is shared
/// between them.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CommonRuntime {
    /// Environment variables set when the unikernel is run.
    #[serde(default, deserialize_with = "deserialize_env")]
    pub env: EnvMap,

    /// `<package>:<config_set>` to inherit the boot command from.
    #[serde(default, deserialize_with = "deserialize_string")]
    pub base: String,
}

impl CommonRuntime {
    pub const YAML_TEMPLATE: &'static str = r#"
# OPTIONAL
# Environment variables.
# A map of environment variables to be set when unikernel is run.
# Example value:  env:
#                    PORT: 8000
#                    HOSTNAME: www.myserver.org
env:
   <key>: <value>

# OPTIONAL
# Configuration to contextualize.
base: "<package-name>:<config_set>"
"#;

    pub fn validate(&self) -> crate::Result<()> {
        validate_env(&self.env)?;

        if !self.base.is_empty() && !self.base.contains(':') {
            return Err(Error::InvalidBaseFormat(self.base.clone()));
        }

        Ok(())
    }
}

/// Read env values the way they are usually written, numbers and booleans included.
fn deserialize_env<'de, D>(deserializer: D) -> Result<EnvMap, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<std::collections::BTreeMap<String, serde_yaml::Value>> =
        Option::deserialize(deserializer)?;
    let mut env = EnvMap::new();
    for (key, value) in raw.unwrap_or_default() {
        let value = scalar_to_string(value).map_err(|kind| {
            serde::de::Error::custom(format!("env '{key}' must be a scalar, got {kind}"))
        })?;
        env.insert(key, value);
    }
    Ok(env)
}

/// Deserialize a single scalar field, e.g. `xms: 512m` or `main: 42`.
pub(super) fn deserialize_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_yaml::Value::deserialize(deserializer)?;
    scalar_to_string(value)
        .map_err(|kind| serde::de::Error::custom(format!("expected a string, got {kind}")))
}

fn scalar_to_string(value: serde_yaml::Value) -> Result<String, &'static str> {
    use serde_yaml::Value;
    match value {
        Value::Null => Ok(String::new()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(n.to_string()),
        Value::String(s) => Ok(s),
        Value::Sequence(_) => Err("a sequence"),
        Value::Mapping(_) => Err("a mapping"),
        Value::Tagged(_) => Err("a tagged value"),
    }
}

/// Deserialize a list of arguments, allowing scalars inside it.
pub(super) fn deserialize_args<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<serde_yaml::Value>> = Option::deserialize(deserializer)?;
    raw.unwrap_or_default()
        .into_iter()
        .map(|v| {
            scalar_to_string(v).map_err(|kind| {
                serde::de::Error::custom(format!("list entries must be scalars, got {kind}"))
            })
        })
        .collect()
}
