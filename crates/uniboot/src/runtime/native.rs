// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

use serde::Deserialize;

use super::common::deserialize_string;
use super::{CommonRuntime, RuntimeKind, RuntimeVariant};

/// Runs an arbitrary command inside the unikernel.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NativeRuntime {
    #[serde(flatten)]
    pub common: CommonRuntime,

    /// Command to execute, e.g. `/usr/bin/simpleFoam.so -help`.
    #[serde(default, deserialize_with = "deserialize_string")]
    pub bootcmd: String,
}

impl RuntimeVariant for NativeRuntime {
    fn kind(&self) -> RuntimeKind {
        RuntimeKind::Native
    }

    fn common(&self) -> &CommonRuntime {
        &self.common
    }

    fn common_mut(&mut self) -> &mut CommonRuntime {
        &mut self.common
    }

    fn description(&self) -> &'static str {
        "Run arbitrary command inside OSv"
    }

    fn dependencies(&self) -> &'static [&'static str] {
        &[]
    }

    fn yaml_template(&self) -> &'static str {
        r#"
# REQUIRED
# Command to be executed in OSv.
# Note that package root will correspond to filesystem root (/) in OSv image.
# Example value: /usr/bin/simpleFoam.so -help
bootcmd: <command>
"#
    }

    fn missing_field(&self) -> Option<&'static str> {
        self.bootcmd.is_empty().then_some("bootcmd")
    }

    fn launch_command(&self) -> String {
        self.bootcmd.clone()
    }
}
