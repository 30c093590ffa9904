// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

use serde::Deserialize;

use super::common::{deserialize_args, deserialize_string};
use super::{join_args, CommonRuntime, RuntimeKind, RuntimeVariant};
use crate::env::{set_default_env, EnvMap};

pub const NODE_DEPENDENCY: &str = "node-4.4.5";

pub const NODE_LAUNCHER: &str = "/libnode.so $NODE_ARGS $MAIN $ARGS";

/// Runs a JavaScript application with Node.js.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NodeRuntime {
    #[serde(flatten)]
    pub common: CommonRuntime,

    /// Script to run, relative to the image root.
    #[serde(default, deserialize_with = "deserialize_string")]
    pub main: String,

    /// Arguments for the node interpreter itself.
    #[serde(default, deserialize_with = "deserialize_args")]
    pub node_args: Vec<String>,

    #[serde(default, deserialize_with = "deserialize_args")]
    pub args: Vec<String>,
}

impl RuntimeVariant for NodeRuntime {
    fn kind(&self) -> RuntimeKind {
        RuntimeKind::Node
    }

    fn common(&self) -> &CommonRuntime {
        &self.common
    }

    fn common_mut(&mut self) -> &mut CommonRuntime {
        &mut self.common
    }

    fn description(&self) -> &'static str {
        "Run JavaScript NodeJS 4.4.5 application"
    }

    fn dependencies(&self) -> &'static [&'static str] {
        &[NODE_DEPENDENCY]
    }

    fn yaml_template(&self) -> &'static str {
        r#"
# REQUIRED
# Filepath of the NodeJS entrypoint (where server is defined).
# Note that package root will correspond to filesystem root (/) in OSv image.
# Example value: /server.js
main: <filepath>

# OPTIONAL
# A list of Node.js args.
# Example value: node_args:
#                   - --require module1
node_args:
   - <list>

# OPTIONAL
# A list of command line args used by the application.
# Example value: args:
#                   - argument1
#                   - argument2
args:
   - <list>
"#
    }

    fn missing_field(&self) -> Option<&'static str> {
        self.main.is_empty().then_some("main")
    }

    fn launch_command(&self) -> String {
        NODE_LAUNCHER.to_string()
    }

    fn launch_env(&self) -> EnvMap {
        let mut env = self.common.env.clone();
        set_default_env(
            &mut env,
            [
                ("NODE_ARGS", join_args(&self.node_args)),
                ("MAIN", self.main.clone()),
                ("ARGS", join_args(&self.args)),
            ],
        );
        env
    }
}
