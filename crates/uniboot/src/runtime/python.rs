// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

use serde::Deserialize;

use super::common::{deserialize_args, deserialize_string};
use super::{join_args, CommonRuntime, RuntimeKind, RuntimeVariant};
use crate::env::{set_default_env, EnvMap};

pub const PYTHON_DEPENDENCY: &str = "python-2.7";

pub const PYTHON_LAUNCHER: &str = "/python $PYTHON_ARGS $MAIN $ARGS";

/// Runs a Python script.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PythonRuntime {
    #[serde(flatten)]
    pub common: CommonRuntime,

    #[serde(default, deserialize_with = "deserialize_string")]
    pub main: String,

    #[serde(default, deserialize_with = "deserialize_args")]
    pub python_args: Vec<String>,

    #[serde(default, deserialize_with = "deserialize_args")]
    pub args: Vec<String>,
}

impl RuntimeVariant for PythonRuntime {
    fn kind(&self) -> RuntimeKind {
        RuntimeKind::Python
    }

    fn common(&self) -> &CommonRuntime {
        &self.common
    }

    fn common_mut(&mut self) -> &mut CommonRuntime {
        &mut self.common
    }

    fn description(&self) -> &'static str {
        "Run Python 2.7 script"
    }

    fn dependencies(&self) -> &'static [&'static str] {
        &[PYTHON_DEPENDENCY]
    }

    fn yaml_template(&self) -> &'static str {
        r#"
# REQUIRED
# Filepath of the Python script to run.
# Example value: /app/main.py
main: <filepath>

# OPTIONAL
# A list of Python interpreter args.
# Example value: python_args:
#                   - -O
python_args:
   - <list>

# OPTIONAL
# A list of command line args used by the script.
args:
   - <list>
"#
    }

    fn missing_field(&self) -> Option<&'static str> {
        self.main.is_empty().then_some("main")
    }

    fn launch_command(&self) -> String {
        PYTHON_LAUNCHER.to_string()
    }

    fn launch_env(&self) -> EnvMap {
        let mut env = self.common.env.clone();
        set_default_env(
            &mut env,
            [
                ("PYTHON_ARGS", join_args(&self.python_args)),
                ("MAIN", self.main.clone()),
                ("ARGS", join_args(&self.args)),
            ],
        );
        env
    }
}
