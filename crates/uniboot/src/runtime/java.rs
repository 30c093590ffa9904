// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

use serde::Deserialize;

use super::common::{deserialize_args, deserialize_string};
use super::{join_args, CommonRuntime, RuntimeKind, RuntimeVariant};
use crate::env::{set_default_env, EnvMap};

/// Package providing the JVM that launches Java configuration sets.
pub const JAVA_DEPENDENCY: &str = "openjdk8-zulu-compact1";

/// Launcher command; every argument is read from the environment at boot.
pub const JAVA_LAUNCHER: &str = "/java.so -Xms$XMS -Xmx$XMX -cp $CLASSPATH $JVM_ARGS $MAIN $ARGS";

const DEFAULT_HEAP: &str = "512m";

/// The interpreter cannot pass an empty variable as an argument, so an
/// inert system property stands in for missing JVM arguments.
const EMPTY_JVM_ARGS: &str = "-Dx=y";

/// Runs a Java application on the JVM.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct JavaRuntime {
    #[serde(flatten)]
    pub common: CommonRuntime,

    /// Initial heap size, e.g. `512m`.
    #[serde(default, deserialize_with = "deserialize_string")]
    pub xms: String,

    /// Maximum heap size.
    #[serde(default, deserialize_with = "deserialize_string")]
    pub xmx: String,

    /// Paths where classes and other resources can be found.
    #[serde(default, deserialize_with = "deserialize_args")]
    pub classpath: Vec<String>,

    #[serde(default, deserialize_with = "deserialize_args")]
    pub jvm_args: Vec<String>,

    /// Fully qualified name of the main class.
    #[serde(default, deserialize_with = "deserialize_string")]
    pub main: String,

    /// Command line arguments passed to the application.
    #[serde(default, deserialize_with = "deserialize_args")]
    pub args: Vec<String>,
}

impl JavaRuntime {
    fn jvm_args_value(&self) -> String {
        if self.jvm_args.is_empty() {
            EMPTY_JVM_ARGS.to_string()
        } else {
            join_args(&self.jvm_args)
        }
    }

    fn heap_value(value: &str) -> String {
        if value.is_empty() {
            DEFAULT_HEAP.to_string()
        } else {
            value.to_string()
        }
    }
}

impl RuntimeVariant for JavaRuntime {
    fn kind(&self) -> RuntimeKind {
        RuntimeKind::Java
    }

    fn common(&self) -> &CommonRuntime {
        &self.common
    }

    fn common_mut(&mut self) -> &mut CommonRuntime {
        &mut self.common
    }

    fn description(&self) -> &'static str {
        "Run Java application"
    }

    fn dependencies(&self) -> &'static [&'static str] {
        &[JAVA_DEPENDENCY]
    }

    fn yaml_template(&self) -> &'static str {
        r#"
# REQUIRED
# Fully classified name of the main class.
# Example value: main.Hello
main: <name>

# REQUIRED
# A list of paths where classes and other resources can be found.
# Example value: classpath:
#                   - /
#                   - /package1
classpath:
   - <list>

# OPTIONAL
# Initial and maximum JVM memory size.
# Example value: xms: 512m
xms: <value>
xmx: <value>

# OPTIONAL
# A list of JVM args.
# Example value: jvm_args:
#                   - -Djava.net.preferIPv4Stack=true
#                   - -Dhadoop.log.dir=/hdfs/logs
jvm_args:
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
        if self.main.is_empty() {
            Some("main")
        } else if self.classpath.is_empty() {
            Some("classpath")
        } else {
            None
        }
    }

    fn launch_command(&self) -> String {
        JAVA_LAUNCHER.to_string()
    }

    fn launch_env(&self) -> EnvMap {
        let mut env = self.common.env.clone();
        set_default_env(
            &mut env,
            [
                ("XMS", Self::heap_value(&self.xms)),
                ("XMX", Self::heap_value(&self.xmx)),
                ("CLASSPATH", self.classpath.join(":")),
                ("JVM_ARGS", self.jvm_args_value()),
                ("MAIN", self.main.clone()),
                ("ARGS", join_args(&self.args)),
            ],
        );
        env
    }
}
