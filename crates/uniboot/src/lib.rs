// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! uniboot - Unikernel Run Manifest Resolution
//!
//! This crate turns the run manifests (`meta/run.yaml`) of the packages that
//! make up a unikernel image into the boot commands the image is started with.
//!
//! # Overview
//!
//! Each package declares one or more named configuration sets for a single
//! runtime. A configuration set either describes its own command, or names a
//! configuration set of another package as its `base` and only adds
//! environment variables on top of it. Packages are registered in dependency
//! order, then every configuration set is validated and resolved in a single
//! pass.
//!
//! # Example
//!
//! ```yaml
//! # meta/run.yaml of an application package
//! runtime: native
//! config_set_default: serve
//!
//! config_set:
//!   serve:
//!     base: "http-server:run"
//!     env:
//!       PORT: 8000
//! ```

pub mod env;
pub mod error;
pub mod lock;
pub mod manifest;
pub mod registry;
pub mod resolve;
pub mod runtime;

pub use env::{BootCommand, EnvMap};
pub use error::{Error, Result};
pub use lock::{generate_lock, verify_lock, LockChange, LockChangeKind, LockFile};
pub use manifest::{resolve_package_dir, strip_comments, RunManifest};
pub use registry::{
    persist_resolved, runscript_command, ConfigRegistry, PersistedArtifact, ResolvedConfigSet,
};
pub use resolve::BaseRef;
pub use runtime::{pick_runtime, Runtime, RuntimeKind, SUPPORTED_RUNTIMES};

/// Location of the run manifest inside a package.
pub const RUN_MANIFEST_PATH: &str = "meta/run.yaml";

/// Directory, relative to the output root, that boot commands are written to.
pub const RUN_DIR_NAME: &str = "run";

/// Well-known filename for lock files, inside [`RUN_DIR_NAME`].
pub const UNIBOOT_LOCK_FILENAME: &str = ".uniboot.lock.yaml";
