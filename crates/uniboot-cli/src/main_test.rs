// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

use clap::{CommandFactory, Parser};
use rstest::rstest;
use tempfile::TempDir;

use super::*;

#[rstest]
fn test_cli_definition_is_valid() {
    Opt::command().debug_assert();
}

#[rstest]
#[case("app=/pkg/app", "app", "/pkg/app")]
#[case("app=~/pkg=1", "app", "~/pkg=1")]
fn test_parse_package_arg(#[case] value: &str, #[case] name: &str, #[case] dir: &str) {
    let arg = parse_package_arg(value).expect("Should parse");
    assert_eq!(arg.name, name);
    assert_eq!(arg.dir, PathBuf::from(dir));
}

#[rstest]
#[case("app")]
#[case("=/pkg")]
#[case("app=")]
fn test_parse_package_arg_rejects(#[case] value: &str) {
    assert!(parse_package_arg(value).is_err());
}

#[rstest]
fn test_packages_split_on_comma() {
    let opt = Opt::try_parse_from(["uniboot", "show", "-p", "base=/a,app=/b"]).unwrap();
    let Command::Show(_) = opt.cmd else {
        panic!("expected show command");
    };

    let flags = PackageFlags::try_parse_from(["test", "-p", "base=/a,app=/b", "-p", "x=/c"])
        .unwrap();
    let names: Vec<&str> = flags.packages.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["base", "app", "x"]);
}

#[rstest]
fn test_init_requires_known_runtime() {
    assert!(Opt::try_parse_from(["uniboot", "init", "--runtime", "java"]).is_ok());
    assert!(Opt::try_parse_from(["uniboot", "init", "--runtime", "cobol"]).is_err());
}

#[rstest]
fn test_build_registry_skips_packages_without_manifest() {
    let tmp = TempDir::new().unwrap();
    let app = tmp.path().join("app");
    write_file(
        &app.join(uniboot::RUN_MANIFEST_PATH),
        "runtime: native\nconfig_set:\n  run:\n    bootcmd: /bin/app\n",
    )
    .unwrap();
    let empty = tmp.path().join("empty");
    std::fs::create_dir_all(&empty).unwrap();

    let flags = PackageFlags {
        packages: vec![
            PackageArg {
                name: "empty".to_string(),
                dir: empty,
            },
            PackageArg {
                name: "app".to_string(),
                dir: app,
            },
        ],
    };
    let registry = flags.build_registry().expect("Should build registry");
    let names: Vec<&str> = registry.packages().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["app"]);
}

#[rstest]
fn test_init_template_round_trips() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join(uniboot::RUN_MANIFEST_PATH);
    write_file(&path, &cmd_init::render_template(uniboot::RuntimeKind::Node, true)).unwrap();

    let manifest = uniboot::RunManifest::load(&path).expect("Should load template");
    assert_eq!(manifest.runtime, uniboot::RuntimeKind::Node);
}
