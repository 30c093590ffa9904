// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

use rstest::rstest;
use tempfile::TempDir;

use super::*;

fn manifest(yaml: &str) -> RunManifest {
    RunManifest::from_yaml(yaml).expect("Should parse manifest")
}

const BASE: &str = r#"
runtime: native
config_set:
  run:
    bootcmd: /bin/app
    env:
      X: "1"
"#;

const APP: &str = r#"
runtime: native
config_set_default: serve
config_set:
  serve:
    base: "base:run"
    env:
      X: "2"
      Y: "5"
  debug:
    bootcmd: /bin/app --debug
"#;

fn sample_registry() -> ConfigRegistry {
    let mut registry = ConfigRegistry::new();
    registry.add("base", manifest(BASE));
    registry.add("app", manifest(APP));
    registry
}

#[rstest]
fn test_packages_keep_registration_order() {
    let mut registry = sample_registry();
    registry.add("base", manifest(BASE));

    let names: Vec<&str> = registry.packages().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["base", "app"]);
    assert_eq!(registry.len(), 2);
    assert!(!registry.is_empty());
}

#[rstest]
fn test_resolve_selected_config_set() {
    let registry = sample_registry();

    let resolved = registry.resolve("app", None).expect("Should resolve");
    assert_eq!(resolved.config_set, "serve");
    assert_eq!(
        resolved.boot_command.to_string(),
        "--env=X=2 --env=Y?=5 /bin/app"
    );
    assert!(resolved.dependencies.is_empty());
    assert_eq!(resolved.description, "Run arbitrary command inside OSv");

    let resolved = registry.resolve("app", Some("debug")).unwrap();
    assert_eq!(resolved.boot_command.to_string(), "/bin/app --debug");
}

#[rstest]
fn test_resolve_unknown_package() {
    let registry = sample_registry();
    assert!(matches!(
        registry.resolve("nope", None),
        Err(Error::UnresolvedReference { .. })
    ));
}

#[rstest]
fn test_resolve_all_in_registration_order() {
    let registry = sample_registry();
    let resolved = registry.resolve_all().expect("Should resolve all");

    let ids: Vec<(String, String)> = resolved
        .iter()
        .map(|r| (r.package.clone(), r.config_set.clone()))
        .collect();
    assert_eq!(
        ids,
        vec![
            ("base".to_string(), "run".to_string()),
            ("app".to_string(), "debug".to_string()),
            ("app".to_string(), "serve".to_string()),
        ]
    );
}

#[rstest]
fn test_resolve_all_fails_fast_with_context() {
    let mut registry = sample_registry();
    registry.add(
        "broken",
        manifest("runtime: java\nconfig_set:\n  run:\n    classpath: [/app]\n"),
    );

    let err = registry.resolve_all().unwrap_err();
    match &err {
        Error::InConfigSet {
            package,
            config_set,
            ..
        } => {
            assert_eq!(package, "broken");
            assert_eq!(config_set, "run");
        }
        other => panic!("expected context, got {other:?}"),
    }
    assert!(matches!(
        err.root_cause(),
        Error::MissingField { field: "main", .. }
    ));
}

#[rstest]
fn test_inheriting_from_later_package_is_unresolved() {
    // the base must already be registered when inheriting
    let mut registry = ConfigRegistry::new();
    registry.add("app", manifest(APP));

    let err = registry.resolve_all().unwrap_err();
    assert!(matches!(
        err.root_cause(),
        Error::UnresolvedReference { .. }
    ));
}

#[rstest]
fn test_persist_writes_one_file_per_config_set() {
    let tmp = TempDir::new().unwrap();
    let registry = sample_registry();

    let artifacts = registry.persist(tmp.path()).expect("Should persist");
    assert_eq!(artifacts.len(), 3);

    let run_dir = tmp.path().join(RUN_DIR_NAME);
    assert_eq!(
        std::fs::read_to_string(run_dir.join("run")).unwrap(),
        "--env=X=1 /bin/app"
    );
    assert_eq!(
        std::fs::read_to_string(run_dir.join("serve")).unwrap(),
        "--env=X=2 --env=Y?=5 /bin/app"
    );
    assert_eq!(
        std::fs::read_to_string(run_dir.join("debug")).unwrap(),
        "/bin/app --debug"
    );
    assert_eq!(artifacts[0].path, run_dir.join("run"));
}

#[rstest]
fn test_persist_writes_nothing_on_failure() {
    let tmp = TempDir::new().unwrap();
    let mut registry = sample_registry();
    registry.add(
        "bad",
        manifest("runtime: native\nconfig_set:\n  run:\n    bootcmd: /x\n    env:\n      A: a b\n"),
    );

    let err = registry.persist(tmp.path()).unwrap_err();
    assert!(matches!(err.root_cause(), Error::InvalidEnvEntry { .. }));
    assert!(!tmp.path().join(RUN_DIR_NAME).exists());
}

#[rstest]
#[case("", "")]
#[case("serve", "runscript /run/serve")]
fn test_runscript_command(#[case] name: &str, #[case] expected: &str) {
    assert_eq!(runscript_command(name), expected);
}

#[rstest]
fn test_persist_resolved_writes_the_given_pass() {
    let tmp = TempDir::new().unwrap();
    let registry = sample_registry();
    let resolved = registry.resolve_all().unwrap();

    let artifacts = persist_resolved(tmp.path(), &resolved).expect("Should persist");
    assert_eq!(artifacts.len(), resolved.len());
    for (artifact, item) in artifacts.iter().zip(&resolved) {
        assert_eq!(artifact.config_set, item.config_set);
        assert_eq!(artifact.boot_command, item.boot_command.to_string());
        assert_eq!(
            std::fs::read_to_string(&artifact.path).unwrap(),
            artifact.boot_command
        );
    }

    // a lock generated from the same pass verifies against it
    let lock = crate::generate_lock(&registry, &resolved).unwrap();
    assert!(crate::verify_lock(&lock, &registry, &resolved)
        .unwrap()
        .is_empty());
}
