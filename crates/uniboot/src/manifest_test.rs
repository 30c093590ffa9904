// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

use rstest::rstest;
use tempfile::TempDir;

use super::*;

fn write_manifest(package_dir: &Path, content: &str) -> PathBuf {
    let path = package_dir.join(RUN_MANIFEST_PATH);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, content).expect("Failed to write run manifest");
    path
}

#[rstest]
fn test_parse_native_manifest() {
    let yaml = r#"
runtime: native
config_set:
  hello:
    bootcmd: /hello.so
    env:
      GREETING: hi
"#;
    let manifest = RunManifest::from_yaml(yaml).expect("Should parse manifest");
    assert_eq!(manifest.runtime, RuntimeKind::Native);
    assert!(manifest.config_set_default.is_empty());
    assert_eq!(manifest.config_set_names(), vec!["hello"]);

    let Runtime::Native(native) = &manifest.config_sets["hello"] else {
        panic!("expected native runtime");
    };
    assert_eq!(native.bootcmd, "/hello.so");
    assert_eq!(native.common.env["GREETING"], "hi");
}

#[rstest]
fn test_parse_java_manifest_with_default() {
    let yaml = r#"
runtime: java
config_set_default: server
config_set:
  server:
    main: org.example.Server
    classpath:
      - /app
      - /lib
    jvm_args:
      - -Djava.net.preferIPv4Stack=true
  client:
    base: "app:server"
"#;
    let manifest = RunManifest::from_yaml(yaml).expect("Should parse manifest");
    assert_eq!(manifest.runtime, RuntimeKind::Java);
    assert_eq!(manifest.config_set_default, "server");
    assert_eq!(manifest.config_sets.len(), 2);

    let Runtime::Java(server) = &manifest.config_sets["server"] else {
        panic!("expected java runtime");
    };
    assert_eq!(server.classpath, vec!["/app", "/lib"]);
    assert_eq!(manifest.config_sets["client"].base(), "app:server");
    assert_eq!(manifest.dependencies(), vec!["openjdk8-zulu-compact1"]);
}

#[rstest]
fn test_config_set_without_fields_is_blank() {
    let yaml = r#"
runtime: native
config_set:
  empty:
"#;
    let manifest = RunManifest::from_yaml(yaml).expect("Should parse manifest");
    assert_eq!(
        manifest.config_sets["empty"],
        Runtime::blank(RuntimeKind::Native)
    );
}

#[rstest]
#[case("runtime: [native]\nconfig_set: {}\n")]
#[case("config_set:\n  run:\n    bootcmd: /app\n")]
#[case("not: [valid")]
fn test_malformed_manifest(#[case] yaml: &str) {
    let err = RunManifest::from_yaml(yaml).unwrap_err();
    assert!(matches!(err, Error::ManifestParse { .. }), "{err:?}");
}

#[rstest]
fn test_unknown_runtime() {
    let err = RunManifest::from_yaml("runtime: ruby\nconfig_set:\n  run: {}\n").unwrap_err();
    assert!(matches!(err, Error::UnsupportedRuntime { name, .. } if name == "ruby"));
}

#[rstest]
#[case("runtime: native\n")]
#[case("runtime: native\nconfig_set: {}\n")]
fn test_empty_config_set(#[case] yaml: &str) {
    let err = RunManifest::from_yaml(yaml).unwrap_err();
    assert!(matches!(err, Error::EmptyConfigSet));
}

#[rstest]
fn test_select_single_config_set_implicitly() {
    let manifest =
        RunManifest::from_yaml("runtime: native\nconfig_set:\n  only:\n    bootcmd: /a\n").unwrap();
    let (name, runtime) = manifest.select_config_set(None).expect("Should select");
    assert_eq!(name, "only");
    assert_eq!(runtime.kind(), RuntimeKind::Native);
}

#[rstest]
fn test_select_ambiguous_without_default() {
    let manifest = RunManifest::from_yaml(
        "runtime: native\nconfig_set:\n  a:\n    bootcmd: /a\n  b:\n    bootcmd: /b\n",
    )
    .unwrap();

    match manifest.select_config_set(None) {
        Err(Error::AmbiguousConfigSet { available }) => assert_eq!(available, vec!["a", "b"]),
        other => panic!("expected ambiguity, got {other:?}"),
    }
}

#[rstest]
fn test_select_uses_default_then_explicit_name() {
    let manifest = RunManifest::from_yaml(
        "runtime: native\nconfig_set_default: b\nconfig_set:\n  a:\n    bootcmd: /a\n  b:\n    bootcmd: /b\n",
    )
    .unwrap();

    let (name, _) = manifest.select_config_set(None).unwrap();
    assert_eq!(name, "b");
    let (name, _) = manifest.select_config_set(Some("a")).unwrap();
    assert_eq!(name, "a");
}

#[rstest]
fn test_select_unknown_name_lists_available() {
    let manifest =
        RunManifest::from_yaml("runtime: native\nconfig_set:\n  only:\n    bootcmd: /a\n").unwrap();
    match manifest.select_config_set(Some("missing")) {
        Err(Error::ConfigSetNotFound { name, available }) => {
            assert_eq!(name, "missing");
            assert_eq!(available, vec!["only"]);
        }
        other => panic!("expected not found, got {other:?}"),
    }
}

#[rstest]
fn test_load_package_records_source_path() {
    let tmp = TempDir::new().unwrap();
    let path = write_manifest(tmp.path(), "runtime: native\nconfig_set:\n  run:\n    bootcmd: /a\n");

    let manifest = RunManifest::load_package(tmp.path())
        .expect("Should load")
        .expect("Manifest exists");
    assert_eq!(manifest.source_path, Some(path));
}

#[rstest]
fn test_load_package_without_manifest() {
    let tmp = TempDir::new().unwrap();
    assert!(RunManifest::load_package(tmp.path()).unwrap().is_none());
}

#[rstest]
fn test_general_returns_blank_runtime() {
    let tmp = TempDir::new().unwrap();
    let path = write_manifest(
        tmp.path(),
        "runtime: java\nconfig_set:\n  run:\n    main: a.B\n    classpath: [/]\n",
    );

    let runtime = RunManifest::general(&path).unwrap().expect("Manifest exists");
    assert_eq!(runtime, Runtime::blank(RuntimeKind::Java));
    assert!(RunManifest::general(tmp.path().join("missing.yaml")).unwrap().is_none());
}

#[rstest]
fn test_resolve_package_dir_from_manifest_path() {
    let tmp = TempDir::new().unwrap();
    let path = write_manifest(tmp.path(), "runtime: native\nconfig_set:\n  run:\n    bootcmd: /a\n");

    let expected = dunce::canonicalize(tmp.path()).unwrap();
    assert_eq!(resolve_package_dir(&path).unwrap(), expected);
    assert_eq!(resolve_package_dir(tmp.path()).unwrap(), expected);
}

#[rstest]
#[case(RuntimeKind::Native)]
#[case(RuntimeKind::Node)]
#[case(RuntimeKind::Java)]
#[case(RuntimeKind::Python)]
fn test_template_is_a_loadable_manifest(#[case] kind: RuntimeKind) {
    let template = RunManifest::template(kind);
    let manifest = RunManifest::from_yaml(template.as_str()).expect("Should parse template");
    assert_eq!(manifest.runtime, kind);
    assert_eq!(manifest.config_set_names(), vec!["default"]);

    let plain = strip_comments(&template);
    assert!(!plain.contains('#'));
    assert!(!plain.contains("\n\n\n"));
    let manifest = RunManifest::from_yaml(plain).expect("Should parse plain template");
    assert_eq!(manifest.runtime, kind);
}

#[rstest]
#[case("../escaped")]
#[case("nested/name")]
#[case("..")]
#[case(".")]
#[case("/abs")]
#[case("back\\slash")]
fn test_config_set_name_must_be_a_plain_file_name(#[case] name: &str) {
    let yaml = format!("runtime: native\nconfig_set:\n  '{name}':\n    bootcmd: /a\n");
    match RunManifest::from_yaml(yaml) {
        Err(Error::InvalidConfigSetName { name: found }) => assert_eq!(found, name),
        other => panic!("expected invalid name, got {other:?}"),
    }
}

#[rstest]
fn test_config_set_name_with_dots_is_allowed() {
    let manifest =
        RunManifest::from_yaml("runtime: native\nconfig_set:\n  v1.2-run:\n    bootcmd: /a\n")
            .expect("Should parse");
    assert_eq!(manifest.config_set_names(), vec!["v1.2-run"]);
}
