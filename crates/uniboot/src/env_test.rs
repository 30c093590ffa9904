// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

use rstest::rstest;

use super::*;

fn env(pairs: &[(&str, &str)]) -> EnvMap {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[rstest]
#[case(&[], true)]
#[case(&[("A", "1"), ("B", "two")], true)]
#[case(&[("A B", "1")], false)]
#[case(&[("A", "1 2")], false)]
#[case(&[("OK", "x"), ("BAD", " ")], false)]
fn test_validate_env(#[case] pairs: &[(&str, &str)], #[case] valid: bool) {
    let result = validate_env(&env(pairs));
    assert_eq!(result.is_ok(), valid, "{result:?}");
    if !valid {
        assert!(matches!(result, Err(Error::InvalidEnvEntry { .. })));
    }
}

#[rstest]
fn test_override_env_only_updates_existing_keys() {
    let mut target = env(&[("A", "1"), ("B", "2")]);
    let updated = override_env(&mut target, &env(&[("A", "9"), ("C", "3")]));

    assert_eq!(updated, vec!["A".to_string()]);
    assert_eq!(target, env(&[("A", "9"), ("B", "2")]));
}

#[rstest]
fn test_override_env_reports_unchanged_values() {
    let mut target = env(&[("A", "1")]);
    let updated = override_env(&mut target, &env(&[("A", "1")]));
    assert_eq!(updated, vec!["A".to_string()]);
}

#[rstest]
fn test_set_default_env_skips_existing_and_empty() {
    let mut target = env(&[("MAIN", "custom")]);
    let inserted = set_default_env(&mut target, [("MAIN", "main.Hello"), ("ARGS", ""), ("XMX", "1g")]);

    assert_eq!(inserted, vec!["XMX".to_string()]);
    assert_eq!(target, env(&[("MAIN", "custom"), ("XMX", "1g")]));
}

#[rstest]
fn test_boot_command_renders_hard_then_soft_then_command() {
    let mut cmd = BootCommand::new("/bin/app").with_hard_env(&env(&[("B", "2"), ("A", "1")]));
    cmd.push_soft("C", "3");

    assert_eq!(cmd.to_string(), "--env=A=1 --env=B=2 --env=C?=3 /bin/app");
    assert_eq!(
        cmd.env_tokens(),
        vec!["--env=A=1", "--env=B=2", "--env=C?=3"]
    );
}

#[rstest]
fn test_boot_command_without_env_is_just_the_command() {
    assert_eq!(BootCommand::new("/bin/app").to_string(), "/bin/app");
}
