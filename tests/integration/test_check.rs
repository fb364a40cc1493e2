//! Integration tests for `omnicheck check`

use crate::helpers::*;

#[test]
fn test_quiet_asset_passes() {
  let project = TestProject::new().unwrap();
  let asset = project.write_asset("quiet-check", "lint", 0, false, "    :").unwrap();

  let output = run_omnicheck(&project.path, &["check", "--asset", asset.to_str().unwrap()]).unwrap();
  assert!(output.status.success(), "stderr: {}", stderr_of(&output));
  assert!(stdout_of(&output).contains("Running lint..."));
  assert!(stdout_of(&output).contains("Finished lint"));
  assert!(!stdout_of(&output).contains("Check(s) produced output"));
}

#[test]
fn test_emitted_issue_fails_with_summary_and_exit_3() {
  let project = TestProject::new().unwrap();
  let asset = project
    .write_asset(
      "lint-check",
      "lint",
      0,
      false,
      r#"    printf '%s\n' '{"path":"src/a.rs","line":3,"col":1,"content":"finding"}'"#,
    )
    .unwrap();

  let output = run_omnicheck(
    &project.path,
    &["check", "--asset", asset.to_str().unwrap(), "--parallel=false"],
  )
  .unwrap();
  assert_eq!(output.status.code(), Some(3));

  let stdout = stdout_of(&output);
  assert!(stdout.contains("src/a.rs:3:1: finding"), "stdout: {}", stdout);
  assert!(stdout.contains("Check(s) produced output: [lint]"));
}

#[test]
fn test_nonzero_exit_without_output_is_not_a_failure() {
  let project = TestProject::new().unwrap();
  let asset = project.write_asset("grumpy-check", "lint", 0, false, "    exit 42").unwrap();

  let output = run_omnicheck(&project.path, &["check", "--asset", asset.to_str().unwrap()]).unwrap();
  assert!(output.status.success(), "stderr: {}", stderr_of(&output));
}

#[test]
fn test_stderr_text_becomes_issue_content() {
  let project = TestProject::new().unwrap();
  let asset = project
    .write_asset("broken-check", "lint", 0, false, r#"    echo 'tool crashed: missing dependency' 1>&2"#)
    .unwrap();

  let output = run_omnicheck(
    &project.path,
    &["check", "--asset", asset.to_str().unwrap(), "--parallel=false"],
  )
  .unwrap();
  assert_eq!(output.status.code(), Some(3));

  let stdout = stdout_of(&output);
  assert!(stdout.contains("tool crashed: missing dependency"), "stdout: {}", stdout);
  assert!(stdout.contains("Check(s) produced output: [lint]"));
}

#[test]
fn test_unknown_check_name_fails_fast() {
  let project = TestProject::new().unwrap();
  let asset = project.write_asset("lint-check", "lint", 0, false, "    :").unwrap();

  let output = run_omnicheck(
    &project.path,
    &["check", "ghost", "--asset", asset.to_str().unwrap()],
  )
  .unwrap();
  assert_eq!(output.status.code(), Some(1));

  let stderr = stderr_of(&output);
  assert!(stderr.contains("unknown check 'ghost'"), "stderr: {}", stderr);
  assert!(stderr.contains("lint"));
}

#[test]
fn test_configured_skip_suppresses_check() {
  let project = TestProject::new().unwrap();
  let asset = project
    .write_asset(
      "lint-check",
      "lint",
      0,
      false,
      r#"    printf '%s\n' '{"content":"should never be seen"}'"#,
    )
    .unwrap();
  project
    .write_config(
      r#"checks:
  lint:
    skip: true
"#,
    )
    .unwrap();

  let output = run_omnicheck(&project.path, &["check", "--asset", asset.to_str().unwrap()]).unwrap();
  assert!(output.status.success(), "stderr: {}", stderr_of(&output));
  assert!(!stdout_of(&output).contains("should never be seen"));
}

#[test]
fn test_message_filter_suppresses_matching_issues() {
  let project = TestProject::new().unwrap();
  let asset = project
    .write_asset(
      "lint-check",
      "lint",
      0,
      false,
      r#"    printf '%s\n' '{"content":"should have comment or be unexported"}'"#,
    )
    .unwrap();
  project
    .write_config(
      r#"checks:
  lint:
    filters:
      - type: message
        value: "should have comment"
"#,
    )
    .unwrap();

  let output = run_omnicheck(&project.path, &["check", "--asset", asset.to_str().unwrap()]).unwrap();
  assert!(output.status.success(), "stderr: {}", stderr_of(&output));
}

#[test]
fn test_global_path_exclude_suppresses_issues() {
  let project = TestProject::new().unwrap();
  let asset = project
    .write_asset(
      "lint-check",
      "lint",
      0,
      false,
      r#"    printf '%s\n' '{"path":"generated/api.rs","content":"finding"}'"#,
    )
    .unwrap();
  project
    .write_config(
      r#"checks:
  lint: {}
exclude:
  paths:
    - "generated/*"
"#,
    )
    .unwrap();

  let output = run_omnicheck(&project.path, &["check", "--asset", asset.to_str().unwrap()]).unwrap();
  assert!(output.status.success(), "stderr: {}", stderr_of(&output));
}

#[test]
fn test_rejected_config_aborts_before_running() {
  let project = TestProject::new().unwrap();
  let asset = project
    .write_script(
      "picky-check",
      r#"#!/bin/sh
case "$1" in
  type) printf '"picky"\n' ;;
  priority) printf '0\n' ;;
  multi-cpu) printf 'false\n' ;;
  verify-config) echo "unsupported option" 1>&2; exit 1 ;;
  check) : ;;
esac
"#,
    )
    .unwrap();
  project
    .write_config(
      r#"checks:
  picky:
    config:
      strictness: high
"#,
    )
    .unwrap();

  let output = run_omnicheck(&project.path, &["check", "--asset", asset.to_str().unwrap()]).unwrap();
  assert_eq!(output.status.code(), Some(1));
  assert!(stderr_of(&output).contains("rejected configuration"));
}

#[test]
fn test_selects_only_named_checks() {
  let project = TestProject::new().unwrap();
  let noisy = project
    .write_asset("noisy-check", "noisy", 0, false, r#"    printf '%s\n' '{"content":"noise"}'"#)
    .unwrap();
  let quiet = project.write_asset("quiet-check", "quiet", 0, false, "    :").unwrap();

  let output = run_omnicheck(
    &project.path,
    &[
      "check",
      "quiet",
      "--asset",
      noisy.to_str().unwrap(),
      "--asset",
      quiet.to_str().unwrap(),
      "--parallel=false",
    ],
  )
  .unwrap();
  assert!(output.status.success(), "stderr: {}", stderr_of(&output));
  assert!(!stdout_of(&output).contains("noise"));
  assert!(stdout_of(&output).contains("Running quiet..."));
}
