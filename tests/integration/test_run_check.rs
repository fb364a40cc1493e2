//! Integration tests for `omnicheck run-check`

use crate::helpers::*;

#[test]
fn test_passes_arguments_through_to_the_tool() {
  let project = TestProject::new().unwrap();
  let asset = project.write_asset("lint-check", "lint", 0, false, "    :").unwrap();

  let output = run_omnicheck(
    &project.path,
    &["run-check", "--asset", asset.to_str().unwrap(), "lint", "foo", "--fix"],
  )
  .unwrap();
  assert!(output.status.success(), "stderr: {}", stderr_of(&output));
  assert!(stdout_of(&output).contains("ran with args: foo --fix"));
}

#[test]
fn test_unknown_checker_type_is_an_error() {
  let project = TestProject::new().unwrap();

  let output = run_omnicheck(&project.path, &["run-check", "ghost"]).unwrap();
  assert_eq!(output.status.code(), Some(1));
  assert!(stderr_of(&output).contains("ghost"));
}
