//! Integration tests for `omnicheck checkers`

use crate::helpers::*;

#[test]
fn test_lists_checkers_sorted_with_metadata() {
  let project = TestProject::new().unwrap();
  let vet = project.write_asset("vet-check", "vet", 7, true, "    :").unwrap();
  let lint = project.write_asset("lint-check", "lint", 2, false, "    :").unwrap();

  let output = run_omnicheck(
    &project.path,
    &[
      "checkers",
      "--asset",
      vet.to_str().unwrap(),
      "--asset",
      lint.to_str().unwrap(),
    ],
  )
  .unwrap();
  assert!(output.status.success(), "stderr: {}", stderr_of(&output));

  let stdout = stdout_of(&output);
  let lines: Vec<&str> = stdout.lines().collect();
  assert_eq!(lines.len(), 2);
  assert_eq!(lines[0], "lint (priority 2, exclusive)");
  assert_eq!(lines[1], "vet (priority 7, multi-cpu)");
}

#[test]
fn test_marks_configured_skip_and_priority_override() {
  let project = TestProject::new().unwrap();
  let lint = project.write_asset("lint-check", "lint", 2, false, "    :").unwrap();
  project
    .write_config(
      r#"checks:
  lint:
    skip: true
    priority: 9
"#,
    )
    .unwrap();

  let output = run_omnicheck(&project.path, &["checkers", "--asset", lint.to_str().unwrap()]).unwrap();
  assert!(output.status.success(), "stderr: {}", stderr_of(&output));

  let stdout = stdout_of(&output);
  assert!(stdout.contains("[skipped]"));
  assert!(stdout.contains("[priority override 9]"));
}
