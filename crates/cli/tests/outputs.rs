use sha2::{Digest, Sha256};
use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(prefix: &str) -> PathBuf {
    let nonce = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let dir = std::env::temp_dir()
        .join("light52-tests")
        .join(format!("{}-{}", prefix, nonce));
    std::fs::create_dir_all(&dir).expect("Failed to create temp dir");
    dir
}

fn write_script(dir: &PathBuf, contents: &str) -> PathBuf {
    let path = dir.join("script.yaml");
    std::fs::write(&path, contents).expect("Failed to write script");
    path
}

fn run_test(script: &PathBuf, extra: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_light52"))
        .args(["test", "--script", script.to_str().unwrap(), "--no-uart-stdout"])
        .args(extra)
        .output()
        .expect("Failed to execute command")
}

#[test]
fn test_cli_test_mode_outputs() {
    let dir = temp_dir("outputs");
    let script = write_script(
        &dir,
        r#"
schema_version: "1.0"
inputs:
  target: sim
  build_tag: "ci"
limits:
  max_polls: 1000
assertions:
  - uart_contains: "Hello World!\r\n"
  - uart_contains: "Light52 project -- ci"
  - expected_stop_reason: end_of_transmission
"#,
    );
    let output_dir = dir.join("artifacts");

    let output = run_test(&script, &["--output-dir", output_dir.to_str().unwrap()]);
    assert!(output.status.success());

    let junit = std::fs::read_to_string(output_dir.join("junit.xml")).unwrap();
    assert!(junit.contains("<testsuite"));
    assert!(junit.contains("tests=\"3\" failures=\"0\""));

    let result_content = std::fs::read_to_string(output_dir.join("result.json")).unwrap();
    let result: serde_json::Value = serde_json::from_str(&result_content).unwrap();

    assert_eq!(result["status"], "pass");
    assert_eq!(result["stop_reason"], "end_of_transmission");
    assert_eq!(result["target"], "sim");
    assert_eq!(result["polls"], 0);
    // Fingerprint covers the console text, not the trailing EOT.
    let expected = format!(
        "{:x}",
        Sha256::digest(b"\r\nLight52 project -- ci\r\n\r\nHello World!\r\n")
    );
    assert_eq!(result["transcript_sha256"], expected.as_str());
    assert_eq!(result["tx_bytes"], 42);
    assert_eq!(result["config"]["build_tag"], "ci");

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_cli_test_mode_board_relative_to_script() {
    let dir = temp_dir("board");
    std::fs::create_dir_all(dir.join("boards")).unwrap();
    std::fs::write(
        dir.join("boards/slow.yaml"),
        r#"
name: slow
clock_hz: 192000
uart:
  framing: "19200-8-N-1"
  newline: lf_cr
"#,
    )
    .unwrap();
    let script = write_script(
        &dir,
        r#"
schema_version: "1.0"
inputs:
  target: hw
  board: "boards/slow.yaml"
limits:
  max_polls: 100000
assertions:
  - uart_contains: "Hello World!\n\r"
  - expected_stop_reason: end_of_transmission
  - max_overruns: 0
"#,
    );
    let output_dir = dir.join("artifacts");

    let output = run_test(&script, &["--output-dir", output_dir.to_str().unwrap()]);
    assert!(output.status.success());

    let result_content = std::fs::read_to_string(output_dir.join("result.json")).unwrap();
    let result: serde_json::Value = serde_json::from_str(&result_content).unwrap();
    assert_eq!(result["target"], "hw");
    assert!(result["polls"].as_u64().unwrap() > 0);
    assert!(result["config"]["board"]
        .as_str()
        .unwrap()
        .contains("slow.yaml"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_cli_test_mode_junit_flag_writes_file() {
    let dir = temp_dir("junit");
    let script = write_script(
        &dir,
        r#"
schema_version: "1.0"
limits:
  max_polls: 1
assertions:
  - expected_stop_reason: end_of_transmission
"#,
    );
    let junit_path = dir.join("report.xml");

    let output = run_test(&script, &["--junit", junit_path.to_str().unwrap()]);
    assert!(output.status.success());

    let junit = std::fs::read_to_string(&junit_path).unwrap();
    assert!(junit.contains("light52 test"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_cli_test_mode_poll_budget() {
    let dir = temp_dir("budget");
    let script = write_script(
        &dir,
        r#"
schema_version: "1.0"
inputs:
  target: hw
limits:
  max_polls: 10
assertions:
  - expected_stop_reason: poll_budget_exhausted
"#,
    );

    let output = run_test(&script, &[]);
    assert!(output.status.success());

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_cli_test_mode_overruns_fail() {
    let dir = temp_dir("overruns");
    std::fs::write(
        dir.join("timed.yaml"),
        "uart:\n  model_tx_timing: true\n",
    )
    .unwrap();
    let script = write_script(
        &dir,
        r#"
schema_version: "1.0"
inputs:
  target: sim
  board: "timed.yaml"
limits:
  max_polls: 10
assertions:
  - max_overruns: 0
"#,
    );

    let output = run_test(&script, &[]);
    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(1)); // EXIT_ASSERT_FAIL

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_cli_test_mode_contains_fail() {
    let dir = temp_dir("contains-fail");
    let script = write_script(
        &dir,
        r#"
schema_version: "1.0"
limits:
  max_polls: 10
assertions:
  - uart_contains: "Goodbye"
"#,
    );

    let output = run_test(&script, &[]);
    assert_eq!(output.status.code(), Some(1)); // EXIT_ASSERT_FAIL

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_cli_test_mode_max_polls_guard() {
    let dir = temp_dir("huge");
    let script = write_script(
        &dir,
        r#"
schema_version: "1.0"
limits:
  max_polls: 60000000
"#,
    );

    let output = run_test(&script, &[]);
    assert_eq!(output.status.code(), Some(2)); // EXIT_CONFIG_ERROR

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_cli_test_mode_bad_script() {
    let dir = temp_dir("bad");
    let script = write_script(&dir, "schema_version: \"2.0\"\nlimits:\n  max_polls: 5\n");

    let output = run_test(&script, &[]);
    assert_eq!(output.status.code(), Some(2)); // EXIT_CONFIG_ERROR

    let _ = std::fs::remove_dir_all(&dir);
}
