// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use anyhow::{Context, Result};
use clap::Args;
use light52_config::{BoardConfig, StopReason, TestAssertion, TestScript};
use light52_sim::{RunReport, Session};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info};

const EXIT_PASS: u8 = 0;
const EXIT_ASSERT_FAIL: u8 = 1;
const EXIT_CONFIG_ERROR: u8 = 2;

/// Scripts asking for more polls than this are rejected as misconfigured.
const MAX_ALLOWED_POLLS: u64 = 50_000_000;

#[derive(Args, Debug)]
pub struct TestArgs {
    /// Path to the test script (YAML)
    #[arg(short, long)]
    script: PathBuf,

    /// Directory for `result.json` and `junit.xml`
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Write a JUnit report to this path
    #[arg(long)]
    junit: Option<PathBuf>,

    /// Don't mirror UART output to stdout
    #[arg(long)]
    no_uart_stdout: bool,

    /// Enable debug-level tracing
    #[arg(short, long)]
    pub trace: bool,
}

#[derive(Debug, Serialize)]
struct AssertionOutcome {
    assertion: String,
    passed: bool,
    detail: String,
}

#[derive(Debug, Serialize)]
struct ResolvedConfig {
    script: String,
    board: Option<String>,
    build_tag: String,
    max_polls: u64,
}

#[derive(Debug, Serialize)]
struct TestResult {
    status: &'static str,
    target: String,
    stop_reason: StopReason,
    transcript_sha256: String,
    tx_bytes: usize,
    overruns: u64,
    polls: u64,
    cycles: u64,
    transcript: String,
    assertions: Vec<AssertionOutcome>,
    config: ResolvedConfig,
}

pub fn run(args: &TestArgs) -> ExitCode {
    let (script, board, board_path) = match load(&args.script) {
        Ok(loaded) => loaded,
        Err(e) => {
            error!("{:#}", e);
            return ExitCode::from(EXIT_CONFIG_ERROR);
        }
    };

    if script.limits.max_polls > MAX_ALLOWED_POLLS {
        error!(
            "Limit 'max_polls' of {} exceeds the allowed maximum of {}",
            script.limits.max_polls, MAX_ALLOWED_POLLS
        );
        return ExitCode::from(EXIT_CONFIG_ERROR);
    }

    let session = match Session::new(board, script.inputs.target) {
        Ok(session) => session
            .with_max_polls(script.limits.max_polls)
            .with_echo(!args.no_uart_stdout),
        Err(e) => {
            error!("{}", e);
            return ExitCode::from(EXIT_CONFIG_ERROR);
        }
    };

    let build_tag = script
        .inputs
        .build_tag
        .clone()
        .unwrap_or_else(|| crate::DEFAULT_BUILD_TAG.to_string());
    info!("Running {:?} ({} target)", args.script, script.inputs.target);
    let report = session.run_hello(&build_tag);

    let outcomes: Vec<AssertionOutcome> = script
        .assertions
        .iter()
        .map(|a| evaluate(a, &report))
        .collect();
    let passed = outcomes.iter().all(|o| o.passed);
    for outcome in outcomes.iter().filter(|o| !o.passed) {
        error!("Assertion failed: {} ({})", outcome.assertion, outcome.detail);
    }

    let result = TestResult {
        status: if passed { "pass" } else { "fail" },
        target: report.target.to_string(),
        stop_reason: report.stop_reason,
        transcript_sha256: format!("{:x}", Sha256::digest(report.transcript_bytes())),
        tx_bytes: report.tx.len(),
        overruns: report.overruns,
        polls: report.polls,
        cycles: report.cycles,
        transcript: report.transcript(),
        assertions: outcomes,
        config: ResolvedConfig {
            script: args.script.display().to_string(),
            board: board_path.map(|p| p.display().to_string()),
            build_tag,
            max_polls: script.limits.max_polls,
        },
    };

    if let Err(e) = write_artifacts(args, &result) {
        error!("{:#}", e);
        return ExitCode::from(EXIT_CONFIG_ERROR);
    }

    info!("Test {}: stopped with {}", result.status, result.stop_reason);
    if passed {
        ExitCode::from(EXIT_PASS)
    } else {
        ExitCode::from(EXIT_ASSERT_FAIL)
    }
}

fn load(script_path: &Path) -> Result<(TestScript, BoardConfig, Option<PathBuf>)> {
    let script = TestScript::from_file(script_path)?;
    match &script.inputs.board {
        Some(rel) => {
            // Board paths are relative to the script.
            let base = script_path.parent().unwrap_or_else(|| Path::new("."));
            let path = base.join(rel);
            let board = BoardConfig::from_file(&path)?;
            Ok((script, board, Some(path)))
        }
        None => Ok((script, BoardConfig::default(), None)),
    }
}

fn evaluate(assertion: &TestAssertion, report: &RunReport) -> AssertionOutcome {
    match assertion {
        TestAssertion::UartContains(a) => {
            let transcript = report.transcript();
            AssertionOutcome {
                assertion: format!("uart_contains: {:?}", a.uart_contains),
                passed: transcript.contains(&a.uart_contains),
                detail: format!("transcript was {:?}", transcript),
            }
        }
        TestAssertion::ExpectedStopReason(a) => AssertionOutcome {
            assertion: format!("expected_stop_reason: {}", a.expected_stop_reason),
            passed: report.stop_reason == a.expected_stop_reason,
            detail: format!("stopped with {}", report.stop_reason),
        },
        TestAssertion::MaxOverruns(a) => AssertionOutcome {
            assertion: format!("max_overruns: {}", a.max_overruns),
            passed: report.overruns <= a.max_overruns,
            detail: format!("{} overruns", report.overruns),
        },
    }
}

fn write_artifacts(args: &TestArgs, result: &TestResult) -> Result<()> {
    let mut junit_path = args.junit.clone();

    if let Some(dir) = &args.output_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory {:?}", dir))?;
        let json = serde_json::to_string_pretty(result)?;
        std::fs::write(dir.join("result.json"), json)
            .with_context(|| format!("Failed to write result.json into {:?}", dir))?;
        junit_path.get_or_insert_with(|| dir.join("junit.xml"));
    }

    if let Some(path) = junit_path {
        std::fs::write(&path, junit_xml(result))
            .with_context(|| format!("Failed to write JUnit report {:?}", path))?;
    }

    Ok(())
}

fn junit_xml(result: &TestResult) -> String {
    let failures = result.assertions.iter().filter(|a| !a.passed).count();
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml += &format!(
        "<testsuite name=\"light52 test\" tests=\"{}\" failures=\"{}\">\n",
        result.assertions.len(),
        failures
    );
    for outcome in &result.assertions {
        xml += &format!("  <testcase name=\"{}\"", escape_xml(&outcome.assertion));
        if outcome.passed {
            xml += "/>\n";
        } else {
            xml += &format!(
                ">\n    <failure message=\"{}\"/>\n  </testcase>\n",
                escape_xml(&outcome.detail)
            );
        }
    }
    xml += "</testsuite>\n";
    xml
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c if c.is_control() => out.push_str(&format!("&#x{:X};", c as u32)),
            c => out.push(c),
        }
    }
    out
}
