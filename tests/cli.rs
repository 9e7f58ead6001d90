//! End-to-end tests: run the binary against temp files.

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

const RUNS: &str = r#"[
    {"cmd": "./sim circuits/adder.qasm", "seed": 1},
    {"runtime": 3, "gates": 120},
    {"cmd": "./sim circuits/qft.qasm", "seed": 2},
    {"runtime": 1},
    {"summary": true}
]"#;

/// Scratch directory holding the input, report file and log file.
struct Scratch {
    dir: PathBuf,
}

impl Scratch {
    fn new(name: &str) -> Self {
        let dir = std::env::temp_dir().join(format!("runtab_cli_{}", name));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).expect("create scratch dir");
        let scratch = Scratch { dir };
        scratch.write("runs.json", RUNS);
        scratch.write(
            "report.toml",
            &format!("log_file_path = {:?}\n", scratch.path("runtab.log")),
        );
        scratch
    }

    fn path(&self, name: &str) -> String {
        self.dir.join(name).to_string_lossy().into_owned()
    }

    fn write(&self, name: &str, contents: &str) {
        fs::write(self.dir.join(name), contents).expect("write scratch file");
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_runtab"));
        cmd.env_remove("RUNTAB_FORMAT")
            .env_remove("RUNTAB_COLUMN_SIZE")
            .env_remove("RUNTAB_CONFIG")
            .arg("--config")
            .arg(self.path("report.toml"));
        cmd
    }

    fn run(&self, args: &[&str]) -> Output {
        self.command().args(args).output().expect("run runtab")
    }
}

impl Drop for Scratch {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.dir);
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn binary_prints_version() {
    let output = Command::new(env!("CARGO_BIN_EXE_runtab"))
        .arg("--version")
        .output()
        .expect("Failed to execute binary");
    assert!(output.status.success());
    assert!(
        stdout(&output).contains(env!("CARGO_PKG_VERSION")),
        "Expected version in output, got: {}",
        stdout(&output)
    );
}

#[test]
fn prints_text_table() {
    let scratch = Scratch::new("text");
    let runs = scratch.path("runs.json");
    let output = scratch.run(&[
        "-n", "2", "-w", "6", "-c", "file=0:cmd:basename", "-c", "time=1:runtime", &runs,
    ]);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(
        stdout(&output),
        "|   file |   time |\n|  adder |      3 |\n|    qft |      1 |\n"
    );
}

#[test]
fn prints_csv_with_aggregates() {
    let scratch = Scratch::new("csv");
    let runs = scratch.path("runs.json");
    let output = scratch.run(&[
        "-n", "2", "--csv", "-c", "seed=0:seed", "-c", "gates=1:gates", "-d", "gates=0",
        "-s", "gates", "--sum", "1:runtime", "--unique", "0:seed", &runs,
    ]);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(
        stdout(&output),
        "2,0\n1,120\nsum(1, runtime) = 4\nunique(0, seed) = 2\n"
    );
}

#[test]
fn reads_columns_from_report_file() {
    let scratch = Scratch::new("report");
    scratch.write(
        "report.toml",
        &format!(
            r#"log_file_path = {:?}
commands_per_entry = 2
format = "csv"
separator = ";"

[[columns]]
header = "file"
record = 0
key = "cmd"
transform = "basename"
"#,
            scratch.path("runtab.log")
        ),
    );
    let runs = scratch.path("runs.json");
    let output = scratch.run(&["-c", "time=1:runtime", &runs]);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(stdout(&output), "adder;3\nqft;1\n");
}

#[test]
fn reads_stdin_when_path_is_dash() {
    let scratch = Scratch::new("stdin");
    let mut child = scratch
        .command()
        .args(["-n", "2", "--csv", "-c", "seed=0:seed", "-"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn runtab");
    child
        .stdin
        .take()
        .expect("piped stdin")
        .write_all(RUNS.as_bytes())
        .expect("write stdin");
    let output = child.wait_with_output().expect("wait for runtab");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(stdout(&output), "1\n2\n");
}

#[test]
fn missing_field_fails_without_partial_output() {
    let scratch = Scratch::new("missing");
    let runs = scratch.path("runs.json");
    let output = scratch.run(&["-n", "2", "-c", "gates=1:gates", &runs]);

    assert!(!output.status.success());
    assert!(output.stdout.is_empty(), "no table on failure");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Missing field for column (1, \"gates\")"), "stderr: {}", stderr);
}

#[test]
fn missing_input_file_is_reported() {
    let scratch = Scratch::new("nofile");
    let output = scratch.run(&["-n", "2", &scratch.path("absent.json")]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("absent.json"));
}

#[test]
fn commands_per_entry_is_required() {
    let scratch = Scratch::new("no_n");
    let runs = scratch.path("runs.json");
    let output = scratch.run(&[&runs]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("commands_per_entry"));
}
