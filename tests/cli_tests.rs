//! End-to-end tests for the cfgcmd binary.
//!
//! Run with: cargo test --test cli_tests

use std::fs;
use std::io::Write;
use std::process::{Command, Stdio};

use tempfile::{NamedTempFile, TempDir};

struct Output {
    stdout: String,
    stderr: String,
    code: i32,
}

fn cfgcmd(args: &[&str], stdin: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_cfgcmd"))
        .args(args)
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn cfgcmd");

    if let Some(mut pipe) = child.stdin.take() {
        pipe.write_all(stdin.as_bytes()).expect("write stdin");
    }
    let output = child.wait_with_output().expect("wait for cfgcmd");
    Output {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        code: output.status.code().unwrap_or(-1),
    }
}

fn temp_doc(text: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(text.as_bytes()).expect("write temp file");
    file
}

const DOC: &str = r#"{"name": "web", "ports": [80, 443], "limits": {"cpu": 2}}"#;

#[test]
fn test_get_from_stdin() {
    let out = cfgcmd(&["get", ".name"], DOC);
    assert_eq!(out.code, 0, "stderr: {}", out.stderr);
    assert_eq!(out.stdout, "\"web\"\n");
}

#[test]
fn test_get_from_file_with_keys() {
    let file = temp_doc(DOC);
    let path = file.path().to_str().unwrap();
    let out = cfgcmd(&["get", "-k", "-f", path, ".ports|each"], "");
    assert_eq!(out.code, 0);
    assert_eq!(out.stdout, "ports.0=80\nports.1=443\n");
}

#[test]
fn test_get_multiple_requests() {
    let out = cfgcmd(&["get", "-q", ".name", ".limits.cpu"], DOC);
    assert_eq!(out.stdout, "web\n2\n");
}

#[test]
fn test_get_shellvars() {
    let out = cfgcmd(&["get", "-k", "-l", ".limits.cpu"], DOC);
    assert_eq!(out.stdout, "limits_cpu=2\n");
}

#[test]
fn test_get_nonewline() {
    let out = cfgcmd(&["get", "-N", ".ports|each"], DOC);
    assert_eq!(out.stdout, "80 443\n");
}

#[test]
fn test_nonewline_multiline_format_warns() {
    let doc = r#"{"a": {"b": 1}, "c": {"d": 2}}"#;
    let out = cfgcmd(&["get", "-j", "-N", ".|each"], doc);
    assert_eq!(out.code, 0, "stderr: {}", out.stderr);
    assert_eq!(out.stdout, "{\n  \"b\": 1\n} {\n  \"d\": 2\n}\n");
    assert_eq!(out.stderr.matches("nonewline output").count(), 1, "stderr: {}", out.stderr);
}

#[test]
fn test_nonewline_compact_json_does_not_warn() {
    let doc = r#"{"a": {"b": 1}, "c": {"d": 2}}"#;
    let out = cfgcmd(&["get", "-c", "-N", ".|each"], doc);
    assert_eq!(out.code, 0);
    assert_eq!(out.stdout, "{\"b\":1} {\"d\":2}\n");
    assert!(!out.stderr.contains("nonewline"), "stderr: {}", out.stderr);
}

#[test]
fn test_get_json_output() {
    let out = cfgcmd(&["get", "-c", ".limits"], DOC);
    assert_eq!(out.stdout, "{\"cpu\":2}\n");
}

#[test]
fn test_get_yaml_input() {
    let out = cfgcmd(&["get", ".server.port"], "server:\n  port: 8080\n");
    assert_eq!(out.stdout, "8080\n");
}

#[test]
fn test_invalid_command_prints_nothing() {
    let out = cfgcmd(&["get", ".name", ".ports|bogus"], DOC);
    assert_eq!(out.code, 5);
    assert_eq!(out.stdout, "");
    assert!(out.stderr.contains("bogus"));
}

#[test]
fn test_parse_error_exit_code() {
    let out = cfgcmd(&["get", ".a"], "{\"a\": ");
    assert_eq!(out.code, 2);
    assert_eq!(out.stdout, "");
}

#[test]
fn test_missing_file_exit_code() {
    let out = cfgcmd(&["get", "-f", "/nonexistent/cfgcmd.json", ".a"], "");
    assert_eq!(out.code, 2);
}

#[test]
fn test_missing_argument_exit_code() {
    assert_eq!(cfgcmd(&["get"], DOC).code, 4);
    assert_eq!(cfgcmd(&["set"], DOC).code, 4);
    assert_eq!(cfgcmd(&["get", "--no-such-flag"], DOC).code, 4);
}

#[test]
fn test_help_exits_zero() {
    let out = cfgcmd(&["--help"], "");
    assert_eq!(out.code, 0);
    assert!(out.stdout.contains("get"));
}

#[test]
fn test_set_noop_prints_document() {
    let out = cfgcmd(&["set", "-c", ".limits.cpu", "4"], DOC);
    assert_eq!(out.code, 0, "stderr: {}", out.stderr);
    assert_eq!(
        out.stdout,
        "{\"name\":\"web\",\"ports\":[80,443],\"limits\":{\"cpu\":4}}\n"
    );
}

#[test]
fn test_set_writes_file_in_place() {
    let file = temp_doc(DOC);
    let path = file.path().to_str().unwrap();
    let out = cfgcmd(&["set", "-f", path, ".name", "db"], "");
    assert_eq!(out.code, 0, "stderr: {}", out.stderr);
    assert_eq!(out.stdout, "");

    let check = cfgcmd(&["get", "-f", path, ".name"], "");
    assert_eq!(check.stdout, "\"db\"\n");
}

#[test]
fn test_set_round_trip() {
    let file = temp_doc(DOC);
    let path = file.path().to_str().unwrap();
    let out = cfgcmd(&["set", "-f", path, ".extra", r#"{"a": [1, 2]}"#], "");
    assert_eq!(out.code, 0, "stderr: {}", out.stderr);

    let check = cfgcmd(&["get", "-c", "-f", path, ".extra"], "");
    assert_eq!(check.stdout, "{\"a\":[1,2]}\n");
}

#[test]
fn test_set_output_file_leaves_input_alone() {
    let file = temp_doc(DOC);
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("out.json");
    let out = cfgcmd(
        &[
            "set",
            "-f",
            file.path().to_str().unwrap(),
            "-o",
            target.to_str().unwrap(),
            ".name",
            "db",
        ],
        "",
    );
    assert_eq!(out.code, 0, "stderr: {}", out.stderr);
    assert_eq!(fs::read_to_string(file.path()).unwrap(), DOC);
    assert!(fs::read_to_string(&target).unwrap().contains("\"db\""));
}

#[test]
fn test_set_noop_does_not_write() {
    let file = temp_doc(DOC);
    let path = file.path().to_str().unwrap();
    let out = cfgcmd(&["set", "-n", "-f", path, ".name", "db"], "");
    assert_eq!(out.code, 0);
    assert!(out.stdout.contains("\"db\""));
    assert_eq!(fs::read_to_string(file.path()).unwrap(), DOC);
}

#[test]
fn test_set_value_from_input_file() {
    let value = temp_doc("[1, 2, 3]\n");
    let out = cfgcmd(
        &["set", "-c", "-i", value.path().to_str().unwrap(), ".ports"],
        DOC,
    );
    assert_eq!(out.code, 0, "stderr: {}", out.stderr);
    assert!(out.stdout.contains("\"ports\":[1,2,3]"));
}

#[test]
fn test_set_value_and_document_both_on_stdin() {
    let out = cfgcmd(&["set", ".name"], DOC);
    assert_eq!(out.code, 4);
}

#[test]
fn test_set_typed() {
    let out = cfgcmd(&["set", "-c", "-t", "float", ".limits.cpu", "3"], DOC);
    assert!(out.stdout.contains("\"cpu\":3.0"));

    let out = cfgcmd(&["set", "-t", "int", ".limits.cpu", "lots"], DOC);
    assert_eq!(out.code, 6);
    assert_eq!(out.stdout, "");

    let out = cfgcmd(&["set", "-t", "gizmo", ".limits.cpu", "1"], DOC);
    assert_eq!(out.code, 4);
}

#[test]
fn test_set_missing_parent() {
    let out = cfgcmd(&["set", ".a.b.c", "1"], DOC);
    assert_eq!(out.code, 1);
}

#[test]
fn test_merge_promotes_scalar() {
    let out = cfgcmd(&["merge", "-c", ".limits.cpu", "5"], DOC);
    assert_eq!(out.code, 0, "stderr: {}", out.stderr);
    assert!(out.stdout.contains("\"cpu\":[2,5]"));
}

#[test]
fn test_merge_object() {
    let out = cfgcmd(&["merge", "-c", ".limits", r#"{"mem": "1g"}"#], DOC);
    assert!(out.stdout.contains(r#""limits":{"cpu":2,"mem":"1g"}"#));
}

#[test]
fn test_remove_partial_failure() {
    let out = cfgcmd(&["remove", "-c", ".name", ".nope"], DOC);
    assert_eq!(out.code, 1);
    assert!(out.stderr.contains(".nope"));
    assert_eq!(
        out.stdout,
        "{\"ports\":[80,443],\"limits\":{\"cpu\":2}}\n"
    );
}

#[test]
fn test_remove_writes_back_yaml() {
    let file = temp_doc("a: 1\nb: 2\n");
    let path = file.path().to_str().unwrap();
    let out = cfgcmd(&["remove", "-f", path, ".a"], "");
    assert_eq!(out.code, 0, "stderr: {}", out.stderr);
    assert_eq!(fs::read_to_string(file.path()).unwrap(), "b: 2\n");
}

#[cfg(unix)]
#[test]
fn test_write_back_keeps_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let file = temp_doc(DOC);
    fs::set_permissions(file.path(), fs::Permissions::from_mode(0o640)).unwrap();
    let path = file.path().to_str().unwrap();
    let out = cfgcmd(&["set", "-f", path, ".name", "db"], "");
    assert_eq!(out.code, 0, "stderr: {}", out.stderr);

    let mode = fs::metadata(file.path()).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o640);
}

#[test]
fn test_dump_subcommand() {
    let out = cfgcmd(&["dump"], r#"{"a": [1]}"#);
    assert_eq!(out.code, 0);
    assert!(out.stdout.starts_with("type: object\n"));
    assert!(out.stdout.contains("type: array"));
}
