//! Integration tests for artifetch CLI

use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn artifetch(workdir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_artifetch"))
        .current_dir(workdir)
        .env_remove("ARTIFETCH_PARALLEL")
        .env_remove("ARTIFETCH_STRIP_VCS")
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("Failed to execute artifetch")
}

fn project(fetchfile: &str) -> TempDir {
    let temp = TempDir::new().unwrap();
    for name in ["alpha", "beta"] {
        let dir = temp.path().join("sources").join(name);
        std::fs::create_dir_all(dir.join(".git")).unwrap();
        std::fs::write(dir.join(".git/HEAD"), "ref: refs/heads/main").unwrap();
        std::fs::write(dir.join("README.md"), name).unwrap();
    }
    std::fs::write(temp.path().join("Fetchfile.toml"), fetchfile).unwrap();
    temp
}

const FETCHFILE: &str = r#"
[settings]
strip_vcs = true

[[artifacts]]
name = "modules/alpha"
source = "./sources/alpha"
destination = "vendor/alpha"

[[artifacts]]
name = "modules/beta"
source = "./sources/beta"
destination = "vendor/beta"
strip_vcs = false
"#;

#[test]
fn test_cli_version() {
    let temp = TempDir::new().unwrap();
    let output = artifetch(temp.path(), &["--version"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("artifetch"));
}

#[test]
fn test_cli_help() {
    let temp = TempDir::new().unwrap();
    let output = artifetch(temp.path(), &["--help"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("download"));
    assert!(stdout.contains("list"));
}

#[test]
fn test_cli_invalid_command() {
    let temp = TempDir::new().unwrap();
    let output = artifetch(temp.path(), &["invalid-command"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unrecognized subcommand"));
}

#[test]
fn test_list_with_prefix() {
    let temp = project(FETCHFILE);
    let output = artifetch(temp.path(), &["list", "--prefix", "modules/al"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("vendor/alpha"));
    assert!(!stdout.contains("vendor/beta"));
}

#[test]
fn test_download_installs_local_sources() {
    let temp = project(FETCHFILE);
    let output = artifetch(temp.path(), &["download", "--parallel"]);

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("2 of 2 artifacts fetched"));

    let alpha = temp.path().join("vendor/alpha");
    assert_eq!(std::fs::read_to_string(alpha.join("README.md")).unwrap(), "alpha");
    assert!(!alpha.join(".git").exists());

    let beta = temp.path().join("vendor/beta");
    assert!(beta.join(".git/HEAD").is_file());
    assert!(!temp.path().join("vendor/alpha.tmp").exists());
}

#[test]
fn test_download_reports_failures_and_exits_nonzero() {
    let fetchfile = format!(
        "{FETCHFILE}
[[artifacts]]
name = \"modules/missing\"
source = \"./sources/missing\"
destination = \"vendor/missing\"
"
    );
    let temp = project(&fetchfile);
    let output = artifetch(temp.path(), &["download"]);

    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("2 of 3 artifacts fetched"));
    assert!(stdout.contains("vendor/missing: "));
    assert!(temp.path().join("vendor/alpha/README.md").is_file());
    assert!(!temp.path().join("vendor/missing").exists());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(stderr.matches("1 of 3 artifacts failed to install").count(), 1);
}

#[test]
fn test_duplicate_destination_is_rejected_before_fetching() {
    let fetchfile = r#"
[[artifacts]]
name = "one"
source = "./sources/alpha"
destination = "vendor/shared"

[[artifacts]]
name = "two"
source = "./sources/beta"
destination = "vendor/shared"
"#;
    let temp = project(fetchfile);
    let output = artifetch(temp.path(), &["download"]);

    assert!(!output.status.success());
    assert!(!temp.path().join("vendor").exists());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("duplicate destination"));
}

#[test]
fn test_destination_at_another_staging_path_is_rejected() {
    let fetchfile = r#"
[[artifacts]]
name = "b"
source = "./sources/beta"
destination = "vendor/x.tmp"

[[artifacts]]
name = "a"
source = "./sources/alpha"
destination = "vendor/x"
"#;
    let temp = project(fetchfile);
    let output = artifetch(temp.path(), &["download"]);

    assert!(!output.status.success());
    assert!(!temp.path().join("vendor").exists());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("overlaps"));
}

#[test]
fn test_json_report() {
    let temp = project(FETCHFILE);
    let output = artifetch(temp.path(), &["--json", "download"]);

    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["total"], 2);
    assert_eq!(report["failed"], 0);
}

#[test]
fn test_json_report_describes_failures() {
    let fetchfile = format!(
        "{FETCHFILE}
[[artifacts]]
name = \"modules/missing\"
source = \"./sources/missing\"
destination = \"vendor/missing\"
"
    );
    let temp = project(&fetchfile);
    let output = artifetch(temp.path(), &["--json", "download"]);

    assert!(!output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["failed"], 1);

    let failure = &report["failures"][0];
    assert_eq!(failure["destination"], "vendor/missing");
    assert_eq!(failure["stage"], "transport");
    assert_eq!(failure["code"], "fetch.source_not_found");
    assert!(failure["worker"].is_u64());
    assert!(failure["error"]["Fetch"]["SourceNotFound"]["path"].is_string());
}
