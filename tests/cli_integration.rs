//! Integration tests for the NoteVault CLI.
//!
//! These tests exercise the binary end-to-end using `assert_cmd`.
//! Credentials come from `NOTEVAULT_EMAIL` / `NOTEVAULT_PASSWORD` so no
//! command ever prompts, and a `.notevault.toml` with cheap Argon2
//! settings keeps key derivation fast.

use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

const FAST_CONFIG: &str = "argon2_memory_kib = 8192\nargon2_iterations = 1\nargon2_parallelism = 1\n";

/// Helper: get a Command pointing at the notevault binary.
fn notevault() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("notevault").expect("binary should exist")
}

/// A project dir with a fast config file.
fn project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    tmp.child(".notevault.toml").write_str(FAST_CONFIG).unwrap();
    tmp
}

/// A command running in `dir` as `email`, with the server secret set.
fn as_user(dir: &TempDir, email: &str) -> Command {
    let mut cmd = notevault();
    cmd.current_dir(dir.path())
        .env("NOTEVAULT_SERVER_SECRET", "cli-integration-server-secret")
        .env("NOTEVAULT_EMAIL", email)
        .env("NOTEVAULT_PASSWORD", "correct horse battery")
        .env_remove("NOTEVAULT_LOG");
    cmd
}

fn register(dir: &TempDir, email: &str) {
    as_user(dir, email).arg("register").assert().success();
}

/// Add an entry and return its id, read back through `list --json`.
fn add_entry(dir: &TempDir, email: &str, title: &str, content: &str) -> String {
    as_user(dir, email)
        .args(["add", "--title", title, "--category", "secret", content])
        .assert()
        .success();

    let out = as_user(dir, email)
        .args(["list", "--search", title, "--json"])
        .output()
        .unwrap();
    let page: serde_json::Value = serde_json::from_slice(&out.stdout).expect("list emits JSON");
    page["entries"][0]["id"]
        .as_str()
        .expect("entry id")
        .to_string()
}

#[test]
fn help_flag_shows_usage() {
    notevault()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Encrypted personal note and secret store",
        ))
        .stdout(predicate::str::contains("register"))
        .stdout(predicate::str::contains("add"))
        .stdout(predicate::str::contains("show"))
        .stdout(predicate::str::contains("update"))
        .stdout(predicate::str::contains("delete"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("audit"));
}

#[test]
fn version_flag_shows_version() {
    notevault()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("notevault"));
}

#[test]
fn no_args_shows_help() {
    notevault()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn register_creates_data_dir() {
    let dir = project();
    register(&dir, "alice@example.com");

    dir.child(".notevault/notevault.db")
        .assert(predicate::path::exists());
    dir.child(".notevault/audit.db")
        .assert(predicate::path::exists());
}

#[test]
fn duplicate_registration_fails() {
    let dir = project();
    register(&dir, "alice@example.com");

    as_user(&dir, "alice@example.com")
        .arg("register")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn add_show_roundtrip() {
    let dir = project();
    register(&dir, "alice@example.com");
    let id = add_entry(&dir, "alice@example.com", "Bank PIN", "4821");

    as_user(&dir, "alice@example.com")
        .args(["show", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Bank PIN"))
        .stdout(predicate::str::contains("4821"));
}

#[test]
fn add_reads_content_from_stdin() {
    let dir = project();
    register(&dir, "alice@example.com");

    as_user(&dir, "alice@example.com")
        .args(["add", "--title", "Piped"])
        .write_stdin("from a pipe\n")
        .assert()
        .success();

    as_user(&dir, "alice@example.com")
        .args(["list", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Piped"))
        .stdout(predicate::str::contains("from a pipe").not());
}

#[test]
fn list_never_shows_content() {
    let dir = project();
    register(&dir, "alice@example.com");
    add_entry(&dir, "alice@example.com", "Wifi", "super-secret-wifi");

    as_user(&dir, "alice@example.com")
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Wifi"))
        .stdout(predicate::str::contains("super-secret-wifi").not());
}

#[test]
fn other_users_cannot_see_entries() {
    let dir = project();
    register(&dir, "alice@example.com");
    register(&dir, "bob@example.com");
    let id = add_entry(&dir, "alice@example.com", "Diary", "dear diary");

    as_user(&dir, "bob@example.com")
        .args(["show", &id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));

    as_user(&dir, "bob@example.com")
        .args(["delete", &id, "--force"])
        .assert()
        .failure();

    as_user(&dir, "alice@example.com")
        .args(["show", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("dear diary"));
}

#[test]
fn update_and_delete() {
    let dir = project();
    register(&dir, "alice@example.com");
    let id = add_entry(&dir, "alice@example.com", "Old", "v1");

    as_user(&dir, "alice@example.com")
        .args(["update", &id, "--title", "New", "--favorite", "true", "--content", "v2"])
        .assert()
        .success();

    as_user(&dir, "alice@example.com")
        .args(["show", &id, "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"title\": \"New\""))
        .stdout(predicate::str::contains("\"is_favorite\": true"))
        .stdout(predicate::str::contains("\"content\": \"v2\""));

    as_user(&dir, "alice@example.com")
        .args(["delete", &id, "--force"])
        .assert()
        .success();

    as_user(&dir, "alice@example.com")
        .args(["show", &id])
        .assert()
        .failure();
}

#[test]
fn invalid_category_is_rejected() {
    let dir = project();
    register(&dir, "alice@example.com");

    as_user(&dir, "alice@example.com")
        .args(["add", "--title", "Bad", "--category", "virus", "payload"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("virus"));
}

#[test]
fn wrong_password_fails() {
    let dir = project();
    register(&dir, "alice@example.com");

    as_user(&dir, "alice@example.com")
        .env("NOTEVAULT_PASSWORD", "not the password")
        .arg("login")
        .assert()
        .failure();
}

#[test]
fn missing_server_secret_fails_clearly() {
    let dir = project();
    register(&dir, "alice@example.com");

    as_user(&dir, "alice@example.com")
        .env_remove("NOTEVAULT_SERVER_SECRET")
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("NOTEVAULT_SERVER_SECRET"));
}

#[test]
fn audit_shows_own_events() {
    let dir = project();
    register(&dir, "alice@example.com");
    let id = add_entry(&dir, "alice@example.com", "Bank PIN", "4821");
    as_user(&dir, "alice@example.com")
        .args(["show", &id])
        .assert()
        .success();

    as_user(&dir, "alice@example.com")
        .args(["audit", "--last", "10"])
        .assert()
        .success()
        .stdout(predicate::str::contains("REGISTER"))
        .stdout(predicate::str::contains("CREATE_ENTRY"))
        .stdout(predicate::str::contains("VIEW_ENTRY"));
}
