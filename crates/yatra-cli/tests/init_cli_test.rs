//! Integration tests for the `yatra` binary's database-free commands.
//!
//! Each test points `XDG_CONFIG_HOME` at its own temporary directory, so the
//! user's real config is never touched.

use std::path::Path;
use std::process::{Command, Output};

fn yatra(config_home: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_yatra"))
        .args(args)
        .env("XDG_CONFIG_HOME", config_home)
        .env_remove("YATRA_DATABASE_URL")
        .output()
        .expect("failed to run yatra binary")
}

#[test]
fn help_lists_commands() {
    let tmp = tempfile::TempDir::new().unwrap();
    let out = yatra(tmp.path(), &["--help"]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    for cmd in ["init", "db-init", "serve", "temple", "trip"] {
        assert!(stdout.contains(cmd), "help is missing {cmd}: {stdout}");
    }
}

#[test]
fn init_writes_config_file() {
    let tmp = tempfile::TempDir::new().unwrap();
    let out = yatra(
        tmp.path(),
        &["init", "--db-url", "postgresql://db.internal:5432/yatra"],
    );
    assert!(
        out.status.success(),
        "init failed: {}",
        String::from_utf8_lossy(&out.stderr)
    );

    let path = tmp.path().join("yatra").join("config.toml");
    let contents = std::fs::read_to_string(&path).expect("config file should exist");
    assert!(contents.contains("postgresql://db.internal:5432/yatra"));
    assert!(contents.contains("[llm]"));
    assert!(contents.contains("gpt-4o-mini"));
    assert!(!contents.contains("api_key"));

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}

#[test]
fn init_refuses_to_overwrite_without_force() {
    let tmp = tempfile::TempDir::new().unwrap();
    assert!(yatra(tmp.path(), &["init"]).status.success());

    let again = yatra(tmp.path(), &["init", "--db-url", "postgresql://other:5432/x"]);
    assert!(!again.status.success());
    assert!(String::from_utf8_lossy(&again.stderr).contains("already exists"));

    let forced = yatra(
        tmp.path(),
        &["init", "--force", "--db-url", "postgresql://other:5432/x"],
    );
    assert!(forced.status.success());
    let contents =
        std::fs::read_to_string(tmp.path().join("yatra").join("config.toml")).unwrap();
    assert!(contents.contains("postgresql://other:5432/x"));
}

#[test]
fn trip_plan_requires_from_and_days() {
    let tmp = tempfile::TempDir::new().unwrap();
    let out = yatra(tmp.path(), &["trip", "plan", "--days", "3"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("--from"));
}
