use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

fn dsig() -> Command {
    Command::cargo_bin("dsig").unwrap()
}

fn scratch(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("dsig-cli-{}-{}", std::process::id(), name))
}

#[test]
fn shows_help() {
    dsig()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("sign"))
        .stdout(predicate::str::contains("verify"));
}

#[test]
fn digest_prints_sha256() {
    let path = scratch("abc.txt");
    std::fs::write(&path, b"abc").unwrap();

    dsig().arg("digest").arg(&path).assert().success().stdout(
        "sha256:ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad\n",
    );

    std::fs::remove_file(&path).unwrap();
}

#[test]
fn digest_of_missing_file_fails() {
    dsig()
        .args(["digest", "/no/such/document.pdf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("open /no/such/document.pdf"));
}

#[test]
fn config_init_writes_toml_once() {
    let path = scratch("config.toml");
    let _ = std::fs::remove_file(&path);

    dsig()
        .args(["config", "init", "--cluster", "localnet", "--output"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("rpc_url=http://127.0.0.1:8899"));
    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.contains("cluster = \"localnet\""));

    dsig()
        .args(["config", "init", "--output"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("config file exists"));

    std::fs::remove_file(&path).unwrap();
}

#[test]
fn sign_needs_exactly_one_payload() {
    dsig().args(["sign", "1"]).assert().failure();
    dsig()
        .args(["sign", "1", "--message", "hi", "--digest", "00"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn verify_rejects_conflicting_selectors() {
    dsig()
        .args(["verify", "1", "--sequence", "0", "--digest", "00"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}
