use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::time::{Duration, Instant};
use tempfile::TempDir;

const RECIPIENT_PUBLIC: &str = include_str!("../../quorum-core/tests/fixtures/recipient.pub.asc");
const RECIPIENT_SECRET: &str = include_str!("../../quorum-core/tests/fixtures/recipient.sec.asc");

fn quorum_binary() -> Option<PathBuf> {
    let mut path = std::env::current_exe().ok()?;
    path.pop();
    path.pop();
    path.push("quorum");
    if path.exists() {
        return Some(path);
    }
    path.pop();
    path.push("debug");
    path.push("quorum");
    if path.exists() {
        return Some(path);
    }
    path.pop();
    path.pop();
    path.push("release");
    path.push("quorum");
    if path.exists() {
        return Some(path);
    }
    None
}

macro_rules! require_binary {
    () => {
        match quorum_binary() {
            Some(p) => p,
            None => {
                eprintln!("SKIPPED: quorum binary not found (build with: cargo build -p quorum-cli)");
                return;
            }
        }
    };
}

struct QuorumCmd {
    cmd: Command,
}

impl QuorumCmd {
    fn new(binary: &Path, home: &Path) -> Self {
        let mut cmd = Command::new(binary);
        cmd.env("HOME", home);
        cmd.env("XDG_CONFIG_HOME", home.join("config"));
        cmd.env_remove("QUORUM_SHARES");
        cmd.env_remove("RUST_LOG");
        Self { cmd }
    }

    fn path(mut self, path: &Path) -> Self {
        self.cmd.arg("--path").arg(path);
        self
    }

    fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<std::ffi::OsStr>,
    {
        self.cmd.args(args);
        self
    }

    fn arg_path(mut self, path: &Path) -> Self {
        self.cmd.arg(path);
        self
    }

    fn env(mut self, key: &str, val: &str) -> Self {
        self.cmd.env(key, val);
        self
    }

    fn run(mut self) -> Output {
        self.cmd
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        let mut child = self.cmd.spawn().expect("failed to spawn");
        let start = Instant::now();
        loop {
            match child.try_wait() {
                Ok(Some(_)) => return child.wait_with_output().expect("failed to wait"),
                Ok(None) if start.elapsed() > Duration::from_secs(60) => {
                    child.kill().ok();
                    panic!("command timed out after 60 seconds");
                }
                Ok(None) => std::thread::sleep(Duration::from_millis(100)),
                Err(e) => panic!("error waiting for child: {e}"),
            }
        }
    }
}

fn assert_success(output: &Output) {
    if output.status.success() {
        return;
    }
    eprintln!("STDOUT: {}", String::from_utf8_lossy(&output.stdout));
    eprintln!("STDERR: {}", String::from_utf8_lossy(&output.stderr));
    panic!("command failed with status: {:?}", output.status);
}

fn assert_failure(output: &Output) {
    assert!(
        !output.status.success(),
        "expected command to fail but it succeeded"
    );
}

fn output_contains(output: &Output, needle: &str) -> bool {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    stdout.contains(needle) || stderr.contains(needle)
}

fn stdout_line(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn shares_from(output: &Output) -> Vec<String> {
    String::from_utf8_lossy(&output.stderr)
        .lines()
        .filter(|l| l.trim_start().starts_with("Share "))
        .filter_map(|l| l.rsplit(": ").next())
        .map(|s| s.trim().to_string())
        .collect()
}

fn init_master(bin: &Path, home: &Path, data: &Path, threshold: &str, shares: &str) -> Vec<String> {
    let output = QuorumCmd::new(bin, home)
        .path(data)
        .args(["init", "--threshold", threshold, "--shares", shares])
        .run();
    assert_success(&output);
    assert!(output_contains(&output, "Master key created"));
    shares_from(&output)
}

#[test]
fn test_otp_ceremony_workflow() {
    let bin = require_binary!();
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("data");

    let shares = init_master(&bin, dir.path(), &data, "2", "3");
    assert_eq!(shares.len(), 3);

    let output = QuorumCmd::new(&bin, dir.path())
        .args(["generate-otp"])
        .run();
    assert_success(&output);
    let otp = stdout_line(&output);
    assert_eq!(otp.len(), 24);

    let output = QuorumCmd::new(&bin, dir.path())
        .path(&data)
        .env("QUORUM_SHARES", &format!("{},{}", shares[0], shares[2]))
        .args(["generate-root", "--otp", &otp])
        .run();
    assert_success(&output);
    assert!(output_contains(&output, "Root credential generated"));
    let encoded = stdout_line(&output);

    let output = QuorumCmd::new(&bin, dir.path())
        .args(["decode", "--otp", &otp, "--encoded", &encoded])
        .run();
    assert_success(&output);
    let id = stdout_line(&output);
    assert_eq!(id.len(), 36);

    let tokens = std::fs::read_to_string(data.join("tokens.json")).unwrap();
    assert!(tokens.contains(&id));

    let output = QuorumCmd::new(&bin, dir.path())
        .path(&data)
        .args(["tokens"])
        .run();
    assert_success(&output);
    assert!(output_contains(&output, "root"));
    assert!(output_contains(&output, "1 credential(s)"));
    assert!(!output_contains(&output, &id));
}

#[test]
fn test_pgp_ceremony_workflow() {
    let bin = require_binary!();
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("data");
    let private = dir.path().join("recipient.key");
    let public = dir.path().join("recipient.pub");

    let shares = init_master(&bin, dir.path(), &data, "1", "1");
    assert_eq!(shares.len(), 1);

    let output = QuorumCmd::new(&bin, dir.path())
        .args(["keygen", "--out"])
        .arg_path(&private)
        .run();
    assert_success(&output);
    assert!(output_contains(&output, "BEGIN PGP PUBLIC KEY BLOCK"));
    std::fs::write(&public, &output.stdout).unwrap();

    let output = QuorumCmd::new(&bin, dir.path())
        .path(&data)
        .env("QUORUM_SHARES", &shares[0])
        .args(["generate-root", "--pgp-key"])
        .arg_path(&public)
        .run();
    assert_success(&output);
    let encoded = stdout_line(&output);

    let output = QuorumCmd::new(&bin, dir.path())
        .args(["decrypt", "--encoded", &encoded, "--key"])
        .arg_path(&private)
        .run();
    assert_success(&output);
    let id = stdout_line(&output);
    let tokens = std::fs::read_to_string(data.join("tokens.json")).unwrap();
    assert!(tokens.contains(&id));
}

#[test]
fn test_pgp_ceremony_with_exported_gpg_key() {
    let bin = require_binary!();
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("data");
    let private = dir.path().join("recipient.sec.asc");
    let public = dir.path().join("recipient.pub.asc");
    std::fs::write(&private, RECIPIENT_SECRET).unwrap();
    std::fs::write(&public, RECIPIENT_PUBLIC).unwrap();

    let shares = init_master(&bin, dir.path(), &data, "2", "3");

    let output = QuorumCmd::new(&bin, dir.path())
        .path(&data)
        .env("QUORUM_SHARES", &format!("{},{}", shares[1], shares[2]))
        .args(["generate-root", "--pgp-key"])
        .arg_path(&public)
        .run();
    assert_success(&output);
    assert!(output_contains(&output, "1bbea74335a67bfdc7cafcd3fdeaf5e8ded406ef"));
    let encoded = stdout_line(&output);

    let output = QuorumCmd::new(&bin, dir.path())
        .args(["decrypt", "--encoded", &encoded, "--key"])
        .arg_path(&private)
        .run();
    assert_success(&output);
    let id = stdout_line(&output);
    let tokens = std::fs::read_to_string(data.join("tokens.json")).unwrap();
    assert!(tokens.contains(&id));
}

#[test]
fn test_generate_root_rejects_non_openpgp_key() {
    let bin = require_binary!();
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("data");
    let bogus = dir.path().join("bogus.asc");
    std::fs::write(&bogus, "-----BEGIN PGP PUBLIC KEY BLOCK-----\n\nAAAA\n").unwrap();
    init_master(&bin, dir.path(), &data, "1", "1");

    let output = QuorumCmd::new(&bin, dir.path())
        .path(&data)
        .args(["generate-root", "--pgp-key"])
        .arg_path(&bogus)
        .run();
    assert_failure(&output);
    assert!(output_contains(&output, "invalid PGP key"));
    assert!(!data.join("tokens.json").exists());
}

#[test]
fn test_generate_root_with_wrong_shares() {
    let bin = require_binary!();
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("data");
    let other = dir.path().join("other");

    init_master(&bin, dir.path(), &data, "2", "3");
    let foreign = init_master(&bin, dir.path(), &other, "2", "3");

    let output = QuorumCmd::new(&bin, dir.path())
        .args(["generate-otp"])
        .run();
    let otp = stdout_line(&output);

    let output = QuorumCmd::new(&bin, dir.path())
        .path(&data)
        .env("QUORUM_SHARES", &format!("{},{}", foreign[0], foreign[1]))
        .args(["generate-root", "--otp", &otp])
        .run();
    assert_failure(&output);
    assert!(!data.join("tokens.json").exists());
}

#[test]
fn test_generate_root_not_enough_shares() {
    let bin = require_binary!();
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("data");

    let shares = init_master(&bin, dir.path(), &data, "3", "5");
    let otp = stdout_line(
        &QuorumCmd::new(&bin, dir.path())
            .args(["generate-otp"])
            .run(),
    );

    let output = QuorumCmd::new(&bin, dir.path())
        .path(&data)
        .env("QUORUM_SHARES", &format!("{},{}", shares[0], shares[0]))
        .args(["generate-root", "--otp", &otp])
        .run();
    assert_failure(&output);
    assert!(output_contains(&output, "not enough key shares"));
}

#[test]
fn test_generate_root_requires_output_mode() {
    let bin = require_binary!();
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("data");
    init_master(&bin, dir.path(), &data, "1", "1");

    let output = QuorumCmd::new(&bin, dir.path())
        .path(&data)
        .args(["generate-root"])
        .run();
    assert_failure(&output);

    let output = QuorumCmd::new(&bin, dir.path())
        .path(&data)
        .args(["generate-root", "--otp", "AAAA"])
        .run();
    assert_failure(&output);
    assert!(output_contains(&output, "OTP length"));
}

#[test]
fn test_init_refuses_overwrite() {
    let bin = require_binary!();
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("data");
    init_master(&bin, dir.path(), &data, "2", "2");

    let output = QuorumCmd::new(&bin, dir.path())
        .path(&data)
        .args(["init", "--threshold", "2", "--shares", "2"])
        .run();
    assert_failure(&output);
    assert!(output_contains(&output, "already exists"));
}

#[test]
fn test_init_rejects_bad_threshold() {
    let bin = require_binary!();
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("data");

    let output = QuorumCmd::new(&bin, dir.path())
        .path(&data)
        .args(["init", "--threshold", "1", "--shares", "3"])
        .run();
    assert_failure(&output);
    assert!(!data.join("master.json").exists());
}

#[test]
fn test_revoke_unknown_accessor() {
    let bin = require_binary!();
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("data");

    let output = QuorumCmd::new(&bin, dir.path())
        .path(&data)
        .args(["revoke", "--accessor", "missing"])
        .run();
    assert_failure(&output);
}

#[test]
fn test_config_rejects_unknown_keys() {
    let bin = require_binary!();
    let dir = TempDir::new().unwrap();
    let config_dir = dir.path().join("config").join("quorum");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(config_dir.join("config.toml"), "relays = []\n").unwrap();

    let output = QuorumCmd::new(&bin, dir.path())
        .args(["generate-otp"])
        .run();
    assert_failure(&output);
    assert!(output_contains(&output, "Invalid config"));
}
