//! End-to-end runs of the binary against fake `gcloud`, `gsutil` and
//! launcher executables placed first on `PATH`.

#![cfg(unix)]
#![allow(clippy::expect_used)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const GCLOUD: &str = r#"#!/bin/sh
echo "gcloud $*" >> "$FAKE_CLOUD_DIR/calls.log"
if [ "$3" = "describe" ]; then
  echo "ERROR: (gcloud.compute.instances.describe) The resource '$4' was not found" >&2
  exit 1
fi
exit 0
"#;

const GSUTIL: &str = r#"#!/bin/sh
echo "gsutil $*" >> "$FAKE_CLOUD_DIR/calls.log"
cp "$3" "$FAKE_CLOUD_DIR/$(basename "$4")"
"#;

const LAUNCHER: &str = r#"#!/bin/sh
echo "gce-xfstests $*" >> "$FAKE_CLOUD_DIR/calls.log"
"#;

/// Fake cloud tools plus a config pointing at local kernels and scratch space.
struct FakeEnv {
    root: TempDir,
}

impl FakeEnv {
    fn new() -> Self {
        let root = TempDir::new().expect("tempdir");
        for dir in ["bin", "cloud", "kernels", "scratch"] {
            std::fs::create_dir(root.path().join(dir)).expect("create dir");
        }
        let env = Self { root };
        env.install("gcloud", GCLOUD);
        env.install("gsutil", GSUTIL);
        env.install("gce-xfstests", LAUNCHER);
        std::fs::write(env.dir("kernels").join("amd64.deb"), "amd64 package")
            .expect("write kernel");
        std::fs::write(
            env.config_path(),
            format!(
                "gcs:\n  bucket: ltm-bucket\nkcs:\n  commit: v6.12\n\
                 kernels:\n  amd64: {}\n  arm64: {}\nscratch_dir: {}\n",
                env.dir("kernels").join("amd64.deb").display(),
                env.dir("kernels").join("arm64.deb").display(),
                env.dir("scratch").display(),
            ),
        )
        .expect("write config");
        env
    }

    fn dir(&self, name: &str) -> PathBuf {
        self.root.path().join(name)
    }

    fn config_path(&self) -> PathBuf {
        self.root.path().join("config.yaml")
    }

    fn install(&self, name: &str, script: &str) {
        let path = self.dir("bin").join(name);
        std::fs::write(&path, script).expect("write script");
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
            .expect("chmod script");
    }

    fn command(&self) -> Command {
        let path = format!(
            "{}:{}",
            self.dir("bin").display(),
            std::env::var("PATH").unwrap_or_default()
        );
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("ltm-handoff"));
        cmd.env("NO_COLOR", "1")
            .env("PATH", path)
            .env("FAKE_CLOUD_DIR", self.dir("cloud"))
            .env("LTM_HANDOFF_CONFIG", self.config_path());
        cmd
    }

    fn calls(&self) -> String {
        std::fs::read_to_string(self.dir("cloud").join("calls.log")).unwrap_or_default()
    }

    fn uploaded(&self, name: &str) -> Option<String> {
        std::fs::read_to_string(self.dir("cloud").join(name)).ok()
    }
}

fn is_empty_dir(path: &Path) -> bool {
    std::fs::read_dir(path).expect("read dir").next().is_none()
}

#[test]
fn test_handoff_publishes_batch_and_launches() {
    let env = FakeEnv::new();

    env.command()
        .assert()
        .success()
        .stdout(predicate::str::contains("'xfstests-ltm' was not running."))
        .stdout(predicate::str::contains("Batch (3 job(s))"))
        .stdout(predicate::str::contains(
            "Handed off to 'xfstests-ltm'. Batch at gs://ltm-bucket/ltm-batch/handoff.batch",
        ));

    let batch = env.uploaded("handoff.batch").expect("descriptor uploaded");
    let lines: Vec<&str> = batch.lines().collect();
    assert_eq!(lines.len(), 3, "{batch}");
    assert!(lines[0].starts_with("ltm -c ext4/4k,xfs/4k -g quick --repo "));
    assert!(lines[1].starts_with("ltm --arch arm64 "));
    assert_eq!(
        lines[2],
        "ltm -c ext4/4k,xfs/4k -g quick --kernel gs://ltm-bucket/kernel-amd64.deb"
    );
    assert_eq!(env.uploaded("kernel-amd64.deb").as_deref(), Some("amd64 package"));
    assert!(env.calls().contains("gce-xfstests launch-ltm"));
    assert!(!env.calls().contains("instances delete"));
    assert!(is_empty_dir(&env.dir("scratch")));
}

#[test]
fn test_dry_run_reports_actions_without_side_effects() {
    let env = FakeEnv::new();

    env.command()
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("LTM handoff (dry run)"))
        .stdout(predicate::str::contains("[dry-run] would upload"))
        .stdout(predicate::str::contains(
            "[dry-run] would publish 3 job(s) to gs://ltm-bucket/ltm-batch/handoff.batch",
        ))
        .stdout(predicate::str::contains("[dry-run] would launch 'xfstests-ltm'"))
        .stdout(predicate::str::contains("Dry run: no remote state was changed."));

    let calls = env.calls();
    assert!(calls.contains("gcloud compute instances describe xfstests-ltm"));
    assert!(!calls.contains("gsutil"), "{calls}");
    assert!(!calls.contains("launch-ltm"), "{calls}");
    assert!(is_empty_dir(&env.dir("scratch")));
}

#[test]
fn test_quiet_dry_run_prints_nothing_on_stdout() {
    let env = FakeEnv::new();

    env.command()
        .args(["--dry-run", "--quiet"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_failed_launch_names_the_step() {
    let env = FakeEnv::new();
    env.install("gce-xfstests", "#!/bin/sh\necho 'quota exceeded' >&2\nexit 1\n");

    env.command()
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error: handoff failed while launching"))
        .stderr(predicate::str::contains("quota exceeded"));

    assert!(env.uploaded("handoff.batch").is_some(), "descriptor stays published");
}

#[test]
fn test_no_color_env_runs_to_completion_without_ansi() {
    let env = FakeEnv::new();

    env.command()
        .env("NO_COLOR", "1")
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("[dry-run] would launch 'xfstests-ltm'"))
        .stdout(predicate::str::contains("\x1b[").not());
}
