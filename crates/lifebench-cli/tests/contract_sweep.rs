use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn lifebench(cwd: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_lifebench"));
    cmd.current_dir(cwd).env("RUST_LOG", "warn");
    cmd
}

/// A stand-in simulation that prints a GNU `time` style report on stderr.
/// Run through `sh`, so it never needs the executable bit.
fn fake_sim(dir: &Path, stderr_line: &str) -> PathBuf {
    let path = dir.join("fake-sim.sh");
    fs::write(
        &path,
        format!("echo \"sim $*\"\necho \"{stderr_line}\" >&2\n"),
    )
    .unwrap();
    path
}

/// Stand-in for `mpirun -n <p> <binary> args...`: records `p`, then runs the binary via sh.
fn fake_mpirun(dir: &Path) -> PathBuf {
    let path = dir.join("fake-mpirun.sh");
    let log = dir.join("workers.log");
    fs::write(
        &path,
        format!(
            "echo \"$2\" >> \"{}\"\nshift 2\nexec sh \"$@\"\n",
            log.display()
        ),
    )
    .unwrap();
    path
}

fn small_grid(dir: &Path) -> PathBuf {
    let path = dir.join("grid.yaml");
    fs::write(
        &path,
        "board_sizes: [64, 128]\nshapes: [[1, 1], [2, 2]]\ntimestep: 3\n",
    )
    .unwrap();
    path
}

#[test]
fn print_config_shows_mpi_preset() {
    let dir = tempdir().unwrap();
    lifebench(dir.path())
        .args(["mpi", "--print-config"])
        .assert()
        .success()
        .stdout(predicate::str::contains("timestep: 654"))
        .stdout(predicate::str::contains("trials: 5"))
        .stdout(predicate::str::contains("gameoflifempi"));
}

#[test]
fn dry_run_lists_every_invocation() {
    let dir = tempdir().unwrap();
    let out = lifebench(dir.path())
        .args(["mpi", "--dry-run"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let stdout = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 90);
    assert_eq!(lines[0], "time mpirun -n 1 ./gameoflifempi 654 1024 1024 1 1");
    assert!(lines.contains(&"time mpirun -n 4 ./gameoflifempi 654 1024 1024 2 2"));
    assert!(!dir.path().join("csv").exists(), "dry run must not touch disk");
}

#[test]
fn zero_trials_is_a_config_error() {
    let dir = tempdir().unwrap();
    lifebench(dir.path())
        .args(["sequential", "--trials", "0"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("trials must be >= 1"));
}

#[test]
fn unknown_config_key_is_a_config_error() {
    let dir = tempdir().unwrap();
    let cfg = dir.path().join("bad.yaml");
    fs::write(&cfg, "trails: 2\n").unwrap();
    lifebench(dir.path())
        .args(["sequential", "--config"])
        .arg(&cfg)
        .assert()
        .code(2);
}

#[test]
fn mpi_sweep_writes_timestamped_csv() {
    let dir = tempdir().unwrap();
    let sim = fake_sim(dir.path(), "0.40user 0.02system 1:02.50elapsed 95%CPU");
    let mpirun = fake_mpirun(dir.path());
    let report = dir.path().join("summary.json");

    lifebench(dir.path())
        .args(["mpi", "--timer", "sh", "--trials", "2", "--config"])
        .arg(small_grid(dir.path()))
        .arg("--launcher")
        .arg(&mpirun)
        .arg("--binary")
        .arg(&sim)
        .arg("--report")
        .arg(&report)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "ITERATION 1 Elapsed time: 1 minutes 02 seconds 50 miliseconds 62050 Total\n",
        ));

    let csvs: Vec<PathBuf> = fs::read_dir(dir.path().join("csv"))
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(csvs.len(), 1);
    let content = fs::read_to_string(&csvs[0]).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 1 + 2 * 2 * 2);
    assert_eq!(lines[0], "px,py,nx,ny,minutes,seconds,millis,total_millis");
    assert_eq!(lines[1], "1,1,64,64,1,02,50,62050");
    assert_eq!(lines[3], "2,2,32,32,1,02,50,62050");

    let workers = fs::read_to_string(dir.path().join("workers.log")).unwrap();
    assert_eq!(
        workers.lines().collect::<Vec<_>>(),
        ["1", "1", "4", "4", "1", "1", "4", "4"]
    );

    let summary: Value = serde_json::from_str(&fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(summary["completed"], 8);
    assert_eq!(summary["skipped"], 0);
    let stamp = summary["started_at"].as_str().unwrap();
    assert_eq!(
        csvs[0].file_name().unwrap().to_string_lossy(),
        format!("results{stamp}.csv")
    );
}

#[test]
fn sequential_sweep_writes_no_csv() {
    let dir = tempdir().unwrap();
    let sim = fake_sim(dir.path(), "0.10user 0.00system 0:00.12elapsed 99%CPU");

    lifebench(dir.path())
        .args(["sequential", "--timer", "sh", "--config"])
        .arg(small_grid(dir.path()))
        .arg("--binary")
        .arg(&sim)
        .assert()
        .success()
        .stdout(predicate::str::contains("sim 3 64 64 1 1"))
        .stdout(predicate::str::contains("sim 3 32 32 2 2"))
        .stdout(predicate::str::contains("sim 3 64 64 2 2"))
        .stdout(predicate::str::contains("completed=4"))
        .stdout(predicate::str::contains(
            "ITERATION 0 Elapsed time: 0 minutes 00 seconds 12 miliseconds\n",
        ))
        .stdout(predicate::str::contains(" Total").not());

    assert!(!dir.path().join("csv").exists());
}

#[test]
fn unparseable_timing_aborts_with_exit_1() {
    let dir = tempdir().unwrap();
    let sim = fake_sim(dir.path(), "no timing here");

    lifebench(dir.path())
        .args(["mpi", "--timer", "sh", "--launcher"])
        .arg(fake_mpirun(dir.path()))
        .arg("--config")
        .arg(small_grid(dir.path()))
        .arg("--binary")
        .arg(&sim)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("fatal"))
        .stderr(predicate::str::contains("px=1 py=1 nx=64 ny=64"));

    // Header was flushed before the first run failed.
    let csv = fs::read_dir(dir.path().join("csv"))
        .unwrap()
        .next()
        .unwrap()
        .unwrap()
        .path();
    assert_eq!(fs::read_to_string(csv).unwrap().lines().count(), 1);

    let workers = fs::read_to_string(dir.path().join("workers.log")).unwrap();
    assert_eq!(workers.lines().count(), 1, "sweep must stop at the first failure");
}

#[test]
fn keep_going_reports_every_failure() {
    let dir = tempdir().unwrap();
    let sim = fake_sim(dir.path(), "no timing here");
    let report = dir.path().join("summary.json");

    lifebench(dir.path())
        .args(["sequential", "--timer", "sh", "--keep-going", "--config"])
        .arg(small_grid(dir.path()))
        .arg("--binary")
        .arg(&sim)
        .arg("--report")
        .arg(&report)
        .assert()
        .code(1);

    let summary: Value = serde_json::from_str(&fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(summary["completed"], 0);
    assert_eq!(summary["skipped"], 4);
    assert_eq!(summary["failures"].as_array().unwrap().len(), 4);
}

#[test]
fn missing_binary_is_fatal() {
    let dir = tempdir().unwrap();
    lifebench(dir.path())
        .args(["sequential", "--no-timer", "--binary", "./does-not-exist"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("failed to launch"));
}
