//! Runs the three binaries the way a user would.

use std::{path::Path, process::Command};

use approx::assert_relative_eq;
use linear::{LinearSystem, Matrix};
use lusolve::io::{read_solution, read_system, system_file_len, write_system};

fn bin(name: &str) -> Command {
    let path = match name {
        "lu-gen" => env!("CARGO_BIN_EXE_lu-gen"),
        "lu-seq" => env!("CARGO_BIN_EXE_lu-seq"),
        "lu-dist" => env!("CARGO_BIN_EXE_lu-dist"),
        _ => unreachable!(),
    };
    Command::new(path)
}

/// `lu-dist` on `workers` MPI processes, or `None` when no launcher is installed.
fn mpiexec(workers: usize) -> Option<Command> {
    let found = Command::new("mpiexec")
        .arg("--version")
        .output()
        .is_ok_and(|out| out.status.success());
    if !found {
        eprintln!("mpiexec not found, skipping the multi-process run");
        return None;
    }
    let mut cmd = Command::new("mpiexec");
    cmd.env("OMPI_ALLOW_RUN_AS_ROOT", "1")
        .env("OMPI_ALLOW_RUN_AS_ROOT_CONFIRM", "1")
        .env("OMPI_MCA_rmaps_base_oversubscribe", "1")
        .arg("-n")
        .arg(workers.to_string())
        .arg(env!("CARGO_BIN_EXE_lu-dist"));
    Some(cmd)
}

fn exit_code(cmd: &mut Command) -> i32 {
    cmd.output().unwrap().status.code().unwrap()
}

fn read_log(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_owned)
        .collect()
}

#[test]
fn generated_system_solves_the_same_both_ways() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("system.bin");
    let x_seq = dir.path().join("x_seq.bin");
    let x_dist = dir.path().join("x_dist.bin");
    let log_seq = dir.path().join("seq.log");
    let log_dist = dir.path().join("dist.log");

    assert_eq!(exit_code(bin("lu-gen").arg("60").arg(&input).arg("1")), 0);
    assert_eq!(std::fs::metadata(&input).unwrap().len(), system_file_len(60));

    assert_eq!(exit_code(bin("lu-seq").args([&input, &x_seq, &log_seq])), 0);
    assert_eq!(exit_code(bin("lu-dist").args([&input, &x_dist, &log_dist])), 0);

    let seq = read_solution(&x_seq).unwrap();
    let dist = read_solution(&x_dist).unwrap();
    assert_eq!(seq.len(), 60);
    assert_relative_eq!(seq.as_slice(), dist.as_slice(), epsilon = 1e-10, max_relative = 1e-10);

    let seq_log = read_log(&log_seq);
    assert_eq!(seq_log.len(), 5);
    assert_eq!(seq_log[0], format!("Input file        : {}", input.display()));
    assert_eq!(seq_log[1], format!("Output file       : {}", x_seq.display()));
    assert_eq!(seq_log[2], "Matrix order      : 60");
    assert!(seq_log[3].starts_with("Elapsed time      : ") && seq_log[3].ends_with(" seconds"));
    assert!(seq_log[4].starts_with("Timestamp         : "));

    let dist_log = read_log(&log_dist);
    assert_eq!(dist_log.len(), 6);
    let residual: f64 = dist_log[4]
        .strip_prefix("Residual L2 norm  : ")
        .unwrap()
        .parse()
        .unwrap();
    assert!(residual < 1e-8, "residual {residual:e}");
}

#[test]
fn multi_process_run_matches_sequential() {
    let Some(mut dist) = mpiexec(3) else {
        return;
    };
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("system.bin");
    let (x_seq, x_dist) = (dir.path().join("x_seq.bin"), dir.path().join("x_dist.bin"));
    let (log_seq, log_dist) = (dir.path().join("seq.log"), dir.path().join("dist.log"));

    assert_eq!(exit_code(bin("lu-gen").arg("7").arg(&input)), 0);
    assert_eq!(exit_code(bin("lu-seq").args([&input, &x_seq, &log_seq])), 0);
    assert_eq!(exit_code(dist.args([&input, &x_dist, &log_dist])), 0);

    let seq = read_solution(&x_seq).unwrap();
    let dist = read_solution(&x_dist).unwrap();
    assert_relative_eq!(seq.as_slice(), dist.as_slice(), epsilon = 1e-10, max_relative = 1e-10);
    assert_eq!(read_log(&log_dist).len(), 6);
}

#[test]
fn multi_process_error_aborts_the_group() {
    let Some(mut dist) = mpiexec(3) else {
        return;
    };
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.bin");
    let (x, log) = (dir.path().join("x.bin"), dir.path().join("log.txt"));

    let output = dist.args([&missing, &x, &log]).output().unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("missing.bin"));
    assert!(!x.exists());
    assert!(!log.exists());
}

#[test]
fn generator_is_reproducible() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("a.bin");
    let second = dir.path().join("b.bin");
    assert_eq!(exit_code(bin("lu-gen").arg("33").arg(&first)), 0);
    assert_eq!(exit_code(bin("lu-gen").arg("33").arg(&second).arg("0")), 0);
    assert_eq!(std::fs::read(&first).unwrap(), std::fs::read(&second).unwrap());
    assert_eq!(read_system(&first).unwrap().order(), 33);
}

#[test]
fn bad_arguments_exit_with_one() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.bin");

    assert_eq!(exit_code(&mut bin("lu-gen")), 1);
    assert_eq!(exit_code(bin("lu-gen").arg("0").arg(&out)), 1);
    assert_eq!(exit_code(bin("lu-gen").arg("-5").arg(&out)), 1);
    assert_eq!(exit_code(bin("lu-gen").arg("4").arg(&out).arg("2")), 1);
    assert!(!out.exists());

    assert_eq!(exit_code(bin("lu-seq").arg("only-one")), 1);
    assert_eq!(exit_code(&mut bin("lu-dist")), 1);
    assert_eq!(exit_code(bin("lu-dist").args(["a", "b", "c", "--workers", "3"])), 1);
    assert_eq!(exit_code(bin("lu-seq").arg("--help")), 0);
}

#[test]
fn missing_input_exits_with_one() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.bin");
    let (x, log) = (dir.path().join("x.bin"), dir.path().join("log.txt"));

    let output = bin("lu-dist").args([&missing, &x, &log]).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("missing.bin"));
    assert!(!x.exists());

    assert_eq!(exit_code(bin("lu-seq").args([&missing, &x, &log])), 1);
}

#[test]
fn singular_input_exits_with_one() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("singular.bin");
    let (x, log) = (dir.path().join("x.bin"), dir.path().join("log.txt"));
    let a = Matrix::from_row_slice(2, 2, &[1.0f32, 2.0, 2.0, 4.0]).unwrap();
    write_system(&input, &LinearSystem::new(a, vec![1.0, 1.0]).unwrap()).unwrap();

    let mut seq = bin("lu-seq");
    seq.args([&input, &x, &log]);
    let mut dist = bin("lu-dist");
    dist.args([&input, &x, &log]);

    for mut cmd in [seq, dist] {
        let output = cmd.output().unwrap();
        assert_eq!(output.status.code(), Some(1));
        assert!(String::from_utf8_lossy(&output.stderr).contains("singular"));
    }
    assert!(!x.exists());
}
