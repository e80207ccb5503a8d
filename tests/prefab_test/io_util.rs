use std::{
    path::Path,
    process::{Command, Output},
};

use serde::Serialize;

pub static PREFAB_PATH: &str = env!("CARGO_BIN_EXE_prefab");

/// Writes `value` as JSON to `path` below `root`, creating directories on the
/// way.
pub fn write_json<T: Serialize>(root: &Path, path: &str, value: &T) {
    let full_path = root.join(path);

    if let Some(parent) = full_path.parent() {
        fs_err::create_dir_all(parent).expect("Couldn't create parent directory");
    }

    let encoded = serde_json::to_vec_pretty(value).expect("Couldn't encode JSON");
    fs_err::write(full_path, encoded).expect("Couldn't write JSON file");
}

/// Runs the prefab binary in `working_dir` and asserts that it succeeded.
pub fn run_prefab(working_dir: &Path, args: &[&str]) -> Output {
    let output = Command::new(PREFAB_PATH)
        .args(args)
        .current_dir(working_dir)
        .output()
        .expect("Couldn't start prefab");

    assert!(
        output.status.success(),
        "prefab {:?} failed\nstdout: {}\nstderr: {}",
        args,
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );

    output
}

/// Runs the prefab binary in `working_dir`, expecting it to fail.
pub fn run_prefab_failing(working_dir: &Path, args: &[&str]) -> Output {
    let output = Command::new(PREFAB_PATH)
        .args(args)
        .current_dir(working_dir)
        .output()
        .expect("Couldn't start prefab");

    assert!(
        !output.status.success(),
        "prefab {:?} was expected to fail",
        args
    );

    output
}
