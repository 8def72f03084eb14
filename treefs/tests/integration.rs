// ---------------------------------------------------------------------------
// Integration tests for the treefs binary
//
// Each test spawns the binary, feeds a command script on stdin and checks
// what comes back on stdout.
// ---------------------------------------------------------------------------

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

// ---------------------------------------------------------------------------
// Helper
// ---------------------------------------------------------------------------

/// Run the binary with `args`, write `script` to stdin and return stdout.
fn run(args: &[&str], script: &str) -> String {
    run_bytes(args, script.as_bytes())
}

fn run_bytes(args: &[&str], script: &[u8]) -> String {
    let bin = env!("CARGO_BIN_EXE_treefs");
    let mut child = Command::new(bin)
        .args(args)
        .env_remove("TREEFS_SAVE_PATH")
        .env_remove("TREEFS_LOAD_PATH")
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("failed to spawn treefs");

    child
        .stdin
        .take()
        .expect("no stdin")
        .write_all(script)
        .expect("failed to write script");

    let output = child.wait_with_output().expect("failed to wait on treefs");
    assert!(output.status.success(), "treefs exited with {}", output.status);
    String::from_utf8(output.stdout).expect("stdout is not utf-8")
}

fn run_ephemeral(script: &str) -> String {
    run(&["--save", "no", "--load", "no"], script)
}

fn path_arg(path: &Path) -> String {
    path.to_str().expect("temp path is not utf-8").to_string()
}

// ---------------------------------------------------------------------------
// Shell behaviour
// ---------------------------------------------------------------------------

#[test]
fn scenario_transcript() {
    let out = run_ephemeral(
        "mkdir a\n\
         cd a\n\
         touch f.txt\n\
         echo hello world f.txt\n\
         cat f.txt\n\
         cd ..\n\
         mv a b\n\
         mkdir b\n\
         mv a b\n\
         ls\n\
         ls b\n\
         exit\n",
    );
    assert_eq!(out, "hello world\nNot found: b\nb\na\n");
}

#[test]
fn invalid_commands_are_reported() {
    let out = run_ephemeral("frobnicate\nmkdir\n\npwd\n");
    assert_eq!(
        out,
        "Invalid command. Try again.\nInvalid command. Try again.\n/\n"
    );
}

#[test]
fn grep_lists_matching_lines() {
    let out = run_ephemeral(
        "touch notes\n\
         echo foo notes\n\
         grep foo notes\n\
         grep bar notes\n\
         grep foo missing\n",
    );
    assert_eq!(out, "foo\nNot found: missing\n");
}

#[test]
fn copy_then_remove_original() {
    let out = run_ephemeral(
        "mkdir src\n\
         mkdir dst\n\
         cd src\n\
         touch f\n\
         echo data f\n\
         cd ..\n\
         cp src dst\n\
         rm src\n\
         ls\n\
         cd dst\n\
         cd src\n\
         cat f\n\
         pwd\n",
    );
    assert_eq!(out, "dst\ndata\n/dst/src\n");
}

#[test]
fn rm_outside_current_directory_is_refused() {
    let out = run_ephemeral("mkdir a\ncd a\nrm .\nrm ..\ncd ..\nls\n");
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("Invalid operation: "));
    assert!(lines[1].starts_with("Invalid operation: "));
    assert_eq!(lines[2], "a");
}

#[test]
fn non_utf8_input_does_not_end_the_session() {
    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join("state.txt");

    let out = run_bytes(
        &["--save", &path_arg(&state), "--load", "no"],
        b"mkdir keep\necho \xff\xfe x\nls\nexit\n",
    );
    assert_eq!(
        out,
        "Invalid command. Try again.\nkeep\nState saved successfully.\n"
    );
    let saved = std::fs::read_to_string(&state).unwrap();
    assert_eq!(saved, "Directory: / null\nDirectory: keep /\n");
}

#[test]
fn end_of_input_exits_cleanly() {
    let out = run_ephemeral("mkdir a\nls");
    assert_eq!(out, "a\n");
}

// ---------------------------------------------------------------------------
// Startup and persistence
// ---------------------------------------------------------------------------

#[test]
fn prompts_for_paths_when_not_given() {
    let out = run(&[], "no\nno\npwd\n");
    assert_eq!(
        out,
        "Enter save path (or 'no' to skip saving): \
         Enter load path (or 'no' to skip loading): /\n"
    );
}

#[test]
fn state_survives_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let state = path_arg(&dir.path().join("state.txt"));

    let out = run(
        &["--save", &state, "--load", "no"],
        "mkdir docs\n\
         cd docs\n\
         touch readme\n\
         echo first line readme\n\
         mkdir docs\n\
         exit\n",
    );
    assert_eq!(out, "State saved successfully.\n");

    let out = run(
        &["--save", "no", "--load", &state],
        "ls\n\
         cd docs\n\
         ls\n\
         cat readme\n\
         cd docs\n\
         pwd\n",
    );
    assert_eq!(
        out,
        "State loaded successfully.\ndocs\nreadme docs\nfirst line\n/docs/docs\n"
    );
}

#[test]
fn missing_state_file_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    let state = path_arg(&dir.path().join("absent.txt"));

    let out = run(&["--save", "no", "--load", &state], "ls\n");
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("Unable to load state from file: "));
    assert_eq!(lines[1], "");
}

#[test]
fn corrupt_state_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join("corrupt.txt");
    std::fs::write(&state, "Directory: a /\n").unwrap();

    let out = run(&["--save", "no", "--load", &path_arg(&state)], "ls\n");
    assert!(out.starts_with("Unable to load state from file: Corrupt state: "));
}

#[test]
fn unwritable_save_path_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let state = path_arg(&dir.path().join("no-such-dir").join("state.txt"));

    let out = run(&["--save", &state, "--load", "no"], "mkdir a\n");
    assert!(out.starts_with("Unable to save state to file: "));
}
