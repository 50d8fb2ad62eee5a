use std::fs;
use std::path::PathBuf;
use std::process::Command;

fn demos_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("demos")
}

#[test]
fn check_accepts_every_demo_script() {
    let bin = env!("CARGO_BIN_EXE_dialogic");
    let mut scripts = fs::read_dir(demos_root())
        .expect("demos root must exist")
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "gs"))
        .collect::<Vec<_>>();
    scripts.sort();

    assert!(!scripts.is_empty(), "expected demo scripts");

    for script in scripts {
        let output = Command::new(bin)
            .arg("check")
            .arg("--script")
            .arg(&script)
            .output()
            .expect("cli should execute");

        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(
            output.status.success(),
            "check failed for {}\nstdout:\n{}\nstderr:\n{}",
            script.display(),
            stdout,
            String::from_utf8_lossy(&output.stderr)
        );
        assert!(stdout.contains("RESULT:OK"));
        assert!(stdout.contains("EVENT:0:"));
    }
}

#[test]
fn run_plays_demo_with_scripted_choice() {
    let bin = env!("CARGO_BIN_EXE_dialogic");
    let output = Command::new(bin)
        .arg("run")
        .arg("--script")
        .arg(demos_root().join("istanbul.gs"))
        .arg("--no-log")
        .arg("--var")
        .arg("place=Istanbul")
        .arg("--var")
        .arg("emotion=groovy")
        .arg("--choice")
        .arg("1")
        .output()
        .expect("cli should execute");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "stdout:\n{}", stdout);
    assert!(stdout.contains("We are in Istanbul and feeling groovy"));
    assert!(stdout.contains("<$Happy>"));
    assert!(stdout.contains("The ferries are leaving."));
    assert!(stdout.contains("Goodbye from Istanbul."));
    assert!(!stdout.contains("Spices everywhere."));
    assert!(stdout.trim_end().ends_with("RESULT:OK"));
}

#[test]
fn run_reports_errors_with_codes() {
    let bin = env!("CARGO_BIN_EXE_dialogic");
    let script = std::env::temp_dir().join(format!(
        "dialogic-smoke-bad-{}.gs",
        std::process::id()
    ));
    fs::write(&script, "Chat a\nOpt dangling\n").expect("script should be written");

    let output = Command::new(bin)
        .arg("run")
        .arg("--script")
        .arg(&script)
        .arg("--no-log")
        .output()
        .expect("cli should execute");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout.contains("RESULT:ERROR"));
    assert!(stdout.contains("ERROR_CODE:LOWER_OPT_WITHOUT_ASK"));
    assert!(stdout.contains("ERROR_LINE:2"));
}
