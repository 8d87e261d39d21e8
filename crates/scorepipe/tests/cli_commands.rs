#![cfg(all(unix, feature = "cli"))]

use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

fn unique_temp_dir(tag: &str) -> PathBuf {
    let dir = PathBuf::from(format!(
        "/tmp/scorepipe-cli-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

fn scorepipe() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_scorepipe"));
    command.arg("--log-level").arg("error");
    command
}

fn run_with_stdin(mut command: Command, input: &[u8]) -> Output {
    let mut child = command
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("scorepipe should start");
    child
        .stdin
        .take()
        .expect("stdin should be piped")
        .write_all(input)
        .expect("stdin should accept input");
    child.wait_with_output().expect("scorepipe should finish")
}

fn write_fake_gui(dir: &Path) -> PathBuf {
    // Records the two bootstrap lines, asks for the web port, and keeps the
    // 10-byte reply.
    let script = format!(
        "#!/bin/sh\n\
         IFS= read -r source_line\n\
         IFS= read -r init_line\n\
         printf '%s\\n%s\\n' \"$source_line\" \"$init_line\" > {dir}/bootstrap.txt\n\
         printf '14:10:getwebport,,'\n\
         head -c 10 > {dir}/reply.bin\n",
        dir = dir.display()
    );
    let path = dir.join("fake-gui.sh");
    std::fs::write(&path, script).expect("fake GUI should be writable");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
        .expect("fake GUI should be executable");
    path
}

#[test]
fn encode_writes_one_message() {
    let output = scorepipe()
        .arg("encode")
        .arg("run")
        .arg("")
        .output()
        .expect("encode should run");

    assert!(output.status.success());
    assert_eq!(output.stdout, b"9:3:run,0:,,");
}

#[test]
fn encode_without_values_is_the_empty_message() {
    let output = scorepipe()
        .arg("encode")
        .output()
        .expect("encode should run");

    assert!(output.status.success());
    assert_eq!(output.stdout, b"0:,");
}

#[test]
fn decode_prints_one_json_row_per_message() {
    let mut command = scorepipe();
    command.arg("--format").arg("json").arg("decode");
    let output = run_with_stdin(command, b"9:3:run,0:,,0:,");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        lines,
        vec![
            r#"{"index":0,"count":2,"values":["run",""]}"#,
            r#"{"index":1,"count":0,"values":[]}"#,
        ]
    );
}

#[test]
fn decode_rejects_a_bad_terminator() {
    let mut command = scorepipe();
    command.arg("--format").arg("raw").arg("decode");
    let output = run_with_stdin(command, b"6:3:abc,;");

    assert_eq!(output.status.code(), Some(60));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("decode failed after 0 message(s)"));
}

#[test]
fn version_names_the_binary() {
    let output = scorepipe()
        .arg("version")
        .output()
        .expect("version should run");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("scorepipe "));
}

#[test]
fn run_bootstraps_and_serves_a_fake_gui() {
    let dir = unique_temp_dir("run");
    let gui = write_fake_gui(&dir);
    let script = dir.join("main.tcl");

    let output = scorepipe()
        .arg("--format")
        .arg("json")
        .arg("run")
        .arg("--interpreter")
        .arg(&gui)
        .arg("--script")
        .arg(&script)
        .arg("--no-web")
        .arg("--web-port")
        .arg("4242")
        .arg("--web-dir")
        .arg(dir.join("web"))
        .arg("--players-file")
        .arg(dir.join("players.csv"))
        .arg("--startgg-file")
        .arg(dir.join("creds-startgg"))
        .stdin(Stdio::null())
        .output()
        .expect("run should start");

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let bootstrap =
        std::fs::read_to_string(dir.join("bootstrap.txt")).expect("bootstrap lines recorded");
    assert_eq!(
        bootstrap,
        format!(
            "source -encoding \"utf-8\" {}\ninitialize\n",
            script.display()
        )
    );

    let reply = std::fs::read(dir.join("reply.bin")).expect("reply recorded");
    assert_eq!(reply, b"7:4:4242,,");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\"turns\":1"));
    assert!(stdout.contains("\"end\":\"closed\""));

    let _ = std::fs::remove_dir_all(&dir);
}
