#![cfg(all(unix, feature = "cli"))]

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

fn unique_temp_dir(tag: &str) -> PathBuf {
    let dir = PathBuf::from(format!(
        "/tmp/ipcplot-cli-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

fn ipcplot() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_ipcplot"));
    cmd.arg("--log-level").arg("error");
    cmd
}

fn spawn_host(dir: &Path, id: &str, series: &[&str]) -> Child {
    let mut cmd = ipcplot();
    cmd.arg("--format")
        .arg("json")
        .arg("host")
        .arg("--channel-dir")
        .arg(dir)
        .arg("--id")
        .arg(id)
        .arg("--layout")
        .arg("exact");
    for item in series {
        cmd.arg("--series").arg(item);
    }
    let child = cmd
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("host command should start");

    wait_for_path(&dir.join(format!("ipcplot-{id}.sock")), Duration::from_secs(3));
    child
}

fn wait_for_path(path: &Path, timeout: Duration) {
    let start = Instant::now();
    while !path.exists() {
        if start.elapsed() >= timeout {
            panic!("socket {} did not appear", path.display());
        }
        thread::sleep(Duration::from_millis(25));
    }
}

#[test]
fn plot_prints_host_dataset_as_csv() {
    let dir = unique_temp_dir("plot");
    let host = spawn_host(&dir, "77", &["A=1,2,3", "B=4,5,6"]);

    let output = ipcplot()
        .arg("--format")
        .arg("csv")
        .arg("plot")
        .arg("--channel-dir")
        .arg(&dir)
        .arg("--id")
        .arg("77")
        .arg("--layout")
        .arg("exact")
        .output()
        .expect("plot should run");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "A,B\n1,4\n2,5\n3,6\n");

    let host_output = host.wait_with_output().expect("host should exit");
    assert!(host_output.status.success());
    let reports = String::from_utf8_lossy(&host_output.stdout);
    assert!(reports.contains("\"cycle\":\"data\""));
    assert!(reports.contains("\"name\":\"COMPLETE\""));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn plot_writes_output_file_over_padded_layout() {
    let dir = unique_temp_dir("output");
    let mut host_cmd = ipcplot();
    host_cmd
        .arg("host")
        .arg("--channel-dir")
        .arg(&dir)
        .arg("--id")
        .arg("78")
        .arg("--series")
        .arg("volts=0.5,1.5");
    let host = host_cmd
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .expect("host command should start");
    wait_for_path(&dir.join("ipcplot-78.sock"), Duration::from_secs(3));

    let out_path = dir.join("plot.json");
    let output = ipcplot()
        .arg("--format")
        .arg("json")
        .arg("plot")
        .arg("--channel-dir")
        .arg(&dir)
        .arg("--id")
        .arg("78")
        .arg("--output")
        .arg(&out_path)
        .output()
        .expect("plot should run");

    assert!(output.status.success());
    assert!(output.stdout.is_empty());
    let written = std::fs::read_to_string(&out_path).expect("output file should exist");
    let value: serde_json::Value = serde_json::from_str(&written).expect("valid json");
    assert_eq!(value["series"][0]["label"], "volts");
    assert_eq!(value["series"][0]["values"][1], 1.5);

    let mut host = host;
    assert!(host.wait().expect("host should exit").success());
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn plot_without_host_is_a_quiet_success() {
    let dir = unique_temp_dir("nohost");

    let output = ipcplot()
        .arg("plot")
        .arg("--channel-dir")
        .arg(&dir)
        .arg("--id")
        .arg("79")
        .output()
        .expect("plot should run");

    assert!(output.status.success());
    assert!(output.stdout.is_empty());
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn status_without_host_fails() {
    let dir = unique_temp_dir("status");

    let output = ipcplot()
        .arg("status")
        .arg("--channel-dir")
        .arg(&dir)
        .arg("--id")
        .arg("80")
        .arg("--code")
        .arg("complete")
        .output()
        .expect("status should run");

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("not found"));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn version_prints_package_version() {
    let output = ipcplot().arg("version").output().expect("version should run");
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        format!("ipcplot {}", env!("CARGO_PKG_VERSION"))
    );
}
