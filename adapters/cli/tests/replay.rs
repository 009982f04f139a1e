use std::{path::PathBuf, process::Command};

fn data(file: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("data")
        .join(file)
}

fn mipsman(args: &[&str]) -> String {
    let output = Command::new(env!("CARGO_BIN_EXE_mipsman"))
        .arg("--config")
        .arg(data("renderer.toml"))
        .arg("--scene")
        .arg(data("scene.toml"))
        .args(args)
        .output()
        .expect("failed to launch mipsman binary");

    assert!(
        output.status.success(),
        "mipsman exited with {}: {}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).expect("stdout should be utf-8")
}

#[test]
fn replays_scene_frames() {
    let stdout = mipsman(&["--frames", "2"]);

    assert!(stdout.contains("frame 0"));
    assert!(stdout.contains("frame 1"));
    assert!(stdout.contains("fill polygon (4 points)"));
    assert!(stdout.contains("= 8 floor, 17 terrain, 2 pellets, 2 entities"));
}

#[test]
fn capture_overlay_replaces_the_scene() {
    let stdout = mipsman(&["--frames", "2", "--capture-at", "1", "--capture", "2"]);

    assert!(stdout.contains("= capture overlay for client 2 (frame 0)"));
}

#[test]
fn viewport_override_moves_the_map() {
    let stdout = mipsman(&["--width", "1000", "--height", "500"]);

    assert!(stdout.contains("sprite #2 (64x64) at (500.0, 18.0)"));
}

#[test]
fn local_client_override_marks_the_other_entity() {
    let configured = mipsman(&[]);
    assert!(!configured.contains("sprite #21 (12x12)"));
    assert!(configured.contains("1 markers"));

    let overridden = mipsman(&["--local-client", "2"]);
    assert!(overridden.contains("sprite #21 (12x12)"));
    assert!(overridden.contains("2 markers"));
}
