//! CLI integration tests for `texpack process`, `classify`, `list` and `upscale`.
//!
//! Runs the built binary against images in temporary directories and checks
//! exit codes, printed summaries and JSON reports.

use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

use image::{Rgba, RgbaImage};

/// Run texpack in `dir` with the given arguments and return (stdout, stderr, exit code).
fn run_texpack(dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_texpack"))
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .env("XDG_CONFIG_HOME", dir.join("xdg"))
        .args(args)
        .output()
        .expect("Failed to execute texpack");
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.code().unwrap_or(-1))
}

fn mask_image() -> RgbaImage {
    RgbaImage::from_fn(8, 8, |x, _| {
        if x < 4 {
            Rgba([0, 0, 0, 255])
        } else {
            Rgba([255, 255, 255, 255])
        }
    })
}

/// Directory with `up/` holding one mask and one solid-color upscale, and
/// `orig/` holding the solid-color original.
fn setup() -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("up")).unwrap();
    fs::create_dir_all(temp.path().join("orig")).unwrap();
    mask_image().save(temp.path().join("up/mask.png")).unwrap();
    RgbaImage::from_pixel(8, 8, Rgba([10, 20, 30, 255]))
        .save(temp.path().join("up/flat.png"))
        .unwrap();
    RgbaImage::from_pixel(2, 2, Rgba([40, 50, 60, 255]))
        .save(temp.path().join("orig/flat.png"))
        .unwrap();
    temp
}

// ============================================================================
// process
// ============================================================================

#[test]
fn test_process_directory() {
    let temp = setup();
    let (stdout, stderr, code) =
        run_texpack(temp.path(), &["process", "up", "--out", "up", "--originals", "orig"]);

    assert_eq!(code, 0, "stderr: {}", stderr);
    assert!(stdout.contains("Classified 2 images: 1 masks, 1 solid color, 0 unclassified"));
    assert!(stdout.contains("Repaired 1 masks and 1 solid color images"));

    let mask = image::open(temp.path().join("up/masks/mask.png")).unwrap().to_rgba8();
    assert_eq!(mask.get_pixel(0, 0).0[3], 0);
    let flat = image::open(temp.path().join("up/solid_color/flat.png")).unwrap().to_rgba8();
    assert!(flat.pixels().all(|p| p.0 == [40, 50, 60, 255]));
}

#[test]
fn test_process_defaults_output_to_image_directory() {
    let temp = setup();
    let (_, stderr, code) =
        run_texpack(temp.path(), &["process", "up/mask.png", "--originals", "orig"]);

    assert_eq!(code, 0, "stderr: {}", stderr);
    assert!(temp.path().join("up/masks/mask.png").exists());
}

#[test]
fn test_process_json_report() {
    let temp = setup();
    let (stdout, _, code) = run_texpack(
        temp.path(),
        &["process", "up", "--out", "up", "--originals", "orig", "--json", "-j", "2"],
    );

    assert_eq!(code, 0);
    let json: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON");
    let items = json["items"].as_array().expect("items array");
    assert_eq!(items.len(), 4);
    assert!(items.iter().all(|i| i["status"] == "done"));
    assert!(items.iter().any(|i| i["classification"] == "mask"));
    assert_eq!(json["cancelled"], false);
}

#[test]
fn test_process_strict_fails_on_skipped_item() {
    let temp = setup();
    // No originals: the solid-color repair is skipped
    let (stdout, _, code) = run_texpack(temp.path(), &["process", "up", "--out", "up"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Skipped 1 items:"));

    let temp = setup();
    let (_, _, code) = run_texpack(temp.path(), &["process", "up", "--out", "up", "--strict"]);
    assert_eq!(code, 1);
}

#[test]
fn test_process_from_list_file() {
    let temp = setup();
    fs::write(temp.path().join("images.txt"), "up/mask.png\n").unwrap();

    let (stdout, _, code) =
        run_texpack(temp.path(), &["process", "--list", "images.txt", "--out", "up"]);

    assert_eq!(code, 0);
    assert!(stdout.contains("Classified 1 images"));
}

#[test]
fn test_process_no_images_is_invalid_args() {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("empty")).unwrap();

    let (_, stderr, code) = run_texpack(temp.path(), &["process", "empty"]);
    assert_eq!(code, 2);
    assert!(stderr.contains("No images"));
}

#[test]
fn test_process_uses_config_file() {
    let temp = setup();
    fs::write(
        temp.path().join("texpack.toml"),
        "[output]\ndir = \"up\"\nmasks = \"alpha\"\n\n[originals]\ndir = \"orig\"\n",
    )
    .unwrap();

    let (_, stderr, code) = run_texpack(temp.path(), &["process", "up", "--strict"]);
    assert_eq!(code, 0, "stderr: {}", stderr);
    assert!(temp.path().join("up/alpha/mask.png").exists());
}

#[test]
fn test_invalid_config_is_rejected() {
    let temp = setup();
    fs::write(temp.path().join("bad.toml"), "[output]\nmasks = \"a/b\"\n").unwrap();

    let (_, stderr, code) = run_texpack(temp.path(), &["process", "up", "--config", "bad.toml"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("output.masks"));
}

#[test]
fn test_unwritable_output_directory_is_fatal() {
    let temp = setup();
    fs::write(temp.path().join("blocker"), b"").unwrap();

    let (_, stderr, code) = run_texpack(temp.path(), &["process", "up", "--out", "blocker"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("blocker"));
}

#[cfg(unix)]
#[test]
fn test_interrupt_cancels_remaining_images() {
    use std::process::Stdio;
    use std::time::Duration;

    let temp = TempDir::new().unwrap();
    let up = temp.path().join("up");
    fs::create_dir_all(&up).unwrap();
    let big_mask = RgbaImage::from_fn(256, 256, |x, y| {
        if (x / 3 + y / 5) % 2 == 0 {
            Rgba([0, 0, 0, 255])
        } else {
            Rgba([255, 255, 255, 255])
        }
    });
    for i in 0..120 {
        big_mask.save(up.join(format!("m{:03}.png", i))).unwrap();
    }

    let child = Command::new(env!("CARGO_BIN_EXE_texpack"))
        .current_dir(temp.path())
        .env_remove("RUST_LOG")
        .env("XDG_CONFIG_HOME", temp.path().join("xdg"))
        .args(["process", "up", "--out", "up", "-j", "1"])
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to start texpack");

    std::thread::sleep(Duration::from_millis(500));
    let killed = Command::new("kill").args(["-INT", &child.id().to_string()]).status().unwrap();
    assert!(killed.success());

    let output = child.wait_with_output().unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(output.status.code(), Some(0), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(stdout.contains("Run was cancelled"));
    assert!(stdout.contains("cancelled before processing"));

    let leftovers: Vec<_> = fs::read_dir(up.join("masks"))
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| e.file_name().to_string_lossy().starts_with(".texpack-"))
        .collect();
    assert!(leftovers.is_empty());
}

// ============================================================================
// classify
// ============================================================================

#[test]
fn test_classify_only_moves_files() {
    let temp = setup();
    let (stdout, _, code) = run_texpack(temp.path(), &["classify", "up", "--out", "up"]);

    assert_eq!(code, 0);
    assert!(stdout.contains("Repaired 0 masks and 0 solid color images"));
    let mask = image::open(temp.path().join("up/masks/mask.png")).unwrap().to_rgba8();
    assert_eq!(mask.get_pixel(0, 0).0[3], 255, "classify must not repair");
    assert!(temp.path().join("up/solid_color/flat.png").exists());
}

// ============================================================================
// list and upscale
// ============================================================================

#[test]
fn test_list_writes_file() {
    let temp = setup();
    fs::write(temp.path().join("up/readme.txt"), "x").unwrap();

    let (stdout, _, code) = run_texpack(temp.path(), &["list", "up", "--out", "files.txt"]);

    assert_eq!(code, 0);
    assert!(stdout.contains("Listed 2 images"));
    let list = fs::read_to_string(temp.path().join("files.txt")).unwrap();
    assert_eq!(list.lines().count(), 2);
    assert!(list.lines().all(|l| l.ends_with(".png")));
}

#[test]
fn test_list_extension_filter_to_stdout() {
    let temp = setup();
    fs::write(temp.path().join("up/extra.tga"), "x").unwrap();

    let (stdout, _, code) = run_texpack(temp.path(), &["list", "up", "--ext", "tga"]);

    assert_eq!(code, 0);
    assert_eq!(stdout.lines().count(), 1);
    assert!(stdout.contains("extra.tga"));
}

#[test]
fn test_list_missing_directory() {
    let temp = TempDir::new().unwrap();
    let (_, _, code) = run_texpack(temp.path(), &["list", "nope"]);
    assert_eq!(code, 1);
}

#[test]
fn test_upscale_without_program_is_invalid_args() {
    let temp = setup();
    fs::write(temp.path().join("files.txt"), "up/mask.png").unwrap();

    let (_, stderr, code) =
        run_texpack(temp.path(), &["upscale", "--list", "files.txt", "--out", "big"]);
    assert_eq!(code, 2);
    assert!(stderr.contains("No upscaler configured"));
}

#[cfg(unix)]
#[test]
fn test_upscale_runs_configured_program() {
    let temp = setup();
    fs::write(temp.path().join("files.txt"), "up/mask.png").unwrap();
    fs::write(
        temp.path().join("texpack.toml"),
        "[upscaler]\nprogram = \"cp\"\nargs = [\"{list}\", \"{output}/copied.txt\"]\n",
    )
    .unwrap();

    let (_, stderr, code) =
        run_texpack(temp.path(), &["upscale", "--list", "files.txt", "--out", "big"]);
    assert_eq!(code, 0, "stderr: {}", stderr);
    assert_eq!(fs::read_to_string(temp.path().join("big/copied.txt")).unwrap(), "up/mask.png");
}

#[test]
fn test_help_lists_commands() {
    let temp = TempDir::new().unwrap();
    let (stdout, _, code) = run_texpack(temp.path(), &["--help"]);
    assert_eq!(code, 0);
    for command in ["process", "classify", "list", "upscale"] {
        assert!(stdout.contains(command));
    }
}
