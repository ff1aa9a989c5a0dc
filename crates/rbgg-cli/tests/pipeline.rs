//! Pipeline integration tests using synthetic images.
//!
//! Runs the binary end to end and inspects the written PNGs.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::cast_possible_truncation,
    deprecated
)]

use std::path::Path;

use assert_cmd::Command;
use image::GrayImage;
use rbgg_core::{FlattenParams, Flattener};
use rbgg_test_support::SyntheticImageBuilder;
use serde_json::Value;

fn rbgg(workdir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("rbgg").unwrap();
    cmd.current_dir(workdir).env("XDG_CONFIG_HOME", workdir);
    cmd
}

fn load(path: &Path) -> GrayImage {
    image::open(path)
        .unwrap_or_else(|e| panic!("open {}: {e}", path.display()))
        .to_luma8()
}

fn run_ok(cmd: &mut Command) -> Vec<Value> {
    let output = cmd.output().unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

#[test]
fn test_vignette_is_flattened() {
    let dir = tempfile::tempdir().unwrap();
    SyntheticImageBuilder::vignette(100, 100, 220, 120)
        .save(dir.path().join("page.png"))
        .unwrap();

    run_ok(rbgg(dir.path()).arg("page.png"));

    let flattened = load(&dir.path().join("page.rbgg.png"));
    let (min, max) = flattened
        .pixels()
        .fold((255u8, 0u8), |(lo, hi), p| (lo.min(p.0[0]), hi.max(p.0[0])));
    // Input spans 120..=220; the flattened page sits at or just under the target
    assert!(min >= 215, "darkest flattened pixel {min}");
    assert!(max <= 245, "brightest flattened pixel {max}");
}

#[test]
fn test_text_survives_flattening() {
    let dir = tempfile::tempdir().unwrap();
    SyntheticImageBuilder::text_on_gradient(200, 200)
        .save(dir.path().join("text.png"))
        .unwrap();

    run_ok(rbgg(dir.path()).arg("text.png"));

    let flattened = load(&dir.path().join("text.rbgg.png"));
    for x in [40, 100, 160] {
        // Row 2 is ink, row 0 is paper
        let ink = flattened.get_pixel(x, 2).0[0];
        let paper = flattened.get_pixel(x, 0).0[0];
        assert!(ink < 100, "ink at x={x}: {ink}");
        assert!(paper > 215, "paper at x={x}: {paper}");
    }
}

#[test]
fn test_outputs_match_core() {
    let dir = tempfile::tempdir().unwrap();
    let page = SyntheticImageBuilder::text_on_gradient(120, 90);
    page.save(dir.path().join("page.png")).unwrap();

    run_ok(rbgg(dir.path()).arg("page.png"));

    let expected = Flattener::new(FlattenParams::default())
        .unwrap()
        .flatten(&page)
        .unwrap();
    assert_eq!(load(&dir.path().join("page.gray.png")), page);
    assert_eq!(load(&dir.path().join("page.rbgg.png")), expected.flattened);
    assert_eq!(load(&dir.path().join("page.grad.png")), expected.gradient);
}

#[test]
fn test_color_input_is_converted_to_gray() {
    let dir = tempfile::tempdir().unwrap();
    SyntheticImageBuilder::rgb_uniform(64, 64, 200, 180, 160)
        .image
        .save(dir.path().join("color.png"))
        .unwrap();

    let reports = run_ok(rbgg(dir.path()).arg("color.png"));
    assert_eq!(reports.len(), 1);

    let gray = load(&dir.path().join("color.gray.png"));
    let value = gray.get_pixel(0, 0).0[0];
    assert!(gray.pixels().all(|p| p.0[0] == value));

    // Uniform input: every pixel equals its local percentile
    let flattened = load(&dir.path().join("color.rbgg.png"));
    assert!(flattened.pixels().all(|p| p.0[0] == 240));
}

#[test]
fn test_sequential_matches_parallel() {
    let dir = tempfile::tempdir().unwrap();
    let out_seq = dir.path().join("seq");
    let out_par = dir.path().join("par");
    SyntheticImageBuilder::noise(90, 70, 21)
        .save(dir.path().join("noise.png"))
        .unwrap();

    run_ok(rbgg(dir.path()).arg("--sequential").arg("-o").arg(&out_seq).arg("noise.png"));
    run_ok(rbgg(dir.path()).arg("-o").arg(&out_par).arg("noise.png"));

    assert_eq!(
        load(&out_seq.join("noise.grad.png")),
        load(&out_par.join("noise.grad.png"))
    );
    assert_eq!(
        load(&out_seq.join("noise.rbgg.png")),
        load(&out_par.join("noise.rbgg.png"))
    );
}

#[test]
fn test_recursive_and_out_dir() {
    let dir = tempfile::tempdir().unwrap();
    let scans = dir.path().join("scans");
    let nested = scans.join("week2");
    std::fs::create_dir_all(&nested).unwrap();
    SyntheticImageBuilder::vignette(80, 80, 200, 150)
        .save(scans.join("one.png"))
        .unwrap();
    SyntheticImageBuilder::vignette(80, 80, 210, 140)
        .save(nested.join("two.png"))
        .unwrap();

    let flat = run_ok(rbgg(dir.path()).arg("scans"));
    assert_eq!(flat.len(), 1);

    let out = dir.path().join("out");
    let deep = run_ok(rbgg(dir.path()).arg("-r").arg("-o").arg(&out).arg("scans"));
    assert_eq!(deep.len(), 2);
    assert!(out.join("one.rbgg.png").exists());
    assert!(out.join("two.rbgg.png").exists());
}

#[test]
fn test_out_dir_name_collision_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let scans = dir.path().join("scans");
    let nested = scans.join("sub");
    std::fs::create_dir_all(&nested).unwrap();
    SyntheticImageBuilder::uniform_luma(64, 64, 200)
        .save(scans.join("page.png"))
        .unwrap();
    SyntheticImageBuilder::uniform_luma(64, 64, 30)
        .save(nested.join("page.png"))
        .unwrap();

    let out = dir.path().join("out");
    let output = rbgg(dir.path())
        .arg("-r")
        .arg("-o")
        .arg(&out)
        .arg("scans")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    let reports: Vec<Value> = String::from_utf8(output.stdout)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(reports.len(), 1);

    // The first input keeps its outputs; the second does not overwrite them
    let winner = reports[0]["path"].as_str().unwrap();
    let expected = if winner.contains("sub") { 30 } else { 200 };
    let gradient = load(&out.join("page.grad.png"));
    assert!(gradient.pixels().all(|p| p.0[0] == expected));
    assert_eq!(std::fs::read_dir(&out).unwrap().count(), 3);
}

#[test]
fn test_rerun_skips_previous_outputs() {
    let dir = tempfile::tempdir().unwrap();
    SyntheticImageBuilder::vignette(64, 64, 220, 120)
        .save(dir.path().join("page.png"))
        .unwrap();

    let first = run_ok(rbgg(dir.path()).arg(dir.path()));
    assert_eq!(first.len(), 1);

    // page.gray.png, page.rbgg.png and page.grad.png now sit next to it
    let second = run_ok(rbgg(dir.path()).arg(dir.path()));
    assert_eq!(second.len(), 1);
    assert!(second[0]["path"].as_str().unwrap().ends_with("page.png"));
}

#[test]
fn test_target_brightness_controls_background_level() {
    let dir = tempfile::tempdir().unwrap();
    SyntheticImageBuilder::uniform_luma(60, 60, 90)
        .save(dir.path().join("flat.png"))
        .unwrap();

    run_ok(rbgg(dir.path()).args(["-t", "128", "flat.png"]));

    let flattened = load(&dir.path().join("flat.rbgg.png"));
    assert!(flattened.pixels().all(|p| p.0[0] == 128));
}
