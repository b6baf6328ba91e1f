use assert_cmd::Command;
use ndarray::{ArrayD, IxDyn};
use ndarray_npy::NpzWriter;
use predicates::prelude::*;
use std::fs::{self, File};
use std::path::Path;
use tempfile::TempDir;

fn write_npz(path: &Path, label_values: &[f32]) {
    let mut npz = NpzWriter::new(File::create(path).unwrap());
    let image = ArrayD::<f32>::zeros(IxDyn(&[2, 2]));
    let label =
        ArrayD::from_shape_vec(IxDyn(&[label_values.len()]), label_values.to_vec()).unwrap();
    npz.add_array("image.npy", &image).unwrap();
    npz.add_array("label.npy", &label).unwrap();
    npz.finish().unwrap();
}

fn slicepick() -> Command {
    Command::cargo_bin("slicepick").unwrap()
}

#[test]
fn no_arguments_shows_help() {
    slicepick()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn full_run_copies_samples_and_writes_manifest() {
    let input_dir = TempDir::new().unwrap();
    let work_dir = TempDir::new().unwrap();

    write_npz(&input_dir.path().join("case0001.npz"), &[0.0, 3.0]);
    write_npz(&input_dir.path().join("case0002.npz"), &[0.0, 6.0]);
    write_npz(&input_dir.path().join("case0003.npz"), &[6.0, 8.0]);

    let output_dir = work_dir.path().join("selected");
    let manifest = work_dir.path().join("selected_samples.csv");

    slicepick()
        .arg(input_dir.path())
        .arg("--output")
        .arg(&output_dir)
        .arg("--manifest")
        .arg(&manifest)
        .arg("--samples")
        .arg("10")
        .arg("--seed")
        .arg("7")
        .arg("--output-format")
        .arg("plain")
        .assert()
        .success();

    assert!(output_dir.join("case0001.npz").exists());
    assert!(output_dir.join("case0002.npz").exists());
    assert!(output_dir.join("case0003.npz").exists());

    let manifest_content = fs::read_to_string(&manifest).unwrap();
    assert!(manifest_content.starts_with("original_name,file_path,slice_index"));
    assert_eq!(manifest_content.lines().count(), 4);

    assert!(work_dir.path().join("selection_report.json").exists());
}

#[test]
fn corrupt_archive_is_skipped_with_warning() {
    let input_dir = TempDir::new().unwrap();
    let work_dir = TempDir::new().unwrap();

    write_npz(&input_dir.path().join("good.npz"), &[1.0]);
    fs::write(input_dir.path().join("broken.npz"), b"not a zip").unwrap();

    slicepick()
        .arg(input_dir.path())
        .arg("--output")
        .arg(work_dir.path().join("selected"))
        .arg("--manifest")
        .arg(work_dir.path().join("selected_samples.csv"))
        .arg("--output-format")
        .arg("plain")
        .assert()
        .success()
        .stdout(predicate::str::contains("broken.npz"));

    assert!(work_dir.path().join("selected").join("good.npz").exists());
    assert!(!work_dir.path().join("selected").join("broken.npz").exists());
}

#[test]
fn missing_input_directory_exits_with_code_3() {
    slicepick()
        .arg("/definitely/not/a/real/directory")
        .arg("--output-format")
        .arg("plain")
        .assert()
        .code(3);
}

#[test]
fn dry_run_touches_nothing() {
    let input_dir = TempDir::new().unwrap();
    let work_dir = TempDir::new().unwrap();

    write_npz(&input_dir.path().join("case0001.npz"), &[3.0]);

    let output_dir = work_dir.path().join("selected");

    slicepick()
        .arg(input_dir.path())
        .arg("--output")
        .arg(&output_dir)
        .arg("--dry-run")
        .arg("--output-format")
        .arg("plain")
        .assert()
        .success()
        .stdout(predicate::str::contains("DRY RUN"));

    assert!(!output_dir.exists());
}

#[test]
fn generate_config_writes_sample_file() {
    let work_dir = TempDir::new().unwrap();
    let config_path = work_dir.path().join("slicepick.toml");

    slicepick()
        .arg("--generate-config")
        .arg("--config")
        .arg(&config_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Generated sample configuration"));

    let content = fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("[sampling]"));
    assert!(content.contains("num_samples"));
}

#[test]
fn custom_sample_count_limits_selection() {
    let input_dir = TempDir::new().unwrap();
    let work_dir = TempDir::new().unwrap();

    for i in 0..6 {
        write_npz(
            &input_dir.path().join(format!("case{:04}.npz", i)),
            &[6.0],
        );
    }

    let manifest = work_dir.path().join("selected_samples.csv");

    slicepick()
        .arg(input_dir.path())
        .arg("--output")
        .arg(work_dir.path().join("selected"))
        .arg("--manifest")
        .arg(&manifest)
        .arg("--samples")
        .arg("2")
        .arg("--seed")
        .arg("42")
        .arg("--quiet")
        .assert()
        .success();

    let manifest_content = fs::read_to_string(&manifest).unwrap();
    // Header plus exactly two selected records
    assert_eq!(manifest_content.lines().count(), 3);
}
