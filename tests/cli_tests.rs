/*
MIT License with FEFF10 Attribution

Copyright (c) 2025 Ameyanagi

Based on or developed using Distribution: FEFF10.0
Copyright (c) 2020 FEFF Project, University of Washington and SLAC National Accelerator Laboratory.
All rights reserved.
*/

use clap::Parser;
use polarixs_rs::cli::{run, Cli};
use polarixs_rs::input::RixsJob;
use std::fs::{self, File};
use std::io::Write;
use tempfile::tempdir;

const JOB: &str = r#"{
    "incident": {"start": 9.0, "stop": 11.0, "step": 0.5},
    "loss": [7.0, 8.0, 9.0],
    "absorption": [
        {"energy": 10.0, "moment": {"dipole": [[1.0, 0.0], [0.0, 0.0], [0.0, 0.0]]}, "from": 1, "to": 2}
    ],
    "emission": [
        {"energy": 2.0, "moment": {"dipole": [[1.0, 0.0], [0.0, 0.0], [0.0, 0.0]]}, "from": 2, "to": 3}
    ],
    "gamma_n": 1.0,
    "gamma_f": 0.5,
    "geometry": {"kind": "isotropic", "theta": 0.0, "phi_in": 0.0}
}"#;

const XAS_JOB: &str = r#"{
    "incident": [4.0, 5.0, 6.0],
    "absorption": [
        {"energy": 5.0, "moment": {"scalar": 1.0}, "from": 1, "to": 2}
    ],
    "gamma_n": 1.0
}"#;

/// Test helper to create a temporary job file
fn create_job(content: &str) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempdir().unwrap();
    let file_path = dir.path().join("job.json");
    let mut file = File::create(&file_path).unwrap();
    writeln!(file, "{}", content).unwrap();
    (dir, file_path)
}

fn data_rows(path: &std::path::Path) -> Vec<Vec<f64>> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .filter(|line| !line.starts_with('#') && !line.trim().is_empty())
        .map(|line| {
            line.split_whitespace()
                .map(|v| v.parse::<f64>().unwrap())
                .collect()
        })
        .collect()
}

#[test]
fn test_job_file_parses() {
    let (_dir, path) = create_job(JOB);
    let job = RixsJob::from_file(&path).unwrap();
    assert_eq!(job.incident_energies().unwrap().len(), 5);
    assert_eq!(job.loss_energies().unwrap(), vec![7.0, 8.0, 9.0]);
}

#[test]
fn test_rixs_command_writes_map() {
    let (dir, path) = create_job(JOB);
    let output = dir.path().join("map.dat");

    let cli = Cli::try_parse_from([
        "polarixs-rs",
        "rixs",
        path.to_str().unwrap(),
        "--output",
        output.to_str().unwrap(),
    ])
    .unwrap();
    run(cli).unwrap();

    let rows = data_rows(&output);
    assert_eq!(rows.len(), 15);
    assert!(rows.iter().all(|row| row.len() == 3));
    assert!(rows.iter().all(|row| row[2] >= 0.0));

    // Strongest point at resonance and at the Raman loss
    let strongest = rows
        .iter()
        .max_by(|a, b| a[2].total_cmp(&b[2]))
        .unwrap();
    assert_eq!(strongest[1], 8.0);
}

#[test]
fn test_width_override() {
    let (dir, path) = create_job(JOB);
    let narrow = dir.path().join("narrow.dat");
    let wide = dir.path().join("wide.dat");

    for (file, gamma) in [(&narrow, "0.1"), (&wide, "2.0")] {
        let cli = Cli::try_parse_from([
            "polarixs-rs",
            "rixs",
            path.to_str().unwrap(),
            "-o",
            file.to_str().unwrap(),
            "--gamma-f",
            gamma,
        ])
        .unwrap();
        run(cli).unwrap();
    }

    let peak = |rows: &[Vec<f64>]| {
        rows.iter()
            .filter(|row| row[0] == 10.0 && row[1] == 8.0)
            .map(|row| row[2])
            .next()
            .unwrap()
    };
    assert!(peak(&data_rows(&narrow)) > peak(&data_rows(&wide)));
}

#[test]
fn test_xas_command() {
    let (dir, path) = create_job(XAS_JOB);
    let output = dir.path().join("xas.dat");

    let cli = Cli::try_parse_from([
        "polarixs-rs",
        "xas",
        path.to_str().unwrap(),
        "-o",
        output.to_str().unwrap(),
    ])
    .unwrap();
    run(cli).unwrap();

    let rows = data_rows(&output);
    assert_eq!(rows.len(), 3);
    assert!((rows[1][1] - 1.0 / std::f64::consts::PI).abs() < 1e-6);
}

#[test]
fn test_rixs_without_emission_fails() {
    let (dir, path) = create_job(XAS_JOB);
    let cli = Cli::try_parse_from([
        "polarixs-rs",
        "rixs",
        path.to_str().unwrap(),
        "-o",
        dir.path().join("map.dat").to_str().unwrap(),
    ])
    .unwrap();
    assert!(run(cli).is_err());
}

const Z_DIPOLE_JOB: &str = r#"
    "incident": [10.0],
    "loss": [8.0],
    "absorption": [
        {"energy": 10.0, "moment": {"dipole": [[0.0, 0.0], [0.0, 0.0], [1.0, 0.0]]}, "from": 1, "to": 2}
    ],
    "emission": [
        {"energy": 2.0, "moment": {"dipole": [[0.0, 0.0], [0.0, 0.0], [1.0, 0.0]]}, "from": 2, "to": 3}
    ],
    "gamma_n": 1.0,
    "gamma_f": 1.0"#;

/// Run a `rixs` job and return the single map value, or `None` on failure
fn single_point(geometry: &str, rotation: Option<&str>) -> Option<f64> {
    let rotation = rotation
        .map(|rows| format!(r#", "rotation": {}"#, rows))
        .unwrap_or_default();
    let content = format!(
        r#"{{{}, "geometry": {}{}}}"#,
        Z_DIPOLE_JOB, geometry, rotation
    );
    let (dir, path) = create_job(&content);
    let output = dir.path().join("map.dat");

    let cli = Cli::try_parse_from([
        "polarixs-rs",
        "rixs",
        path.to_str().unwrap(),
        "-o",
        output.to_str().unwrap(),
    ])
    .unwrap();
    run(cli).ok()?;
    Some(data_rows(&output)[0][2])
}

#[test]
fn test_job_rotation_reaches_the_calculation() {
    let oriented = r#"{"kind": "oriented_angles", "theta": 0.0, "phi_in": 0.0, "phi_out": 0.0}"#;
    let z_to_y = "[[1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]]";

    let aligned = single_point(oriented, None).unwrap();
    assert!((aligned - 0.2 / std::f64::consts::PI).abs() < 1e-6);

    let rotated = single_point(oriented, Some(z_to_y)).unwrap();
    assert!(rotated.abs() < 1e-12);

    // A rotation without an oriented geometry is refused
    let isotropic = r#"{"kind": "isotropic", "theta": 0.0, "phi_in": 0.0, "phi_out": 0.0}"#;
    assert!(single_point(isotropic, None).is_some());
    assert!(single_point(isotropic, Some(z_to_y)).is_none());
}
