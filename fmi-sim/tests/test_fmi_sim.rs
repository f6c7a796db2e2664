//! Test `fmi-sim` end to end: the binary against generated archives, and the simulation loop
//! against the in-crate mock unit.

use std::{
    fs::File,
    io::Write,
    path::{Path, PathBuf},
};

use arrow::{array::AsArray, datatypes::Float64Type};
use assert_cmd::Command;
use float_cmp::approx_eq;
use fmi_cosim::{
    mock::{self, MockBinding, MockImporter},
    Fmi1Status,
};
use fmi_sim::{options::CoSimulationOptions, sim};

const MODEL_DESCRIPTION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<fmiModelDescription fmiVersion="1.0" modelName="inc" modelIdentifier="inc" guid="{inc-guid}">
  <DefaultExperiment startTime="0" stopTime="2"/>
  <ModelVariables>
    <ScalarVariable name="counter" valueReference="0" causality="output"><Integer start="1"/></ScalarVariable>
    <ScalarVariable name="step" valueReference="1" causality="input" variability="parameter"><Real start="1"/></ScalarVariable>
  </ModelVariables>
  <Implementation><CoSimulation_StandAlone><Capabilities canHandleVariableCommunicationStepSize="true"/></CoSimulation_StandAlone></Implementation>
</fmiModelDescription>"#;

/// An archive with a model description but no binaries
fn write_fmu(dir: &Path) -> PathBuf {
    let path = dir.join("inc.fmu");
    let mut zip = zip::ZipWriter::new(File::create(&path).unwrap());
    zip.start_file(
        "modelDescription.xml",
        zip::write::SimpleFileOptions::default(),
    )
    .unwrap();
    zip.write_all(MODEL_DESCRIPTION.as_bytes()).unwrap();
    zip.finish().unwrap();
    path
}

#[test]
fn test_help() {
    Command::cargo_bin("fmi-sim")
        .unwrap()
        .arg("--help")
        .assert()
        .success();
}

#[test]
fn test_check() {
    let scratch = tempfile::tempdir().unwrap();
    let fmu = write_fmu(scratch.path());

    let output = Command::cargo_bin("fmi-sim")
        .unwrap()
        .arg(&fmu)
        .arg("check")
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Model identifier: inc"));
    assert!(stdout.contains("{inc-guid}"));
    assert!(stdout.contains("Variable Counts"));
}

#[test]
fn test_missing_fmu() {
    let scratch = tempfile::tempdir().unwrap();
    Command::cargo_bin("fmi-sim")
        .unwrap()
        .arg(scratch.path().join("missing.fmu"))
        .arg("check")
        .assert()
        .failure();
}

#[test]
fn test_cs_without_binaries_fails() {
    let scratch = tempfile::tempdir().unwrap();
    let fmu = write_fmu(scratch.path());
    let temp_dir = scratch.path().join("unpack");
    std::fs::create_dir(&temp_dir).unwrap();

    Command::cargo_bin("fmi-sim")
        .unwrap()
        .arg(&fmu)
        .args(["cs", "--temp-dir"])
        .arg(&temp_dir)
        .assert()
        .failure();

    // The extracted directory is removed even though loading failed
    assert_eq!(std::fs::read_dir(&temp_dir).unwrap().count(), 0);
}

#[test_log::test]
fn test_start_time() {
    let importer = MockImporter::new(mock::descriptor(), MockBinding::new());
    let options = CoSimulationOptions {
        start_time: Some(0.5),
        stop_time: Some(1.0),
        ..Default::default()
    };
    let (output, _) = sim::co_simulation(Path::new("model.fmu"), &importer, &options).unwrap();

    let time = output
        .column_by_name("time")
        .unwrap()
        .as_primitive::<Float64Type>();
    assert_eq!(time.value(0), 0.5);
    assert_eq!(time.value(time.len() - 1), 1.0);
}

#[test_log::test]
fn test_default_step_size() {
    let importer = MockImporter::new(mock::descriptor(), MockBinding::new());
    let (output, stats) = sim::co_simulation(
        Path::new("model.fmu"),
        &importer,
        &CoSimulationOptions::default(),
    )
    .unwrap();

    // DefaultExperiment is [0, 10], split into 500 steps
    assert_eq!(stats.num_steps, 500);
    assert_eq!(output.num_rows(), 501);
    let x = output
        .column_by_name("x")
        .unwrap()
        .as_primitive::<Float64Type>();
    assert!(approx_eq!(f64, x.value(500), 10.0, epsilon = 1e-9));
}

#[test_log::test]
fn test_start_values_and_record() {
    let importer = MockImporter::new(mock::descriptor(), MockBinding::new());
    let options = CoSimulationOptions {
        stop_time: Some(1.0),
        step_size: Some(0.1),
        initial_values: vec!["k=-5e-1".to_owned()],
        record: vec!["x".to_owned()],
        ..Default::default()
    };
    let (output, _) = sim::co_simulation(Path::new("model.fmu"), &importer, &options).unwrap();

    assert_eq!(output.num_columns(), 2);
    let x = output
        .column_by_name("x")
        .unwrap()
        .as_primitive::<Float64Type>();
    assert!(approx_eq!(f64, x.value(10), -0.5, epsilon = 1e-12));
}

#[test_log::test]
fn test_csv_output() {
    let scratch = tempfile::tempdir().unwrap();
    let importer = MockImporter::new(mock::descriptor(), MockBinding::new());
    let options = CoSimulationOptions {
        stop_time: Some(1.0),
        step_size: Some(0.5),
        ..Default::default()
    };
    let (output, _) = sim::co_simulation(Path::new("model.fmu"), &importer, &options).unwrap();

    let path = scratch.path().join("out.csv");
    fmi_sim::write_csv(&output, File::create(&path).unwrap(), ',').unwrap();
    let csv = std::fs::read_to_string(&path).unwrap();
    let lines = csv.lines().collect::<Vec<_>>();
    assert_eq!(lines[0], "time,x,n");
    assert_eq!(lines.len(), 4);
}

#[test_log::test]
fn test_initialization_failure() {
    let binding = MockBinding::new();
    binding.state_mut().init_status = Fmi1Status::Error;
    let importer = MockImporter::new(mock::descriptor(), binding.clone());

    let err = sim::co_simulation(
        Path::new("model.fmu"),
        &importer,
        &CoSimulationOptions::default(),
    )
    .unwrap_err();
    assert!(err.to_string().contains("initialize"));
    assert_eq!(binding.state().freed, 1);
    assert!(binding.state().steps.is_empty());
}
