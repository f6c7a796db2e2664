//! Co-simulation of a single FMU with fixed communication steps.

pub mod params;
pub mod recorder;
pub mod start_values;

use std::path::Path;

use anyhow::Context;
use arrow::record_batch::RecordBatch;
use fmi_cosim::{Importer, InstantiateOptions, ModelUnit, SimStats, StepDriver, StepSink as _};

pub use params::SimParams;
pub use recorder::Recorder;

use crate::options::CoSimulationOptions;

/// Rows reserved up front; the builders grow past this on long runs.
const MAX_INITIAL_ROWS: usize = 4096;

/// Rows to reserve for the start point plus every step of `driver`.
fn initial_rows(driver: &StepDriver) -> usize {
    driver
        .num_steps()
        .saturating_add(1)
        .min(MAX_INITIAL_ROWS)
}

/// Simulate the FMU at `model` and return the recorded variables.
///
/// Start values are applied after instantiation and before initialization. The first row of the
/// output is recorded at the start time, then one row follows every communication step.
pub fn co_simulation<I: Importer>(
    model: &Path,
    importer: &I,
    options: &CoSimulationOptions,
) -> anyhow::Result<(RecordBatch, SimStats)> {
    let mut unit = ModelUnit::new("fmi-sim");
    unit.build(model, importer)
        .with_context(|| format!("Loading {model:?}"))?;
    let descriptor = unit
        .descriptor()
        .cloned()
        .context("Loaded unit has no model description")?;

    let params = SimParams::new_from_options(&descriptor, options)?;
    let start_values = start_values::parse_start_values(&descriptor, &options.initial_values)?;
    let driver = StepDriver::new(params.start_time, params.stop_time, params.step_size)?;
    let mut recorder = Recorder::new(&descriptor, &options.record, initial_rows(&driver))?;

    let defaults = InstantiateOptions::default();
    unit.instantiate_with(&InstantiateOptions {
        timeout: options.timeout.unwrap_or(defaults.timeout),
        logging_on: options.logging_on,
        ..defaults
    })?;
    start_values::apply_start_values(&mut unit, start_values)?;
    unit.initialize(params.start_time, params.stop_time)
        .context("initialize")?;

    recorder.record(&mut unit)?;
    let stats = driver.run(&mut unit, &mut recorder)?;
    log::info!(
        "Simulated '{}' to t={} in {} steps",
        descriptor.model_name,
        stats.end_time,
        stats.num_steps
    );

    unit.terminate().context("terminate")?;
    unit.unload()?;

    Ok((recorder.finish()?, stats))
}
