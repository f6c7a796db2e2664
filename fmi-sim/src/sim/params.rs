use fmi_cosim::ModelDescriptor;

use crate::options::CoSimulationOptions;

/// Resolved simulation interval and step size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimParams {
    pub start_time: f64,
    pub stop_time: f64,
    pub step_size: f64,
    pub tolerance: Option<f64>,
}

impl SimParams {
    /// Command-line options take precedence over the model's `DefaultExperiment`, which takes
    /// precedence over the built-in defaults.
    pub fn new_from_options(
        descriptor: &ModelDescriptor,
        options: &CoSimulationOptions,
    ) -> anyhow::Result<Self> {
        let de = descriptor.default_experiment.unwrap_or_default();

        let start_time = options.start_time.or(de.start_time).unwrap_or(0.0);
        let stop_time = options.stop_time.or(de.stop_time).unwrap_or(1.0);

        if !(stop_time > start_time) {
            anyhow::bail!("`stop_time` ({stop_time}) must be after `start_time` ({start_time}).");
        }

        let step_size = options
            .step_size
            .unwrap_or_else(|| (stop_time - start_time) / 500.0);

        if !(step_size > 0.0) {
            anyhow::bail!("`step_size` must be positive.");
        }

        Ok(Self {
            start_time,
            stop_time,
            step_size,
            tolerance: de.tolerance,
        })
    }
}
