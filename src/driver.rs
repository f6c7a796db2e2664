//! Fixed-step advancement of an initialized [`ModelUnit`].

use crate::{binding::Binding, unit::UnitState, Error, ModelUnit};

/// Receives the unit after every successful step, e.g. to read and store outputs.
pub trait StepSink<B: Binding> {
    fn record(&mut self, unit: &mut ModelUnit<B>) -> Result<(), Error>;
}

/// Records nothing
impl<B: Binding> StepSink<B> for () {
    fn record(&mut self, _unit: &mut ModelUnit<B>) -> Result<(), Error> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimStats {
    /// Number of successfully completed steps
    pub num_steps: usize,
    /// Time cursor of the unit after the last step
    pub end_time: f64,
}

/// A run that stopped early. Steps completed before the failure are not undone.
#[derive(Debug, thiserror::Error)]
#[error("Simulation stopped after {completed_steps} steps at t={time}")]
pub struct RunError {
    pub completed_steps: usize,
    /// Time cursor of the unit when the run stopped
    pub time: f64,
    #[source]
    pub source: Error,
}

/// Steps a unit across `[start, end]` with a fixed communication step size.
///
/// Step `k` starts at `start + k * step_size`. The last step is shortened so that the run lands
/// exactly on `end`, which is also the stop time the unit was initialized with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepDriver {
    start: f64,
    end: f64,
    step_size: f64,
}

impl StepDriver {
    pub fn new(start: f64, end: f64, step_size: f64) -> Result<Self, Error> {
        if !(step_size > 0.0) || !step_size.is_finite() {
            return Err(Error::InvalidStepSize(step_size));
        }
        if !(end > start) || !start.is_finite() || !end.is_finite() {
            return Err(Error::InvalidInterval { start, end });
        }
        Ok(Self {
            start,
            end,
            step_size,
        })
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    pub fn step_size(&self) -> f64 {
        self.step_size
    }

    /// Number of steps in a complete run. The small epsilon absorbs rounding in
    /// `(end - start) / step_size` so that e.g. `[0, 10]` with `0.2` is 50 steps, not 51.
    pub fn num_steps(&self) -> usize {
        ((self.end - self.start) / self.step_size - 1e-9).ceil() as usize
    }

    /// Advance `unit` from `start` to `end`, handing it to `sink` after every successful step.
    ///
    /// The unit must be freshly initialized. A failed step or sink error ends the run; there is no
    /// retry.
    pub fn run<B, S>(&self, unit: &mut ModelUnit<B>, sink: &mut S) -> Result<SimStats, RunError>
    where
        B: Binding,
        S: StepSink<B> + ?Sized,
    {
        let stopped = |unit: &ModelUnit<B>, completed_steps, source| RunError {
            completed_steps,
            time: unit.time(),
            source,
        };

        if unit.state() != UnitState::Initialized {
            let source = Error::InvalidState {
                operation: "run",
                state: unit.state(),
            };
            return Err(stopped(unit, 0, source));
        }

        let num_steps = self.num_steps();
        log::debug!(
            "Running {num_steps} steps of {} over [{}, {}]",
            self.step_size,
            self.start,
            self.end
        );

        for k in 0..num_steps {
            let t = self.start + k as f64 * self.step_size;
            let h = if k + 1 == num_steps {
                self.end - t
            } else {
                self.step_size
            };

            if let Err(source) = unit.step(t, h) {
                log::error!("Step {} from t={t} failed: {source}", k + 1);
                return Err(stopped(unit, k, source));
            }
            sink.record(unit)
                .map_err(|source| stopped(unit, k + 1, source))?;
        }

        Ok(SimStats {
            num_steps,
            end_time: unit.time(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        mock::{self, MockBinding, MockImporter},
        Fmi1Status, ScalarValue,
    };

    fn initialized(binding: &MockBinding, start: f64, end: f64) -> ModelUnit<MockBinding> {
        let mut unit = ModelUnit::new("driver");
        unit.build("model.fmu", &MockImporter::new(mock::descriptor(), binding.clone()))
            .unwrap();
        unit.instantiate().unwrap();
        unit.initialize(start, end).unwrap();
        unit
    }

    #[derive(Default)]
    struct Collect(Vec<(f64, ScalarValue)>);

    impl StepSink<MockBinding> for Collect {
        fn record(&mut self, unit: &mut ModelUnit<MockBinding>) -> Result<(), Error> {
            let x = unit.get("x")?;
            self.0.push((unit.time(), x));
            Ok(())
        }
    }

    #[test]
    fn test_validation() {
        assert!(matches!(
            StepDriver::new(0.0, 1.0, 0.0),
            Err(Error::InvalidStepSize(_))
        ));
        assert!(matches!(
            StepDriver::new(0.0, 1.0, f64::NAN),
            Err(Error::InvalidStepSize(_))
        ));
        assert!(matches!(
            StepDriver::new(1.0, 1.0, 0.1),
            Err(Error::InvalidInterval { .. })
        ));
    }

    #[test]
    fn test_num_steps() {
        assert_eq!(StepDriver::new(0.0, 10.0, 0.2).unwrap().num_steps(), 50);
        assert_eq!(StepDriver::new(0.0, 1.0, 0.3).unwrap().num_steps(), 4);
        assert_eq!(StepDriver::new(0.0, 1.0, 2.0).unwrap().num_steps(), 1);
        assert_eq!(StepDriver::new(0.0, 3.0, 0.01).unwrap().num_steps(), 300);
    }

    #[test]
    fn test_last_step_is_shortened() {
        let binding = MockBinding::new();
        let mut unit = initialized(&binding, 0.0, 1.0);
        let stats = StepDriver::new(0.0, 1.0, 0.3)
            .unwrap()
            .run(&mut unit, &mut ())
            .unwrap();

        assert_eq!(stats.num_steps, 4);
        assert_eq!(stats.end_time, 1.0);
        let steps = binding.state().steps.clone();
        assert_eq!(steps.len(), 4);
        assert_eq!(steps[0], (0.0, 0.3));
        assert!((steps[3].1 - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_sink_sees_every_step() {
        let binding = MockBinding::new();
        let mut unit = initialized(&binding, 0.0, 1.0);
        let mut sink = Collect::default();
        StepDriver::new(0.0, 1.0, 0.25)
            .unwrap()
            .run(&mut unit, &mut sink)
            .unwrap();

        let times: Vec<f64> = sink.0.iter().map(|(t, _)| *t).collect();
        assert_eq!(times, vec![0.25, 0.5, 0.75, 1.0]);
        assert_eq!(sink.0[3].1, ScalarValue::Real(1.0));
    }

    #[test]
    fn test_stops_on_first_failure() {
        let binding = MockBinding::new().fail_step(2, Fmi1Status::Discard);
        let mut unit = initialized(&binding, 0.0, 1.0);
        let err = StepDriver::new(0.0, 1.0, 0.25)
            .unwrap()
            .run(&mut unit, &mut ())
            .unwrap_err();

        assert_eq!(err.completed_steps, 1);
        assert_eq!(err.time, 0.25);
        assert!(matches!(
            err.source,
            Error::StepFailed {
                status: Fmi1Status::Discard,
                ..
            }
        ));
        // No retry
        assert_eq!(binding.state().steps.len(), 2);
    }

    #[test]
    fn test_requires_initialized() {
        let binding = MockBinding::new();
        let mut unit = initialized(&binding, 0.0, 1.0);
        unit.step(0.0, 0.5).unwrap();

        let err = StepDriver::new(0.0, 1.0, 0.25)
            .unwrap()
            .run(&mut unit, &mut ())
            .unwrap_err();
        assert_eq!(err.completed_steps, 0);
        assert!(matches!(
            err.source,
            Error::InvalidState {
                state: UnitState::Stepping,
                ..
            }
        ));
    }

    #[test]
    fn test_sink_error_stops_run() {
        struct Failing;
        impl StepSink<MockBinding> for Failing {
            fn record(&mut self, unit: &mut ModelUnit<MockBinding>) -> Result<(), Error> {
                unit.get("missing").map(|_| ())
            }
        }

        let binding = MockBinding::new();
        let mut unit = initialized(&binding, 0.0, 1.0);
        let err = StepDriver::new(0.0, 1.0, 0.5)
            .unwrap()
            .run(&mut unit, &mut Failing)
            .unwrap_err();
        assert_eq!(err.completed_steps, 1);
        assert!(matches!(err.source, Error::VariableNotFound(_)));
    }
}
