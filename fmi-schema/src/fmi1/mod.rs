//! FMI 1.0 model description for Co-Simulation FMUs.

mod model_description;
mod scalar_variable;

pub use model_description::*;
pub use scalar_variable::*;
