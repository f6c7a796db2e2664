//! Raw bindings to the FMI 1.0 for Co-Simulation C interface.
//!
//! FMI 1.0 units export every entry point with a `<modelIdentifier>_` prefix, so the function
//! table in [`fmi1::Fmi1CoSimBinding`] is resolved at runtime from the loaded shared library
//! rather than linked statically.
#![deny(clippy::all)]

pub mod fmi1;
