use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Query/Validate/Simulate an FMI 1.0 Co-Simulation FMU
#[derive(Debug, Parser)]
#[command(name = "fmi-sim", version, about)]
pub struct FmiSimOptions {
    /// The FMU model to read
    #[arg(value_name = "model.fmu")]
    pub model: PathBuf,

    #[command(subcommand)]
    pub action: Action,

    #[command(flatten)]
    pub verbose: clap_verbosity_flag::Verbosity<clap_verbosity_flag::InfoLevel>,
}

#[derive(Debug, Subcommand)]
pub enum Action {
    /// Check the XML and print a summary of the model
    Check,
    /// Perform a CoSimulation simulation
    #[command(name = "cs", disable_help_flag = true)]
    CS(CoSimulationOptions),
}

#[derive(Debug, Default, Clone, Args)]
pub struct CoSimulationOptions {
    /// Simulation start time, default is to use information from 'DefaultExperiment' as specified
    /// in the model description XML.
    #[arg(long)]
    pub start_time: Option<f64>,

    /// Simulation stop time, default is to use information from 'DefaultExperiment' as specified
    /// in the model description XML.
    #[arg(short = 's', long)]
    pub stop_time: Option<f64>,

    /// Communication step size. Default is 1/500 of the simulated interval.
    #[arg(short = 'h', long)]
    pub step_size: Option<f64>,

    /// List of initial values to set before initialization, as `name=value`
    #[arg(short = 'i', long = "initial-value", value_name = "NAME=VALUE")]
    pub initial_values: Vec<String>,

    /// Variables to record. Default is all variables with causality `output`.
    #[arg(short = 'r', long = "record", value_name = "NAME")]
    pub record: Vec<String>,

    /// Simulation result output CSV file name. Default is to print a table to standard output.
    #[arg(short = 'o', long)]
    pub output_file: Option<PathBuf>,

    /// Separator to be used in CSV output.
    #[arg(short = 'c', long, default_value_t = ',')]
    pub separator: char,

    /// Temporary dir to use for unpacking the FMU. Default is to use the system-wide directory,
    /// e.g. /tmp.
    #[arg(short = 't', long)]
    pub temp_dir: Option<PathBuf>,

    /// Enable FMU debug logging
    #[arg(long)]
    pub logging_on: bool,

    /// Advisory instantiation timeout in milliseconds
    #[arg(long)]
    pub timeout: Option<f64>,

    /// Print help
    #[arg(long, action = clap::ArgAction::Help)]
    pub help: Option<bool>,
}
