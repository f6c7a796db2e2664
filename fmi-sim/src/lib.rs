#![doc = include_str!("../README.md")]
#![deny(clippy::all)]

use std::{ffi::OsString, io::Write, path::Path};

use anyhow::Context;
use arrow::record_batch::RecordBatch;
use clap::Parser;
use fmi_cosim::{FmuImporter, Importer as _};
use fmi_schema::variable_counts::VariableCounts as _;

pub mod options;
pub mod sim;

use options::{Action, CoSimulationOptions, FmiSimOptions};

pub fn entrypoint() -> anyhow::Result<()> {
    entrypoint_from(std::env::args_os())
}

pub fn entrypoint_from<I, T>(args: I) -> anyhow::Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let options = FmiSimOptions::parse_from(args);

    let _logger = flexi_logger::Logger::try_with_env_or_str(
        options.verbose.log_level_filter().as_str(),
    )?
    .set_palette("b1;3;2;4;6".to_string())
    .start()?;

    log::debug!(
        "{} {} ({})",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        fmi_cosim::built_info::TARGET
    );

    run(options)
}

/// Execute the parsed command line.
pub fn run(options: FmiSimOptions) -> anyhow::Result<()> {
    match options.action {
        Action::Check => {
            println!("{}", check(&options.model)?);
        }
        Action::CS(cs) => {
            let importer = match &cs.temp_dir {
                Some(dir) => FmuImporter::with_temp_dir(dir),
                None => FmuImporter::new(),
            };
            let (output, _stats) = sim::co_simulation(&options.model, &importer, &cs)?;
            write_output(&output, &cs)?;
        }
    }
    Ok(())
}

/// Summarize the model description of the FMU at `model`.
pub fn check(model: &Path) -> anyhow::Result<String> {
    let importer = FmuImporter::new();
    let dir = importer
        .extract(model)
        .with_context(|| format!("Opening {model:?}"))?;
    let md = importer.read_model_description(dir.path())?;

    Ok(format!(
        "Model name:       {}\nModel identifier: {}\nGUID:             {}\nFMI version:      {}\n{}",
        md.model_name,
        md.model_identifier,
        md.guid,
        md.fmi_version,
        md.model_counts()
    ))
}

/// Write CSV to `writer` with the given single-byte separator.
pub fn write_csv<W: Write>(batch: &RecordBatch, writer: W, separator: char) -> anyhow::Result<()> {
    if !separator.is_ascii() {
        anyhow::bail!("Separator must be an ASCII character, got {separator:?}");
    }
    let mut writer = arrow::csv::WriterBuilder::new()
        .with_header(true)
        .with_delimiter(separator as u8)
        .build(writer);
    writer.write(batch)?;
    Ok(())
}

fn write_output(batch: &RecordBatch, options: &CoSimulationOptions) -> anyhow::Result<()> {
    match &options.output_file {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("Creating output file {path:?}"))?;
            write_csv(batch, file, options.separator)?;
            log::info!("Wrote {} rows to {path:?}", batch.num_rows());
        }
        None => {
            println!(
                "Outputs:\n{}",
                arrow::util::pretty::pretty_format_batches(std::slice::from_ref(batch))?
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow::array::{Float64Array, Int32Array};

    use super::*;

    #[test]
    fn test_write_csv() {
        let batch = RecordBatch::try_from_iter([
            (
                "time",
                Arc::new(Float64Array::from(vec![0.0, 0.5])) as arrow::array::ArrayRef,
            ),
            ("n", Arc::new(Int32Array::from(vec![0, 1])) as _),
        ])
        .unwrap();

        let mut out = Vec::new();
        write_csv(&batch, &mut out, ';').unwrap();
        let out = String::from_utf8(out).unwrap();
        let lines = out.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "time;n");
        assert!(lines[2].starts_with("0.5;"));

        assert!(write_csv(&batch, Vec::new(), 'é').is_err());
    }
}
