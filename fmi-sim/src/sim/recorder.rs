use std::sync::Arc;

use arrow::{
    array::{ArrayRef, BooleanBuilder, Float64Builder, Int32Builder, StringBuilder},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use fmi_cosim::{
    Binding, Error, ModelDescriptor, ModelUnit, ScalarType, ScalarValue, StepSink, VariableEntry,
};
use itertools::Itertools;

enum Column {
    Real(Float64Builder),
    Integer(Int32Builder),
    Boolean(BooleanBuilder),
    String(StringBuilder),
}

impl Column {
    fn new(scalar_type: ScalarType, capacity: usize) -> Self {
        match scalar_type {
            ScalarType::Real => Column::Real(Float64Builder::with_capacity(capacity)),
            ScalarType::Integer | ScalarType::Enumeration => {
                Column::Integer(Int32Builder::with_capacity(capacity))
            }
            ScalarType::Boolean => Column::Boolean(BooleanBuilder::with_capacity(capacity)),
            ScalarType::String => Column::String(StringBuilder::new()),
        }
    }

    fn data_type(&self) -> DataType {
        match self {
            Column::Real(_) => DataType::Float64,
            Column::Integer(_) => DataType::Int32,
            Column::Boolean(_) => DataType::Boolean,
            Column::String(_) => DataType::Utf8,
        }
    }

    fn append(&mut self, value: ScalarValue) {
        match (self, value) {
            (Column::Real(b), ScalarValue::Real(v)) => b.append_value(v),
            // Registry reads never exceed the native 32-bit range
            (Column::Integer(b), ScalarValue::Integer(v)) => b.append_option(i32::try_from(v).ok()),
            (Column::Boolean(b), ScalarValue::Boolean(v)) => b.append_value(v),
            (Column::String(b), ScalarValue::String(v)) => b.append_value(v),
            (column, _) => column.append_null(),
        }
    }

    fn append_null(&mut self) {
        match self {
            Column::Real(b) => b.append_null(),
            Column::Integer(b) => b.append_null(),
            Column::Boolean(b) => b.append_null(),
            Column::String(b) => b.append_null(),
        }
    }

    fn finish(&mut self) -> ArrayRef {
        match self {
            Column::Real(b) => Arc::new(b.finish()),
            Column::Integer(b) => Arc::new(b.finish()),
            Column::Boolean(b) => Arc::new(b.finish()),
            Column::String(b) => Arc::new(b.finish()),
        }
    }
}

/// Records a `time` column and one column per selected variable into a [`RecordBatch`].
pub struct Recorder {
    time: Float64Builder,
    columns: Vec<(String, Column)>,
}

impl Recorder {
    /// Record the named variables, or all outputs if `names` is empty.
    pub fn new(
        descriptor: &ModelDescriptor,
        names: &[String],
        capacity: usize,
    ) -> anyhow::Result<Self> {
        let selected: Vec<&VariableEntry> = if names.is_empty() {
            descriptor.outputs().collect()
        } else {
            names
                .iter()
                .map(|name| {
                    descriptor
                        .variables
                        .iter()
                        .find(|v| &v.name == name)
                        .ok_or_else(|| anyhow::anyhow!("Cannot record unknown variable: {name}"))
                })
                .collect::<anyhow::Result<_>>()?
        };

        let columns = selected
            .into_iter()
            .filter_map(|var| match var.scalar_type {
                Some(ty) => Some((var.name.clone(), Column::new(ty, capacity))),
                None => {
                    log::warn!("Skipping variable {} without a type", var.name);
                    None
                }
            })
            .collect::<Vec<_>>();

        log::debug!(
            "Recording time, {}",
            columns.iter().map(|(name, _)| name).join(", ")
        );

        Ok(Self {
            time: Float64Builder::with_capacity(capacity),
            columns,
        })
    }

    /// Finish recording and return the RecordBatch.
    pub fn finish(mut self) -> anyhow::Result<RecordBatch> {
        let fields = std::iter::once(Field::new("time", DataType::Float64, false))
            .chain(
                self.columns
                    .iter()
                    .map(|(name, column)| Field::new(name, column.data_type(), true)),
            )
            .collect::<Vec<_>>();

        let arrays = std::iter::once(Arc::new(self.time.finish()) as ArrayRef)
            .chain(self.columns.iter_mut().map(|(_, column)| column.finish()))
            .collect();

        Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?)
    }
}

impl<B: Binding> StepSink<B> for Recorder {
    fn record(&mut self, unit: &mut ModelUnit<B>) -> Result<(), Error> {
        log::trace!("Recording variables at time {}", unit.time());
        self.time.append_value(unit.time());
        for (name, column) in &mut self.columns {
            column.append(unit.get(name)?);
        }
        Ok(())
    }
}
