use anyhow::Context;
use fmi_cosim::{Binding, ModelDescriptor, ModelUnit, ScalarValue};
use itertools::Itertools;

/// Parse `name=value` pairs against the variable types declared in `descriptor`.
pub fn parse_start_values(
    descriptor: &ModelDescriptor,
    start_values: &[String],
) -> anyhow::Result<Vec<(String, ScalarValue)>> {
    start_values
        .iter()
        .map(|start_value| {
            let (name, value) = start_value
                .split_once('=')
                .ok_or_else(|| anyhow::anyhow!("Invalid start value: {start_value}"))?;

            let var = descriptor
                .variables
                .iter()
                .find(|v| v.name == name)
                .ok_or_else(|| {
                    anyhow::anyhow!(
                        "Invalid variable name: {name}. Valid variables are: {}",
                        descriptor.variables.iter().map(|v| &v.name).join(", ")
                    )
                })?;

            let scalar_type = var
                .scalar_type
                .ok_or_else(|| anyhow::anyhow!("Variable {name} has no type"))?;
            let value = ScalarValue::parse(scalar_type, value)?;
            Ok((name.to_owned(), value))
        })
        .collect()
}

/// Write the parsed start values to an instantiated unit.
pub fn apply_start_values<B: Binding>(
    unit: &mut ModelUnit<B>,
    start_values: Vec<(String, ScalarValue)>,
) -> anyhow::Result<()> {
    for (name, value) in start_values {
        log::debug!("Setting start value {name} = {value}");
        unit.set(&name, value)
            .with_context(|| format!("Setting start value for {name}"))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use fmi_cosim::mock;

    use super::*;

    #[test]
    fn test_parse() {
        let values = parse_start_values(
            &mock::descriptor(),
            &["k=-5e-1".to_owned(), "active=1".to_owned(), "label='a=b'".to_owned()],
        )
        .unwrap();
        assert_eq!(
            values,
            vec![
                ("k".to_owned(), ScalarValue::Real(-0.5)),
                ("active".to_owned(), ScalarValue::Boolean(true)),
                ("label".to_owned(), ScalarValue::String("'a=b'".to_owned())),
            ]
        );
    }

    #[test]
    fn test_parse_errors() {
        let descriptor = mock::descriptor();
        let err = parse_start_values(&descriptor, &["k".to_owned()]).unwrap_err();
        assert!(err.to_string().contains("Invalid start value"));

        let err = parse_start_values(&descriptor, &["y=1".to_owned()]).unwrap_err();
        assert!(err.to_string().contains("Valid variables are: x, k, n"));

        assert!(parse_start_values(&descriptor, &["n=1.5".to_owned()]).is_err());
    }
}
