use kte_core::error::KteError;
use kte_core::model::ExtractionResult;
use serde::Serialize;

pub fn print<T: Serialize + ?Sized>(value: &T) -> Result<(), KteError> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}

/// A single result serializes as-is; several are wrapped with their source.
pub fn results_to_string(results: &[(String, ExtractionResult)]) -> Result<String, KteError> {
    let value = match results {
        [(_, only)] => serde_json::to_value(only)?,
        many => serde_json::Value::Array(
            many.iter()
                .map(|(source, result)| -> Result<serde_json::Value, KteError> {
                    Ok(serde_json::json!({
                        "source": source,
                        "result": serde_json::to_value(result)?,
                    }))
                })
                .collect::<Result<Vec<_>, KteError>>()?,
        ),
    };
    Ok(serde_json::to_string_pretty(&value)?)
}
