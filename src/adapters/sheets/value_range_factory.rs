use google_sheets4::api::ValueRange;
use serde_json::Value;
use std::borrow::Cow;

pub trait ValueRangeFactory {
    fn from_rows<'a, T: Into<Cow<'a, str>> + Clone>(rows: &[Vec<T>]) -> Self;
}

fn wrap_value<'a, T: Into<Cow<'a, str>>>(value: T) -> Value {
    Value::String(value.into().into_owned())
}

impl ValueRangeFactory for ValueRange {
    fn from_rows<'a, T: Into<Cow<'a, str>> + Clone>(rows: &[Vec<T>]) -> Self {
        let values = rows
            .iter()
            .map(|row| row.iter().cloned().map(wrap_value).collect::<Vec<_>>())
            .collect::<Vec<_>>();

        Self {
            major_dimension: Some("ROWS".to_string()),
            range: None,
            values: Some(values),
        }
    }
}
