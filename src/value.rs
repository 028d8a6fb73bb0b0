use serde_json::Value as JsonValue;

/// Column value decoded from the gateway's JSON rows.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    /// Composite JSON (array or object) passed through undecoded.
    Json(JsonValue),
}

impl From<JsonValue> for Value {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => Self::Null,
            JsonValue::Bool(value) => Self::Bool(value),
            JsonValue::Number(number) => {
                if let Some(value) = number.as_i64() {
                    Self::Integer(value)
                } else if let Some(value) = number.as_f64() {
                    Self::Float(value)
                } else {
                    Self::Json(JsonValue::Number(number))
                }
            }
            JsonValue::String(value) => Self::Text(value),
            other => Self::Json(other),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::Value;

    #[test]
    fn decodes_json_scalars() {
        assert_eq!(Value::from(json!(null)), Value::Null);
        assert_eq!(Value::from(json!(true)), Value::Bool(true));
        assert_eq!(Value::from(json!(7)), Value::Integer(7));
        assert_eq!(Value::from(json!(1.25)), Value::Float(1.25));
        assert_eq!(Value::from(json!("abc")), Value::Text("abc".to_owned()));
    }

    #[test]
    fn composites_pass_through() {
        assert_eq!(
            Value::from(json!([1, 2])),
            Value::Json(json!([1, 2]))
        );
    }

    #[test]
    fn oversized_integers_fall_back_to_float() {
        let huge = u64::MAX;
        assert_eq!(Value::from(json!(huge)), Value::Float(huge as f64));
    }
}
