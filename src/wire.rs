use serde::{Deserialize, Deserializer};
use serde_json::Value as JsonValue;

/// Decoded `{success, status?, data?}` envelope returned by the gateway.
#[derive(Debug, Deserialize)]
pub struct ResponseEnvelope {
    pub success: bool,
    /// Human-readable failure reason; present when `success` is false.
    #[serde(default)]
    pub status: Option<String>,
    /// Outer `None`: the `data` key was absent (malformed envelope).
    /// `Some(None)`: the key was present and null (exec-style command).
    #[serde(default, deserialize_with = "present_or_null")]
    pub data: Option<Option<ResponseData>>,
}

/// Row payload of a row-returning command.
#[derive(Debug, Deserialize)]
pub struct ResponseData {
    #[serde(default)]
    pub rows: Option<Vec<Vec<JsonValue>>>,
}

fn present_or_null<'de, D>(deserializer: D) -> Result<Option<Option<ResponseData>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<ResponseData>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::ResponseEnvelope;

    fn decode(body: &str) -> ResponseEnvelope {
        serde_json::from_str(body).expect("envelope must decode")
    }

    #[test]
    fn absent_data_key_decodes_to_outer_none() {
        let envelope = decode(r#"{"success": false, "status": "syntax error"}"#);
        assert!(!envelope.success);
        assert_eq!(envelope.status.as_deref(), Some("syntax error"));
        assert!(envelope.data.is_none());
    }

    #[test]
    fn null_data_decodes_to_inner_none() {
        let envelope = decode(r#"{"success": true, "data": null}"#);
        assert!(envelope.success);
        assert!(matches!(envelope.data, Some(None)));
    }

    #[test]
    fn row_data_decodes_rows() {
        let envelope = decode(r#"{"success": true, "data": {"rows": [[1, "a"], [2, "b"]]}}"#);
        let data = envelope
            .data
            .flatten()
            .expect("data must be present");
        assert_eq!(data.rows.expect("rows must be present").len(), 2);
    }

    #[test]
    fn data_object_without_rows_decodes_without_rows() {
        let envelope = decode(r#"{"success": true, "data": {}}"#);
        let data = envelope.data.flatten().expect("data must be present");
        assert!(data.rows.is_none());
    }
}
