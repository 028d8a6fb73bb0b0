use crate::wire::ResponseEnvelope;
use crate::{CovenantError, Result, Value};

/// Materialized outcome of a single command.
///
/// Owned by the [`Connection`](crate::Connection) that produced it and
/// replaced on the next command; never shared across connections.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResultSet {
    /// For row-returning commands, the number of rows returned; unset for
    /// exec-style commands. The gateway reports no separate mutation count,
    /// so this is a returned-row count, not a server-side affected count.
    pub affected_rows: Option<u64>,
    /// Reserved; the gateway never reports an insert id.
    pub insert_id: Option<u64>,
    pub warning_count: u64,
    pub message: Option<String>,
    pub field_count: u64,
    /// Reserved; the gateway sends no column metadata.
    pub description: Option<Vec<String>>,
    /// Materialized rows in source order. `None` for exec-style commands.
    pub rows: Option<Vec<Vec<Value>>>,
    /// Reserved for multi-result support; never populated.
    pub has_next: Option<bool>,
}

impl ResultSet {
    /// Builds a result set from a validated envelope.
    ///
    /// An envelope without a `data` member is an unsupported response
    /// format. An explicit `data: null` is the normal exec path: the result
    /// stays empty and the row count unset.
    pub(crate) fn read(envelope: &ResponseEnvelope) -> Result<Self> {
        let data = envelope
            .data
            .as_ref()
            .ok_or_else(|| CovenantError::Interface("unsupported response format".to_owned()))?;

        let mut result = Self::default();
        let Some(data) = data else {
            return Ok(result);
        };

        let source = data
            .rows
            .as_ref()
            .ok_or_else(|| CovenantError::Interface("unsupported response format".to_owned()))?;
        let rows: Vec<Vec<Value>> = source
            .iter()
            .map(|line| line.iter().cloned().map(Value::from).collect())
            .collect();

        result.affected_rows = Some(rows.len() as u64);
        result.rows = Some(rows);
        Ok(result)
    }
}
