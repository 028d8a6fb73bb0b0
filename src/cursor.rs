use crate::{Connection, Result, Value};

/// Cursor strategies available to [`Connection::cursor`].
///
/// Chosen at construction via
/// [`ConnectOptions::cursor_kind`](crate::ConnectOptions::cursor_kind) or
/// per cursor via [`Connection::cursor_with`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CursorKind {
    /// Fully materialized rows, fetched forward-only by position.
    #[default]
    Buffered,
}

/// Forward-only view over the connection's current result set.
///
/// Each [`Cursor::execute`] replaces the result and restarts the position
/// at zero. Fetching before any row-returning command has run yields
/// `None`/empty batches.
pub struct Cursor<'conn> {
    conn: &'conn mut Connection,
    kind: CursorKind,
    position: usize,
}

impl<'conn> Cursor<'conn> {
    pub(crate) fn new(conn: &'conn mut Connection, kind: CursorKind) -> Self {
        Self {
            conn,
            kind,
            position: 0,
        }
    }

    pub fn kind(&self) -> CursorKind {
        self.kind
    }

    /// Runs a command through [`Connection::query`] and returns its row
    /// count.
    pub async fn execute(&mut self, sql: &str) -> Result<u64> {
        let count = self.conn.query(sql).await?;
        self.position = 0;
        Ok(count)
    }

    /// Row count of the most recent command.
    pub fn row_count(&self) -> u64 {
        self.conn.affected_rows()
    }

    /// Fetches the next row, advancing the position.
    pub fn fetch_one(&mut self) -> Option<Vec<Value>> {
        let row = self.rows()?.get(self.position).cloned()?;
        self.position += 1;
        Some(row)
    }

    /// Fetches up to `size` rows from the current position.
    pub fn fetch_many(&mut self, size: usize) -> Vec<Vec<Value>> {
        let (batch, next) = match self.rows() {
            Some(rows) => {
                let start = self.position.min(rows.len());
                let end = (start + size).min(rows.len());
                (rows[start..end].to_vec(), end)
            }
            None => return Vec::new(),
        };
        self.position = next;
        batch
    }

    /// Fetches all remaining rows.
    pub fn fetch_all(&mut self) -> Vec<Vec<Value>> {
        let remaining = self
            .rows()
            .map_or(0, |rows| rows.len().saturating_sub(self.position));
        self.fetch_many(remaining)
    }

    fn rows(&self) -> Option<&Vec<Vec<Value>>> {
        self.conn.result()?.rows.as_ref()
    }
}
