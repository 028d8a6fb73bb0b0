use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::{Identity, StatusCode};

use crate::config::{self, IniFile};
use crate::cursor::{Cursor, CursorKind};
use crate::options::{
    ConnectOptions, TextEncoding, DEFAULT_CONFIG_FILE, DEFAULT_CONFIG_GROUP,
    DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_HOST, DEFAULT_PORT,
};
use crate::result::ResultSet;
use crate::wire::ResponseEnvelope;
use crate::{CovenantError, Result};

/// Synthesized command sent to validate a fresh connection.
const PROBE_COMMAND: &str = "select 1;";

/// A connection to a CovenantSQL HTTPS gateway.
///
/// Commands run strictly in issuance order: every command method takes
/// `&mut self` and holds the connection's single response/result slot, so a
/// connection cannot be shared between concurrent callers. Use one
/// connection per caller.
///
/// The transport handle is acquired by [`Connection::open`] and released by
/// [`Connection::close`]; there is no release on drop, so every exit path
/// must reach `close()`.
pub struct Connection {
    http: Option<reqwest::Client>,
    query_url: String,
    exec_url: String,
    dsn: Option<String>,
    host: String,
    port: u16,
    key: Option<PathBuf>,
    https_cert: Option<PathBuf>,
    database: String,
    encoding: TextEncoding,
    cursor_kind: CursorKind,
    connect_timeout: u64,
    read_timeout: Option<u64>,
    write_timeout: Option<u64>,
    autocommit: bool,
    accept_invalid_certs: bool,
    closed: bool,
    response: Option<RawResponse>,
    result: Option<ResultSet>,
    affected_rows: u64,
}

/// Transport status plus decoded envelope of the most recent command.
struct RawResponse {
    status: StatusCode,
    envelope: ResponseEnvelope,
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("key", &self.key.as_ref().map(|_| "<redacted>"))
            .field("closed", &self.closed)
            .finish()
    }
}

impl Connection {
    /// Establishes a connection from the given options.
    ///
    /// Options left unset are filled from the config file's group when one
    /// is named, then validated. Unless `defer_connect` is set, the
    /// connection is opened immediately: the transport is built and a probe
    /// command is dispatched and validated.
    ///
    /// Fails with [`CovenantError::InvalidArgument`] before any network
    /// contact when a timeout is out of bounds.
    pub async fn connect(mut options: ConnectOptions) -> Result<Self> {
        if options.config_group.is_some() && options.config_file.is_none() {
            options.config_file = Some(PathBuf::from(DEFAULT_CONFIG_FILE));
        }
        if let Some(path) = options.config_file.clone() {
            let path = config::expand_user(&path);
            let group = options
                .config_group
                .clone()
                .unwrap_or_else(|| DEFAULT_CONFIG_GROUP.to_owned());
            // a missing or unreadable file leaves every option at its fallback
            let source = IniFile::open(&path).unwrap_or_else(|err| {
                tracing::debug!(path = %path.display(), %err, "config file not read");
                IniFile::default()
            });
            config::apply(&source, &group, &mut options)?;
        }
        options.validate()?;

        let host = options.host.unwrap_or_else(|| DEFAULT_HOST.to_owned());
        let port = options.port.unwrap_or(DEFAULT_PORT);
        let base = options
            .base_url
            .unwrap_or_else(|| format!("https://{host}:{port}"));

        let mut conn = Self {
            http: None,
            query_url: format!("{base}/v1/query"),
            exec_url: format!("{base}/v1/exec"),
            dsn: options.dsn,
            host,
            port,
            key: options.key,
            https_cert: options.https_cert,
            database: options.database.unwrap_or_default(),
            encoding: options.encoding,
            cursor_kind: options.cursor_kind,
            connect_timeout: options
                .connect_timeout
                .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS),
            read_timeout: options.read_timeout,
            write_timeout: options.write_timeout,
            autocommit: options.autocommit,
            accept_invalid_certs: options.accept_invalid_certs.unwrap_or(true),
            closed: false,
            response: None,
            result: None,
            affected_rows: 0,
        };

        if !options.defer_connect {
            conn.open().await?;
        }
        Ok(conn)
    }

    /// Acquires the transport handle and validates the connection with a
    /// probe command. Fails like any command when the probe fails.
    ///
    /// A closed connection cannot be reopened.
    pub async fn open(&mut self) -> Result<()> {
        if self.closed {
            return Err(CovenantError::State(
                "cannot reopen a closed connection".to_owned(),
            ));
        }
        tracing::debug!(host = %self.host, port = self.port, "opening connection");
        self.http = Some(self.build_transport()?);
        self.execute_command(PROBE_COMMAND).await?;
        self.read_ok_packet()?;
        Ok(())
    }

    /// Releases the transport handle and marks the connection closed.
    ///
    /// Closing an already-closed connection is an error, to surface caller
    /// lifecycle bugs early.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Err(CovenantError::State("already closed".to_owned()));
        }
        tracing::debug!(host = %self.host, port = self.port, "closing connection");
        self.http = None;
        self.closed = true;
        Ok(())
    }

    /// Issues the literal `COMMIT` command. The gateway is the sole
    /// authority on transaction state; nothing is tracked locally.
    pub async fn commit(&mut self) -> Result<()> {
        self.execute_command("COMMIT").await?;
        self.read_ok_packet()
    }

    /// Issues the literal `ROLLBACK` command.
    pub async fn rollback(&mut self) -> Result<()> {
        self.execute_command("ROLLBACK").await?;
        self.read_ok_packet()
    }

    /// Returns a cursor of the connection's configured default kind.
    pub fn cursor(&mut self) -> Cursor<'_> {
        let kind = self.cursor_kind;
        Cursor::new(self, kind)
    }

    /// Returns a cursor of an explicitly chosen kind.
    pub fn cursor_with(&mut self, kind: CursorKind) -> Cursor<'_> {
        Cursor::new(self, kind)
    }

    /// Executes a SQL command and returns its row count.
    ///
    /// For row-returning commands this is the number of rows returned; for
    /// exec-style commands the gateway reports no count and zero is
    /// returned. The materialized result stays available through
    /// [`Connection::result`] until the next command.
    pub async fn query(&mut self, sql: &str) -> Result<u64> {
        let sql = self.encoding.encode(sql);
        self.execute_command(sql).await?;
        self.affected_rows = self.read_query_result()?;
        Ok(self.affected_rows)
    }

    /// Dispatches one command and stores the decoded envelope.
    async fn execute_command(&mut self, sql: &str) -> Result<()> {
        if self.closed {
            return Err(CovenantError::Interface("connection closed".to_owned()));
        }
        let http = self
            .http
            .as_ref()
            .ok_or_else(|| CovenantError::Interface("connection not open".to_owned()))?;

        // drop the previous command's envelope before dispatching
        self.response = None;

        let url = if is_select(sql) {
            &self.query_url
        } else {
            &self.exec_url
        };
        tracing::debug!(endpoint = %url, bytes = sql.len(), "dispatching command");

        let response = http
            .post(url)
            .form(&[("database", self.database.as_str()), ("query", sql)])
            .send()
            .await
            .map_err(CovenantError::Transport)?;

        let status = response.status();
        let body = response.text().await.map_err(CovenantError::Transport)?;
        let envelope = serde_json::from_str::<ResponseEnvelope>(&body).map_err(|_| {
            CovenantError::Interface(format!(
                "proxy returned invalid data: {}",
                reason(status)
            ))
        })?;

        self.response = Some(RawResponse { status, envelope });
        Ok(())
    }

    /// Two-part ok-packet check: the envelope's `success` flag first, then
    /// the transport status. Both must hold.
    fn read_ok_packet(&self) -> Result<()> {
        let response = self
            .response
            .as_ref()
            .ok_or_else(|| CovenantError::Interface("no response to read".to_owned()))?;

        if !response.envelope.success {
            return Err(CovenantError::Operational {
                context: "command failed".to_owned(),
                detail: response.envelope.status.clone().unwrap_or_default(),
            });
        }
        if !response.status.is_success() {
            return Err(CovenantError::Operational {
                context: "proxy returned non-ok status".to_owned(),
                detail: reason(response.status),
            });
        }
        Ok(())
    }

    /// Validates the current envelope, materializes its rows, and returns
    /// the row count.
    fn read_query_result(&mut self) -> Result<u64> {
        self.result = None;
        self.read_ok_packet()?;

        let envelope = &self
            .response
            .as_ref()
            .ok_or_else(|| CovenantError::Interface("no response to read".to_owned()))?
            .envelope;
        let result = ResultSet::read(envelope)?;
        let affected = result.affected_rows.unwrap_or(0);
        self.result = Some(result);
        Ok(affected)
    }

    fn build_transport(&self) -> Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(self.connect_timeout))
            .danger_accept_invalid_certs(self.accept_invalid_certs);
        if let Some(seconds) = self.read_timeout {
            builder = builder.read_timeout(Duration::from_secs(seconds));
        }
        // reqwest has no separate write timeout; this caps the whole request
        if let Some(seconds) = self.write_timeout {
            builder = builder.timeout(Duration::from_secs(seconds));
        }
        if let Some(identity) = self.load_identity()? {
            builder = builder.identity(identity);
        }
        builder.build().map_err(CovenantError::Transport)
    }

    /// Builds the mutual-TLS identity from the configured key (and
    /// certificate, when one is given separately).
    fn load_identity(&self) -> Result<Option<Identity>> {
        let Some(key) = &self.key else {
            return Ok(None);
        };
        let mut pem = std::fs::read(key).map_err(|err| {
            CovenantError::Interface(format!("cannot read key file {}: {err}", key.display()))
        })?;
        if let Some(cert) = &self.https_cert {
            let mut chain = std::fs::read(cert).map_err(|err| {
                CovenantError::Interface(format!(
                    "cannot read certificate file {}: {err}",
                    cert.display()
                ))
            })?;
            chain.append(&mut pem);
            pem = chain;
        }
        Identity::from_pem(&pem)
            .map(Some)
            .map_err(CovenantError::Transport)
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Recorded autocommit mode; enforcement is delegated to the gateway.
    pub fn autocommit(&self) -> bool {
        self.autocommit
    }

    /// Row count of the most recent command.
    pub fn affected_rows(&self) -> u64 {
        self.affected_rows
    }

    /// Materialized result of the most recent row-returning command, if any.
    pub fn result(&self) -> Option<&ResultSet> {
        self.result.as_ref()
    }

    /// Data-source name, kept opaque.
    pub fn dsn(&self) -> Option<&str> {
        self.dsn.as_deref()
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn database(&self) -> &str {
        &self.database
    }
}

/// Case-insensitive trimmed-prefix check routing commands between the query
/// and exec endpoints.
fn is_select(sql: &str) -> bool {
    let trimmed = sql.trim_start_matches(|c: char| c.is_ascii_whitespace());
    trimmed
        .as_bytes()
        .get(..6)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(b"select"))
}

fn reason(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map(str::to_owned)
        .unwrap_or_else(|| status.to_string())
}

#[cfg(test)]
mod tests {
    use super::is_select;

    #[test]
    fn select_prefix_routes_to_query_endpoint() {
        assert!(is_select("select 1;"));
        assert!(is_select("  SELECT 1"));
        assert!(is_select("\t\nSeLeCt * from t"));
        // routing is a plain prefix match, not a keyword match
        assert!(is_select("selecting()"));
    }

    #[test]
    fn other_commands_route_to_exec_endpoint() {
        assert!(!is_select("insert into t values (1)"));
        assert!(!is_select("COMMIT"));
        assert!(!is_select(" update t set a = 1"));
        assert!(!is_select("sel"));
        assert!(!is_select(""));
    }
}
