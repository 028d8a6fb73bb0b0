use std::path::PathBuf;

use crate::cursor::CursorKind;
use crate::{CovenantError, Result};

pub(crate) const DEFAULT_HOST: &str = "localhost";
pub(crate) const DEFAULT_PORT: u16 = 11108;
pub(crate) const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub(crate) const MAX_CONNECT_TIMEOUT_SECS: u64 = 31_536_000;
pub(crate) const DEFAULT_CONFIG_GROUP: &str = "python-client";
pub(crate) const DEFAULT_CONFIG_FILE: &str = "covenant.cnf";

/// How SQL text is turned into request bytes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextEncoding {
    /// Reject text the encoding cannot represent.
    Strict,
    /// Preserve unpaired surrogates instead of rejecting them.
    #[default]
    SurrogatePreserving,
}

impl TextEncoding {
    // Rust strings are guaranteed UTF-8, so both strategies produce the same
    // bytes; the variant is an explicit configuration point, not a behavior
    // switch.
    pub(crate) fn encode(self, sql: &str) -> &str {
        sql
    }
}

/// Configuration for [`Connection::connect`](crate::Connection::connect).
///
/// Any option left unset falls back to the config file's group (when one is
/// given) and then to the hardcoded default. Explicit caller values always
/// win over the file.
#[derive(Clone, Debug, Default)]
pub struct ConnectOptions {
    pub(crate) dsn: Option<String>,
    pub(crate) host: Option<String>,
    pub(crate) port: Option<u16>,
    pub(crate) key: Option<PathBuf>,
    pub(crate) database: Option<String>,
    pub(crate) https_cert: Option<PathBuf>,
    pub(crate) config_file: Option<PathBuf>,
    pub(crate) config_group: Option<String>,
    pub(crate) encoding: TextEncoding,
    pub(crate) cursor_kind: CursorKind,
    pub(crate) connect_timeout: Option<u64>,
    pub(crate) read_timeout: Option<u64>,
    pub(crate) write_timeout: Option<u64>,
    pub(crate) autocommit: bool,
    pub(crate) defer_connect: bool,
    pub(crate) accept_invalid_certs: Option<bool>,
    pub(crate) base_url: Option<String>,
}

impl ConnectOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Data-source name. Currently opaque; not parsed into host/port.
    pub fn dsn(mut self, dsn: impl Into<String>) -> Self {
        self.dsn = Some(dsn.into());
        self
    }

    /// Gateway host. Default: `localhost`.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Gateway port. Default: `11108`.
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Path to the client private key PEM used for mutual TLS.
    pub fn key(mut self, key: impl Into<PathBuf>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Target database identifier.
    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Path to the client certificate PEM, combined with [`key`](Self::key)
    /// for mutual TLS. When unset, the key file alone is used.
    pub fn https_cert(mut self, cert: impl Into<PathBuf>) -> Self {
        self.https_cert = Some(cert.into());
        self
    }

    /// Option file to fill unset options from. When a group is named without
    /// a file, `covenant.cnf` is assumed.
    pub fn config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    /// Group to read inside the option file. Default: `python-client`.
    pub fn config_group(mut self, group: impl Into<String>) -> Self {
        self.config_group = Some(group.into());
        self
    }

    /// SQL text encoding strategy. Default: surrogate-preserving.
    pub fn encoding(mut self, encoding: TextEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Default cursor strategy handed out by
    /// [`Connection::cursor`](crate::Connection::cursor).
    pub fn cursor_kind(mut self, kind: CursorKind) -> Self {
        self.cursor_kind = kind;
        self
    }

    /// Connect timeout in seconds. Default: 10. Valid range: 1..=31536000.
    pub fn connect_timeout(mut self, seconds: u64) -> Self {
        self.connect_timeout = Some(seconds);
        self
    }

    /// Read timeout in seconds; must be positive when given.
    pub fn read_timeout(mut self, seconds: u64) -> Self {
        self.read_timeout = Some(seconds);
        self
    }

    /// Write timeout in seconds; must be positive when given. The transport
    /// has no separate write timeout, so this caps the whole request.
    pub fn write_timeout(mut self, seconds: u64) -> Self {
        self.write_timeout = Some(seconds);
        self
    }

    /// Autocommit mode, recorded client-side; enforcement is delegated to
    /// the gateway. Default: false.
    pub fn autocommit(mut self, autocommit: bool) -> Self {
        self.autocommit = autocommit;
        self
    }

    /// Skip the open probe at construction; call
    /// [`Connection::open`](crate::Connection::open) explicitly later.
    pub fn defer_connect(mut self, defer: bool) -> Self {
        self.defer_connect = defer;
        self
    }

    /// Whether to skip verification of the gateway's server certificate.
    ///
    /// Default: **true**. The upstream protocol authenticates with mutual
    /// TLS and deliberately does not verify the server certificate. Set to
    /// false to harden a deployment that carries a verifiable certificate.
    pub fn danger_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = Some(accept);
        self
    }

    /// Overrides the derived `https://{host}:{port}` endpoint base. Intended
    /// for local proxies and tests.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        let connect_timeout = self.connect_timeout.unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS);
        if connect_timeout == 0 || connect_timeout > MAX_CONNECT_TIMEOUT_SECS {
            return Err(CovenantError::InvalidArgument(format!(
                "connect_timeout should be >0 and <={MAX_CONNECT_TIMEOUT_SECS}, got {connect_timeout}"
            )));
        }
        if self.read_timeout == Some(0) {
            return Err(CovenantError::InvalidArgument(
                "read_timeout should be > 0".to_owned(),
            ));
        }
        if self.write_timeout == Some(0) {
            return Err(CovenantError::InvalidArgument(
                "write_timeout should be > 0".to_owned(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ConnectOptions, MAX_CONNECT_TIMEOUT_SECS};
    use crate::CovenantError;

    #[test]
    fn default_options_validate() {
        assert!(ConnectOptions::new().validate().is_ok());
    }

    #[test]
    fn connect_timeout_bounds() {
        for seconds in [1, 10, MAX_CONNECT_TIMEOUT_SECS] {
            assert!(ConnectOptions::new()
                .connect_timeout(seconds)
                .validate()
                .is_ok());
        }
        for seconds in [0, MAX_CONNECT_TIMEOUT_SECS + 1] {
            let err = ConnectOptions::new()
                .connect_timeout(seconds)
                .validate()
                .expect_err("out-of-range timeout must be rejected");
            assert!(matches!(err, CovenantError::InvalidArgument(_)));
        }
    }

    #[test]
    fn zero_read_write_timeouts_rejected() {
        let err = ConnectOptions::new()
            .read_timeout(0)
            .validate()
            .expect_err("zero read timeout must be rejected");
        assert!(matches!(err, CovenantError::InvalidArgument(_)));

        let err = ConnectOptions::new()
            .write_timeout(0)
            .validate()
            .expect_err("zero write timeout must be rejected");
        assert!(matches!(err, CovenantError::InvalidArgument(_)));
    }
}
