//! `covenantsql-http` is an async connection/cursor client for the
//! CovenantSQL database gateway.
//!
//! The gateway speaks request/response HTTPS rather than a persistent
//! binary protocol; this crate hides that behind a small database
//! interface:
//! - [`Connection::connect`] / [`Connection::query`]
//! - [`Connection::cursor`] for fetch-one / fetch-many / fetch-all
//!   iteration over materialized rows
//!
//! Commands are routed by prefix: text starting with `select` (after
//! trimming leading whitespace, case-insensitively) goes to the query
//! endpoint and materializes rows; everything else goes to the exec
//! endpoint.
//!
//! ```no_run
//! use covenantsql_http::{ConnectOptions, Connection};
//!
//! # async fn run() -> covenantsql_http::Result<()> {
//! let options = ConnectOptions::new()
//!     .host("e.morenodes.example.org")
//!     .port(11108)
//!     .database("05ca1a5b9ad8bf21")
//!     .key("write.test.covenantsql.io-key.pem");
//! let mut conn = Connection::connect(options).await?;
//!
//! let mut cursor = conn.cursor();
//! cursor.execute("select * from t;").await?;
//! while let Some(row) = cursor.fetch_one() {
//!     println!("{row:?}");
//! }
//! conn.close()?;
//! # Ok(())
//! # }
//! ```

mod config;
mod connection;
mod cursor;
mod error;
mod options;
mod result;
mod value;
mod wire;

pub use config::{ConfigSource, IniFile};
pub use connection::Connection;
pub use cursor::{Cursor, CursorKind};
pub use error::CovenantError;
pub use options::{ConnectOptions, TextEncoding};
pub use result::ResultSet;
pub use value::Value;

pub type Result<T> = std::result::Result<T, CovenantError>;
