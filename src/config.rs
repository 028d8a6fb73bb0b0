use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use crate::options::ConnectOptions;
use crate::{CovenantError, Result};

/// Key/value lookup contract for filling unset connection options.
pub trait ConfigSource {
    /// Looks up `key` inside `group`, returning `None` when either is
    /// absent.
    fn get(&self, group: &str, key: &str) -> Option<String>;
}

/// INI-style option file: sections are groups, `key = value` lines inside.
///
/// Keys are case-insensitive; section names are not. Blank lines and lines
/// starting with `#` or `;` are skipped, as is anything before the first
/// section header.
#[derive(Debug, Default)]
pub struct IniFile {
    groups: HashMap<String, HashMap<String, String>>,
}

impl IniFile {
    /// Reads and parses an option file from disk.
    pub fn open(path: &Path) -> io::Result<Self> {
        Ok(Self::parse(&std::fs::read_to_string(path)?))
    }

    /// Parses option-file text. Unrecognized lines are skipped.
    pub fn parse(text: &str) -> Self {
        let mut groups: HashMap<String, HashMap<String, String>> = HashMap::new();
        let mut current: Option<String> = None;

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }
            if let Some(name) = line
                .strip_prefix('[')
                .and_then(|rest| rest.strip_suffix(']'))
            {
                let name = name.trim().to_owned();
                groups.entry(name.clone()).or_default();
                current = Some(name);
                continue;
            }
            let Some(section) = &current else { continue };
            if let Some((key, value)) = line.split_once('=').or_else(|| line.split_once(':')) {
                groups
                    .entry(section.clone())
                    .or_default()
                    .insert(key.trim().to_ascii_lowercase(), value.trim().to_owned());
            }
        }

        Self { groups }
    }
}

impl ConfigSource for IniFile {
    fn get(&self, group: &str, key: &str) -> Option<String> {
        self.groups.get(group)?.get(&key.to_ascii_lowercase()).cloned()
    }
}

/// Expands a leading `~` or `~/` in an option-file path against `$HOME`.
/// Paths without a leading tilde, and tildes with no home to resolve
/// against, pass through unchanged. `~user` forms are not supported.
pub(crate) fn expand_user(path: &Path) -> PathBuf {
    expand_user_in(path, std::env::var_os("HOME").map(PathBuf::from))
}

fn expand_user_in(path: &Path, home: Option<PathBuf>) -> PathBuf {
    let Some(raw) = path.to_str() else {
        return path.to_path_buf();
    };
    let Some(home) = home else {
        return path.to_path_buf();
    };
    if raw == "~" {
        home
    } else if let Some(rest) = raw.strip_prefix("~/") {
        home.join(rest)
    } else {
        path.to_path_buf()
    }
}

/// Fills options the caller left unset from the named config group.
/// Explicit caller values always win over the file.
pub(crate) fn apply(
    source: &dyn ConfigSource,
    group: &str,
    options: &mut ConnectOptions,
) -> Result<()> {
    if options.dsn.is_none() {
        options.dsn = source.get(group, "dsn");
    }
    if options.host.is_none() {
        options.host = source.get(group, "host");
    }
    if options.port.is_none() {
        options.port = source
            .get(group, "port")
            .map(|raw| {
                raw.parse::<u16>().map_err(|err| {
                    CovenantError::InvalidArgument(format!(
                        "invalid port '{raw}' in config group '{group}': {err}"
                    ))
                })
            })
            .transpose()?;
    }
    if options.key.is_none() {
        options.key = source.get(group, "key").map(PathBuf::from);
    }
    if options.database.is_none() {
        options.database = source.get(group, "database");
    }
    if options.https_cert.is_none() {
        options.https_cert = source.get(group, "https_pem").map(PathBuf::from);
    }
    Ok(())
}
