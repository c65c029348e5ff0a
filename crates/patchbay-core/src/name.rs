//! Naming rules for clients, ports, and aliases.
//!
//! A port's full name is `client_name + SEPARATOR + short_name`. Client names
//! never contain the separator, so the first separator in a full name always
//! marks the client/port boundary. Short names never contain it either;
//! only aliases, which are free-form full names, may.
//!
//! ```rust
//! use patchbay_core::name::{self, Limits};
//!
//! let limits = Limits::default();
//! name::validate_client_name("synth", &limits).unwrap();
//! assert!(name::validate_client_name("syn:th", &limits).is_err());
//!
//! let full = name::full_name("synth", "midi_in");
//! assert_eq!(full, "synth:midi_in");
//! assert_eq!(name::split_full_name(&full), Some(("synth", "midi_in")));
//! ```

use crate::error::{Error, Result};

/// Separator between the client name and the port short name.
pub const SEPARATOR: char = ':';

/// Default maximum client name length in bytes.
pub const DEFAULT_MAX_CLIENT_NAME_LEN: usize = 63;

/// Default maximum full port name length in bytes.
pub const DEFAULT_MAX_PORT_NAME_LEN: usize = 255;

/// Default number of alias slots per port.
pub const DEFAULT_MAX_ALIASES: usize = 2;

/// Highest numeric suffix tried when disambiguating a client name.
const MAX_SUFFIX: u32 = 99;

/// Server-defined limits applied by the validator and the connection graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Maximum client name length in bytes.
    pub max_client_name_len: usize,
    /// Maximum full port name (`client:short`) length in bytes.
    pub max_port_name_len: usize,
    /// Number of alias slots per port.
    pub max_aliases: usize,
    /// Maximum number of connections per port, unlimited if `None`.
    pub max_connections_per_port: Option<usize>,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_client_name_len: DEFAULT_MAX_CLIENT_NAME_LEN,
            max_port_name_len: DEFAULT_MAX_PORT_NAME_LEN,
            max_aliases: DEFAULT_MAX_ALIASES,
            max_connections_per_port: None,
        }
    }
}

/// What to do when a requested client name is already taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NamePolicy {
    /// Fail with [`Error::NameConflict`].
    Exact,
    /// Append a numeric suffix (`name-01`, `name-02`, ...) and use that instead.
    #[default]
    Disambiguate,
}

/// Validate a client name.
///
/// A client name is non-empty, at most [`Limits::max_client_name_len`] bytes,
/// free of control characters, and never contains [`SEPARATOR`].
pub fn validate_client_name(name: &str, limits: &Limits) -> Result<()> {
    check_common(name)?;
    if name.len() > limits.max_client_name_len {
        return Err(Error::invalid_name(name, "client name is too long"));
    }
    if name.contains(SEPARATOR) {
        return Err(Error::invalid_name(name, "client name contains the separator"));
    }
    Ok(())
}

/// Validate a port short name for the given client.
///
/// The short name is non-empty, free of control characters, never contains
/// [`SEPARATOR`], and the composed full name must fit in
/// [`Limits::max_port_name_len`].
pub fn validate_port_name(client_name: &str, short_name: &str, limits: &Limits) -> Result<()> {
    check_common(short_name)?;
    if short_name.contains(SEPARATOR) {
        return Err(Error::invalid_name(short_name, "port name contains the separator"));
    }
    if client_name.len() + SEPARATOR.len_utf8() + short_name.len() > limits.max_port_name_len {
        return Err(Error::invalid_name(short_name, "full port name is too long"));
    }
    Ok(())
}

/// Validate a port alias. Aliases are free-form full names.
pub fn validate_alias(alias: &str, limits: &Limits) -> Result<()> {
    check_common(alias)?;
    if alias.len() > limits.max_port_name_len {
        return Err(Error::invalid_name(alias, "alias is too long"));
    }
    Ok(())
}

fn check_common(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::invalid_name(name, "name is empty"));
    }
    if name.chars().any(char::is_control) {
        return Err(Error::invalid_name(name, "name contains control characters"));
    }
    Ok(())
}

/// Compose a full port name.
pub fn full_name(client_name: &str, short_name: &str) -> String {
    let mut full = String::with_capacity(client_name.len() + 1 + short_name.len());
    full.push_str(client_name);
    full.push(SEPARATOR);
    full.push_str(short_name);
    full
}

/// Split a full port name into `(client_name, short_name)` at the first separator.
pub fn split_full_name(full_name: &str) -> Option<(&str, &str)> {
    full_name.split_once(SEPARATOR)
}

/// Produce a client name derived from `base` that `is_taken` rejects.
///
/// Tries `base-01` through `base-99`, truncating `base` on a character
/// boundary so the result stays within [`Limits::max_client_name_len`].
/// Fails with [`Error::NameConflict`] when every suffix is taken.
pub fn disambiguate(base: &str, limits: &Limits, is_taken: impl Fn(&str) -> bool) -> Result<String> {
    // "-NN"
    let suffix_len = 3;
    let mut end = base.len().min(limits.max_client_name_len.saturating_sub(suffix_len));
    while !base.is_char_boundary(end) {
        end -= 1;
    }
    let stem = &base[..end];
    if stem.is_empty() {
        return Err(Error::NameConflict(base.to_string()));
    }
    (1..=MAX_SUFFIX)
        .map(|n| format!("{stem}-{n:02}"))
        .find(|candidate| !is_taken(candidate))
        .ok_or_else(|| Error::NameConflict(base.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_name_rules() {
        let limits = Limits::default();
        assert!(validate_client_name("test", &limits).is_ok());
        assert!(validate_client_name("registration callback test", &limits).is_ok());
        assert!(matches!(
            validate_client_name("", &limits),
            Err(Error::InvalidName { .. })
        ));
        assert!(validate_client_name("a:b", &limits).is_err());
        assert!(validate_client_name("tab\there", &limits).is_err());
        assert!(validate_client_name(&"x".repeat(63), &limits).is_ok());
        assert!(validate_client_name(&"x".repeat(64), &limits).is_err());
    }

    #[test]
    fn port_name_rules() {
        let limits = Limits::default();
        assert!(validate_port_name("client", "port name", &limits).is_ok());
        assert!(matches!(
            validate_port_name("client", "capture:1", &limits),
            Err(Error::InvalidName { .. })
        ));
        assert!(validate_port_name("client", "", &limits).is_err());
    }

    #[test]
    fn alias_may_contain_separator() {
        let limits = Limits::default();
        assert!(validate_alias("alsa_pcm:capture_1", &limits).is_ok());
    }

    #[test]
    fn port_name_limit_counts_full_name() {
        let limits = Limits {
            max_port_name_len: 10,
            ..Limits::default()
        };
        // "abc:" + 6 = 10
        assert!(validate_port_name("abc", "123456", &limits).is_ok());
        assert!(validate_port_name("abc", "1234567", &limits).is_err());
    }

    #[test]
    fn split_at_first_separator() {
        assert_eq!(split_full_name("system:capture:1"), Some(("system", "capture:1")));
        assert_eq!(split_full_name("nocolon"), None);
    }

    #[test]
    fn disambiguate_appends_suffix() {
        let limits = Limits::default();
        let taken = ["test", "test-01"];
        let name = disambiguate("test", &limits, |n| taken.contains(&n)).unwrap();
        assert_eq!(name, "test-02");
    }

    #[test]
    fn disambiguate_respects_length_limit() {
        let limits = Limits {
            max_client_name_len: 8,
            ..Limits::default()
        };
        let name = disambiguate("abcdefgh", &limits, |_| false).unwrap();
        assert_eq!(name, "abcde-01");
        assert!(validate_client_name(&name, &limits).is_ok());
    }

    #[test]
    fn disambiguate_truncates_on_char_boundary() {
        let limits = Limits {
            max_client_name_len: 5,
            ..Limits::default()
        };
        // 'é' is two bytes; a byte cut at 2 would split it.
        let name = disambiguate("aéb", &limits, |_| false).unwrap();
        assert_eq!(name, "a-01");
    }

    #[test]
    fn disambiguate_exhausted() {
        let limits = Limits::default();
        let result = disambiguate("busy", &limits, |_| true);
        assert_eq!(result, Err(Error::NameConflict("busy".to_string())));
    }
}
