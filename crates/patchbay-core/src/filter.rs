//! Port queries.
//!
//! Name and type patterns are regular expressions matched anywhere in the
//! full name / type string, like JACK's `get_ports`. All set criteria must hold.

use regex::Regex;

use crate::error::{Error, Result};
use crate::port::{Direction, PortInfo};

/// Conjunctive filter over port snapshots. The default filter matches every port.
#[derive(Debug, Clone, Default)]
pub struct PortFilter {
    name: Option<Regex>,
    port_type: Option<Regex>,
    direction: Option<Direction>,
    physical: Option<bool>,
    terminal: Option<bool>,
}

impl PortFilter {
    /// Creates a filter that matches every port.
    pub fn new() -> Self {
        Self::default()
    }

    /// Match full port names against `pattern`. An empty pattern matches everything.
    pub fn name_pattern(mut self, pattern: &str) -> Result<Self> {
        self.name = compile(pattern)?;
        Ok(self)
    }

    /// Match type strings against `pattern`. An empty pattern matches everything.
    pub fn type_pattern(mut self, pattern: &str) -> Result<Self> {
        self.port_type = compile(pattern)?;
        Ok(self)
    }

    /// Only ports with this direction.
    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = Some(direction);
        self
    }

    /// Only ports whose physical flag equals `physical`.
    pub fn physical(mut self, physical: bool) -> Self {
        self.physical = Some(physical);
        self
    }

    /// Only ports whose terminal flag equals `terminal`.
    pub fn terminal(mut self, terminal: bool) -> Self {
        self.terminal = Some(terminal);
        self
    }

    /// Returns `true` if `port` satisfies every criterion.
    pub fn matches(&self, port: &PortInfo) -> bool {
        self.name.as_ref().is_none_or(|re| re.is_match(&port.full_name))
            && self
                .port_type
                .as_ref()
                .is_none_or(|re| re.is_match(port.port_type.as_str()))
            && self.direction.is_none_or(|d| d == port.direction)
            && self.physical.is_none_or(|p| p == port.flags.physical)
            && self.terminal.is_none_or(|t| t == port.flags.terminal)
    }
}

fn compile(pattern: &str) -> Result<Option<Regex>> {
    if pattern.is_empty() {
        return Ok(None);
    }
    Regex::new(pattern)
        .map(Some)
        .map_err(|e| Error::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })
}
