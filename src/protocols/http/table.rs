//! Canned status lines keyed by status code.
//!
//! Built once at startup and then only read while serving.

use std::collections::HashMap;
use std::ops::RangeInclusive;

/// Status codes accepted by [`ResponseTable::set`].
pub const VALID_CODES: RangeInclusive<u16> = 100..=599;

pub const OK: u16 = 200;
pub const NOT_FOUND: u16 = 404;

/// Response table errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    /// Code outside [`VALID_CODES`]
    InvalidCode(u16),
    /// Code was never populated
    Unset(u16),
}

impl std::fmt::Display for TableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableError::InvalidCode(code) => write!(f, "Invalid response code: {}", code),
            TableError::Unset(code) => write!(f, "No response registered for code {}", code),
        }
    }
}

impl std::error::Error for TableError {}

/// Mapping from status code to a pre-rendered status line.
#[derive(Debug, Default, Clone)]
pub struct ResponseTable {
    entries: HashMap<u16, String>,
}

impl ResponseTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table with the status lines the server needs: 200 and 404.
    pub fn canned() -> Result<Self, TableError> {
        let mut table = Self::new();
        table.set(OK, "HTTP/1.1 200 OK\r\n")?;
        table.set(NOT_FOUND, "HTTP/1.1 404 Not Found\r\n")?;
        Ok(table)
    }

    /// Install `text` for `code`, returning the entry it replaced.
    pub fn set(&mut self, code: u16, text: &str) -> Result<Option<String>, TableError> {
        if !VALID_CODES.contains(&code) {
            return Err(TableError::InvalidCode(code));
        }
        Ok(self.entries.insert(code, text.to_string()))
    }

    pub fn get(&self, code: u16) -> Option<&str> {
        self.entries.get(&code).map(String::as_str)
    }

    /// Like [`get`](Self::get), but an unset code is an error.
    pub fn require(&self, code: u16) -> Result<&str, TableError> {
        self.get(code).ok_or(TableError::Unset(code))
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canned() {
        let table = ResponseTable::canned().unwrap();
        assert_eq!(table.get(OK), Some("HTTP/1.1 200 OK\r\n"));
        assert_eq!(table.get(NOT_FOUND), Some("HTTP/1.1 404 Not Found\r\n"));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_get_unset() {
        let table = ResponseTable::new();
        assert_eq!(table.get(OK), None);
        assert_eq!(table.require(OK), Err(TableError::Unset(200)));
    }

    #[test]
    fn test_set_replaces() {
        let mut table = ResponseTable::new();
        assert_eq!(table.set(OK, "first\r\n"), Ok(None));
        assert_eq!(
            table.set(OK, "second\r\n"),
            Ok(Some("first\r\n".to_string()))
        );
        assert_eq!(table.get(OK), Some("second\r\n"));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_set_rejects_invalid_code() {
        let mut table = ResponseTable::new();
        assert_eq!(table.set(0, "x"), Err(TableError::InvalidCode(0)));
        assert_eq!(table.set(99, "x"), Err(TableError::InvalidCode(99)));
        assert_eq!(table.set(600, "x"), Err(TableError::InvalidCode(600)));
        assert!(table.is_empty());

        assert!(table.set(100, "x").is_ok());
        assert!(table.set(599, "x").is_ok());
    }

    #[test]
    fn test_clear() {
        let mut table = ResponseTable::canned().unwrap();
        assert!(!table.is_empty());
        table.clear();
        assert!(table.is_empty());
        assert_eq!(table.len(), 0);
        assert_eq!(table.get(NOT_FOUND), None);
    }
}
