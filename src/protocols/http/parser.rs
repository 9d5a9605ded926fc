//! HTTP request-line parser.
//!
//! Only the first line of the request is looked at:
//!
//! ```text
//! METHOD SP PATH SP VERSION \n
//! ```
//!
//! Everything after the first `\n` (headers, body) is ignored.

use std::str;

/// Route prefix that selects the echo behavior.
pub const ECHO_PREFIX: &str = "/echo/";

/// Size limits applied while parsing a request line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Longer lines are truncated to this many bytes before splitting.
    pub max_line_length: usize,
    pub max_method_length: usize,
    pub max_route_length: usize,
    pub max_version_length: usize,
    /// Maximum echo argument length in bytes.
    pub max_echo_length: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_line_length: 255,
            max_method_length: 15,
            max_route_length: 127,
            max_version_length: 15,
            max_echo_length: 255,
        }
    }
}

/// A successfully parsed request line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: String,
    pub route: String,
    pub version: String,
    /// Text after `/echo/`, present only when the route has that prefix.
    pub echo: Option<String>,
}

/// Request-line field, used to report which token overflowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Method,
    Route,
    Version,
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Field::Method => write!(f, "method"),
            Field::Route => write!(f, "route"),
            Field::Version => write!(f, "version"),
        }
    }
}

/// Request-line parsing errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// No bytes to parse
    Empty,
    /// No `\n` within the buffer
    MissingNewline,
    /// Line did not split into exactly three tokens
    TokenCount(usize),
    /// A token exceeded its width limit
    FieldTooLong { field: Field, limit: usize },
    /// A token is not valid UTF-8
    InvalidUtf8(Field),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::Empty => write!(f, "Empty request"),
            ParseError::MissingNewline => {
                write!(f, "Request line too long or no newline found")
            }
            ParseError::TokenCount(n) => {
                write!(f, "Expected 3 tokens in request line, found {}", n)
            }
            ParseError::FieldTooLong { field, limit } => {
                write!(f, "Request {} longer than {} bytes", field, limit)
            }
            ParseError::InvalidUtf8(field) => write!(f, "Invalid UTF-8 in request {}", field),
        }
    }
}

impl std::error::Error for ParseError {}

/// Parse the request line at the start of `input`.
pub fn parse(input: &[u8], limits: &Limits) -> Result<Request, ParseError> {
    if input.is_empty() {
        return Err(ParseError::Empty);
    }

    let line_end = input
        .iter()
        .position(|&b| b == b'\n')
        .ok_or(ParseError::MissingNewline)?;

    let mut line = &input[..line_end];
    if line.len() > limits.max_line_length {
        tracing::debug!(
            length = line.len(),
            limit = limits.max_line_length,
            "Request line exceeds limit, truncating"
        );
        line = &line[..limits.max_line_length];
    }

    let tokens: Vec<&[u8]> = line
        .split(|b| b.is_ascii_whitespace())
        .filter(|t| !t.is_empty())
        .collect();
    if tokens.len() != 3 {
        return Err(ParseError::TokenCount(tokens.len()));
    }

    let method = token(tokens[0], Field::Method, limits.max_method_length)?;
    let route = token(tokens[1], Field::Route, limits.max_route_length)?;
    let version = token(tokens[2], Field::Version, limits.max_version_length)?;

    let echo = route
        .strip_prefix(ECHO_PREFIX)
        .map(|rest| echo_argument(rest, limits.max_echo_length).to_string());

    Ok(Request {
        method: method.to_string(),
        route: route.to_string(),
        version: version.to_string(),
        echo,
    })
}

/// Validate one token against its width limit.
fn token(bytes: &[u8], field: Field, limit: usize) -> Result<&str, ParseError> {
    if bytes.len() > limit {
        return Err(ParseError::FieldTooLong { field, limit });
    }
    str::from_utf8(bytes).map_err(|_| ParseError::InvalidUtf8(field))
}

/// Cut the echo argument at the first space and at `max` bytes.
fn echo_argument(rest: &str, max: usize) -> &str {
    let arg = match rest.find(' ') {
        Some(pos) => &rest[..pos],
        None => rest,
    };
    if arg.len() <= max {
        return arg;
    }
    let mut end = max;
    while !arg.is_char_boundary(end) {
        end -= 1;
    }
    &arg[..end]
}
