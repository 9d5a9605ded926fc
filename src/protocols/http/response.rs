//! Response synthesis.
//!
//! Static routes reply with a canned status line straight from the
//! [`ResponseTable`]. The echo route builds an [`EchoResponse`] from the
//! parsed request and renders it into a single send buffer.

use bytes::{BufMut, Bytes, BytesMut};
use tracing::warn;

use super::parser::Request;
use super::table::{ResponseTable, TableError, OK};

/// Bytes reserved for status line plus headers when rendering.
pub const HEAD_BUDGET: usize = 128;

pub const BAD_REQUEST: &[u8] = b"HTTP/1.1 400 Bad Request\r\n\r\n";
pub const METHOD_NOT_ALLOWED: &[u8] = b"HTTP/1.1 405 Method Not Allowed\r\nAllow: GET\r\n\r\n";
pub const INTERNAL_ERROR: &[u8] = b"HTTP/1.1 500 Internal Server Error\r\n\r\n";

/// Echo response building errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// Request carries no echo argument
    NotEcho,
    /// Status line missing from the response table
    MissingStatus(u16),
}

impl std::fmt::Display for BuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildError::NotEcho => write!(f, "Request has no echo argument"),
            BuildError::MissingStatus(code) => {
                write!(f, "No status line registered for code {}", code)
            }
        }
    }
}

impl std::error::Error for BuildError {}

impl From<TableError> for BuildError {
    fn from(e: TableError) -> Self {
        match e {
            TableError::InvalidCode(code) | TableError::Unset(code) => {
                BuildError::MissingStatus(code)
            }
        }
    }
}

/// A fully built echo response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EchoResponse {
    pub status_line: String,
    pub headers: String,
    pub body: Bytes,
}

impl EchoResponse {
    /// Length of status line plus headers.
    pub fn head_len(&self) -> usize {
        self.status_line.len() + self.headers.len()
    }

    /// Whether the status line and headers fit in [`HEAD_BUDGET`].
    pub fn head_fits(&self) -> bool {
        self.head_len() <= HEAD_BUDGET
    }

    /// Concatenate status line, headers and body into one buffer.
    ///
    /// The buffer is sized for [`HEAD_BUDGET`] plus the exact body. A head
    /// that outgrows the budget is logged; the buffer grows and the output
    /// stays complete.
    pub fn render(&self) -> BytesMut {
        let estimated = HEAD_BUDGET + self.body.len();
        let mut out = BytesMut::with_capacity(estimated);

        if !self.head_fits() {
            warn!(
                head = self.head_len(),
                budget = HEAD_BUDGET,
                "Response head outgrew its size estimate"
            );
        }

        out.put_slice(self.status_line.as_bytes());
        out.put_slice(self.headers.as_bytes());
        out.put_slice(&self.body);
        out
    }
}

/// Build the `text/plain` echo response for `request`.
pub fn build_echo(request: &Request, table: &ResponseTable) -> Result<EchoResponse, BuildError> {
    let argument = request.echo.as_deref().ok_or(BuildError::NotEcho)?;
    let status_line = table.require(OK)?;

    Ok(EchoResponse {
        status_line: status_line.to_string(),
        headers: format!(
            "Content-Type: text/plain\r\nContent-Length: {}\r\n\r\n",
            argument.len()
        ),
        body: Bytes::copy_from_slice(argument.as_bytes()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocols::http::parser::{parse, Limits};

    fn echo_request(argument: &str) -> Request {
        Request {
            method: "GET".to_string(),
            route: format!("/echo/{argument}"),
            version: "HTTP/1.1".to_string(),
            echo: Some(argument.to_string()),
        }
    }

    /// Split a rendered response into (head, body) and read Content-Length.
    fn content_length(rendered: &[u8]) -> (usize, &[u8]) {
        let text = std::str::from_utf8(rendered).unwrap();
        let split = text.find("\r\n\r\n").unwrap() + 4;
        let length = text[..split]
            .lines()
            .find_map(|l| l.strip_prefix("Content-Length: "))
            .unwrap()
            .parse()
            .unwrap();
        (length, &rendered[split..])
    }

    #[test]
    fn test_build_echo() {
        let table = ResponseTable::canned().unwrap();
        let request = parse(b"GET /echo/hello HTTP/1.1\r\n", &Limits::default()).unwrap();
        let response = build_echo(&request, &table).unwrap();

        assert_eq!(response.status_line, "HTTP/1.1 200 OK\r\n");
        assert_eq!(
            response.headers,
            "Content-Type: text/plain\r\nContent-Length: 5\r\n\r\n"
        );
        assert_eq!(&response.body[..], b"hello");
        assert_eq!(
            &response.render()[..],
            b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 5\r\n\r\nhello"
        );
    }

    #[test]
    fn test_content_length_matches_body() {
        let table = ResponseTable::canned().unwrap();
        for len in [0, 1, 9, 10, 99, 100, 255] {
            let request = echo_request(&"x".repeat(len));
            let rendered = build_echo(&request, &table).unwrap().render();
            let (length, body) = content_length(&rendered);
            assert_eq!(length, len);
            assert_eq!(body.len(), len);
        }
    }

    #[test]
    fn test_content_length_counts_bytes() {
        let table = ResponseTable::canned().unwrap();
        let rendered = build_echo(&echo_request("héllo"), &table)
            .unwrap()
            .render();
        let (length, body) = content_length(&rendered);
        assert_eq!(length, 6);
        assert_eq!(body, "héllo".as_bytes());
    }

    #[test]
    fn test_not_echo() {
        let table = ResponseTable::canned().unwrap();
        let request = parse(b"GET / HTTP/1.1\r\n", &Limits::default()).unwrap();
        assert_eq!(build_echo(&request, &table), Err(BuildError::NotEcho));
    }

    #[test]
    fn test_missing_status() {
        let table = ResponseTable::new();
        assert_eq!(
            build_echo(&echo_request("hi"), &table),
            Err(BuildError::MissingStatus(200))
        );
    }

    #[test]
    fn test_head_fits_budget() {
        let table = ResponseTable::canned().unwrap();
        let response = build_echo(&echo_request(&"x".repeat(255)), &table).unwrap();
        assert!(response.head_fits());
    }

    #[test]
    fn test_oversized_head_still_rendered_whole() {
        let mut table = ResponseTable::canned().unwrap();
        let status = format!("HTTP/1.1 200 {}\r\n", "O".repeat(HEAD_BUDGET));
        table.set(OK, &status).unwrap();

        let response = build_echo(&echo_request("abc"), &table).unwrap();
        assert!(!response.head_fits());

        let rendered = response.render();
        assert_eq!(rendered.len(), response.head_len() + 3);
        assert!(rendered.starts_with(status.as_bytes()));
        assert!(rendered.ends_with(b"\r\n\r\nabc"));
    }

    #[test]
    fn test_render_uses_table_text() {
        let mut table = ResponseTable::canned().unwrap();
        table.set(OK, "HTTP/1.0 200 Fine\r\n").unwrap();
        let rendered = build_echo(&echo_request("a"), &table).unwrap().render();
        assert!(rendered.starts_with(b"HTTP/1.0 200 Fine\r\n"));
    }
}
