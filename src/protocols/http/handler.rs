//! Per-connection request handling.

use bytes::BytesMut;
use std::net::SocketAddr;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, error, info, warn};

use super::parser::{self, Limits, ParseError, Request};
use super::response::{self, BuildError, EchoResponse};
use super::table::{ResponseTable, NOT_FOUND, OK};

/// What to send back for one request.
#[derive(Debug, PartialEq, Eq)]
pub enum Reply {
    /// `GET /echo/<arg>`
    Echo(EchoResponse),
    /// `GET /`: the canned 200 line
    Root,
    /// Any other `GET` route: the canned 404 line
    NotFound,
    /// Non-GET method
    MethodNotAllowed,
    /// Unparsable request line
    BadRequest(ParseError),
    /// Echo response could not be built
    InternalError(BuildError),
}

impl Reply {
    /// Route a parse result to a reply.
    pub fn route(parsed: Result<Request, ParseError>, table: &ResponseTable) -> Self {
        let request = match parsed {
            Ok(request) => request,
            Err(e) => return Reply::BadRequest(e),
        };

        if request.method != "GET" {
            return Reply::MethodNotAllowed;
        }

        if request.echo.is_some() {
            match response::build_echo(&request, table) {
                Ok(echo) => Reply::Echo(echo),
                Err(e) => Reply::InternalError(e),
            }
        } else if request.route == "/" {
            Reply::Root
        } else {
            Reply::NotFound
        }
    }

    pub fn status(&self) -> u16 {
        match self {
            Reply::Echo(_) | Reply::Root => OK,
            Reply::NotFound => NOT_FOUND,
            Reply::MethodNotAllowed => 405,
            Reply::BadRequest(_) => 400,
            Reply::InternalError(_) => 500,
        }
    }

    /// Bytes to write to the client.
    ///
    /// Canned lines that have gone missing from the table fall back to the
    /// fixed 500 response so the client always gets a status line.
    pub fn into_bytes(self, table: &ResponseTable) -> BytesMut {
        match self {
            Reply::Echo(echo) => echo.render(),
            Reply::Root => canned(table, OK),
            Reply::NotFound => canned(table, NOT_FOUND),
            Reply::MethodNotAllowed => BytesMut::from(response::METHOD_NOT_ALLOWED),
            Reply::BadRequest(_) => BytesMut::from(response::BAD_REQUEST),
            Reply::InternalError(_) => BytesMut::from(response::INTERNAL_ERROR),
        }
    }
}

fn canned(table: &ResponseTable, code: u16) -> BytesMut {
    match table.require(code) {
        Ok(line) => BytesMut::from(line.as_bytes()),
        Err(e) => {
            error!(error = %e, "Canned response missing");
            BytesMut::from(response::INTERNAL_ERROR)
        }
    }
}

/// Handle a single client connection: one read, one response.
pub async fn handle_connection<S>(
    mut stream: S,
    peer: SocketAddr,
    table: &ResponseTable,
    limits: &Limits,
    read_size: usize,
) -> std::io::Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut buffer = BytesMut::zeroed(read_size);
    let n = stream.read(&mut buffer).await?;
    if n == 0 {
        info!(peer = %peer, "Client closed connection before sending data");
        return Ok(());
    }

    let reply = Reply::route(parser::parse(&buffer[..n], limits), table);
    match &reply {
        Reply::BadRequest(e) => warn!(peer = %peer, error = %e, "Malformed request"),
        Reply::InternalError(e) => {
            error!(peer = %peer, error = %e, "Failed to create echo response")
        }
        _ => {}
    }

    let status = reply.status();
    let data = reply.into_bytes(table);
    stream.write_all(&data).await?;
    stream.flush().await?;
    debug!(peer = %peer, status, bytes = data.len(), "Response sent");

    Ok(())
}
