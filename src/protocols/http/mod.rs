//! Minimal HTTP/1.1 protocol.
//!
//! One request per connection. Only the request line is parsed:
//!
//! ```text
//! Request:  GET /echo/hello HTTP/1.1\r\n
//! Response: HTTP/1.1 200 OK\r\n
//!           Content-Type: text/plain\r\n
//!           Content-Length: 5\r\n
//!           \r\n
//!           hello
//! ```
//!
//! Routes:
//! - `GET /` - canned 200 status line, no body
//! - `GET /echo/<arg>` - `<arg>` echoed back as `text/plain`
//! - any other `GET` - canned 404 status line
//! - any other method - 405 with `Allow: GET`
//! - unparsable request line - 400
//! - echo response build failure - 500

pub mod handler;
pub mod parser;
pub mod response;
pub mod table;

pub use handler::handle_connection;
pub use parser::Limits;
pub use table::ResponseTable;
