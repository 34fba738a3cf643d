//! Minimal HTTP/1.0 quote client
//!
//! One request per symbol, one fresh connection per request:
//!
//! ```text
//! GET /d/quotes.csv?s=EURUSD%3DX&f=t1l1c1ohgv&e=.csv HTTP/1.0
//! Host: download.finance.yahoo.com
//! Connection: close
//! ```
//!
//! The status line must report 200. Headers are skipped and the first
//! non-empty body line is handed back as the quote line.

use core::fmt::{self, Write as _};

use embedded_io::{Read, Write};
use heapless::String;
use tickerlcd_core::traits::{FetchError, QuoteSource};

/// Default quote host
pub const DEFAULT_HOST: &str = "download.finance.yahoo.com";

/// Default quote port
pub const DEFAULT_PORT: u16 = 80;

/// Longest request we build
const REQUEST_LEN: usize = 256;

/// Scratch size for status and header lines; longer ones are cut
const HEADER_LINE_LEN: usize = 64;

/// An open byte stream to the quote host
pub trait Connection: Read + Write {
    /// Shut the connection down
    fn close(self) -> Result<(), FetchError>
    where
        Self: Sized;
}

/// Opens TCP connections
pub trait Connector {
    type Socket<'a>: Connection
    where
        Self: 'a;

    fn connect(&mut self, host: &str, port: u16) -> Result<Self::Socket<'_>, FetchError>;
}

/// Percent-encodes a URL query value
///
/// Unreserved characters pass through; every other byte becomes `%XX`.
pub struct PercentEncoded<'a>(pub &'a str);

impl fmt::Display for PercentEncoded<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0.bytes() {
            match byte {
                b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                    f.write_char(byte as char)?
                }
                _ => write!(f, "%{:02X}", byte)?,
            }
        }
        Ok(())
    }
}

/// Build the request for one symbol
pub fn build_request(host: &str, symbol: &str, format: &str) -> Result<String<REQUEST_LEN>, FetchError> {
    let mut request = String::new();
    write!(
        request,
        "GET /d/quotes.csv?s={}&f={}&e=.csv HTTP/1.0\r\nHost: {}\r\nConnection: close\r\n\r\n",
        PercentEncoded(symbol),
        PercentEncoded(format),
        host
    )
    .map_err(|_| FetchError::TooLong)?;
    Ok(request)
}

/// Status code from an HTTP status line
pub fn parse_status_line(line: &[u8]) -> Result<u16, FetchError> {
    let line = core::str::from_utf8(line).map_err(|_| FetchError::BadResponse)?;
    let mut parts = line.split_ascii_whitespace();

    match parts.next() {
        Some(version) if version.starts_with("HTTP/") => {}
        _ => return Err(FetchError::BadResponse),
    }

    parts
        .next()
        .and_then(|code| code.parse().ok())
        .ok_or(FetchError::BadResponse)
}

/// Length of a line read by [`LineReader`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Line {
    len: usize,
    /// Bytes were dropped because the line did not fit
    cut: bool,
}

/// Buffered line reader over a byte stream
struct LineReader<'s, S> {
    stream: &'s mut S,
    chunk: [u8; 64],
    pos: usize,
    len: usize,
}

impl<'s, S: Read> LineReader<'s, S> {
    fn new(stream: &'s mut S) -> Self {
        Self {
            stream,
            chunk: [0; 64],
            pos: 0,
            len: 0,
        }
    }

    fn next_byte(&mut self) -> Result<Option<u8>, FetchError> {
        if self.pos == self.len {
            let n = self.stream.read(&mut self.chunk).map_err(|_| FetchError::Io)?;
            if n == 0 {
                return Ok(None);
            }
            self.pos = 0;
            self.len = n;
        }
        let byte = self.chunk[self.pos];
        self.pos += 1;
        Ok(Some(byte))
    }

    /// Read up to the next `\n` into `out`, without the line terminator
    ///
    /// Returns `None` at end of stream when nothing was read.
    fn read_line(&mut self, out: &mut [u8]) -> Result<Option<Line>, FetchError> {
        let mut line = Line { len: 0, cut: false };
        let mut any = false;

        loop {
            let Some(byte) = self.next_byte()? else {
                return Ok(any.then_some(line));
            };
            any = true;

            match byte {
                b'\n' => return Ok(Some(line)),
                b'\r' => {}
                _ => match out.get_mut(line.len) {
                    Some(slot) => {
                        *slot = byte;
                        line.len += 1;
                    }
                    None => line.cut = true,
                },
            }
        }
    }
}

/// Send the request and read the first body line into `buf`
///
/// Returns the line length.
fn exchange<S: Read + Write>(
    socket: &mut S,
    request: &str,
    buf: &mut [u8],
) -> Result<usize, FetchError> {
    socket
        .write_all(request.as_bytes())
        .map_err(|_| FetchError::Io)?;
    socket.flush().map_err(|_| FetchError::Io)?;

    let mut reader = LineReader::new(socket);
    let mut scratch = [0u8; HEADER_LINE_LEN];

    let status = reader
        .read_line(&mut scratch)?
        .ok_or(FetchError::Timeout)?;
    let code = parse_status_line(&scratch[..status.len])?;
    if code != 200 {
        return Err(FetchError::Status(code));
    }

    // Headers end at the first empty line
    loop {
        match reader.read_line(&mut scratch)? {
            Some(Line { len: 0, cut: false }) => break,
            Some(_) => {}
            None => return Err(FetchError::BadResponse),
        }
    }

    loop {
        match reader.read_line(buf)? {
            Some(Line { cut: true, .. }) => return Err(FetchError::TooLong),
            Some(Line { len: 0, .. }) => {}
            Some(Line { len, .. }) => return Ok(len),
            None => return Err(FetchError::BadResponse),
        }
    }
}

/// Quote source speaking HTTP over a [`Connector`]
pub struct HttpQuoteClient<'a, C> {
    connector: C,
    host: &'a str,
    port: u16,
}

impl<'a, C: Connector> HttpQuoteClient<'a, C> {
    pub fn new(connector: C, host: &'a str, port: u16) -> Self {
        Self {
            connector,
            host,
            port,
        }
    }

    pub fn connector(&mut self) -> &mut C {
        &mut self.connector
    }

    pub fn release(self) -> C {
        self.connector
    }
}

impl<C: Connector> QuoteSource for HttpQuoteClient<'_, C> {
    fn fetch<'b>(
        &mut self,
        symbol: &str,
        format: &str,
        buf: &'b mut [u8],
    ) -> Result<&'b str, FetchError> {
        let request = build_request(self.host, symbol, format)?;

        #[cfg(feature = "defmt")]
        defmt::debug!("GET {} from {}", symbol, self.host);

        let mut socket = self.connector.connect(self.host, self.port)?;
        let result = exchange(&mut socket, &request, buf);
        let closed = socket.close();

        let len = result?;
        closed?;

        core::str::from_utf8(&buf[..len]).map_err(|_| FetchError::Encoding)
    }
}
