//! Quote service transport trait

/// Transport-level failures while fetching one quote
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FetchError {
    /// Connection to the quote host could not be established
    Connect,
    /// No (complete) answer within the transport's timeout
    Timeout,
    /// Read or write on an open connection failed
    Io,
    /// Server answered with a non-200 status
    Status(u16),
    /// Response was not a well-formed HTTP response
    BadResponse,
    /// Response line did not fit the caller's buffer
    TooLong,
    /// Response line was not valid UTF-8
    Encoding,
}

impl core::fmt::Display for FetchError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            FetchError::Connect => f.write_str("connect failed"),
            FetchError::Timeout => f.write_str("timed out"),
            FetchError::Io => f.write_str("connection error"),
            FetchError::Status(code) => write!(f, "HTTP status {}", code),
            FetchError::BadResponse => f.write_str("malformed HTTP response"),
            FetchError::TooLong => f.write_str("response line too long"),
            FetchError::Encoding => f.write_str("response not UTF-8"),
        }
    }
}

/// Source of quote response lines
///
/// One call issues one blocking request for one symbol and returns the
/// single CSV line the service answered with. The line is written into
/// `buf` and borrowed from it.
pub trait QuoteSource {
    fn fetch<'b>(
        &mut self,
        symbol: &str,
        format: &str,
        buf: &'b mut [u8],
    ) -> Result<&'b str, FetchError>;
}
