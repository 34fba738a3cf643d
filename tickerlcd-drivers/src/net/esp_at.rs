//! ESP8266 AT-command Wi-Fi modem
//!
//! The modem sits on a UART and is driven with its stock AT firmware.
//! A TCP connection is used in transparent ("passthrough") mode: after
//! `AT+CIPSEND` answers with `>`, every byte written to the UART goes to the
//! peer and every byte from the peer comes back on the UART.
//!
//! # Command Flow
//!
//! ```text
//! AT            -> OK            probe
//! ATE0          -> OK            echo off
//! AT+CWMODE=1   -> OK            station mode
//! AT+CWJAP=...  -> OK | FAIL     join access point
//!
//! AT+CIPSTART="TCP","host",80 -> CONNECT / OK
//! AT+CIPMODE=1  -> OK
//! AT+CIPSEND    -> OK, >         passthrough begins
//! ...data...
//! +++                            (guard time on both sides) leave passthrough
//! AT+CIPMODE=0  -> OK
//! AT+CIPCLOSE   -> OK | ERROR    ERROR if the peer already closed
//! ```
//!
//! There is no end-of-stream marker in passthrough mode. A socket read that
//! sees no data for `read_timeout_ms` reports end of stream.

use core::fmt::{self, Write as _};

use embedded_hal::delay::DelayNs;
use embedded_io::{ErrorKind, ErrorType, Read, ReadReady, Write};
use heapless::{String, Vec};
use tickerlcd_core::traits::FetchError;

use super::http::{Connection, Connector};

/// Longest AT command line
const COMMAND_LEN: usize = 128;

/// Longest modem reply line kept; the rest is dropped
const REPLY_LEN: usize = 48;

/// Modem timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EspAtConfig {
    /// Wait for the final reply of a plain command
    pub command_timeout_ms: u32,
    /// Wait for `AT+CWJAP` (association plus DHCP)
    pub join_timeout_ms: u32,
    /// Wait for `AT+CIPSTART`
    pub connect_timeout_ms: u32,
    /// Idle time after which a socket read reports end of stream
    pub read_timeout_ms: u32,
    /// Silence required around `+++`
    pub guard_time_ms: u32,
}

impl Default for EspAtConfig {
    fn default() -> Self {
        Self {
            command_timeout_ms: 2_000,
            join_timeout_ms: 20_000,
            connect_timeout_ms: 10_000,
            read_timeout_ms: 3_000,
            guard_time_ms: 1_000,
        }
    }
}

/// Modem errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EspError {
    /// UART read or write failed
    Uart,
    /// No final reply in time
    Timeout,
    /// Modem answered `ERROR` or `FAIL`
    Rejected,
    /// Command did not fit the command buffer
    CommandTooLong,
}

impl fmt::Display for EspError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EspError::Uart => f.write_str("modem UART error"),
            EspError::Timeout => f.write_str("modem timed out"),
            EspError::Rejected => f.write_str("modem rejected command"),
            EspError::CommandTooLong => f.write_str("AT command too long"),
        }
    }
}

impl embedded_io::Error for EspError {
    fn kind(&self) -> ErrorKind {
        match self {
            EspError::Timeout => ErrorKind::TimedOut,
            EspError::Rejected => ErrorKind::ConnectionRefused,
            EspError::CommandTooLong => ErrorKind::InvalidInput,
            EspError::Uart => ErrorKind::Other,
        }
    }
}

impl From<EspError> for FetchError {
    fn from(err: EspError) -> Self {
        match err {
            EspError::Timeout => FetchError::Timeout,
            EspError::Rejected => FetchError::Connect,
            EspError::Uart | EspError::CommandTooLong => FetchError::Io,
        }
    }
}

/// Quotes a string argument of an AT command
///
/// `"`, `,` and `\` are escaped with a backslash.
pub struct AtQuoted<'a>(pub &'a str);

impl fmt::Display for AtQuoted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char('"')?;
        for ch in self.0.chars() {
            if matches!(ch, '"' | ',' | '\\') {
                f.write_char('\\')?;
            }
            f.write_char(ch)?;
        }
        f.write_char('"')
    }
}

/// How a reply line ends a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reply {
    Ok,
    Failed,
    Other,
}

fn classify(line: &[u8]) -> Reply {
    match line {
        b"OK" | b"SEND OK" => Reply::Ok,
        b"ERROR" | b"FAIL" | b"SEND FAIL" => Reply::Failed,
        _ => Reply::Other,
    }
}

/// ESP8266 modem on a UART
pub struct EspAt<U, D> {
    uart: U,
    delay: D,
    config: EspAtConfig,
}

impl<U, D> EspAt<U, D>
where
    U: Read + Write + ReadReady,
    D: DelayNs,
{
    pub fn new(uart: U, delay: D, config: EspAtConfig) -> Self {
        Self { uart, delay, config }
    }

    pub fn config(&self) -> &EspAtConfig {
        &self.config
    }

    pub fn release(self) -> (U, D) {
        (self.uart, self.delay)
    }

    /// Probe the modem and put it in station mode
    pub fn init(&mut self) -> Result<(), EspError> {
        let timeout = self.config.command_timeout_ms;
        self.command(format_args!("AT"), timeout)?;
        self.command(format_args!("ATE0"), timeout)?;
        self.command(format_args!("AT+CWMODE=1"), timeout)?;

        #[cfg(feature = "defmt")]
        defmt::debug!("ESP-AT modem ready");

        Ok(())
    }

    /// Join a Wi-Fi access point
    pub fn join(&mut self, ssid: &str, password: &str) -> Result<(), EspError> {
        #[cfg(feature = "defmt")]
        defmt::info!("joining {}", ssid);

        self.command(
            format_args!("AT+CWJAP={},{}", AtQuoted(ssid), AtQuoted(password)),
            self.config.join_timeout_ms,
        )
    }

    /// Wait for one byte, counting down `remaining_ms`
    fn read_byte(&mut self, remaining_ms: &mut u32) -> Result<u8, EspError> {
        loop {
            if self.uart.read_ready().map_err(|_| EspError::Uart)? {
                let mut byte = [0u8; 1];
                if self.uart.read(&mut byte).map_err(|_| EspError::Uart)? == 1 {
                    return Ok(byte[0]);
                }
            }
            if *remaining_ms == 0 {
                return Err(EspError::Timeout);
            }
            self.delay.delay_ms(1);
            *remaining_ms -= 1;
        }
    }

    /// Read one reply line, without CR/LF
    fn read_line(&mut self, remaining_ms: &mut u32) -> Result<Vec<u8, REPLY_LEN>, EspError> {
        let mut line = Vec::new();
        loop {
            match self.read_byte(remaining_ms)? {
                b'\n' => return Ok(line),
                b'\r' => {}
                byte => {
                    let _ = line.push(byte);
                }
            }
        }
    }

    /// Throw away anything left in the receive buffer
    fn drain(&mut self) -> Result<(), EspError> {
        let mut scratch = [0u8; 16];
        while self.uart.read_ready().map_err(|_| EspError::Uart)? {
            if self.uart.read(&mut scratch).map_err(|_| EspError::Uart)? == 0 {
                break;
            }
        }
        Ok(())
    }

    fn send(&mut self, bytes: &[u8]) -> Result<(), EspError> {
        self.uart.write_all(bytes).map_err(|_| EspError::Uart)?;
        self.uart.flush().map_err(|_| EspError::Uart)
    }

    /// Send a command line and wait for its final reply
    fn command(&mut self, args: fmt::Arguments<'_>, timeout_ms: u32) -> Result<(), EspError> {
        let mut line: String<COMMAND_LEN> = String::new();
        line.write_fmt(args)
            .and_then(|_| line.write_str("\r\n"))
            .map_err(|_| EspError::CommandTooLong)?;

        self.drain()?;
        self.send(line.as_bytes())?;

        let mut remaining = timeout_ms;
        loop {
            let reply = self.read_line(&mut remaining)?;
            match classify(&reply) {
                Reply::Ok => return Ok(()),
                Reply::Failed => {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("{=str} failed", line.trim_end());
                    return Err(EspError::Rejected);
                }
                Reply::Other => {}
            }
        }
    }

    /// Wait for the `>` passthrough prompt
    fn wait_prompt(&mut self) -> Result<(), EspError> {
        let mut remaining = self.config.command_timeout_ms;
        while self.read_byte(&mut remaining)? != b'>' {}
        Ok(())
    }

    /// Open a TCP connection in passthrough mode
    ///
    /// If the link comes up but passthrough cannot be entered, the link is
    /// closed again before the error is returned.
    pub fn open(&mut self, host: &str, port: u16) -> Result<EspSocket<'_, U, D>, EspError> {
        self.command(
            format_args!("AT+CIPSTART=\"TCP\",{},{}", AtQuoted(host), port),
            self.config.connect_timeout_ms,
        )?;

        let timeout = self.config.command_timeout_ms;
        let mut escape = false;
        let entered = match self
            .command(format_args!("AT+CIPMODE=1"), timeout)
            .and_then(|()| self.command(format_args!("AT+CIPSEND"), timeout))
        {
            Ok(()) => {
                // The modem may switch to passthrough without a visible prompt
                escape = true;
                self.wait_prompt()
            }
            Err(err) => Err(err),
        };

        if let Err(err) = entered {
            #[cfg(feature = "defmt")]
            defmt::warn!("passthrough to {} failed: {}, closing", host, err);
            // Best effort; the setup error is what the caller needs
            let _ = self.close_connection(escape);
            return Err(err);
        }

        #[cfg(feature = "defmt")]
        defmt::trace!("connected to {}:{}", host, port);

        Ok(EspSocket { modem: self })
    }

    /// Drop the connection
    ///
    /// With `escape` set, passthrough is left with `+++` first. Every step is
    /// attempted even when an earlier one fails; the first error is
    /// returned.
    fn close_connection(&mut self, escape: bool) -> Result<(), EspError> {
        let escaped = if escape {
            let guard = self.config.guard_time_ms;
            self.delay.delay_ms(guard);
            let sent = self.send(b"+++");
            self.delay.delay_ms(guard);
            sent
        } else {
            Ok(())
        };

        let timeout = self.config.command_timeout_ms;
        let mode = self.command(format_args!("AT+CIPMODE=0"), timeout);
        let closed = match self.command(format_args!("AT+CIPCLOSE"), timeout) {
            // ERROR when the peer already closed
            Ok(()) | Err(EspError::Rejected) => Ok(()),
            Err(err) => Err(err),
        };

        escaped.and(mode).and(closed)
    }
}

/// Passthrough connection borrowed from the modem
pub struct EspSocket<'m, U, D> {
    modem: &'m mut EspAt<U, D>,
}

impl<U, D> ErrorType for EspSocket<'_, U, D> {
    type Error = EspError;
}

impl<U, D> Read for EspSocket<'_, U, D>
where
    U: Read + Write + ReadReady,
    D: DelayNs,
{
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, EspError> {
        if buf.is_empty() {
            return Ok(0);
        }

        let mut remaining = self.modem.config.read_timeout_ms;
        loop {
            if self.modem.uart.read_ready().map_err(|_| EspError::Uart)? {
                return self.modem.uart.read(buf).map_err(|_| EspError::Uart);
            }
            if remaining == 0 {
                // Idle line: treat as end of stream
                return Ok(0);
            }
            self.modem.delay.delay_ms(1);
            remaining -= 1;
        }
    }
}

impl<U, D> Write for EspSocket<'_, U, D>
where
    U: Read + Write + ReadReady,
    D: DelayNs,
{
    fn write(&mut self, buf: &[u8]) -> Result<usize, EspError> {
        self.modem.uart.write(buf).map_err(|_| EspError::Uart)
    }

    fn flush(&mut self) -> Result<(), EspError> {
        self.modem.uart.flush().map_err(|_| EspError::Uart)
    }
}

impl<U, D> Connection for EspSocket<'_, U, D>
where
    U: Read + Write + ReadReady,
    D: DelayNs,
{
    fn close(self) -> Result<(), FetchError> {
        self.modem.close_connection(true).map_err(FetchError::from)
    }
}

impl<U, D> Connector for EspAt<U, D>
where
    U: Read + Write + ReadReady,
    D: DelayNs,
{
    type Socket<'a>
        = EspSocket<'a, U, D>
    where
        Self: 'a;

    fn connect(&mut self, host: &str, port: u16) -> Result<EspSocket<'_, U, D>, FetchError> {
        self.open(host, port).map_err(|err| {
            #[cfg(feature = "defmt")]
            defmt::warn!("connect to {} failed: {}", host, err);
            FetchError::from(err)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::fmt::Write as _;

    /// Scripted modem: each AT command written gets the next canned reply
    struct FakeUart {
        script: &'static [(&'static str, &'static str)],
        step: usize,
        rx: Vec<u8, 512>,
        rx_pos: usize,
        /// Bytes written while in passthrough
        payload: Vec<u8, 256>,
    }

    impl FakeUart {
        fn new(script: &'static [(&'static str, &'static str)]) -> Self {
            Self {
                script,
                step: 0,
                rx: Vec::new(),
                rx_pos: 0,
                payload: Vec::new(),
            }
        }

        fn queue(&mut self, bytes: &[u8]) {
            self.rx.extend_from_slice(bytes).unwrap();
        }

        fn finished(&self) -> bool {
            self.step == self.script.len()
        }
    }

    impl ErrorType for FakeUart {
        type Error = ErrorKind;
    }

    impl Read for FakeUart {
        fn read(&mut self, buf: &mut [u8]) -> Result<usize, ErrorKind> {
            let rest = &self.rx[self.rx_pos..];
            let n = rest.len().min(buf.len());
            buf[..n].copy_from_slice(&rest[..n]);
            self.rx_pos += n;
            Ok(n)
        }
    }

    impl ReadReady for FakeUart {
        fn read_ready(&mut self) -> Result<bool, ErrorKind> {
            Ok(self.rx_pos < self.rx.len())
        }
    }

    impl Write for FakeUart {
        fn write(&mut self, buf: &[u8]) -> Result<usize, ErrorKind> {
            let text = core::str::from_utf8(buf).unwrap();
            if text.starts_with("AT") || text == "+++" {
                let (expected, reply) = self.script[self.step];
                assert_eq!(text.trim_end(), expected);
                self.step += 1;
                self.queue(reply.as_bytes());
            } else {
                self.payload.extend_from_slice(buf).unwrap();
            }
            Ok(buf.len())
        }

        fn flush(&mut self) -> Result<(), ErrorKind> {
            Ok(())
        }
    }

    struct NoDelay;

    impl DelayNs for NoDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    fn modem(script: &'static [(&'static str, &'static str)]) -> EspAt<FakeUart, NoDelay> {
        let config = EspAtConfig {
            read_timeout_ms: 5,
            ..EspAtConfig::default()
        };
        EspAt::new(FakeUart::new(script), NoDelay, config)
    }

    #[test]
    fn test_init_and_join() {
        static SCRIPT: &[(&str, &str)] = &[
            ("AT", "AT\r\r\n\r\nOK\r\n"),
            ("ATE0", "ATE0\r\r\n\r\nOK\r\n"),
            ("AT+CWMODE=1", "\r\nOK\r\n"),
            (
                "AT+CWJAP=\"home\\,net\",\"p\\\"w\"",
                "WIFI CONNECTED\r\nWIFI GOT IP\r\n\r\nOK\r\n",
            ),
        ];
        let mut esp = modem(SCRIPT);

        esp.init().unwrap();
        esp.join("home,net", "p\"w").unwrap();

        let (uart, _) = esp.release();
        assert!(uart.finished());
    }

    #[test]
    fn test_join_failure() {
        static SCRIPT: &[(&str, &str)] = &[(
            "AT+CWJAP=\"home\",\"wrong\"",
            "+CWJAP:1\r\n\r\nFAIL\r\n",
        )];
        let mut esp = modem(SCRIPT);
        assert_eq!(esp.join("home", "wrong"), Err(EspError::Rejected));
    }

    #[test]
    fn test_silent_modem_times_out() {
        static SCRIPT: &[(&str, &str)] = &[("AT", "")];
        let mut esp = modem(SCRIPT);
        assert_eq!(esp.init(), Err(EspError::Timeout));
    }

    #[test]
    fn test_passthrough_session() {
        static SCRIPT: &[(&str, &str)] = &[
            (
                "AT+CIPSTART=\"TCP\",\"download.finance.yahoo.com\",80",
                "CONNECT\r\n\r\nOK\r\n",
            ),
            ("AT+CIPMODE=1", "\r\nOK\r\n"),
            ("AT+CIPSEND", "\r\nOK\r\n\r\n>HTTP/1.0 200 OK\r\n"),
            ("+++", ""),
            ("AT+CIPMODE=0", "\r\nOK\r\n"),
            ("AT+CIPCLOSE", "CLOSED\r\n\r\nOK\r\n"),
        ];
        let mut esp = modem(SCRIPT);

        let mut socket = esp.connect("download.finance.yahoo.com", 80).unwrap();
        socket.write_all(b"GET / HTTP/1.0\r\n\r\n").unwrap();

        let mut buf = [0u8; 64];
        let n = socket.read(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"HTTP/1.0 200 OK\r\n");
        // Idle line reads as end of stream
        assert_eq!(socket.read(&mut buf).unwrap(), 0);

        socket.close().unwrap();

        let (uart, _) = esp.release();
        assert!(uart.finished());
        assert_eq!(uart.payload.as_slice(), b"GET / HTTP/1.0\r\n\r\n");
    }

    #[test]
    fn test_close_after_peer_closed() {
        static SCRIPT: &[(&str, &str)] = &[
            ("AT+CIPSTART=\"TCP\",\"h\",80", "CONNECT\r\n\r\nOK\r\n"),
            ("AT+CIPMODE=1", "OK\r\n"),
            ("AT+CIPSEND", "OK\r\n>"),
            ("+++", ""),
            ("AT+CIPMODE=0", "OK\r\n"),
            ("AT+CIPCLOSE", "ERROR\r\n"),
        ];
        let mut esp = modem(SCRIPT);
        let socket = esp.connect("h", 80).unwrap();
        assert_eq!(socket.close(), Ok(()));
    }

    #[test]
    fn test_failed_passthrough_setup_closes_link() {
        static SCRIPT: &[(&str, &str)] = &[
            ("AT+CIPSTART=\"TCP\",\"h\",80", "CONNECT\r\n\r\nOK\r\n"),
            ("AT+CIPMODE=1", "ERROR\r\n"),
            ("AT+CIPMODE=0", "OK\r\n"),
            ("AT+CIPCLOSE", "CLOSED\r\n\r\nOK\r\n"),
        ];
        let mut esp = modem(SCRIPT);
        assert_eq!(esp.connect("h", 80).err(), Some(FetchError::Connect));

        let (uart, _) = esp.release();
        assert!(uart.finished());
    }

    #[test]
    fn test_missing_prompt_escapes_and_closes() {
        static SCRIPT: &[(&str, &str)] = &[
            ("AT+CIPSTART=\"TCP\",\"h\",80", "CONNECT\r\n\r\nOK\r\n"),
            ("AT+CIPMODE=1", "OK\r\n"),
            ("AT+CIPSEND", "OK\r\n"),
            ("+++", ""),
            ("AT+CIPMODE=0", "OK\r\n"),
            ("AT+CIPCLOSE", "OK\r\n"),
        ];
        let mut esp = modem(SCRIPT);
        assert_eq!(esp.connect("h", 80).err(), Some(FetchError::Timeout));

        let (uart, _) = esp.release();
        assert!(uart.finished());
    }

    #[test]
    fn test_close_still_sent_when_mode_reset_fails() {
        static SCRIPT: &[(&str, &str)] = &[
            ("AT+CIPSTART=\"TCP\",\"h\",80", "CONNECT\r\n\r\nOK\r\n"),
            ("AT+CIPMODE=1", "OK\r\n"),
            ("AT+CIPSEND", "OK\r\n>"),
            ("+++", ""),
            ("AT+CIPMODE=0", "ERROR\r\n"),
            ("AT+CIPCLOSE", "CLOSED\r\n\r\nOK\r\n"),
        ];
        let mut esp = modem(SCRIPT);
        let socket = esp.connect("h", 80).unwrap();
        assert_eq!(socket.close(), Err(FetchError::Connect));

        let (uart, _) = esp.release();
        assert!(uart.finished());
    }

    #[test]
    fn test_connect_refused() {
        static SCRIPT: &[(&str, &str)] = &[(
            "AT+CIPSTART=\"TCP\",\"h\",80",
            "ERROR\r\nCLOSED\r\n",
        )];
        let mut esp = modem(SCRIPT);
        assert_eq!(esp.connect("h", 80).err(), Some(FetchError::Connect));
    }

    #[test]
    fn test_at_quoting() {
        let mut out: String<32> = String::new();
        write!(out, "{}", AtQuoted("a\"b,c\\d")).unwrap();
        assert_eq!(out.as_str(), "\"a\\\"b\\,c\\\\d\"");
    }
}
