//! Network transport for the quote service
//!
//! - [`http`]: HTTP/1.0 client implementing `QuoteSource` over any
//!   [`Connector`]
//! - [`esp_at`]: ESP8266 AT-command modem implementing [`Connector`]

pub mod esp_at;
pub mod http;

pub use esp_at::{EspAt, EspAtConfig, EspError, EspSocket};
pub use http::{Connection, Connector, HttpQuoteClient, DEFAULT_HOST, DEFAULT_PORT};
