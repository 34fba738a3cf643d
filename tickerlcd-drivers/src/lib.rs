//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in tickerlcd-core and tickerlcd-display:
//!
//! - RGB LCD shield (MCP23017 expander, HD44780 LCD, five buttons)
//! - HTTP quote client over a pluggable TCP connector
//! - ESP8266 AT-command Wi-Fi modem as the TCP connector

#![no_std]
#![deny(unsafe_code)]

pub mod lcd;
pub mod net;
