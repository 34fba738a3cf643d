//! tickerlcd - Stock Ticker Firmware
//!
//! Main firmware binary for an RP2040 with an Adafruit RGB LCD shield on
//! I2C0 and an ESP8266 Wi-Fi modem on UART0.
//!
//! Quotes are fetched over plain HTTP every few minutes. The buttons page
//! through them and the backlight shows which way the selected one moved.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::i2c::{Config as I2cConfig, I2c};
use embassy_rp::peripherals::UART0;
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use embassy_time::{Delay, Timer};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use tickerlcd_core::traits::{ButtonSource, CharDisplay};
use tickerlcd_core::Controller;
use tickerlcd_drivers::lcd::RgbLcdShield;
use tickerlcd_drivers::net::{EspAt, EspAtConfig, HttpQuoteClient};

use crate::clock::UptimeClock;
use crate::config::{
    BACKLIGHT, FIELD_LAYOUT, QUOTE_HOST, QUOTE_PORT, SYMBOLS, TIMING, WIFI_PASSWORD, WIFI_SSID,
};

mod clock;
mod config;

/// Main loop period; buttons are sampled this often
const POLL_INTERVAL_MS: u64 = 50;

/// Wait between modem setup attempts
const NETWORK_RETRY_MS: u64 = 5_000;

/// Wait between display init attempts
const DISPLAY_RETRY_MS: u64 = 1_000;

/// ESP8266 stock AT firmware baud rate
const MODEM_BAUD: u32 = 115_200;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 512]> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("tickerlcd firmware starting...");

    // Initialize RP2040 peripherals
    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    // RGB LCD shield on I2C0 (SDA=GPIO4, SCL=GPIO5)
    let i2c = I2c::new_blocking(p.I2C0, p.PIN_5, p.PIN_4, I2cConfig::default());
    let mut lcd = RgbLcdShield::new(i2c, Delay);
    while let Err(e) = lcd.init() {
        error!("LCD init failed: {}", e);
        Timer::after_millis(DISPLAY_RETRY_MS).await;
    }
    info!("LCD shield initialized");

    // Symbols were validated by build.rs
    let mut controller = match Controller::new(&SYMBOLS, TIMING, BACKLIGHT, FIELD_LAYOUT) {
        Ok(controller) => controller,
        Err(e) => panic!("invalid symbol table: {}", e),
    };
    if let Err(e) = controller.start(&mut lcd) {
        warn!("Boot banner failed: {}", e);
    }

    // ESP8266 on UART0 (TX=GPIO0, RX=GPIO1)
    let mut uart_config = UartConfig::default();
    uart_config.baudrate = MODEM_BAUD;

    let tx_buf = TX_BUF.init([0u8; 256]);
    let rx_buf = RX_BUF.init([0u8; 512]);

    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config);
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    info!("UART initialized for modem");

    let mut modem = EspAt::new(uart, Delay, EspAtConfig::default());

    show_status(&mut controller, &mut lcd, "Joining Wi-Fi");
    loop {
        match modem.init().and_then(|()| modem.join(WIFI_SSID, WIFI_PASSWORD)) {
            Ok(()) => break,
            Err(e) => {
                warn!("Wi-Fi setup failed: {}, retrying", e);
                show_status(&mut controller, &mut lcd, "Wi-Fi failed");
                Timer::after_millis(NETWORK_RETRY_MS).await;
                show_status(&mut controller, &mut lcd, "Joining Wi-Fi");
            }
        }
    }
    info!("Wi-Fi joined, quotes from {}:{}", QUOTE_HOST, QUOTE_PORT);
    show_status(&mut controller, &mut lcd, "Wi-Fi connected");

    let mut quotes = HttpQuoteClient::new(modem, QUOTE_HOST, QUOTE_PORT);
    let clock = UptimeClock;

    loop {
        // One bus read per iteration, replayed to the controller
        let mut held = match lcd.read_buttons() {
            Ok(held) => held,
            Err(e) => {
                warn!("Button read failed: {}", e);
                Default::default()
            }
        };

        match controller.poll(&mut lcd, &mut held, &mut quotes, &clock) {
            Ok(Some(report)) => {
                info!(
                    "Fetch cycle: {} updated, {} failed",
                    report.updated, report.failed
                );
                if let Some((index, e)) = report.first_error {
                    warn!("First failure at slot {}: {}", index, e);
                }
            }
            Ok(None) => {}
            Err(e) => error!("Display error: {}", e),
        }

        Timer::after_millis(POLL_INTERVAL_MS).await;
    }
}

/// Change the boot banner status, logging display errors
fn show_status<const N: usize, D: CharDisplay>(
    controller: &mut Controller<N>,
    lcd: &mut D,
    status: &'static str,
) {
    if let Err(e) = controller.show_banner(lcd, status) {
        warn!("Banner '{}' failed: {}", status, e);
    }
}
