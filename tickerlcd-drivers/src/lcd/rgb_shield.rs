//! RGB LCD shield driver (MCP23017 + HD44780)
//!
//! The shield puts a 16x2 HD44780 character LCD, an RGB backlight and five
//! push buttons behind a single MCP23017 I2C port expander. The LCD runs in
//! 4-bit mode; every nibble is clocked out by toggling EN through the
//! expander's output latch.
//!
//! # Pin Map
//!
//! | Port A | Function       | Port B | Function |
//! |--------|----------------|--------|----------|
//! | GPA0   | SELECT button  | GPB0   | blue LED |
//! | GPA1   | RIGHT button   | GPB1   | LCD D7   |
//! | GPA2   | DOWN button    | GPB2   | LCD D6   |
//! | GPA3   | UP button      | GPB3   | LCD D5   |
//! | GPA4   | LEFT button    | GPB4   | LCD D4   |
//! | GPA6   | red LED        | GPB5   | LCD EN   |
//! | GPA7   | green LED      | GPB6   | LCD RW   |
//! |        |                | GPB7   | LCD RS   |
//!
//! Buttons pull to ground when pressed; the LEDs are lit by driving their
//! pin low.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use tickerlcd_display::{Backlight, ButtonSource, Buttons, CharDisplay, DisplayError, Glyph};

/// Default 7-bit I2C address (A0..A2 strapped low)
pub const DEFAULT_ADDRESS: u8 = 0x20;

/// MCP23017 register addresses (IOCON.BANK = 0)
pub mod reg {
    /// Port A direction (1 = input)
    pub const IODIRA: u8 = 0x00;
    /// Port B direction (1 = input)
    pub const IODIRB: u8 = 0x01;
    /// Port A pull-ups
    pub const GPPUA: u8 = 0x0C;
    /// Port B pull-ups
    pub const GPPUB: u8 = 0x0D;
    /// Port A input level
    pub const GPIOA: u8 = 0x12;
    /// Port B input level
    pub const GPIOB: u8 = 0x13;
    /// Port A output latch
    pub const OLATA: u8 = 0x14;
    /// Port B output latch
    pub const OLATB: u8 = 0x15;
}

/// Expander bit positions
pub mod pin {
    pub const RED: u8 = 6;
    pub const GREEN: u8 = 7;
    pub const BLUE: u8 = 0;
    pub const D7: u8 = 1;
    pub const D6: u8 = 2;
    pub const D5: u8 = 3;
    pub const D4: u8 = 4;
    pub const EN: u8 = 5;
    pub const RW: u8 = 6;
    pub const RS: u8 = 7;
}

/// HD44780 instructions
pub mod cmd {
    pub const CLEAR: u8 = 0x01;
    /// Increment address, no display shift
    pub const ENTRY_MODE: u8 = 0x06;
    /// Display on, cursor off, blink off
    pub const DISPLAY_ON: u8 = 0x0C;
    /// 4-bit bus, 2 lines, 5x8 font
    pub const FUNCTION_SET: u8 = 0x28;
    pub const SET_CGRAM: u8 = 0x40;
    pub const SET_DDRAM: u8 = 0x80;
}

/// Button inputs on port A
const BUTTON_MASK: u8 = 0x1F;

/// DDRAM address of the first column of each row
const ROW_OFFSETS: [u8; 2] = [0x00, 0x40];

const COLS: u8 = 16;
const ROWS: u8 = 2;

/// Port B bits for the LCD data lines carrying `nibble`
///
/// The shield wires D4..D7 to GPB4..GPB1, in reverse bit order.
pub const fn nibble_bits(nibble: u8) -> u8 {
    let mut bits = 0;
    if nibble & 0x01 != 0 {
        bits |= 1 << pin::D4;
    }
    if nibble & 0x02 != 0 {
        bits |= 1 << pin::D5;
    }
    if nibble & 0x04 != 0 {
        bits |= 1 << pin::D6;
    }
    if nibble & 0x08 != 0 {
        bits |= 1 << pin::D7;
    }
    bits
}

/// Map a character to the LCD's character ROM
///
/// Glyph slots `'\u{0}'..='\u{7}'` and printable ASCII pass through;
/// anything else shows as `?`.
fn rom_code(ch: char) -> u8 {
    match ch {
        '\u{0}'..='\u{7}' | ' '..='}' => ch as u8,
        _ => b'?',
    }
}

/// Adafruit-style RGB LCD shield
pub struct RgbLcdShield<I2C, D> {
    i2c: I2C,
    delay: D,
    address: u8,
    /// Shadow of OLATA (backlight red/green)
    port_a: u8,
    /// Shadow of OLATB (LCD bus, backlight blue)
    port_b: u8,
    initialized: bool,
}

impl<I2C: I2c, D: DelayNs> RgbLcdShield<I2C, D> {
    /// Create a driver at the default address
    pub fn new(i2c: I2C, delay: D) -> Self {
        Self::with_address(i2c, delay, DEFAULT_ADDRESS)
    }

    pub fn with_address(i2c: I2C, delay: D, address: u8) -> Self {
        Self {
            i2c,
            delay,
            address,
            // LEDs off (active low)
            port_a: (1 << pin::RED) | (1 << pin::GREEN),
            port_b: 1 << pin::BLUE,
            initialized: false,
        }
    }

    /// Give back the bus and delay
    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Configure the expander and bring the LCD up in 4-bit mode
    pub fn init(&mut self) -> Result<(), DisplayError> {
        self.write_reg(reg::IODIRA, BUTTON_MASK)?;
        self.write_reg(reg::GPPUA, BUTTON_MASK)?;
        self.write_reg(reg::IODIRB, 0x00)?;
        self.write_reg(reg::GPPUB, 0x00)?;
        self.write_reg(reg::OLATA, self.port_a)?;
        self.write_reg(reg::OLATB, self.port_b)?;

        // Power-on wait, then the 8-bit -> 4-bit handshake
        self.delay.delay_ms(50);
        self.write_nibble(false, 0x03)?;
        self.delay.delay_ms(5);
        self.write_nibble(false, 0x03)?;
        self.delay.delay_us(150);
        self.write_nibble(false, 0x03)?;
        self.write_nibble(false, 0x02)?;

        self.command(cmd::FUNCTION_SET)?;
        self.command(cmd::DISPLAY_ON)?;
        self.command(cmd::CLEAR)?;
        self.delay.delay_ms(2);
        self.command(cmd::ENTRY_MODE)?;

        self.initialized = true;

        #[cfg(feature = "defmt")]
        defmt::debug!("LCD shield initialized at {=u8:#x}", self.address);

        Ok(())
    }

    fn ensure_initialized(&self) -> Result<(), DisplayError> {
        if self.initialized {
            Ok(())
        } else {
            Err(DisplayError::NotInitialized)
        }
    }

    fn write_reg(&mut self, register: u8, value: u8) -> Result<(), DisplayError> {
        self.i2c
            .write(self.address, &[register, value])
            .map_err(|_| DisplayError::Communication)
    }

    fn read_reg(&mut self, register: u8) -> Result<u8, DisplayError> {
        let mut value = [0u8; 1];
        self.i2c
            .write_read(self.address, &[register], &mut value)
            .map_err(|_| DisplayError::Communication)?;
        Ok(value[0])
    }

    /// Clock one nibble into the LCD
    fn write_nibble(&mut self, rs: bool, nibble: u8) -> Result<(), DisplayError> {
        // Keep only the backlight bit; RW stays low (write)
        let mut bits = (self.port_b & (1 << pin::BLUE)) | nibble_bits(nibble);
        if rs {
            bits |= 1 << pin::RS;
        }

        self.write_reg(reg::OLATB, bits | (1 << pin::EN))?;
        self.write_reg(reg::OLATB, bits)?;
        self.port_b = bits;
        Ok(())
    }

    fn write_byte(&mut self, rs: bool, value: u8) -> Result<(), DisplayError> {
        self.write_nibble(rs, value >> 4)?;
        self.write_nibble(rs, value & 0x0F)?;
        // Execution time of most instructions
        self.delay.delay_us(40);
        Ok(())
    }

    fn command(&mut self, value: u8) -> Result<(), DisplayError> {
        self.write_byte(false, value)
    }

    fn data(&mut self, value: u8) -> Result<(), DisplayError> {
        self.write_byte(true, value)
    }

    /// Buttons currently held down
    pub fn buttons(&mut self) -> Result<Buttons, DisplayError> {
        let level = self.read_reg(reg::GPIOA)?;
        Ok(Buttons::from_bits(!level & BUTTON_MASK))
    }
}

impl<I2C: I2c, D: DelayNs> CharDisplay for RgbLcdShield<I2C, D> {
    fn clear(&mut self) -> Result<(), DisplayError> {
        self.ensure_initialized()?;
        self.command(cmd::CLEAR)?;
        self.delay.delay_ms(2);
        Ok(())
    }

    fn write_at(&mut self, row: u8, col: u8, text: &str) -> Result<(), DisplayError> {
        self.ensure_initialized()?;
        if row >= ROWS || col >= COLS {
            return Err(DisplayError::InvalidCoordinates);
        }

        self.command(cmd::SET_DDRAM | (ROW_OFFSETS[row as usize] + col))?;
        for ch in text.chars().take((COLS - col) as usize) {
            self.data(rom_code(ch))?;
        }
        Ok(())
    }

    fn define_glyph(&mut self, glyph: &Glyph) -> Result<(), DisplayError> {
        self.ensure_initialized()?;
        if glyph.slot >= 8 {
            return Err(DisplayError::InvalidCoordinates);
        }

        self.command(cmd::SET_CGRAM | (glyph.slot << 3))?;
        for row in glyph.rows {
            self.data(row & 0x1F)?;
        }
        Ok(())
    }

    fn set_backlight(&mut self, color: Backlight) -> Result<(), DisplayError> {
        let mut port_a = self.port_a | (1 << pin::RED) | (1 << pin::GREEN);
        let mut port_b = self.port_b | (1 << pin::BLUE);
        if color.red() {
            port_a &= !(1 << pin::RED);
        }
        if color.green() {
            port_a &= !(1 << pin::GREEN);
        }
        if color.blue() {
            port_b &= !(1 << pin::BLUE);
        }

        self.write_reg(reg::OLATA, port_a)?;
        self.write_reg(reg::OLATB, port_b)?;
        self.port_a = port_a;
        self.port_b = port_b;
        Ok(())
    }

    fn dimensions(&self) -> (u8, u8) {
        (COLS, ROWS)
    }
}

impl<I2C: I2c, D: DelayNs> ButtonSource for RgbLcdShield<I2C, D> {
    fn read_buttons(&mut self) -> Result<Buttons, DisplayError> {
        self.buttons()
    }
}
