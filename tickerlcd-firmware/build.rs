//! Build script for tickerlcd-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates quotes.toml at compile time
//! - Generates `$OUT_DIR/quotes.rs` with the configuration constants

use std::collections::HashSet;
use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tickerlcd_core::config::{BacklightScheme, SymbolConfig, TimingConfig};

/// Most symbols the firmware will cycle through
const MAX_SYMBOLS: usize = 16;

fn main() {
    setup_linker();
    let config = load_config();
    validate_config(&config);
    generate_config(&config);
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    #[cfg(feature = "defmt")]
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct QuotesFile {
    #[serde(rename = "symbol", default)]
    symbols: Vec<SymbolEntry>,
    #[serde(default)]
    timing: TimingConfig,
    #[serde(default)]
    backlight: BacklightScheme,
    #[serde(default)]
    server: ServerEntry,
    wifi: WifiEntry,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SymbolEntry {
    #[serde(default)]
    name: String,
    symbol: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, default)]
struct ServerEntry {
    host: String,
    port: u16,
    layout: String,
}

impl Default for ServerEntry {
    fn default() -> Self {
        Self {
            host: "download.finance.yahoo.com".to_string(),
            port: 80,
            layout: "default".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct WifiEntry {
    ssid: String,
    password: String,
}

/// Print a boxed error report and abort the build
fn fail(title: &str, body: &str) -> ! {
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  {:<64}║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title, body
    );
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.chars().count() > 64 {
                format!("{}...", line.chars().take(61).collect::<String>())
            } else {
                line.to_string()
            };
            format!("║  {:<64}║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Read and parse quotes.toml
fn load_config() -> QuotesFile {
    // Re-run if quotes.toml changes
    println!("cargo:rerun-if-changed=quotes.toml");

    let config_path = Path::new("quotes.toml");

    if !config_path.exists() {
        fail(
            "ERROR: quotes.toml not found!",
            &format_error_lines(
                "The firmware requires a quotes.toml configuration file.\n\
                 Please create one in the tickerlcd-firmware directory.",
            ),
        );
    }

    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => fail(
            "ERROR: Failed to read quotes.toml",
            &format_error_lines(&e.to_string()),
        ),
    };

    match toml::from_str(&content) {
        Ok(config) => config,
        Err(e) => fail(
            "ERROR: Invalid quotes.toml",
            &format_error_lines(&e.to_string()),
        ),
    }
}

/// Check every value against what the firmware can hold and display
fn validate_config(config: &QuotesFile) {
    let mut errors = Vec::new();

    if config.symbols.is_empty() {
        errors.push("Missing [[symbol]] entries - at least one is required".to_string());
    }
    if config.symbols.len() > MAX_SYMBOLS {
        errors.push(format!("At most {} [[symbol]] entries are supported", MAX_SYMBOLS));
    }

    let mut seen = HashSet::new();
    for (i, entry) in config.symbols.iter().enumerate() {
        if let Err(e) = SymbolConfig::new(&entry.name, &entry.symbol).validate() {
            errors.push(format!("[[symbol]] {} ('{}'): {}", i, entry.symbol, e));
        }
        if !entry.name.is_ascii() || !entry.symbol.is_ascii() {
            errors.push(format!("[[symbol]] {} must be plain ASCII", i));
        }
        if entry.symbol.contains(char::is_whitespace) {
            errors.push(format!("[[symbol]] {} symbol contains whitespace", i));
        }
        if !seen.insert(entry.symbol.to_ascii_uppercase()) {
            errors.push(format!("[[symbol]] {} duplicates '{}'", i, entry.symbol));
        }
    }

    if config.timing.fetch_interval_ms == 0 {
        errors.push("[timing] fetch_interval_ms must be > 0".to_string());
    }

    if config.server.host.is_empty() {
        errors.push("[server] host cannot be empty".to_string());
    }
    if config.server.port == 0 {
        errors.push("[server] port must be 1-65535".to_string());
    }
    if layout_const(&config.server.layout).is_none() {
        errors.push(format!(
            "[server] unknown layout '{}' (use 'default' or 'sl1d1t1c1ohgv')",
            config.server.layout
        ));
    }

    if config.wifi.ssid.is_empty() || config.wifi.ssid.len() > 32 {
        errors.push("[wifi] ssid must be 1-32 bytes".to_string());
    }
    if config.wifi.password.len() > 64 {
        errors.push("[wifi] password must be at most 64 bytes".to_string());
    }

    if !errors.is_empty() {
        fail(
            "ERROR: Invalid configuration in quotes.toml",
            &errors
                .iter()
                .map(|e| format_error_lines(&format!("• {}", e)))
                .collect::<Vec<_>>()
                .join("\n"),
        );
    }

    println!("cargo:warning=quotes.toml validated successfully");
}

fn layout_const(layout: &str) -> Option<&'static str> {
    match layout {
        "default" | "t1l1c1ohgv" => Some("FieldLayout::DEFAULT"),
        "sl1d1t1c1ohgv" => Some("FieldLayout::YAHOO_SL1D1T1C1OHGV"),
        _ => None,
    }
}

/// Write the validated configuration as Rust constants
fn generate_config(config: &QuotesFile) {
    let mut out = String::new();
    out.push_str("// Generated by build.rs from quotes.toml. Do not edit.\n\n");

    out.push_str(&format!(
        "pub const SYMBOL_COUNT: usize = {};\n\n",
        config.symbols.len()
    ));
    out.push_str("pub const SYMBOLS: [SymbolConfig<'static>; SYMBOL_COUNT] = [\n");
    for entry in &config.symbols {
        out.push_str(&format!(
            "    SymbolConfig::new({:?}, {:?}),\n",
            entry.name, entry.symbol
        ));
    }
    out.push_str("];\n\n");

    out.push_str(&format!(
        "pub const TIMING: TimingConfig = TimingConfig::new({}, {});\n\n",
        config.timing.fetch_interval_ms, config.timing.quiet_period_ms
    ));

    let scheme = &config.backlight;
    out.push_str(&format!(
        "pub const BACKLIGHT: BacklightScheme = BacklightScheme {{\n    \
         initializing: Backlight::{:?},\n    \
         updating: Backlight::{:?},\n    \
         up: Backlight::{:?},\n    \
         down: Backlight::{:?},\n}};\n\n",
        scheme.initializing, scheme.updating, scheme.up, scheme.down
    ));

    // Validated above
    let layout = layout_const(&config.server.layout).unwrap_or("FieldLayout::DEFAULT");
    out.push_str(&format!("pub const FIELD_LAYOUT: FieldLayout = {};\n", layout));
    out.push_str(&format!(
        "pub const QUOTE_HOST: &str = {:?};\n",
        config.server.host
    ));
    out.push_str(&format!("pub const QUOTE_PORT: u16 = {};\n\n", config.server.port));

    out.push_str(&format!("pub const WIFI_SSID: &str = {:?};\n", config.wifi.ssid));
    out.push_str(&format!(
        "pub const WIFI_PASSWORD: &str = {:?};\n",
        config.wifi.password
    ));

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    fs::write(out_dir.join("quotes.rs"), out).unwrap();
}
