//! Main controller
//!
//! The controller owns every piece of runtime state (quote store, cursor,
//! display mode, fetch timing, phase) and runs the main loop one iteration
//! at a time:
//!
//! 1. poll the buttons, move the cursor / toggle the mode
//! 2. if a fetch cycle is due, fetch every symbol (blocking)
//! 3. redraw the display if anything changed
//!
//! Hardware is passed in on every call, so the same controller runs against
//! the real LCD shield and modem or against in-memory fakes.

use heapless::String;
use tickerlcd_display::{Backlight, Screen, GLYPH_DOWN, GLYPH_UP};

use crate::config::{BacklightScheme, ConfigError, SymbolConfig, TimingConfig, MAX_SYMBOL_LEN};
use crate::input::{Cursor, DisplayMode, InputHandler};
use crate::quote::{parse_quote_line, FieldLayout, QuoteError, QuoteStore, QuoteUpdate, Trend};
use crate::render::{render_banner, render_quote, BANNER_LOADING};
use crate::scheduler::FetchScheduler;
use crate::state::{Event, Phase};
use crate::traits::{ButtonSource, CharDisplay, Clock, DisplayError, QuoteSource};

/// Size of the buffer one response line is read into
pub const RESPONSE_LINE_LEN: usize = 128;

/// Banner shown before the first fetch cycle starts
pub const DEFAULT_BANNER_STATUS: &str = "Starting up";

/// Outcome of one fetch cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CycleReport {
    /// Symbols whose record was overwritten
    pub updated: usize,
    /// Symbols left unchanged
    pub failed: usize,
    /// First failure in the cycle, with the record index
    pub first_error: Option<(usize, QuoteError)>,
}

impl CycleReport {
    fn record_failure(&mut self, index: usize, err: QuoteError) {
        self.failed += 1;
        if self.first_error.is_none() {
            self.first_error = Some((index, err));
        }
    }
}

/// Ticker controller for `N` symbols
pub struct Controller<const N: usize> {
    store: QuoteStore<N>,
    cursor: Cursor,
    mode: DisplayMode,
    input: InputHandler,
    scheduler: FetchScheduler,
    phase: Phase,
    layout: FieldLayout,
    scheme: BacklightScheme,
    banner_status: &'static str,
    /// Screen last written to the display
    shown: Option<Screen>,
    /// Backlight color last written to the display
    backlight: Option<Backlight>,
}

impl<const N: usize> Controller<N> {
    /// Create a controller for the configured symbols
    pub fn new(
        symbols: &[SymbolConfig<'_>; N],
        timing: TimingConfig,
        scheme: BacklightScheme,
        layout: FieldLayout,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            store: QuoteStore::new(symbols)?,
            cursor: Cursor::new(N),
            mode: DisplayMode::default(),
            input: InputHandler::new(),
            scheduler: FetchScheduler::new(timing),
            phase: Phase::Initializing,
            layout,
            scheme,
            banner_status: DEFAULT_BANNER_STATUS,
            shown: None,
            backlight: None,
        })
    }

    pub fn store(&self) -> &QuoteStore<N> {
        &self.store
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn scheduler(&self) -> &FetchScheduler {
        &self.scheduler
    }

    /// Prepare the display: upload glyphs, clear, show the boot banner
    pub fn start<D: CharDisplay + ?Sized>(&mut self, display: &mut D) -> Result<(), DisplayError> {
        display.define_glyph(&GLYPH_UP)?;
        display.define_glyph(&GLYPH_DOWN)?;
        display.clear()?;
        self.shown = None;
        self.backlight = None;
        self.refresh(display)
    }

    /// Change the boot banner text shown before the first fetch
    pub fn show_banner<D: CharDisplay + ?Sized>(
        &mut self,
        display: &mut D,
        status: &'static str,
    ) -> Result<(), DisplayError> {
        self.banner_status = status;
        self.refresh(display)
    }

    /// Run one main-loop iteration
    ///
    /// Returns the report of the fetch cycle if one ran.
    pub fn poll<D, B, Q, C>(
        &mut self,
        display: &mut D,
        buttons: &mut B,
        source: &mut Q,
        clock: &C,
    ) -> Result<Option<CycleReport>, DisplayError>
    where
        D: CharDisplay + ?Sized,
        B: ButtonSource + ?Sized,
        Q: QuoteSource + ?Sized,
        C: Clock + ?Sized,
    {
        let held = buttons.read_buttons()?;
        if self.input.handle(held, &mut self.cursor, &mut self.mode) {
            self.scheduler.record_input(clock.now_ms());
        }

        let report = if self.scheduler.is_due(clock.now_ms()) {
            Some(self.run_cycle(display, source, clock)?)
        } else {
            None
        };

        self.refresh(display)?;
        Ok(report)
    }

    /// Fetch every symbol once
    ///
    /// Failed symbols keep their previous values. The last-fetch time is
    /// recorded when the cycle ends, whatever the per-symbol results, and
    /// before any display error is returned.
    pub fn run_cycle<D, Q, C>(
        &mut self,
        display: &mut D,
        source: &mut Q,
        clock: &C,
    ) -> Result<CycleReport, DisplayError>
    where
        D: CharDisplay + ?Sized,
        Q: QuoteSource + ?Sized,
        C: Clock + ?Sized,
    {
        self.phase = self.phase.transition(Event::CycleStarted);
        let shown = self.refresh(display);

        let mut report = CycleReport::default();
        let mut buf = [0u8; RESPONSE_LINE_LEN];

        for index in 0..N {
            let symbol: String<MAX_SYMBOL_LEN> = match self.store.get(index) {
                Some(record) => String::try_from(record.symbol()).unwrap_or_default(),
                None => continue,
            };

            match self.fetch_one(source, &symbol, &mut buf) {
                Ok(update) => {
                    self.store.apply(index, &update);
                    report.updated += 1;
                }
                Err(err) => {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("{}: {}", symbol.as_str(), err);
                    report.record_failure(index, err);
                }
            }
        }

        self.scheduler.record_fetch(clock.now_ms());
        self.phase = self.phase.transition(Event::CycleFinished);

        shown?;
        self.refresh(display)?;
        Ok(report)
    }

    fn fetch_one<Q: QuoteSource + ?Sized>(
        &self,
        source: &mut Q,
        symbol: &str,
        buf: &mut [u8],
    ) -> Result<QuoteUpdate, QuoteError> {
        let line = source.fetch(symbol, self.layout.format, buf)?;
        Ok(parse_quote_line(line, symbol, &self.layout)?)
    }

    /// Redraw whatever changed since the last refresh
    pub fn refresh<D: CharDisplay + ?Sized>(&mut self, display: &mut D) -> Result<(), DisplayError> {
        let mut screen = Screen::new();
        let trend = match self.store.get(self.cursor.index()) {
            Some(record) if self.scheduler.has_fetched() => {
                render_quote(&mut screen, record, self.mode);
                record.trend()
            }
            _ => {
                let status = if self.phase.is_fetching() {
                    BANNER_LOADING
                } else {
                    self.banner_status
                };
                render_banner(&mut screen, status);
                Trend::Up
            }
        };

        if self.shown.as_ref() != Some(&screen) {
            screen.render_to(display)?;
            self.shown = Some(screen);
        }

        let color = self.phase.status(trend).color(&self.scheme);
        if self.backlight != Some(color) {
            display.set_backlight(color)?;
            self.backlight = Some(color);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use core::cell::Cell;

    use tickerlcd_display::screen::LINE_LEN;
    use tickerlcd_display::{Button, Buttons, Glyph};

    use super::*;
    use crate::config::DEFAULT_SYMBOLS;
    use crate::quote::ParseError;
    use crate::traits::FetchError;

    const MSFT: &str = "\"4:00pm\",28.50,-0.25,28.60,28.90,28.40,1000";
    const AAPL: &str = "\"4:00pm\",150.25,+2.10,148.90,150.80,148.50,31200455";
    const EURO: &str = "\"9:35am\",1.2840,+0.0030,1.28,1.29,1.27,0";

    struct FakeDisplay {
        lines: [String<LINE_LEN>; 2],
        backlight: Option<Backlight>,
        glyphs: u8,
        writes: usize,
        fail: bool,
    }

    impl FakeDisplay {
        fn new() -> Self {
            Self {
                lines: [String::new(), String::new()],
                backlight: None,
                glyphs: 0,
                writes: 0,
                fail: false,
            }
        }

        fn line(&self, row: usize) -> &str {
            self.lines[row].trim_end()
        }
    }

    impl CharDisplay for FakeDisplay {
        fn clear(&mut self) -> Result<(), DisplayError> {
            self.lines = [String::new(), String::new()];
            Ok(())
        }

        fn write_at(&mut self, row: u8, _col: u8, text: &str) -> Result<(), DisplayError> {
            if self.fail {
                return Err(DisplayError::Communication);
            }
            self.writes += 1;
            self.lines[row as usize] = String::try_from(text).unwrap();
            Ok(())
        }

        fn define_glyph(&mut self, _glyph: &Glyph) -> Result<(), DisplayError> {
            self.glyphs += 1;
            Ok(())
        }

        fn set_backlight(&mut self, color: Backlight) -> Result<(), DisplayError> {
            self.backlight = Some(color);
            Ok(())
        }

        fn dimensions(&self) -> (u8, u8) {
            (16, 2)
        }
    }

    struct FakeButtons(Buttons);

    impl ButtonSource for FakeButtons {
        fn read_buttons(&mut self) -> Result<Buttons, DisplayError> {
            Ok(self.0)
        }
    }

    struct FakeSource {
        responses: [(&'static str, Result<&'static str, FetchError>); 4],
        calls: usize,
    }

    impl FakeSource {
        fn new() -> Self {
            Self {
                responses: [
                    ("MSFT", Ok(MSFT)),
                    ("AAPL", Ok(AAPL)),
                    ("GCJ13.CMX", Ok("Missing Symbols List.")),
                    ("EURUSD=X", Ok(EURO)),
                ],
                calls: 0,
            }
        }
    }

    impl QuoteSource for FakeSource {
        fn fetch<'b>(
            &mut self,
            symbol: &str,
            _format: &str,
            buf: &'b mut [u8],
        ) -> Result<&'b str, FetchError> {
            self.calls += 1;
            let (_, response) = self
                .responses
                .iter()
                .find(|(s, _)| *s == symbol)
                .ok_or(FetchError::Connect)?;
            let bytes = (*response)?.as_bytes();
            let dest = buf.get_mut(..bytes.len()).ok_or(FetchError::TooLong)?;
            dest.copy_from_slice(bytes);
            core::str::from_utf8(dest).map_err(|_| FetchError::Encoding)
        }
    }

    struct FakeClock(Cell<u32>);

    impl FakeClock {
        fn advance(&self, ms: u32) {
            self.0.set(self.0.get().wrapping_add(ms));
        }
    }

    impl Clock for FakeClock {
        fn now_ms(&self) -> u32 {
            self.0.get()
        }
    }

    fn controller() -> Controller<4> {
        Controller::new(
            &DEFAULT_SYMBOLS,
            TimingConfig::new(60_000, 20_000),
            BacklightScheme::default(),
            FieldLayout::DEFAULT,
        )
        .unwrap()
    }

    #[test]
    fn test_start_shows_banner() {
        let mut ctl = controller();
        let mut display = FakeDisplay::new();

        ctl.start(&mut display).unwrap();

        assert_eq!(display.glyphs, 2);
        assert_eq!(display.line(0), "Stock Ticker");
        assert_eq!(display.line(1), DEFAULT_BANNER_STATUS);
        assert_eq!(display.backlight, Some(Backlight::White));
        assert_eq!(ctl.phase(), Phase::Initializing);

        ctl.show_banner(&mut display, "Joining Wi-Fi").unwrap();
        assert_eq!(display.line(1), "Joining Wi-Fi");
    }

    #[test]
    fn test_banner_error_is_returned_and_retried() {
        let mut ctl = controller();
        let mut display = FakeDisplay::new();
        ctl.start(&mut display).unwrap();

        display.fail = true;
        assert_eq!(
            ctl.show_banner(&mut display, "Wi-Fi failed"),
            Err(DisplayError::Communication)
        );
        assert_eq!(display.line(1), DEFAULT_BANNER_STATUS);

        display.fail = false;
        ctl.show_banner(&mut display, "Wi-Fi failed").unwrap();
        assert_eq!(display.line(1), "Wi-Fi failed");
    }

    #[test]
    fn test_first_poll_runs_cycle() {
        let mut ctl = controller();
        let mut display = FakeDisplay::new();
        let mut buttons = FakeButtons(Buttons::NONE);
        let mut source = FakeSource::new();
        let clock = FakeClock(Cell::new(1_000));

        ctl.start(&mut display).unwrap();
        let report = ctl
            .poll(&mut display, &mut buttons, &mut source, &clock)
            .unwrap()
            .unwrap();

        assert_eq!(source.calls, 4);
        assert_eq!(report.updated, 3);
        assert_eq!(report.failed, 1);
        assert_eq!(
            report.first_error,
            Some((2, QuoteError::Parse(ParseError::MissingField)))
        );

        let store = ctl.store();
        assert_eq!(store[0].price(), 28.50);
        assert_eq!(store[1].change(), 2.10);
        assert_eq!(store[2].price(), 0.0);
        assert_eq!(store[2].quote_time(), "");
        assert_eq!(store[3].quote_time(), "9:35am");

        assert_eq!(ctl.scheduler().last_fetch_ms(), Some(1_000));
        assert_eq!(ctl.phase(), Phase::Ready);
        assert_eq!(display.line(0), "MSFT       28.50");
        assert_eq!(display.line(1), "\u{1} -0.25   4:00pm");
        assert_eq!(display.backlight, Some(Backlight::Red));
    }

    #[test]
    fn test_cycle_waits_for_interval() {
        let mut ctl = controller();
        let mut display = FakeDisplay::new();
        let mut buttons = FakeButtons(Buttons::NONE);
        let mut source = FakeSource::new();
        let clock = FakeClock(Cell::new(0));

        ctl.poll(&mut display, &mut buttons, &mut source, &clock).unwrap();
        assert_eq!(source.calls, 4);

        clock.advance(59_999);
        let report = ctl.poll(&mut display, &mut buttons, &mut source, &clock).unwrap();
        assert!(report.is_none());
        assert_eq!(source.calls, 4);

        clock.advance(1);
        let report = ctl.poll(&mut display, &mut buttons, &mut source, &clock).unwrap();
        assert!(report.is_some());
        assert_eq!(source.calls, 8);
        assert_eq!(ctl.scheduler().last_fetch_ms(), Some(60_000));
    }

    #[test]
    fn test_button_press_defers_cycle() {
        let mut ctl = controller();
        let mut display = FakeDisplay::new();
        let mut buttons = FakeButtons(Buttons::NONE);
        let mut source = FakeSource::new();
        let clock = FakeClock(Cell::new(0));

        ctl.poll(&mut display, &mut buttons, &mut source, &clock).unwrap();

        clock.advance(50_000);
        buttons.0 = Buttons::from(Button::Right);
        ctl.poll(&mut display, &mut buttons, &mut source, &clock).unwrap();
        assert_eq!(ctl.cursor().index(), 1);
        assert_eq!(display.line(0), "Apple     150.25");
        assert_eq!(display.backlight, Some(Backlight::Green));

        buttons.0 = Buttons::NONE;
        clock.advance(15_000);
        assert!(ctl
            .poll(&mut display, &mut buttons, &mut source, &clock)
            .unwrap()
            .is_none());

        clock.advance(5_000);
        assert!(ctl
            .poll(&mut display, &mut buttons, &mut source, &clock)
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_select_toggles_percent() {
        let mut ctl = controller();
        let mut display = FakeDisplay::new();
        let mut buttons = FakeButtons(Buttons::NONE);
        let mut source = FakeSource::new();
        let clock = FakeClock(Cell::new(0));

        ctl.poll(&mut display, &mut buttons, &mut source, &clock).unwrap();
        buttons.0 = Buttons::from(Button::Down);
        ctl.poll(&mut display, &mut buttons, &mut source, &clock).unwrap();
        buttons.0 = Buttons::from(Button::Select);
        ctl.poll(&mut display, &mut buttons, &mut source, &clock).unwrap();

        assert_eq!(ctl.mode(), DisplayMode::Percent);
        assert_eq!(display.line(1), "\u{0} +1.42%  4:00pm");
    }

    #[test]
    fn test_unchanged_screen_not_rewritten() {
        let mut ctl = controller();
        let mut display = FakeDisplay::new();
        let mut buttons = FakeButtons(Buttons::NONE);
        let mut source = FakeSource::new();
        let clock = FakeClock(Cell::new(0));

        ctl.poll(&mut display, &mut buttons, &mut source, &clock).unwrap();
        let writes = display.writes;

        clock.advance(100);
        ctl.poll(&mut display, &mut buttons, &mut source, &clock).unwrap();
        assert_eq!(display.writes, writes);
    }

    #[test]
    fn test_display_error_still_finishes_cycle() {
        let mut ctl = controller();
        let mut display = FakeDisplay::new();
        let mut source = FakeSource::new();
        let clock = FakeClock(Cell::new(7));

        display.fail = true;
        let result = ctl.run_cycle(&mut display, &mut source, &clock);

        assert_eq!(result, Err(DisplayError::Communication));
        assert_eq!(source.calls, 4);
        assert_eq!(ctl.scheduler().last_fetch_ms(), Some(7));
        assert_eq!(ctl.phase(), Phase::Ready);
    }

    #[test]
    fn test_fetch_failure_keeps_previous_values() {
        let mut ctl = controller();
        let mut display = FakeDisplay::new();
        let mut source = FakeSource::new();
        let clock = FakeClock(Cell::new(0));

        ctl.run_cycle(&mut display, &mut source, &clock).unwrap();
        let before = ctl.store()[1].clone();

        source.responses[1].1 = Err(FetchError::Timeout);
        let report = ctl.run_cycle(&mut display, &mut source, &clock).unwrap();

        assert_eq!(report.updated, 2);
        assert_eq!(report.first_error, Some((1, QuoteError::Fetch(FetchError::Timeout))));
        assert_eq!(ctl.store()[1], before);
    }
}
