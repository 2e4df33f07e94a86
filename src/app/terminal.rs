//! Terminal implementations of the platform traits, used by the CLI.

use std::cell::RefCell;
use std::io::Write;

use crate::chart::ChartConfig;
use crate::error::Result;
use crate::interface::{ChartSurface, Geolocator, Ui};
use crate::model::structs::{Position, PositionError};

/// Prints alerts to stdout. A refresh has nothing to re-render, so it is only logged.
#[derive(Debug, Default)]
pub struct TerminalUi;

impl Ui for TerminalUi {
    fn alert(&self, message: &str) {
        println!("{message}");
    }

    fn refresh(&self) {
        log::info!("Change accepted by the server");
    }
}

/// A terminal has no location service; the position comes from the command line.
#[derive(Debug, Clone, Default)]
pub struct FixedGeolocator {
    position: Option<Position>,
}

impl FixedGeolocator {
    pub fn new(position: Option<Position>) -> Self {
        Self { position }
    }
}

impl Geolocator for FixedGeolocator {
    fn is_supported(&self) -> bool {
        self.position.is_some()
    }

    async fn current_position(&self) -> core::result::Result<Position, PositionError> {
        self.position.ok_or(PositionError::PositionUnavailable)
    }
}

/// Writes the Chart.js configuration as pretty JSON instead of drawing it.
pub struct JsonChartSurface<W: Write> {
    canvas_id: String,
    out: RefCell<W>,
}

impl<W: Write> JsonChartSurface<W> {
    pub fn new(canvas_id: impl Into<String>, out: W) -> Self {
        Self {
            canvas_id: canvas_id.into(),
            out: RefCell::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

impl<W: Write> ChartSurface for JsonChartSurface<W> {
    type Canvas = ();

    fn find_canvas(&self, id: &str) -> Option<()> {
        (id == self.canvas_id).then_some(())
    }

    fn draw(&self, _canvas: (), config: &ChartConfig) -> Result<()> {
        let mut out = self.out.borrow_mut();
        serde_json::to_writer_pretty(&mut *out, config)?;
        writeln!(out)?;
        Ok(())
    }
}
