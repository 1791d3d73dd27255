use crate::timeline::{Frame, LegendEntry};
use anyhow::Result;
use std::io::Write;

/// Receives one frame per tick or intent. Map drawing lives behind this.
pub trait RenderSink {
    fn present(&mut self, frame: &Frame, legend: &[LegendEntry]) -> Result<()>;
}

/// Prints frames as text lines.
pub struct TerminalSink<W: Write> {
    out: W,
    show_legend: bool,
}

impl<W: Write> TerminalSink<W> {
    pub fn new(out: W, show_legend: bool) -> Self {
        Self { out, show_legend }
    }
}

impl<W: Write> RenderSink for TerminalSink<W> {
    fn present(&mut self, frame: &Frame, legend: &[LegendEntry]) -> Result<()> {
        writeln!(
            self.out,
            "t={:.3} speed={:.4} [{}]",
            frame.time,
            frame.speed,
            frame.play_label()
        )?;
        for marker in &frame.markers {
            writeln!(
                self.out,
                "  {} {} {} {}",
                marker.id, marker.color, marker.position, marker.display_name
            )?;
        }

        if self.show_legend {
            let entries: Vec<String> = legend
                .iter()
                .map(|e| {
                    let check = if e.visible { 'x' } else { ' ' };
                    format!("[{}] {} {} ({})", check, e.id, e.color, e.display_name)
                })
                .collect();
            writeln!(self.out, "  legend: {}", entries.join("  "))?;
        }
        self.out.flush()?;
        Ok(())
    }
}
