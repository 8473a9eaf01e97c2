//! Console render sink: a `\r` status line, or one JSON object per frame.

use std::io::Write;

use brewscale_traits::RenderSink;
use serde_json::json;

pub struct ConsoleSink<W: Write> {
    out: W,
    json: bool,
    line_open: bool,
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(out: W, json: bool) -> Self {
        Self {
            out,
            json,
            line_open: false,
        }
    }

    /// Terminate the status line so later output starts on a fresh line.
    pub fn finish(&mut self) -> std::io::Result<()> {
        if self.line_open {
            writeln!(self.out)?;
            self.line_open = false;
        }
        self.out.flush()
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RenderSink for ConsoleSink<W> {
    fn render(
        &mut self,
        time_text: &str,
        weight_text: &str,
        weight_g: f32,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if self.json {
            let line = json!({ "time": time_text, "weight": weight_text, "grams": weight_g });
            writeln!(self.out, "{line}")?;
        } else {
            write!(self.out, "\r{time_text:>6}  {weight_text:>9}")?;
            self.line_open = true;
        }
        self.out.flush()?;
        Ok(())
    }
}
