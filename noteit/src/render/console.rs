//! Terminal render sink used by the command line binary

use super::format::unescape_html;
use super::{RenderFrame, RenderSink};
use crate::config;
use std::io::{self, Write};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConsoleFormat {
    #[default]
    Text,
    Json,
}

/// Writes frames to stdout; status changes go to the log
#[derive(Debug, Default)]
pub struct ConsoleSink {
    format: ConsoleFormat,
}

impl ConsoleSink {
    pub fn new(format: ConsoleFormat) -> Self {
        Self { format }
    }

    fn write_text(&self, out: &mut impl Write, frame: &RenderFrame) -> io::Result<()> {
        writeln!(out, "== {} ==", frame.category())?;

        match frame {
            RenderFrame::Empty { reason, .. } => writeln!(out, "{}", reason.message())?,
            RenderFrame::Notes { notes, .. } => {
                for note in notes {
                    writeln!(
                        out,
                        "[{}] {}  ({})",
                        note.id,
                        unescape_html(&note.title_html),
                        note.created_label
                    )?;
                    for line in note.content_html.split(config::LINE_BREAK_MARKUP) {
                        writeln!(out, "    {}", unescape_html(line))?;
                    }
                    let actions: Vec<&str> = note.actions.iter().map(|a| a.label()).collect();
                    writeln!(out, "    actions: {}", actions.join(", "))?;
                }
            }
        }

        Ok(())
    }
}

impl RenderSink for ConsoleSink {
    fn render(&self, frame: RenderFrame) {
        let stdout = io::stdout();
        let mut out = stdout.lock();

        let result = match self.format {
            ConsoleFormat::Text => self.write_text(&mut out, &frame),
            ConsoleFormat::Json => serde_json::to_writer_pretty(&mut out, &frame)
                .map_err(io::Error::from)
                .and_then(|_| writeln!(out)),
        };

        if let Err(e) = result {
            tracing::warn!("Failed to write frame to stdout: {}", e);
        }
    }

    fn set_busy(&self, busy: bool) {
        tracing::debug!("Busy indicator {}", if busy { "shown" } else { "hidden" });
    }

    fn set_validation_error(&self, visible: bool) {
        if visible {
            tracing::warn!("Enter a title and a note before creating it");
        }
    }
}
