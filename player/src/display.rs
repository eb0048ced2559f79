//! Terminal status panel using ratatui

use cartvox_core::{StatusDisplay, StatusFrame};
use ratatui::{
    DefaultTerminal,
    prelude::*,
    widgets::{Block, Borders, Gauge, Paragraph},
};

/// Status panel on the alternate screen
///
/// Restores the terminal when dropped.
pub struct TerminalStatus {
    terminal: DefaultTerminal,
    pack_name: String,
    track_name: String,
    draw_failed: bool,
}

impl TerminalStatus {
    pub fn new(pack_name: impl Into<String>) -> Self {
        Self {
            terminal: ratatui::init(),
            pack_name: pack_name.into(),
            track_name: String::new(),
            draw_failed: false,
        }
    }
}

impl Drop for TerminalStatus {
    fn drop(&mut self) {
        ratatui::restore();
    }
}

fn state_glyphs(frame: &StatusFrame) -> &'static str {
    match (frame.paused, frame.locked) {
        (false, false) => "▶",
        (true, false) => "⏸",
        (false, true) => "▶ 🔒",
        (true, true) => "⏸ 🔒",
    }
}

impl StatusDisplay for TerminalStatus {
    fn show_track_change(&mut self, index: usize, count: usize, name: &str) {
        tracing::info!("track {}/{}: {}", index + 1, count, name);
        self.track_name = name.to_string();
    }

    fn show_frame(&mut self, status: &StatusFrame) {
        let pack_name = &self.pack_name;
        let track_name = &self.track_name;

        let result = self.terminal.draw(|frame| {
            let layout = Layout::vertical([
                Constraint::Length(3), // Track
                Constraint::Length(3), // Clock and state
                Constraint::Length(3), // Progress
                Constraint::Length(3), // Help
            ])
            .split(frame.area());

            let header = Paragraph::new(format!(
                "{:02}/{:02}  {}",
                status.track_index + 1,
                status.track_count,
                track_name
            ))
            .block(Block::default().borders(Borders::ALL).title(format!("cartvox - {}", pack_name)));
            frame.render_widget(header, layout[0]);

            let state = Paragraph::new(format!("{}  {}", state_glyphs(status), status.elapsed))
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(state, layout[1]);

            let progress = Gauge::default()
                .block(Block::default().borders(Borders::ALL))
                .gauge_style(Style::default().fg(Color::Cyan))
                .ratio(status.progress.clamp(0.0, 1.0) as f64);
            frame.render_widget(progress, layout[2]);

            let help = Paragraph::new(
                "[←/→] Track  [A/S] Seek  [Enter] Pause  [Tab] Lock  [Q] Quit",
            )
            .block(Block::default().borders(Borders::ALL));
            frame.render_widget(help, layout[3]);
        });

        if let Err(e) = result
            && !self.draw_failed
        {
            self.draw_failed = true;
            tracing::warn!("status draw failed: {}", e);
        }
    }
}
