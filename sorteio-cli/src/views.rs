use comfy_table::{presets::UTF8_FULL, Table};
use console::{style, Color};
use sorteio_core::HistoryEntry;
use sorteio_raffle::history::describe;
use sorteio_raffle::view::SPINNER_COLOR;
use sorteio_raffle::{AdminView, ClientView, Outcome};
use std::io::Write;

/// Channel levels of the 6x6x6 cube in the xterm 256-colour palette
const CUBE_LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

fn parse_hex(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.strip_prefix('#')?;
    if !digits.is_ascii() {
        return None;
    }
    match digits.len() {
        3 => {
            let mut channels = digits
                .chars()
                .map(|c| c.to_digit(16).map(|d| (d * 17) as u8));
            Some((channels.next()??, channels.next()??, channels.next()??))
        }
        6 => {
            let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
            Some((channel(0)?, channel(2)?, channel(4)?))
        }
        _ => None,
    }
}

/// Closest palette entry for a `#rgb` or `#rrggbb` colour
pub fn palette_index(hex: &str) -> Option<u8> {
    let (r, g, b) = parse_hex(hex)?;
    let level = |channel: u8| {
        CUBE_LEVELS
            .iter()
            .enumerate()
            .min_by_key(|(_, level)| level.abs_diff(channel))
            .map_or(0, |(i, _)| i as u8)
    };
    Some(16 + 36 * level(r) + 6 * level(g) + level(b))
}

/// Outcome message in the win/lose colours
pub fn outcome_line(outcome: &Outcome) -> String {
    let mut styled = style(outcome.message()).bold();
    if let Some(fg) = palette_index(outcome.text_color()) {
        styled = styled.fg(Color::Color256(fg));
    }
    if let Some(bg) = palette_index(outcome.background()) {
        styled = styled.bg(Color::Color256(bg));
    }
    styled.to_string()
}

fn spinner_text(value: i64) -> String {
    let text = style(format!("🎲 {:>8}", value));
    match palette_index(SPINNER_COLOR) {
        Some(index) => text.fg(Color::Color256(index)).to_string(),
        None => text.to_string(),
    }
}

/// Build the table used for history listings and repeat winners
pub fn history_table(entries: &[HistoryEntry]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Number", "Range", "Drawn At", "Key"]);

    for entry in entries {
        let drawn_at = entry
            .draw
            .drawn_at()
            .map(|at| {
                at.with_timezone(&chrono::Local)
                    .format("%d/%m/%Y %H:%M:%S")
                    .to_string()
            })
            .unwrap_or_else(|| "Unknown".to_string());
        table.add_row(vec![
            entry.draw.number.to_string(),
            format!("{} to {}", entry.draw.min, entry.draw.max),
            drawn_at,
            entry.key.clone(),
        ]);
    }

    table
}

/// Admin surface printed to stdout as it changes
pub struct TerminalAdminView;

impl AdminView for TerminalAdminView {
    fn participant_count(&self, count: usize) {
        println!("Participants: {}", count);
    }

    fn last_draw(&self, number: i64) {
        println!("Last number drawn: {}", number);
    }

    fn repeat_winners(&self, entries: &[HistoryEntry]) {
        if entries.is_empty() {
            println!("Repeat winners: none");
            return;
        }
        println!("Repeat winners:");
        for entry in entries {
            println!("  {}", describe(entry));
        }
    }

    fn alert(&self, message: &str) {
        eprintln!("{}", message);
    }
}

/// Client surface printed to stdout. With a label every line is prefixed,
/// so several clients can share one terminal.
pub struct TerminalClientView {
    label: Option<String>,
    show_frames: bool,
}

impl TerminalClientView {
    pub fn new() -> Self {
        Self {
            label: None,
            show_frames: true,
        }
    }

    /// Labelled view that skips spinner frames
    pub fn labelled(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            show_frames: false,
        }
    }

    fn line(&self, text: &str) {
        match &self.label {
            Some(label) => println!("[{}] {}", label, text),
            None => println!("{}", text),
        }
    }
}

impl ClientView for TerminalClientView {
    fn participant_count(&self, count: usize) {
        self.line(&format!("Participants: {}", count));
    }

    fn spinner_frame(&self, value: i64) {
        if !self.show_frames {
            return;
        }
        let mut stdout = std::io::stdout();
        let _ = write!(stdout, "\r{}", spinner_text(value));
        let _ = stdout.flush();
    }

    fn outcome(&self, outcome: &Outcome) {
        if self.show_frames {
            println!();
        }
        self.line(&outcome_line(outcome));
    }

    fn alert(&self, message: &str) {
        self.line(message);
    }
}

impl Default for TerminalClientView {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sorteio_core::Draw;

    #[test]
    fn test_history_table_lists_every_entry() {
        let entries: Vec<HistoryEntry> = [(4, "-Nfirst"), (9, "-Nsecond")]
            .into_iter()
            .map(|(number, key)| HistoryEntry {
                key: key.to_string(),
                draw: Draw {
                    number,
                    min: 1,
                    max: 10,
                    timestamp: 1_700_000_000_000,
                    token: "t".to_string(),
                },
            })
            .collect();

        let rendered = history_table(&entries).to_string();
        assert!(rendered.contains("-Nfirst"));
        assert!(rendered.contains("-Nsecond"));
        assert!(rendered.contains("1 to 10"));
    }

    #[test]
    fn test_palette_index() {
        assert_eq!(palette_index(SPINNER_COLOR), Some(102));
        assert_eq!(palette_index("#28a745"), Some(35));
        assert_eq!(palette_index("#fff"), Some(231));
        assert_eq!(palette_index("#000000"), Some(16));
        assert_eq!(palette_index("888"), None);
        assert_eq!(palette_index("#12345"), None);
        assert_eq!(palette_index("#gg0000"), None);
    }

    #[test]
    fn test_outcome_line_keeps_message() {
        for outcome in [
            Outcome::Win { number: 7 },
            Outcome::Lose {
                number: 7,
                pseudo: Some(3),
            },
        ] {
            let line = outcome_line(&outcome);
            assert_eq!(console::strip_ansi_codes(&line), outcome.message());
        }
        assert!(console::strip_ansi_codes(&spinner_text(42)).ends_with("42"));
    }
}
