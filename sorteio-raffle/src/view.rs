//! Presentation surfaces driven by the controllers.

use serde::{Deserialize, Serialize};
use sorteio_core::HistoryEntry;

pub const INVALID_RANGE_ALERT: &str = "Invalid range.";
pub const NEW_DRAW_ALERT: &str = "🆕 New draw detected! Your registration was updated.";
pub const SPINNER_COLOR: &str = "#888";

pub trait AdminView: Send + Sync {
    fn participant_count(&self, count: usize);
    fn last_draw(&self, number: i64);
    /// Full replacement of the repeat-winners list, newest first
    fn repeat_winners(&self, entries: &[HistoryEntry]);
    fn alert(&self, message: &str);
}

pub trait ClientView: Send + Sync {
    fn participant_count(&self, count: usize);
    fn spinner_frame(&self, value: i64);
    fn outcome(&self, outcome: &Outcome);
    fn alert(&self, message: &str);
}

/// Result of comparing a participant's pseudo-number with the drawn number
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Win { number: i64 },
    Lose { number: i64, pseudo: Option<i64> },
}

impl Outcome {
    pub fn decide(pseudo: Option<i64>, number: i64) -> Self {
        if pseudo == Some(number) {
            Outcome::Win { number }
        } else {
            Outcome::Lose { number, pseudo }
        }
    }

    pub fn is_win(&self) -> bool {
        matches!(self, Outcome::Win { .. })
    }

    /// The drawn number
    pub fn number(&self) -> i64 {
        match self {
            Outcome::Win { number } | Outcome::Lose { number, .. } => *number,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Outcome::Win { number } => format!("🎉 You won! Number drawn: {}", number),
            Outcome::Lose { number, .. } => format!("You did not win. Number drawn: {}", number),
        }
    }

    pub fn alert_message(&self) -> String {
        match self {
            Outcome::Win { number } => {
                format!("🎉 Congratulations! You were drawn with number {}!", number)
            }
            Outcome::Lose { number, .. } => format!(":( You did not win. Number drawn: {}", number),
        }
    }

    pub fn text_color(&self) -> &'static str {
        if self.is_win() {
            "#28a745"
        } else {
            "#dc3545"
        }
    }

    pub fn background(&self) -> &'static str {
        if self.is_win() {
            "#a0e9a0"
        } else {
            "#f8d7da"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decide() {
        assert_eq!(Outcome::decide(Some(7), 7), Outcome::Win { number: 7 });
        assert_eq!(
            Outcome::decide(Some(3), 7),
            Outcome::Lose {
                number: 7,
                pseudo: Some(3)
            }
        );
        assert!(!Outcome::decide(None, 7).is_win());
    }

    #[test]
    fn test_presentation() {
        let win = Outcome::Win { number: 7 };
        assert_eq!(win.number(), 7);
        assert_eq!(win.text_color(), "#28a745");
        assert!(win.message().contains("You won"));

        let lose = Outcome::decide(Some(1), 7);
        assert_eq!(lose.number(), 7);
        assert_eq!(lose.background(), "#f8d7da");
        assert!(lose.alert_message().ends_with("Number drawn: 7"));
    }
}
