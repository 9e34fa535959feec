use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One of the three recommendations the signal engine can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TradeAction {
    Buy,
    Sell,
    Hold,
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TradeAction::Buy => "Buy",
            TradeAction::Sell => "Sell",
            TradeAction::Hold => "Hold",
        };
        write!(f, "{}", name)
    }
}

/// One issued prediction, keyed by its `date`. The store holds at most one
/// entry per date; a repeated prediction replaces the earlier one in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionLog {
    /// ISO 8601 `YYYY-MM-DD`, the upsert key.
    pub date: String,
    pub action: TradeAction,
    pub message: String,
    /// Instant of the most recent write for this date.
    pub timestamp: DateTime<Utc>,
}

impl PredictionLog {
    pub fn new(date: impl Into<String>, action: TradeAction, message: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            action,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }

    /// Renders the entry as a single stream line.
    pub fn to_line(&self) -> String {
        format!(
            "{} | {} | {} | {}",
            self.timestamp.to_rfc3339(),
            self.date,
            self.action,
            self.message
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_serializes_with_rfc3339_timestamp() {
        let log = PredictionLog::new("2024-01-15", TradeAction::Buy, "buy it");
        let json = serde_json::to_string(&log).unwrap();
        let back: PredictionLog = serde_json::from_str(&json).unwrap();
        assert_eq!(back, log);
    }

    #[test]
    fn line_contains_date_and_action() {
        let log = PredictionLog::new("2024-01-15", TradeAction::Hold, "sit tight");
        let line = log.to_line();
        assert!(line.contains("2024-01-15"));
        assert!(line.contains("Hold"));
        assert!(line.contains("sit tight"));
    }
}
