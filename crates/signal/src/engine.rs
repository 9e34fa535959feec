use common::models::TradeAction;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignalError {
    #[error("date must not be empty")]
    EmptyDate,
}

/// A computed recommendation plus its fixed explanatory sentence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signal {
    pub action: TradeAction,
    pub message: &'static str,
}

const ACTIONS: [TradeAction; 3] = [TradeAction::Buy, TradeAction::Sell, TradeAction::Hold];

/// Maps a date string to a trade action. Deterministic: the same input
/// always yields the same signal, within and across process runs.
///
/// Any non-empty string is accepted; calendar validation is the caller's
/// concern.
pub fn compute(date: &str) -> Result<Signal, SignalError> {
    if date.is_empty() {
        return Err(SignalError::EmptyDate);
    }
    let action = ACTIONS[(hash32(date).unsigned_abs() % 3) as usize];
    Ok(Signal {
        action,
        message: advice(action),
    })
}

/// 32-bit rolling hash over the UTF-16 code units of the input,
/// `h = c + ((h << 5) - h)`, every step wrapping in signed 32-bit range.
/// The exact bit-width semantics are load-bearing: outputs must be stable
/// across platforms and releases because stored logs key off them.
fn hash32(input: &str) -> i32 {
    let mut h: i32 = 0;
    for unit in input.encode_utf16() {
        h = (unit as i32).wrapping_add(h.wrapping_shl(5).wrapping_sub(h));
    }
    h
}

/// Total over the three actions; no fallback arm needed.
fn advice(action: TradeAction) -> &'static str {
    match action {
        TradeAction::Buy => {
            "We recommend buying on this date: technical and fundamental analysis point to an upward trend."
        }
        TradeAction::Sell => {
            "We recommend selling on this date: the market looks overvalued and may be due for a correction."
        }
        TradeAction::Hold => {
            "We recommend holding your position on this date: the market is stable with no clear directional signal."
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_date() {
        assert_eq!(compute(""), Err(SignalError::EmptyDate));
    }

    #[test]
    fn is_deterministic() {
        let first = compute("2024-01-15").unwrap();
        for _ in 0..100 {
            assert_eq!(compute("2024-01-15").unwrap(), first);
        }
    }

    #[test]
    fn hash_matches_reference_values() {
        assert_eq!(hash32("a"), 97);
        assert_eq!(hash32("2024-01-15"), -613_341_597);
        assert_eq!(hash32("2023-08-01"), -1_500_636_776);
    }

    // Pinned against the reference implementation; these must never drift.
    #[test]
    fn known_dates_map_to_pinned_actions() {
        let cases = [
            ("2024-01-15", TradeAction::Buy),
            ("2024-01-16", TradeAction::Hold),
            ("2024-01-17", TradeAction::Sell),
            ("2023-08-01", TradeAction::Hold),
            ("2024-12-25", TradeAction::Buy),
            ("1999-12-31", TradeAction::Sell),
            ("a", TradeAction::Sell),
        ];
        for (date, expected) in cases {
            assert_eq!(compute(date).unwrap().action, expected, "date {}", date);
        }
    }

    #[test]
    fn negative_extreme_hash_does_not_panic() {
        // unsigned_abs handles i32::MIN, which plain abs() would overflow on.
        assert_eq!(i32::MIN.unsigned_abs() % 3, 2_147_483_648 % 3);
    }

    #[test]
    fn message_is_fixed_per_action() {
        let buy = compute("2024-01-15").unwrap();
        assert_eq!(buy.action, TradeAction::Buy);
        assert!(buy.message.contains("buying"));

        let hold = compute("2024-01-16").unwrap();
        assert_eq!(hold.action, TradeAction::Hold);
        assert!(hold.message.contains("holding"));

        let sell = compute("2024-01-17").unwrap();
        assert_eq!(sell.action, TradeAction::Sell);
        assert!(sell.message.contains("selling"));
    }

    #[test]
    fn non_ascii_input_is_accepted() {
        // Not a calendar date, still a valid non-empty input.
        assert!(compute("2024年01月15日").is_ok());
    }
}
