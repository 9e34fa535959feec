pub mod asset;
pub mod prediction;

pub use asset::Asset;
pub use prediction::{PredictionLog, TradeAction};
