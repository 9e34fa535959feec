use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AdvisorError;

/// The fixed set of symbols the prediction service supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Asset {
    Bitcoin,
    Ethereum,
    #[serde(rename = "BNB")]
    Bnb,
    Solana,
    Dogecoin,
}

impl Asset {
    pub const ALL: [Asset; 5] = [
        Asset::Bitcoin,
        Asset::Ethereum,
        Asset::Bnb,
        Asset::Solana,
        Asset::Dogecoin,
    ];
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Asset::Bitcoin => "Bitcoin",
            Asset::Ethereum => "Ethereum",
            Asset::Bnb => "BNB",
            Asset::Solana => "Solana",
            Asset::Dogecoin => "Dogecoin",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Asset {
    type Err = AdvisorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bitcoin" | "btc" => Ok(Asset::Bitcoin),
            "ethereum" | "eth" => Ok(Asset::Ethereum),
            "bnb" => Ok(Asset::Bnb),
            "solana" | "sol" => Ok(Asset::Solana),
            "dogecoin" | "doge" => Ok(Asset::Dogecoin),
            other => Err(AdvisorError::InvalidInput(format!(
                "unsupported asset: {}",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_and_tickers() {
        assert_eq!("Bitcoin".parse::<Asset>().unwrap(), Asset::Bitcoin);
        assert_eq!("sol".parse::<Asset>().unwrap(), Asset::Solana);
        assert_eq!("BNB".parse::<Asset>().unwrap(), Asset::Bnb);
        assert!("ripple".parse::<Asset>().is_err());
    }

    #[test]
    fn display_round_trips_through_from_str() {
        for asset in Asset::ALL {
            assert_eq!(asset.to_string().parse::<Asset>().unwrap(), asset);
        }
    }
}
