//! Normalized market data shared by every provider.

use serde::{Deserialize, Serialize};

use crate::market::symbol::{InstrumentSymbol, SymbolError};

/// A spot price as returned to clients, whichever provider produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpotPrice {
    /// Canonical `base-target` symbol.
    pub symbol: String,
    /// Price as reported upstream (kept as a string to avoid float drift).
    pub price: String,
    /// ISO-8601 UTC time of the quote.
    pub utc_time: String,
    /// Name of the provider that produced the quote.
    pub provider: String,
}

/// Quote kinds accepted in the path (`/api/<action>/.../<kind>/<symbol>`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteKind {
    Spot,
}

impl QuoteKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "spot" => Some(Self::Spot),
            _ => None,
        }
    }
}

/// A parsed request for a quote: the tail `<kind>/<symbol>` of an API path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpotQuery {
    pub kind: QuoteKind,
    pub symbol: InstrumentSymbol,
}

/// Why a quote path could not be understood.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("Missing quote type and symbol in path")]
    Missing,
    #[error("Unsupported quote type: {0}")]
    UnsupportedKind(String),
    #[error(transparent)]
    Symbol(#[from] SymbolError),
}

impl SpotQuery {
    /// Parse the last two path segments as `<kind>/<symbol>`.
    pub fn from_segments(segments: &[String]) -> Result<Self, QueryError> {
        let [.., kind, symbol] = segments else {
            return Err(QueryError::Missing);
        };
        let kind = QuoteKind::parse(kind).ok_or_else(|| QueryError::UnsupportedKind(kind.clone()))?;
        Ok(Self {
            kind,
            symbol: symbol.parse()?,
        })
    }
}
