//! Trading-pair symbols.
//!
//! # Responsibilities
//! - Parse `<base>-<target>` path segments into an [`InstrumentSymbol`]
//! - Render the canonical `base-target` form
//! - Render provider-specific forms through [`SymbolFormatter`]

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Errors produced while parsing a trading pair.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SymbolError {
    /// The input did not split into exactly two non-empty parts on `-`.
    #[error("Invalid symbol from {0}")]
    Invalid(String),
}

/// An immutable `(base, target)` trading pair, e.g. `btc-usd`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InstrumentSymbol {
    base: String,
    target: String,
}

impl InstrumentSymbol {
    /// Build a symbol from its parts. Both parts must be non-empty.
    pub fn new(base: impl Into<String>, target: impl Into<String>) -> Result<Self, SymbolError> {
        let base = base.into();
        let target = target.into();
        if base.is_empty() || target.is_empty() {
            return Err(SymbolError::Invalid(format!("{}-{}", base, target)));
        }
        Ok(Self { base, target })
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn target(&self) -> &str {
        &self.target
    }
}

impl FromStr for InstrumentSymbol {
    type Err = SymbolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('-').collect();
        match parts.as_slice() {
            [base, target] => Self::new(*base, *target).map_err(|_| SymbolError::Invalid(s.to_string())),
            _ => Err(SymbolError::Invalid(s.to_string())),
        }
    }
}

impl fmt::Display for InstrumentSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.base, self.target)
    }
}

/// Renders a symbol in the form an upstream provider expects.
pub trait SymbolFormatter: Send + Sync {
    fn format(&self, symbol: &InstrumentSymbol) -> String;
}

/// `base-target`, as used by gdax.
#[derive(Debug, Clone, Copy, Default)]
pub struct DashFormatter;

impl SymbolFormatter for DashFormatter {
    fn format(&self, symbol: &InstrumentSymbol) -> String {
        symbol.to_string()
    }
}

/// `basetarget`, as used by bitfinex.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConcatFormatter;

impl SymbolFormatter for ConcatFormatter {
    fn format(&self, symbol: &InstrumentSymbol) -> String {
        format!("{}{}", symbol.base, symbol.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_symbol() {
        let symbol: InstrumentSymbol = "btc-usd".parse().unwrap();
        assert_eq!(symbol.base(), "btc");
        assert_eq!(symbol.target(), "usd");
        assert_eq!(symbol.to_string(), "btc-usd");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for input in ["btcusd", "-usd", "btc-", "-", "", "btc-usd-eur"] {
            let err = input.parse::<InstrumentSymbol>().unwrap_err();
            assert_eq!(err, SymbolError::Invalid(input.to_string()));
        }
    }

    #[test]
    fn test_new_rejects_empty_parts() {
        assert!(InstrumentSymbol::new("", "usd").is_err());
        assert!(InstrumentSymbol::new("btc", "").is_err());
        assert!(InstrumentSymbol::new("eth", "btc").is_ok());
    }

    #[test]
    fn test_formatters() {
        let symbol: InstrumentSymbol = "eth-eur".parse().unwrap();
        let formatters: [(&dyn SymbolFormatter, &str); 2] =
            [(&DashFormatter, "eth-eur"), (&ConcatFormatter, "etheur")];
        for (fmt, expected) in formatters {
            assert_eq!(fmt.format(&symbol), expected);
        }
    }
}
