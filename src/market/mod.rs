//! Market vocabulary: trading pairs, quote paths and spot prices.

pub mod symbol;
pub mod types;

pub use symbol::{ConcatFormatter, DashFormatter, InstrumentSymbol, SymbolError, SymbolFormatter};
pub use types::{QueryError, QuoteKind, SpotPrice, SpotQuery};
