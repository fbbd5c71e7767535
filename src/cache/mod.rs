//! Window cache subsystem.
//!
//! # Design Decisions
//! - Best effort only: storage lives as long as the process and may vanish
//!   whenever the host recycles it
//! - Expiry is checked on read; nothing is ever evicted
//! - Created once at startup and handed to the router explicitly

pub mod window;

pub use window::{CacheEntry, WindowCache};
