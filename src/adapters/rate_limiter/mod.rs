//! Rate limiter adapters.
//!
//! `InMemoryRateLimiter` keeps fixed-window counters per process. Login-link
//! limits are per instance; no shared backend is involved.

mod config;
mod in_memory;

pub use config::{RateLimits, WindowLimit};
pub use in_memory::InMemoryRateLimiter;
