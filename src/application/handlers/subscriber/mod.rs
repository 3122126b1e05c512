//! Subscriber handlers.

mod unsubscribe;

pub use unsubscribe::{UnsubscribeCommand, UnsubscribeFailure, UnsubscribeHandler};
