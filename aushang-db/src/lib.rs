//! Persistence for the bulletin board.
//!
//! The board lives in a string-keyed local store, the same shape as browser
//! local storage: one key holds the whole post list as JSON.

pub mod client;
pub mod local;
