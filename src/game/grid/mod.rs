//! Board grid module.
//!
//! The board storage and the randomized board generator.

pub mod board;
pub mod generation;

pub use board::*;
pub use generation::*;
