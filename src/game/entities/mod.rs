//! Game entities module.
//!
//! This module organizes player and shop/item logic.

pub mod player;
pub mod shop;

pub use player::*;
pub use shop::*;
