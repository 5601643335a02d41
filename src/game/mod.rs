//! Rail game engine: board, players, rules, scoring.

pub mod types;
pub mod error;
pub mod watchlist;
pub mod state;

pub mod entities;
pub mod grid;
pub mod systems;

#[cfg(test)]
mod tests;
