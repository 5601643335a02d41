/// Main configuration module.
/// 
/// Re-exports submodules for board generation, scoring and server configuration.
pub mod game;
pub mod scoring;
pub mod server;
