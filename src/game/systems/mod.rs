pub mod placement;
pub mod visibility;
pub mod scoring;
pub mod quests;

pub use placement::*;
pub use visibility::*;
pub use scoring::*;
pub use quests::*;
