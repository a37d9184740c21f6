pub mod models;
pub mod moves;
mod progress;

pub use models::*;
pub use moves::MoveCounter;
pub use progress::FetchProgress;
