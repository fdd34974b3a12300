pub mod recorder;
pub mod runner;
pub mod ticker;

pub use runner::SessionRunner;
pub use ticker::TickSource;
