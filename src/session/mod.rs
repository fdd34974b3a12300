pub mod controller;
pub mod error;
pub mod state;

pub use controller::{SessionController, SessionObserver};
pub use error::{Action, SessionError};
pub use state::{Phase, SessionSnapshot, SessionState};
