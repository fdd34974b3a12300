pub mod duration;
pub mod logging;
