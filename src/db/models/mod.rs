pub mod pomodoro;
pub mod task;

pub use pomodoro::Pomodoro;
pub use task::{Task, TaskDraft, TaskList};
