mod pomodoros;
mod tasks;
