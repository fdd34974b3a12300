use anyhow::{anyhow, Result};
use tokio::io::{self, AsyncBufReadExt, BufReader};

use crate::{
    db::Task,
    session::{Action, Phase, SessionError, SessionSnapshot},
    timer::SessionRunner,
    utils::duration::format_clock,
};

use super::AppContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Input {
    Act(Action),
    Help,
    Quit,
}

fn parse_input(line: &str) -> Option<Input> {
    let input = match line.trim().to_ascii_lowercase().as_str() {
        "s" | "start" => Input::Act(Action::Start),
        "p" | "pause" => Input::Act(Action::Pause),
        "r" | "resume" => Input::Act(Action::Resume),
        "n" | "next" | "advance" => Input::Act(Action::Advance),
        "c" | "complete" => Input::Act(Action::Complete),
        "h" | "?" | "help" => Input::Help,
        "q" | "quit" | "exit" => Input::Quit,
        _ => return None,
    };
    Some(input)
}

const HELP: &str = "commands: [s]tart [p]ause [r]esume [n]ext [c]omplete [h]elp [q]uit";

async fn dispatch(runner: &SessionRunner, action: Action) -> Result<SessionSnapshot, SessionError> {
    match action {
        Action::Start => runner.start().await,
        Action::Pause => runner.pause().await,
        Action::Resume => runner.resume().await,
        Action::Advance => runner.advance().await,
        Action::Complete => runner.complete().await,
    }
}

fn render(task: &Task, snapshot: &SessionSnapshot) -> String {
    let mut line = format!(
        "[{:<7}] {}  {}/{}  {}",
        snapshot.phase.as_str(),
        format_clock(snapshot.remaining_ms),
        snapshot.completed_intervals,
        task.target_intervals,
        task.label
    );

    if snapshot.phase == Phase::OnBreak {
        if snapshot.completed_intervals >= task.target_intervals {
            line.push_str("  (all intervals done, [c]omplete)");
        } else if snapshot.remaining_ms == 0 {
            line.push_str("  (break is over, [n]ext)");
        }
    }
    line
}

pub(crate) async fn run(ctx: &AppContext, task_id: i64) -> Result<()> {
    let task = ctx
        .db
        .get_task(task_id)
        .await?
        .ok_or_else(|| anyhow!("task {task_id} not found"))?;

    let settings = ctx.settings.current();
    let runner = SessionRunner::new(task, settings.tick_interval(), Some(ctx.db.clone()))?;
    let mut updates = runner.subscribe();
    let mut lines = BufReader::new(io::stdin()).lines();

    println!("{HELP}");
    println!("{}", render(runner.task(), &runner.snapshot().await));

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = *updates.borrow_and_update();
                println!("{}", render(runner.task(), &snapshot));
                if snapshot.phase == Phase::Done {
                    break;
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match parse_input(&line) {
                    Some(Input::Act(action)) => {
                        if let Err(err) = dispatch(&runner, action).await {
                            println!("! {err}");
                        }
                    }
                    Some(Input::Help) => println!("{HELP}"),
                    Some(Input::Quit) => break,
                    None => println!("! unknown command '{}'; {HELP}", line.trim()),
                }
            }
        }
    }

    runner.stop().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_and_long_inputs() {
        assert_eq!(parse_input("s"), Some(Input::Act(Action::Start)));
        assert_eq!(parse_input(" Pause "), Some(Input::Act(Action::Pause)));
        assert_eq!(parse_input("next"), Some(Input::Act(Action::Advance)));
        assert_eq!(parse_input("c"), Some(Input::Act(Action::Complete)));
        assert_eq!(parse_input("q"), Some(Input::Quit));
        assert_eq!(parse_input("dance"), None);
    }

    #[test]
    fn render_hints_on_break() {
        let task = Task::new(1, "essay", 2, 1500);
        assert_eq!(
            render(&task, &SessionSnapshot::new(Phase::Working, 500, 0)),
            "[Working] 00:00:01  0/2  essay"
        );
        assert!(render(&task, &SessionSnapshot::new(Phase::OnBreak, 0, 1)).ends_with("[n]ext)"));
        assert!(render(&task, &SessionSnapshot::new(Phase::OnBreak, 900, 2)).ends_with("[c]omplete)"));
    }
}
