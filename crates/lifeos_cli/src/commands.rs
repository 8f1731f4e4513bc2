//! Command execution and text rendering.
//!
//! The CLI is a presentation layer: it forwards actions into the store and
//! renders derived views. `today` is fixed once per invocation.

use crate::args::Command;
use anyhow::{bail, Result};
use chrono::NaiveDate;
use lifeos_core::{
    assistant_reply, filter_by_view, focus_lane, MutationOutcome, NewTask, Persistence, Task,
    TaskCounts, TaskId, TaskPatch, TaskRepository, TaskStore,
};
use std::cell::Cell;
use std::io::Write;
use std::rc::Rc;

const SHORT_ID_LEN: usize = 8;

/// Runs one command against `store`, writing human-readable output to `out`.
pub fn execute<R: TaskRepository>(
    store: &mut TaskStore<R>,
    command: Command,
    today: NaiveDate,
    out: &mut impl Write,
) -> Result<()> {
    let changed = Rc::new(Cell::new(None));
    let sink = Rc::clone(&changed);
    let subscription = store.subscribe(move |tasks: &[Task]| {
        sink.set(Some(TaskCounts::summarize(tasks, today)));
    });

    let result = dispatch(store, command, today, out);
    store.unsubscribe(subscription);
    result?;

    if let Some(counts) = changed.get() {
        writeln!(
            out,
            "{} open, {} done, {} critical due today",
            counts.open, counts.done, counts.critical_due_today
        )?;
    }
    Ok(())
}

fn dispatch<R: TaskRepository>(
    store: &mut TaskStore<R>,
    command: Command,
    today: NaiveDate,
    out: &mut impl Write,
) -> Result<()> {
    match command {
        Command::Add {
            title,
            priority,
            due,
            notes,
            tags,
        } => {
            let request = NewTask::new(title)
                .with_priority(priority)
                .with_due_date(due.map(|due| due.resolve(today)))
                .with_notes(notes)
                .with_tags(tags);
            let outcome = store.add_task(request);
            if let Some(id) = outcome.value() {
                writeln!(out, "added {}", short_id(*id))?;
            }
            report(&outcome)
        }
        Command::Toggle { id } => {
            let id = resolve_id(store.tasks(), &id)?;
            let outcome = store.toggle_task(id);
            if let Some(status) = outcome.value() {
                writeln!(out, "{} is now {}", short_id(id), status.label())?;
            }
            report(&outcome)
        }
        Command::Rm { id } => {
            let id = resolve_id(store.tasks(), &id)?;
            let outcome = store.remove_task(id);
            if outcome.is_applied() {
                writeln!(out, "removed {}", short_id(id))?;
            }
            report(&outcome)
        }
        Command::Edit {
            id,
            title,
            priority,
            due,
            clear_due,
            notes,
            clear_notes,
            tags,
            clear_tags,
        } => {
            let id = resolve_id(store.tasks(), &id)?;
            let patch = TaskPatch {
                title,
                priority,
                due_date: if clear_due {
                    Some(None)
                } else {
                    due.map(|due| Some(due.resolve(today)))
                },
                notes: if clear_notes { Some(None) } else { notes.map(Some) },
                tags: if clear_tags {
                    Some(Vec::new())
                } else if tags.is_empty() {
                    None
                } else {
                    Some(tags)
                },
            };
            let outcome = store.update_task(id, patch);
            if outcome.is_applied() {
                writeln!(out, "updated {}", short_id(id))?;
            }
            report(&outcome)
        }
        Command::ClearDone => {
            let outcome = store.clear_done();
            let removed = outcome.value().copied().unwrap_or(0);
            writeln!(out, "cleared {removed} done task(s)")?;
            if outcome.is_applied() {
                report(&outcome)
            } else {
                Ok(())
            }
        }
        Command::List { view } => {
            let tasks = filter_by_view(store.tasks(), view, today);
            if tasks.is_empty() {
                writeln!(out, "no {} tasks", view.label())?;
            }
            for task in tasks {
                writeln!(out, "{}", render_task(task))?;
            }
            Ok(())
        }
        Command::Focus { limit } => {
            for (rank, task) in focus_lane(store.tasks(), limit).into_iter().enumerate() {
                writeln!(out, "{}. {}", rank + 1, render_task(task))?;
            }
            Ok(())
        }
        Command::Summary => {
            let counts = TaskCounts::summarize(store.tasks(), today);
            writeln!(
                out,
                "open: {}\ndone: {}\ncritical due today: {}",
                counts.open, counts.done, counts.critical_due_today
            )?;
            Ok(())
        }
        Command::Ask { prompt } => ask(&prompt, out),
    }
}

/// Prints the assistant reply for `prompt`.
pub fn ask(prompt: &str, out: &mut impl Write) -> Result<()> {
    let reply = assistant_reply(prompt)?;
    writeln!(out, "{}", reply.text)?;
    Ok(())
}

/// Turns a rejection into an error and warns when the change was not saved.
fn report<T>(outcome: &MutationOutcome<T>) -> Result<()> {
    match outcome {
        MutationOutcome::Applied {
            persistence: Persistence::Failed,
            ..
        } => {
            log::warn!("event=cli_persist module=cli status=error");
            eprintln!("warning: change could not be saved");
            Ok(())
        }
        MutationOutcome::Applied { .. } => Ok(()),
        MutationOutcome::Rejected(rejection) => bail!("nothing changed: {rejection}"),
    }
}

/// Finds the single task whose id starts with `prefix`.
pub fn resolve_id(tasks: &[Task], prefix: &str) -> Result<TaskId> {
    let prefix = prefix.trim().to_ascii_lowercase();
    if prefix.is_empty() {
        bail!("task id must not be empty");
    }
    let mut matches = tasks
        .iter()
        .filter(|task| task.id.to_string().starts_with(&prefix));
    match (matches.next(), matches.next()) {
        (Some(task), None) => Ok(task.id),
        (None, _) => bail!("no task matches `{prefix}`"),
        (Some(_), Some(_)) => bail!("task id `{prefix}` is ambiguous; type more characters"),
    }
}

fn short_id(id: TaskId) -> String {
    id.to_string().chars().take(SHORT_ID_LEN).collect()
}

fn render_task(task: &Task) -> String {
    let mark = if task.is_done() { 'x' } else { ' ' };
    let due = task
        .due_date
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string());
    let mut line = format!(
        "{} [{mark}] {:<8} {:<10} {}",
        short_id(task.id),
        task.priority.label(),
        due,
        task.title
    );
    for tag in &task.tags {
        line.push_str(" #");
        line.push_str(tag);
    }
    line
}
