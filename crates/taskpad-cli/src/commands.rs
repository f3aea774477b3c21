use chrono::Utc;
use taskpad_core::settings::{SettingsStore, SettingsUpdate};
use taskpad_core::store::{OpStatus, TaskStore};
use taskpad_core::task::{Category, Priority, Task};
use taskpad_core::views;
use tracing::{debug, info};

use crate::cli::{Command, SettingsCommand, SubCommand};

/// Dispatch one user intent into the stores and print the notification
/// the outcome calls for. Not-found mutations stay silent, matching the
/// reference behavior; validation failures always get a message.
#[tracing::instrument(skip(tasks, settings, command))]
pub fn dispatch(
    tasks: &mut TaskStore,
    settings: &mut SettingsStore,
    command: Command,
) -> anyhow::Result<()> {
    match command {
        Command::Add {
            text,
            priority,
            category,
            due,
        } => {
            let status = tasks.add_task(&text, priority, category, due)?;
            report(status, "task added");
        }
        Command::List {
            filter,
            search,
            sort,
        } => {
            info!(?filter, ?sort, "command list");
            let mut view = views::filter_tasks(tasks.tasks(), filter, &search);
            views::sort_tasks(&mut view, sort);
            render_list(&view);
        }
        Command::Done { id } => {
            let status = tasks.toggle_task(id)?;
            report(status, "task updated");
        }
        Command::Edit { id, text } => {
            let status = tasks.edit_task_text(id, &text)?;
            report(status, "task edited");
        }
        Command::Delete { id } => {
            let status = tasks.delete_task(id)?;
            report(status, "task deleted");
        }
        Command::Clear => {
            tasks.clear_all()?;
            println!("all tasks cleared");
        }
        Command::Sub { command } => dispatch_sub(tasks, command)?,
        Command::Stats => render_stats(tasks.tasks()),
        Command::Settings { command } => dispatch_settings(settings, command)?,
        Command::Dark => {
            let enabled = settings.toggle_dark_mode()?;
            println!("dark mode {}", if enabled { "on" } else { "off" });
        }
    }
    Ok(())
}

#[tracing::instrument(skip(tasks, command))]
fn dispatch_sub(tasks: &mut TaskStore, command: SubCommand) -> anyhow::Result<()> {
    match command {
        SubCommand::Add { task_id, text } => {
            let status = tasks.add_subtask(task_id, &text)?;
            report(status, "subtask added");
        }
        SubCommand::Done {
            task_id,
            subtask_id,
        } => {
            let status = tasks.toggle_subtask(task_id, subtask_id)?;
            report(status, "subtask updated");
        }
        SubCommand::Edit {
            task_id,
            subtask_id,
            text,
        } => {
            let status = tasks.edit_subtask_text(task_id, subtask_id, &text)?;
            report(status, "subtask edited");
        }
        SubCommand::Rm {
            task_id,
            subtask_id,
        } => {
            let status = tasks.delete_subtask(task_id, subtask_id)?;
            report(status, "subtask deleted");
        }
    }
    Ok(())
}

#[tracing::instrument(skip(settings, command))]
fn dispatch_settings(settings: &mut SettingsStore, command: SettingsCommand) -> anyhow::Result<()> {
    match command {
        SettingsCommand::Show => {
            let current = settings.get();
            println!("theme:     {:?}", current.theme);
            println!("layout:    {:?}", current.layout);
            println!("font:      {:?}", current.font);
            println!("font size: {:?}", current.font_size);
            println!("dark mode: {}", if settings.dark_mode() { "on" } else { "off" });
        }
        SettingsCommand::Set {
            theme,
            layout,
            font,
            font_size,
        } => {
            settings.update(SettingsUpdate {
                theme,
                layout,
                font,
                font_size,
            })?;
            println!("settings updated");
        }
    }
    Ok(())
}

fn report(status: OpStatus, success: &str) {
    match status {
        OpStatus::Applied => println!("{success}"),
        OpStatus::EmptyText => println!("please enter a task"),
        OpStatus::NotFound => debug!("target not found; nothing to do"),
    }
}

fn render_list(view: &[&Task]) {
    if view.is_empty() {
        println!("no tasks");
        return;
    }

    let now = Utc::now();
    for task in view {
        let check = if task.completed { "x" } else { " " };
        let overdue = if task.is_overdue(now) { " !" } else { "" };
        let due = task
            .due_date
            .map(|d| format!(" due {}", d.format("%Y-%m-%d")))
            .unwrap_or_default();

        println!(
            "[{check}] {id}  {prio}/{cat}  {text}{due}{overdue}",
            id = task.id,
            prio = priority_label(task.priority),
            cat = category_label(task.category),
            text = task.text,
        );

        if !task.subtasks.is_empty() {
            println!("      progress {}%", views::subtask_progress(task));
            for sub in &task.subtasks {
                let check = if sub.completed { "x" } else { " " };
                println!("      [{check}] {}  {}", sub.id, sub.text);
            }
        }
    }
}

fn render_stats(tasks: &[Task]) {
    let s = views::stats(tasks);
    println!("total:     {}", s.total);
    println!("active:    {}", s.active);
    println!("completed: {}", s.completed);
    println!(
        "priority:  high {} / medium {} / low {}",
        s.by_priority.high, s.by_priority.medium, s.by_priority.low
    );
}

fn priority_label(priority: Priority) -> &'static str {
    match priority {
        Priority::Low => "low",
        Priority::Medium => "med",
        Priority::High => "high",
    }
}

fn category_label(category: Category) -> &'static str {
    match category {
        Category::Work => "work",
        Category::Home => "home",
        Category::Personal => "personal",
    }
}
