use crate::{
    command::{flags, Command, CommandParams},
    context::Context,
    output::{self, short_id, TablePrinter},
};
use anyhow::{bail, Result};
use tasktree::{
    utils,
    views::{self, CreationOrder, DecoratedTask},
};

pub fn command() -> Command {
    Command {
        name: "dashboard",
        aliases: vec!["dash"],
        description: "Urgent tasks: overdue, due today and due this week",
        params: CommandParams::None,
        action: show,
        flags: vec![
            flags::flag::theme(Some("Also list active tasks of this theme ('all' for every theme)")),
            flags::flag::priority(None),
            flags::flag::sort(Some("Active task order: recent or oldest")),
        ],
        subcommands: vec![],
    }
}

fn print_tasks(title: &str, tasks: &[DecoratedTask]) -> Result<()> {
    output::print_section(title, tasks.len());
    if tasks.is_empty() {
        return Ok(());
    }

    let mut printer = TablePrinter::new(&["ID", "PRIO", "DEADLINE", "TITLE", "PROJECT", "THEME"]);
    for t in tasks.iter() {
        printer.add_row(vec![
            short_id(&t.task.id),
            t.task.priority.to_string(),
            t.task
                .deadline
                .map(|d| d.to_string())
                .unwrap_or_else(|| "-".to_string()),
            t.task.title.clone(),
            t.project_name.clone().unwrap_or_default(),
            t.theme_name.clone().unwrap_or_default(),
        ])?;
    }
    printer.print();
    Ok(())
}

pub fn show(ctx: &mut Context) -> Result<()> {
    ctx.load()?;
    let today = utils::today();
    let snapshot = ctx.repo.snapshot();

    let urgent = views::urgent_tasks(snapshot.tasks, snapshot.projects, snapshot.themes, today);
    let buckets = views::partition_by_urgency(&urgent, today);
    let counts = views::task_counts(snapshot.tasks);
    println!(
        "Overdue: {}    Today: {}    This week: {}    Active: {}",
        buckets.overdue.len(),
        buckets.today.len(),
        buckets.this_week.len(),
        counts.active
    );

    print_tasks("Overdue", &buckets.overdue)?;
    print_tasks("Today", &buckets.today)?;
    print_tasks("This week", &buckets.this_week)?;

    if ctx.flag("theme").is_some() || ctx.flag("priority").is_some() || ctx.flag("sort").is_some() {
        let theme = super::theme_flag(ctx, false)?;
        let priority = super::priority_flag(ctx)?;
        let order = match ctx.flag("sort").map(String::as_str) {
            None | Some("recent") => CreationOrder::Recent,
            Some("oldest") => CreationOrder::Oldest,
            Some(other) => bail!("Unknown sort order '{}'", other),
        };

        let mut active: Vec<DecoratedTask> = views::active_tasks(ctx.repo.snapshot())
            .into_iter()
            .filter(|t| theme.map_or(true, |id| t.theme_id == Some(id)))
            .filter(|t| priority.map_or(true, |p| t.task.priority == p))
            .collect();
        views::sort_by_creation(&mut active, order);
        print_tasks("Active tasks", &active)?;
    }

    Ok(())
}
