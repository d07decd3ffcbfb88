use crate::{
    cmd,
    command::{flags, Command, CommandParams},
    context::Context,
    input,
    output::{short_id, TablePrinter},
};
use anyhow::{bail, Result};
use tasktree::{
    models::{NewTask, TaskUpdate},
    utils,
    views::{self, StatusFilter, TaskFilter},
};
use uuid::Uuid;

pub fn command() -> Command {
    Command {
        name: "tasks",
        aliases: vec!["task"],
        description: "Manage tasks",
        params: CommandParams::Single("TASK"),
        action: handle_tasks_command,
        flags: vec![
            flags::switch::new(Some("Create a new task")),
            flags::switch::delete(Some("Delete a task")),
            flags::flag::project(Some("Project to create the task in")),
            flags::flag::theme(Some("Theme to filter by ('all' for every theme)")),
            flags::flag::name(Some("Task title")),
            flags::flag::desc(None),
            flags::flag::deadline(None),
            flags::flag::priority(None),
            flags::flag::status(None),
        ],
        subcommands: vec![done_command()],
    }
}

fn done_command() -> Command {
    Command {
        name: "done",
        aliases: vec!["toggle"],
        description: "Toggle a task between active and completed",
        params: CommandParams::Multi("TASK"),
        action: handle_done_command,
        flags: vec![],
        subcommands: vec![],
    }
}

fn find_task(ctx: &Context, prefix: &str) -> Result<Uuid> {
    cmd::find_id(ctx.repo.tasks().iter().map(|t| t.id), prefix, "task")
}

fn handle_tasks_command(ctx: &mut Context) -> Result<()> {
    ctx.load()?;

    match (ctx.switch("new"), ctx.switch("delete"), ctx.params.len()) {
        (true, true, _) => bail!("Cannot specify both new and delete"),
        (true, false, _) => create(ctx),
        (false, true, 1) => delete(ctx),
        (false, true, _) => bail!("No task parameter specified"),
        (false, false, 0) => list(ctx),
        (false, false, _) => edit(ctx),
    }
}

fn handle_done_command(ctx: &mut Context) -> Result<()> {
    if ctx.params.is_empty() {
        bail!("No task parameter specified");
    }
    ctx.load()?;

    let lookup: &Context = ctx;
    let ids = lookup
        .params
        .iter()
        .map(|p| find_task(lookup, p))
        .collect::<Result<Vec<Uuid>>>()?;
    for id in ids {
        ctx.runtime.block_on(ctx.repo.toggle_task(id))?;
    }
    Ok(())
}

fn list(ctx: &Context) -> Result<()> {
    let filter = TaskFilter {
        theme: cmd::theme_flag(ctx, false)?,
        priority: cmd::priority_flag(ctx)?,
        status: match ctx.flag("status").map(String::as_str) {
            None | Some("all") => StatusFilter::All,
            Some("active") => StatusFilter::Active,
            Some("completed") | Some("done") => StatusFilter::Completed,
            Some(other) => bail!("Unknown status '{}'", other),
        },
    };

    let snapshot = ctx.repo.snapshot();
    let today = utils::today();
    let mut printer = TablePrinter::new(&["ID", "", "PRIO", "DEADLINE", "TITLE", "PROJECT"]);
    for t in views::filter_tasks(snapshot.tasks, snapshot.projects, &filter) {
        let project = snapshot.projects.iter().find(|p| p.id == t.project_id);
        let deadline = match t.deadline {
            Some(d) if !t.completed && d < today => format!("{} (overdue)", d),
            Some(d) => d.to_string(),
            None => "-".to_string(),
        };
        printer.add_row(vec![
            short_id(&t.id),
            if t.completed { "x" } else { " " }.to_string(),
            t.priority.to_string(),
            deadline,
            t.title.clone(),
            project.map(|p| p.name.clone()).unwrap_or_default(),
        ])?;
    }

    if printer.is_empty() {
        println!("No tasks");
    } else {
        printer.print();
    }
    Ok(())
}

fn create(ctx: &mut Context) -> Result<()> {
    let project_id = match ctx.flag("project") {
        Some(prefix) => cmd::find_project(ctx, prefix)?,
        None => bail!("The --project flag is required"),
    };

    let (title, description) = match ctx.flag("name") {
        Some(name) => (name.clone(), ctx.flag("desc").cloned()),
        None => {
            let text = input::get_stdin_input("Task (first line is the title): ")?;
            match utils::split_text_into_title_desc(&text) {
                Some(split) => split,
                None => bail!("Task title cannot be empty"),
            }
        }
    };

    let task = NewTask {
        title,
        description,
        deadline: ctx.flag("deadline").map(|d| cmd::parse_date(d)).transpose()?,
        priority: cmd::priority_flag(ctx)?.unwrap_or_default(),
    };

    let task = ctx.runtime.block_on(ctx.repo.add_task(project_id, task))?;
    println!("Created task {}", short_id(&task.id));
    Ok(())
}

fn edit(ctx: &mut Context) -> Result<()> {
    let id = find_task(ctx, &ctx.params[0])?;
    let deadline = match ctx.flag("deadline").map(String::as_str) {
        None => None,
        Some("none") => Some(None),
        Some(d) => Some(Some(cmd::parse_date(d)?)),
    };
    let project_id = match ctx.flag("project") {
        Some(prefix) => Some(cmd::find_project(ctx, prefix)?),
        None => None,
    };

    let changes = TaskUpdate {
        project_id,
        title: ctx.flag("name").cloned(),
        description: cmd::description_patch(ctx),
        deadline,
        priority: cmd::priority_flag(ctx)?,
        completed: None,
    };
    if changes.is_empty() {
        bail!("Nothing to change, use --project, --name, --desc, --deadline or --priority");
    }

    ctx.runtime.block_on(ctx.repo.update_task(id, changes))?;
    Ok(())
}

fn delete(ctx: &mut Context) -> Result<()> {
    let id = find_task(ctx, &ctx.params[0])?;
    ctx.runtime.block_on(ctx.repo.delete_task(id))?;
    Ok(())
}
