use crate::{
    cmd,
    command::{flags, Command, CommandParams},
    context::Context,
    output::{self, short_id, TablePrinter},
};
use anyhow::{bail, Result};
use tasktree::{
    models::{NewProject, ProjectUpdate},
    views::{self, ProjectFilter, ProjectSort},
};

pub fn command() -> Command {
    Command {
        name: "projects",
        aliases: vec!["project"],
        description: "Manage projects, grouped by priority",
        params: CommandParams::Single("PROJECT"),
        action: handle_projects_command,
        flags: vec![
            flags::switch::new(Some("Create a new project")),
            flags::switch::delete(Some("Delete a project with its tasks")),
            flags::switch::checklist(None),
            flags::flag::theme(Some("Theme to filter by or create in ('all' for every theme)")),
            flags::flag::name(None),
            flags::flag::desc(None),
            flags::flag::priority(None),
            flags::flag::search(None),
            flags::flag::sort(Some("Sort by name or theme")),
        ],
        subcommands: vec![],
    }
}

fn handle_projects_command(ctx: &mut Context) -> Result<()> {
    ctx.load()?;

    match (ctx.switch("new"), ctx.switch("delete"), ctx.params.len()) {
        (true, true, _) => bail!("Cannot specify both new and delete"),
        (true, false, _) => create(ctx),
        (false, true, 1) => delete(ctx),
        (false, true, _) => bail!("No project parameter specified"),
        (false, false, 0) => list(ctx),
        (false, false, _) => edit(ctx),
    }
}

fn list(ctx: &Context) -> Result<()> {
    let filter = ProjectFilter {
        theme: cmd::theme_flag(ctx, true)?,
        search: ctx.flag("search").cloned(),
        priority: cmd::priority_flag(ctx)?,
    };
    let sort = match ctx.flag("sort").map(String::as_str) {
        None | Some("name") => ProjectSort::Name,
        Some("theme") => ProjectSort::Theme,
        Some(other) => bail!("Unknown sort '{}'", other),
    };

    let snapshot = ctx.repo.snapshot();
    let mut projects = views::filter_projects(snapshot.projects, &filter);
    views::sort_projects(&mut projects, sort, snapshot.themes);

    for (priority, group) in views::group_projects_by_priority(&projects) {
        output::print_section(&priority.to_string(), group.len());
        if group.is_empty() {
            continue;
        }

        let mut printer = TablePrinter::new(&["ID", "NAME", "KIND", "OPEN", "SHARES"]);
        for p in group.iter() {
            let open = if p.is_checklist {
                views::checklist_for_project(snapshot.checklist_items, p.id).len()
            } else {
                let tasks = snapshot.tasks.iter().filter(|t| t.project_id == p.id);
                views::task_counts(tasks).active
            };
            printer.add_row(vec![
                short_id(&p.id),
                p.name.clone(),
                if p.is_checklist { "checklist" } else { "tasks" }.to_string(),
                open.to_string(),
                views::active_share_count(snapshot.shares, p.id).to_string(),
            ])?;
        }
        printer.print();
    }
    Ok(())
}

fn create(ctx: &mut Context) -> Result<()> {
    let theme_id = match cmd::theme_flag(ctx, true)? {
        Some(id) => id,
        None => bail!("No theme selected, use --theme"),
    };
    let project = NewProject {
        name: cmd::required(ctx, "name")?.clone(),
        description: ctx.flag("desc").cloned(),
        priority: cmd::priority_flag(ctx)?.unwrap_or_default(),
        is_checklist: ctx.switch("checklist"),
    };

    let project = ctx.runtime.block_on(ctx.repo.add_project(theme_id, project))?;
    println!("Created project {}", short_id(&project.id));
    Ok(())
}

fn edit(ctx: &mut Context) -> Result<()> {
    let id = cmd::find_project(ctx, &ctx.params[0])?;
    let changes = ProjectUpdate {
        theme_id: cmd::theme_flag(ctx, false)?,
        name: ctx.flag("name").cloned(),
        description: cmd::description_patch(ctx),
        priority: cmd::priority_flag(ctx)?,
        is_checklist: None,
    };
    if changes.is_empty() {
        bail!("Nothing to change, use --theme, --name, --desc or --priority");
    }

    ctx.runtime.block_on(ctx.repo.update_project(id, changes))?;
    Ok(())
}

fn delete(ctx: &mut Context) -> Result<()> {
    let id = cmd::find_project(ctx, &ctx.params[0])?;
    ctx.runtime.block_on(ctx.repo.delete_project(id))?;
    Ok(())
}
