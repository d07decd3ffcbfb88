use crate::{
    cmd,
    command::{flags, Command, CommandParams},
    context::Context,
    output::{short_id, TablePrinter},
};
use anyhow::{bail, Result};
use tasktree::models::{NewTheme, ThemeUpdate};

pub fn command() -> Command {
    Command {
        name: "themes",
        aliases: vec!["theme"],
        description: "Manage themes",
        params: CommandParams::Single("THEME"),
        action: handle_themes_command,
        flags: vec![
            flags::switch::new(Some("Create a new theme")),
            flags::switch::delete(Some("Delete a theme with its projects and tasks")),
            flags::flag::name(None),
            flags::flag::color(None),
        ],
        subcommands: vec![use_command()],
    }
}

fn use_command() -> Command {
    Command {
        name: "use",
        aliases: vec!["select"],
        description: "Select the theme new projects go into",
        params: CommandParams::Single("THEME"),
        action: handle_use_command,
        flags: vec![],
        subcommands: vec![],
    }
}

fn handle_use_command(ctx: &mut Context) -> Result<()> {
    if ctx.params.is_empty() {
        bail!("No theme parameter specified");
    }
    ctx.load()?;

    let id = cmd::find_theme(ctx, &ctx.params[0])?;
    ctx.repo.set_active_theme(Some(id));
    ctx.save_active_theme()
}

fn handle_themes_command(ctx: &mut Context) -> Result<()> {
    ctx.load()?;

    match (ctx.switch("new"), ctx.switch("delete"), ctx.params.len()) {
        (true, true, _) => bail!("Cannot specify both new and delete"),
        (true, false, _) => create(ctx),
        (false, true, 1) => delete(ctx),
        (false, true, _) => bail!("No theme parameter specified"),
        (false, false, 0) => list(ctx),
        (false, false, _) => edit(ctx),
    }
}

fn list(ctx: &Context) -> Result<()> {
    let active = ctx.repo.active_theme();
    let mut printer = TablePrinter::new(&["ID", "NAME", "COLOR", "PROJECTS"]);
    for t in ctx.repo.themes().iter() {
        let projects = ctx.repo.projects().iter().filter(|p| p.theme_id == t.id).count();
        printer.add_row(vec![
            format!(
                "{}{}",
                short_id(&t.id),
                if active == Some(t.id) { "*" } else { "" }
            ),
            t.name.clone(),
            t.color.clone(),
            projects.to_string(),
        ])?;
    }
    printer.print();
    Ok(())
}

fn create(ctx: &mut Context) -> Result<()> {
    let theme = NewTheme {
        name: cmd::required(ctx, "name")?.clone(),
        color: ctx
            .flag("color")
            .cloned()
            .unwrap_or_else(|| "blue".to_string()),
    };
    let theme = ctx.runtime.block_on(ctx.repo.add_theme(theme))?;
    println!("Created theme {}", short_id(&theme.id));
    ctx.save_active_theme()
}

fn edit(ctx: &mut Context) -> Result<()> {
    let id = cmd::find_theme(ctx, &ctx.params[0])?;
    let changes = ThemeUpdate {
        name: ctx.flag("name").cloned(),
        color: ctx.flag("color").cloned(),
    };
    if changes.is_empty() {
        bail!("Nothing to change, use --name or --color");
    }

    ctx.runtime.block_on(ctx.repo.update_theme(id, changes))?;
    Ok(())
}

fn delete(ctx: &mut Context) -> Result<()> {
    let id = cmd::find_theme(ctx, &ctx.params[0])?;
    ctx.runtime.block_on(ctx.repo.delete_theme(id))?;
    ctx.save_active_theme()
}
