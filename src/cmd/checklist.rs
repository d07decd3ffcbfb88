use crate::{
    cmd,
    command::{flags, Command, CommandParams},
    context::Context,
    output::{short_id, TablePrinter},
};
use anyhow::{bail, Result};
use tasktree::views;
use uuid::Uuid;

pub fn command() -> Command {
    Command {
        name: "checklist",
        aliases: vec!["cl"],
        description: "List or add items of a checklist project",
        params: CommandParams::Single("PROJECT"),
        action: handle_checklist_command,
        flags: vec![
            flags::switch::new(Some("Add an item, the text comes from --name")),
            flags::flag::name(Some("Item text")),
        ],
        subcommands: vec![check_command(), edit_command(), reorder_command()],
    }
}

fn check_command() -> Command {
    Command {
        name: "check",
        aliases: vec!["done"],
        description: "Check off items, removing them",
        params: CommandParams::Multi("ITEM"),
        action: handle_check_command,
        flags: vec![],
        subcommands: vec![],
    }
}

fn edit_command() -> Command {
    Command {
        name: "edit",
        aliases: vec![],
        description: "Change the text of an item",
        params: CommandParams::Single("ITEM"),
        action: handle_edit_command,
        flags: vec![flags::flag::name(Some("New item text"))],
        subcommands: vec![],
    }
}

fn reorder_command() -> Command {
    Command {
        name: "reorder",
        aliases: vec![],
        description: "Reorder a project's items: PROJECT followed by the items in their new order",
        params: CommandParams::Multi("ID"),
        action: handle_reorder_command,
        flags: vec![],
        subcommands: vec![],
    }
}

fn find_item(ctx: &Context, prefix: &str) -> Result<Uuid> {
    cmd::find_id(ctx.repo.checklist_items().iter().map(|i| i.id), prefix, "checklist item")
}

fn handle_checklist_command(ctx: &mut Context) -> Result<()> {
    if ctx.params.is_empty() {
        bail!("No project parameter specified");
    }
    ctx.load()?;

    let project_id = cmd::find_project(ctx, &ctx.params[0])?;
    if ctx.switch("new") {
        let text = cmd::required(ctx, "name")?.clone();
        let item = ctx
            .runtime
            .block_on(ctx.repo.add_checklist_item(project_id, &text))?;
        println!("Added item {}", short_id(&item.id));
        return Ok(());
    }

    let items = views::checklist_for_project(ctx.repo.checklist_items(), project_id);
    if items.is_empty() {
        println!("Checklist is empty");
        return Ok(());
    }

    let mut printer = TablePrinter::new(&["ID", "POS", "TEXT"]);
    for i in items.iter() {
        printer.add_row(vec![short_id(&i.id), i.position.to_string(), i.text.clone()])?;
    }
    printer.print();
    Ok(())
}

fn handle_check_command(ctx: &mut Context) -> Result<()> {
    if ctx.params.is_empty() {
        bail!("No item parameter specified");
    }
    ctx.load()?;

    let lookup: &Context = ctx;
    let ids = lookup
        .params
        .iter()
        .map(|p| find_item(lookup, p))
        .collect::<Result<Vec<Uuid>>>()?;
    for id in ids {
        ctx.runtime.block_on(ctx.repo.toggle_checklist_item(id))?;
    }
    Ok(())
}

fn handle_edit_command(ctx: &mut Context) -> Result<()> {
    if ctx.params.is_empty() {
        bail!("No item parameter specified");
    }
    ctx.load()?;

    let id = find_item(ctx, &ctx.params[0])?;
    let text = cmd::required(ctx, "name")?.clone();
    ctx.runtime
        .block_on(ctx.repo.update_checklist_item(id, &text))?;
    Ok(())
}

fn handle_reorder_command(ctx: &mut Context) -> Result<()> {
    if ctx.params.len() < 2 {
        bail!("Expected a project followed by its items");
    }
    ctx.load()?;

    let project_id = cmd::find_project(ctx, &ctx.params[0])?;
    let ordered = ctx.params[1..]
        .iter()
        .map(|p| find_item(ctx, p))
        .collect::<Result<Vec<Uuid>>>()?;
    if ordered
        .iter()
        .any(|id| !ctx.repo.checklist_items().iter().any(|i| i.id == *id && i.project_id == project_id))
    {
        bail!("Every item must belong to the given project");
    }

    ctx.runtime
        .block_on(ctx.repo.reorder_checklist_items(project_id, &ordered))?;
    Ok(())
}
