use crate::{
    cmd,
    command::{flags, Command, CommandParams},
    context::Context,
    output::{short_id, TablePrinter},
};
use anyhow::{bail, Result};
use tasktree::{models::AccessLevel, repository::MAX_ACTIVE_SHARES};
use uuid::Uuid;

pub fn command() -> Command {
    Command {
        name: "shares",
        aliases: vec!["share"],
        description: "List or create the invitations of a project",
        params: CommandParams::Single("PROJECT"),
        action: handle_shares_command,
        flags: vec![
            flags::flag::email(Some("Email address to invite")),
            flags::flag::access(None),
        ],
        subcommands: vec![revoke_command()],
    }
}

fn revoke_command() -> Command {
    Command {
        name: "revoke",
        aliases: vec![],
        description: "Revoke a share",
        params: CommandParams::Single("SHARE"),
        action: handle_revoke_command,
        flags: vec![],
        subcommands: vec![],
    }
}

fn handle_shares_command(ctx: &mut Context) -> Result<()> {
    if ctx.params.is_empty() {
        bail!("No project parameter specified");
    }
    ctx.load()?;

    let project_id = cmd::find_project(ctx, &ctx.params[0])?;
    match ctx.flag("email").cloned() {
        Some(email) => invite(ctx, project_id, &email),
        None => list(ctx, project_id),
    }
}

fn list(ctx: &Context, project_id: Uuid) -> Result<()> {
    let shares = ctx.repo.project_shares(project_id);
    println!("Active shares: {}/{}", shares.len(), MAX_ACTIVE_SHARES);
    if shares.is_empty() {
        return Ok(());
    }

    let mut printer = TablePrinter::new(&["ID", "EMAIL", "ACCESS", "STATUS", "TOKEN"]);
    for s in shares.iter() {
        printer.add_row(vec![
            short_id(&s.id),
            s.shared_with_email.clone(),
            s.access_level.to_string(),
            s.status.to_string(),
            s.invite_token.clone(),
        ])?;
    }
    printer.print();
    Ok(())
}

fn invite(ctx: &mut Context, project_id: Uuid, email: &str) -> Result<()> {
    let access = match ctx.flag("access").map(String::as_str) {
        None | Some("read") => AccessLevel::Read,
        Some("edit") => AccessLevel::Edit,
        Some(other) => bail!("Unknown access level '{}'", other),
    };

    let share = ctx
        .runtime
        .block_on(ctx.repo.share_project(project_id, email, access))?;
    println!("Invite token: {}", share.invite_token);
    Ok(())
}

fn handle_revoke_command(ctx: &mut Context) -> Result<()> {
    if ctx.params.is_empty() {
        bail!("No share parameter specified");
    }
    ctx.load()?;

    let id = cmd::find_id(ctx.repo.shares().iter().map(|s| s.id), &ctx.params[0], "share")?;
    ctx.runtime.block_on(ctx.repo.revoke_share(id))?;
    Ok(())
}
