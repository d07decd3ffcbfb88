use crate::{
    command::{Command, CommandParams},
    config,
    context::Context,
    input,
};
use anyhow::Result;

fn prompt_credentials() -> Result<(String, String)> {
    let email = input::get_stdin_input("Email: ")?;
    let password = input::get_password("Password: ")?;
    Ok((email, password))
}

pub fn signup() -> Command {
    Command {
        name: "signup",
        aliases: vec![],
        description: "Create an account",
        params: CommandParams::None,
        action: handle_signup,
        flags: vec![],
        subcommands: vec![],
    }
}

fn handle_signup(ctx: &mut Context) -> Result<()> {
    ctx.require_endpoint()?;
    let (email, password) = prompt_credentials()?;
    ctx.runtime.block_on(ctx.repo.sign_up(&email, &password))?;
    println!("Check your email to confirm the account, then run login");
    Ok(())
}

pub fn login() -> Command {
    Command {
        name: "login",
        aliases: vec![],
        description: "Sign in and remember the session",
        params: CommandParams::None,
        action: handle_login,
        flags: vec![],
        subcommands: vec![],
    }
}

fn handle_login(ctx: &mut Context) -> Result<()> {
    ctx.require_endpoint()?;
    let (email, password) = prompt_credentials()?;
    let session = ctx.runtime.block_on(ctx.repo.sign_in(&email, &password))?;

    ctx.config.session = Some(session);
    ctx.config.active_theme = ctx.repo.active_theme();
    config::save(&ctx.config)?;
    let email = ctx.repo.user().and_then(|u| u.email).unwrap_or(email);
    println!(
        "Signed in as {}: {} themes, {} projects, {} tasks",
        email,
        ctx.repo.themes().len(),
        ctx.repo.projects().len(),
        ctx.repo.tasks().len()
    );
    Ok(())
}

pub fn logout() -> Command {
    Command {
        name: "logout",
        aliases: vec![],
        description: "End the session",
        params: CommandParams::None,
        action: handle_logout,
        flags: vec![],
        subcommands: vec![],
    }
}

fn handle_logout(ctx: &mut Context) -> Result<()> {
    ctx.runtime.block_on(ctx.repo.sign_out());
    ctx.config.session = None;
    ctx.config.active_theme = None;
    config::save(&ctx.config)
}
