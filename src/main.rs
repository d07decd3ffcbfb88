mod cmd;
mod command;
mod config;
mod context;
mod input;
mod output;

use context::Context;
use std::env;

fn main() {
    env_logger::init();

    let mut ctx = match Context::new() {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Aborting: {:#}", e);
            std::process::exit(1);
        }
    };

    let args: Vec<String> = env::args().collect();
    cmd::root().run(&mut ctx, &args[1..]);
}
