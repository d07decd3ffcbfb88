use anyhow::{Context, Result};
use std::io::{stdin, stdout, Write};

pub fn get_stdin_input(prompt: &str) -> Result<String> {
    print!("{}", prompt);
    stdout().flush().context("Failed to flush stdout")?;

    let mut message = String::new();
    stdin()
        .read_line(&mut message)
        .context("Failed to get input")?;

    Ok(message.trim_end().to_string())
}

pub fn get_password(prompt: &str) -> Result<String> {
    rpassword::prompt_password(prompt).context("Failed to read password")
}
