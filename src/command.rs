use crate::context::Context;
use anyhow::Result;

pub struct Command {
    pub name: &'static str,
    pub aliases: Vec<&'static str>,
    pub description: &'static str,
    pub params: CommandParams,
    pub action: fn(ctx: &mut Context) -> Result<()>,
    pub subcommands: Vec<Command>,
    pub flags: Vec<Flag>,
}

impl Command {
    pub fn run(&self, ctx: &mut Context, args: &[String]) {
        if args.is_empty() {
            self.execute(ctx);
            return;
        }

        let cmd = args[0].as_str();
        match cmd {
            "help" | "--help" | "-h" => self.print_help_and_exit(0),
            _ => {
                if let Some(command) = self
                    .subcommands
                    .iter()
                    .find(|c| c.name == cmd || c.aliases.iter().any(|a| *a == cmd))
                {
                    command.run(ctx, &args[1..]);
                    return;
                }

                let mut arg_iter = args.iter();
                while let Some(a) = arg_iter.next() {
                    let flag = if let Some(name) = a.strip_prefix("--") {
                        self.flags.iter().find(|f| f.name() == name)
                    } else if a.starts_with('-') && a.len() > 1 {
                        let short = &a[1..];
                        self.flags.iter().find(|f| f.short() == short)
                    } else {
                        self.push_param(ctx, a);
                        continue;
                    };

                    match flag {
                        Some(Flag::Flag(desc)) => match arg_iter.next() {
                            Some(v) => {
                                ctx.data.insert(desc.name, v.to_string());
                            }
                            None => {
                                eprintln!("Aborting: flag '{}' is missing the value", desc.name);
                                self.print_help_and_exit(1);
                            }
                        },
                        Some(Flag::Switch(desc)) => {
                            ctx.data.insert(desc.name, String::new());
                        }
                        None => {
                            eprintln!("Aborting: unknown flag '{}'", a);
                            self.print_help_and_exit(1);
                        }
                    }
                }

                self.execute(ctx);
            }
        }
    }

    fn push_param(&self, ctx: &mut Context, a: &str) {
        match self.params {
            CommandParams::None => {
                eprintln!("Aborting: unexpected parameter {}", a);
                self.print_help_and_exit(1);
            }
            CommandParams::Single(_) => {
                if ctx.params.len() == 1 {
                    eprintln!("Aborting: too many parameters: {}", a);
                    self.print_help_and_exit(1);
                }
                ctx.params.push(a.to_string());
            }
            CommandParams::Multi(_) => ctx.params.push(a.to_string()),
        }
    }

    fn execute(&self, ctx: &mut Context) {
        if let Err(e) = (self.action)(ctx) {
            log::debug!("{} failed: {:?}", self.name, e);
            eprintln!("Aborting: {:#}", e);
            std::process::exit(1);
        }
    }

    fn print_help_and_exit(&self, code: i32) {
        let mut buf = Vec::new();
        buf.push(format!("\nUsage: {}", self.name));

        if !self.subcommands.is_empty() {
            buf.push(" COMMAND".to_string());
        }

        if !self.flags.is_empty() {
            buf.push(" OPTIONS".to_string());
        }

        match self.params {
            CommandParams::Single(name) => buf.push(format!(" {}", name)),
            CommandParams::Multi(name) => buf.push(format!(" {0} [{0}...]", name)),
            _ => {}
        }

        buf.push(format!("\n\n{}\n", self.description));

        if !self.subcommands.is_empty() {
            buf.push("\nCommands:".to_string());

            for c in self.subcommands.iter() {
                buf.push(format!("\n  {:<10}    {}", c.name, c.description));
            }
        }

        if !self.flags.is_empty() {
            buf.push("\nOptions:".to_string());

            for f in self.flags.iter() {
                let flag_str = format!("-{} --{}", f.short(), f.name());
                buf.push(format!("\n  {:<18}    {}", flag_str, f.description()));
            }
        }

        println!("{}", buf.join(""));
        std::process::exit(code);
    }
}

pub enum CommandParams {
    None,
    Single(&'static str),
    Multi(&'static str),
}

#[derive(Copy, Clone)]
pub struct FlagDescription {
    pub name: &'static str,
    pub short: &'static str,
    pub description: &'static str,
}

#[derive(Copy, Clone)]
pub enum Flag {
    Flag(FlagDescription),
    Switch(FlagDescription),
}

pub mod flags {
    pub mod flag {
        use crate::command::{Flag, FlagDescription};

        fn flag(name: &'static str, short: &'static str, description: &'static str) -> Flag {
            Flag::Flag(FlagDescription {
                name,
                short,
                description,
            })
        }

        pub fn theme(description: Option<&'static str>) -> Flag {
            flag("theme", "t", description.unwrap_or("The theme to use"))
        }

        pub fn project(description: Option<&'static str>) -> Flag {
            flag("project", "p", description.unwrap_or("The project to use"))
        }

        pub fn priority(description: Option<&'static str>) -> Flag {
            flag("priority", "P", description.unwrap_or("Priority: 1|high, 2|medium, 3|low"))
        }

        pub fn name(description: Option<&'static str>) -> Flag {
            flag("name", "N", description.unwrap_or("Name"))
        }

        pub fn desc(description: Option<&'static str>) -> Flag {
            flag("desc", "d", description.unwrap_or("Description, 'none' clears it"))
        }

        pub fn color(description: Option<&'static str>) -> Flag {
            flag("color", "c", description.unwrap_or("Display colour"))
        }

        pub fn deadline(description: Option<&'static str>) -> Flag {
            flag("deadline", "D", description.unwrap_or("Deadline: YYYY-MM-DD, today, tomorrow or none"))
        }

        pub fn status(description: Option<&'static str>) -> Flag {
            flag("status", "s", description.unwrap_or("Status: active, completed or all"))
        }

        pub fn search(description: Option<&'static str>) -> Flag {
            flag("search", "S", description.unwrap_or("Case-insensitive text search"))
        }

        pub fn sort(description: Option<&'static str>) -> Flag {
            flag("sort", "o", description.unwrap_or("Sort order"))
        }

        pub fn email(description: Option<&'static str>) -> Flag {
            flag("email", "e", description.unwrap_or("Email address"))
        }

        pub fn access(description: Option<&'static str>) -> Flag {
            flag("access", "a", description.unwrap_or("Access level: read or edit"))
        }
    }

    pub mod switch {
        use crate::command::{Flag, FlagDescription};

        fn switch(name: &'static str, short: &'static str, description: &'static str) -> Flag {
            Flag::Switch(FlagDescription {
                name,
                short,
                description,
            })
        }

        pub fn new(description: Option<&'static str>) -> Flag {
            switch("new", "n", description.unwrap_or("Create new"))
        }

        pub fn delete(description: Option<&'static str>) -> Flag {
            switch("delete", "x", description.unwrap_or("Delete existing"))
        }

        pub fn checklist(description: Option<&'static str>) -> Flag {
            switch("checklist", "l", description.unwrap_or("Create as a checklist"))
        }
    }
}

impl Flag {
    pub fn name(self) -> &'static str {
        match self {
            Flag::Flag(desc) => desc.name,
            Flag::Switch(desc) => desc.name,
        }
    }

    pub fn short(self) -> &'static str {
        match self {
            Flag::Flag(desc) => desc.short,
            Flag::Switch(desc) => desc.short,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Flag::Flag(desc) => desc.description,
            Flag::Switch(desc) => desc.description,
        }
    }
}
