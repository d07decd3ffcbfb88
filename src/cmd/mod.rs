pub mod auth;
pub mod checklist;
pub mod dashboard;
pub mod projects;
pub mod shares;
pub mod tasks;
pub mod themes;

use crate::{
    command::{Command, CommandParams},
    context::Context,
};
use anyhow::{anyhow, bail, Result};
use chrono::{Duration, NaiveDate};
use tasktree::{models::Priority, utils};
use uuid::Uuid;

pub fn root() -> Command {
    Command {
        name: "tasktree",
        aliases: vec![],
        description: "Themes, projects, tasks and checklists",
        params: CommandParams::None,
        action: dashboard::show,
        flags: vec![],
        subcommands: vec![
            auth::signup(),
            auth::login(),
            auth::logout(),
            dashboard::command(),
            themes::command(),
            projects::command(),
            tasks::command(),
            checklist::command(),
            shares::command(),
        ],
    }
}

/// Finds the single id starting with `prefix`.
pub fn find_id<I: IntoIterator<Item = Uuid>>(ids: I, prefix: &str, what: &str) -> Result<Uuid> {
    let prefix = prefix.to_lowercase();
    let mut matches = ids
        .into_iter()
        .filter(|id| id.to_string().starts_with(&prefix));

    match (matches.next(), matches.next()) {
        (Some(id), None) => Ok(id),
        (None, _) => Err(anyhow!("No {} matches '{}'", what, prefix)),
        (Some(_), Some(_)) => Err(anyhow!("'{}' matches more than one {}", prefix, what)),
    }
}

pub fn find_theme(ctx: &Context, prefix: &str) -> Result<Uuid> {
    find_id(ctx.repo.themes().iter().map(|t| t.id), prefix, "theme")
}

pub fn find_project(ctx: &Context, prefix: &str) -> Result<Uuid> {
    find_id(ctx.repo.projects().iter().map(|p| p.id), prefix, "project")
}

/// The `--theme` flag, or the selected theme when `fallback` is set.
pub fn theme_flag(ctx: &Context, fallback: bool) -> Result<Option<Uuid>> {
    match ctx.flag("theme") {
        Some(prefix) if prefix == "all" => Ok(None),
        Some(prefix) => Ok(Some(find_theme(ctx, prefix)?)),
        None if fallback => Ok(ctx.repo.active_theme()),
        None => Ok(None),
    }
}

pub fn priority_flag(ctx: &Context) -> Result<Option<Priority>> {
    match ctx.flag("priority").map(String::as_str) {
        None | Some("all") => Ok(None),
        Some(value) => Ok(Some(parse_priority(value)?)),
    }
}

pub fn parse_priority(value: &str) -> Result<Priority> {
    match value.to_lowercase().as_str() {
        "1" | "high" => Ok(Priority::High),
        "2" | "medium" => Ok(Priority::Medium),
        "3" | "low" => Ok(Priority::Low),
        _ => bail!("Unknown priority '{}'", value),
    }
}

pub fn parse_date(value: &str) -> Result<NaiveDate> {
    let today = utils::today();
    match value {
        "today" => Ok(today),
        "tomorrow" => Ok(today + Duration::days(1)),
        _ => NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map_err(|_| anyhow!("Invalid date '{}', expected YYYY-MM-DD", value)),
    }
}

/// The `--desc` flag as a patch: unset leaves the description, `none` clears it.
pub fn description_patch(ctx: &Context) -> Option<Option<String>> {
    ctx.flag("desc").map(|d| match d.as_str() {
        "none" => None,
        _ => Some(d.clone()),
    })
}

pub fn required<'a>(ctx: &'a Context, flag: &str) -> Result<&'a String> {
    ctx.flag(flag)
        .ok_or_else(|| anyhow!("The --{} flag is required", flag))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use tasktree::{HttpStore, Repository};

    fn context_with(flags: &[(&'static str, &str)]) -> Context {
        Context {
            repo: Repository::new(HttpStore::new("http://localhost", "anon")),
            config: Config::default(),
            runtime: tokio::runtime::Builder::new_current_thread().build().unwrap(),
            data: flags.iter().map(|(k, v)| (*k, v.to_string())).collect(),
            params: Vec::new(),
        }
    }

    #[test]
    fn desc_flag_sets_or_clears_the_description() {
        assert_eq!(description_patch(&context_with(&[])), None);
        assert_eq!(description_patch(&context_with(&[("desc", "none")])), Some(None));
        assert_eq!(
            description_patch(&context_with(&[("desc", "Q3 goals")])),
            Some(Some("Q3 goals".to_string()))
        );
    }

    #[test]
    fn ids_resolve_by_unique_prefix() {
        let a = Uuid::parse_str("aaaa1111-0000-4000-8000-000000000000").unwrap();
        let b = Uuid::parse_str("aaab2222-0000-4000-8000-000000000000").unwrap();

        assert_eq!(find_id(vec![a, b], "AAAA", "task").unwrap(), a);
        assert!(find_id(vec![a, b], "aaa", "task").is_err());
        assert!(find_id(vec![a, b], "ffff", "task").is_err());
    }

    #[test]
    fn priorities_parse_by_number_or_name() {
        assert_eq!(parse_priority("1").unwrap(), Priority::High);
        assert_eq!(parse_priority("Low").unwrap(), Priority::Low);
        assert!(parse_priority("urgent").is_err());
    }

    #[test]
    fn dates_parse_iso_and_keywords() {
        assert_eq!(
            parse_date("2024-05-01").unwrap(),
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
        );
        assert_eq!(parse_date("tomorrow").unwrap(), utils::today() + Duration::days(1));
        assert!(parse_date("05/01/2024").is_err());
    }
}
