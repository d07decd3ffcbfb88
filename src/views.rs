//! Read-only views derived from the repository's collections. Nothing here performs I/O.

use crate::models::{ChecklistItem, Priority, Project, ProjectShare, Task, Theme};
use chrono::{Duration, NaiveDate};
use uuid::Uuid;

/// Days past the reference date that still count as urgent.
pub const URGENCY_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    pub themes: &'a [Theme],
    pub projects: &'a [Project],
    pub tasks: &'a [Task],
    pub checklist_items: &'a [ChecklistItem],
    pub shares: &'a [ProjectShare],
}

/// A task with the names of its project and theme resolved. Missing parents leave `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct DecoratedTask {
    pub task: Task,
    pub project_name: Option<String>,
    pub theme_id: Option<Uuid>,
    pub theme_name: Option<String>,
    pub theme_color: Option<String>,
}

fn decorate(task: &Task, projects: &[Project], themes: &[Theme]) -> DecoratedTask {
    let project = projects.iter().find(|p| p.id == task.project_id);
    let theme = project.and_then(|p| themes.iter().find(|t| t.id == p.theme_id));

    DecoratedTask {
        task: task.clone(),
        project_name: project.map(|p| p.name.clone()),
        theme_id: theme.map(|t| t.id),
        theme_name: theme.map(|t| t.name.clone()),
        theme_color: theme.map(|t| t.color.clone()),
    }
}

fn horizon(today: NaiveDate) -> NaiveDate {
    today + Duration::days(URGENCY_WINDOW_DAYS)
}

/// Incomplete tasks due on or before `today + 7 days`, overdue ones included, by priority.
pub fn urgent_tasks(
    tasks: &[Task],
    projects: &[Project],
    themes: &[Theme],
    today: NaiveDate,
) -> Vec<DecoratedTask> {
    let until = horizon(today);
    let mut urgent: Vec<DecoratedTask> = tasks
        .iter()
        .filter(|t| !t.completed)
        .filter(|t| matches!(t.deadline, Some(d) if d <= until))
        .map(|t| decorate(t, projects, themes))
        .collect();

    urgent.sort_by_key(|t| t.task.priority);
    urgent
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UrgencyBuckets {
    pub overdue: Vec<DecoratedTask>,
    pub today: Vec<DecoratedTask>,
    pub this_week: Vec<DecoratedTask>,
}

impl UrgencyBuckets {
    pub fn len(&self) -> usize {
        self.overdue.len() + self.today.len() + self.this_week.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Splits urgent tasks into disjoint buckets. Each keeps the input order.
pub fn partition_by_urgency(urgent: &[DecoratedTask], today: NaiveDate) -> UrgencyBuckets {
    let until = horizon(today);
    let mut buckets = UrgencyBuckets::default();

    for t in urgent.iter() {
        match t.task.deadline {
            Some(d) if d < today => buckets.overdue.push(t.clone()),
            Some(d) if d == today => buckets.today.push(t.clone()),
            Some(d) if d <= until => buckets.this_week.push(t.clone()),
            _ => {}
        }
    }

    buckets
}

/// Every incomplete task, decorated.
pub fn active_tasks(snapshot: Snapshot<'_>) -> Vec<DecoratedTask> {
    snapshot
        .tasks
        .iter()
        .filter(|t| !t.completed)
        .map(|t| decorate(t, snapshot.projects, snapshot.themes))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreationOrder {
    Recent,
    Oldest,
}

pub fn sort_by_creation(tasks: &mut [DecoratedTask], order: CreationOrder) {
    match order {
        CreationOrder::Recent => tasks.sort_by(|a, b| b.task.created_at.cmp(&a.task.created_at)),
        CreationOrder::Oldest => tasks.sort_by(|a, b| a.task.created_at.cmp(&b.task.created_at)),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    Active,
    Completed,
    All,
}

impl StatusFilter {
    fn matches(self, task: &Task) -> bool {
        match self {
            StatusFilter::Active => !task.completed,
            StatusFilter::Completed => task.completed,
            StatusFilter::All => true,
        }
    }
}

/// `None` criteria match everything.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskFilter {
    pub theme: Option<Uuid>,
    pub priority: Option<Priority>,
    pub status: StatusFilter,
}

impl Default for TaskFilter {
    fn default() -> Self {
        TaskFilter {
            theme: None,
            priority: None,
            status: StatusFilter::All,
        }
    }
}

/// A task's theme is its project's theme; tasks whose project is gone never match a theme.
pub fn filter_tasks<'a>(tasks: &'a [Task], projects: &[Project], filter: &TaskFilter) -> Vec<&'a Task> {
    tasks
        .iter()
        .filter(|t| filter.status.matches(t))
        .filter(|t| filter.priority.map_or(true, |p| t.priority == p))
        .filter(|t| match filter.theme {
            Some(theme_id) => projects
                .iter()
                .any(|p| p.id == t.project_id && p.theme_id == theme_id),
            None => true,
        })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectFilter {
    pub theme: Option<Uuid>,
    pub search: Option<String>,
    pub priority: Option<Priority>,
}

fn matches_search(project: &Project, needle: &str) -> bool {
    project.name.to_lowercase().contains(needle)
        || project
            .description
            .as_ref()
            .map_or(false, |d| d.to_lowercase().contains(needle))
}

pub fn filter_projects<'a>(projects: &'a [Project], filter: &ProjectFilter) -> Vec<&'a Project> {
    let needle = filter
        .search
        .as_ref()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());

    projects
        .iter()
        .filter(|p| filter.theme.map_or(true, |id| p.theme_id == id))
        .filter(|p| filter.priority.map_or(true, |prio| p.priority == prio))
        .filter(|p| needle.as_ref().map_or(true, |n| matches_search(p, n)))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectSort {
    Name,
    Theme,
}

/// Stable; a project whose theme is missing sorts under the empty name.
pub fn sort_projects(projects: &mut [&Project], key: ProjectSort, themes: &[Theme]) {
    match key {
        ProjectSort::Name => projects.sort_by(|a, b| a.name.cmp(&b.name)),
        ProjectSort::Theme => {
            let theme_name = |p: &Project| -> String {
                themes
                    .iter()
                    .find(|t| t.id == p.theme_id)
                    .map(|t| t.name.clone())
                    .unwrap_or_default()
            };
            projects.sort_by_cached_key(|p| theme_name(*p));
        }
    }
}

/// One group per priority, highest first, each possibly empty.
pub fn group_projects_by_priority<'a>(projects: &[&'a Project]) -> Vec<(Priority, Vec<&'a Project>)> {
    Priority::ALL
        .iter()
        .map(|prio| {
            let group = projects
                .iter()
                .copied()
                .filter(|p| p.priority == *prio)
                .collect();
            (*prio, group)
        })
        .collect()
}

/// The project's shares that still grant access (pending or active).
pub fn project_shares(shares: &[ProjectShare], project_id: Uuid) -> Vec<&ProjectShare> {
    shares
        .iter()
        .filter(|s| s.project_id == project_id && s.is_active())
        .collect()
}

pub fn active_share_count(shares: &[ProjectShare], project_id: Uuid) -> usize {
    project_shares(shares, project_id).len()
}

pub fn checklist_for_project(items: &[ChecklistItem], project_id: Uuid) -> Vec<&ChecklistItem> {
    let mut list: Vec<&ChecklistItem> = items.iter().filter(|i| i.project_id == project_id).collect();
    list.sort_by_key(|i| i.position);
    list
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskCounts {
    pub active: usize,
    pub completed: usize,
    pub all: usize,
}

pub fn task_counts<'a, I: IntoIterator<Item = &'a Task>>(tasks: I) -> TaskCounts {
    tasks.into_iter().fold(TaskCounts::default(), |mut c, t| {
        if t.completed {
            c.completed += 1;
        } else {
            c.active += 1;
        }
        c.all += 1;
        c
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AccessLevel, ShareStatus};
    use chrono::{TimeZone, Utc};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn theme(name: &str) -> Theme {
        Theme {
            id: Uuid::new_v4(),
            name: name.to_string(),
            color: "blue".to_string(),
            user_id: Uuid::nil(),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn project(theme: &Theme, name: &str, priority: Priority) -> Project {
        Project {
            id: Uuid::new_v4(),
            theme_id: theme.id,
            name: name.to_string(),
            description: None,
            priority,
            is_checklist: false,
            user_id: Uuid::nil(),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn task(project: &Project, title: &str, priority: Priority, deadline: Option<NaiveDate>) -> Task {
        Task {
            id: Uuid::new_v4(),
            project_id: project.id,
            title: title.to_string(),
            description: None,
            deadline,
            priority,
            completed: false,
            user_id: Uuid::nil(),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn share(project_id: Uuid, status: ShareStatus) -> ProjectShare {
        ProjectShare {
            id: Uuid::new_v4(),
            project_id,
            owner_id: Uuid::nil(),
            shared_with_email: "friend@example.com".to_string(),
            access_level: AccessLevel::Read,
            invite_token: "token".to_string(),
            status,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            accepted_at: None,
        }
    }

    #[test]
    fn launch_scenario_lands_in_today() {
        let today = date(2024, 5, 1);
        let work = theme("Work");
        let launch = project(&work, "Launch", Priority::High);
        let ship = task(&launch, "Ship", Priority::High, Some(today));
        let themes = vec![work.clone()];
        let projects = vec![launch.clone()];
        let tasks = vec![ship.clone()];

        let urgent = urgent_tasks(&tasks, &projects, &themes, today);
        assert_eq!(urgent.len(), 1);
        assert_eq!(urgent[0].task.id, ship.id);
        assert_eq!(urgent[0].project_name.as_deref(), Some("Launch"));
        assert_eq!(urgent[0].theme_name.as_deref(), Some("Work"));
        assert_eq!(urgent[0].theme_color.as_deref(), Some("blue"));

        let buckets = partition_by_urgency(&urgent, today);
        assert!(buckets.overdue.is_empty());
        assert!(buckets.this_week.is_empty());
        assert_eq!(buckets.today.len(), 1);
    }

    #[test]
    fn urgency_window_is_inclusive_of_day_seven() {
        let today = date(2024, 5, 1);
        let t = theme("Home");
        let p = project(&t, "Chores", Priority::Medium);
        let mut done = task(&p, "done", Priority::High, Some(today));
        done.completed = true;
        let tasks = vec![
            task(&p, "edge", Priority::Low, Some(date(2024, 5, 8))),
            task(&p, "beyond", Priority::Low, Some(date(2024, 5, 9))),
            task(&p, "ancient", Priority::Low, Some(date(2020, 1, 1))),
            task(&p, "undated", Priority::High, None),
            done,
        ];

        let titles: Vec<String> = urgent_tasks(&tasks, &[p], &[t], today)
            .into_iter()
            .map(|t| t.task.title)
            .collect();
        assert_eq!(titles, vec!["edge".to_string(), "ancient".to_string()]);
    }

    #[test]
    fn urgent_tasks_are_ordered_by_priority_and_stable() {
        let today = date(2024, 5, 1);
        let t = theme("Work");
        let p = project(&t, "Launch", Priority::High);
        let tasks = vec![
            task(&p, "low", Priority::Low, Some(today)),
            task(&p, "high-a", Priority::High, Some(date(2024, 5, 3))),
            task(&p, "medium", Priority::Medium, Some(date(2024, 4, 1))),
            task(&p, "high-b", Priority::High, Some(today)),
        ];

        let urgent = urgent_tasks(&tasks, &[p], &[t], today);
        for pair in urgent.windows(2) {
            assert!(pair[0].task.priority <= pair[1].task.priority);
        }
        let titles: Vec<&str> = urgent.iter().map(|t| t.task.title.as_str()).collect();
        assert_eq!(titles, vec!["high-a", "high-b", "medium", "low"]);
    }

    #[test]
    fn missing_parents_leave_decoration_empty() {
        let today = date(2024, 5, 1);
        let t = theme("Gone");
        let orphan_project = project(&t, "Orphan", Priority::Medium);
        let tasks = vec![task(&orphan_project, "lonely", Priority::Medium, Some(today))];

        let urgent = urgent_tasks(&tasks, &[], &[], today);
        assert_eq!(urgent.len(), 1);
        assert_eq!(urgent[0].project_name, None);
        assert_eq!(urgent[0].theme_name, None);

        let with_project = urgent_tasks(&tasks, &[orphan_project], &[], today);
        assert_eq!(with_project[0].project_name.as_deref(), Some("Orphan"));
        assert_eq!(with_project[0].theme_color, None);
    }

    #[test]
    fn partition_is_exhaustive_and_disjoint() {
        let today = date(2024, 5, 1);
        let t = theme("Work");
        let p = project(&t, "Launch", Priority::High);
        let tasks: Vec<Task> = (-10..=7)
            .map(|offset| {
                task(
                    &p,
                    &format!("d{}", offset),
                    Priority::Medium,
                    Some(today + Duration::days(offset)),
                )
            })
            .collect();

        let urgent = urgent_tasks(&tasks, &[p], &[t], today);
        let buckets = partition_by_urgency(&urgent, today);
        assert_eq!(buckets.len(), urgent.len());
        assert_eq!(buckets.overdue.len(), 10);
        assert_eq!(buckets.today.len(), 1);
        assert_eq!(buckets.this_week.len(), 7);

        for u in urgent.iter() {
            let hits = [&buckets.overdue, &buckets.today, &buckets.this_week]
                .iter()
                .filter(|b| b.iter().any(|x| x.task.id == u.task.id))
                .count();
            assert_eq!(hits, 1);
        }
    }

    #[test]
    fn task_filters_are_conjunctive() {
        let work = theme("Work");
        let home = theme("Home");
        let launch = project(&work, "Launch", Priority::High);
        let garden = project(&home, "Garden", Priority::Low);
        let mut finished = task(&launch, "finished", Priority::High, None);
        finished.completed = true;
        let tasks = vec![
            task(&launch, "ship", Priority::High, None),
            task(&launch, "polish", Priority::Low, None),
            task(&garden, "weed", Priority::High, None),
            finished,
        ];
        let projects = vec![launch, garden];

        assert_eq!(filter_tasks(&tasks, &projects, &TaskFilter::default()).len(), 4);

        let filter = TaskFilter {
            theme: Some(work.id),
            priority: Some(Priority::High),
            status: StatusFilter::Active,
        };
        let titles: Vec<&str> = filter_tasks(&tasks, &projects, &filter)
            .iter()
            .map(|t| t.title.as_str())
            .collect();
        assert_eq!(titles, vec!["ship"]);

        let completed = TaskFilter {
            status: StatusFilter::Completed,
            ..Default::default()
        };
        assert_eq!(filter_tasks(&tasks, &projects, &completed).len(), 1);
    }

    #[test]
    fn project_search_is_case_insensitive_over_name_and_description() {
        let work = theme("Work");
        let mut launch = project(&work, "Launch", Priority::High);
        launch.description = Some("Ship the ROCKET".to_string());
        let report = project(&work, "Quarterly report", Priority::Medium);
        let projects = vec![launch, report];

        let by_desc = ProjectFilter {
            search: Some("rocket".to_string()),
            ..Default::default()
        };
        assert_eq!(filter_projects(&projects, &by_desc)[0].name, "Launch");

        let by_name = ProjectFilter {
            search: Some("  QUARTER ".to_string()),
            priority: Some(Priority::Medium),
            theme: Some(work.id),
        };
        assert_eq!(filter_projects(&projects, &by_name).len(), 1);

        let blank = ProjectFilter {
            search: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(filter_projects(&projects, &blank).len(), 2);
    }

    #[test]
    fn projects_sort_by_name_or_theme_name() {
        let alpha = theme("Alpha");
        let zulu = theme("Zulu");
        let missing = theme("Missing");
        let a = project(&zulu, "Apple", Priority::Medium);
        let b = project(&alpha, "Banana", Priority::Medium);
        let c = project(&missing, "Cherry", Priority::Medium);
        let themes = vec![alpha, zulu];

        let mut list = vec![&c, &a, &b];
        sort_projects(&mut list, ProjectSort::Name, &themes);
        assert_eq!(
            list.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(),
            vec!["Apple", "Banana", "Cherry"]
        );

        sort_projects(&mut list, ProjectSort::Theme, &themes);
        assert_eq!(
            list.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(),
            vec!["Cherry", "Banana", "Apple"]
        );
    }

    #[test]
    fn projects_group_by_priority() {
        let t = theme("Work");
        let a = project(&t, "a", Priority::Low);
        let b = project(&t, "b", Priority::High);
        let c = project(&t, "c", Priority::Low);

        let groups = group_projects_by_priority(&[&a, &b, &c]);
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].0, Priority::High);
        assert_eq!(groups[0].1.len(), 1);
        assert!(groups[1].1.is_empty());
        assert_eq!(
            groups[2].1.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(),
            vec!["a", "c"]
        );
    }

    #[test]
    fn revoked_shares_do_not_count() {
        let project_id = Uuid::new_v4();
        let other = Uuid::new_v4();
        let shares = vec![
            share(project_id, ShareStatus::Pending),
            share(project_id, ShareStatus::Active),
            share(project_id, ShareStatus::Revoked),
            share(other, ShareStatus::Active),
        ];

        assert_eq!(active_share_count(&shares, project_id), 2);
        assert!(project_shares(&shares, project_id)
            .iter()
            .all(|s| s.status != ShareStatus::Revoked));
        assert_eq!(active_share_count(&shares, Uuid::new_v4()), 0);
    }

    #[test]
    fn checklist_is_ordered_by_position() {
        let project_id = Uuid::new_v4();
        let item = |text: &str, position: i32| ChecklistItem {
            id: Uuid::new_v4(),
            project_id,
            text: text.to_string(),
            position,
            completed: false,
            user_id: Uuid::nil(),
        };
        let items = vec![item("c", 7), item("a", 1), item("b", 3)];

        let texts: Vec<&str> = checklist_for_project(&items, project_id)
            .iter()
            .map(|i| i.text.as_str())
            .collect();
        assert_eq!(texts, vec!["a", "b", "c"]);
    }

    #[test]
    fn counts_and_creation_order() {
        let t = theme("Work");
        let p = project(&t, "Launch", Priority::High);
        let mut first = task(&p, "first", Priority::Medium, None);
        let mut second = task(&p, "second", Priority::Medium, None);
        second.created_at = first.created_at + Duration::hours(1);
        first.completed = false;
        let mut third = task(&p, "third", Priority::Medium, None);
        third.completed = true;
        let tasks = vec![first, second, third];

        assert_eq!(
            task_counts(&tasks),
            TaskCounts {
                active: 2,
                completed: 1,
                all: 3
            }
        );

        let themes = vec![t];
        let projects = vec![p];
        let snapshot = Snapshot {
            themes: &themes,
            projects: &projects,
            tasks: &tasks,
            checklist_items: &[],
            shares: &[],
        };
        let mut active = active_tasks(snapshot);
        sort_by_creation(&mut active, CreationOrder::Recent);
        assert_eq!(active[0].task.title, "second");
        assert_eq!(active[0].theme_id, Some(themes[0].id));
        sort_by_creation(&mut active, CreationOrder::Oldest);
        assert_eq!(active[0].task.title, "first");
    }
}
