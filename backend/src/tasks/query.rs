//! Access-scoped task queries and pagination.
//!
//! `GET /api/tasks` is answered from one in-memory snapshot of the store:
//! build a predicate from the caller and the query string, filter the
//! snapshot, then sort/slice. Keeping the predicate a plain value keeps
//! all of the scoping and filtering rules unit-testable without Redis.

use chrono::NaiveDate;
use shared::Task;
use uuid::Uuid;

use crate::auth::Caller;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 5;

/// Which date attribute a range filter applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateField {
    DueDate,
    CreatedAt,
}

impl DateField {
    /// Anything other than the literal `createdAt` (including absence)
    /// selects the due date.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("createdAt") => DateField::CreatedAt,
            _ => DateField::DueDate,
        }
    }
}

/// Parsed filter parameters from the query string.
#[derive(Debug, Clone, Default)]
pub struct TaskFilters {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub date_field: Option<String>,
}

impl TaskFilters {
    pub fn parse(start: Option<&str>, end: Option<&str>, field: Option<&str>) -> Self {
        Self {
            start_date: parse_date(start),
            end_date: parse_date(end),
            date_field: field.map(str::to_string),
        }
    }
}

/// Lenient date parsing: empty or malformed values behave as absent,
/// the same way bad `page`/`limit` values fall back to defaults.
fn parse_date(raw: Option<&str>) -> Option<NaiveDate> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

/// Lenient positive-integer parsing for `page`/`limit`: missing,
/// non-numeric, or zero values fall back to the default. No error raised.
pub fn parse_positive(raw: Option<&str>, default: u64) -> u64 {
    raw.and_then(|s| s.trim().parse::<u64>().ok())
        .filter(|n| *n >= 1)
        .unwrap_or(default)
}

/// Filter condition applied to the task snapshot for one request.
#[derive(Debug, Clone)]
pub struct TaskPredicate {
    /// `None` for admins; everyone else only sees their own tasks.
    owner: Option<Uuid>,
    date_field: DateField,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
}

impl TaskPredicate {
    /// Admins get an unscoped predicate; other callers are restricted to
    /// tasks they own. The start/end ordering is deliberately not checked
    /// here (client-side validation only).
    pub fn build(caller: &Caller, filters: &TaskFilters) -> Self {
        Self {
            owner: if caller.role.is_admin() {
                None
            } else {
                Some(caller.id)
            },
            date_field: DateField::parse(filters.date_field.as_deref()),
            start: filters.start_date,
            end: filters.end_date,
        }
    }

    pub fn matches(&self, task: &Task) -> bool {
        if let Some(owner) = self.owner {
            if task.owner != owner {
                return false;
            }
        }
        if self.start.is_none() && self.end.is_none() {
            return true;
        }
        // A task with no due date never matches a due-date range.
        let date = match self.date_field {
            DateField::DueDate => match task.due_date {
                Some(d) => d,
                None => return false,
            },
            DateField::CreatedAt => task.created_at.date_naive(),
        };
        if let Some(start) = self.start {
            if date < start {
                return false;
            }
        }
        if let Some(end) = self.end {
            if date > end {
                return false;
            }
        }
        true
    }
}

/// One page of the filtered snapshot.
#[derive(Debug)]
pub struct TaskPage {
    pub items: Vec<Task>,
    pub total: u64,
    pub page: u64,
    pub total_pages: u64,
}

/// Sort newest-first, then slice out the requested window.
///
/// `total` counts every match regardless of the window. `total_pages` is
/// clamped to at least 1 so an empty result still renders one empty page.
pub fn paginate(mut matched: Vec<Task>, page: u64, limit: u64) -> TaskPage {
    matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    let total = matched.len() as u64;
    let total_pages = std::cmp::max(total.div_ceil(limit), 1);
    // Saturate: an absurdly large page is valid input under lenient
    // parsing and must yield an empty page, not an overflow.
    let offset = (page - 1).saturating_mul(limit);
    let items = matched
        .into_iter()
        .skip(offset as usize)
        .take(limit as usize)
        .collect();
    TaskPage {
        items,
        total,
        page,
        total_pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use shared::Role;

    fn caller(role: Role) -> Caller {
        Caller {
            id: Uuid::new_v4(),
            role,
        }
    }

    fn at(date: &str) -> DateTime<Utc> {
        let d = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
        Utc.from_utc_datetime(&d.and_hms_opt(12, 0, 0).unwrap())
    }

    fn task_of(owner: Uuid, created: &str) -> Task {
        let mut t = Task::new("task".into(), owner);
        t.created_at = at(created);
        t.updated_at = t.created_at;
        t
    }

    fn due(mut t: Task, date: &str) -> Task {
        t.due_date = Some(NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap());
        t
    }

    #[test]
    fn non_admin_never_sees_foreign_tasks() {
        let me = caller(Role::User);
        let other = Uuid::new_v4();
        let pred = TaskPredicate::build(&me, &TaskFilters::default());
        assert!(pred.matches(&task_of(me.id, "2024-01-01")));
        assert!(!pred.matches(&task_of(other, "2024-01-01")));
    }

    #[test]
    fn admin_sees_everything() {
        let admin = caller(Role::Admin);
        let pred = TaskPredicate::build(&admin, &TaskFilters::default());
        assert!(pred.matches(&task_of(Uuid::new_v4(), "2024-01-01")));
        assert!(pred.matches(&task_of(admin.id, "2024-01-01")));
    }

    #[test]
    fn date_field_defaults_to_due_date() {
        assert_eq!(DateField::parse(None), DateField::DueDate);
        assert_eq!(DateField::parse(Some("createdAt")), DateField::CreatedAt);
        assert_eq!(DateField::parse(Some("dueDate")), DateField::DueDate);
        assert_eq!(DateField::parse(Some("bogus")), DateField::DueDate);
    }

    #[test]
    fn due_date_range_is_inclusive() {
        let admin = caller(Role::Admin);
        let filters = TaskFilters::parse(Some("2024-01-10"), Some("2024-01-20"), None);
        let pred = TaskPredicate::build(&admin, &filters);
        let owner = Uuid::new_v4();

        assert!(pred.matches(&due(task_of(owner, "2024-01-01"), "2024-01-10")));
        assert!(pred.matches(&due(task_of(owner, "2024-01-01"), "2024-01-20")));
        assert!(!pred.matches(&due(task_of(owner, "2024-01-01"), "2024-01-09")));
        assert!(!pred.matches(&due(task_of(owner, "2024-01-01"), "2024-01-21")));
        // No due date: excluded whenever a due-date range is present.
        assert!(!pred.matches(&task_of(owner, "2024-01-15")));
    }

    #[test]
    fn created_at_range_filters_by_calendar_day() {
        // Scenario E: only tasks created within the inclusive range match.
        let admin = caller(Role::Admin);
        let filters =
            TaskFilters::parse(Some("2024-01-01"), Some("2024-01-31"), Some("createdAt"));
        let pred = TaskPredicate::build(&admin, &filters);
        let owner = Uuid::new_v4();

        assert!(pred.matches(&task_of(owner, "2024-01-01")));
        assert!(pred.matches(&task_of(owner, "2024-01-31")));
        assert!(!pred.matches(&task_of(owner, "2023-12-31")));
        assert!(!pred.matches(&task_of(owner, "2024-02-01")));
    }

    #[test]
    fn open_ended_ranges() {
        let admin = caller(Role::Admin);
        let owner = Uuid::new_v4();

        let from = TaskPredicate::build(
            &admin,
            &TaskFilters::parse(Some("2024-06-01"), None, Some("createdAt")),
        );
        assert!(from.matches(&task_of(owner, "2024-06-01")));
        assert!(!from.matches(&task_of(owner, "2024-05-31")));

        let until = TaskPredicate::build(
            &admin,
            &TaskFilters::parse(None, Some("2024-06-01"), Some("createdAt")),
        );
        assert!(until.matches(&task_of(owner, "2024-06-01")));
        assert!(!until.matches(&task_of(owner, "2024-06-02")));
    }

    #[test]
    fn inverted_range_is_passed_through_unchecked() {
        // The server does not validate start <= end; an inverted range
        // simply matches nothing.
        let admin = caller(Role::Admin);
        let filters =
            TaskFilters::parse(Some("2024-02-01"), Some("2024-01-01"), Some("createdAt"));
        let pred = TaskPredicate::build(&admin, &filters);
        assert!(!pred.matches(&task_of(Uuid::new_v4(), "2024-01-15")));
    }

    #[test]
    fn lenient_param_parsing() {
        assert_eq!(parse_positive(None, DEFAULT_LIMIT), 5);
        assert_eq!(parse_positive(Some("3"), DEFAULT_LIMIT), 3);
        assert_eq!(parse_positive(Some("abc"), DEFAULT_LIMIT), 5);
        assert_eq!(parse_positive(Some(""), DEFAULT_LIMIT), 5);
        assert_eq!(parse_positive(Some("0"), DEFAULT_PAGE), 1);
        assert_eq!(parse_positive(Some("-2"), DEFAULT_PAGE), 1);

        assert_eq!(parse_date(Some("2024-01-05")), NaiveDate::from_ymd_opt(2024, 1, 5));
        assert_eq!(parse_date(Some("")), None);
        assert_eq!(parse_date(Some("garbage")), None);
        assert_eq!(parse_date(None), None);
    }

    #[test]
    fn page_two_of_seven_with_limit_five() {
        // Scenario D: 7 matches, page=2, limit=5 -> 2 items, 2 pages.
        let owner = Uuid::new_v4();
        let tasks: Vec<Task> = (1..=7)
            .map(|day| task_of(owner, &format!("2024-03-{:02}", day)))
            .collect();
        let page = paginate(tasks, 2, 5);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total, 7);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.page, 2);
    }

    #[test]
    fn items_never_exceed_limit_and_total_is_page_independent() {
        let owner = Uuid::new_v4();
        let tasks: Vec<Task> = (1..=13)
            .map(|day| task_of(owner, &format!("2024-03-{:02}", day)))
            .collect();
        for page_no in 1..=5 {
            let page = paginate(tasks.clone(), page_no, 5);
            assert!(page.items.len() <= 5);
            assert_eq!(page.total, 13);
            assert_eq!(page.total_pages, 3);
        }
    }

    #[test]
    fn page_beyond_total_pages_is_empty_with_unchanged_total() {
        let owner = Uuid::new_v4();
        let tasks: Vec<Task> = (1..=4)
            .map(|day| task_of(owner, &format!("2024-03-{:02}", day)))
            .collect();
        let page = paginate(tasks, 9, 5);
        assert!(page.items.is_empty());
        assert_eq!(page.total, 4);
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn huge_page_number_yields_empty_page_without_overflow() {
        let owner = Uuid::new_v4();
        let tasks: Vec<Task> = (1..=3)
            .map(|day| task_of(owner, &format!("2024-03-{:02}", day)))
            .collect();
        let page_no = parse_positive(Some("18446744073709551615"), DEFAULT_PAGE);
        assert_eq!(page_no, u64::MAX);
        let page = paginate(tasks, page_no, 5);
        assert!(page.items.is_empty());
        assert_eq!(page.total, 3);
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn empty_result_clamps_to_one_page() {
        let page = paginate(Vec::new(), 1, 5);
        assert!(page.items.is_empty());
        assert_eq!(page.total, 0);
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn items_are_sorted_newest_first() {
        let owner = Uuid::new_v4();
        let mut old = task_of(owner, "2024-01-01");
        old.title = "old".into();
        let mut new = task_of(owner, "2024-05-01");
        new.title = "new".into();
        let mut mid = task_of(owner, "2024-03-01");
        mid.title = "mid".into();

        let page = paginate(vec![old, new, mid], 1, 5);
        let titles: Vec<&str> = page.items.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["new", "mid", "old"]);
    }
}
