//! `/api/tasks` route handlers.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use serde::Deserialize;
use shared::{CreateTaskRequest, MsgResponse, Task, TaskListResponse, TaskView, UpdateTaskRequest};
use uuid::Uuid;

use crate::auth::Caller;
use crate::error::ApiError;
use crate::tasks::guard::authorize_mutation;
use crate::tasks::query::{self, TaskFilters, TaskPredicate};
use crate::AppState;

/// Raw query-string parameters. Everything arrives as optional strings so
/// that non-numeric or malformed values can fall back to defaults instead
/// of failing deserialization.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    page: Option<String>,
    limit: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
    date_field: Option<String>,
}

pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Query(params): Query<ListParams>,
) -> Result<Json<TaskListResponse>, ApiError> {
    let page = query::parse_positive(params.page.as_deref(), query::DEFAULT_PAGE);
    let limit = query::parse_positive(params.limit.as_deref(), query::DEFAULT_LIMIT);
    let filters = TaskFilters::parse(
        params.start_date.as_deref(),
        params.end_date.as_deref(),
        params.date_field.as_deref(),
    );
    let predicate = TaskPredicate::build(&caller, &filters);

    let snapshot = state.tasks.all().await?;
    let matched: Vec<Task> = snapshot
        .into_iter()
        .filter(|t| predicate.matches(t))
        .collect();
    let page = query::paginate(matched, page, limit);

    // Resolve owner display names for the page slice only.
    let mut names: HashMap<Uuid, String> = HashMap::new();
    let mut tasks = Vec::with_capacity(page.items.len());
    for task in page.items {
        let username = match names.get(&task.owner) {
            Some(name) => name.clone(),
            None => {
                let name = state
                    .users
                    .get(task.owner)
                    .await?
                    .map(|u| u.username)
                    .unwrap_or_else(|| "unknown".to_string());
                names.insert(task.owner, name.clone());
                name
            }
        };
        tasks.push(TaskView::new(task, username));
    }

    Ok(Json(TaskListResponse {
        tasks,
        total: page.total,
        page: page.page,
        total_pages: page.total_pages,
    }))
}

pub async fn create_task(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Json(req): Json<CreateTaskRequest>,
) -> Result<Json<Task>, ApiError> {
    let mut task = build_task(&caller, req)?;
    state.tasks.save(&mut task).await?;
    tracing::debug!(task_id = %task.id, "task created");
    Ok(Json(task))
}

pub async fn update_task(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTaskRequest>,
) -> Result<Json<Task>, ApiError> {
    let mut task = state
        .tasks
        .get(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".into()))?;
    authorize_mutation(&caller, &task)?;
    apply_update(&mut task, req)?;
    state.tasks.save(&mut task).await?;
    Ok(Json(task))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
) -> Result<Json<MsgResponse>, ApiError> {
    let task = state
        .tasks
        .get(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".into()))?;
    authorize_mutation(&caller, &task)?;
    if !state.tasks.delete(id).await? {
        // Lost a race with a concurrent delete.
        return Err(ApiError::NotFound("Task not found".into()));
    }
    tracing::debug!(task_id = %id, "task deleted");
    Ok(Json(MsgResponse {
        msg: "Task deleted".into(),
    }))
}

/// Assemble a new task from a create request. The owner is always the
/// caller; the request carries no owner field, so a task can never be
/// created on behalf of another user.
fn build_task(caller: &Caller, req: CreateTaskRequest) -> Result<Task, ApiError> {
    let title = normalize_title(&req.title)?;
    let mut task = Task::new(title, caller.id);
    if let Some(status) = req.status {
        task.status = status;
    }
    if let Some(priority) = req.priority {
        task.priority = priority;
    }
    task.due_date = req.due_date;
    Ok(task)
}

fn normalize_title(raw: &str) -> Result<String, ApiError> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(ApiError::Validation("Title is required".into()));
    }
    Ok(title.to_string())
}

/// Patch only the supplied fields; everything else keeps its prior value.
fn apply_update(task: &mut Task, req: UpdateTaskRequest) -> Result<(), ApiError> {
    if let Some(title) = req.title {
        task.title = normalize_title(&title)?;
    }
    if let Some(status) = req.status {
        task.status = status;
    }
    if let Some(priority) = req.priority {
        task.priority = priority;
    }
    if let Some(due_date) = req.due_date {
        task.due_date = Some(due_date);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use shared::{TaskPriority, TaskStatus};

    #[test]
    fn created_task_belongs_to_caller_with_defaults() {
        let caller = Caller {
            id: Uuid::new_v4(),
            role: shared::Role::User,
        };
        let task = build_task(
            &caller,
            CreateTaskRequest {
                title: "Buy milk".into(),
                status: None,
                priority: None,
                due_date: None,
            },
        )
        .unwrap();
        assert_eq!(task.owner, caller.id);
        assert_eq!(task.title, "Buy milk");
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.priority, TaskPriority::Medium);
    }

    #[test]
    fn create_honors_supplied_fields() {
        let caller = Caller {
            id: Uuid::new_v4(),
            role: shared::Role::User,
        };
        let task = build_task(
            &caller,
            CreateTaskRequest {
                title: "  Report  ".into(),
                status: Some(TaskStatus::Completed),
                priority: Some(TaskPriority::High),
                due_date: NaiveDate::from_ymd_opt(2024, 9, 1),
            },
        )
        .unwrap();
        assert_eq!(task.title, "Report");
        assert_eq!(task.status, TaskStatus::Completed);
        assert_eq!(task.priority, TaskPriority::High);
        assert_eq!(task.due_date, NaiveDate::from_ymd_opt(2024, 9, 1));
    }

    #[test]
    fn title_must_be_non_empty_after_trim() {
        assert!(normalize_title("Buy milk").is_ok());
        assert_eq!(normalize_title("  padded  ").unwrap(), "padded");
        assert!(matches!(normalize_title(""), Err(ApiError::Validation(_))));
        assert!(matches!(normalize_title("   "), Err(ApiError::Validation(_))));
    }

    #[test]
    fn update_patches_only_supplied_fields() {
        let mut task = Task::new("original".into(), Uuid::new_v4());
        task.due_date = NaiveDate::from_ymd_opt(2024, 6, 1);

        apply_update(
            &mut task,
            UpdateTaskRequest {
                status: Some(TaskStatus::Completed),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(task.title, "original");
        assert_eq!(task.status, TaskStatus::Completed);
        assert_eq!(task.priority, TaskPriority::Medium);
        assert_eq!(task.due_date, NaiveDate::from_ymd_opt(2024, 6, 1));
    }

    #[test]
    fn update_rejects_empty_title() {
        let mut task = Task::new("original".into(), Uuid::new_v4());
        let err = apply_update(
            &mut task,
            UpdateTaskRequest {
                title: Some("  ".into()),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        assert_eq!(task.title, "original");
    }

    #[test]
    fn update_never_touches_owner() {
        let owner = Uuid::new_v4();
        let mut task = Task::new("t".into(), owner);
        apply_update(
            &mut task,
            UpdateTaskRequest {
                title: Some("renamed".into()),
                status: Some(TaskStatus::Completed),
                priority: Some(TaskPriority::High),
                due_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            },
        )
        .unwrap();
        assert_eq!(task.owner, owner);
    }
}
