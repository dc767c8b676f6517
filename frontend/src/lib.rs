use chrono::NaiveDate;
use sauron::{
    html::{attributes::*, *},
    prelude::*,
};
use shared::{
    CreateTaskRequest, LoginRequest, LoginResponse, MsgResponse, RegisterRequest, Role, Task,
    TaskListResponse, TaskStatus, TaskView, UpdateTaskRequest,
};
use uuid::Uuid;
use wasm_bindgen_futures::JsFuture;
use web_sys::{window, Request, RequestInit, Response};

const PAGE_LIMIT: u64 = 5;

/// Authenticated session, held in the model and passed explicitly into
/// every API call. There is no global auth context and nothing persisted
/// in local storage: a page reload starts back at the login view.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    pub username: String,
    pub role: Role,
}

impl From<LoginResponse> for Session {
    fn from(resp: LoginResponse) -> Self {
        Self {
            token: resp.token,
            username: resp.username,
            role: resp.role,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Page {
    Login,
    Register,
    Tasks,
}

/// Local-only status tab, applied on top of the already paginated server
/// page. A tab can therefore show fewer than `limit` items even when more
/// matches exist on other pages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StatusTab {
    All,
    Pending,
    Completed,
}

impl StatusTab {
    fn label(&self) -> &'static str {
        match self {
            StatusTab::All => "All",
            StatusTab::Pending => "Pending",
            StatusTab::Completed => "Completed",
        }
    }

    fn accepts(&self, status: TaskStatus) -> bool {
        match self {
            StatusTab::All => true,
            StatusTab::Pending => status == TaskStatus::Pending,
            StatusTab::Completed => status == TaskStatus::Completed,
        }
    }
}

/// In-flight edit draft for a single task.
#[derive(Debug, Clone)]
pub struct EditDraft {
    id: Uuid,
    title: String,
    due_date: String,
}

#[derive(Debug, Clone)]
pub enum Msg {
    NavigateTo(Page),
    // Auth
    SetUsername(String),
    SetPassword(String),
    SubmitLogin,
    SubmitRegister,
    SessionStarted(Session),
    Registered(String),
    AuthFailed(String),
    Logout,
    // Task list
    LoadTasks,
    TasksLoaded(TaskListResponse),
    LoadFailed(String),
    SetTab(StatusTab),
    GoToPage(u64),
    // Filters
    SetStartDate(String),
    SetEndDate(String),
    SetDateField(String),
    ApplyFilters,
    ClearFilters,
    // Mutations
    SetNewTitle(String),
    SetNewDueDate(String),
    SubmitCreate,
    ToggleStatus(Uuid, TaskStatus),
    StartEdit(Uuid),
    SetEditTitle(String),
    SetEditDueDate(String),
    SaveEdit,
    CancelEdit,
    DeleteTask(Uuid),
    MutationDone(String),
    MutationFailed(String),
}

#[derive(Debug, Clone)]
pub struct Model {
    page: Page,
    session: Option<Session>,
    // Auth form
    username_input: String,
    password_input: String,
    auth_notice: Option<String>,
    // Server page of tasks
    tasks: Vec<TaskView>,
    total: u64,
    page_no: u64,
    total_pages: u64,
    loading: bool,
    // Filter selections
    start_input: String,
    end_input: String,
    date_field: String,
    filter_error: Option<String>,
    tab: StatusTab,
    // Create / edit drafts
    new_title: String,
    new_due_date: String,
    editing: Option<EditDraft>,
    notice: Option<String>,
}

impl Default for Model {
    fn default() -> Self {
        Self {
            page: Page::Login,
            session: None,
            username_input: String::new(),
            password_input: String::new(),
            auth_notice: None,
            tasks: Vec::new(),
            total: 0,
            page_no: 1,
            total_pages: 1,
            loading: false,
            start_input: String::new(),
            end_input: String::new(),
            date_field: "dueDate".to_string(),
            filter_error: None,
            tab: StatusTab::All,
            new_title: String::new(),
            new_due_date: String::new(),
            editing: None,
            notice: None,
        }
    }
}

impl Application for Model {
    type MSG = Msg;

    fn init(&mut self) -> Cmd<Msg> {
        Cmd::none()
    }

    fn update(&mut self, msg: Msg) -> Cmd<Msg> {
        match msg {
            Msg::NavigateTo(page) => {
                self.page = page;
                self.auth_notice = None;
                Cmd::none()
            }
            Msg::SetUsername(v) => {
                self.username_input = v;
                Cmd::none()
            }
            Msg::SetPassword(v) => {
                self.password_input = v;
                Cmd::none()
            }
            Msg::SubmitLogin => {
                let username = self.username_input.trim().to_string();
                let password = self.password_input.clone();
                if username.is_empty() || password.trim().is_empty() {
                    self.auth_notice = Some("Please enter both username and password".into());
                    return Cmd::none();
                }
                Cmd::new(async move {
                    match api_login(username, password).await {
                        Ok(session) => Msg::SessionStarted(session),
                        Err(e) => Msg::AuthFailed(e),
                    }
                })
            }
            Msg::SubmitRegister => {
                let username = self.username_input.trim().to_string();
                let password = self.password_input.clone();
                if username.is_empty() || password.trim().is_empty() {
                    self.auth_notice = Some("Please enter both username and password".into());
                    return Cmd::none();
                }
                Cmd::new(async move {
                    match api_register(username, password).await {
                        Ok(msg) => Msg::Registered(msg),
                        Err(e) => Msg::AuthFailed(e),
                    }
                })
            }
            Msg::SessionStarted(session) => {
                self.session = Some(session);
                self.page = Page::Tasks;
                self.password_input.clear();
                self.auth_notice = None;
                self.update(Msg::LoadTasks)
            }
            Msg::Registered(msg) => {
                self.page = Page::Login;
                self.password_input.clear();
                self.auth_notice = Some(msg);
                Cmd::none()
            }
            Msg::AuthFailed(e) => {
                self.auth_notice = Some(e);
                Cmd::none()
            }
            Msg::Logout => {
                *self = Model::default();
                Cmd::none()
            }
            Msg::LoadTasks => {
                let Some(session) = self.session.clone() else {
                    return Cmd::none();
                };
                self.loading = true;
                let page = self.page_no;
                let start = self.start_input.clone();
                let end = self.end_input.clone();
                let field = self.date_field.clone();
                Cmd::new(async move {
                    match api_fetch_tasks(&session, page, PAGE_LIMIT, &start, &end, &field).await {
                        Ok(resp) => Msg::TasksLoaded(resp),
                        Err(e) => Msg::LoadFailed(e),
                    }
                })
            }
            Msg::TasksLoaded(resp) => {
                // The server response replaces local state wholesale.
                self.tasks = resp.tasks;
                self.total = resp.total;
                self.page_no = resp.page;
                self.total_pages = resp.total_pages;
                self.loading = false;
                Cmd::none()
            }
            Msg::LoadFailed(e) => {
                self.loading = false;
                self.notice = Some(e);
                Cmd::none()
            }
            Msg::SetTab(tab) => {
                self.tab = tab;
                Cmd::none()
            }
            Msg::GoToPage(page) => {
                if page < 1 || page > self.total_pages || page == self.page_no {
                    return Cmd::none();
                }
                self.page_no = page;
                self.update(Msg::LoadTasks)
            }
            Msg::SetStartDate(v) => {
                self.start_input = v;
                Cmd::none()
            }
            Msg::SetEndDate(v) => {
                self.end_input = v;
                Cmd::none()
            }
            Msg::SetDateField(v) => {
                self.date_field = v;
                Cmd::none()
            }
            Msg::ApplyFilters => {
                // Only client-side check; the server accepts any range.
                if !self.start_input.is_empty()
                    && !self.end_input.is_empty()
                    && self.start_input > self.end_input
                {
                    self.filter_error = Some("Start date must not be after end date".into());
                    return Cmd::none();
                }
                self.filter_error = None;
                self.page_no = 1;
                self.update(Msg::LoadTasks)
            }
            Msg::ClearFilters => {
                self.start_input.clear();
                self.end_input.clear();
                self.date_field = "dueDate".to_string();
                self.filter_error = None;
                self.page_no = 1;
                self.update(Msg::LoadTasks)
            }
            Msg::SetNewTitle(v) => {
                self.new_title = v;
                Cmd::none()
            }
            Msg::SetNewDueDate(v) => {
                self.new_due_date = v;
                Cmd::none()
            }
            Msg::SubmitCreate => {
                let Some(session) = self.session.clone() else {
                    return Cmd::none();
                };
                if self.new_title.trim().is_empty() {
                    self.notice = Some("Title is required".into());
                    return Cmd::none();
                }
                let req = CreateTaskRequest {
                    title: self.new_title.trim().to_string(),
                    status: None,
                    priority: None,
                    due_date: parse_date_input(&self.new_due_date),
                };
                self.new_title.clear();
                self.new_due_date.clear();
                Cmd::new(async move {
                    match api_create_task(&session, &req).await {
                        Ok(_) => Msg::MutationDone("Task added".into()),
                        Err(e) => Msg::MutationFailed(e),
                    }
                })
            }
            Msg::ToggleStatus(id, current) => {
                let Some(session) = self.session.clone() else {
                    return Cmd::none();
                };
                let req = UpdateTaskRequest {
                    status: Some(current.toggled()),
                    ..Default::default()
                };
                Cmd::new(async move {
                    match api_update_task(&session, id, &req).await {
                        Ok(_) => Msg::MutationDone(String::new()),
                        Err(e) => Msg::MutationFailed(e),
                    }
                })
            }
            Msg::StartEdit(id) => {
                if let Some(task) = self.tasks.iter().find(|t| t.id == id) {
                    self.editing = Some(EditDraft {
                        id,
                        title: task.title.clone(),
                        due_date: task
                            .due_date
                            .map(|d| d.to_string())
                            .unwrap_or_default(),
                    });
                }
                Cmd::none()
            }
            Msg::SetEditTitle(v) => {
                if let Some(draft) = self.editing.as_mut() {
                    draft.title = v;
                }
                Cmd::none()
            }
            Msg::SetEditDueDate(v) => {
                if let Some(draft) = self.editing.as_mut() {
                    draft.due_date = v;
                }
                Cmd::none()
            }
            Msg::SaveEdit => {
                let Some(session) = self.session.clone() else {
                    return Cmd::none();
                };
                let Some(draft) = self.editing.clone() else {
                    return Cmd::none();
                };
                if draft.title.trim().is_empty() {
                    self.notice = Some("Title is required".into());
                    return Cmd::none();
                }
                self.editing = None;
                let req = UpdateTaskRequest {
                    title: Some(draft.title.trim().to_string()),
                    due_date: parse_date_input(&draft.due_date),
                    ..Default::default()
                };
                let id = draft.id;
                Cmd::new(async move {
                    match api_update_task(&session, id, &req).await {
                        Ok(_) => Msg::MutationDone("Task updated".into()),
                        Err(e) => Msg::MutationFailed(e),
                    }
                })
            }
            Msg::CancelEdit => {
                self.editing = None;
                Cmd::none()
            }
            Msg::DeleteTask(id) => {
                let Some(session) = self.session.clone() else {
                    return Cmd::none();
                };
                let confirmed = window()
                    .and_then(|w| w.confirm_with_message("Delete this task?").ok())
                    .unwrap_or(false);
                if !confirmed {
                    return Cmd::none();
                }
                Cmd::new(async move {
                    match api_delete_task(&session, id).await {
                        Ok(_) => Msg::MutationDone("Task deleted".into()),
                        Err(e) => Msg::MutationFailed(e),
                    }
                })
            }
            Msg::MutationDone(msg) => {
                // Re-fetch rather than patching locally: the displayed page
                // always comes from the server.
                self.notice = if msg.is_empty() { None } else { Some(msg) };
                self.update(Msg::LoadTasks)
            }
            Msg::MutationFailed(e) => {
                self.notice = Some(e);
                self.update(Msg::LoadTasks)
            }
        }
    }

    fn view(&self) -> Node<Msg> {
        div(
            [class("min-h-screen bg-ctp-base text-ctp-text")],
            [match self.page {
                Page::Login => self.view_auth_page(false),
                Page::Register => self.view_auth_page(true),
                Page::Tasks => self.view_tasks_page(),
            }],
        )
    }
}

impl Model {
    fn view_auth_page(&self, registering: bool) -> Node<Msg> {
        let (heading, submit_label, submit_msg, switch_label, switch_page) = if registering {
            ("Create Account", "Register", Msg::SubmitRegister, "Already have an account? Log in", Page::Login)
        } else {
            ("Task Dashboard", "Log in", Msg::SubmitLogin, "No account? Register", Page::Register)
        };
        div([class("flex items-center justify-center min-h-screen")], [
            div([class("bg-ctp-surface0 rounded-lg shadow-lg p-8 w-96 border border-ctp-surface1")], [
                h2([class("text-2xl font-bold text-ctp-text mb-6 text-center")], [text(heading)]),
                match &self.auth_notice {
                    Some(notice) => div(
                        [class("mb-4 px-3 py-2 rounded bg-ctp-surface1 text-sm text-ctp-peach")],
                        [text(notice)],
                    ),
                    None => span([], []),
                },
                input([
                    r#type("text"),
                    placeholder("Username"),
                    value(&self.username_input),
                    on_input(|event| Msg::SetUsername(event.value())),
                    class("w-full px-3 py-2 mb-4 bg-ctp-surface1 border border-ctp-surface2 rounded-md text-ctp-text placeholder-ctp-subtext0 focus:outline-none focus:ring-2 focus:ring-ctp-blue"),
                ], []),
                input([
                    r#type("password"),
                    placeholder("Password"),
                    value(&self.password_input),
                    on_input(|event| Msg::SetPassword(event.value())),
                    class("w-full px-3 py-2 mb-6 bg-ctp-surface1 border border-ctp-surface2 rounded-md text-ctp-text placeholder-ctp-subtext0 focus:outline-none focus:ring-2 focus:ring-ctp-blue"),
                ], []),
                button([
                    on_click(move |_| submit_msg.clone()),
                    class("w-full bg-ctp-blue hover:bg-ctp-sapphire text-ctp-base font-medium py-2 rounded-md transition-colors duration-200"),
                ], [text(submit_label)]),
                button([
                    on_click(move |_| Msg::NavigateTo(switch_page)),
                    class("w-full mt-4 text-sm text-ctp-subtext0 hover:text-ctp-text"),
                ], [text(switch_label)]),
            ]),
        ])
    }

    fn view_tasks_page(&self) -> Node<Msg> {
        div([class("max-w-4xl mx-auto px-6 py-8 space-y-6")], [
            self.view_header(),
            match &self.notice {
                Some(notice) => div(
                    [class("px-4 py-2 rounded bg-ctp-surface0 border border-ctp-surface1 text-sm text-ctp-peach")],
                    [text(notice)],
                ),
                None => span([], []),
            },
            self.view_filter_bar(),
            self.view_create_form(),
            self.view_tabs(),
            if self.loading {
                div([class("text-center py-10 text-ctp-subtext0 italic")], [text("Loading...")])
            } else {
                self.view_task_list()
            },
            self.view_pagination(),
        ])
    }

    fn view_header(&self) -> Node<Msg> {
        let (username, is_admin) = match &self.session {
            Some(s) => (s.username.clone(), s.role.is_admin()),
            None => (String::new(), false),
        };
        header([class("flex items-center justify-between")], [
            h1([class("text-2xl font-bold text-ctp-text")], [text("Task Dashboard")]),
            div([class("flex items-center space-x-4")], [
                span([class("text-ctp-subtext1")], [text(&username)]),
                if is_admin {
                    span([class("bg-ctp-mauve/20 text-ctp-mauve px-2 py-1 rounded-full text-xs font-medium")], [text("admin")])
                } else {
                    span([], [])
                },
                button([
                    on_click(|_| Msg::Logout),
                    class("bg-ctp-red/20 text-ctp-red hover:bg-ctp-red/30 px-4 py-2 rounded-md text-sm font-medium transition-colors duration-200"),
                ], [text("Logout")]),
            ]),
        ])
    }

    fn view_filter_bar(&self) -> Node<Msg> {
        div([class("bg-ctp-surface0 rounded-lg p-4 border border-ctp-surface1 space-y-3")], [
            div([class("flex flex-wrap items-end gap-3")], [
                div([], [
                    label([class("block text-xs text-ctp-subtext0 mb-1")], [text("From")]),
                    input([
                        r#type("date"),
                        value(&self.start_input),
                        on_input(|event| Msg::SetStartDate(event.value())),
                        class("px-2 py-1 bg-ctp-surface1 border border-ctp-surface2 rounded text-ctp-text"),
                    ], []),
                ]),
                div([], [
                    label([class("block text-xs text-ctp-subtext0 mb-1")], [text("To")]),
                    input([
                        r#type("date"),
                        value(&self.end_input),
                        on_input(|event| Msg::SetEndDate(event.value())),
                        class("px-2 py-1 bg-ctp-surface1 border border-ctp-surface2 rounded text-ctp-text"),
                    ], []),
                ]),
                div([class("flex items-center space-x-1")], [
                    self.date_field_button("Due date", "dueDate"),
                    self.date_field_button("Created", "createdAt"),
                ]),
                button([
                    on_click(|_| Msg::ApplyFilters),
                    class("bg-ctp-blue hover:bg-ctp-sapphire text-ctp-base px-4 py-1 rounded-md text-sm font-medium transition-colors duration-200"),
                ], [text("Apply")]),
                button([
                    on_click(|_| Msg::ClearFilters),
                    class("text-ctp-subtext0 hover:text-ctp-text px-2 py-1 text-sm"),
                ], [text("Clear")]),
            ]),
            match &self.filter_error {
                Some(err) => p([class("text-sm text-ctp-red")], [text(err)]),
                None => span([], []),
            },
        ])
    }

    fn date_field_button(&self, label_text: &str, field: &'static str) -> Node<Msg> {
        let active = self.date_field == field;
        button([
            on_click(move |_| Msg::SetDateField(field.to_string())),
            class(&format!(
                "px-3 py-1 rounded-md text-sm font-medium transition-colors duration-200 {}",
                if active {
                    "bg-ctp-blue text-ctp-base"
                } else {
                    "text-ctp-subtext0 hover:text-ctp-text bg-ctp-surface1"
                }
            )),
        ], [text(label_text)])
    }

    fn view_create_form(&self) -> Node<Msg> {
        div([class("bg-ctp-surface0 rounded-lg p-4 border border-ctp-surface1 flex gap-3")], [
            input([
                r#type("text"),
                placeholder("New task"),
                value(&self.new_title),
                on_input(|event| Msg::SetNewTitle(event.value())),
                class("flex-1 px-3 py-2 bg-ctp-surface1 border border-ctp-surface2 rounded-md text-ctp-text placeholder-ctp-subtext0 focus:outline-none focus:ring-2 focus:ring-ctp-blue"),
            ], []),
            input([
                r#type("date"),
                value(&self.new_due_date),
                on_input(|event| Msg::SetNewDueDate(event.value())),
                class("px-2 py-2 bg-ctp-surface1 border border-ctp-surface2 rounded-md text-ctp-text"),
            ], []),
            button([
                on_click(|_| Msg::SubmitCreate),
                class("bg-ctp-green hover:bg-ctp-teal text-ctp-base font-medium px-6 py-2 rounded-md transition-colors duration-200"),
            ], [text("Add")]),
        ])
    }

    fn view_tabs(&self) -> Node<Msg> {
        div(
            [class("flex space-x-2")],
            [StatusTab::All, StatusTab::Pending, StatusTab::Completed]
                .into_iter()
                .map(|tab| {
                    let active = self.tab == tab;
                    button([
                        on_click(move |_| Msg::SetTab(tab)),
                        class(&format!(
                            "px-3 py-1 rounded-full text-sm font-medium transition-colors duration-200 {}",
                            if active {
                                "bg-ctp-blue text-ctp-base"
                            } else {
                                "text-ctp-subtext0 hover:text-ctp-text bg-ctp-surface0"
                            }
                        )),
                    ], [text(tab.label())])
                })
                .collect::<Vec<_>>(),
        )
    }

    fn view_task_list(&self) -> Node<Msg> {
        let visible: Vec<&TaskView> = self
            .tasks
            .iter()
            .filter(|t| self.tab.accepts(t.status))
            .collect();
        if visible.is_empty() {
            return div([class("text-center py-12")], [
                h3([class("text-lg font-medium text-ctp-text mb-2")], [text("Nothing here")]),
                p([class("text-ctp-subtext0")], [text("No tasks on this page. Create one above or change the filters.")]),
            ]);
        }
        div(
            [class("space-y-3")],
            visible
                .iter()
                .map(|task| self.view_task(task))
                .collect::<Vec<_>>(),
        )
    }

    fn view_task(&self, task: &TaskView) -> Node<Msg> {
        if let Some(draft) = self.editing.as_ref().filter(|d| d.id == task.id) {
            return self.view_edit_row(task, draft);
        }
        let completed = task.status == TaskStatus::Completed;
        div(
            [
                key(task.id.to_string()),
                class(&format!(
                    "border rounded-lg p-4 bg-ctp-surface0 flex items-start gap-4 transition-all duration-200 {}",
                    if completed {
                        "border-ctp-green bg-ctp-green/10"
                    } else {
                        "border-ctp-surface1 hover:border-ctp-blue"
                    }
                )),
            ],
            [
                input([
                    r#type("checkbox"),
                    checked(completed),
                    on_click({
                        let id = task.id;
                        let status = task.status;
                        move |_| Msg::ToggleStatus(id, status)
                    }),
                    class("mt-1 w-5 h-5 accent-ctp-green cursor-pointer"),
                ], []),
                div([class("flex-1 min-w-0")], [
                    h3([class(&format!(
                        "text-lg font-semibold {}",
                        if completed { "line-through text-ctp-overlay1" } else { "text-ctp-text" }
                    ))], [text(&task.title)]),
                    div([class("flex flex-wrap gap-3 mt-1 text-sm text-ctp-subtext0")], [
                        span([], [text(&format!("by {}", task.owner.username))]),
                        span([], [text(&format!("priority: {}", task.priority))]),
                        match task.due_date {
                            Some(due) => span([], [text(&format!("due {}", due))]),
                            None => span([], []),
                        },
                        span([], [text(&format!("created {}", task.created_at.format("%Y-%m-%d")))]),
                    ]),
                ]),
                div([class("flex gap-2")], [
                    button([
                        on_click({
                            let id = task.id;
                            move |_| Msg::StartEdit(id)
                        }),
                        class("bg-ctp-blue/20 text-ctp-blue hover:bg-ctp-blue/30 px-3 py-1 rounded-md text-sm transition-colors duration-200"),
                    ], [text("Edit")]),
                    button([
                        on_click({
                            let id = task.id;
                            move |_| Msg::DeleteTask(id)
                        }),
                        class("bg-ctp-red/20 text-ctp-red hover:bg-ctp-red/30 px-3 py-1 rounded-md text-sm transition-colors duration-200"),
                    ], [text("Delete")]),
                ]),
            ],
        )
    }

    fn view_edit_row(&self, task: &TaskView, draft: &EditDraft) -> Node<Msg> {
        div(
            [
                key(task.id.to_string()),
                class("border border-ctp-blue rounded-lg p-4 bg-ctp-surface0 space-y-3"),
            ],
            [
                input([
                    r#type("text"),
                    value(&draft.title),
                    on_input(|event| Msg::SetEditTitle(event.value())),
                    class("w-full px-3 py-2 bg-ctp-surface1 border border-ctp-surface2 rounded-md text-ctp-text focus:outline-none focus:ring-2 focus:ring-ctp-blue"),
                ], []),
                input([
                    r#type("date"),
                    value(&draft.due_date),
                    on_input(|event| Msg::SetEditDueDate(event.value())),
                    class("px-2 py-1 bg-ctp-surface1 border border-ctp-surface2 rounded text-ctp-text"),
                ], []),
                div([class("flex gap-2")], [
                    button([
                        on_click(|_| Msg::SaveEdit),
                        class("bg-ctp-green hover:bg-ctp-teal text-ctp-base font-medium px-4 py-1 rounded-md transition-colors duration-200"),
                    ], [text("Save")]),
                    button([
                        on_click(|_| Msg::CancelEdit),
                        class("bg-ctp-overlay0 hover:bg-ctp-overlay1 text-ctp-text font-medium px-4 py-1 rounded-md transition-colors duration-200"),
                    ], [text("Cancel")]),
                ]),
            ],
        )
    }

    fn view_pagination(&self) -> Node<Msg> {
        let prev = self.page_no.saturating_sub(1);
        let next = self.page_no + 1;
        div([class("flex items-center justify-between")], [
            span([class("text-sm text-ctp-subtext0")], [
                text(&format!("{} task(s) total", self.total)),
            ]),
            div([class("flex items-center space-x-3")], [
                button([
                    on_click(move |_| Msg::GoToPage(prev)),
                    disabled(self.page_no <= 1),
                    class("px-3 py-1 rounded-md text-sm bg-ctp-surface0 text-ctp-subtext0 hover:text-ctp-text disabled:opacity-50"),
                ], [text("Prev")]),
                span([class("text-sm text-ctp-text")], [
                    text(&format!("Page {} of {}", self.page_no, self.total_pages)),
                ]),
                button([
                    on_click(move |_| Msg::GoToPage(next)),
                    disabled(self.page_no >= self.total_pages),
                    class("px-3 py-1 rounded-md text-sm bg-ctp-surface0 text-ctp-subtext0 hover:text-ctp-text disabled:opacity-50"),
                ], [text("Next")]),
            ]),
        ])
    }
}

fn parse_date_input(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

// ---------------------------------------------------------------------------
// API calls. Each takes the session explicitly; nothing reads global state.
// ---------------------------------------------------------------------------

async fn http_request(
    method: &str,
    url: &str,
    token: Option<&str>,
    body: Option<String>,
) -> Result<String, String> {
    let opts = RequestInit::new();
    opts.set_method(method);
    if let Some(body) = &body {
        opts.set_body(&wasm_bindgen::JsValue::from_str(body));
    }

    let request =
        Request::new_with_str_and_init(url, &opts).map_err(|_| "Failed to create request")?;
    if body.is_some() {
        request
            .headers()
            .set("Content-Type", "application/json")
            .map_err(|_| "Failed to set header")?;
    }
    if let Some(token) = token {
        request
            .headers()
            .set("Authorization", &format!("Bearer {}", token))
            .map_err(|_| "Failed to set header")?;
    }

    let promise = window()
        .ok_or("No window")?
        .fetch_with_request(&request);
    let response: Response = JsFuture::from(promise)
        .await
        .map_err(|_| "Request failed")?
        .into();

    let text_promise = response.text().map_err(|_| "Failed to read response")?;
    let text = JsFuture::from(text_promise)
        .await
        .map_err(|_| "Failed to read response")?
        .as_string()
        .ok_or("Failed to read response")?;

    if !response.ok() {
        // Error bodies are {"msg": ...}; fall back to the status code.
        let msg = serde_json::from_str::<MsgResponse>(&text)
            .map(|m| m.msg)
            .unwrap_or_else(|_| format!("Request failed ({})", response.status()));
        return Err(msg);
    }
    Ok(text)
}

async fn api_login(username: String, password: String) -> Result<Session, String> {
    let body = serde_json::to_string(&LoginRequest { username, password })
        .map_err(|_| "Failed to serialize request")?;
    let text = http_request("POST", "/api/auth/login", None, Some(body)).await?;
    let resp: LoginResponse =
        serde_json::from_str(&text).map_err(|e| format!("Failed to parse response: {}", e))?;
    Ok(resp.into())
}

async fn api_register(username: String, password: String) -> Result<String, String> {
    let body = serde_json::to_string(&RegisterRequest { username, password })
        .map_err(|_| "Failed to serialize request")?;
    let text = http_request("POST", "/api/auth/register", None, Some(body)).await?;
    let resp: MsgResponse =
        serde_json::from_str(&text).map_err(|e| format!("Failed to parse response: {}", e))?;
    Ok(resp.msg)
}

async fn api_fetch_tasks(
    session: &Session,
    page: u64,
    limit: u64,
    start: &str,
    end: &str,
    date_field: &str,
) -> Result<TaskListResponse, String> {
    let mut url = format!("/api/tasks?page={}&limit={}", page, limit);
    if !start.is_empty() {
        url.push_str(&format!("&startDate={}", start));
    }
    if !end.is_empty() {
        url.push_str(&format!("&endDate={}", end));
    }
    if !date_field.is_empty() {
        url.push_str(&format!("&dateField={}", date_field));
    }
    let text = http_request("GET", &url, Some(&session.token), None).await?;
    serde_json::from_str(&text).map_err(|e| format!("Failed to parse response: {}", e))
}

async fn api_create_task(session: &Session, req: &CreateTaskRequest) -> Result<Task, String> {
    let body = serde_json::to_string(req).map_err(|_| "Failed to serialize request")?;
    let text = http_request("POST", "/api/tasks", Some(&session.token), Some(body)).await?;
    serde_json::from_str(&text).map_err(|e| format!("Failed to parse response: {}", e))
}

async fn api_update_task(
    session: &Session,
    id: Uuid,
    req: &UpdateTaskRequest,
) -> Result<Task, String> {
    let body = serde_json::to_string(req).map_err(|_| "Failed to serialize request")?;
    let url = format!("/api/tasks/{}", id);
    let text = http_request("PUT", &url, Some(&session.token), Some(body)).await?;
    serde_json::from_str(&text).map_err(|e| format!("Failed to parse response: {}", e))
}

async fn api_delete_task(session: &Session, id: Uuid) -> Result<(), String> {
    let url = format!("/api/tasks/{}", id);
    http_request("DELETE", &url, Some(&session.token), None).await?;
    Ok(())
}

#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    Program::mount_to_body(Model::default());
}
