use super::{ensure_success, read_json, send_read, Session};
use crate::libs::config::ConfigModule;
use crate::libs::error::SyncError;
use crate::libs::messages::Message;
use crate::msg_print;
use anyhow::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use dialoguer::{theme::ColorfulTheme, Input};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};

pub const DEFAULT_API_URL: &str = "https://api.track.toggl.com/api/v9";
pub const SECRET_SITE: &str = "toggl";
pub const SECRET_LOGIN: &str = "api_token";
const PAGE_SIZE: usize = 200;

/// A Toggl project.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Project {
    pub id: u64,
    pub name: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// A Toggl time entry. A negative duration means the timer is still running.
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct TimeEntry {
    pub id: u64,
    #[serde(default)]
    pub project_id: Option<u64>,
    #[serde(default)]
    pub description: Option<String>,
    pub start: DateTime<Utc>,
    pub duration: i64,
}

/// Fields changed by a project update. Unset fields are left untouched.
#[derive(Serialize, Clone, Debug, Default, PartialEq)]
pub struct ProjectUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

#[derive(Serialize)]
struct NewProject<'a> {
    name: &'a str,
    active: bool,
}

#[derive(Deserialize)]
struct Workspace {
    id: u64,
}

#[derive(Debug)]
pub struct Toggl {
    client: Client,
    config: TogglConfig,
    api_token: Option<String>,
    workspace_id: Option<u64>,
    retries: i32,
}

impl Session for Toggl {
    fn service(&self) -> &'static str {
        "Toggl"
    }

    fn site(&self) -> String {
        SECRET_SITE.to_string()
    }

    fn login_name(&self) -> String {
        SECRET_LOGIN.to_string()
    }

    fn secret_prompt(&self) -> Message {
        Message::PromptTogglToken
    }

    /// The API token is the credential itself, so there is no separate
    /// session to cache.
    fn stored_token(&self) -> Option<String> {
        None
    }

    fn store_token(&mut self, _token: &str) -> Result<()> {
        Ok(())
    }

    async fn resume(&mut self, token: &str) -> Result<bool> {
        self.api_token = Some(token.to_string());
        self.verify().await
    }

    async fn login(&mut self, secret: &str) -> Result<String> {
        let secret = secret.trim();
        if !self.resume(secret).await? {
            self.api_token = None;
            return Err(SyncError::AuthenticationRejected("API token rejected".to_string()).into());
        }
        Ok(secret.to_string())
    }

    fn retry(&self) -> i32 {
        self.retries
    }

    fn inc_retry(&mut self) {
        self.retries += 1;
    }
}

impl Toggl {
    pub fn new(config: &TogglConfig) -> Self {
        Self {
            client: Client::new(),
            config: config.clone(),
            api_token: None,
            workspace_id: config.workspace_id,
            retries: 0,
        }
    }

    /// Client with a known API token, skipping the credential chain.
    pub fn with_api_token(config: &TogglConfig, api_token: &str) -> Self {
        Self {
            api_token: Some(api_token.to_string()),
            ..Self::new(config)
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.api_url().trim_end_matches('/'), path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_token {
            Some(token) => request.basic_auth(token, Some(SECRET_LOGIN)),
            None => request,
        }
    }

    /// `GET /me`: `Ok(false)` when the token is rejected.
    async fn verify(&self) -> Result<bool> {
        let res = send_read(self.authorize(self.client.get(self.url("me")))).await?;
        match res.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(false),
            _ => {
                ensure_success(res).await?;
                Ok(true)
            }
        }
    }

    /// Configured workspace, else the first workspace of the user.
    pub async fn workspace_id(&mut self) -> Result<u64> {
        if let Some(id) = self.workspace_id {
            return Ok(id);
        }
        let res = send_read(self.authorize(self.client.get(self.url("me/workspaces")))).await?;
        let workspaces: Vec<Workspace> = read_json(res).await?;
        let id = workspaces
            .first()
            .map(|workspace| workspace.id)
            .ok_or_else(|| SyncError::domain(Message::WorkspaceNotFound))?;
        self.workspace_id = Some(id);
        Ok(id)
    }

    /// All projects of the workspace, active and archived.
    pub async fn projects(&mut self) -> Result<Vec<Project>> {
        let workspace_id = self.workspace_id().await?;
        let url = self.url(&format!("workspaces/{}/projects", workspace_id));
        let mut projects = Vec::new();
        let mut page = 1;

        loop {
            let request = self.client.get(&url).query(&[
                ("active", "both".to_string()),
                ("page", page.to_string()),
                ("per_page", PAGE_SIZE.to_string()),
            ]);
            let batch: Option<Vec<Project>> = read_json(send_read(self.authorize(request)).await?).await?;
            let batch = batch.unwrap_or_default();
            let last = batch.len() < PAGE_SIZE;
            projects.extend(batch);
            if last {
                break;
            }
            page += 1;
        }

        Ok(projects)
    }

    pub async fn create_project(&mut self, name: &str) -> Result<Project> {
        let workspace_id = self.workspace_id().await?;
        let url = self.url(&format!("workspaces/{}/projects", workspace_id));
        let request = self.client.post(url).json(&NewProject { name, active: true });
        read_json(self.authorize(request).send().await?).await
    }

    pub async fn update_project(&mut self, project_id: u64, update: &ProjectUpdate) -> Result<Project> {
        let workspace_id = self.workspace_id().await?;
        let url = self.url(&format!("workspaces/{}/projects/{}", workspace_id, project_id));
        let request = self.client.put(url).json(update);
        read_json(self.authorize(request).send().await?).await
    }

    /// Time entries started within `[start, end)`.
    pub async fn time_entries(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<TimeEntry>> {
        let request = self.client.get(self.url("me/time_entries")).query(&[
            ("start_date", start.to_rfc3339_opts(SecondsFormat::Secs, true)),
            ("end_date", end.to_rfc3339_opts(SecondsFormat::Secs, true)),
        ]);
        read_json(send_read(self.authorize(request)).await?).await
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct TogglConfig {
    /// Workspace to use; the first workspace of the user when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_id: Option<u64>,

    /// API base URL override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
}

impl TogglConfig {
    pub fn module() -> ConfigModule {
        ConfigModule {
            key: "toggl".to_string(),
            name: "Toggl".to_string(),
        }
    }

    pub fn api_url(&self) -> &str {
        self.api_url.as_deref().unwrap_or(DEFAULT_API_URL)
    }

    pub fn init(config: &Option<Self>) -> Result<Self> {
        let config = config.clone().unwrap_or_default();
        let theme = ColorfulTheme::default();
        msg_print!(Message::ConfigModuleToggl);

        let workspace: String = Input::with_theme(&theme)
            .with_prompt(Message::PromptTogglWorkspace.to_string())
            .default(config.workspace_id.map(|id| id.to_string()).unwrap_or_default())
            .allow_empty(true)
            .validate_with(|input: &String| -> Result<(), &str> {
                if input.trim().is_empty() || input.trim().parse::<u64>().is_ok() {
                    Ok(())
                } else {
                    Err("Workspace id must be a number")
                }
            })
            .interact_text()?;

        let api_url: String = Input::with_theme(&theme)
            .with_prompt(Message::PromptTogglApiUrl.to_string())
            .default(config.api_url().to_string())
            .interact_text()?;
        let api_url = api_url.trim().trim_end_matches('/').to_string();

        Ok(Self {
            workspace_id: workspace.trim().parse().ok(),
            api_url: (api_url != DEFAULT_API_URL).then_some(api_url),
        })
    }
}
