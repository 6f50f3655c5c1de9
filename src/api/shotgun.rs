use super::{ensure_success, read_json, send_read, Credentials, ExistingWorkLog, Session, Tracker};
use crate::libs::aggregate::WorkLog;
use crate::libs::config::{Config, ConfigModule};
use crate::libs::error::SyncError;
use crate::libs::messages::Message;
use crate::libs::prompt::Prompt;
use crate::libs::ticket::{NamePattern, TicketId, TrackedItem};
use crate::{msg_debug, msg_print};
use anyhow::Result;
use chrono::NaiveDate;
use dialoguer::{theme::ColorfulTheme, Input};
use reqwest::{header::CONTENT_TYPE, Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;

const AUTH_URL: &str = "api/v1/auth/access_token";
const ENTITY_URL: &str = "api/v1/entity";
/// Content type for `_search` bodies whose filters are nested arrays.
const ARRAY_FILTERS: &str = "application/vnd+shotgun.api3_array+json";
const PAGE_SIZE: u32 = 500;
const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Deserialize, Debug)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
}

#[derive(Deserialize, Debug)]
struct Page<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

#[derive(Deserialize, Debug)]
struct Single<T> {
    data: T,
}

#[derive(Deserialize, Debug)]
struct Record {
    id: u64,
    #[serde(default)]
    attributes: Value,
    #[serde(default)]
    relationships: Value,
}

impl Record {
    fn text(&self, field: &str) -> String {
        self.attributes[field].as_str().unwrap_or_default().to_string()
    }

    fn number(&self, field: &str) -> Option<u64> {
        self.attributes[field].as_u64()
    }

    fn link_id(&self, field: &str) -> Option<u64> {
        self.relationships[field]["data"]["id"].as_u64()
    }
}

#[derive(Debug)]
pub struct Shotgun {
    client: Client,
    config: ShotgunConfig,
    access_token: Option<String>,
    user_id: Option<u64>,
    ticket_projects: HashMap<u64, u64>,
    retries: i32,
}

impl Session for Shotgun {
    fn service(&self) -> &'static str {
        "Shotgun"
    }

    fn site(&self) -> String {
        self.config.site.clone()
    }

    fn login_name(&self) -> String {
        self.config.login.clone()
    }

    fn prompt_account(&mut self, prompt: &Prompt) -> Result<()> {
        self.config.site = prompt.text(Message::PromptShotgunSite, &self.config.site)?;
        self.config.login = prompt.text(Message::PromptShotgunLogin, &self.config.login)?;
        Ok(())
    }

    fn secret_prompt(&self) -> Message {
        Message::PromptPassword(self.service().to_string())
    }

    fn stored_token(&self) -> Option<String> {
        self.config.session_token.clone()
    }

    fn store_token(&mut self, token: &str) -> Result<()> {
        self.config.session_token = Some(token.to_string());
        let shotgun = self.config.clone();
        Config::update(|config| config.shotgun = Some(shotgun))
    }

    /// Trades the stored refresh token for a new access token. Shotgun
    /// rotates refresh tokens, so the new one is persisted right away.
    async fn resume(&mut self, token: &str) -> Result<bool> {
        let form = [("grant_type", "refresh_token"), ("refresh_token", token)];
        let res = self.client.post(self.url(AUTH_URL)).form(&form).send().await?;
        match res.status() {
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(false),
            _ => {
                let tokens: TokenResponse = read_json(res).await?;
                self.access_token = Some(tokens.access_token);
                if tokens.refresh_token != token {
                    self.store_token(&tokens.refresh_token)?;
                }
                Ok(true)
            }
        }
    }

    async fn login(&mut self, secret: &str) -> Result<String> {
        let form = [
            ("grant_type", "password"),
            ("username", self.config.login.as_str()),
            ("password", secret),
        ];
        let res = self.client.post(self.url(AUTH_URL)).form(&form).send().await?;
        if let StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN = res.status() {
            return Err(SyncError::AuthenticationRejected(format!("Shotgun answered {}", res.status())).into());
        }
        let tokens: TokenResponse = read_json(res).await?;
        self.access_token = Some(tokens.access_token);
        Ok(tokens.refresh_token)
    }

    fn retry(&self) -> i32 {
        self.retries
    }

    fn inc_retry(&mut self) {
        self.retries += 1;
    }
}

impl Tracker for Shotgun {
    fn name_pattern(&self) -> Result<NamePattern> {
        Ok(NamePattern::numbered())
    }

    async fn connect(&mut self, credentials: &Credentials) -> Result<()> {
        self.get_session_id(credentials).await?;
        self.user_id = Some(self.find_user_id().await?);
        Ok(())
    }

    /// Tickets of the sprint in progress addressed to the user.
    async fn find_active_tickets(&mut self) -> Result<Vec<TrackedItem>> {
        let filters = json!([
            ["sg_sprint.CustomEntity01.sg_status_list", "is", "ip"],
            ["addressings_to", "is", self.user()?],
        ]);
        let tickets = self.search("tickets", filters, &["title"]).await?;
        Ok(tickets
            .iter()
            .map(|ticket| TrackedItem::new(TicketId::Number(ticket.id), &ticket.text("title")))
            .collect())
    }

    async fn find_work_log(&mut self, ticket: &TicketId, task: &str, day: NaiveDate) -> Result<Option<ExistingWorkLog>> {
        let filters = json!([
            ["entity", "is", {"type": "Ticket", "id": ticket_number(ticket)?}],
            ["description", "is", task],
            ["date", "is", day.format(DATE_FORMAT).to_string()],
            ["user", "is", self.user()?],
        ]);
        let logs = self.search("time_logs", filters, &["duration"]).await?;
        Ok(logs.first().map(|log| ExistingWorkLog {
            id: log.id.to_string(),
            minutes: log.number("duration").and_then(|d| u32::try_from(d).ok()).unwrap_or(0),
        }))
    }

    async fn create_work_log(&mut self, log: &WorkLog) -> Result<()> {
        let ticket_id = ticket_number(&log.ticket)?;
        let project_id = self.ticket_project(ticket_id).await?;
        let body = json!({
            "entity": {"type": "Ticket", "id": ticket_id},
            "project": {"type": "Project", "id": project_id},
            "user": self.user()?,
            "description": log.task,
            "date": log.day.format(DATE_FORMAT).to_string(),
            "duration": log.minutes,
        });
        let request = self.client.post(self.url(&format!("{}/time_logs", ENTITY_URL))).json(&body);
        ensure_success(self.authorize(request).send().await?).await?;
        Ok(())
    }

    async fn update_work_log(&mut self, existing: &ExistingWorkLog, log: &WorkLog) -> Result<()> {
        let url = self.url(&format!("{}/time_logs/{}", ENTITY_URL, existing.id));
        let request = self.client.put(url).json(&json!({ "duration": log.minutes }));
        ensure_success(self.authorize(request).send().await?).await?;
        Ok(())
    }
}

impl Shotgun {
    pub fn new(config: &ShotgunConfig) -> Self {
        Self {
            client: Client::new(),
            config: config.clone(),
            access_token: None,
            user_id: None,
            ticket_projects: HashMap::new(),
            retries: 0,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.site.trim_end_matches('/'), path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn user(&self) -> Result<Value> {
        match self.user_id {
            Some(id) => Ok(json!({"type": "HumanUser", "id": id})),
            None => Err(SyncError::domain(Message::UserNotFound(self.config.login.clone())).into()),
        }
    }

    async fn find_user_id(&self) -> Result<u64> {
        let request = self
            .client
            .get(self.url(&format!("{}/human_users", ENTITY_URL)))
            .query(&[("filter[login]", self.config.login.as_str()), ("fields", "login")]);
        let users: Page<Record> = read_json(send_read(self.authorize(request)).await?).await?;
        users
            .data
            .first()
            .map(|user| user.id)
            .ok_or_else(|| SyncError::domain(Message::UserNotFound(self.config.login.clone())).into())
    }

    /// Runs a `_search` over all result pages.
    async fn search(&self, entity: &str, filters: Value, fields: &[&str]) -> Result<Vec<Record>> {
        let url = self.url(&format!("{}/{}/_search", ENTITY_URL, entity));
        let mut records = Vec::new();
        let mut page = 1;

        loop {
            let body = json!({
                "filters": filters,
                "fields": fields,
                "page": {"number": page, "size": PAGE_SIZE},
            });
            let request = self
                .client
                .post(&url)
                .header(CONTENT_TYPE, ARRAY_FILTERS)
                .body(serde_json::to_vec(&body)?);
            let batch: Page<Record> = read_json(send_read(self.authorize(request)).await?).await?;
            let received = batch.data.len();
            records.extend(batch.data);
            if received < PAGE_SIZE as usize {
                break;
            }
            page += 1;
        }

        msg_debug!("Shotgun {} search returned {} records", entity, records.len());
        Ok(records)
    }

    /// Project the ticket belongs to, cached per run.
    async fn ticket_project(&mut self, ticket_id: u64) -> Result<u64> {
        if let Some(project_id) = self.ticket_projects.get(&ticket_id) {
            return Ok(*project_id);
        }
        let request = self
            .client
            .get(self.url(&format!("{}/tickets/{}", ENTITY_URL, ticket_id)))
            .query(&[("fields", "project")]);
        let ticket: Single<Record> = read_json(send_read(self.authorize(request)).await?).await?;
        let project_id = ticket
            .data
            .link_id("project")
            .ok_or_else(|| SyncError::domain(Message::TicketProjectMissing(ticket_id)))?;
        self.ticket_projects.insert(ticket_id, project_id);
        Ok(project_id)
    }
}

fn ticket_number(ticket: &TicketId) -> Result<u64> {
    match ticket {
        TicketId::Number(id) => Ok(*id),
        TicketId::Key(_) => Err(SyncError::domain(Message::UnsupportedTicketId(ticket.to_string())).into()),
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ShotgunConfig {
    /// Site URL, e.g. `https://studio.shotgunstudio.com`.
    pub site: String,
    pub login: String,

    /// Refresh token of the last session.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_token: Option<String>,
}

impl ShotgunConfig {
    pub fn module() -> ConfigModule {
        ConfigModule {
            key: "shotgun".to_string(),
            name: "Shotgun".to_string(),
        }
    }

    pub fn init(config: &Option<Self>) -> Result<Self> {
        let config = config.clone().unwrap_or_default();
        let theme = ColorfulTheme::default();
        msg_print!(Message::ConfigModuleShotgun);

        let site: String = Input::with_theme(&theme)
            .with_prompt(Message::PromptShotgunSite.to_string())
            .default(config.site.clone())
            .interact_text()?;
        let login: String = Input::with_theme(&theme)
            .with_prompt(Message::PromptShotgunLogin.to_string())
            .default(config.login.clone())
            .interact_text()?;

        let site = site.trim().trim_end_matches('/').to_string();
        let login = login.trim().to_string();
        let session_token = match site == config.site && login == config.login {
            true => config.session_token,
            false => None,
        };

        Ok(Self {
            site,
            login,
            session_token,
        })
    }
}
