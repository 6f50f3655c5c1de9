use super::{ensure_success, read_json, send_read, Credentials, ExistingWorkLog, Session, Tracker};
use crate::libs::aggregate::WorkLog;
use crate::libs::config::{Config, ConfigModule};
use crate::libs::error::SyncError;
use crate::libs::messages::Message;
use crate::libs::prompt::Prompt;
use crate::libs::ticket::{NamePattern, TicketId, TrackedItem};
use crate::{msg_debug, msg_print};
use anyhow::{anyhow, Result};
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone};
use dialoguer::{theme::ColorfulTheme, Input};
use reqwest::{
    header::{HeaderValue, COOKIE},
    Client, RequestBuilder, StatusCode,
};
use serde::{Deserialize, Serialize};

const AUTH_URL: &str = "rest/auth/1/session";
const SEARCH_URL: &str = "rest/api/2/search";
const ISSUE_URL: &str = "rest/api/2/issue";
const PAGE_SIZE: u32 = 50;
const STARTED_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%z";

#[derive(Serialize, Clone, Debug)]
struct LoginCredentials<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize, Debug)]
struct JiraSessionResponse {
    session: JiraSession,
}

#[derive(Deserialize, Debug)]
struct JiraSession {
    name: String,
    value: String,
}

#[derive(Deserialize, Debug)]
pub struct JiraIssue {
    pub key: String,
    pub fields: JiraIssueFields,
}

#[derive(Deserialize, Debug)]
pub struct JiraIssueFields {
    #[serde(default)]
    pub summary: String,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct JiraSearchResults {
    #[serde(default)]
    start_at: u32,
    #[serde(default)]
    total: u32,
    #[serde(default)]
    issues: Vec<JiraIssue>,
}

#[derive(Deserialize, Debug)]
struct JiraWorklogs {
    #[serde(default)]
    worklogs: Vec<JiraWorklog>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct JiraWorklog {
    id: String,
    #[serde(default)]
    comment: Option<String>,
    started: String,
    time_spent_seconds: u64,
    #[serde(default)]
    author: Option<JiraAuthor>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct JiraAuthor {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email_address: Option<String>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct NewWorklog<'a> {
    comment: &'a str,
    started: String,
    time_spent_seconds: u64,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct WorklogUpdate {
    time_spent_seconds: u64,
}

#[derive(Debug)]
pub struct Jira {
    client: Client,
    config: JiraConfig,
    offset: FixedOffset,
    session_id: Option<String>,
    retries: i32,
}

impl Session for Jira {
    fn service(&self) -> &'static str {
        "JIRA"
    }

    fn site(&self) -> String {
        self.config.api_url.clone()
    }

    fn login_name(&self) -> String {
        self.config.login.clone()
    }

    fn prompt_account(&mut self, prompt: &Prompt) -> Result<()> {
        self.config.api_url = prompt.text(Message::PromptJiraUrl, &self.config.api_url)?;
        self.config.login = prompt.text(Message::PromptJiraLogin, &self.config.login)?;
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
        let jira = self.config.clone();
        Config::update(|config| config.jira = Some(jira))
    }

    async fn resume(&mut self, token: &str) -> Result<bool> {
        self.session_id = Some(token.to_string());
        let res = send_read(self.authorize(self.client.get(self.url(AUTH_URL)))?).await?;
        match res.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                self.session_id = None;
                Ok(false)
            }
            _ => {
                ensure_success(res).await?;
                Ok(true)
            }
        }
    }

    async fn login(&mut self, secret: &str) -> Result<String> {
        let credentials = LoginCredentials {
            username: &self.config.login,
            password: secret,
        };
        let auth_res = self.client.post(self.url(AUTH_URL)).json(&credentials).send().await?;

        if let StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN = auth_res.status() {
            return Err(SyncError::AuthenticationRejected(format!("JIRA answered {}", auth_res.status())).into());
        }

        let session_res: JiraSessionResponse = read_json(auth_res).await?;
        let session_id = format!("{}={}", session_res.session.name, session_res.session.value);
        self.session_id = Some(session_id.clone());
        Ok(session_id)
    }

    fn retry(&self) -> i32 {
        self.retries
    }

    fn inc_retry(&mut self) {
        self.retries += 1;
    }
}

impl Tracker for Jira {
    fn name_pattern(&self) -> Result<NamePattern> {
        NamePattern::project_key(&self.config.project_key)
    }

    async fn connect(&mut self, credentials: &Credentials) -> Result<()> {
        if self.config.project_key.trim().is_empty() {
            let key = credentials.prompt.text(Message::PromptJiraProjectKey, "")?;
            self.config.project_key = key.to_uppercase();
            let jira = self.config.clone();
            Config::update(|config| config.jira = Some(jira))?;
        }
        self.get_session_id(credentials).await?;
        Ok(())
    }

    async fn find_active_tickets(&mut self) -> Result<Vec<TrackedItem>> {
        let jql = self.config.jql();
        let mut items = Vec::new();
        let mut start_at = 0;

        loop {
            let request = self.client.get(self.url(SEARCH_URL)).query(&[
                ("jql", jql.clone()),
                ("fields", "summary".to_string()),
                ("startAt", start_at.to_string()),
                ("maxResults", PAGE_SIZE.to_string()),
            ]);
            let page: JiraSearchResults = read_json(send_read(self.authorize(request)?).await?).await?;
            let received = page.issues.len() as u32;
            msg_debug!("JIRA search returned {} of {} issues", page.start_at + received, page.total);

            items.extend(
                page.issues
                    .into_iter()
                    .map(|issue| TrackedItem::new(TicketId::Key(issue.key), &issue.fields.summary)),
            );
            start_at = page.start_at + received;
            if received == 0 || start_at >= page.total {
                break;
            }
        }

        Ok(items)
    }

    async fn find_work_log(&mut self, ticket: &TicketId, task: &str, day: NaiveDate) -> Result<Option<ExistingWorkLog>> {
        let url = self.url(&format!("{}/{}/worklog", ISSUE_URL, issue_key(ticket)?));
        let worklogs: JiraWorklogs = read_json(send_read(self.authorize(self.client.get(url))?).await?).await?;

        for worklog in worklogs.worklogs {
            if worklog.comment.as_deref().map(str::trim) != Some(task.trim()) {
                continue;
            }
            if !self.is_own(&worklog) {
                continue;
            }
            let Ok(started) = DateTime::parse_from_str(&worklog.started, STARTED_FORMAT) else {
                msg_debug!("Unreadable worklog start {}", worklog.started);
                continue;
            };
            if started.with_timezone(&self.offset).date_naive() != day {
                continue;
            }
            return Ok(Some(ExistingWorkLog {
                id: worklog.id,
                minutes: u32::try_from(worklog.time_spent_seconds / 60).unwrap_or(u32::MAX),
            }));
        }

        Ok(None)
    }

    async fn create_work_log(&mut self, log: &WorkLog) -> Result<()> {
        let url = self.url(&format!("{}/{}/worklog", ISSUE_URL, issue_key(&log.ticket)?));
        let body = NewWorklog {
            comment: &log.task,
            started: self.started(log.day)?,
            time_spent_seconds: u64::from(log.minutes) * 60,
        };
        let res = self.authorize(self.client.post(url).json(&body))?.send().await?;
        ensure_success(res).await?;
        Ok(())
    }

    async fn update_work_log(&mut self, existing: &ExistingWorkLog, log: &WorkLog) -> Result<()> {
        let url = self.url(&format!("{}/{}/worklog/{}", ISSUE_URL, issue_key(&log.ticket)?, existing.id));
        let body = WorklogUpdate {
            time_spent_seconds: u64::from(log.minutes) * 60,
        };
        let res = self.authorize(self.client.put(url).json(&body))?.send().await?;
        ensure_success(res).await?;
        Ok(())
    }
}

impl Jira {
    pub fn new(config: &JiraConfig, offset: FixedOffset) -> Self {
        Self {
            client: Client::new(),
            config: config.clone(),
            offset,
            session_id: None,
            retries: 0,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.api_url.trim_end_matches('/'), path)
    }

    fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder> {
        Ok(match &self.session_id {
            Some(session_id) => request.header(COOKIE, HeaderValue::from_str(session_id)?),
            None => request,
        })
    }

    fn is_own(&self, worklog: &JiraWorklog) -> bool {
        let Some(author) = &worklog.author else {
            return true;
        };
        let login = self.config.login.as_str();
        [&author.name, &author.email_address]
            .into_iter()
            .flatten()
            .any(|value| value.eq_ignore_ascii_case(login))
    }

    /// Work logs are placed at local noon of their day.
    fn started(&self, day: NaiveDate) -> Result<String> {
        let local = day.and_time(NaiveTime::MIN) + Duration::hours(12);
        let started = self
            .offset
            .from_local_datetime(&local)
            .single()
            .ok_or_else(|| anyhow!("No local time {} at offset {}", local, self.offset))?;
        Ok(started.format(STARTED_FORMAT).to_string())
    }
}

fn issue_key(ticket: &TicketId) -> Result<&str> {
    match ticket {
        TicketId::Key(key) => Ok(key),
        TicketId::Number(_) => Err(SyncError::domain(Message::UnsupportedTicketId(ticket.to_string())).into()),
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct JiraConfig {
    pub login: String,
    pub api_url: String,

    /// Key of the project whose issues are mirrored, e.g. `ABC`.
    #[serde(default)]
    pub project_key: String,

    /// Custom issue query; defaults to the open sprints of `project_key`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jql: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_token: Option<String>,
}

impl JiraConfig {
    pub fn module() -> ConfigModule {
        ConfigModule {
            key: "jira".to_string(),
            name: "Jira".to_string(),
        }
    }

    pub fn jql(&self) -> String {
        match &self.jql {
            Some(jql) if !jql.trim().is_empty() => jql.clone(),
            _ => format!(
                "project = {} AND assignee = currentUser() AND sprint in openSprints()",
                self.project_key
            ),
        }
    }

    pub fn init(config: &Option<Self>) -> Result<Self> {
        let config = config.clone().unwrap_or_default();
        let theme = ColorfulTheme::default();
        msg_print!(Message::ConfigModuleJira);

        let api_url: String = Input::with_theme(&theme)
            .with_prompt(Message::PromptJiraUrl.to_string())
            .default(config.api_url.clone())
            .interact_text()?;
        let login: String = Input::with_theme(&theme)
            .with_prompt(Message::PromptJiraLogin.to_string())
            .default(config.login.clone())
            .interact_text()?;
        let project_key: String = Input::with_theme(&theme)
            .with_prompt(Message::PromptJiraProjectKey.to_string())
            .default(config.project_key.clone())
            .interact_text()?;
        let jql: String = Input::with_theme(&theme)
            .with_prompt(Message::PromptJiraJql.to_string())
            .default(config.jql.clone().unwrap_or_default())
            .allow_empty(true)
            .interact_text()?;

        let api_url = api_url.trim().trim_end_matches('/').to_string();
        let login = login.trim().to_string();
        // A different account or site invalidates the cached session.
        let session_token = match api_url == config.api_url && login == config.login {
            true => config.session_token,
            false => None,
        };

        Ok(Self {
            api_url,
            login,
            project_key: project_key.trim().to_uppercase(),
            jql: Some(jql.trim().to_string()).filter(|jql| !jql.is_empty()),
            session_token,
        })
    }
}
