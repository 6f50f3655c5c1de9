//! Clients for the remote services togglsync talks to.
//!
//! - **Toggl**: projects and time entries
//! - **Shotgun**: in-progress sprint tickets and time logs
//! - **Jira**: sprint issues and work logs
//!
//! All clients authenticate through the [`Session`] trait, which implements
//! the credential fallback chain once: cached session token, then the secret
//! store, then an interactive prompt. The two issue trackers additionally
//! implement [`Tracker`], the interface the import and export commands are
//! written against.

use crate::libs::error::{is_rejection, SyncError};
use crate::libs::messages::Message;
use crate::libs::prompt::Prompt;
use crate::libs::secret::SecretStore;
use crate::libs::aggregate::WorkLog;
use crate::libs::ticket::{NamePattern, TicketId, TrackedItem};
use crate::{msg_debug, msg_warning};
use anyhow::Result;
use chrono::NaiveDate;
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

pub mod jira;
pub mod shotgun;
pub mod toggl;

pub use jira::{Jira, JiraConfig};
pub use shotgun::{Shotgun, ShotgunConfig};
pub use toggl::{Project, Toggl, TogglConfig};

/// Maximum number of prompted authentication attempts before giving up.
const MAX_RETRY_COUNT: i32 = 3;

/// Extra attempts for idempotent reads that hit a connection error or a 5xx.
const MAX_READ_RETRIES: u32 = 2;
const READ_RETRY_DELAY: Duration = Duration::from_secs(1);

/// What a client needs to authenticate: a way to ask the user and a place to
/// keep secrets.
pub struct Credentials {
    pub prompt: Prompt,
    pub secrets: Box<dyn SecretStore>,
}

impl Credentials {
    pub fn new(prompt: Prompt, secrets: Box<dyn SecretStore>) -> Self {
        Self { prompt, secrets }
    }
}

/// Common session management for all API clients.
#[allow(async_fn_in_trait)]
pub trait Session {
    /// Human readable service name used in prompts and messages.
    fn service(&self) -> &'static str;

    /// Site the secret belongs to (base URL, or a fixed name for SaaS).
    fn site(&self) -> String;

    /// Login the secret belongs to.
    fn login_name(&self) -> String;

    /// Asks for site and login, keeping the current values as defaults.
    /// Services without an account concept keep the default no-op.
    fn prompt_account(&mut self, _prompt: &Prompt) -> Result<()> {
        Ok(())
    }

    /// Prompt shown when asking for the secret.
    fn secret_prompt(&self) -> Message;

    /// Session token cached in the configuration, if any.
    fn stored_token(&self) -> Option<String>;

    /// Persists a freshly issued session token.
    fn store_token(&mut self, token: &str) -> Result<()>;

    /// Installs `token` and checks the service still accepts it.
    ///
    /// Returns `Ok(false)` on an authentication rejection and `Err` on any
    /// other failure.
    async fn resume(&mut self, token: &str) -> Result<bool>;

    /// Exchanges a secret for a session token and installs it.
    ///
    /// A refused secret is reported as [`SyncError::AuthenticationRejected`];
    /// only that error leads to prompting for another one.
    async fn login(&mut self, secret: &str) -> Result<String>;

    /// Returns current retry attempt count.
    fn retry(&self) -> i32;

    /// Increments the retry counter.
    fn inc_retry(&mut self);

    /// Establishes an authenticated session.
    ///
    /// ## Process Flow
    ///
    /// 1. **Cached token**: resume the session stored in the configuration
    /// 2. **Stored secret**: log in with the secret from the secret store
    /// 3. **Prompt**: ask for account and secret, up to three attempts
    ///
    /// A successful login stores both the secret and the new token. Errors
    /// other than a rejection end the chain. In a headless run step 3 fails
    /// with [`SyncError::InteractionRequired`].
    async fn get_session_id(&mut self, credentials: &Credentials) -> Result<String> {
        if let Some(token) = self.stored_token() {
            if self.resume(&token).await? {
                msg_debug!("Resumed {} session", self.service());
                return Ok(token);
            }
            msg_warning!(Message::StoredTokenRejected(self.service().to_string()));
        }

        let mut stored = credentials
            .secrets
            .get(&self.site(), &self.login_name())
            .unwrap_or_else(|err| {
                msg_debug!(Message::SecretStoreUnavailable(err.to_string()));
                None
            });

        loop {
            let prompted = stored.is_none();
            let secret = match stored.take() {
                Some(secret) => secret,
                None => {
                    self.prompt_account(&credentials.prompt)?;
                    credentials.prompt.secret(self.secret_prompt())?
                }
            };

            match self.login(&secret).await {
                Ok(token) => {
                    if let Err(err) = credentials.secrets.set(&self.site(), &self.login_name(), &secret) {
                        msg_warning!(Message::SecretStoreUnavailable(err.to_string()));
                    }
                    self.store_token(&token)?;
                    return Ok(token);
                }
                Err(err) if !is_rejection(&err) => break Err(err),
                Err(err) => {
                    msg_warning!(Message::AuthenticationRejected(self.service().to_string(), err.to_string()));
                    if !prompted {
                        continue;
                    }
                    if self.retry() + 1 >= MAX_RETRY_COUNT {
                        break Err(SyncError::domain(Message::WrongPassword(MAX_RETRY_COUNT)).into());
                    }
                    self.inc_retry();
                }
            }
        }
    }
}

/// An existing work log as found in the tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingWorkLog {
    pub id: String,
    pub minutes: u32,
}

/// Outcome of writing one aggregated work log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Created,
    Updated,
    Unchanged,
}

impl Upsert {
    pub fn describe(&self, dry_run: bool) -> &'static str {
        match (self, dry_run) {
            (Upsert::Created, false) => "created",
            (Upsert::Created, true) => "would create",
            (Upsert::Updated, false) => "updated",
            (Upsert::Updated, true) => "would update",
            (Upsert::Unchanged, _) => "unchanged",
        }
    }
}

/// An issue tracker that tickets are imported from and work logs exported to.
#[allow(async_fn_in_trait)]
pub trait Tracker: Session {
    /// Naming convention of the Toggl projects mirroring this tracker's
    /// tickets.
    fn name_pattern(&self) -> Result<NamePattern>;

    /// Authenticates and loads whatever the tracker needs before queries.
    async fn connect(&mut self, credentials: &Credentials) -> Result<()> {
        self.get_session_id(credentials).await?;
        Ok(())
    }

    /// Keeps the projects whose names follow this tracker's convention.
    fn filter_projects(&self, projects: Vec<Project>) -> Result<Vec<Project>> {
        let pattern = self.name_pattern()?;
        Ok(projects
            .into_iter()
            .filter(|project| pattern.parse(&project.name).is_some())
            .collect())
    }

    /// Tickets currently assigned to the user.
    async fn find_active_tickets(&mut self) -> Result<Vec<TrackedItem>>;

    /// The work log for `task` on `ticket` during `day`, if one exists.
    async fn find_work_log(&mut self, ticket: &TicketId, task: &str, day: NaiveDate) -> Result<Option<ExistingWorkLog>>;

    async fn create_work_log(&mut self, log: &WorkLog) -> Result<()>;

    async fn update_work_log(&mut self, existing: &ExistingWorkLog, log: &WorkLog) -> Result<()>;

    /// Finds or creates the work log for `log`'s (ticket, task, day).
    ///
    /// An existing record with the same duration is left alone; a different
    /// duration is overwritten. New records are never shorter than one
    /// minute. With `dry_run` the lookup still happens but nothing is
    /// written.
    async fn upsert_work_log(&mut self, log: &WorkLog, dry_run: bool) -> Result<Upsert> {
        match self.find_work_log(&log.ticket, &log.task, log.day).await? {
            Some(existing) if existing.minutes == log.minutes => Ok(Upsert::Unchanged),
            Some(existing) => {
                if !dry_run {
                    self.update_work_log(&existing, log).await?;
                }
                Ok(Upsert::Updated)
            }
            None => {
                if !dry_run {
                    let log = WorkLog {
                        minutes: log.minutes.max(1),
                        ..log.clone()
                    };
                    self.create_work_log(&log).await?;
                }
                Ok(Upsert::Created)
            }
        }
    }
}

/// Sends an idempotent request, retrying connection failures and 5xx
/// responses a couple of times.
pub(crate) async fn send_read(request: RequestBuilder) -> Result<Response> {
    let mut attempt = 0;
    loop {
        let Some(current) = request.try_clone() else {
            return Ok(request.send().await?);
        };
        match current.send().await {
            Ok(res) if res.status().is_server_error() && attempt < MAX_READ_RETRIES => {
                msg_debug!("{} answered {}, retrying", res.url(), res.status());
            }
            Err(err) if (err.is_connect() || err.is_timeout()) && attempt < MAX_READ_RETRIES => {
                msg_debug!("Request failed ({}), retrying", err);
            }
            other => return Ok(other?),
        }
        attempt += 1;
        tokio::time::sleep(READ_RETRY_DELAY).await;
    }
}

/// Turns a non-success response into a domain error carrying the body.
pub(crate) async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let url = response.url().to_string();
    let body = response.text().await.unwrap_or_default();
    Err(SyncError::domain(Message::RequestFailed {
        url,
        status: status.to_string(),
        body: body.trim().to_string(),
    })
    .into())
}

/// Checks the status and decodes the JSON body.
pub(crate) async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    Ok(ensure_success(response).await?.json::<T>().await?)
}
