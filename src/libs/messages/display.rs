//! Display implementation for togglsync messages.
//!
//! All user-facing text lives here so the commands and API clients only deal
//! with typed `Message` values.

use super::types::Message;
use std::fmt;

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            // === CONFIGURATION MESSAGES ===
            Message::ConfigSaved => "Configuration saved successfully".to_string(),
            Message::ConfigDeleted => "Configuration deleted".to_string(),
            Message::ConfigModuleToggl => "Toggl settings".to_string(),
            Message::ConfigModuleShotgun => "Shotgun settings".to_string(),
            Message::ConfigModuleJira => "Jira settings".to_string(),
            Message::ConfigModuleSync => "Sync settings".to_string(),
            Message::UnsupportedConfigVersion(version) => {
                format!("Configuration version {} is newer than this build supports", version)
            }
            Message::NoTrackerConfigured => {
                "No issue tracker configured. Run 'togglsync init' or pass --tracker".to_string()
            }

            // === PROMPTS ===
            Message::PromptSelectModules => "Select the modules to configure".to_string(),
            Message::PromptTogglToken => "Toggl API token".to_string(),
            Message::PromptTogglWorkspace => "Toggl workspace id (empty for the first workspace)".to_string(),
            Message::PromptTogglApiUrl => "Toggl API URL".to_string(),
            Message::PromptShotgunSite => "Site".to_string(),
            Message::PromptShotgunLogin => "Login".to_string(),
            Message::PromptJiraUrl => "Jira URL".to_string(),
            Message::PromptJiraLogin => "Jira login".to_string(),
            Message::PromptJiraProjectKey => "Jira project key".to_string(),
            Message::PromptJiraJql => "JQL for active issues (empty for the default query)".to_string(),
            Message::PromptPassword(service) => format!("{} password", service),
            Message::PromptTracker => "Issue tracker".to_string(),
            Message::PromptDaysBack => "Days to export when --start is omitted".to_string(),
            Message::PromptZeroDuration => "Groups shorter than one minute".to_string(),
            Message::PromptSecretBackend => "Where to store passwords and API tokens".to_string(),

            // === SESSION MESSAGES ===
            Message::StoredTokenRejected(service) => format!("Stored {} session was rejected", service),
            Message::AuthenticationRejected(service, reason) => {
                format!("{} authentication failed: {}", service, reason)
            }
            Message::WrongPassword(attempts) => {
                format!("Authentication rejected after {} attempts", attempts)
            }
            Message::SecretStoreUnavailable(reason) => format!("Secret store unavailable: {}", reason),
            Message::HeadlessCredentialsInvalid => {
                "Headless invocation failed because credentials were invalid.".to_string()
            }
            Message::LoggedOut(service) => format!("Forgot stored {} credentials", service),

            // === REMOTE ERRORS ===
            Message::RequestFailed { url, status, body } => {
                if body.is_empty() {
                    format!("Request to {} failed with status {}", url, status)
                } else {
                    format!("Request to {} failed with status {}: {}", url, status, body)
                }
            }
            Message::WorkspaceNotFound => "Toggl workspace not found".to_string(),
            Message::UserNotFound(login) => format!("No user found for login '{}'", login),
            Message::TicketProjectMissing(id) => format!("Ticket {} is not linked to a project", id),
            Message::UnsupportedTicketId(id) => format!("Ticket id '{}' is not valid for this tracker", id),

            // === CLI INPUT ===
            Message::InvalidDate(date) => format!("Invalid date '{}', expected YYYY-MM-DD", date),
            Message::InvalidDateRange(start, end) => format!("Start date {} is after end date {}", start, end),
            Message::InvalidDaysBack(days) => format!("days_back {} reaches outside the supported calendar", days),

            // === IMPORT MESSAGES ===
            Message::UpdatingTracker(tracker) => format!("Updating {} tickets...\n===========================", tracker),
            Message::DryRun => "Dry run: no changes will be written".to_string(),
            Message::ProjectCreated(name) => format!("Created project: '{}'", name),
            Message::ProjectUpdated(name) => format!("Updated project: '{}'", name),
            Message::ProjectUnarchived(name) => format!("Unarchived project: '{}'", name),
            Message::ProjectArchived(name) => format!("Archiving project: '{}'", name),
            Message::ProjectUnchanged(title) => format!("Project already in Toggl: {}", title),
            Message::ProjectAmbiguous(ticket) => {
                format!("Several Toggl projects claim ticket {}, leaving them alone", ticket)
            }
            Message::TicketOutsidePattern(ticket) => {
                format!("Ticket {} does not fit the project naming pattern, skipping", ticket)
            }
            Message::ProjectChangeFailed(name, error) => format!("Failed to update project '{}': {}", name, error),

            // === EXPORT MESSAGES ===
            Message::WorkLogDay(day) => day.clone(),
            Message::WorkLogLine {
                ticket,
                task,
                duration,
                outcome,
            } => format!("   Ticket {}, Task {:<40} {} ({})", ticket, task, duration, outcome),
            Message::WorkLogFailed { ticket, task, day, error } => {
                format!("Failed to log '{}' on ticket {} for {}: {}", task, ticket, day, error)
            }
            Message::ChangesFailed(failed, total) => format!("{} of {} changes failed", failed, total),
        };
        write!(f, "{}", text)
    }
}
