#[derive(Debug, Clone)]
pub enum Message {
    // === CONFIGURATION MESSAGES ===
    ConfigSaved,
    ConfigDeleted,
    ConfigModuleToggl,
    ConfigModuleShotgun,
    ConfigModuleJira,
    ConfigModuleSync,
    UnsupportedConfigVersion(u32),
    NoTrackerConfigured,

    // === PROMPTS ===
    PromptSelectModules,
    PromptTogglToken,
    PromptTogglWorkspace,
    PromptTogglApiUrl,
    PromptShotgunSite,
    PromptShotgunLogin,
    PromptJiraUrl,
    PromptJiraLogin,
    PromptJiraProjectKey,
    PromptJiraJql,
    PromptPassword(String), // service
    PromptTracker,
    PromptDaysBack,
    PromptZeroDuration,
    PromptSecretBackend,

    // === SESSION MESSAGES ===
    StoredTokenRejected(String),             // service
    AuthenticationRejected(String, String),  // service, reason
    WrongPassword(i32),                      // attempts
    SecretStoreUnavailable(String),          // reason
    HeadlessCredentialsInvalid,
    LoggedOut(String), // service

    // === REMOTE ERRORS ===
    RequestFailed {
        url: String,
        status: String,
        body: String,
    },
    WorkspaceNotFound,
    UserNotFound(String),       // login
    TicketProjectMissing(u64),  // ticket id
    UnsupportedTicketId(String), // rendered id

    // === CLI INPUT ===
    InvalidDate(String),
    InvalidDateRange(String, String),
    InvalidDaysBack(i64),

    // === IMPORT MESSAGES ===
    UpdatingTracker(String), // tracker name
    DryRun,
    ProjectCreated(String),
    ProjectUpdated(String),
    ProjectUnarchived(String),
    ProjectArchived(String),
    ProjectUnchanged(String),
    ProjectAmbiguous(String), // ticket id
    TicketOutsidePattern(String),
    ProjectChangeFailed(String, String),

    // === EXPORT MESSAGES ===
    WorkLogDay(String),
    WorkLogLine {
        ticket: String,
        task: String,
        duration: String,
        outcome: String,
    },
    WorkLogFailed {
        ticket: String,
        task: String,
        day: String,
        error: String,
    },
    ChangesFailed(usize, usize), // failed, total
}
