pub mod export;
pub mod import;
pub mod init;
pub mod logout;
pub mod sync;

use crate::api::{Credentials, Jira, Shotgun, Toggl};
use crate::libs::config::{Config, TrackerKind};
use crate::libs::messages::macros::is_debug_mode;
use crate::libs::options::SyncOptions;
use crate::libs::period::local_offset;
use crate::libs::prompt::Prompt;
use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Configuration initialization")]
    Init(init::InitArgs),
    #[command(about = "Mirror the tracker's active tickets as Toggl projects")]
    Import,
    #[command(about = "Write Toggl time entries to the tracker as work logs")]
    Export(RangeArgs),
    #[command(about = "Export work logs, then import tickets")]
    Sync(RangeArgs),
    #[command(about = "Forget stored session tokens and secrets")]
    Logout,
}

/// Date range shared by `export` and `sync`.
#[derive(Debug, Args, Clone, Default)]
pub struct RangeArgs {
    /// First day to export (YYYY-MM-DD). Defaults to `days_back` days ago.
    #[arg(short, long)]
    pub start: Option<String>,
    /// Last day to export, inclusive (YYYY-MM-DD). Defaults to now.
    #[arg(short, long)]
    pub end: Option<String>,
}

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help(true))]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Never prompt; exit with code 1 when credentials are needed
    #[arg(long, global = true)]
    headless: bool,

    /// Read everything, write nothing
    #[arg(long, global = true)]
    dry_run: bool,

    /// Tracker to use instead of the configured one
    #[arg(long, global = true, value_enum)]
    tracker: Option<TrackerKind>,
}

impl Cli {
    pub async fn menu() -> Result<()> {
        let cli = Self::parse();
        init_logging();

        match cli.command {
            Commands::Init(ref args) => init::cmd(args),
            Commands::Import => {
                let mut context = cli.context()?;
                import::cmd(&mut context).await
            }
            Commands::Export(ref args) => {
                let mut context = cli.context()?;
                export::cmd(&mut context, args).await
            }
            Commands::Sync(ref args) => {
                let mut context = cli.context()?;
                sync::cmd(&mut context, args).await
            }
            Commands::Logout => logout::cmd(&Config::read()?),
        }
    }

    fn context(&self) -> Result<Context> {
        let config = Config::read()?;
        let sync = config.sync();
        let options = SyncOptions {
            dry_run: self.dry_run,
            headless: self.headless,
            offset: local_offset(),
            zero_duration: sync.zero_duration,
        };
        let credentials = Credentials::new(Prompt::new(options.headless), sync.secret_backend.open()?);
        let tracker = config.tracker_kind(self.tracker)?;

        Ok(Context {
            toggl: Toggl::new(&config.toggl.clone().unwrap_or_default()),
            backend: Backend::open(&config, tracker, &options),
            days_back: sync.days_back,
            options,
            credentials,
        })
    }
}

/// The configured issue tracker.
pub enum Backend {
    Shotgun(Shotgun),
    Jira(Jira),
}

impl Backend {
    pub fn open(config: &Config, kind: TrackerKind, options: &SyncOptions) -> Self {
        match kind {
            TrackerKind::Shotgun => Backend::Shotgun(Shotgun::new(&config.shotgun.clone().unwrap_or_default())),
            TrackerKind::Jira => Backend::Jira(Jira::new(&config.jira.clone().unwrap_or_default(), options.offset)),
        }
    }

    pub fn kind(&self) -> TrackerKind {
        match self {
            Backend::Shotgun(_) => TrackerKind::Shotgun,
            Backend::Jira(_) => TrackerKind::Jira,
        }
    }
}

/// Everything a sync command needs for one run.
pub struct Context {
    pub toggl: Toggl,
    pub backend: Backend,
    pub days_back: i64,
    pub options: SyncOptions,
    pub credentials: Credentials,
}

/// Installs a tracing subscriber when debug output was requested.
fn init_logging() {
    if !is_debug_mode() {
        return;
    }
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("togglsync=debug,info"));
    let _ = tracing_subscriber::fmt().with_env_filter(env_filter).with_target(false).try_init();
}
