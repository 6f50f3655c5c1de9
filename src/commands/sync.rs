//! Export followed by import, sharing one authenticated session.

use super::export::resolve_period;
use super::{export, import, Backend, Context, RangeArgs};
use crate::api::toggl::Toggl;
use crate::api::{Session, Tracker};
use crate::libs::config::TrackerKind;
use crate::libs::messages::Message;
use crate::libs::options::SyncOptions;
use crate::libs::period::Period;
use crate::msg_print;
use anyhow::Result;

pub async fn cmd(context: &mut Context, args: &RangeArgs) -> Result<()> {
    let period = resolve_period(context, args)?;
    let kind = context.backend.kind();
    context.toggl.get_session_id(&context.credentials).await?;
    match &mut context.backend {
        Backend::Shotgun(tracker) => {
            tracker.connect(&context.credentials).await?;
            run(&mut context.toggl, tracker, kind, &period, &context.options).await
        }
        Backend::Jira(tracker) => {
            tracker.connect(&context.credentials).await?;
            run(&mut context.toggl, tracker, kind, &period, &context.options).await
        }
    }
}

/// Runs both directions. Import still runs when some work logs failed; the
/// first error is returned afterwards.
pub async fn run<T: Tracker>(
    toggl: &mut Toggl,
    tracker: &mut T,
    kind: TrackerKind,
    period: &Period,
    options: &SyncOptions,
) -> Result<()> {
    msg_print!(Message::UpdatingTracker(kind.name().to_string()));
    let exported = export::run(toggl, tracker, period, options).await;
    let imported = import::run(toggl, tracker, options).await;
    exported.and(imported)
}
