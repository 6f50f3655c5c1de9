//! Tracker → Toggl: mirrors the active tickets as Toggl projects.

use super::{Backend, Context};
use crate::api::toggl::{ProjectUpdate, Toggl};
use crate::api::{Session, Tracker};
use crate::libs::error::SyncError;
use crate::libs::messages::Message;
use crate::libs::options::SyncOptions;
use crate::libs::reconcile::{plan, Decision};
use crate::{msg_error, msg_info, msg_print, msg_warning};
use anyhow::Result;

pub async fn cmd(context: &mut Context) -> Result<()> {
    context.toggl.get_session_id(&context.credentials).await?;
    match &mut context.backend {
        Backend::Shotgun(tracker) => {
            tracker.connect(&context.credentials).await?;
            run(&mut context.toggl, tracker, &context.options).await
        }
        Backend::Jira(tracker) => {
            tracker.connect(&context.credentials).await?;
            run(&mut context.toggl, tracker, &context.options).await
        }
    }
}

/// Plans the project changes and applies them one by one.
///
/// A failed change is reported and skipped; the run ends with an error
/// counting the failures once every decision has been tried.
pub async fn run<T: Tracker>(toggl: &mut Toggl, tracker: &mut T, options: &SyncOptions) -> Result<()> {
    if options.dry_run {
        msg_info!(Message::DryRun);
    }

    let items = tracker.find_active_tickets().await?;
    let projects = tracker.filter_projects(toggl.projects().await?)?;
    let plan = plan(&projects, &items, &tracker.name_pattern()?);

    for ticket in &plan.ambiguous {
        msg_warning!(Message::ProjectAmbiguous(ticket.to_string()));
    }
    for ticket in &plan.foreign {
        msg_warning!(Message::TicketOutsidePattern(ticket.to_string()));
    }

    let mut failed = 0;
    for decision in &plan.decisions {
        let applied = match options.dry_run {
            true => Ok(()),
            false => apply(toggl, decision).await,
        };
        match applied {
            Ok(()) => msg_print!(outcome(decision)),
            Err(err) => {
                failed += 1;
                msg_error!(Message::ProjectChangeFailed(decision_name(decision), format!("{:#}", err)));
            }
        }
    }

    if failed > 0 {
        return Err(SyncError::domain(Message::ChangesFailed(failed, plan.changes())).into());
    }
    Ok(())
}

async fn apply(toggl: &mut Toggl, decision: &Decision) -> Result<()> {
    match decision {
        Decision::Create { name, .. } => {
            toggl.create_project(name).await?;
        }
        Decision::Rename { project_id, name, .. } => {
            let update = ProjectUpdate {
                name: Some(name.clone()),
                active: None,
            };
            toggl.update_project(*project_id, &update).await?;
        }
        Decision::Unarchive { project_id, .. } => {
            let update = ProjectUpdate {
                name: None,
                active: Some(true),
            };
            toggl.update_project(*project_id, &update).await?;
        }
        Decision::Archive { project_id, .. } => {
            let update = ProjectUpdate {
                name: None,
                active: Some(false),
            };
            toggl.update_project(*project_id, &update).await?;
        }
        Decision::Unchanged { .. } => {}
    }
    Ok(())
}

fn decision_name(decision: &Decision) -> String {
    match decision {
        Decision::Create { name, .. }
        | Decision::Rename { name, .. }
        | Decision::Unarchive { name, .. }
        | Decision::Archive { name, .. } => name.clone(),
        Decision::Unchanged { title, .. } => title.clone(),
    }
}

fn outcome(decision: &Decision) -> Message {
    let name = decision_name(decision);
    match decision {
        Decision::Create { .. } => Message::ProjectCreated(name),
        Decision::Rename { .. } => Message::ProjectUpdated(name),
        Decision::Unarchive { .. } => Message::ProjectUnarchived(name),
        Decision::Archive { .. } => Message::ProjectArchived(name),
        Decision::Unchanged { .. } => Message::ProjectUnchanged(name),
    }
}
