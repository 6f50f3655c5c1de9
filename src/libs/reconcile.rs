//! Matching of Toggl projects against the tracker's active tickets.
//!
//! Projects are matched purely by the ticket id encoded in their name. The
//! result is a [`Plan`]: one decision per tracked item followed by the
//! archivals, in a deterministic order. Nothing here talks to a remote
//! service; applying the plan is the import command's job.

use super::ticket::{NamePattern, TicketId, TrackedItem};
use crate::api::toggl::Project;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

/// Projects whose name parsed to a ticket id, keyed by that id.
#[derive(Debug, Default)]
pub struct ProjectIndex<'a> {
    pub by_ticket: BTreeMap<TicketId, MatchedProject<'a>>,
    /// Ids claimed by more than one project. None of those projects is
    /// touched.
    pub ambiguous: BTreeSet<TicketId>,
}

#[derive(Debug, Clone)]
pub struct MatchedProject<'a> {
    pub project: &'a Project,
    /// Title half of the project name.
    pub title: String,
}

impl<'a> ProjectIndex<'a> {
    pub fn build(projects: &'a [Project], pattern: &NamePattern) -> Self {
        let mut by_ticket: BTreeMap<TicketId, MatchedProject<'a>> = BTreeMap::new();
        let mut ambiguous = BTreeSet::new();

        for project in projects {
            let Some(parsed) = pattern.parse(&project.name) else {
                crate::msg_debug!("Skipping project '{}'", project.name);
                continue;
            };
            if ambiguous.contains(&parsed.id) {
                continue;
            }
            if by_ticket.remove(&parsed.id).is_some() {
                ambiguous.insert(parsed.id);
                continue;
            }
            by_ticket.insert(
                parsed.id,
                MatchedProject {
                    project,
                    title: parsed.title,
                },
            );
        }

        Self { by_ticket, ambiguous }
    }

    /// Toggl project id to ticket id, for the time-entry export.
    pub fn project_to_ticket(&self) -> HashMap<u64, TicketId> {
        self.by_ticket
            .iter()
            .map(|(ticket, matched)| (matched.project.id, ticket.clone()))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Create {
        ticket: TicketId,
        name: String,
    },
    Rename {
        project_id: u64,
        ticket: TicketId,
        name: String,
    },
    Unarchive {
        project_id: u64,
        ticket: TicketId,
        name: String,
    },
    Archive {
        project_id: u64,
        ticket: TicketId,
        name: String,
    },
    Unchanged {
        ticket: TicketId,
        title: String,
    },
}

impl Decision {
    pub fn ticket(&self) -> &TicketId {
        match self {
            Decision::Create { ticket, .. }
            | Decision::Rename { ticket, .. }
            | Decision::Unarchive { ticket, .. }
            | Decision::Archive { ticket, .. }
            | Decision::Unchanged { ticket, .. } => ticket,
        }
    }

    /// Whether applying the decision writes to Toggl.
    pub fn is_change(&self) -> bool {
        !matches!(self, Decision::Unchanged { .. })
    }
}

#[derive(Debug, Default)]
pub struct Plan {
    pub decisions: Vec<Decision>,
    pub ambiguous: Vec<TicketId>,
    /// Tickets whose project name would not parse back to them, e.g. JIRA
    /// issues outside the configured project key. They are left out.
    pub foreign: Vec<TicketId>,
}

impl Plan {
    pub fn to_create(&self) -> Vec<&Decision> {
        self.filtered(|d| matches!(d, Decision::Create { .. }))
    }

    pub fn to_update(&self) -> Vec<&Decision> {
        self.filtered(|d| matches!(d, Decision::Rename { .. }))
    }

    pub fn to_unarchive(&self) -> Vec<&Decision> {
        self.filtered(|d| matches!(d, Decision::Unarchive { .. }))
    }

    pub fn to_archive(&self) -> Vec<&Decision> {
        self.filtered(|d| matches!(d, Decision::Archive { .. }))
    }

    pub fn changes(&self) -> usize {
        self.decisions.iter().filter(|d| d.is_change()).count()
    }

    fn filtered(&self, keep: impl Fn(&Decision) -> bool) -> Vec<&Decision> {
        self.decisions.iter().filter(|d| keep(d)).collect()
    }
}

/// Decides what to do with every project given the tracker's active tickets.
pub fn plan(projects: &[Project], items: &[TrackedItem], pattern: &NamePattern) -> Plan {
    let index = ProjectIndex::build(projects, pattern);
    let mut decisions = Vec::new();
    let mut active: HashSet<&TicketId> = HashSet::new();
    let mut foreign = Vec::new();

    for item in items {
        if !active.insert(&item.id) || index.ambiguous.contains(&item.id) {
            continue;
        }
        let name = pattern.format(&item.id, &item.title);
        if pattern.parse(&name).map(|parsed| parsed.id).as_ref() != Some(&item.id) {
            foreign.push(item.id.clone());
            continue;
        }

        let decision = match index.by_ticket.get(&item.id) {
            None => Decision::Create {
                ticket: item.id.clone(),
                name,
            },
            Some(matched) if matched.title != item.title => Decision::Rename {
                project_id: matched.project.id,
                ticket: item.id.clone(),
                name,
            },
            Some(matched) if !matched.project.active => Decision::Unarchive {
                project_id: matched.project.id,
                ticket: item.id.clone(),
                name,
            },
            Some(_) => Decision::Unchanged {
                ticket: item.id.clone(),
                title: item.title.clone(),
            },
        };
        decisions.push(decision);
    }

    for (ticket, matched) in &index.by_ticket {
        if !active.contains(ticket) && matched.project.active {
            decisions.push(Decision::Archive {
                project_id: matched.project.id,
                ticket: ticket.clone(),
                name: matched.project.name.clone(),
            });
        }
    }

    Plan {
        decisions,
        ambiguous: index.ambiguous.into_iter().collect(),
        foreign,
    }
}
