#[cfg(test)]
mod tests {
    use togglsync::api::toggl::Project;
    use togglsync::libs::reconcile::{plan, Decision, ProjectIndex};
    use togglsync::libs::ticket::{NamePattern, TicketId, TrackedItem};

    fn project(id: u64, name: &str, active: bool) -> Project {
        Project {
            id,
            name: name.to_string(),
            active,
        }
    }

    fn item(id: u64, title: &str) -> TrackedItem {
        TrackedItem::new(TicketId::Number(id), title)
    }

    #[test]
    fn test_exact_match_is_unchanged() {
        let projects = vec![project(1, "#42 Fix login bug", true)];
        let plan = plan(&projects, &[item(42, "Fix login bug")], &NamePattern::numbered());

        assert_eq!(plan.changes(), 0);
        assert_eq!(
            plan.decisions,
            vec![Decision::Unchanged {
                ticket: TicketId::Number(42),
                title: "Fix login bug".to_string(),
            }]
        );
    }

    #[test]
    fn test_changed_title_is_renamed() {
        let projects = vec![project(1, "#42 Fix login bug", true)];
        let plan = plan(&projects, &[item(42, "Fix login bug!!")], &NamePattern::numbered());

        assert_eq!(
            plan.to_update(),
            vec![&Decision::Rename {
                project_id: 1,
                ticket: TicketId::Number(42),
                name: "#42 Fix login bug!!".to_string(),
            }]
        );
        assert!(plan.to_create().is_empty());
    }

    #[test]
    fn test_missing_project_is_created() {
        let plan = plan(&[], &[item(7, "Add export")], &NamePattern::numbered());

        assert_eq!(
            plan.to_create(),
            vec![&Decision::Create {
                ticket: TicketId::Number(7),
                name: "#7 Add export".to_string(),
            }]
        );
    }

    #[test]
    fn test_archived_project_is_unarchived() {
        let projects = vec![project(3, "#5 Back again", false)];
        let plan = plan(&projects, &[item(5, "Back again")], &NamePattern::numbered());

        assert_eq!(plan.to_unarchive().len(), 1);
        assert!(plan.to_update().is_empty());
    }

    #[test]
    fn test_archive_set_difference() {
        let projects = vec![
            project(1, "#1 Still active", true),
            project(2, "#2 Finished", true),
            project(3, "#3 Already archived", false),
        ];
        let plan = plan(&projects, &[item(1, "Still active")], &NamePattern::numbered());

        let archived: Vec<_> = plan.to_archive().into_iter().map(|d| d.ticket().clone()).collect();
        assert_eq!(archived, vec![TicketId::Number(2)]);
        assert_eq!(
            plan.to_archive()[0],
            &Decision::Archive {
                project_id: 2,
                ticket: TicketId::Number(2),
                name: "#2 Finished".to_string(),
            }
        );
    }

    #[test]
    fn test_unparsable_names_are_ignored() {
        let projects = vec![project(1, "Internal meetings", true), project(2, "Vacation", true)];
        let plan = plan(&projects, &[], &NamePattern::numbered());

        assert!(plan.decisions.is_empty());
        assert!(plan.ambiguous.is_empty());
    }

    #[test]
    fn test_ambiguous_ids_are_skipped() {
        let projects = vec![
            project(1, "#9 First copy", true),
            project(2, "#9 Second copy", true),
            project(3, "#9 Third copy", false),
        ];
        let plan = plan(&projects, &[item(9, "Real title")], &NamePattern::numbered());

        assert!(plan.decisions.is_empty());
        assert_eq!(plan.ambiguous, vec![TicketId::Number(9)]);
    }

    #[test]
    fn test_ambiguous_ids_are_not_archived() {
        let projects = vec![project(1, "#9 First copy", true), project(2, "#9 Second copy", true)];
        let plan = plan(&projects, &[], &NamePattern::numbered());

        assert!(plan.to_archive().is_empty());
    }

    #[test]
    fn test_duplicate_items_decided_once() {
        let plan = plan(&[], &[item(7, "Same"), item(7, "Same")], &NamePattern::numbered());
        assert_eq!(plan.to_create().len(), 1);
    }

    #[test]
    fn test_jira_keys() {
        let pattern = NamePattern::project_key("ABC").unwrap();
        let projects = vec![project(1, "ABC-1 Old title", true), project(2, "ABC-2 Done", true)];
        let items = vec![
            TrackedItem::new(TicketId::Key("ABC-1".to_string()), "New title"),
            TrackedItem::new(TicketId::Key("ABC-3".to_string()), "Fresh"),
        ];
        let plan = plan(&projects, &items, &pattern);

        assert_eq!(plan.to_update().len(), 1);
        assert_eq!(
            plan.to_create(),
            vec![&Decision::Create {
                ticket: TicketId::Key("ABC-3".to_string()),
                name: "ABC-3 Fresh".to_string(),
            }]
        );
        assert_eq!(plan.to_archive()[0].ticket(), &TicketId::Key("ABC-2".to_string()));
        assert_eq!(plan.changes(), 3);
    }

    #[test]
    fn test_keys_outside_project_are_skipped() {
        let pattern = NamePattern::project_key("ABC").unwrap();
        let items = vec![
            TrackedItem::new(TicketId::Key("ABC-1".to_string()), "Ours"),
            TrackedItem::new(TicketId::Key("XYZ-1".to_string()), "Other project issue"),
        ];

        let first = plan(&[], &items, &pattern);
        assert_eq!(first.to_create().len(), 1);
        assert_eq!(first.to_create()[0].ticket(), &TicketId::Key("ABC-1".to_string()));
        assert_eq!(first.foreign, vec![TicketId::Key("XYZ-1".to_string())]);

        // A project created by hand for the foreign issue still does not
        // lead to another create on the next run.
        let projects = vec![project(1, "ABC-1 Ours", true), project(2, "XYZ-1 Other project issue", true)];
        let second = plan(&projects, &items, &pattern);
        assert_eq!(second.changes(), 0);
        assert_eq!(second.foreign.len(), 1);
    }

    #[test]
    fn test_project_to_ticket_mapping() {
        let projects = vec![project(10, "#1 One", true), project(11, "Other", true), project(12, "#2 Two", false)];
        let index = ProjectIndex::build(&projects, &NamePattern::numbered());
        let mapping = index.project_to_ticket();

        assert_eq!(mapping.len(), 2);
        assert_eq!(mapping[&10], TicketId::Number(1));
        assert_eq!(mapping[&12], TicketId::Number(2));
    }
}
