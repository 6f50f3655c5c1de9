#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};
    use serde_json::json;
    use togglsync::api::toggl::{Project, ProjectUpdate, Toggl, TogglConfig};
    use togglsync::api::Session;
    use togglsync::libs::error::{exit_code, is_rejection};
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const AUTHORIZATION: &str = "Basic dG9rOmFwaV90b2tlbg==";

    fn config(server: &MockServer, workspace_id: Option<u64>) -> TogglConfig {
        TogglConfig {
            workspace_id,
            api_url: Some(server.uri()),
        }
    }

    #[tokio::test]
    async fn test_login_verifies_token() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/me"))
            .and(header("Authorization", AUTHORIZATION))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1})))
            .mount(&mock_server)
            .await;

        let mut toggl = Toggl::new(&config(&mock_server, None));
        assert_eq!(toggl.login(" tok ").await.unwrap(), "tok");
    }

    #[tokio::test]
    async fn test_login_rejected_token() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/me"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&mock_server)
            .await;

        let mut toggl = Toggl::new(&config(&mock_server, None));
        assert!(!toggl.resume("bad").await.unwrap());
        assert!(is_rejection(&toggl.login("bad").await.unwrap_err()));
    }

    #[tokio::test]
    async fn test_projects_use_first_workspace() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/me/workspaces"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 11}, {"id": 12}])))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/workspaces/11/projects"))
            .and(query_param("active", "both"))
            .and(header("Authorization", AUTHORIZATION))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 1, "name": "#1 Open", "active": true, "color": "#06aaf5"},
                {"id": 2, "name": "#2 Closed", "active": false}
            ])))
            .expect(1)
            .mount(&mock_server)
            .await;

        let mut toggl = Toggl::with_api_token(&config(&mock_server, None), "tok");
        let projects = toggl.projects().await.unwrap();

        assert_eq!(
            projects,
            vec![
                Project {
                    id: 1,
                    name: "#1 Open".to_string(),
                    active: true,
                },
                Project {
                    id: 2,
                    name: "#2 Closed".to_string(),
                    active: false,
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_project_list_is_null() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/workspaces/5/projects"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(null)))
            .mount(&mock_server)
            .await;

        let mut toggl = Toggl::with_api_token(&config(&mock_server, Some(5)), "tok");
        assert!(toggl.projects().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_workspace_not_found() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/me/workspaces"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&mock_server)
            .await;

        let mut toggl = Toggl::with_api_token(&config(&mock_server, None), "tok");
        let err = toggl.workspace_id().await.unwrap_err();
        assert_eq!(exit_code(&err), 2);
        assert!(err.to_string().contains("workspace not found"));
    }

    #[tokio::test]
    async fn test_create_and_update_project() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/workspaces/5/projects"))
            .and(body_json(json!({"name": "#7 Add export", "active": true})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 9, "name": "#7 Add export", "active": true})))
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/workspaces/5/projects/9"))
            .and(body_json(json!({"active": false})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 9, "name": "#7 Add export", "active": false})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let mut toggl = Toggl::with_api_token(&config(&mock_server, Some(5)), "tok");
        let created = toggl.create_project("#7 Add export").await.unwrap();
        assert_eq!(created.id, 9);

        let update = ProjectUpdate {
            name: None,
            active: Some(false),
        };
        let updated = toggl.update_project(9, &update).await.unwrap();
        assert!(!updated.active);
    }

    #[tokio::test]
    async fn test_failed_write_carries_response_body() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/workspaces/5/projects"))
            .respond_with(ResponseTemplate::new(400).set_body_string("name has already been taken"))
            .mount(&mock_server)
            .await;

        let mut toggl = Toggl::with_api_token(&config(&mock_server, Some(5)), "tok");
        let err = toggl.create_project("#7 Add export").await.unwrap_err();
        assert!(err.to_string().contains("name has already been taken"));
        assert_eq!(exit_code(&err), 2);
    }

    #[tokio::test]
    async fn test_time_entries_window() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/me/time_entries"))
            .and(query_param("start_date", "2024-01-01T00:00:00Z"))
            .and(query_param("end_date", "2024-01-08T00:00:00Z"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 1, "project_id": 5, "description": "A", "start": "2024-01-01T09:00:00+00:00", "duration": 600},
                {"id": 2, "project_id": null, "description": null, "start": "2024-01-02T09:00:00Z", "duration": -1704186000}
            ])))
            .mount(&mock_server)
            .await;

        let toggl = Toggl::with_api_token(&config(&mock_server, Some(5)), "tok");
        let start: DateTime<Utc> = "2024-01-01T00:00:00Z".parse().unwrap();
        let end: DateTime<Utc> = "2024-01-08T00:00:00Z".parse().unwrap();
        let entries = toggl.time_entries(start, end).await.unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].project_id, Some(5));
        assert_eq!(entries[0].description.as_deref(), Some("A"));
        assert_eq!(entries[1].project_id, None);
        assert!(entries[1].duration < 0);
    }

    #[tokio::test]
    async fn test_reads_retry_server_errors() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/me/workspaces"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/me/workspaces"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 3}])))
            .mount(&mock_server)
            .await;

        let mut toggl = Toggl::with_api_token(&config(&mock_server, None), "tok");
        assert_eq!(toggl.workspace_id().await.unwrap(), 3);
    }
}
