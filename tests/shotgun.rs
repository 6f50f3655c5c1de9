#[cfg(test)]
mod tests {
    use anyhow::Result;
    use chrono::NaiveDate;
    use serde_json::json;
    use togglsync::api::{Credentials, ExistingWorkLog, Session, Shotgun, ShotgunConfig, Tracker};
    use togglsync::libs::aggregate::WorkLog;
    use togglsync::libs::error::is_rejection;
    use togglsync::libs::prompt::Prompt;
    use togglsync::libs::secret::SecretStore;
    use togglsync::libs::ticket::{TicketId, TrackedItem};
    use wiremock::matchers::{body_json, body_partial_json, body_string_contains, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct NoSecrets;

    impl SecretStore for NoSecrets {
        fn get(&self, _site: &str, _login: &str) -> Result<Option<String>> {
            Ok(None)
        }

        fn set(&self, _site: &str, _login: &str, _secret: &str) -> Result<()> {
            Ok(())
        }

        fn delete(&self, _site: &str, _login: &str) -> Result<()> {
            Ok(())
        }
    }

    fn config(server: &MockServer) -> ShotgunConfig {
        ShotgunConfig {
            site: server.uri(),
            login: "jdoe".to_string(),
            session_token: Some("refresh-1".to_string()),
        }
    }

    fn day(date: &str) -> NaiveDate {
        NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap()
    }

    /// Shotgun client resumed from its refresh token with user 88.
    async fn connected(server: &MockServer) -> Shotgun {
        Mock::given(method("POST"))
            .and(path("/api/v1/auth/access_token"))
            .and(body_string_contains("grant_type=refresh_token"))
            .and(body_string_contains("refresh_token=refresh-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "token_type": "Bearer",
                "access_token": "access-1",
                "expires_in": 600,
                "refresh_token": "refresh-1"
            })))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/entity/human_users"))
            .and(query_param("filter[login]", "jdoe"))
            .and(header("Authorization", "Bearer access-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"type": "HumanUser", "id": 88, "attributes": {"login": "jdoe"}}]
            })))
            .mount(server)
            .await;

        let mut shotgun = Shotgun::new(&config(server));
        let credentials = Credentials::new(Prompt::new(true), Box::new(NoSecrets));
        shotgun.connect(&credentials).await.unwrap();
        shotgun
    }

    #[tokio::test]
    async fn test_password_login_returns_refresh_token() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/auth/access_token"))
            .and(body_string_contains("grant_type=password"))
            .and(body_string_contains("username=jdoe"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "access-2",
                "refresh_token": "refresh-2"
            })))
            .mount(&mock_server)
            .await;

        let mut shotgun = Shotgun::new(&config(&mock_server));
        assert_eq!(shotgun.login("pw").await.unwrap(), "refresh-2");
    }

    #[tokio::test]
    async fn test_rejected_refresh_token() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/auth/access_token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({"errors": [{"status": 400}]})))
            .mount(&mock_server)
            .await;

        let mut shotgun = Shotgun::new(&config(&mock_server));
        assert!(!shotgun.resume("refresh-1").await.unwrap());
        assert!(is_rejection(&shotgun.login("pw").await.unwrap_err()));
    }

    #[tokio::test]
    async fn test_unknown_user() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/auth/access_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "access-1",
                "refresh_token": "refresh-1"
            })))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/entity/human_users"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
            .mount(&mock_server)
            .await;

        let mut shotgun = Shotgun::new(&config(&mock_server));
        let credentials = Credentials::new(Prompt::new(true), Box::new(NoSecrets));
        let err = shotgun.connect(&credentials).await.unwrap_err();
        assert!(err.to_string().contains("jdoe"));
    }

    #[tokio::test]
    async fn test_active_tickets_of_current_sprint() {
        let mock_server = MockServer::start().await;
        let mut shotgun = connected(&mock_server).await;
        Mock::given(method("POST"))
            .and(path("/api/v1/entity/tickets/_search"))
            .and(header("Content-Type", "application/vnd+shotgun.api3_array+json"))
            .and(header("Authorization", "Bearer access-1"))
            .and(body_partial_json(json!({
                "filters": [
                    ["sg_sprint.CustomEntity01.sg_status_list", "is", "ip"],
                    ["addressings_to", "is", {"type": "HumanUser", "id": 88}]
                ],
                "fields": ["title"]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [
                    {"type": "Ticket", "id": 12, "attributes": {"title": "Crash on save"}},
                    {"type": "Ticket", "id": 13, "attributes": {"title": "Slow export"}}
                ]
            })))
            .mount(&mock_server)
            .await;

        let items = shotgun.find_active_tickets().await.unwrap();
        assert_eq!(
            items,
            vec![
                TrackedItem::new(TicketId::Number(12), "Crash on save"),
                TrackedItem::new(TicketId::Number(13), "Slow export"),
            ]
        );
    }

    #[tokio::test]
    async fn test_find_work_log() {
        let mock_server = MockServer::start().await;
        let mut shotgun = connected(&mock_server).await;
        Mock::given(method("POST"))
            .and(path("/api/v1/entity/time_logs/_search"))
            .and(body_partial_json(json!({
                "filters": [
                    ["entity", "is", {"type": "Ticket", "id": 12}],
                    ["description", "is", "Review"],
                    ["date", "is", "2024-01-02"],
                    ["user", "is", {"type": "HumanUser", "id": 88}]
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"type": "TimeLog", "id": 500, "attributes": {"duration": 45}}]
            })))
            .mount(&mock_server)
            .await;

        let found = shotgun
            .find_work_log(&TicketId::Number(12), "Review", day("2024-01-02"))
            .await
            .unwrap();
        assert_eq!(
            found,
            Some(ExistingWorkLog {
                id: "500".to_string(),
                minutes: 45,
            })
        );
    }

    #[tokio::test]
    async fn test_search_without_data_finds_nothing() {
        let mock_server = MockServer::start().await;
        let mut shotgun = connected(&mock_server).await;
        Mock::given(method("POST"))
            .and(path("/api/v1/entity/time_logs/_search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"links": {}})))
            .mount(&mock_server)
            .await;

        let found = shotgun
            .find_work_log(&TicketId::Number(12), "Review", day("2024-01-02"))
            .await
            .unwrap();
        assert_eq!(found, None);
    }

    #[tokio::test]
    async fn test_create_work_log_uses_ticket_project() {
        let mock_server = MockServer::start().await;
        let mut shotgun = connected(&mock_server).await;
        Mock::given(method("GET"))
            .and(path("/api/v1/entity/tickets/12"))
            .and(query_param("fields", "project"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {
                    "type": "Ticket",
                    "id": 12,
                    "attributes": {},
                    "relationships": {"project": {"data": {"type": "Project", "id": 70}}}
                }
            })))
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/v1/entity/time_logs"))
            .and(body_json(json!({
                "entity": {"type": "Ticket", "id": 12},
                "project": {"type": "Project", "id": 70},
                "user": {"type": "HumanUser", "id": 88},
                "description": "Review",
                "date": "2024-01-02",
                "duration": 25
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"data": {"id": 501}})))
            .expect(2)
            .mount(&mock_server)
            .await;

        let log = WorkLog {
            ticket: TicketId::Number(12),
            task: "Review".to_string(),
            day: day("2024-01-02"),
            minutes: 25,
        };
        shotgun.create_work_log(&log).await.unwrap();
        shotgun.create_work_log(&log).await.unwrap();
    }

    #[tokio::test]
    async fn test_update_work_log_duration() {
        let mock_server = MockServer::start().await;
        let mut shotgun = connected(&mock_server).await;
        Mock::given(method("PUT"))
            .and(path("/api/v1/entity/time_logs/500"))
            .and(body_json(json!({"duration": 60})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"id": 500}})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let existing = ExistingWorkLog {
            id: "500".to_string(),
            minutes: 45,
        };
        let log = WorkLog {
            ticket: TicketId::Number(12),
            task: "Review".to_string(),
            day: day("2024-01-02"),
            minutes: 60,
        };
        shotgun.update_work_log(&existing, &log).await.unwrap();
    }

    #[tokio::test]
    async fn test_ticket_without_project() {
        let mock_server = MockServer::start().await;
        let mut shotgun = connected(&mock_server).await;
        Mock::given(method("GET"))
            .and(path("/api/v1/entity/tickets/12"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"type": "Ticket", "id": 12, "relationships": {"project": {"data": null}}}
            })))
            .mount(&mock_server)
            .await;

        let log = WorkLog {
            ticket: TicketId::Number(12),
            task: "Review".to_string(),
            day: day("2024-01-02"),
            minutes: 5,
        };
        let err = shotgun.create_work_log(&log).await.unwrap_err();
        assert!(err.to_string().contains("12"));
    }

    #[tokio::test]
    async fn test_keyed_ticket_rejected() {
        let mock_server = MockServer::start().await;
        let mut shotgun = connected(&mock_server).await;
        let ticket = TicketId::Key("ABC-1".to_string());
        assert!(shotgun.find_work_log(&ticket, "Review", day("2024-01-02")).await.is_err());
    }
}
