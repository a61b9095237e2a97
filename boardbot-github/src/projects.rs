//! Repository project boards, their columns and cards

use async_trait::async_trait;
use boardbot_core::{
    BoardColumn, Card, CardContentType, ProjectBoard, ProjectTracker, TrackerError,
};
use octocrab::Page;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{Error, GitHubClient, Result};

#[derive(Debug, Deserialize)]
struct RawProject {
    id: u64,
    name: String,
}

#[derive(Debug, Deserialize)]
struct RawColumn {
    id: u64,
    name: String,
}

#[derive(Debug, Deserialize)]
struct RawCard {
    id: u64,
    url: String,
}

#[derive(Debug, Serialize)]
struct ListParams<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    state: Option<&'a str>,
    per_page: u8,
}

#[derive(Debug, Serialize)]
struct NewCard<'a> {
    content_id: u64,
    content_type: &'a str,
}

impl GitHubClient {
    /// List open projects of a repository, following pagination
    pub async fn list_repo_projects(&self, owner: &str, repo: &str) -> Result<Vec<ProjectBoard>> {
        debug!(owner, repo, "Fetching open repository projects");

        let params = ListParams {
            state: Some("open"),
            per_page: 100,
        };
        let page: Page<RawProject> = self
            .client()
            .get(format!("/repos/{}/{}/projects", owner, repo), Some(&params))
            .await
            .map_err(|e| Error::for_resource(e, format!("{}/{}", owner, repo)))?;
        let projects = self
            .client()
            .all_pages(page)
            .await
            .map_err(|e| Error::for_resource(e, format!("{}/{}", owner, repo)))?;

        info!(owner, repo, count = projects.len(), "Fetched projects");

        Ok(projects
            .into_iter()
            .map(|p| ProjectBoard {
                id: p.id,
                name: p.name,
            })
            .collect())
    }

    /// List the columns of a project, following pagination
    pub async fn list_project_columns(&self, project_id: u64) -> Result<Vec<BoardColumn>> {
        debug!(project_id, "Fetching project columns");

        let params = ListParams {
            state: None,
            per_page: 100,
        };
        let page: Page<RawColumn> = self
            .client()
            .get(format!("/projects/{}/columns", project_id), Some(&params))
            .await
            .map_err(|e| Error::for_resource(e, format!("project {}", project_id)))?;
        let columns = self
            .client()
            .all_pages(page)
            .await
            .map_err(|e| Error::for_resource(e, format!("project {}", project_id)))?;

        info!(project_id, count = columns.len(), "Fetched columns");

        Ok(columns
            .into_iter()
            .map(|c| BoardColumn {
                id: c.id,
                name: c.name,
            })
            .collect())
    }

    /// Create a card linking an issue or pull request
    pub async fn create_project_card(
        &self,
        column_id: u64,
        content_type: CardContentType,
        content_id: u64,
    ) -> Result<Card> {
        debug!(column_id, %content_type, content_id, "Creating project card");

        let body = NewCard {
            content_id,
            content_type: content_type.as_str(),
        };
        let card: RawCard = self
            .client()
            .post(format!("/projects/columns/{}/cards", column_id), Some(&body))
            .await
            .map_err(|e| Error::for_resource(e, format!("column {}", column_id)))?;

        info!(column_id, card_id = card.id, "Created project card");

        Ok(Card {
            id: card.id,
            url: card.url,
        })
    }
}

#[async_trait]
impl ProjectTracker for GitHubClient {
    async fn list_open_projects(
        &self,
        owner: &str,
        repo: &str,
    ) -> std::result::Result<Vec<ProjectBoard>, TrackerError> {
        self.list_repo_projects(owner, repo)
            .await
            .map_err(TrackerError::from_source)
    }

    async fn list_columns(
        &self,
        project_id: u64,
    ) -> std::result::Result<Vec<BoardColumn>, TrackerError> {
        self.list_project_columns(project_id)
            .await
            .map_err(TrackerError::from_source)
    }

    async fn create_card(
        &self,
        column_id: u64,
        content_type: CardContentType,
        content_id: u64,
    ) -> std::result::Result<Card, TrackerError> {
        self.create_project_card(column_id, content_type, content_id)
            .await
            .map_err(TrackerError::from_source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boardbot_core::config::GitHubConfig;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> GitHubClient {
        let config = GitHubConfig {
            api_url: server.uri(),
            ..GitHubConfig::default()
        };
        GitHubClient::new("token".to_string(), &config).unwrap()
    }

    #[tokio::test]
    async fn test_list_open_projects() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/status-im/status-react/projects"))
            .and(query_param("state", "open"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": 1, "name": "Pipeline for QA", "state": "open", "number": 1 },
                { "id": 2, "name": "Roadmap", "state": "open", "number": 2 }
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let boards = client
            .list_open_projects("status-im", "status-react")
            .await
            .unwrap();

        assert_eq!(
            boards,
            vec![
                ProjectBoard {
                    id: 1,
                    name: "Pipeline for QA".to_string()
                },
                ProjectBoard {
                    id: 2,
                    name: "Roadmap".to_string()
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_list_projects_disabled() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/o/r/projects"))
            .respond_with(ResponseTemplate::new(410).set_body_json(json!({
                "message": "Projects are disabled for this repository",
                "documentation_url": "https://docs.github.com/rest/projects/projects"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client.list_repo_projects("o", "r").await.unwrap_err();
        assert!(matches!(err, Error::ProjectsDisabled(ref repo) if repo == "o/r"));
    }

    #[tokio::test]
    async fn test_list_columns() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/projects/1/columns"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": 8, "name": "TODO" },
                { "id": 9, "name": "REVIEW" }
            ])))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let columns = client.list_columns(1).await.unwrap();

        assert_eq!(columns.len(), 2);
        assert_eq!(columns[1].id, 9);
        assert_eq!(columns[1].name, "REVIEW");
    }

    #[tokio::test]
    async fn test_list_columns_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/projects/5/columns"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "message": "Not Found",
                "documentation_url": "https://docs.github.com/rest"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client.list_columns(5).await.unwrap_err();
        assert!(err.to_string().contains("project 5"));
    }

    #[tokio::test]
    async fn test_create_card() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/projects/columns/9/cards"))
            .and(body_json(json!({ "content_id": 42, "content_type": "PullRequest" })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": 1000,
                "url": "https://api.github.com/projects/columns/cards/1000",
                "column_url": "https://api.github.com/projects/columns/9",
                "content_url": "https://api.github.com/repos/o/r/issues/7"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let card = client
            .create_card(9, CardContentType::PullRequest, 42)
            .await
            .unwrap();

        assert_eq!(card.id, 1000);
        assert_eq!(card.url, "https://api.github.com/projects/columns/cards/1000");
    }

    #[tokio::test]
    async fn test_create_card_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/projects/columns/9/cards"))
            .respond_with(ResponseTemplate::new(422).set_body_json(json!({
                "message": "Validation Failed",
                "errors": [{ "message": "Project already has the associated issue" }],
                "documentation_url": "https://docs.github.com/rest"
            })))
            .expect(2)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client
            .create_project_card(9, CardContentType::PullRequest, 42)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Api(octocrab::Error::GitHub { ref source, .. })
                if source.message == "Validation Failed"
        ));

        let err = client
            .create_card(9, CardContentType::PullRequest, 42)
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("GitHub API error"));
    }
}
