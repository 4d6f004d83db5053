//! HTTP note source
//!
//! Talks JSON to a remote notes collection. Two flavours are supported:
//! - `Plain`: a REST API where `POST` echoes the created note and
//!   `DELETE` of an unknown id answers 404
//! - `Firebase`: the Realtime Database REST API, which needs a `.json`
//!   suffix on every path, lists notes as an id-keyed map and answers
//!   `POST` with `{"name": "<generated id>"}`

use super::NoteSource;
use crate::config;
use crate::database::{CreateNoteRequest, NotePatch, NoteRecord, RawNote, RawPayload};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RestFlavor {
    #[default]
    Plain,
    Firebase,
}

/// Body returned by a Firebase push
#[derive(Deserialize)]
struct PushResponse {
    name: String,
}

pub struct RestSource {
    name: String,
    base_url: Url,
    flavor: RestFlavor,
    client: Client,
}

impl RestSource {
    pub fn new(
        name: impl Into<String>,
        base_url: &str,
        flavor: RestFlavor,
        timeout: Duration,
    ) -> Result<Self> {
        let name = name.into();
        let mut base_url = Url::parse(base_url)
            .map_err(|e| AppError::Config(format!("Invalid URL for source '{}': {}", name, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::Config(format!(
                "URL for source '{}' cannot hold note paths: {}",
                name, base_url
            )));
        }
        let path = base_url.path().trim_end_matches('/').to_string();
        base_url.set_path(&path);

        let client = Client::builder()
            .user_agent(config::USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            name,
            base_url,
            flavor,
            client,
        })
    }

    fn collection_url(&self) -> Url {
        let mut url = self.base_url.clone();
        if self.flavor == RestFlavor::Firebase {
            let path = format!("{}.json", url.path().trim_end_matches('/'));
            url.set_path(&path);
        }
        url
    }

    /// Collection URL plus the id as one escaped path segment
    fn item_url(&self, id: &str) -> Result<Url> {
        let segment = match self.flavor {
            RestFlavor::Plain => id.to_string(),
            RestFlavor::Firebase => format!("{}.json", id),
        };

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::Config(format!("Source '{}' has no path", self.name)))?
            .pop_if_empty()
            .push(&segment);
        Ok(url)
    }

    /// Turn non-2xx answers into errors, keeping 404 distinguishable
    fn check_status(&self, response: Response, id: Option<&str>) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::NOT_FOUND {
            if let Some(id) = id {
                return Err(AppError::NoteNotFound(id.to_string()));
            }
        }

        Err(AppError::Status {
            source_name: self.name.clone(),
            status: status.as_u16(),
        })
    }

    /// Build the created note from the POST response body
    fn created_note(&self, body: &str, req: CreateNoteRequest) -> Result<NoteRecord> {
        let id = match self.flavor {
            RestFlavor::Firebase => serde_json::from_str::<PushResponse>(body)?.name,
            RestFlavor::Plain => {
                let raw: RawNote = serde_json::from_str(body)?;
                raw.id.ok_or_else(|| {
                    AppError::Generic(format!(
                        "Source '{}' did not return an id for the new note",
                        self.name
                    ))
                })?
            }
        };

        Ok(NoteRecord {
            id,
            title: Some(req.title),
            content: Some(req.content),
            category: Some(req.category),
            created: Some(req.created),
        })
    }
}

#[async_trait]
impl NoteSource for RestSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_all(&self) -> Result<RawPayload> {
        let url = self.collection_url();
        tracing::debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        let body = self.check_status(response, None)?.text().await?;

        RawPayload::from_json(&body)
    }

    async fn insert(&self, req: CreateNoteRequest) -> Result<NoteRecord> {
        let url = self.collection_url();
        tracing::debug!("POST {}", url);

        let response = self.client.post(url).json(&req).send().await?;
        let body = self.check_status(response, None)?.text().await?;

        self.created_note(&body, req)
    }

    async fn patch(&self, id: &str, patch: NotePatch) -> Result<()> {
        let url = self.item_url(id)?;
        tracing::debug!("PATCH {}", url);

        let response = self.client.patch(url).json(&patch).send().await?;
        self.check_status(response, Some(id))?;

        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<()> {
        let url = self.item_url(id)?;
        tracing::debug!("DELETE {}", url);

        let response = self.client.delete(url).send().await?;
        self.check_status(response, Some(id))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Category;
    use crate::gateway::PersistenceGateway;
    use chrono::Utc;
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    fn source(flavor: RestFlavor) -> RestSource {
        RestSource::new(
            "remote",
            "https://notes.example.com/api/notes/",
            flavor,
            Duration::from_secs(5),
        )
        .unwrap()
    }

    fn request() -> CreateNoteRequest {
        CreateNoteRequest {
            title: "Hello".to_string(),
            content: "World".to_string(),
            category: Category::Active,
            created: Utc::now(),
        }
    }

    #[test]
    fn test_plain_urls() {
        let source = source(RestFlavor::Plain);

        assert_eq!(source.collection_url().as_str(), "https://notes.example.com/api/notes");
        assert_eq!(
            source.item_url("42").unwrap().as_str(),
            "https://notes.example.com/api/notes/42"
        );
    }

    #[test]
    fn test_firebase_urls() {
        let source = source(RestFlavor::Firebase);

        assert_eq!(
            source.collection_url().as_str(),
            "https://notes.example.com/api/notes.json"
        );
        assert_eq!(
            source.item_url("-Nx1").unwrap().as_str(),
            "https://notes.example.com/api/notes/-Nx1.json"
        );
    }

    #[test]
    fn test_item_url_escapes_id() {
        let source = source(RestFlavor::Plain);

        assert_eq!(
            source.item_url("a/b?c#d").unwrap().as_str(),
            "https://notes.example.com/api/notes/a%2Fb%3Fc%23d"
        );
    }

    #[test]
    fn test_firebase_keeps_query() {
        let source = RestSource::new(
            "remote",
            "https://demo.firebaseio.com/notes?auth=token",
            RestFlavor::Firebase,
            Duration::from_secs(5),
        )
        .unwrap();

        assert_eq!(
            source.collection_url().as_str(),
            "https://demo.firebaseio.com/notes.json?auth=token"
        );
    }

    #[test]
    fn test_rejects_invalid_url() {
        let result = RestSource::new("remote", "not a url", RestFlavor::Plain, Duration::from_secs(5));
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_firebase_push_response() {
        let source = source(RestFlavor::Firebase);

        let note = source
            .created_note(r#"{"name": "-NxAbC"}"#, request())
            .unwrap();

        assert_eq!(note.id, "-NxAbC");
        assert_eq!(note.category, Some(Category::Active));
    }

    #[test]
    fn test_plain_echo_response() {
        let source = source(RestFlavor::Plain);

        let note = source
            .created_note(
                r#"{"id": 7, "title": "Hello", "content": "World", "category": "active"}"#,
                request(),
            )
            .unwrap();

        assert_eq!(note.id, "7");
        assert_eq!(note.title.as_deref(), Some("Hello"));
    }

    #[test]
    fn test_plain_response_without_id_is_error() {
        let source = source(RestFlavor::Plain);

        let result = source.created_note(r#"{"title": "Hello"}"#, request());
        assert!(result.is_err());
    }

    #[test]
    fn test_create_body_uses_epoch_millis() {
        let req = request();
        let body = serde_json::to_value(&req).unwrap();

        assert_eq!(body["category"], "active");
        assert_eq!(body["created"], req.created.timestamp_millis());
    }

    /// Answer a single request on a local port and hand back what was received
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let request = read_request(&mut stream).await;

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            let _ = stream.shutdown().await;

            request
        });

        (format!("http://{}/notes", addr), handle)
    }

    async fn read_request(stream: &mut TcpStream) -> String {
        let mut request = Vec::new();
        let mut chunk = [0u8; 1024];

        loop {
            let n = stream.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&chunk[..n]);

            let Some(head_end) = request.windows(4).position(|w| w == b"\r\n\r\n") else {
                continue;
            };
            let head = String::from_utf8_lossy(&request[..head_end]).to_lowercase();
            let body_len = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|value| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if request.len() >= head_end + 4 + body_len {
                break;
            }
        }

        String::from_utf8_lossy(&request).into_owned()
    }

    fn local(base_url: &str, flavor: RestFlavor) -> RestSource {
        let source = RestSource::new("local", base_url, flavor, Duration::from_secs(5)).unwrap();
        // Proxy variables in the environment must not reroute loopback calls
        RestSource {
            client: Client::builder().no_proxy().build().unwrap(),
            ..source
        }
    }

    #[tokio::test]
    async fn test_fetch_list_body() {
        let (url, server) = serve_once(
            "200 OK",
            r#"[{"id": 1, "title": "a", "category": "active"}, {"id": "2", "title": "b"}]"#,
        )
        .await;

        let payload = local(&url, RestFlavor::Plain).fetch_all().await.unwrap();

        assert!(matches!(&payload, RawPayload::List(items) if items.len() == 2));
        assert!(server.await.unwrap().starts_with("GET /notes HTTP/1.1"));
    }

    #[tokio::test]
    async fn test_fetch_keyed_body() {
        let (url, server) = serve_once(
            "200 OK",
            r#"{"-Na": {"title": "a", "category": "trash"}, "-Nb": {"title": "b"}}"#,
        )
        .await;

        let payload = local(&url, RestFlavor::Firebase).fetch_all().await.unwrap();

        let RawPayload::Keyed(entries) = payload else {
            panic!("expected keyed payload");
        };
        assert_eq!(entries.keys().collect::<Vec<_>>(), vec!["-Na", "-Nb"]);
        assert!(server.await.unwrap().starts_with("GET /notes.json HTTP/1.1"));
    }

    #[tokio::test]
    async fn test_fetch_firebase_null_is_absent() {
        let (url, server) = serve_once("200 OK", "null").await;

        let payload = local(&url, RestFlavor::Firebase).fetch_all().await.unwrap();

        assert_eq!(payload, RawPayload::Absent);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_fetch_server_error_is_status() {
        let (url, server) = serve_once("500 Internal Server Error", "{}").await;

        let result = local(&url, RestFlavor::Plain).fetch_all().await;

        assert!(matches!(result, Err(AppError::Status { status: 500, .. })));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_unknown_id_is_not_found() {
        let (url, server) = serve_once("404 Not Found", "{}").await;

        let result = local(&url, RestFlavor::Plain).remove("7").await;

        assert!(matches!(result, Err(AppError::NoteNotFound(id)) if id == "7"));
        assert!(server.await.unwrap().starts_with("DELETE /notes/7 HTTP/1.1"));
    }

    #[tokio::test]
    async fn test_gateway_delete_over_http_is_idempotent() {
        let (url, server) = serve_once("404 Not Found", "{}").await;
        let gateway = PersistenceGateway::single(Arc::new(local(&url, RestFlavor::Plain)));

        assert!(gateway.delete("7").await.is_ok());
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_patch_sends_partial_body() {
        let (url, server) = serve_once("200 OK", "{}").await;

        local(&url, RestFlavor::Firebase)
            .patch(
                "-Na",
                NotePatch::Category {
                    category: Category::Archive,
                },
            )
            .await
            .unwrap();

        let request = server.await.unwrap();
        assert!(request.starts_with("PATCH /notes/-Na.json HTTP/1.1"));
        assert!(request.ends_with(r#"{"category":"archive"}"#));
    }

    #[tokio::test]
    async fn test_firebase_insert_reads_pushed_name() {
        let (url, server) = serve_once("200 OK", r#"{"name": "-NxNew"}"#).await;

        let note = local(&url, RestFlavor::Firebase)
            .insert(request())
            .await
            .unwrap();

        assert_eq!(note.id, "-NxNew");
        assert_eq!(note.title.as_deref(), Some("Hello"));
        let request = server.await.unwrap();
        assert!(request.starts_with("POST /notes.json HTTP/1.1"));
        assert!(request.contains(r#""category":"active""#));
    }
}
