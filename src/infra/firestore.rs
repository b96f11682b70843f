use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::constants::{
    CONVERSATIONS_COLLECTION, FIRESTORE_URL, MESSAGES_SUBCOLLECTION, NOTES_COLLECTION,
    PSYCHOLOGISTS_COLLECTION,
};
use crate::error::{ApiError, Result};
use crate::infra::firestore_value::{
    chat_message_fields, chat_message_from_document, note_fields, note_from_document,
    parse_timestamp, psychologist_fields, psychologist_from_document, string_value, Document,
    Fields,
};
use crate::infra::google_auth::{TokenProvider, TokenSource};
use crate::infra::http_client::error_body;
use crate::storage::{new_document_id, Storage};
use crate::types::{ChatMessage, Note, Psychologist};

// Firestore caps a commit at 500 writes
const MAX_WRITES_PER_COMMIT: usize = 500;
const LIST_PAGE_SIZE: u32 = 300;

#[derive(Debug, Deserialize)]
struct QueryResult {
    document: Option<Document>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    documents: Vec<Document>,
    next_page_token: Option<String>,
}

/// `Storage` backed by the Firestore REST API (v1)
pub struct FirestoreStorage {
    client: reqwest::Client,
    base_url: String,
    project_id: String,
    tokens: TokenProvider,
}

impl FirestoreStorage {
    pub fn new(client: reqwest::Client, project_id: impl Into<String>, tokens: TokenSource) -> Self {
        Self::with_base_url(client, project_id, tokens, FIRESTORE_URL)
    }

    pub fn with_base_url(
        client: reqwest::Client,
        project_id: impl Into<String>,
        tokens: TokenSource,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            tokens: TokenProvider::new(client.clone(), tokens),
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            project_id: project_id.into(),
        }
    }

    /// Resource name prefix for documents in the default database
    fn documents_path(&self) -> String {
        format!("projects/{}/databases/(default)/documents", self.project_id)
    }

    /// URL of `segments` below the documents root, with an optional `:method`
    /// suffix. Each segment is percent-encoded and must name exactly one level.
    fn url(&self, segments: &[&str], method: Option<&str>) -> Result<Url> {
        if let Some(bad) = segments
            .iter()
            .find(|s| s.is_empty() || s.contains('/') || **s == "." || **s == "..")
        {
            return Err(ApiError::BadRequest(format!("Invalid document path segment '{bad}'")));
        }

        let mut path: Vec<&str> = vec![
            "v1",
            "projects",
            self.project_id.as_str(),
            "databases",
            "(default)",
            "documents",
        ];
        path.extend_from_slice(segments);
        let last = match (path.pop(), method) {
            (Some(last), Some(method)) => format!("{last}:{method}"),
            (Some(last), None) => last.to_string(),
            (None, _) => String::new(),
        };

        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ApiError::Config(format!("invalid Firestore URL '{}': {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|_| ApiError::Config(format!("invalid Firestore URL '{}'", self.base_url)))?
            .pop_if_empty()
            .extend(path)
            .push(&last);
        Ok(url)
    }

    async fn check(resp: reqwest::Response) -> Result<reqwest::Response> {
        if resp.status().is_success() {
            Ok(resp)
        } else {
            Err(ApiError::Store(error_body(resp).await))
        }
    }

    async fn commit(&self, writes: Vec<Value>) -> Result<Value> {
        let resp = self
            .client
            .post(self.url(&[], Some("commit"))?)
            .bearer_auth(self.tokens.token().await?)
            .json(&json!({ "writes": writes }))
            .send()
            .await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    /// Write a new document whose `timestamp` field is set by the server.
    /// Returns the new id and the server-assigned time.
    async fn create_timestamped(&self, collection: &[&str], fields: Fields) -> Result<(String, DateTime<Utc>)> {
        let id = new_document_id();
        let name = format!("{}/{}/{}", self.documents_path(), collection.join("/"), id);
        let write = json!({
            "update": { "name": name, "fields": fields },
            "updateTransforms": [
                { "fieldPath": "timestamp", "setToServerValue": "REQUEST_TIME" }
            ],
            "currentDocument": { "exists": false }
        });

        let resp = self.commit(vec![write]).await?;
        let stamped = resp
            .pointer("/writeResults/0/transformResults/0/timestampValue")
            .or_else(|| resp.get("commitTime"))
            .and_then(Value::as_str)
            .and_then(parse_timestamp)
            .ok_or_else(|| ApiError::Store("commit response carried no timestamp".to_string()))?;

        debug!("Created {}/{}", collection.join("/"), id);
        Ok((id, stamped))
    }

    /// Run a structured query under `parent` (relative to the documents root)
    async fn run_query(&self, parent: &[&str], query: Value) -> Result<Vec<Document>> {
        let resp = self
            .client
            .post(self.url(parent, Some("runQuery"))?)
            .bearer_auth(self.tokens.token().await?)
            .json(&json!({ "structuredQuery": query }))
            .send()
            .await?;
        let results: Vec<QueryResult> = Self::check(resp).await?.json().await?;
        Ok(results.into_iter().filter_map(|r| r.document).collect())
    }

    async fn get_document(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        let resp = self
            .client
            .get(self.url(&[collection, id], None)?)
            .bearer_auth(self.tokens.token().await?)
            .send()
            .await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Ok(Some(Self::check(resp).await?.json().await?))
    }

    async fn delete_document(&self, collection: &str, id: &str) -> Result<()> {
        let resp = self
            .client
            .delete(self.url(&[collection, id], None)?)
            .bearer_auth(self.tokens.token().await?)
            .send()
            .await?;
        Self::check(resp).await?;
        debug!("Deleted {}/{}", collection, id);
        Ok(())
    }

    async fn list_collection(&self, collection: &str) -> Result<Vec<Document>> {
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut req = self
                .client
                .get(self.url(&[collection], None)?)
                .bearer_auth(self.tokens.token().await?)
                .query(&[("pageSize", LIST_PAGE_SIZE.to_string())]);
            if let Some(token) = &page_token {
                req = req.query(&[("pageToken", token)]);
            }
            let page: ListResponse = Self::check(req.send().await?).await?.json().await?;
            documents.extend(page.documents);
            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }
        Ok(documents)
    }
}

#[async_trait]
impl Storage for FirestoreStorage {
    async fn create_note(&self, note: &mut Note) -> Result<()> {
        let (id, ts) = self.create_timestamped(&[NOTES_COLLECTION], note_fields(note)).await?;
        note.id = Some(id);
        note.timestamp = Some(ts);
        Ok(())
    }

    async fn list_notes_by_owner(&self, owner: &str) -> Result<Vec<Note>> {
        // Equality filter only: ordering server-side would need a composite index
        let query = json!({
            "from": [{ "collectionId": NOTES_COLLECTION }],
            "where": {
                "fieldFilter": {
                    "field": { "fieldPath": "email" },
                    "op": "EQUAL",
                    "value": string_value(owner)
                }
            }
        });
        let docs = self.run_query(&[], query).await?;
        Ok(docs.iter().map(note_from_document).collect())
    }

    async fn get_note(&self, id: &str) -> Result<Option<Note>> {
        let doc = self.get_document(NOTES_COLLECTION, id).await?;
        Ok(doc.as_ref().map(note_from_document))
    }

    async fn delete_note(&self, id: &str) -> Result<()> {
        self.delete_document(NOTES_COLLECTION, id).await
    }

    async fn create_chat_message(&self, message: &mut ChatMessage) -> Result<()> {
        let collection = [CONVERSATIONS_COLLECTION, message.user_id.as_str(), MESSAGES_SUBCOLLECTION];
        let (_, ts) = self
            .create_timestamped(&collection, chat_message_fields(message))
            .await?;
        message.timestamp = Some(ts);
        Ok(())
    }

    async fn recent_chat_messages(&self, user_id: &str, limit: usize) -> Result<Vec<ChatMessage>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let query = json!({
            "from": [{ "collectionId": MESSAGES_SUBCOLLECTION }],
            "orderBy": [{ "field": { "fieldPath": "timestamp" }, "direction": "DESCENDING" }],
            "limit": limit
        });
        let docs = self.run_query(&[CONVERSATIONS_COLLECTION, user_id], query).await?;
        Ok(docs.iter().map(chat_message_from_document).collect())
    }

    async fn clear_chat_messages(&self, user_id: &str) -> Result<usize> {
        let query = json!({
            "from": [{ "collectionId": MESSAGES_SUBCOLLECTION }],
            "select": { "fields": [{ "fieldPath": "__name__" }] }
        });
        let docs = self.run_query(&[CONVERSATIONS_COLLECTION, user_id], query).await?;

        for chunk in docs.chunks(MAX_WRITES_PER_COMMIT) {
            let writes = chunk.iter().map(|d| json!({ "delete": &d.name })).collect();
            self.commit(writes).await?;
        }
        Ok(docs.len())
    }

    async fn list_psychologists(&self) -> Result<Vec<Psychologist>> {
        let docs = self.list_collection(PSYCHOLOGISTS_COLLECTION).await?;
        Ok(docs.iter().map(psychologist_from_document).collect())
    }

    async fn create_psychologist(&self, psychologist: &mut Psychologist) -> Result<()> {
        // Plain create: the server picks the document id
        let resp = self
            .client
            .post(self.url(&[PSYCHOLOGISTS_COLLECTION], None)?)
            .bearer_auth(self.tokens.token().await?)
            .json(&json!({ "fields": psychologist_fields(psychologist) }))
            .send()
            .await?;
        let doc: Document = Self::check(resp).await?.json().await?;
        psychologist.id = Some(doc.id().to_string());
        Ok(())
    }

    async fn delete_psychologist(&self, id: &str) -> Result<()> {
        self.delete_document(PSYCHOLOGISTS_COLLECTION, id).await
    }
}
