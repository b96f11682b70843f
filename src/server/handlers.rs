use std::collections::BTreeMap;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::{json, Value};

use crate::app::chat_use_case::{self, ChatUseCase};
use crate::app::{directory_use_case, journal_use_case};
use crate::catalog::{EMOTIONS, TIPS};
use crate::error::{ApiError, Result};
use crate::server::extract::{AuthUser, Generator, JsonBody, Store};
use crate::server::requests::{
    document_id, CreateNoteRequest, CreatePsychologistRequest, HistoryParams, SendMessageRequest,
};
use crate::types::{ChatMessage, Emotion, Note, Psychologist, Tip};

fn message(text: &str) -> Json<Value> {
    Json(json!({ "message": text }))
}

fn created(id: String, text: &str) -> impl IntoResponse {
    (StatusCode::CREATED, Json(json!({ "id": id, "message": text })))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "message": "Zenith API is running" }))
}

pub async fn emotions(_store: Store, _user: AuthUser) -> Json<&'static [Emotion]> {
    Json(&EMOTIONS[..])
}

pub async fn tips(_store: Store, _user: AuthUser) -> Json<&'static [Tip]> {
    Json(&TIPS[..])
}

// Chat

pub async fn chat_history(
    Store(storage): Store,
    AuthUser(claims): AuthUser,
    params: std::result::Result<Query<HistoryParams>, QueryRejection>,
) -> Result<Json<Vec<ChatMessage>>> {
    let Query(params) = params
        .map_err(|_| ApiError::BadRequest("limit must be a non-negative integer".to_string()))?;
    let history = chat_use_case::history(storage.as_ref(), &claims.uid, params.limit()).await?;
    Ok(Json(history))
}

pub async fn chat_send(
    Store(storage): Store,
    Generator(generator): Generator,
    AuthUser(claims): AuthUser,
    JsonBody(body): JsonBody<SendMessageRequest>,
) -> Result<Json<Value>> {
    let text = body.into_message()?;
    let reply = ChatUseCase::new(storage, generator).send(&claims, &text).await?;
    Ok(Json(json!({ "response": reply })))
}

pub async fn chat_clear(Store(storage): Store, AuthUser(claims): AuthUser) -> Result<Json<Value>> {
    storage.clear_chat_messages(&claims.uid).await?;
    Ok(message("Chat history cleared"))
}

// Notes

pub async fn list_notes(Store(storage): Store, user: AuthUser) -> Result<Json<Vec<Note>>> {
    let notes = journal_use_case::list_notes(storage.as_ref(), user.email()?).await?;
    Ok(Json(notes))
}

pub async fn create_note(
    Store(storage): Store,
    user: AuthUser,
    JsonBody(body): JsonBody<CreateNoteRequest>,
) -> Result<impl IntoResponse> {
    let mut note = body.into_note(user.email()?)?;
    let id = journal_use_case::create_note(storage.as_ref(), &mut note).await?;
    Ok(created(id, "Note created successfully"))
}

pub async fn delete_note(
    Store(storage): Store,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let id = document_id(id)?;
    journal_use_case::delete_note(storage.as_ref(), &id, user.email()?).await?;
    Ok(message("Note deleted successfully"))
}

pub async fn calendar_emotions(
    Store(storage): Store,
    user: AuthUser,
) -> Result<Json<BTreeMap<String, String>>> {
    let by_day = journal_use_case::calendar(storage.as_ref(), user.email()?).await?;
    Ok(Json(by_day))
}

// Psychologist directory

pub async fn list_psychologists(
    Store(storage): Store,
    _user: AuthUser,
) -> Result<Json<Vec<Psychologist>>> {
    Ok(Json(directory_use_case::list(storage.as_ref()).await?))
}

pub async fn create_psychologist(
    Store(storage): Store,
    AuthUser(claims): AuthUser,
    JsonBody(body): JsonBody<CreatePsychologistRequest>,
) -> Result<impl IntoResponse> {
    let mut entry = body.into_psychologist()?;
    let id = directory_use_case::create(storage.as_ref(), &claims, &mut entry).await?;
    Ok(created(id, "Psychologist created successfully"))
}

pub async fn delete_psychologist(
    Store(storage): Store,
    AuthUser(claims): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let id = document_id(id)?;
    directory_use_case::delete(storage.as_ref(), &claims, &id).await?;
    Ok(message("Psychologist deleted successfully"))
}
