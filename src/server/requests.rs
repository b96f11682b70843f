//! Request bodies and query strings, with their validation rules.

use serde::Deserialize;

use crate::catalog::find_emotion;
use crate::constants::{DEFAULT_HISTORY_LIMIT, MAX_HISTORY_LIMIT};
use crate::error::{ApiError, Result};
use crate::types::{Note, Psychologist};

fn required(value: String, field: &str) -> Result<String> {
    if value.trim().is_empty() {
        Err(ApiError::BadRequest(format!("{field} is required")))
    } else {
        Ok(value)
    }
}

/// Validate an id taken from the URL path. Ids are a single path segment:
/// not blank, no `/`, and not `.` or `..`.
pub fn document_id(raw: String) -> Result<String> {
    if raw.trim().is_empty() || raw.contains('/') || raw == "." || raw == ".." {
        return Err(ApiError::BadRequest("Invalid document id".to_string()));
    }
    Ok(raw)
}

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub limit: Option<usize>,
}

impl HistoryParams {
    /// Requested limit, defaulting to 10 and capped at 100
    pub fn limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_HISTORY_LIMIT).min(MAX_HISTORY_LIMIT)
    }
}

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    #[serde(default)]
    pub message: String,
}

impl SendMessageRequest {
    pub fn into_message(self) -> Result<String> {
        if self.message.trim().is_empty() {
            return Err(ApiError::BadRequest("Message is required".to_string()));
        }
        Ok(self.message)
    }
}

/// Body of `POST /api/notes`. `title` and `content` may be empty;
/// `emotion_emoji` may be omitted when `emotion_name` is a known emotion.
#[derive(Debug, Deserialize)]
pub struct CreateNoteRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub emotion_name: String,
    #[serde(default)]
    pub emotion_emoji: String,
}

impl CreateNoteRequest {
    pub fn into_note(self, owner: &str) -> Result<Note> {
        let emotion_name = required(self.emotion_name, "emotion_name")?;
        let emotion_emoji = if self.emotion_emoji.trim().is_empty() {
            find_emotion(&emotion_name)
                .map(|e| e.emoji.to_string())
                .ok_or_else(|| ApiError::BadRequest("emotion_emoji is required".to_string()))?
        } else {
            self.emotion_emoji
        };
        Ok(Note::new(owner, self.title, self.content, emotion_name, emotion_emoji))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePsychologistRequest {
    #[serde(default)]
    pub nombre: String,
    #[serde(default)]
    pub especialidad: String,
    #[serde(default)]
    pub telefono_celular: String,
    #[serde(default)]
    pub telefono_oficina: String,
    #[serde(default)]
    pub correo_electronico: String,
    #[serde(default)]
    pub direccion: String,
    #[serde(default)]
    pub ubicacion_url: String,
    #[serde(default)]
    pub foto_url: String,
}

impl CreatePsychologistRequest {
    pub fn into_psychologist(self) -> Result<Psychologist> {
        Ok(Psychologist {
            id: None,
            nombre: required(self.nombre, "nombre")?,
            especialidad: required(self.especialidad, "especialidad")?,
            telefono_celular: self.telefono_celular,
            telefono_oficina: self.telefono_oficina,
            correo_electronico: required(self.correo_electronico, "correoElectronico")?,
            direccion: self.direccion,
            ubicacion_url: self.ubicacion_url,
            foto_url: self.foto_url,
        })
    }
}
