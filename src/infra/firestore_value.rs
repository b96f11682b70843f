//! Mapping between domain records and Firestore REST documents.
//!
//! Firestore wraps every field in a typed value object such as
//! `{"stringValue": "..."}`. Missing or differently typed fields decode to
//! defaults so older documents still load.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::types::{ChatMessage, Note, Psychologist};

pub type Fields = Map<String, Value>;

/// A document as returned by the REST API
#[derive(Debug, Clone, Deserialize)]
pub struct Document {
    pub name: String,
    #[serde(default)]
    pub fields: Fields,
}

impl Document {
    /// Last path segment of the resource name
    pub fn id(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or_default()
    }
}

pub fn string_value(s: &str) -> Value {
    json!({ "stringValue": s })
}

pub fn boolean_value(b: bool) -> Value {
    json!({ "booleanValue": b })
}

pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw).ok().map(|t| t.with_timezone(&Utc))
}

fn get_string(fields: &Fields, name: &str) -> String {
    fields
        .get(name)
        .and_then(|v| v.get("stringValue"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn get_bool(fields: &Fields, name: &str) -> bool {
    fields
        .get(name)
        .and_then(|v| v.get("booleanValue"))
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

fn get_timestamp(fields: &Fields, name: &str) -> Option<DateTime<Utc>> {
    fields
        .get(name)
        .and_then(|v| v.get("timestampValue"))
        .and_then(Value::as_str)
        .and_then(parse_timestamp)
}

/// Note fields without `timestamp`, which the server fills in
pub fn note_fields(note: &Note) -> Fields {
    let mut f = Fields::new();
    f.insert("email".into(), string_value(&note.email));
    f.insert("title".into(), string_value(&note.title));
    f.insert("content".into(), string_value(&note.content));
    f.insert("emotion_name".into(), string_value(&note.emotion_name));
    f.insert("emotion_emoji".into(), string_value(&note.emotion_emoji));
    f
}

pub fn note_from_document(doc: &Document) -> Note {
    let f = &doc.fields;
    Note {
        id: Some(doc.id().to_string()),
        email: get_string(f, "email"),
        title: get_string(f, "title"),
        content: get_string(f, "content"),
        emotion_name: get_string(f, "emotion_name"),
        emotion_emoji: get_string(f, "emotion_emoji"),
        timestamp: get_timestamp(f, "timestamp"),
    }
}

pub fn chat_message_fields(message: &ChatMessage) -> Fields {
    let mut f = Fields::new();
    f.insert("user_id".into(), string_value(&message.user_id));
    f.insert("text".into(), string_value(&message.text));
    f.insert("is_user_message".into(), boolean_value(message.is_user_message));
    f
}

pub fn chat_message_from_document(doc: &Document) -> ChatMessage {
    let f = &doc.fields;
    ChatMessage {
        user_id: get_string(f, "user_id"),
        text: get_string(f, "text"),
        is_user_message: get_bool(f, "is_user_message"),
        timestamp: get_timestamp(f, "timestamp"),
    }
}

pub fn psychologist_fields(p: &Psychologist) -> Fields {
    let mut f = Fields::new();
    f.insert("nombre".into(), string_value(&p.nombre));
    f.insert("especialidad".into(), string_value(&p.especialidad));
    f.insert("telefonoCelular".into(), string_value(&p.telefono_celular));
    f.insert("telefonoOficina".into(), string_value(&p.telefono_oficina));
    f.insert("correoElectronico".into(), string_value(&p.correo_electronico));
    f.insert("direccion".into(), string_value(&p.direccion));
    f.insert("ubicacionUrl".into(), string_value(&p.ubicacion_url));
    f.insert("fotoUrl".into(), string_value(&p.foto_url));
    f
}

pub fn psychologist_from_document(doc: &Document) -> Psychologist {
    let f = &doc.fields;
    Psychologist {
        id: Some(doc.id().to_string()),
        nombre: get_string(f, "nombre"),
        especialidad: get_string(f, "especialidad"),
        telefono_celular: get_string(f, "telefonoCelular"),
        telefono_oficina: get_string(f, "telefonoOficina"),
        correo_electronico: get_string(f, "correoElectronico"),
        direccion: get_string(f, "direccion"),
        ubicacion_url: get_string(f, "ubicacionUrl"),
        foto_url: get_string(f, "fotoUrl"),
    }
}
