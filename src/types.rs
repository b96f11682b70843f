use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A fixed mood a note can be tagged with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Emotion {
    pub name: &'static str,
    pub emoji: &'static str,
}

/// Motivational tip shown on the tips screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Tip {
    pub texto: &'static str,
    pub imagen: &'static str,
}

/// Diary entry. `email` is the owner identifier; `id` and `timestamp` are
/// assigned by the store when the note is written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: Option<String>,
    pub email: String,
    pub title: String,
    pub content: String,
    pub emotion_name: String,
    pub emotion_emoji: String,
    pub timestamp: Option<DateTime<Utc>>,
}

impl Note {
    pub fn new(
        email: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
        emotion_name: impl Into<String>,
        emotion_emoji: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            email: email.into(),
            title: title.into(),
            content: content.into(),
            emotion_name: emotion_name.into(),
            emotion_emoji: emotion_emoji.into(),
            timestamp: None,
        }
    }
}

/// One turn of a user's conversation with the assistant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub user_id: String,
    pub text: String,
    pub is_user_message: bool,
    pub timestamp: Option<DateTime<Utc>>,
}

impl ChatMessage {
    pub fn from_user(user_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            text: text.into(),
            is_user_message: true,
            timestamp: None,
        }
    }

    pub fn from_assistant(user_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            is_user_message: false,
            ..Self::from_user(user_id, text)
        }
    }
}

/// Psychologist directory entry. Field names on the wire are camelCase.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Psychologist {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub nombre: String,
    pub especialidad: String,
    pub telefono_celular: String,
    pub telefono_oficina: String,
    pub correo_electronico: String,
    pub direccion: String,
    pub ubicacion_url: String,
    pub foto_url: String,
}

/// Caller identity as returned by the identity provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claims {
    pub uid: String,
    pub email: Option<String>,
    pub name: Option<String>,
}

impl Claims {
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(crate::constants::DEFAULT_USER_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn psychologist_serializes_camel_case() {
        let p = Psychologist {
            id: Some("abc".into()),
            nombre: "Ana".into(),
            telefono_celular: "555".into(),
            correo_electronico: "ana@example.com".into(),
            ..Default::default()
        };
        let v = serde_json::to_value(&p).unwrap();
        assert_eq!(v["id"], json!("abc"));
        assert_eq!(v["telefonoCelular"], json!("555"));
        assert_eq!(v["correoElectronico"], json!("ana@example.com"));
        assert_eq!(v["ubicacionUrl"], json!(""));
    }

    #[test]
    fn assistant_message_is_not_user_message() {
        let m = ChatMessage::from_assistant("u1", "hola");
        assert!(!m.is_user_message);
        assert_eq!(m.user_id, "u1");
    }

    #[test]
    fn display_name_falls_back_when_missing() {
        let c = Claims { uid: "u".into(), email: None, name: Some(String::new()) };
        assert_eq!(c.display_name(), "Usuario");
    }
}
