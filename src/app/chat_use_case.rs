use std::sync::Arc;

use tracing::{error, info};

use crate::app::ports::TextGenerator;
use crate::constants::{ASSISTANT_NAME, CHAT_CONTEXT_MESSAGES};
use crate::error::{ApiError, Result};
use crate::metrics::{record, MetricName};
use crate::storage::Storage;
use crate::types::{ChatMessage, Claims};

/// Assemble the prompt sent to the model.
///
/// `context` must be in chronological order and normally already contains
/// the new message, since it is persisted before the context is read.
pub fn build_prompt(user_name: &str, context: &[ChatMessage], new_message: &str) -> String {
    let mut prompt = format!(
        "Mi nombre es {ASSISTANT_NAME}, un asistente psicológico virtual. Estoy hablando con {user_name}. "
    );
    for msg in context {
        let sender = if msg.is_user_message { user_name } else { ASSISTANT_NAME };
        prompt.push_str(&format!("{sender}: {}. ", msg.text));
    }
    prompt.push_str(&format!("Responde al último mensaje: {new_message}"));
    prompt
}

/// Chat history for display: the newest `limit` messages, oldest first
pub async fn history(storage: &dyn Storage, user_id: &str, limit: usize) -> Result<Vec<ChatMessage>> {
    let mut messages = storage.recent_chat_messages(user_id, limit).await?;
    messages.reverse();
    Ok(messages)
}

/// Use case for one round trip with the assistant
pub struct ChatUseCase {
    storage: Arc<dyn Storage>,
    generator: Arc<dyn TextGenerator>,
}

impl ChatUseCase {
    pub fn new(storage: Arc<dyn Storage>, generator: Arc<dyn TextGenerator>) -> Self {
        Self { storage, generator }
    }

    /// Persist the user's message, ask the model, persist and return the reply.
    ///
    /// The user message stays stored when generation fails; nothing is rolled back.
    pub async fn send(&self, claims: &Claims, text: &str) -> Result<String> {
        let user_name = claims.display_name();

        let mut user_msg = ChatMessage::from_user(&claims.uid, text);
        self.storage.create_chat_message(&mut user_msg).await?;

        let context = history(self.storage.as_ref(), &claims.uid, CHAT_CONTEXT_MESSAGES).await?;
        let prompt = build_prompt(user_name, &context, text);

        info!(user = %user_name, context_len = context.len(), "Generating response");
        match self.reply(&claims.uid, &prompt).await {
            Ok(reply) => {
                record(MetricName::ChatGenerationsSucceeded);
                info!("Response generated successfully");
                Ok(reply)
            }
            Err(e) => {
                error!(error = %e, "Error generating response");
                record(MetricName::ChatGenerationsFailed);
                Err(match e {
                    ApiError::Generation(_) => e,
                    other => ApiError::Generation(other.to_string()),
                })
            }
        }
    }

    /// Generate the reply and store it; a failure in either step is a generation failure
    async fn reply(&self, user_id: &str, prompt: &str) -> Result<String> {
        let reply = self.generator.generate(prompt).await?;
        let mut ai_msg = ChatMessage::from_assistant(user_id, &reply);
        self.storage.create_chat_message(&mut ai_msg).await?;
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryStorage;
    use crate::types::{Note, Psychologist};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Accepts user messages but refuses to store assistant replies
    #[derive(Default)]
    struct RejectsReplies {
        inner: InMemoryStorage,
    }

    #[async_trait]
    impl Storage for RejectsReplies {
        async fn create_note(&self, note: &mut Note) -> Result<()> {
            self.inner.create_note(note).await
        }
        async fn list_notes_by_owner(&self, owner: &str) -> Result<Vec<Note>> {
            self.inner.list_notes_by_owner(owner).await
        }
        async fn get_note(&self, id: &str) -> Result<Option<Note>> {
            self.inner.get_note(id).await
        }
        async fn delete_note(&self, id: &str) -> Result<()> {
            self.inner.delete_note(id).await
        }
        async fn create_chat_message(&self, message: &mut ChatMessage) -> Result<()> {
            if !message.is_user_message {
                return Err(ApiError::Store("403 - PERMISSION_DENIED".to_string()));
            }
            self.inner.create_chat_message(message).await
        }
        async fn recent_chat_messages(&self, user_id: &str, limit: usize) -> Result<Vec<ChatMessage>> {
            self.inner.recent_chat_messages(user_id, limit).await
        }
        async fn clear_chat_messages(&self, user_id: &str) -> Result<usize> {
            self.inner.clear_chat_messages(user_id).await
        }
        async fn list_psychologists(&self) -> Result<Vec<Psychologist>> {
            self.inner.list_psychologists().await
        }
        async fn create_psychologist(&self, psychologist: &mut Psychologist) -> Result<()> {
            self.inner.create_psychologist(psychologist).await
        }
        async fn delete_psychologist(&self, id: &str) -> Result<()> {
            self.inner.delete_psychologist(id).await
        }
    }

    struct Recording {
        prompts: Mutex<Vec<String>>,
        reply: Option<String>,
    }

    #[async_trait]
    impl TextGenerator for Recording {
        async fn generate(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply
                .clone()
                .ok_or_else(|| ApiError::Config("model overloaded".to_string()))
        }
    }

    fn claims() -> Claims {
        Claims { uid: "u1".into(), email: Some("ana@example.com".into()), name: Some("Ana".into()) }
    }

    #[test]
    fn prompt_labels_senders_in_order() {
        let ctx = vec![
            ChatMessage::from_user("u1", "Hola"),
            ChatMessage::from_assistant("u1", "Hola Ana"),
            ChatMessage::from_user("u1", "Estoy cansada"),
        ];
        let prompt = build_prompt("Ana", &ctx, "Estoy cansada");
        assert_eq!(
            prompt,
            "Mi nombre es Zenith, un asistente psicológico virtual. Estoy hablando con Ana. \
             Ana: Hola. Zenith: Hola Ana. Ana: Estoy cansada. \
             Responde al último mensaje: Estoy cansada"
        );
    }

    #[tokio::test]
    async fn send_stores_both_turns_on_success() {
        let storage = Arc::new(InMemoryStorage::new());
        let generator = Arc::new(Recording { prompts: Mutex::new(vec![]), reply: Some("Respira".into()) });
        let chat = ChatUseCase::new(storage.clone(), generator.clone());

        let reply = chat.send(&claims(), "Tengo ansiedad").await.unwrap();

        assert_eq!(reply, "Respira");
        let hist = history(storage.as_ref(), "u1", 10).await.unwrap();
        assert_eq!(hist.len(), 2);
        assert!(hist[0].is_user_message);
        assert_eq!(hist[1].text, "Respira");
        let prompts = generator.prompts.lock().unwrap();
        assert!(prompts[0].ends_with("Ana: Tengo ansiedad. Responde al último mensaje: Tengo ansiedad"));
    }

    #[tokio::test]
    async fn send_keeps_user_message_when_generation_fails() {
        let storage = Arc::new(InMemoryStorage::new());
        let generator = Arc::new(Recording { prompts: Mutex::new(vec![]), reply: None });
        let chat = ChatUseCase::new(storage.clone(), generator);

        let err = chat.send(&claims(), "Hola").await.unwrap_err();

        assert!(matches!(err, ApiError::Generation(_)));
        assert_eq!(storage.chat_message_count("u1"), 1);
    }

    #[tokio::test]
    async fn failing_to_store_the_reply_reads_as_generation_error() {
        let storage = Arc::new(RejectsReplies::default());
        let generator = Arc::new(Recording { prompts: Mutex::new(vec![]), reply: Some("Respira".into()) });
        let chat = ChatUseCase::new(storage.clone(), generator);

        let err = chat.send(&claims(), "Hola").await.unwrap_err();

        assert_eq!(
            err.to_string(),
            "Error al generar respuesta: Store operation failed: 403 - PERMISSION_DENIED"
        );
        assert_eq!(storage.inner.chat_message_count("u1"), 1);
    }

    #[tokio::test]
    async fn context_is_capped_at_five_messages() {
        let storage = Arc::new(InMemoryStorage::new());
        for i in 0..8 {
            let mut m = ChatMessage::from_user("u1", format!("old{i}"));
            storage.create_chat_message(&mut m).await.unwrap();
        }
        let generator = Arc::new(Recording { prompts: Mutex::new(vec![]), reply: Some("ok".into()) });
        let chat = ChatUseCase::new(storage, generator.clone());

        chat.send(&claims(), "nuevo").await.unwrap();

        let prompt = generator.prompts.lock().unwrap()[0].clone();
        assert!(!prompt.contains("old3"));
        assert!(prompt.contains("Ana: old4. Ana: old5. Ana: old6. Ana: old7. Ana: nuevo."));
    }
}
