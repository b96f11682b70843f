/// Collection names shared by every storage backend
pub const NOTES_COLLECTION: &str = "notas";
pub const CONVERSATIONS_COLLECTION: &str = "conversaciones";
pub const MESSAGES_SUBCOLLECTION: &str = "mensajes";
pub const PSYCHOLOGISTS_COLLECTION: &str = "psicologos";

/// Name the assistant speaks as, both in the prompt and in the sender labels
pub const ASSISTANT_NAME: &str = "Zenith";

/// Display name used when the identity provider returns no name claim
pub const DEFAULT_USER_NAME: &str = "Usuario";

/// Number of stored messages folded into each chat prompt
pub const CHAT_CONTEXT_MESSAGES: usize = 5;

pub const DEFAULT_HISTORY_LIMIT: usize = 10;
pub const MAX_HISTORY_LIMIT: usize = 100;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";
pub const DEFAULT_SECRET_KEY: &str = "dev-secret-key-change-in-production";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

// Upstream endpoints; adapters accept overrides so tests can point them at a mock server.
pub const IDENTITY_TOOLKIT_URL: &str = "https://identitytoolkit.googleapis.com";
pub const FIRESTORE_URL: &str = "https://firestore.googleapis.com";
pub const GEMINI_URL: &str = "https://generativelanguage.googleapis.com";
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const DATASTORE_SCOPE: &str = "https://www.googleapis.com/auth/datastore";
pub const METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";
