pub mod firestore;
pub mod firestore_value;
pub mod gemini;
pub mod google_auth;
pub mod http_client;
pub mod identity_toolkit;
pub mod static_identity;
