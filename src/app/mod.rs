pub mod chat_use_case;
pub mod directory_use_case;
pub mod journal_use_case;
pub mod ports;
