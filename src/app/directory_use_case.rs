use tracing::{info, warn};

use crate::error::Result;
use crate::metrics::{record, MetricName};
use crate::storage::Storage;
use crate::types::{Claims, Psychologist};

/// Who may create or delete psychologist directory entries.
///
/// Only `AnyAuthenticated` exists: the directory is shared data, yet any
/// signed-in user can change it. Each mutation is logged at warn level and
/// counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryWriteAccess {
    AnyAuthenticated,
}

impl DirectoryWriteAccess {
    pub const CURRENT: DirectoryWriteAccess = DirectoryWriteAccess::AnyAuthenticated;

    fn audit(self, claims: &Claims, action: &str) {
        warn!(
            gap = "directory_write_any_authenticated",
            uid = %claims.uid,
            action,
            "Directory mutated without an ownership or role check"
        );
        record(MetricName::DirectoryMutations);
    }
}

pub async fn list(storage: &dyn Storage) -> Result<Vec<Psychologist>> {
    info!("Getting psychologists list");
    let entries = storage.list_psychologists().await?;
    info!(count = entries.len(), "Found psychologists");
    Ok(entries)
}

pub async fn create(storage: &dyn Storage, claims: &Claims, entry: &mut Psychologist) -> Result<String> {
    DirectoryWriteAccess::CURRENT.audit(claims, "create");
    info!(nombre = %entry.nombre, "Creating psychologist");
    storage.create_psychologist(entry).await?;
    let id = entry.id.clone().unwrap_or_default();
    info!(id = %id, "Psychologist created");
    Ok(id)
}

pub async fn delete(storage: &dyn Storage, claims: &Claims, id: &str) -> Result<()> {
    DirectoryWriteAccess::CURRENT.audit(claims, "delete");
    storage.delete_psychologist(id).await?;
    info!(id = %id, "Psychologist deleted");
    Ok(())
}
