use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::error::Result;
use crate::metrics::{record, MetricName};
use crate::storage::Storage;
use crate::types::Note;

/// Order notes newest first. Equal (or missing) timestamps fall back to id
/// ascending so the listing is stable regardless of store iteration order.
pub fn sort_notes(notes: &mut [Note]) {
    notes.sort_by(|a, b| {
        b.timestamp
            .cmp(&a.timestamp)
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Map each calendar day (UTC, `YYYY-MM-DD`) to the emoji of that day's
/// latest note. Equal timestamps resolve to the greatest id. Notes without
/// a timestamp or emoji are ignored.
pub fn emotions_by_day(notes: &[Note]) -> BTreeMap<String, String> {
    let mut latest: BTreeMap<String, (DateTime<Utc>, Option<&str>, &str)> = BTreeMap::new();

    for note in notes {
        let Some(ts) = note.timestamp else { continue };
        if note.emotion_emoji.is_empty() {
            continue;
        }
        let candidate = (ts, note.id.as_deref(), note.emotion_emoji.as_str());
        let day = ts.format("%Y-%m-%d").to_string();
        let newer = latest
            .get(&day)
            .map_or(true, |current| (current.0, current.1) < (candidate.0, candidate.1));
        if newer {
            latest.insert(day, candidate);
        }
    }

    latest
        .into_iter()
        .map(|(day, (_, _, emoji))| (day, emoji.to_string()))
        .collect()
}

/// Create a note for `note.email`, returning its new id
pub async fn create_note(storage: &dyn Storage, note: &mut Note) -> Result<String> {
    info!(title = %note.title, emotion = %note.emotion_emoji, "Creating note");
    storage.create_note(note).await?;
    let id = note.id.clone().unwrap_or_default();
    record(MetricName::NotesCreated);
    info!(id = %id, "Note created");
    Ok(id)
}

/// The owner's notes, newest first
pub async fn list_notes(storage: &dyn Storage, owner: &str) -> Result<Vec<Note>> {
    let mut notes = storage.list_notes_by_owner(owner).await?;
    sort_notes(&mut notes);
    info!(count = notes.len(), "Found notes");
    Ok(notes)
}

pub async fn calendar(storage: &dyn Storage, owner: &str) -> Result<BTreeMap<String, String>> {
    let notes = storage.list_notes_by_owner(owner).await?;
    Ok(emotions_by_day(&notes))
}

/// Delete a note if it belongs to `owner`. Notes owned by someone else are
/// treated like missing ones: nothing happens and no error is reported.
pub async fn delete_note(storage: &dyn Storage, id: &str, owner: &str) -> Result<()> {
    match storage.get_note(id).await? {
        Some(note) if note.email == owner => storage.delete_note(id).await,
        Some(_) => {
            debug!(id = %id, "Ignoring delete of a note owned by another user");
            Ok(())
        }
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryStorage;
    use chrono::TimeZone;

    fn note(id: &str, ts: Option<DateTime<Utc>>, emoji: &str) -> Note {
        let mut n = Note::new("a@example.com", id, "", "x", emoji);
        n.id = Some(id.to_string());
        n.timestamp = ts;
        n
    }

    fn at(d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, d, h, 0, 0).unwrap()
    }

    #[test]
    fn notes_sort_newest_first_then_by_id() {
        let mut notes = vec![
            note("b", Some(at(1, 9)), "😊"),
            note("c", None, "😊"),
            note("a", Some(at(1, 9)), "😊"),
            note("d", Some(at(2, 9)), "😊"),
        ];
        sort_notes(&mut notes);
        let ids: Vec<_> = notes.iter().map(|n| n.id.clone().unwrap()).collect();
        assert_eq!(ids, vec!["d", "a", "b", "c"]);
    }

    #[test]
    fn latest_note_of_the_day_wins() {
        let notes = vec![
            note("1", Some(at(1, 20)), "😢"),
            note("2", Some(at(1, 8)), "😊"),
            note("3", Some(at(2, 12)), "😴"),
        ];
        let map = emotions_by_day(&notes);
        assert_eq!(map.len(), 2);
        assert_eq!(map["2025-03-01"], "😢");
        assert_eq!(map["2025-03-02"], "😴");
    }

    #[test]
    fn same_instant_resolves_to_greatest_id_in_any_order() {
        let forward = vec![note("a", Some(at(5, 10)), "😠"), note("b", Some(at(5, 10)), "🙏")];
        let backward: Vec<_> = forward.iter().rev().cloned().collect();
        assert_eq!(emotions_by_day(&forward)["2025-03-05"], "🙏");
        assert_eq!(emotions_by_day(&backward)["2025-03-05"], "🙏");
    }

    #[test]
    fn notes_without_timestamp_or_emoji_are_skipped() {
        let notes = vec![note("a", None, "😊"), note("b", Some(at(3, 1)), "")];
        assert!(emotions_by_day(&notes).is_empty());
    }

    #[tokio::test]
    async fn delete_ignores_notes_of_other_owners() {
        let store = InMemoryStorage::new();
        let mut mine = Note::new("a@example.com", "t", "c", "Feliz", "😊");
        store.create_note(&mut mine).await.unwrap();
        let id = mine.id.clone().unwrap();

        delete_note(&store, &id, "b@example.com").await.unwrap();
        assert_eq!(store.note_count(), 1);

        delete_note(&store, &id, "a@example.com").await.unwrap();
        assert_eq!(store.note_count(), 0);
    }
}
