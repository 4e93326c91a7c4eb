use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row};
use tracing::{debug, info};

use crate::rooms::error::RoomError;
use crate::rooms::types::{HelpRequests, RoomRecord, RoomType};

const ROOM_COLUMNS: &str =
    "room_id, room_title, room_type, subscribed, help_requests_general, created_at, last_access";

/// Durable collection of rooms keyed by the platform room id.
///
/// Every statement runs under one connection lock, and read-modify-write
/// sequences run inside a transaction, so concurrent observations of the
/// same room never create duplicates or lose counter increments.
pub struct RoomRegistry {
    conn: Mutex<Connection>,
}

impl RoomRegistry {
    pub fn new(db_path: &Path) -> Result<Self, RoomError> {
        info!("Opening room registry at {:?}", db_path);

        let conn = Connection::open(db_path)?;

        // Enable WAL mode for better concurrency
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;

        let registry = Self {
            conn: Mutex::new(conn),
        };
        registry.create_schema()?;

        Ok(registry)
    }

    fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>, RoomError> {
        self.conn.lock().map_err(|_| RoomError::LockPoisoned)
    }

    fn create_schema(&self) -> Result<(), RoomError> {
        let conn = self.lock_conn()?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS rooms (
                room_id TEXT PRIMARY KEY NOT NULL,
                room_title TEXT NOT NULL,
                room_type TEXT NOT NULL,
                subscribed INTEGER NOT NULL DEFAULT 1,
                help_requests_general INTEGER NOT NULL DEFAULT 0,
                created_at INTEGER NOT NULL,
                last_access INTEGER NOT NULL
            )
            "#,
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_rooms_subscribed ON rooms(subscribed)",
            [],
        )?;

        debug!("Room registry schema ready");
        Ok(())
    }

    /// Records that an inbound event was seen for a room.
    ///
    /// A new room is inserted subscribed with zeroed counters. A known room
    /// gets its title refreshed, `last_access` touched and its general
    /// counter incremented.
    pub fn upsert_on_observation(
        &self,
        room_id: &str,
        room_title: &str,
        room_type: RoomType,
    ) -> Result<RoomRecord, RoomError> {
        self.upsert_at(room_id, room_title, room_type, Utc::now())
    }

    fn upsert_at(
        &self,
        room_id: &str,
        room_title: &str,
        room_type: RoomType,
        now: DateTime<Utc>,
    ) -> Result<RoomRecord, RoomError> {
        let now_ms = now.timestamp_millis();

        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;

        let existed: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM rooms WHERE room_id = ?1)",
            [room_id],
            |row| row.get(0),
        )?;

        tx.execute(
            r#"
            INSERT INTO rooms (room_id, room_title, room_type, subscribed, help_requests_general, created_at, last_access)
            VALUES (?1, ?2, ?3, 1, 0, ?4, ?4)
            ON CONFLICT(room_id) DO UPDATE SET
                room_title = excluded.room_title,
                last_access = MAX(rooms.last_access, excluded.last_access),
                help_requests_general = rooms.help_requests_general + 1
            "#,
            (room_id, room_title, room_type.as_str(), now_ms),
        )?;

        let record = tx.query_row(
            &format!("SELECT {ROOM_COLUMNS} FROM rooms WHERE room_id = ?1"),
            [room_id],
            row_to_record,
        )?;

        tx.commit()?;

        if existed {
            debug!(
                "Observed room {} ({}), {} requests",
                record.room_title, room_id, record.help_requests.general
            );
        } else {
            info!("Registered new {} room {} ({})", room_type, room_title, room_id);
        }

        Ok(record)
    }

    /// Sets the subscription flag of a known room
    pub fn set_subscribed(&self, room_id: &str, subscribed: bool) -> Result<RoomRecord, RoomError> {
        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;

        let rows_affected = tx.execute(
            "UPDATE rooms SET subscribed = ?1 WHERE room_id = ?2",
            (subscribed, room_id),
        )?;

        if rows_affected == 0 {
            return Err(RoomError::NotFound(room_id.to_string()));
        }

        let record = tx.query_row(
            &format!("SELECT {ROOM_COLUMNS} FROM rooms WHERE room_id = ?1"),
            [room_id],
            row_to_record,
        )?;

        tx.commit()?;

        info!(
            "Room {} is now {}",
            room_id,
            if subscribed { "subscribed" } else { "unsubscribed" }
        );
        Ok(record)
    }

    /// Returns every room that should receive update notifications
    pub fn list_subscribed(&self) -> Result<Vec<RoomRecord>, RoomError> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {ROOM_COLUMNS} FROM rooms WHERE subscribed = 1"
        ))?;

        let rooms = stmt
            .query_map([], row_to_record)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rooms)
    }

    pub fn get(&self, room_id: &str) -> Result<Option<RoomRecord>, RoomError> {
        let conn = self.lock_conn()?;
        let record = conn
            .query_row(
                &format!("SELECT {ROOM_COLUMNS} FROM rooms WHERE room_id = ?1"),
                [room_id],
                row_to_record,
            )
            .optional()?;

        Ok(record)
    }
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<RoomRecord> {
    let room_type: String = row.get(2)?;
    let room_type = room_type
        .parse::<RoomType>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))?;

    Ok(RoomRecord {
        room_id: row.get(0)?,
        room_title: row.get(1)?,
        room_type,
        subscribed: row.get(3)?,
        help_requests: HelpRequests {
            general: row.get::<_, i64>(4)? as u64,
        },
        created_at: timestamp_column(row, 5)?,
        last_access: timestamp_column(row, 6)?,
    })
}

fn timestamp_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let millis: i64 = row.get(idx)?;
    DateTime::from_timestamp_millis(millis).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Integer,
            format!("timestamp out of range: {millis}").into(),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn create_test_registry() -> (TempDir, RoomRegistry) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("rooms.db");
        let registry = RoomRegistry::new(&db_path).unwrap();
        (temp_dir, registry)
    }

    #[test]
    fn upsert_on_observation_creates_subscribed_room_with_zeroed_counter() {
        let (_temp_dir, registry) = create_test_registry();

        let record = registry
            .upsert_on_observation("room-1", "Release Watchers", RoomType::Group)
            .unwrap();

        assert_eq!(record.room_id, "room-1");
        assert_eq!(record.room_title, "Release Watchers");
        assert_eq!(record.room_type, RoomType::Group);
        assert!(record.subscribed);
        assert_eq!(record.help_requests.general, 0);
        assert_eq!(record.created_at, record.last_access);
    }

    #[test]
    fn upsert_on_observation_twice_increments_counter_and_keeps_one_record() {
        let (_temp_dir, registry) = create_test_registry();

        registry
            .upsert_on_observation("room-1", "Old title", RoomType::Direct)
            .unwrap();
        registry
            .upsert_on_observation("room-1", "Old title", RoomType::Direct)
            .unwrap();
        let record = registry
            .upsert_on_observation("room-1", "New title", RoomType::Direct)
            .unwrap();

        assert_eq!(record.help_requests.general, 2);
        assert_eq!(record.room_title, "New title");
        assert_eq!(registry.list_subscribed().unwrap().len(), 1);
    }

    #[test]
    fn upsert_keeps_created_at_and_never_moves_last_access_backwards() {
        let (_temp_dir, registry) = create_test_registry();
        let start = DateTime::from_timestamp_millis(1_700_000_000_000).unwrap();

        let created = registry
            .upsert_at("room-1", "Room", RoomType::Group, start)
            .unwrap();
        let later = registry
            .upsert_at("room-1", "Room", RoomType::Group, start + Duration::seconds(30))
            .unwrap();
        let stale = registry
            .upsert_at("room-1", "Room", RoomType::Group, start + Duration::seconds(10))
            .unwrap();

        assert_eq!(later.created_at, created.created_at);
        assert_eq!(later.last_access, start + Duration::seconds(30));
        assert_eq!(stale.last_access, start + Duration::seconds(30));
        assert_eq!(stale.help_requests.general, 2);
    }

    #[test]
    fn upsert_does_not_resubscribe_existing_room() {
        let (_temp_dir, registry) = create_test_registry();

        registry
            .upsert_on_observation("room-1", "Room", RoomType::Group)
            .unwrap();
        registry.set_subscribed("room-1", false).unwrap();
        let record = registry
            .upsert_on_observation("room-1", "Room", RoomType::Group)
            .unwrap();

        assert!(!record.subscribed);
    }

    #[test]
    fn set_subscribed_toggles_flag() {
        let (_temp_dir, registry) = create_test_registry();
        registry
            .upsert_on_observation("room-1", "Room", RoomType::Group)
            .unwrap();

        let unsubscribed = registry.set_subscribed("room-1", false).unwrap();
        assert!(!unsubscribed.subscribed);

        let subscribed = registry.set_subscribed("room-1", true).unwrap();
        assert!(subscribed.subscribed);
    }

    #[test]
    fn set_subscribed_returns_not_found_for_unknown_room() {
        let (_temp_dir, registry) = create_test_registry();

        let result = registry.set_subscribed("missing", false);

        assert!(matches!(result, Err(RoomError::NotFound(id)) if id == "missing"));
        assert!(registry.get("missing").unwrap().is_none());
    }

    #[test]
    fn list_subscribed_excludes_unsubscribed_rooms() {
        let (_temp_dir, registry) = create_test_registry();
        for room_id in ["room-1", "room-2", "room-3"] {
            registry
                .upsert_on_observation(room_id, room_id, RoomType::Group)
                .unwrap();
        }
        registry.set_subscribed("room-2", false).unwrap();

        let mut subscribed: Vec<_> = registry
            .list_subscribed()
            .unwrap()
            .into_iter()
            .map(|r| r.room_id)
            .collect();
        subscribed.sort();

        assert_eq!(subscribed, vec!["room-1", "room-3"]);
    }

    #[test]
    fn get_returns_none_for_unknown_room() {
        let (_temp_dir, registry) = create_test_registry();

        assert_eq!(registry.get("missing").unwrap(), None);
    }

    #[test]
    fn registry_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("rooms.db");

        {
            let registry = RoomRegistry::new(&db_path).unwrap();
            registry
                .upsert_on_observation("room-1", "Room", RoomType::Direct)
                .unwrap();
            registry.set_subscribed("room-1", false).unwrap();
        }

        let reopened = RoomRegistry::new(&db_path).unwrap();
        let record = reopened.get("room-1").unwrap().unwrap();
        assert_eq!(record.room_type, RoomType::Direct);
        assert!(!record.subscribed);
    }

    #[test]
    fn concurrent_observations_of_same_room_lose_no_increments() {
        let (_temp_dir, registry) = create_test_registry();
        let registry = Arc::new(registry);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = registry.clone();
                std::thread::spawn(move || {
                    for _ in 0..10 {
                        registry
                            .upsert_on_observation("room-1", "Room", RoomType::Group)
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let record = registry.get("room-1").unwrap().unwrap();
        // 80 observations: the first inserts, the other 79 increment
        assert_eq!(record.help_requests.general, 79);
        assert_eq!(registry.list_subscribed().unwrap().len(), 1);
    }
}
