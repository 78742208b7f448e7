// Helper for generating UUIDv7 (timestamp-sortable UUIDs)
//
// User ids are generated app-side so the Postgres and in-memory credential
// stores hand out identifiers of the same shape.

use uuid::Uuid;

/// Generate a new UUIDv7 (timestamp-sortable).
pub fn uuidv7() -> Uuid {
    Uuid::now_v7()
}
