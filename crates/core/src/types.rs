/// Registration ids are store-assigned UUIDs, opaque to callers.
pub type DocId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
