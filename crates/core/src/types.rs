/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Try-On sessions are keyed by random UUIDs handed to the browser.
pub type SessionId = uuid::Uuid;
