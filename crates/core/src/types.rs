/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Optimistic-concurrency counter carried by every call sheet row.
///
/// Starts at 1 on creation and increments by one on every write.
pub type Version = i32;

/// Version assigned to a freshly created call sheet.
pub const INITIAL_VERSION: Version = 1;
