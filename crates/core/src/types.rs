/// Tenant primary keys are PostgreSQL-generated UUIDs.
pub type TenantId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
