/// Movie and user identifiers are UUIDs assigned by the caller, never by storage.
pub type DbId = uuid::Uuid;
