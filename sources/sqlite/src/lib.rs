pub mod provision;
pub mod sqlite_source;
