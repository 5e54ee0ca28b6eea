pub mod query;
pub mod room_finding;
