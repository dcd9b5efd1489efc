pub mod analyze;
pub mod config;
pub mod delete;
pub mod edit;
pub mod events;
pub mod fields;
pub mod month;
