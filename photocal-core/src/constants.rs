/// Name of the durable slot holding the saved event collection.
pub const STORAGE_KEY: &str = "photocal-events";

/// Placeholder title when the photo yields none.
pub const UNTITLED_EVENT: &str = "Untitled Event";

/// Placeholder context when the photo yields none.
pub const DEFAULT_CONTEXT: &str = "Event location";

pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

pub const MAX_OUTPUT_TOKENS: u32 = 500;
pub const TEMPERATURE: f32 = 0.1;
