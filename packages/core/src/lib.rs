// ABOUTME: Core types, validation and utilities for Sentinel
// ABOUTME: Foundational package shared by every storage package

pub mod constants;
pub mod utils;
pub mod validation;

// Re-export constants
pub use constants::{database_file, sentinel_dir, DATABASE_FILE_NAME};

// Re-export utilities
pub use utils::{format_timestamp, generate_id, now, parse_timestamp, truncate_to_micros};

// Re-export validation
pub use validation::{
    require_document, require_non_empty, require_storable_timestamp, ValidationError,
};
