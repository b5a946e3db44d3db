pub mod reviews;
pub mod runs;
pub mod tools;
pub mod utils;
