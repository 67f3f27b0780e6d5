pub mod content;
pub mod try_on;
