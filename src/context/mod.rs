pub mod aggregate;
pub mod chunker;
pub mod extract;
pub mod manifest;
pub mod scanner;
pub mod types;
