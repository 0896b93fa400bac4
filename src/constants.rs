// Centralized magic numbers & default values
pub const DEFAULT_CHUNK_SIZE: usize = 28_000;
pub const DEFAULT_ENCODING: &str = "cl100k_base";
pub const OUTPUT_DIR_TAG: &str = "_LMTC_Output_";
pub const OUTPUT_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
pub const MANIFEST_FILE_NAME: &str = "manifest.json";
pub const MARKER_TAG: &str = "# [TokenCook]";
pub const TREE_HEADING: &str = "=== Directory Tree ===";
pub const LINE_NUMBER_WIDTH: usize = 4;

/// Directory names that are never descended into.
pub const RESERVED_DIR_NAMES: &[&str] = &[".venv", ".git"];
