pub mod logger;

pub use logger::{init_file_logger, safe_preview, shutdown_file_logger};
