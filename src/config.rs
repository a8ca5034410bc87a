use std::env;

/// Runtime configuration, resolved from the environment.
///
/// File paths are explicit configuration rather than process-wide
/// constants; `main` maps CLI flags onto these variables before calling
/// `from_env`.
#[derive(Clone)]
pub struct Config {
    pub input_file: String,
    pub output_file: String,
    pub error_log: String,
    pub checkpoint_every: usize,
    pub lookup_base_url: Option<String>,
    /// Overrides the per-mode default error policy when set.
    pub keep_invalid: Option<bool>,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            input_file: env::var("INPUT_FILE").unwrap_or_else(|_| "books.csv".to_string()),
            output_file: env::var("OUTPUT_FILE").unwrap_or_else(|_| "books_clean.csv".to_string()),
            error_log: env::var("ERROR_LOG").unwrap_or_else(|_| "isbn_errors.txt".to_string()),
            checkpoint_every: env::var("CHECKPOINT_EVERY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(25),
            lookup_base_url: env::var("LOOKUP_BASE_URL").ok(),
            keep_invalid: env::var("KEEP_INVALID")
                .ok()
                .map(|v| v == "true" || v == "1"),
        }
    }
}
