//! Default values for configuration fields.
//!
//! These functions are used by serde for default deserialization.

// ============================================================================
// Common Defaults
// ============================================================================

pub fn r#true() -> bool {
    true
}

// ============================================================================
// [base] Section Defaults
// ============================================================================

pub mod base {
    pub fn title() -> String {
        "Notes".into()
    }

    pub fn language() -> String {
        "en".into()
    }
}

// ============================================================================
// [build] Section Defaults
// ============================================================================

pub mod build {
    use std::path::PathBuf;

    pub fn root() -> Option<PathBuf> {
        None
    }

    pub fn content() -> PathBuf {
        "md".into()
    }

    pub fn output() -> PathBuf {
        "web".into()
    }

    pub fn images() -> PathBuf {
        "images".into()
    }

    pub fn index() -> String {
        "preview.html".into()
    }
}

// ============================================================================
// [serve] Section Defaults
// ============================================================================

pub mod serve {
    pub fn interface() -> String {
        "127.0.0.1".into()
    }

    pub fn port() -> u16 {
        5000
    }
}

// ============================================================================
// [watch] Section Defaults
// ============================================================================

pub mod watch {
    pub fn debounce_ms() -> u64 {
        250
    }

    pub fn command() -> Vec<String> {
        Vec::new()
    }
}

// ============================================================================
// [log] Section Defaults
// ============================================================================

pub mod log {
    use std::path::PathBuf;

    pub fn dir() -> PathBuf {
        "logs".into()
    }

    pub fn max_size() -> String {
        "1MB".into()
    }

    pub fn backups() -> usize {
        3
    }
}
