//! Config file rendering
//!
//! `to_toml` produces the commented template written by `ensure_config_exists`
//! and `config --reset`; `save` writes it to the config path.

use super::Config;

impl Config {
    /// Render as a commented TOML file that `FileConfig` parses back
    pub fn to_toml(&self) -> String {
        format!(
            r#"# newswatch configuration

# Backend REST base URL (env: NEWSWATCH_API_URL)
api_url = "{api_url}"

# Live results WebSocket (env: NEWSWATCH_WS_URL)
ws_url = "{ws_url}"

# Where the session token and live feed are stored (env: NEWSWATCH_DATA_DIR)
data_dir = "{data_dir}"

# Theme: Dark, Light, Monochrome, High Contrast (press 't' in the TUI to cycle)
theme = "{theme}"

[http]
timeout_secs = {timeout_secs}

# Live results feed
[feed]
capacity = {capacity}
reconnect_base_ms = {base_ms}
reconnect_max_ms = {max_ms}
max_attempts = {max_attempts}  # 0 = retry forever

# Logging configuration (RUST_LOG env var overrides)
[logging]
level = "{log_level}"
# File logging (JSON, in addition to TUI buffer or stderr)
file_enabled = {log_file_enabled}
file_dir = "{log_file_dir}"
file_rotation = "{log_file_rotation}"  # hourly, daily, never
file_prefix = "{log_file_prefix}"
"#,
            api_url = self.api_url,
            ws_url = self.ws_url,
            data_dir = escape_path(&self.data_dir),
            theme = self.theme,
            timeout_secs = self.http.timeout_secs,
            capacity = self.feed.capacity,
            base_ms = self.feed.reconnect_base_ms,
            max_ms = self.feed.reconnect_max_ms,
            max_attempts = self.feed.max_attempts,
            log_level = self.logging.level,
            log_file_enabled = self.logging.file_enabled,
            log_file_dir = escape_path(&self.logging.file_dir),
            log_file_rotation = self.logging.file_rotation.as_str(),
            log_file_prefix = self.logging.file_prefix,
        )
    }

    /// Write to `Config::config_path()`, creating the directory
    pub fn save(&self) -> Result<(), std::io::Error> {
        let Some(path) = Self::config_path() else {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not determine config path",
            ));
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&path, self.to_toml())
    }
}

/// Windows paths carry backslashes, which TOML basic strings treat as escapes
fn escape_path(path: &std::path::Path) -> String {
    path.display().to_string().replace('\\', "\\\\")
}
