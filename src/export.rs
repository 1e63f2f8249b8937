//! Shell export formatting and output
//!
//! Each secret entry becomes `\nexport KEY='VALUE'`, appended to the output
//! file. Values are wrapped in single quotes; an embedded `'` is written as
//! `'"'"'` (close quote, double-quoted quote, reopen quote), so sourcing the
//! file in a POSIX shell yields the original value unchanged.

use std::path::Path;

use serde_json::Value;
use tokio::{fs::OpenOptions, io::AsyncWriteExt};
use tracing::{debug, warn};

use crate::{aws::secrets::Secret, error::FetchSecretError};

const QUOTE_ESCAPE: &str = r#"'"'"'"#;

/// Replace every single quote with the shell-safe `'"'"'` sequence
pub fn escape_single_quotes(value: &str) -> String {
    value.replace('\'', QUOTE_ESCAPE)
}

/// String form of a secret value
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => match n.as_f64() {
            // 1.0 -> "1" and -0.0 -> "0", matching how integral numbers are usually spelled in env vars
            Some(f) if n.is_f64() && f == 0.0 => "0".to_string(),
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e21 => format!("{f:.0}"),
            _ => n.to_string(),
        },
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Format a single entry, including its leading newline
pub fn export_line(key: &str, value: &Value) -> String {
    format!(
        "\nexport {key}='{}'",
        escape_single_quotes(&value_to_string(value))
    )
}

fn is_shell_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    matches!(chars.next(), Some(c) if c == '_' || c.is_ascii_alphabetic())
        && chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

/// Append one export line per secret entry to `path`.
///
/// The file is created if needed and never truncated. Entries are written
/// one at a time, so a failure part way through leaves the earlier lines in
/// place. Returns the number of lines written.
///
/// Only values are quoted. Keys are written verbatim, so a key such as
/// `a;touch x;b` runs a command when the file is sourced; such keys are
/// logged at `warn`. Only write secrets whose keys you trust.
pub async fn append_exports(path: &Path, secret: &Secret) -> Result<usize, FetchSecretError> {
    if secret.is_empty() {
        debug!("Secret is empty, nothing to append");
        return Ok(0);
    }

    let write_err = |source| FetchSecretError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .map_err(write_err)?;

    let mut written = 0;
    for (key, value) in secret.iter() {
        if !is_shell_identifier(key) {
            warn!("Secret key '{}' is not a valid shell variable name", key);
        }

        debug!("Appending to: {}", path.display());
        file.write_all(export_line(key, value).as_bytes())
            .await
            .map_err(write_err)?;
        file.flush().await.map_err(write_err)?;
        written += 1;
    }

    Ok(written)
}
