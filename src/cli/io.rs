//! JSON I/O handling for CLI
//!
//! - Input: data files read from disk
//! - Output: single JSON object via stdout
//! - UTF-8 only

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use serde_json::Value;

use super::errors::{CliError, CliResult};

/// Read and parse a JSON file
pub fn read_json_file(path: &Path) -> CliResult<Value> {
    let content = fs::read_to_string(path)
        .map_err(|e| CliError::data_error(format!("Failed to read {}: {}", path.display(), e)))?;
    serde_json::from_str(&content)
        .map_err(|e| CliError::data_error(format!("Invalid JSON in {}: {}", path.display(), e)))
}

/// Success envelope
pub fn ok_envelope(data: Value) -> Value {
    serde_json::json!({
        "status": "ok",
        "data": data
    })
}

/// Error envelope
pub fn error_envelope(code: &str, message: &str) -> Value {
    serde_json::json!({
        "status": "error",
        "code": code,
        "message": message
    })
}

/// Write a success response to stdout
pub fn write_response(data: Value) -> CliResult<()> {
    write_line(&ok_envelope(data))
}

/// Write an error response to stdout
pub fn write_error(code: &str, message: &str) -> CliResult<()> {
    write_line(&error_envelope(code, message))
}

fn write_line(value: &Value) -> CliResult<()> {
    let mut stdout = io::stdout();
    serde_json::to_writer(&mut stdout, value)?;
    writeln!(stdout)?;
    stdout.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelopes() {
        assert_eq!(
            ok_envelope(serde_json::json!([1])),
            serde_json::json!({"status": "ok", "data": [1]})
        );
        assert_eq!(
            error_envelope("CRUD_NOT_FOUND", "missing"),
            serde_json::json!({"status": "error", "code": "CRUD_NOT_FOUND", "message": "missing"})
        );
    }

    #[test]
    fn test_read_json_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.json");
        assert_eq!(read_json_file(&path).unwrap_err().code_str(), "CRUD_CLI_DATA_ERROR");

        fs::write(&path, "[{\"id\": 1}]").unwrap();
        assert_eq!(read_json_file(&path).unwrap(), serde_json::json!([{"id": 1}]));
    }
}
