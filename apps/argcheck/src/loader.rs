//! # Input Loading
//!
//! Reads argument documents (JSON or YAML, from a file or stdin) into a
//! `serde_json::Value`, and loads schema definitions.
//!
//! YAML mappings keep their key order, so statement order in the report is
//! the order the author wrote them in.

use argcheck_core::{ArgcheckError, JsonSchema};
use serde_json::Value;
use std::io::Read;
use std::path::{Path, PathBuf};

// =============================================================================
// LIMITS
// =============================================================================

/// Maximum size of an argument document (50 MB).
///
/// This prevents memory exhaustion from accidental large inputs.
const MAX_DOCUMENT_FILE_SIZE: u64 = 50 * 1024 * 1024;

/// Maximum size of a schema definition (5 MB).
const MAX_SCHEMA_FILE_SIZE: u64 = 5 * 1024 * 1024;

/// The schema bundled with the binary, for the premise-conclusion format.
pub const BUNDLED_SCHEMA: &str = include_str!("../schemas/argument_schema.json");

/// Path that reads the document from stdin.
pub const STDIN_PATH: &str = "-";

// =============================================================================
// FORMAT
// =============================================================================

/// Serialization of an input document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Json,
    Yaml,
}

impl InputFormat {
    /// Pick the format from a file extension. Anything that is not `.json`
    /// is read as YAML.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => InputFormat::Json,
            _ => InputFormat::Yaml,
        }
    }

    /// Pick the format from content, for stdin.
    #[must_use]
    pub fn sniff(text: &str) -> Self {
        match text.trim_start().chars().next() {
            Some('{' | '[') => InputFormat::Json,
            _ => InputFormat::Yaml,
        }
    }
}

// =============================================================================
// FILE VALIDATION
// =============================================================================

/// Validate file path.
///
/// Canonicalizes the path (resolving symlinks and `..`) and ensures it
/// names an existing regular file.
pub fn validate_file_path(path: &Path) -> Result<PathBuf, ArgcheckError> {
    let canonical = path.canonicalize().map_err(|e| {
        ArgcheckError::IoError(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(ArgcheckError::IoError(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

/// Validate file size before reading.
pub fn validate_file_size(path: &Path, max_size: u64) -> Result<(), ArgcheckError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| ArgcheckError::IoError(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(ArgcheckError::IoError(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

// =============================================================================
// DOCUMENTS
// =============================================================================

/// Parse document text.
pub fn parse_document(text: &str, format: InputFormat) -> Result<Value, ArgcheckError> {
    match format {
        InputFormat::Json => serde_json::from_str(text)
            .map_err(|e| ArgcheckError::InvalidDocument(format!("JSON parse error: {e}"))),
        InputFormat::Yaml => serde_yaml::from_str(text)
            .map_err(|e| ArgcheckError::InvalidDocument(format!("YAML parse error: {e}"))),
    }
}

/// Load a document from a file, or from stdin when the path is `-`.
pub fn load_document(path: &Path) -> Result<Value, ArgcheckError> {
    if path.as_os_str() == STDIN_PATH {
        let text = read_stdin()?;
        return parse_document(&text, InputFormat::sniff(&text));
    }

    let validated = validate_file_path(path)?;
    validate_file_size(&validated, MAX_DOCUMENT_FILE_SIZE)?;
    let text = std::fs::read_to_string(&validated)
        .map_err(|e| ArgcheckError::IoError(format!("Read file: {}", e)))?;
    tracing::debug!("Read {} bytes from {}", text.len(), validated.display());
    parse_document(&text, InputFormat::from_path(&validated))
}

fn read_stdin() -> Result<String, ArgcheckError> {
    let mut text = String::new();
    std::io::stdin()
        .take(MAX_DOCUMENT_FILE_SIZE + 1)
        .read_to_string(&mut text)
        .map_err(|e| ArgcheckError::IoError(format!("Read stdin: {}", e)))?;
    if text.len() as u64 > MAX_DOCUMENT_FILE_SIZE {
        return Err(ArgcheckError::IoError(format!(
            "stdin exceeds maximum allowed {} bytes",
            MAX_DOCUMENT_FILE_SIZE
        )));
    }
    Ok(text)
}

// =============================================================================
// SCHEMAS
// =============================================================================

/// The bundled premise-conclusion schema.
pub fn bundled_schema() -> Result<JsonSchema, ArgcheckError> {
    JsonSchema::from_json_str(BUNDLED_SCHEMA)
}

/// Load a JSON schema file. Any failure is `SchemaUnavailable`.
pub fn load_schema(path: &Path) -> Result<JsonSchema, ArgcheckError> {
    let unavailable = |e: ArgcheckError| ArgcheckError::SchemaUnavailable(e.to_string());
    let validated = validate_file_path(path).map_err(unavailable)?;
    validate_file_size(&validated, MAX_SCHEMA_FILE_SIZE).map_err(unavailable)?;
    let text = std::fs::read_to_string(&validated).map_err(|e| {
        ArgcheckError::SchemaUnavailable(format!("Cannot read '{}': {}", path.display(), e))
    })?;
    JsonSchema::from_json_str(&text)
}

// =============================================================================
// TESTS
// =============================================================================
