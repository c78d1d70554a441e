//! Fixture file parsing.

use std::path::Path;

use serde_json::Value;

use super::format::{DEFAULTS_KEY, FixtureEntry, FixtureFile, FixtureFormat};
use crate::backend::Document;
use crate::error::{FixtureError, FixtureResult};

/// Parser for fixture files.
///
/// Supports YAML (with the `yaml` feature) and JSON.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureParser;

impl FixtureParser {
	/// Creates a new fixture parser.
	pub fn new() -> Self {
		Self
	}

	/// Parses a fixture file, detecting the format from its extension.
	///
	/// # Errors
	///
	/// Returns an error if:
	/// - The file extension is not recognized
	/// - The file cannot be read
	/// - The content is not a mapping of labels to attribute mappings
	pub fn parse_file(&self, path: &Path) -> FixtureResult<FixtureFile> {
		let format = FixtureFormat::from_path(path).ok_or_else(|| {
			FixtureError::UnsupportedExtension(
				path.extension()
					.and_then(|e| e.to_str())
					.unwrap_or("(none)")
					.to_string(),
			)
		})?;

		let content = std::fs::read_to_string(path).map_err(|e| {
			if e.kind() == std::io::ErrorKind::NotFound {
				FixtureError::FileNotFound(path.display().to_string())
			} else {
				FixtureError::IoError(e)
			}
		})?;

		let source = path.display().to_string();
		Ok(self
			.parse_source(&content, format, &source)?
			.with_source(source))
	}

	/// Parses fixture content from a string.
	pub fn parse_string(&self, content: &str, format: FixtureFormat) -> FixtureResult<FixtureFile> {
		self.parse_source(content, format, "(string)")
	}

	fn parse_source(
		&self,
		content: &str,
		format: FixtureFormat,
		source: &str,
	) -> FixtureResult<FixtureFile> {
		if content.trim().is_empty() {
			return Ok(FixtureFile::from_entries(Vec::new(), format));
		}

		let value = match format {
			FixtureFormat::Yaml => self.parse_yaml(content)?,
			FixtureFormat::Json => serde_json::from_str(content)?,
		};

		let entries = self.entries(value, source)?;
		Ok(FixtureFile::from_entries(entries, format))
	}

	/// Parses YAML into JSON, resolving `<<` merge keys first.
	#[cfg(feature = "yaml")]
	fn parse_yaml(&self, content: &str) -> FixtureResult<Value> {
		let mut value: serde_yaml::Value = serde_yaml::from_str(content)?;
		value.apply_merge()?;
		serde_json::to_value(value).map_err(|e| FixtureError::ParseError(e.to_string()))
	}

	#[cfg(not(feature = "yaml"))]
	fn parse_yaml(&self, _content: &str) -> FixtureResult<Value> {
		Err(FixtureError::UnsupportedExtension(
			"YAML support requires the 'yaml' feature".to_string(),
		))
	}

	fn entries(&self, value: Value, source: &str) -> FixtureResult<Vec<FixtureEntry>> {
		let mapping = match value {
			Value::Null => return Ok(Vec::new()),
			Value::Object(mapping) => mapping,
			other => {
				return Err(FixtureError::InvalidFixture {
					source_name: source.to_string(),
					message: format!("expected a mapping of fixture labels, got {}", kind(&other)),
				});
			}
		};

		let mut entries = Vec::with_capacity(mapping.len());
		for (label, attributes) in mapping {
			if label == DEFAULTS_KEY {
				continue;
			}

			let attributes = match attributes {
				Value::Null => Document::new(),
				Value::Object(map) => map,
				other => {
					return Err(FixtureError::InvalidFixture {
						source_name: source.to_string(),
						message: format!(
							"fixture '{}' must be a mapping of attributes, got {}",
							label,
							kind(&other)
						),
					});
				}
			};

			entries.push(FixtureEntry { label, attributes });
		}

		Ok(entries)
	}
}

fn kind(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "a boolean",
		Value::Number(_) => "a number",
		Value::String(_) => "a string",
		Value::Array(_) => "a sequence",
		Value::Object(_) => "a mapping",
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;
	use std::io::Write;
	use tempfile::NamedTempFile;

	#[rstest]
	fn test_parse_json() {
		let parser = FixtureParser::new();
		let content = r#"{
			"alice": {"name": "Alice", "age": 30},
			"bob": {"name": "Bob"}
		}"#;

		let file = parser.parse_string(content, FixtureFormat::Json).unwrap();
		assert_eq!(file.len(), 2);
		let alice = file.entries.iter().find(|e| e.label == "alice").unwrap();
		assert_eq!(alice.attributes["age"], json!(30));
	}

	#[rstest]
	fn test_parse_empty_content() {
		let parser = FixtureParser::new();
		let file = parser.parse_string("  \n", FixtureFormat::Json).unwrap();
		assert!(file.is_empty());
	}

	#[rstest]
	fn test_parse_skips_defaults() {
		let parser = FixtureParser::new();
		let content = r#"{"DEFAULTS": {"active": true}, "alice": {"name": "Alice"}}"#;

		let file = parser.parse_string(content, FixtureFormat::Json).unwrap();
		assert_eq!(file.labels(), vec!["alice"]);
	}

	#[rstest]
	fn test_parse_null_attributes() {
		let parser = FixtureParser::new();
		let file = parser
			.parse_string(r#"{"empty": null}"#, FixtureFormat::Json)
			.unwrap();
		assert!(file.entries[0].attributes.is_empty());
	}

	#[rstest]
	fn test_parse_rejects_sequence() {
		let parser = FixtureParser::new();
		let result = parser.parse_string(r#"[{"name": "Alice"}]"#, FixtureFormat::Json);
		assert!(matches!(result, Err(FixtureError::InvalidFixture { .. })));
	}

	#[rstest]
	fn test_parse_rejects_scalar_attributes() {
		let parser = FixtureParser::new();
		let result = parser.parse_string(r#"{"alice": "Alice"}"#, FixtureFormat::Json);
		match result {
			Err(FixtureError::InvalidFixture { message, .. }) => {
				assert!(message.contains("'alice'"));
			}
			other => panic!("Expected InvalidFixture, got {:?}", other),
		}
	}

	#[cfg(feature = "yaml")]
	#[rstest]
	fn test_parse_yaml_with_merge_keys() {
		let parser = FixtureParser::new();
		let content = r#"
DEFAULTS: &defaults
  active: true
  role: member

alice:
  <<: *defaults
  name: Alice
  role: admin

bob:
  <<: *defaults
  name: Bob
"#;

		let file = parser.parse_string(content, FixtureFormat::Yaml).unwrap();
		assert_eq!(file.len(), 2);

		let alice = file.entries.iter().find(|e| e.label == "alice").unwrap();
		assert_eq!(alice.attributes["active"], json!(true));
		assert_eq!(alice.attributes["role"], json!("admin"));
		assert!(!alice.attributes.contains_key("<<"));

		let bob = file.entries.iter().find(|e| e.label == "bob").unwrap();
		assert_eq!(bob.attributes["role"], json!("member"));
	}

	#[cfg(feature = "yaml")]
	#[rstest]
	fn test_parse_yaml_file() {
		let parser = FixtureParser::new();
		let mut file = NamedTempFile::with_suffix(".yml").unwrap();
		writeln!(file, "alice:\n  name: Alice").unwrap();

		let parsed = parser.parse_file(file.path()).unwrap();
		assert_eq!(parsed.labels(), vec!["alice"]);
		assert!(parsed.source.is_some());
	}

	#[rstest]
	fn test_parse_json_file() {
		let parser = FixtureParser::new();
		let mut file = NamedTempFile::with_suffix(".json").unwrap();
		writeln!(file, r#"{{"alice": {{"name": "Alice"}}}}"#).unwrap();

		let parsed = parser.parse_file(file.path()).unwrap();
		assert_eq!(parsed.format, FixtureFormat::Json);
		assert_eq!(parsed.len(), 1);
	}

	#[rstest]
	fn test_parse_file_not_found() {
		let parser = FixtureParser::new();
		let result = parser.parse_file(Path::new("/nonexistent/users.json"));
		assert!(matches!(result, Err(FixtureError::FileNotFound(_))));
	}

	#[rstest]
	fn test_parse_unsupported_extension() {
		let parser = FixtureParser::new();
		let result = parser.parse_file(Path::new("users.csv"));
		assert!(matches!(result, Err(FixtureError::UnsupportedExtension(_))));
	}
}
