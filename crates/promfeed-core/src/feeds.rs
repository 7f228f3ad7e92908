use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

use crate::ConfigError;

/// A feed id as written in YAML: `1849` and `"1849"` are both accepted.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawFeedId {
    Number(u64),
    Text(String),
}

impl From<RawFeedId> for String {
    fn from(raw: RawFeedId) -> Self {
        match raw {
            RawFeedId::Number(n) => n.to_string(),
            RawFeedId::Text(s) => s.trim().to_string(),
        }
    }
}

fn deserialize_feed_ids<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Vec::<RawFeedId>::deserialize(deserializer)?;
    Ok(raw.into_iter().map(String::from).collect())
}

/// The run file: which feeds to merge, and optionally the fixed list of
/// artifacts to split them across.
///
/// ```yaml
/// feeds: [1849, 1850, 1851, 1852]
/// outputs:
///   - b2b.prom.1.xml.gz
///   - b2b.prom.2.xml.gz
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct FeedsFile {
    #[serde(deserialize_with = "deserialize_feed_ids")]
    pub feeds: Vec<String>,
    #[serde(default)]
    pub outputs: Option<Vec<String>>,
}

/// Load and validate the run file from YAML.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_feeds(path: &Path) -> Result<FeedsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FeedsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let feeds_file: FeedsFile = serde_yaml::from_str(&content)?;

    validate_feed_ids(&feeds_file.feeds)?;
    if let Some(outputs) = &feeds_file.outputs {
        validate_output_files(outputs)?;
    }

    Ok(feeds_file)
}

/// Feed ids end up in URLs and file names, so only `[A-Za-z0-9_-]` is allowed.
///
/// # Errors
///
/// Returns `ConfigError::Validation` for an empty list, an empty or unsafe id,
/// or a repeated id.
pub fn validate_feed_ids(ids: &[String]) -> Result<(), ConfigError> {
    if ids.is_empty() {
        return Err(ConfigError::Validation(
            "at least one feed id is required".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for id in ids {
        if id.is_empty() {
            return Err(ConfigError::Validation(
                "feed id must be non-empty".to_string(),
            ));
        }
        if !id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ConfigError::Validation(format!(
                "feed id '{id}' contains characters outside [A-Za-z0-9_-]"
            )));
        }
        if !seen.insert(id.as_str()) {
            return Err(ConfigError::Validation(format!("duplicate feed id: '{id}'")));
        }
    }

    Ok(())
}

/// Output names are plain file names inside the output directory.
///
/// # Errors
///
/// Returns `ConfigError::Validation` for an empty list, an empty name, a name
/// containing a path separator, or a repeated name.
pub fn validate_output_files(names: &[String]) -> Result<(), ConfigError> {
    if names.is_empty() {
        return Err(ConfigError::Validation(
            "output file list must not be empty when given".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for name in names {
        let trimmed = name.trim();
        if trimmed.is_empty() || trimmed == "." || trimmed == ".." {
            return Err(ConfigError::Validation(format!(
                "invalid output file name: '{name}'"
            )));
        }
        if trimmed.contains('/') || trimmed.contains('\\') {
            return Err(ConfigError::Validation(format!(
                "output file name '{name}' must not contain a path separator"
            )));
        }
        if !seen.insert(trimmed) {
            return Err(ConfigError::Validation(format!(
                "duplicate output file name: '{name}'"
            )));
        }
    }

    Ok(())
}
