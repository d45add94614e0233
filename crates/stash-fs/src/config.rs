//! Format-agnostic document loading and saving

use serde::{Serialize, de::DeserializeOwned};

use crate::{Error, NormalizedPath, Result, io};

/// Serialization formats understood by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Toml,
    Json,
    Yaml,
}

impl DocumentFormat {
    /// Detect the format from a path's extension.
    pub fn detect(path: &NormalizedPath) -> Result<Self> {
        let extension = path.extension().unwrap_or("");
        match extension.to_lowercase().as_str() {
            "toml" => Ok(Self::Toml),
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            _ => Err(Error::UnsupportedFormat {
                extension: extension.to_string(),
            }),
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Toml => "TOML",
            Self::Json => "JSON",
            Self::Yaml => "YAML",
        }
    }
}

/// Format-agnostic document store.
///
/// The format comes from the file extension; writes always go through
/// [`io::write_atomic`].
#[derive(Debug, Default, Clone, Copy)]
pub struct ConfigStore;

impl ConfigStore {
    pub fn new() -> Self {
        Self
    }

    /// Load and deserialize a document.
    pub fn load<T: DeserializeOwned>(&self, path: &NormalizedPath) -> Result<T> {
        let format = DocumentFormat::detect(path)?;
        let content = io::read_text(path)?;
        self.parse(path, format, &content)
    }

    /// Like [`load`](Self::load) but returns `None` when the file is absent.
    pub fn load_optional<T: DeserializeOwned>(&self, path: &NormalizedPath) -> Result<Option<T>> {
        match self.load(path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Deserialize already-read content as the given format.
    pub fn parse<T: DeserializeOwned>(
        &self,
        path: &NormalizedPath,
        format: DocumentFormat,
        content: &str,
    ) -> Result<T> {
        let parsed = match format {
            DocumentFormat::Toml => toml::from_str(content).map_err(|e| e.to_string()),
            DocumentFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
            DocumentFormat::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
        };
        parsed.map_err(|message| Error::ConfigParse {
            path: path.to_native(),
            format: format.label().into(),
            message,
        })
    }

    /// Serialize and atomically save a document.
    pub fn save<T: Serialize>(&self, path: &NormalizedPath, value: &T) -> Result<()> {
        let format = DocumentFormat::detect(path)?;
        let rendered = match format {
            DocumentFormat::Toml => toml::to_string_pretty(value).map_err(|e| e.to_string()),
            DocumentFormat::Json => serde_json::to_string_pretty(value).map_err(|e| e.to_string()),
            DocumentFormat::Yaml => serde_yaml::to_string(value).map_err(|e| e.to_string()),
        };
        let content = rendered.map_err(|message| Error::ConfigSerialize {
            path: path.to_native(),
            format: format.label().into(),
            message,
        })?;
        io::write_text(path, &content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        count: u32,
    }

    #[test]
    fn detect_format_from_extension() {
        assert_eq!(
            DocumentFormat::detect(&"a/meta.yaml".into()).unwrap(),
            DocumentFormat::Yaml
        );
        assert_eq!(
            DocumentFormat::detect(&"a/meta.YML".into()).unwrap(),
            DocumentFormat::Yaml
        );
        assert!(matches!(
            DocumentFormat::detect(&"a/meta.ini".into()),
            Err(Error::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn save_then_load_yaml() {
        let temp = TempDir::new().unwrap();
        let path = NormalizedPath::new(temp.path().join("doc.yaml"));
        let store = ConfigStore::new();
        let sample = Sample {
            name: "demo".into(),
            count: 3,
        };

        store.save(&path, &sample).unwrap();
        let loaded: Sample = store.load(&path).unwrap();
        assert_eq!(loaded, sample);
    }

    #[test]
    fn load_optional_missing_is_none() {
        let temp = TempDir::new().unwrap();
        let path = NormalizedPath::new(temp.path().join("absent.toml"));
        let loaded: Option<Sample> = ConfigStore::new().load_optional(&path).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn parse_error_names_format() {
        let temp = TempDir::new().unwrap();
        let path = NormalizedPath::new(temp.path().join("bad.toml"));
        std::fs::write(path.to_native(), "name = [unclosed").unwrap();

        let err = ConfigStore::new().load::<Sample>(&path).unwrap_err();
        assert!(err.to_string().contains("TOML"), "got: {err}");
    }
}
