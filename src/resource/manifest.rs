//! Manifest documents
//!
//! A manifest is a pair of documents: the resource catalogue and the
//! compute-unit environment schema. Both can be JSON or YAML. Built-in
//! manifests for every variant are embedded in the binary.

use super::catalogue::Catalogue;
use super::environment::EnvironmentSchema;
use crate::error::CatalogueLoadError;
use crate::variant::Variant;
use serde::de::{Deserialize, DeserializeOwned, Deserializer, MapAccess, Visitor};
use std::fmt;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// File stem of the catalogue document
pub const CATALOGUE_STEM: &str = "resource-names";
/// File stem of the environment schema document
pub const ENVIRONMENT_STEM: &str = "lambda-environment-variables";

/// Embedded (catalogue, environment) documents per variant
fn builtin_documents(variant: Variant) -> (&'static str, &'static str) {
    match variant {
        Variant::ImageDrive => (
            include_str!("../manifests/image-drive/resource-names.json"),
            include_str!("../manifests/image-drive/lambda-environment-variables.json"),
        ),
        Variant::Images => (
            include_str!("../manifests/images/resource-names.json"),
            include_str!("../manifests/images/lambda-environment-variables.json"),
        ),
        Variant::Memeages => (
            include_str!("../manifests/memeages/resource-names.json"),
            include_str!("../manifests/memeages/lambda-environment-variables.json"),
        ),
    }
}

/// Document encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestFormat {
    Json,
    Yaml,
}

impl ManifestFormat {
    /// Pick the format from a file extension
    pub fn from_path(path: &Path) -> Result<Self, CatalogueLoadError> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Ok(Self::Json),
            Some("yaml") | Some("yml") => Ok(Self::Yaml),
            _ => Err(CatalogueLoadError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

/// Deserialize a manifest document
pub(crate) fn parse_document<T: DeserializeOwned>(
    content: &str,
    format: ManifestFormat,
    origin: &str,
) -> Result<T, CatalogueLoadError> {
    match format {
        ManifestFormat::Json => {
            serde_json::from_str(content).map_err(|source| CatalogueLoadError::Json {
                origin: origin.to_string(),
                source,
            })
        }
        ManifestFormat::Yaml => {
            serde_yaml::from_str(content).map_err(|source| CatalogueLoadError::Yaml {
                origin: origin.to_string(),
                source,
            })
        }
    }
}

/// Map entries in document order, repeated keys included.
///
/// serde_json and serde_yaml keep only the last value of a repeated key
/// when filling a map, so manifests are read through this instead.
#[derive(Debug)]
pub(crate) struct DocumentEntries<K, V>(pub Vec<(K, V)>);

impl<'de, K, V> Deserialize<'de> for DocumentEntries<K, V>
where
    K: Deserialize<'de>,
    V: Deserialize<'de>,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor<K, V>(PhantomData<(K, V)>);

        impl<'de, K, V> Visitor<'de> for EntriesVisitor<K, V>
        where
            K: Deserialize<'de>,
            V: Deserialize<'de>,
        {
            type Value = DocumentEntries<K, V>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry()? {
                    entries.push(entry);
                }
                Ok(DocumentEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor(PhantomData))
    }
}

/// Find `<stem>.json`, `<stem>.yaml` or `<stem>.yml` in a directory
pub fn find_document(dir: &Path, stem: &str) -> Result<PathBuf, CatalogueLoadError> {
    ["json", "yaml", "yml"]
        .iter()
        .map(|ext| dir.join(format!("{}.{}", stem, ext)))
        .find(|candidate| candidate.is_file())
        .ok_or_else(|| CatalogueLoadError::Missing {
            dir: dir.to_path_buf(),
            stem: stem.to_string(),
        })
}

/// Catalogue plus environment schema for one stack
#[derive(Debug, Clone)]
pub struct Manifest {
    pub catalogue: Catalogue,
    pub environment: EnvironmentSchema,
}

impl Manifest {
    /// Load both documents from a configuration directory
    pub fn load_dir(dir: &Path) -> Result<Self, CatalogueLoadError> {
        let catalogue = Catalogue::load(&find_document(dir, CATALOGUE_STEM)?)?;
        let environment = EnvironmentSchema::load(&find_document(dir, ENVIRONMENT_STEM)?)?;
        tracing::info!("Loaded manifest from {}", dir.display());
        Ok(Self {
            catalogue,
            environment,
        })
    }

    /// Load the manifest embedded for a variant
    pub fn builtin(variant: Variant) -> Result<Self, CatalogueLoadError> {
        let (catalogue_doc, environment_doc) = builtin_documents(variant);
        let origin = format!("built-in {} manifest", variant);
        Ok(Self {
            catalogue: Catalogue::parse(catalogue_doc, ManifestFormat::Json, &origin)?,
            environment: EnvironmentSchema::parse(environment_doc, ManifestFormat::Json, &origin)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::ResourceType;

    #[test]
    fn test_builtin_manifests_load() {
        for variant in Variant::ALL {
            let manifest = Manifest::builtin(variant).unwrap();
            assert!(!manifest.catalogue.is_empty(), "{} catalogue is empty", variant);
            assert!(manifest.catalogue.lookup(ResourceType::Api, variant.blueprint().api).is_ok());
        }
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            ManifestFormat::from_path(Path::new("conf/resource-names.yml")).unwrap(),
            ManifestFormat::Yaml
        );
        assert!(ManifestFormat::from_path(Path::new("conf/resource-names.toml")).is_err());
    }

    #[test]
    fn test_document_entries_keep_repeated_keys() {
        let json: DocumentEntries<String, u32> =
            parse_document(r#"{ "a": 1, "b": 2, "a": 3 }"#, ManifestFormat::Json, "json").unwrap();
        assert_eq!(
            json.0,
            vec![("a".to_string(), 1), ("b".to_string(), 2), ("a".to_string(), 3)]
        );

        let yaml: DocumentEntries<String, u32> =
            parse_document("a: 1\nb: 2\na: 3\n", ManifestFormat::Yaml, "yaml").unwrap();
        assert_eq!(yaml.0.len(), 3);
    }

    #[test]
    fn test_missing_document_names_the_stem() {
        let dir = tempfile::tempdir().unwrap();
        let err = find_document(dir.path(), CATALOGUE_STEM).unwrap_err();
        assert!(err.to_string().contains("resource-names.json"));
    }
}
