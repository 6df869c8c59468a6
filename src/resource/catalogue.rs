//! Resource Catalogue - Load resource names from a manifest
//!
//! The catalogue maps a (resource type, logical id) pair to the concrete
//! name the provider will see. It is built once by an explicit load step
//! and never mutated afterward.

use super::manifest::{parse_document, DocumentEntries, ManifestFormat};
use crate::error::{CatalogueLoadError, NameResolutionError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Kind of provider resource
///
/// Variants are declared in dependency order, so the derived `Ord` sorts
/// resources the way the factory creates them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    /// Object storage bucket
    Bucket,
    /// Compute-support layer
    Layer,
    /// Compute unit
    Lambda,
    /// Key-value table
    Table,
    /// REST front door
    Api,
}

impl ResourceType {
    pub const ALL: [ResourceType; 5] = [
        ResourceType::Bucket,
        ResourceType::Layer,
        ResourceType::Lambda,
        ResourceType::Table,
        ResourceType::Api,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bucket => "bucket",
            Self::Layer => "layer",
            Self::Lambda => "lambda",
            Self::Table => "table",
            Self::Api => "api",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = CatalogueLoadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| CatalogueLoadError::UnknownResourceType(s.to_string()))
    }
}

/// One resolved catalogue entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceDescriptor {
    pub kind: ResourceType,
    pub logical_id: String,
    pub concrete_name: String,
}

/// Entry as written in the manifest
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct EntryDef {
    id: String,
    name: String,
}

/// Root structure of resource-names.json: type -> entries. A type key may
/// repeat; its entries still go through the duplicate check.
type CatalogueDef = DocumentEntries<String, Vec<EntryDef>>;

/// Read-only (type, logical id) -> concrete name table
#[derive(Debug, Clone, Default)]
pub struct Catalogue {
    entries: BTreeMap<(ResourceType, String), ResourceDescriptor>,
}

impl Catalogue {
    /// Load a catalogue from a manifest file (format chosen by extension)
    pub fn load(path: &Path) -> Result<Self, CatalogueLoadError> {
        let format = ManifestFormat::from_path(path)?;
        let content = std::fs::read_to_string(path).map_err(|source| CatalogueLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, format, &path.display().to_string())
    }

    /// Parse a catalogue document. `origin` names the document in errors.
    pub fn parse(
        content: &str,
        format: ManifestFormat,
        origin: &str,
    ) -> Result<Self, CatalogueLoadError> {
        let def: CatalogueDef = parse_document(content, format, origin)?;

        let mut catalogue = Self::default();
        for (type_name, entries) in def.0 {
            let kind: ResourceType = type_name.parse()?;
            for entry in entries {
                catalogue.insert(kind, entry.id, entry.name, origin)?;
            }
        }

        tracing::debug!("Loaded {} catalogue entries from {}", catalogue.len(), origin);
        Ok(catalogue)
    }

    /// Build a catalogue from already-typed entries
    pub fn from_entries<I, S>(entries: I) -> Result<Self, CatalogueLoadError>
    where
        I: IntoIterator<Item = (ResourceType, S, S)>,
        S: Into<String>,
    {
        let mut catalogue = Self::default();
        for (kind, id, name) in entries {
            catalogue.insert(kind, id.into(), name.into(), "catalogue entries")?;
        }
        Ok(catalogue)
    }

    fn insert(
        &mut self,
        kind: ResourceType,
        logical_id: String,
        concrete_name: String,
        origin: &str,
    ) -> Result<(), CatalogueLoadError> {
        if logical_id.trim().is_empty() {
            return Err(CatalogueLoadError::EmptyField {
                field: "id",
                context: format!("{} entry of {}", kind, origin),
            });
        }
        if concrete_name.trim().is_empty() {
            return Err(CatalogueLoadError::EmptyField {
                field: "name",
                context: format!("{} '{}' of {}", kind, logical_id, origin),
            });
        }

        let key = (kind, logical_id);
        if self.entries.contains_key(&key) {
            return Err(CatalogueLoadError::DuplicateEntry {
                kind,
                logical_id: key.1,
            });
        }

        let descriptor = ResourceDescriptor {
            kind,
            logical_id: key.1.clone(),
            concrete_name,
        };
        self.entries.insert(key, descriptor);
        Ok(())
    }

    /// Get the full descriptor for a logical id
    pub fn descriptor(
        &self,
        kind: ResourceType,
        logical_id: &str,
    ) -> Result<&ResourceDescriptor, NameResolutionError> {
        self.entries
            .get(&(kind, logical_id.to_string()))
            .ok_or_else(|| NameResolutionError {
                kind,
                logical_id: logical_id.to_string(),
            })
    }

    /// Get the concrete name for a logical id
    pub fn lookup(&self, kind: ResourceType, logical_id: &str) -> Result<&str, NameResolutionError> {
        self.descriptor(kind, logical_id)
            .map(|d| d.concrete_name.as_str())
    }

    /// Logical ids declared for one type
    pub fn logical_ids(&self, kind: ResourceType) -> Vec<&str> {
        self.entries
            .values()
            .filter(|d| d.kind == kind)
            .map(|d| d.logical_id.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "bucket": [{ "id": "imagesBucket", "name": "prod-images-bucket" }],
        "lambda": [
            { "id": "imagesCrudLambda", "name": "prod-images-crud" },
            { "id": "thumbnailLambda", "name": "prod-thumbnails" }
        ],
        "api": [{ "id": "imagesApi", "name": "prod-images-api" }]
    }"#;

    fn sample() -> Catalogue {
        Catalogue::parse(SAMPLE, ManifestFormat::Json, "sample").unwrap()
    }

    #[test]
    fn test_lookup_returns_concrete_name() {
        let catalogue = sample();
        assert_eq!(
            catalogue.lookup(ResourceType::Bucket, "imagesBucket").unwrap(),
            "prod-images-bucket"
        );
        assert_eq!(catalogue.len(), 4);
    }

    #[test]
    fn test_lookup_is_keyed_by_type() {
        let catalogue = sample();
        let err = catalogue
            .lookup(ResourceType::Table, "imagesBucket")
            .unwrap_err();
        assert_eq!(err.kind, ResourceType::Table);
        assert_eq!(err.logical_id, "imagesBucket");
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let err = Catalogue::parse(
            r#"{ "queue": [{ "id": "q", "name": "q" }] }"#,
            ManifestFormat::Json,
            "bad",
        )
        .unwrap_err();
        assert!(matches!(err, CatalogueLoadError::UnknownResourceType(ref t) if t == "queue"));
    }

    #[test]
    fn test_duplicate_entry_is_rejected() {
        let err = Catalogue::parse(
            r#"{ "table": [
                { "id": "info", "name": "a" },
                { "id": "info", "name": "b" }
            ] }"#,
            ManifestFormat::Json,
            "dup",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CatalogueLoadError::DuplicateEntry { kind: ResourceType::Table, ref logical_id } if logical_id == "info"
        ));
    }

    #[test]
    fn test_repeated_type_key_cannot_redefine_an_entry() {
        let json = r#"{
            "bucket": [{ "id": "imagesBucket", "name": "first" }],
            "bucket": [{ "id": "imagesBucket", "name": "second" }]
        }"#;
        let err = Catalogue::parse(json, ManifestFormat::Json, "json").unwrap_err();
        assert!(matches!(
            err,
            CatalogueLoadError::DuplicateEntry { kind: ResourceType::Bucket, ref logical_id } if logical_id == "imagesBucket"
        ));

        let yaml = "bucket:\n  - id: imagesBucket\n    name: first\n\
                    bucket:\n  - id: imagesBucket\n    name: second\n";
        let err = Catalogue::parse(yaml, ManifestFormat::Yaml, "yaml").unwrap_err();
        assert!(matches!(err, CatalogueLoadError::DuplicateEntry { kind: ResourceType::Bucket, .. }));
    }

    #[test]
    fn test_repeated_type_key_merges_distinct_entries() {
        let json = r#"{
            "lambda": [{ "id": "imagesCrudLambda", "name": "crud" }],
            "lambda": [{ "id": "thumbnailLambda", "name": "thumbs" }]
        }"#;
        let catalogue = Catalogue::parse(json, ManifestFormat::Json, "json").unwrap();
        assert_eq!(catalogue.len(), 2);
        assert_eq!(catalogue.lookup(ResourceType::Lambda, "imagesCrudLambda").unwrap(), "crud");
    }

    #[test]
    fn test_same_id_under_different_types_is_allowed() {
        let catalogue = Catalogue::from_entries([
            (ResourceType::Lambda, "memesCrudLambda", "memes-crud"),
            (ResourceType::Layer, "memesCrudLambda", "memes-crud-layer"),
        ])
        .unwrap();
        assert_eq!(catalogue.len(), 2);
    }

    #[test]
    fn test_empty_name_is_rejected() {
        let err = Catalogue::from_entries([(ResourceType::Api, "imagesApi", " ")]).unwrap_err();
        assert!(matches!(err, CatalogueLoadError::EmptyField { field: "name", .. }));
    }

    #[test]
    fn test_unknown_entry_field_is_rejected() {
        let err = Catalogue::parse(
            r#"{ "bucket": [{ "bucketId": "b", "bucketName": "n" }] }"#,
            ManifestFormat::Json,
            "legacy",
        )
        .unwrap_err();
        assert!(matches!(err, CatalogueLoadError::Json { .. }));
    }

    #[test]
    fn test_yaml_manifest() {
        let yaml = "bucket:\n  - id: memesBucket\n    name: memes-bucket\n";
        let catalogue = Catalogue::parse(yaml, ManifestFormat::Yaml, "yaml").unwrap();
        assert_eq!(
            catalogue.lookup(ResourceType::Bucket, "memesBucket").unwrap(),
            "memes-bucket"
        );
    }

    #[test]
    fn test_logical_ids_by_type() {
        let catalogue = sample();
        assert_eq!(
            catalogue.logical_ids(ResourceType::Lambda),
            vec!["imagesCrudLambda", "thumbnailLambda"]
        );
    }

    #[test]
    fn test_resource_type_round_trips_through_str() {
        for kind in ResourceType::ALL {
            assert_eq!(kind.as_str().parse::<ResourceType>().unwrap(), kind);
        }
    }
}
