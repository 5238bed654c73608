use serde::{Deserialize, Serialize};

/// One ranked match returned by the face-search provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaceMatchCandidate {
    /// Provider-assigned face identifier (opaque).
    pub face_id: String,
    /// Similarity score in [0, 100].
    pub similarity: f32,
    /// Tag attached to the face when it was indexed, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
}

impl FaceMatchCandidate {
    pub fn new(face_id: impl Into<String>, similarity: f32, external_id: Option<&str>) -> Self {
        Self {
            face_id: face_id.into(),
            similarity,
            external_id: external_id.map(str::to_string),
        }
    }
}

/// One stored image from a recursive blob-store listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlobEntry {
    /// Full hierarchical key, e.g. `PNG/Momase/Madang/John_Doe.jpg`.
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
}

impl BlobEntry {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into(), external_id: None }
    }

    pub fn tagged(key: impl Into<String>, external_id: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            external_id: Some(external_id.into()),
        }
    }
}

/// Metadata decoded from a JSON-object external identifier.
///
/// Known fields are picked out only when they hold strings; anything else
/// stays in `extra`, so a stray number never rejects the whole object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "serde_json::Map<String, serde_json::Value>")]
pub struct PersonInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Direct blob key of the registered photo (`s3Key`, or `key`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s3_key: Option<String>,
    /// Folder the photo was registered under (`s3Folder`, or `folder`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s3_folder: Option<String>,
    /// Registry fields we do not interpret (province, district, ...).
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl From<serde_json::Map<String, serde_json::Value>> for PersonInfo {
    fn from(mut extra: serde_json::Map<String, serde_json::Value>) -> Self {
        let name = take_string(&mut extra, &["name"]);
        let s3_key = take_string(&mut extra, &["s3Key", "key"]);
        let s3_folder = take_string(&mut extra, &["s3Folder", "folder"]);
        Self {
            name,
            s3_key,
            s3_folder,
            extra,
        }
    }
}

/// Remove and return the first of `fields` holding a string value.
fn take_string(
    map: &mut serde_json::Map<String, serde_json::Value>,
    fields: &[&str],
) -> Option<String> {
    let field = fields.iter().find(|f| map.get(**f).is_some_and(|v| v.is_string()))?;
    match map.remove(*field) {
        Some(serde_json::Value::String(s)) => Some(s),
        _ => None,
    }
}

/// Which heuristic produced the image key of an [`EnrichedMatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchSource {
    StructuredMetadata,
    ColonPath,
    VerbatimKey,
    FacePrefix,
}

impl MatchSource {
    /// Whether a match from this source is trusted enough to attribute a folder.
    pub fn sets_folder(self) -> bool {
        !matches!(self, MatchSource::FacePrefix)
    }
}

/// A candidate annotated with its best-effort image, name and location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedMatch {
    pub face_id: String,
    pub similarity: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    /// Presentable image URL, or the placeholder image.
    pub image_src: String,
    /// Hierarchical location, e.g. `PNG/Momase/Madang`.
    pub folder: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person_info: Option<PersonInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_by: Option<MatchSource>,
}
