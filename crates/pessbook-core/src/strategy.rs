//! Heuristics that join a face match back to a stored image.
//!
//! Each strategy is pure: it sees the candidate and the index and either
//! names an image key or declines. The resolver runs them in
//! [`DEFAULT_CHAIN`] order and keeps the first answer.

use crate::index::BlobIndex;
use crate::naming::parent_folder;
use crate::types::{FaceMatchCandidate, MatchSource, PersonInfo};

/// Characters of the face id used by the last-resort prefix scan.
pub const FACE_PREFIX_LEN: usize = 8;

/// A candidate together with its decoded metadata, if any.
#[derive(Debug, Clone, Copy)]
pub struct Subject<'a> {
    pub candidate: &'a FaceMatchCandidate,
    pub person_info: Option<&'a PersonInfo>,
}

impl<'a> Subject<'a> {
    fn external_id(&self) -> Option<&'a str> {
        self.candidate.external_id.as_deref().filter(|id| !id.is_empty())
    }
}

/// The image key a strategy settled on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub key: String,
    /// Folder attribution; `None` leaves the search root in place.
    pub folder: Option<String>,
    pub source: MatchSource,
}

impl Resolution {
    fn attributed(key: &str, source: MatchSource) -> Self {
        Self {
            key: key.to_string(),
            folder: parent_folder(key).map(str::to_string),
            source,
        }
    }
}

pub trait Strategy: Send + Sync {
    fn source(&self) -> MatchSource;
    fn resolve(&self, subject: &Subject<'_>, index: &BlobIndex) -> Option<Resolution>;
}

/// Decode a `{...}` external identifier. Anything else, or invalid JSON, yields `None`.
pub fn parse_person_info(external_id: &str) -> Option<PersonInfo> {
    if !(external_id.starts_with('{') && external_id.ends_with('}')) {
        return None;
    }
    match serde_json::from_str::<PersonInfo>(external_id) {
        Ok(info) => Some(info),
        Err(e) => {
            tracing::debug!(error = %e, "external id looks structured but did not parse");
            None
        }
    }
}

/// Step 1: the metadata names the blob key directly; the index is not consulted.
pub struct StructuredMetadata;

impl Strategy for StructuredMetadata {
    fn source(&self) -> MatchSource {
        MatchSource::StructuredMetadata
    }

    fn resolve(&self, subject: &Subject<'_>, _index: &BlobIndex) -> Option<Resolution> {
        let info = subject.person_info?;
        let key = info.s3_key.as_deref().filter(|k| !k.is_empty())?;
        let mut resolution = Resolution::attributed(key, self.source());
        if let Some(hint) = info.s3_folder.as_deref().filter(|f| !f.is_empty()) {
            resolution.folder = Some(hint.to_string());
        }
        Some(resolution)
    }
}

/// Step 2: `PNG:Momase:Madang:John_Doe.jpg` names `PNG/Momase/Madang/John_Doe.jpg`.
pub struct ColonPath;

impl Strategy for ColonPath {
    fn source(&self) -> MatchSource {
        MatchSource::ColonPath
    }

    fn resolve(&self, subject: &Subject<'_>, index: &BlobIndex) -> Option<Resolution> {
        let id = subject.external_id()?;
        if !id.contains(':') {
            return None;
        }
        let path = id.replace(':', "/");

        if let Some(entry) = index.get(&path) {
            return Some(Resolution::attributed(&entry.key, self.source()));
        }

        // The listing root may carry a prefix the identifier does not.
        let suffix = format!("/{path}");
        index
            .iter()
            .map(|(_, entry)| entry)
            .find(|entry| entry.key == path || entry.key.ends_with(&suffix))
            .map(|entry| Resolution::attributed(&entry.key, self.source()))
    }
}

/// Step 3: the identifier was stored verbatim as the blob key or tag.
pub struct VerbatimKey;

impl Strategy for VerbatimKey {
    fn source(&self) -> MatchSource {
        MatchSource::VerbatimKey
    }

    fn resolve(&self, subject: &Subject<'_>, index: &BlobIndex) -> Option<Resolution> {
        let id = subject.external_id()?;
        index
            .get(id)
            .map(|entry| Resolution::attributed(&entry.key, self.source()))
    }
}

/// Step 4: any lookup key containing the first characters of the face id.
///
/// Loose by nature: unrelated images that happen to share the prefix will
/// match. The result never attributes a folder.
pub struct FacePrefix;

impl Strategy for FacePrefix {
    fn source(&self) -> MatchSource {
        MatchSource::FacePrefix
    }

    fn resolve(&self, subject: &Subject<'_>, index: &BlobIndex) -> Option<Resolution> {
        let prefix: String = subject.candidate.face_id.chars().take(FACE_PREFIX_LEN).collect();
        if prefix.is_empty() {
            return None;
        }
        index
            .iter()
            .find(|(lookup_key, _)| lookup_key.contains(prefix.as_str()))
            .map(|(_, entry)| Resolution {
                key: entry.key.clone(),
                folder: None,
                source: self.source(),
            })
    }
}

pub static DEFAULT_CHAIN: [&dyn Strategy; 4] =
    [&StructuredMetadata, &ColonPath, &VerbatimKey, &FacePrefix];

/// Run `chain` in order and return the first resolution.
pub fn first_resolution(
    chain: &[&dyn Strategy],
    subject: &Subject<'_>,
    index: &BlobIndex,
) -> Option<Resolution> {
    chain.iter().find_map(|strategy| strategy.resolve(subject, index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BlobEntry;

    fn candidate(face_id: &str, external_id: Option<&str>) -> FaceMatchCandidate {
        FaceMatchCandidate::new(face_id, 90.0, external_id)
    }

    fn subject<'a>(c: &'a FaceMatchCandidate, info: Option<&'a PersonInfo>) -> Subject<'a> {
        Subject { candidate: c, person_info: info }
    }

    #[test]
    fn test_parse_person_info_requires_braces() {
        assert!(parse_person_info("PNG:a:b.jpg").is_none());
        assert!(parse_person_info(r#"{"name":"A"}"#).is_some());
        assert!(parse_person_info(r#"  {"name":"A"}  "#).is_none());
    }

    #[test]
    fn test_parse_person_info_swallows_invalid_json() {
        assert!(parse_person_info("{not json}").is_none());
        assert!(parse_person_info("[1, 2]").is_none());
    }

    #[test]
    fn test_non_string_name_still_resolves_structured() {
        let ext = r#"{"name":42,"s3Key":"PNG/x/y/jane.jpg","s3Folder":"PNG/x/y"}"#;
        let c = candidate("f1", Some(ext));
        let info = parse_person_info(ext);
        assert!(info.is_some());
        let index = BlobIndex::default();
        let r = first_resolution(&DEFAULT_CHAIN, &subject(&c, info.as_ref()), &index).unwrap();
        assert_eq!(r.source, MatchSource::StructuredMetadata);
        assert_eq!(r.folder.as_deref(), Some("PNG/x/y"));
    }

    #[test]
    fn test_structured_uses_folder_hint() {
        let c = candidate("f1", None);
        let info = PersonInfo {
            s3_key: Some("PNG/x/y/jane.jpg".into()),
            s3_folder: Some("PNG/x".into()),
            ..PersonInfo::default()
        };
        let r = StructuredMetadata
            .resolve(&subject(&c, Some(&info)), &BlobIndex::default())
            .unwrap();
        assert_eq!(r.key, "PNG/x/y/jane.jpg");
        assert_eq!(r.folder.as_deref(), Some("PNG/x"));
    }

    #[test]
    fn test_structured_without_hint_uses_parent() {
        let c = candidate("f1", None);
        let info = PersonInfo {
            s3_key: Some("PNG/x/y/jane.jpg".into()),
            ..PersonInfo::default()
        };
        let r = StructuredMetadata
            .resolve(&subject(&c, Some(&info)), &BlobIndex::default())
            .unwrap();
        assert_eq!(r.folder.as_deref(), Some("PNG/x/y"));
    }

    #[test]
    fn test_structured_declines_without_key() {
        let c = candidate("f1", None);
        let info = PersonInfo {
            name: Some("Jane".into()),
            ..PersonInfo::default()
        };
        assert!(StructuredMetadata
            .resolve(&subject(&c, Some(&info)), &BlobIndex::default())
            .is_none());
    }

    #[test]
    fn test_colon_path_exact() {
        let index = BlobIndex::build(&[BlobEntry::new("PNG/Momase/Madang/John_Doe.jpg")]);
        let c = candidate("f1", Some("PNG:Momase:Madang:John_Doe.jpg"));
        let r = ColonPath.resolve(&subject(&c, None), &index).unwrap();
        assert_eq!(r.key, "PNG/Momase/Madang/John_Doe.jpg");
        assert_eq!(r.folder.as_deref(), Some("PNG/Momase/Madang"));
    }

    #[test]
    fn test_colon_path_suffix_scan() {
        let index = BlobIndex::build(&[
            BlobEntry::new("archive/PNG/Islands/Kavieng/Rose_Tom.jpg"),
            BlobEntry::new("faces/Momase/Madang/John_Doe.jpg"),
        ]);
        let c = candidate("f1", Some("Momase:Madang:John_Doe.jpg"));
        let r = ColonPath.resolve(&subject(&c, None), &index).unwrap();
        assert_eq!(r.key, "faces/Momase/Madang/John_Doe.jpg");
        assert_eq!(r.folder.as_deref(), Some("faces/Momase/Madang"));
    }

    #[test]
    fn test_colon_path_suffix_needs_segment_boundary() {
        let index = BlobIndex::build(&[BlobEntry::new("PNG/XMadang/John_Doe.jpg")]);
        let c = candidate("f1", Some("Madang:John_Doe.jpg"));
        assert!(ColonPath.resolve(&subject(&c, None), &index).is_none());
    }

    #[test]
    fn test_colon_path_first_match_in_listing_order() {
        let index = BlobIndex::build(&[
            BlobEntry::new("a/Madang/John.jpg"),
            BlobEntry::new("b/Madang/John.jpg"),
        ]);
        let c = candidate("f1", Some("Madang:John.jpg"));
        let r = ColonPath.resolve(&subject(&c, None), &index).unwrap();
        assert_eq!(r.key, "a/Madang/John.jpg");
    }

    #[test]
    fn test_verbatim_key_matches_tag() {
        let index = BlobIndex::build(&[BlobEntry::tagged("PNG/NCD/peter.jpg", "peter-kua")]);
        let c = candidate("f1", Some("peter-kua"));
        let r = VerbatimKey.resolve(&subject(&c, None), &index).unwrap();
        assert_eq!(r.key, "PNG/NCD/peter.jpg");
        assert_eq!(r.folder.as_deref(), Some("PNG/NCD"));
    }

    #[test]
    fn test_face_prefix_leaves_folder() {
        let index = BlobIndex::build(&[BlobEntry::new("PNG/x/face-1a2b3c4d.jpg")]);
        let c = candidate("1a2b3c4d-5e6f-7788-99aa-bbccddeeff00", None);
        let r = FacePrefix.resolve(&subject(&c, None), &index).unwrap();
        assert_eq!(r.key, "PNG/x/face-1a2b3c4d.jpg");
        assert!(r.folder.is_none());
    }

    #[test]
    fn test_face_prefix_empty_face_id() {
        let index = BlobIndex::build(&[BlobEntry::new("PNG/x/a.jpg")]);
        let c = candidate("", None);
        assert!(FacePrefix.resolve(&subject(&c, None), &index).is_none());
    }

    #[test]
    fn test_chain_prefers_structured_over_colon_path() {
        let ext = r#"{"name":"Jane Smith","s3Key":"PNG/x/y/jane.jpg","s3Folder":"PNG/x/y"}"#;
        let index = BlobIndex::build(&[BlobEntry::new(ext.replace(':', "/"))]);
        let c = candidate("f1", Some(ext));
        let info = parse_person_info(ext);
        let p = subject(&c, info.as_ref());
        assert!(ColonPath.resolve(&p, &index).is_some());
        let r = first_resolution(&DEFAULT_CHAIN, &p, &index).unwrap();
        assert_eq!(r.source, MatchSource::StructuredMetadata);
        assert_eq!(r.key, "PNG/x/y/jane.jpg");
    }

    #[test]
    fn test_chain_declines_when_nothing_matches() {
        let index = BlobIndex::build(&[BlobEntry::new("PNG/x/a.jpg")]);
        let c = candidate("zzzzzzzz", Some("nobody"));
        assert!(first_resolution(&DEFAULT_CHAIN, &subject(&c, None), &index).is_none());
    }
}
