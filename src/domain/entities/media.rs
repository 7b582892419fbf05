use actix_multipart::form::{tempfile::TempFile, text::Text, MultipartForm};
use serde::{Deserialize, Serialize};

#[derive(Debug, MultipartForm)]
pub struct MediaUploadForm {
    pub file: TempFile,
    pub folder: Option<Text<String>>,
}

/// Coarse media class, sniffed from the file's magic bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Image,
    Video,
    Raw,
}

impl ResourceType {
    pub fn sniff(bytes: &[u8]) -> Self {
        match infer::get(bytes).map(|kind| kind.matcher_type()) {
            Some(infer::MatcherType::Image) => ResourceType::Image,
            Some(infer::MatcherType::Video) => ResourceType::Video,
            _ => ResourceType::Raw,
        }
    }
}

/// A file handed to the media uploader.
#[derive(Debug, Clone)]
pub struct MediaFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
    pub folder: String,
}

/// Publicly reachable location of an uploaded file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadedMedia {
    pub url: String,
    pub public_id: String,
    pub resource_type: ResourceType,
    pub bytes: usize,
}
