use serde::{Deserialize, Serialize};

/// Maximum image size for participants, partners and standalone uploads.
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;
/// Maximum image size for quote request photos.
pub const QUOTE_MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

pub const ALLOWED_IMAGE_TYPES: [&str; 4] = ["image/jpeg", "image/jpg", "image/png", "image/webp"];

/// Server-side resize/quality/format normalization applied at upload time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransformProfile {
    pub folder: &'static str,
    pub max_width: u32,
    pub max_height: u32,
    pub quality: &'static str,
    pub format: &'static str,
}

impl TransformProfile {
    pub const PARTICIPANT: Self = Self::bounded("bambou/participants", 800);
    pub const PARTNER: Self = Self::bounded("bambou/partners", 600);
    pub const QUOTE: Self = Self::bounded("bambou/quotes", 1000);
    pub const UPLOAD: Self = Self::bounded("bambou/uploads", 1200);

    const fn bounded(folder: &'static str, side: u32) -> Self {
        Self {
            folder,
            max_width: side,
            max_height: side,
            quality: "auto",
            format: "jpg",
        }
    }

    /// Cloudinary transformation string, e.g. `c_limit,w_800,h_800/q_auto/f_jpg`.
    pub fn transformation(&self) -> String {
        format!(
            "c_limit,w_{},h_{}/q_{}/f_{}",
            self.max_width, self.max_height, self.quality, self.format
        )
    }
}

/// An in-memory image received from a multipart form.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub bytes: bytes::Bytes,
    pub content_type: String,
    pub file_name: Option<String>,
}

/// Asset created by the object-storage provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredImage {
    pub url: String,
    pub storage_id: String,
    pub format: Option<String>,
    pub bytes: Option<u64>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}
