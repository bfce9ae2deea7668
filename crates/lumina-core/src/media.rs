use std::path::Path;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use tracing::debug;
use crate::error::{LuminaError, Result};

/// Largest portrait accepted for inline upload.
pub const MAX_PHOTO_BYTES: usize = 20 * 1024 * 1024;
/// Largest voice file accepted, matching the upload hint shown in the form.
pub const MAX_VOICE_BYTES: usize = 50 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Photo,
    Voice,
}

impl MediaKind {
    pub fn name(&self) -> &str {
        match self {
            Self::Photo => "Photo",
            Self::Voice => "Audio",
        }
    }

    pub fn max_bytes(&self) -> usize {
        match self {
            Self::Photo => MAX_PHOTO_BYTES,
            Self::Voice => MAX_VOICE_BYTES,
        }
    }

    /// File extensions offered in pickers
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Self::Photo => &["png", "jpg", "jpeg", "webp", "gif", "bmp"],
            Self::Voice => &["mp3", "wav", "m4a", "ogg", "webm", "aac", "flac"],
        }
    }
}

/// A user-selected file held in memory, ready to embed in a request.
#[derive(Clone, PartialEq, Eq)]
pub struct MediaFile {
    pub kind: MediaKind,
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for MediaFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaFile")
            .field("kind", &self.kind)
            .field("name", &self.name)
            .field("mime", &self.mime)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl MediaFile {
    pub async fn load(kind: MediaKind, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| kind.name().to_lowercase());

        debug!("Read {} bytes from {}", bytes.len(), path.display());
        Self::from_bytes(kind, name, bytes)
    }

    pub fn from_bytes(kind: MediaKind, name: impl Into<String>, bytes: Vec<u8>) -> Result<Self> {
        let name = name.into();
        check_size(kind, &name, bytes.len())?;

        let mime = match kind {
            MediaKind::Photo => image::guess_format(&bytes)
                .map(|format| format.to_mime_type().to_string())
                .map_err(|_| LuminaError::Validation(format!("'{}' is not a recognised image", name)))?,
            MediaKind::Voice => voice_mime(&name)
                .ok_or_else(|| LuminaError::Validation(format!("'{}' is not a supported audio file", name)))?
                .to_string(),
        };

        Ok(Self { kind, name, mime, bytes })
    }

    /// Parse a `data:<mime>;base64,<payload>` URL.
    pub fn from_data_url(kind: MediaKind, name: impl Into<String>, url: &str) -> Result<Self> {
        let name = name.into();
        let (header, payload) = url
            .strip_prefix("data:")
            .and_then(|rest| rest.split_once(','))
            .ok_or_else(|| LuminaError::Validation(format!("'{}' is not a data URL", name)))?;

        let mime = header
            .strip_suffix(";base64")
            .ok_or_else(|| LuminaError::Validation(format!("'{}' is not base64 encoded", name)))?;

        let bytes = STANDARD
            .decode(payload)
            .map_err(|e| LuminaError::Validation(format!("'{}' has an invalid payload: {}", name, e)))?;

        match kind {
            MediaKind::Photo => Self::from_bytes(kind, name, bytes),
            MediaKind::Voice => {
                if !mime.starts_with("audio/") {
                    return Err(LuminaError::Validation(format!("'{}' is not an audio data URL", name)));
                }
                check_size(kind, &name, bytes.len())?;
                Ok(Self { kind, name, mime: mime.to_string(), bytes })
            }
        }
    }

    pub fn base64_payload(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, self.base64_payload())
    }

    /// Decode a photo into a thumbnail that fits in `max_side` x `max_side`.
    pub fn preview(&self, max_side: u32) -> Result<image::RgbaImage> {
        if self.kind != MediaKind::Photo {
            return Err(LuminaError::Validation(format!("'{}' is not a photo", self.name)));
        }
        let decoded = image::load_from_memory(&self.bytes)
            .map_err(|e| LuminaError::Validation(format!("'{}' could not be decoded: {}", self.name, e)))?;
        Ok(decoded.thumbnail(max_side, max_side).to_rgba8())
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

fn check_size(kind: MediaKind, name: &str, len: usize) -> Result<()> {
    if len == 0 {
        return Err(LuminaError::Validation(format!("{} '{}' is empty", kind.name(), name)));
    }
    if len > kind.max_bytes() {
        return Err(LuminaError::Validation(format!(
            "{} '{}' is {} bytes, limit is {}",
            kind.name(), name, len, kind.max_bytes()
        )));
    }
    Ok(())
}

fn voice_mime(name: &str) -> Option<&'static str> {
    let ext = Path::new(name).extension()?.to_str()?.to_lowercase();
    let mime = match ext.as_str() {
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "m4a" => "audio/mp4",
        "ogg" => "audio/ogg",
        "webm" => "audio/webm",
        "aac" => "audio/aac",
        "flac" => "audio/flac",
        _ => return None,
    };
    Some(mime)
}
