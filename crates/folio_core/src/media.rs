//! Data-URI transport for avatars, thumbnails and resume PDFs.
//!
//! Binary content is stored and exchanged as `data:<mime>;base64,<payload>`
//! text; there is no separate upload channel.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

pub const PDF_MIME: &str = "application/pdf";

const DATA_SCHEME: &str = "data:";
const BASE64_MARKER: &str = ";base64";

#[derive(Debug)]
pub enum MediaError {
    Io(std::io::Error),
    /// The file extension maps to no supported MIME type.
    UnsupportedType(String),
    /// The text is not a base64 data URI.
    Malformed(&'static str),
    Decode(base64::DecodeError),
}

impl Display for MediaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "{err}"),
            Self::UnsupportedType(extension) => {
                write!(f, "unsupported file type: `{extension}`")
            }
            Self::Malformed(details) => write!(f, "malformed data uri: {details}"),
            Self::Decode(err) => write!(f, "invalid base64 payload: {err}"),
        }
    }
}

impl Error for MediaError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Decode(err) => Some(err),
            Self::UnsupportedType(_) | Self::Malformed(_) => None,
        }
    }
}

impl From<std::io::Error> for MediaError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<base64::DecodeError> for MediaError {
    fn from(value: base64::DecodeError) -> Self {
        Self::Decode(value)
    }
}

/// Self-describing binary blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri {
    mime: String,
    data: Vec<u8>,
}

impl DataUri {
    pub fn new(mime: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            mime: mime.into(),
            data,
        }
    }

    /// Reads a local file, deriving the MIME type from its extension.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, MediaError> {
        let path = path.as_ref();
        let mime = mime_for_path(path).ok_or_else(|| {
            MediaError::UnsupportedType(
                path.extension()
                    .map(|ext| ext.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            )
        })?;
        Ok(Self::new(mime, std::fs::read(path)?))
    }

    /// Parses `data:<mime>;base64,<payload>`.
    pub fn parse(text: &str) -> Result<Self, MediaError> {
        let rest = text
            .strip_prefix(DATA_SCHEME)
            .ok_or(MediaError::Malformed("missing `data:` scheme"))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or(MediaError::Malformed("missing `,` separator"))?;
        let mime = header
            .strip_suffix(BASE64_MARKER)
            .ok_or(MediaError::Malformed("only base64 payloads are supported"))?;
        if mime.is_empty() {
            return Err(MediaError::Malformed("missing mime type"));
        }
        Ok(Self::new(mime, STANDARD.decode(payload.trim())?))
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn is_pdf(&self) -> bool {
        self.mime == PDF_MIME
    }
}

impl Display for DataUri {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{DATA_SCHEME}{}{BASE64_MARKER},{}",
            self.mime,
            STANDARD.encode(&self.data)
        )
    }
}

/// MIME type for the image and document extensions the console accepts.
pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "svg" => Some("image/svg+xml"),
        "pdf" => Some(PDF_MIME),
        _ => None,
    }
}

/// Returns a viewable PDF data URI for a stored resume payload.
///
/// Older uploads stored bare base64; those are wrapped with the PDF header.
pub fn pdf_view_uri(stored: &str) -> Option<String> {
    let stored = stored.trim();
    if stored.is_empty() {
        return None;
    }
    if stored.starts_with("data:application/pdf") {
        Some(stored.to_string())
    } else {
        Some(format!("{DATA_SCHEME}{PDF_MIME}{BASE64_MARKER},{stored}"))
    }
}

#[cfg(test)]
mod tests {
    use super::{mime_for_path, pdf_view_uri, DataUri, MediaError};
    use std::io::Write;
    use std::path::Path;

    #[test]
    fn display_and_parse_agree() {
        let uri = DataUri::new("image/png", vec![0x89, b'P', b'N', b'G']);
        let text = uri.to_string();
        assert!(text.starts_with("data:image/png;base64,"));
        assert_eq!(DataUri::parse(&text).unwrap(), uri);
    }

    #[test]
    fn parse_rejects_non_base64_and_missing_scheme() {
        assert!(matches!(
            DataUri::parse("data:text/plain,hello"),
            Err(MediaError::Malformed(_))
        ));
        assert!(matches!(
            DataUri::parse("image/png;base64,AAAA"),
            Err(MediaError::Malformed(_))
        ));
        assert!(matches!(
            DataUri::parse("data:image/png;base64,@@@"),
            Err(MediaError::Decode(_))
        ));
    }

    #[test]
    fn mime_lookup_is_case_insensitive() {
        assert_eq!(mime_for_path(Path::new("me.JPG")), Some("image/jpeg"));
        assert_eq!(mime_for_path(Path::new("cv.pdf")), Some("application/pdf"));
        assert_eq!(mime_for_path(Path::new("notes.txt")), None);
        assert_eq!(mime_for_path(Path::new("README")), None);
    }

    #[test]
    fn from_file_reads_bytes_and_rejects_unknown_types() {
        let dir = tempfile::tempdir().unwrap();
        let pdf_path = dir.path().join("resume.pdf");
        std::fs::File::create(&pdf_path)
            .unwrap()
            .write_all(b"%PDF-1.7")
            .unwrap();

        let uri = DataUri::from_file(&pdf_path).unwrap();
        assert!(uri.is_pdf());
        assert_eq!(uri.data(), b"%PDF-1.7");

        let err = DataUri::from_file(dir.path().join("notes.txt")).unwrap_err();
        assert!(matches!(err, MediaError::UnsupportedType(ext) if ext == "txt"));
    }

    #[test]
    fn pdf_view_uri_wraps_bare_base64_only() {
        assert_eq!(
            pdf_view_uri("JVBERi0=").as_deref(),
            Some("data:application/pdf;base64,JVBERi0=")
        );
        assert_eq!(
            pdf_view_uri("data:application/pdf;base64,JVBERi0=").as_deref(),
            Some("data:application/pdf;base64,JVBERi0=")
        );
        assert_eq!(pdf_view_uri("  "), None);
    }
}
