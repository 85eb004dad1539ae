//! [`Image`] definitions.

use std::{str::FromStr, sync::LazyLock};

use base64::Engine as _;
use common::{unit, DateTimeOf};
use derive_more::{AsRef, Display, Error};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use regex::Regex;
use serde::Serialize;
use xxhash_rust::xxh3::xxh3_128;

/// Name given to an uploaded file when the client provides none.
pub const DEFAULT_UPLOAD_NAME: &str = "image.jpg";

/// Image ready to be put into a storage.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Image {
    /// Content-addressed [`FileName`] of this [`Image`].
    pub name: FileName,

    /// Raw bytes of this [`Image`].
    pub content: Vec<u8>,
}

impl Image {
    /// Creates a new [`Image`] of the given [`Format`].
    ///
    /// Identical `content` always results in the same [`FileName`].
    #[must_use]
    pub fn new(format: Format, content: Vec<u8>) -> Self {
        let hash = xxh3_128(&content);
        Self {
            name: FileName(format!("{hash:032x}.{}", format.extension())),
            content,
        }
    }

    /// Decodes an [`Image`] from the `data_url` uploaded by a client under
    /// the `file_name`.
    ///
    /// Everything before the first `,` of the `data_url` is ignored, the rest
    /// must be [Base64]-encoded.
    ///
    /// # Errors
    ///
    /// If the `data_url` carries no data or isn't valid [Base64].
    ///
    /// [Base64]: https://datatracker.ietf.org/doc/html/rfc4648
    pub fn decode(
        file_name: &str,
        data_url: &str,
    ) -> Result<Self, DecodeError> {
        let encoded = data_url
            .split_once(',')
            .map_or(data_url, |(_, data)| data)
            .trim();
        if encoded.is_empty() {
            return Err(DecodeError::Empty);
        }

        let content = base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(DecodeError::Base64)?;
        if content.is_empty() {
            return Err(DecodeError::Empty);
        }

        Ok(Self::new(Format::from_file_name(file_name), content))
    }

    /// Returns the [`Format`] of this [`Image`].
    #[must_use]
    pub fn format(&self) -> Format {
        self.name.format()
    }
}

/// Error of [`Image::decode()`].
#[derive(Debug, Display, Error)]
pub enum DecodeError {
    /// No data provided.
    #[display("No file data provided")]
    Empty,

    /// Data is not a valid Base64.
    #[display("Invalid Base64 data: {_0}")]
    Base64(base64::DecodeError),
}

/// Supported [`Image`] format.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Format {
    /// [JPEG](https://jpeg.org/jpeg).
    Jpeg,

    /// [PNG](https://www.w3.org/TR/png).
    Png,

    /// [GIF](https://www.w3.org/Graphics/GIF/spec-gif89a.txt).
    Gif,

    /// [WebP](https://developers.google.com/speed/webp).
    Webp,
}

impl Format {
    /// Detects the [`Format`] by the extension of the given `file_name`.
    ///
    /// Unknown extensions are treated as [`Format::Jpeg`].
    #[must_use]
    pub fn from_file_name(file_name: &str) -> Self {
        let ext = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase());
        match ext.as_deref() {
            Some("png") => Self::Png,
            Some("gif") => Self::Gif,
            Some("webp") => Self::Webp,
            _ => Self::Jpeg,
        }
    }

    /// Returns the file extension of this [`Format`].
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Gif => "gif",
            Self::Webp => "webp",
        }
    }

    /// Returns the [MIME type] of this [`Format`].
    ///
    /// [MIME type]: https://developer.mozilla.org/docs/Web/HTTP/MIME_types
    #[must_use]
    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Gif => "image/gif",
            Self::Webp => "image/webp",
        }
    }
}

/// Name of an [`Image`] file inside a storage.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str)]
pub struct FileName(String);

impl FileName {
    /// Returns the [`Format`] of the file.
    #[must_use]
    pub fn format(&self) -> Format {
        Format::from_file_name(&self.0)
    }
}

impl FromStr for FileName {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        /// Regular expression checking [`FileName`] format.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^[0-9a-f]{32}\.(jpg|png|gif|webp)$")
                .expect("valid regex")
        });

        REGEX
            .is_match(s)
            .then(|| Self(s.to_owned()))
            .ok_or("invalid `FileName`")
    }
}

/// Reference to an image, embedded into listings.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq, Serialize)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[serde(transparent)]
pub struct Url(String);

impl Url {
    /// Creates a new [`Url`] if the given `url` is valid.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Option<Self> {
        let url = url.into();
        Self::check(&url).then_some(Self(url))
    }

    /// Builds the public [`Url`] of the stored file with the given
    /// [`FileName`].
    #[must_use]
    pub fn of_stored(public_base: &str, name: &FileName) -> Self {
        Self(format!("{}/{name}", public_base.trim_end_matches('/')))
    }

    /// Checks whether the given `url` is a valid [`Url`].
    fn check(url: impl AsRef<str>) -> bool {
        let url = url.as_ref();
        (url.starts_with("https://")
            || url.starts_with("http://")
            || url.starts_with('/'))
            && url.len() <= 2048
            && !url.chars().any(char::is_whitespace)
    }
}

impl FromStr for Url {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Url`")
    }
}

/// [`Image`] file residing in a storage.
#[derive(Clone, Debug)]
pub struct Stored {
    /// [`FileName`] of the stored file.
    pub name: FileName,

    /// When the file was last modified.
    pub modified_at: ModificationDateTime,
}

/// Date and time when a [`Stored`] image was last modified.
pub type ModificationDateTime = DateTimeOf<(Stored, unit::Modification)>;

#[cfg(test)]
mod spec {
    use super::{DecodeError, FileName, Format, Image, Url};

    #[test]
    fn detects_format_by_extension() {
        assert_eq!(Format::from_file_name("room.PNG"), Format::Png);
        assert_eq!(Format::from_file_name("a.b.webp"), Format::Webp);
        assert_eq!(Format::from_file_name("anim.gif"), Format::Gif);
        assert_eq!(Format::from_file_name("photo.jpeg"), Format::Jpeg);
        assert_eq!(Format::from_file_name("scan.tiff"), Format::Jpeg);
        assert_eq!(Format::from_file_name("noext"), Format::Jpeg);
    }

    #[test]
    fn decodes_data_url() {
        let image =
            Image::decode("cover.png", "data:image/png;base64,aGVsbG8=")
                .unwrap();

        assert_eq!(image.content, b"hello");
        assert_eq!(image.format(), Format::Png);
        assert!(image.name.as_ref().ends_with(".png"));
    }

    #[test]
    fn decodes_bare_base64() {
        let image = Image::decode("x.jpg", "aGVsbG8=").unwrap();

        assert_eq!(image.content, b"hello");
    }

    #[test]
    fn names_are_content_addressed() {
        let a = Image::new(Format::Jpeg, b"same".to_vec());
        let b = Image::new(Format::Jpeg, b"same".to_vec());
        let c = Image::new(Format::Jpeg, b"other".to_vec());

        assert_eq!(a.name, b.name);
        assert_ne!(a.name, c.name);
        assert!(a.name.as_ref().parse::<FileName>().is_ok());
    }

    #[test]
    fn rejects_empty_and_malformed_data() {
        assert!(matches!(
            Image::decode("x.jpg", "data:image/jpeg;base64,"),
            Err(DecodeError::Empty),
        ));
        assert!(matches!(
            Image::decode("x.jpg", "data:image/jpeg;base64,@@@"),
            Err(DecodeError::Base64(_)),
        ));
    }

    #[test]
    fn builds_public_url_of_stored_file() {
        let image = Image::new(Format::Webp, vec![1, 2, 3]);

        let url = Url::of_stored("http://localhost:8080/images/", &image.name);

        assert_eq!(
            url.to_string(),
            format!("http://localhost:8080/images/{}", image.name),
        );
    }

    #[test]
    fn url_format() {
        assert!(Url::new("https://cdn.example.com/a.jpg").is_some());
        assert!(Url::new("/images/a.jpg").is_some());
        assert!(Url::new("").is_none());
        assert!(Url::new("ftp://host/a.jpg").is_none());
        assert!(Url::new("https://host/a b.jpg").is_none());
    }
}
