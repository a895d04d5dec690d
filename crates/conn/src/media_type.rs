use http::HeaderValue;
use mime::Mime;
use std::fmt;

/// The catalog of media types a response can declare through `Content-Type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaType {
    ApplicationFormUrlEncoded,
    ApplicationJson,
    ApplicationJavascript,
    ApplicationOctetStream,
    ApplicationXml,
    ImageGif,
    ImageJpeg,
    ImagePng,
    MultipartFormData,
    TextCsv,
    TextHtml,
    TextPlain,
    TextXml,
}

impl MediaType {
    pub const ALL: [MediaType; 13] = [
        MediaType::ApplicationFormUrlEncoded,
        MediaType::ApplicationJson,
        MediaType::ApplicationJavascript,
        MediaType::ApplicationOctetStream,
        MediaType::ApplicationXml,
        MediaType::ImageGif,
        MediaType::ImageJpeg,
        MediaType::ImagePng,
        MediaType::MultipartFormData,
        MediaType::TextCsv,
        MediaType::TextHtml,
        MediaType::TextPlain,
        MediaType::TextXml,
    ];

    /// The wire representation used in the `Content-Type` header.
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::ApplicationFormUrlEncoded => "application/x-www-form-urlencoded",
            MediaType::ApplicationJson => "application/json",
            MediaType::ApplicationJavascript => "application/javascript",
            MediaType::ApplicationOctetStream => "application/octet-stream",
            MediaType::ApplicationXml => "application/xml",
            MediaType::ImageGif => "image/gif",
            MediaType::ImageJpeg => "image/jpeg",
            MediaType::ImagePng => "image/png",
            MediaType::MultipartFormData => "multipart/form-data",
            MediaType::TextCsv => "text/csv",
            MediaType::TextHtml => "text/html",
            MediaType::TextPlain => "text/plain",
            MediaType::TextXml => "text/xml",
        }
    }

    /// Looks up the catalog entry for a parsed mime, ignoring its parameters.
    pub fn from_mime(mime: &Mime) -> Option<MediaType> {
        let essence = mime.essence_str();
        MediaType::ALL.into_iter().find(|media_type| media_type.as_str() == essence)
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<MediaType> for HeaderValue {
    fn from(media_type: MediaType) -> Self {
        HeaderValue::from_static(media_type.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_strings() {
        assert_eq!(MediaType::ApplicationXml.as_str(), "application/xml");
        assert_eq!(MediaType::ApplicationJson.as_str(), "application/json");
        assert_eq!(MediaType::TextPlain.to_string(), "text/plain");
    }

    #[test]
    fn test_every_entry_is_a_valid_mime() {
        for media_type in MediaType::ALL {
            let mime: Mime = media_type.as_str().parse().unwrap();
            assert_eq!(MediaType::from_mime(&mime), Some(media_type));
        }
    }

    #[test]
    fn test_from_mime_ignores_params() {
        assert_eq!(MediaType::from_mime(&mime::APPLICATION_JSON), Some(MediaType::ApplicationJson));
        assert_eq!(MediaType::from_mime(&mime::TEXT_PLAIN_UTF_8), Some(MediaType::TextPlain));
        assert_eq!(MediaType::from_mime(&mime::APPLICATION_PDF), None);
    }
}
