//! Permanent proxy URL construction.
//!
//! Permanent attachment URLs are an unsigned, slugified-filename route
//! keyed by the record's UUID. They are stable as long as the UUID is
//! stable and carry no secret; expiring access goes through the signed
//! token route built by `attache-crypto`.

use crate::models::AttachmentRecord;

/// Slugify a filename for URL embedding: lowercase, alphanumerics kept,
/// runs of anything else collapsed to a single hyphen, the extension
/// preserved.
pub fn slugify(filename: &str) -> String {
    let (stem, ext) = match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => (stem, Some(ext)),
        _ => (filename, None),
    };

    let mut slug = String::with_capacity(filename.len());
    let mut pending_hyphen = false;
    for c in stem.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }
    if slug.is_empty() {
        slug.push_str("file");
    }

    match ext {
        Some(ext) => format!("{}.{}", slug, ext.to_ascii_lowercase()),
        None => slug,
    }
}

/// Builds public URLs for attachment delivery routes.
#[derive(Debug, Clone)]
pub struct UrlBuilder {
    base_url: String,
}

impl UrlBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url }
    }

    /// Permanent proxy URL forcing download (`attachment` disposition).
    pub fn proxy_url(&self, record: &AttachmentRecord) -> String {
        format!(
            "{}/attachments/{}/{}",
            self.base_url,
            record.uuid,
            slugify(&record.filename)
        )
    }

    /// Permanent proxy URL rendering in the browser (`inline` disposition).
    pub fn proxy_url_inline(&self, record: &AttachmentRecord) -> String {
        format!(
            "{}/attachments/{}/inline/{}",
            self.base_url,
            record.uuid,
            slugify(&record.filename)
        )
    }

    /// Route for a signed, time-limited token issued by the URL signer.
    pub fn signed_url(&self, token: &str) -> String {
        format!("{}/attachments/signed/{}", self.base_url, token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn record(filename: &str) -> AttachmentRecord {
        AttachmentRecord {
            id: 1,
            uuid: "ABCDE1234F".to_string(),
            owner_type: None,
            owner_id: None,
            disk: "local".to_string(),
            filepath: "attachments/ABC/DE1/234/ABCDE1234F.jpg".to_string(),
            filename: filename.to_string(),
            filetype: "image/jpeg".to_string(),
            filesize: 1024,
            key: None,
            group: None,
            title: None,
            description: None,
            metadata: json!({}),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Holiday Photo.JPG"), "holiday-photo.jpg");
    }

    #[test]
    fn test_slugify_collapses_runs() {
        assert_eq!(slugify("a  --  b.png"), "a-b.png");
    }

    #[test]
    fn test_slugify_no_extension() {
        assert_eq!(slugify("README"), "readme");
    }

    #[test]
    fn test_slugify_degenerate() {
        assert_eq!(slugify("???.pdf"), "file.pdf");
    }

    #[test]
    fn test_proxy_url_variants() {
        let builder = UrlBuilder::new("https://example.test/");
        let rec = record("Holiday Photo.JPG");

        assert_eq!(
            builder.proxy_url(&rec),
            "https://example.test/attachments/ABCDE1234F/holiday-photo.jpg"
        );
        assert_eq!(
            builder.proxy_url_inline(&rec),
            "https://example.test/attachments/ABCDE1234F/inline/holiday-photo.jpg"
        );
    }

    #[test]
    fn test_proxy_url_stable_for_stable_uuid() {
        let builder = UrlBuilder::new("https://example.test");
        let rec = record("a.txt");
        assert_eq!(builder.proxy_url(&rec), builder.proxy_url(&rec));
    }

    #[test]
    fn test_signed_url_route() {
        let builder = UrlBuilder::new("https://example.test");
        assert_eq!(
            builder.signed_url("tok123"),
            "https://example.test/attachments/signed/tok123"
        );
    }
}
