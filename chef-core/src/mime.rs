use std::path::Path;

pub const DEFAULT_MIME: &str = "application/octet-stream";

const TABLE: &[(&str, &str)] = &[
    ("txt", "text/plain"),
    ("md", "text/markdown"),
    ("csv", "text/csv"),
    ("html", "text/html"),
    ("htm", "text/html"),
    ("css", "text/css"),
    ("js", "text/javascript"),
    ("json", "application/json"),
    ("xml", "application/xml"),
    ("pdf", "application/pdf"),
    ("zip", "application/zip"),
    ("gz", "application/gzip"),
    ("tar", "application/x-tar"),
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("svg", "image/svg+xml"),
    ("webp", "image/webp"),
    ("mp3", "audio/mpeg"),
    ("wav", "audio/wav"),
    ("mp4", "video/mp4"),
    ("emoji", "text/plain"),
];

/// Guess from the file extension; unknown extensions map to [`DEFAULT_MIME`].
pub fn guess(path: &Path) -> &'static str {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .and_then(|e| TABLE.iter().find(|(ext, _)| *ext == e).map(|(_, m)| *m))
        .unwrap_or(DEFAULT_MIME)
}

/// First extension registered for `mime`, without the dot.
pub fn extension_for(mime: &str) -> Option<&'static str> {
    TABLE.iter().find(|(_, m)| *m == mime).map(|(ext, _)| *ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guesses() {
        assert_eq!(guess(Path::new("a/b/Report.PDF")), "application/pdf");
        assert_eq!(guess(Path::new("noext")), DEFAULT_MIME);
        assert_eq!(extension_for("image/jpeg"), Some("jpg"));
        assert_eq!(extension_for("x-unknown/thing"), None);
    }
}
