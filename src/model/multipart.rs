//! RFC 2388 multipart/form-data encoding (spec §3, §6).

/// A single part of a multipart body. The presence of `filename` toggles
/// file-upload semantics (adds `filename=` to `Content-Disposition`).
#[derive(Debug, Clone)]
pub struct MultipartPart {
    pub name: String,
    pub filename: Option<String>,
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl MultipartPart {
    pub fn text(name: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            filename: None,
            bytes: value.into(),
            mime_type: "text/plain".to_string(),
        }
    }

    pub fn file(
        name: impl Into<String>,
        filename: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
        mime_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            filename: Some(filename.into()),
            bytes: bytes.into(),
            mime_type: mime_type.into(),
        }
    }

    /// Builds a file part without an explicit MIME type, detecting it from
    /// the file's magic number and falling back to the filename's extension
    /// (`crate::utils::mime::guess_mime`), then `application/octet-stream`
    /// if neither yields a match.
    pub fn file_with_detected_mime(
        name: impl Into<String>,
        filename: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        let filename = filename.into();
        let bytes = bytes.into();
        let mime_type = crate::utils::guess_mime(Some(&bytes), Some(&filename));
        Self {
            name: name.into(),
            filename: Some(filename),
            bytes,
            mime_type,
        }
    }
}

/// Encode `parts` framed by `boundary`, producing the exact bytes a
/// `multipart/form-data; boundary=<boundary>` body should contain.
///
/// Each part is framed as:
/// `--<boundary>\r\n` `Content-Disposition: ...\r\n` `Content-Type: ...\r\n`
/// `\r\n` `<body>` `\r\n`, with a trailing `--<boundary>--\r\n`.
pub fn encode_multipart(parts: &[MultipartPart], boundary: &str) -> Vec<u8> {
    let mut out = Vec::new();
    for part in parts {
        out.extend_from_slice(format!("--{boundary}\r\n").as_bytes());

        let disposition = match &part.filename {
            Some(filename) => format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                part.name, filename
            ),
            None => format!("Content-Disposition: form-data; name=\"{}\"\r\n", part.name),
        };
        out.extend_from_slice(disposition.as_bytes());
        out.extend_from_slice(format!("Content-Type: {}\r\n", part.mime_type).as_bytes());
        out.extend_from_slice(b"\r\n");
        out.extend_from_slice(&part.bytes);
        out.extend_from_slice(b"\r\n");
    }
    out.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_text_and_file_parts_with_matching_boundary_count() {
        let parts = vec![
            MultipartPart::text("t", "hi"),
            MultipartPart::file("f", "a.bin", vec![0xFF, 0xD8], "image/jpeg"),
        ];
        let boundary = "Boundary-TEST";
        let encoded = encode_multipart(&parts, boundary);
        let text = String::from_utf8_lossy(&encoded);

        assert!(text.contains("Content-Disposition: form-data; name=\"t\""));
        assert!(text.contains("Content-Disposition: form-data; name=\"f\"; filename=\"a.bin\""));
        assert!(text.contains("Content-Type: image/jpeg"));
        assert!(encoded.windows(2).filter(|w| *w == b"\xFF\xD8").count() >= 1);
        assert!(text.ends_with(&format!("--{boundary}--\r\n")));

        // one opening delimiter per part plus one final closing delimiter.
        let occurrences = text.matches(boundary).count();
        assert_eq!(occurrences, parts.len() + 1);
    }

    #[test]
    fn file_with_detected_mime_sniffs_magic_number_over_extension() {
        let png_bytes = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        let part = MultipartPart::file_with_detected_mime("f", "photo.jpg", png_bytes);
        assert_eq!(part.mime_type, "image/png");
    }

    #[test]
    fn file_with_detected_mime_falls_back_to_extension_then_octet_stream() {
        let part = MultipartPart::file_with_detected_mime("f", "report.pdf", b"not really a pdf".to_vec());
        assert_eq!(part.mime_type, "application/pdf");

        let part = MultipartPart::file_with_detected_mime("f", "data.bin", b"\x00\x01\x02".to_vec());
        assert_eq!(part.mime_type, "application/octet-stream");
    }
}
