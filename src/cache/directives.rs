//! `Cache-Control` directive parsing (spec §4.5).

/// Parsed `Cache-Control` directives relevant to this cache engine.
/// Unrecognized directives are ignored, matching the teacher's tolerant
/// header-parsing style in `execution/http/headers.rs`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheControlDirectives {
    pub max_age: Option<u64>,
    pub no_cache: bool,
    pub no_store: bool,
    pub must_revalidate: bool,
    pub public: bool,
    pub private: bool,
}

impl CacheControlDirectives {
    /// Case-insensitive, comma-separated, tolerant of surrounding whitespace.
    pub fn parse(header_value: &str) -> Self {
        let mut directives = Self::default();
        for token in header_value.split(',') {
            let token = token.trim();
            if token.is_empty() {
                continue;
            }
            let mut parts = token.splitn(2, '=');
            let name = parts.next().unwrap_or("").trim().to_ascii_lowercase();
            let value = parts.next().map(str::trim);

            match name.as_str() {
                "max-age" => {
                    if let Some(v) = value.and_then(|v| v.parse::<u64>().ok()) {
                        directives.max_age = Some(v);
                    }
                }
                "no-cache" => directives.no_cache = true,
                "no-store" => directives.no_store = true,
                "must-revalidate" => directives.must_revalidate = true,
                "public" => directives.public = true,
                "private" => directives.private = true,
                _ => {}
            }
        }
        directives
    }
}
