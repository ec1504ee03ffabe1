//! Response content type negotiation.

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};

/// Content type used when the upstream does not declare one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Audio types looked for in the `icy-br` header.
const AUDIO_CONTENT_TYPES: [&str; 4] = ["audio/aac", "audio/mpeg", "audio/ogg", "audio/wav"];

/// Choose the `Content-Type` to send to the client.
///
/// The upstream value is passed through verbatim when present and
/// non-empty. Otherwise the default is used.
pub fn negotiate_content_type(headers: &HeaderMap) -> HeaderValue {
    if let Some(value) = headers.get(CONTENT_TYPE).filter(|v| !v.is_empty()) {
        return value.clone();
    }

    let inferred = infer_from_bitrate(headers).unwrap_or(DEFAULT_CONTENT_TYPE);
    HeaderValue::from_static(inferred)
}

/// Look for an audio type inside the `icy-br` value.
///
/// `icy-br` carries a numeric bitrate such as `128`, so no audio type is
/// ever a substring of it and this always yields `None`. Kept so that
/// enabling real inference is an explicit, visible behavior change.
fn infer_from_bitrate(headers: &HeaderMap) -> Option<&'static str> {
    let bitrate = headers
        .get("icy-br")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    AUDIO_CONTENT_TYPES
        .iter()
        .copied()
        .find(|content_type| bitrate.contains(content_type))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn upstream_content_type_passes_through() {
        let map = headers(&[("content-type", "audio/mpeg")]);
        assert_eq!(negotiate_content_type(&map), "audio/mpeg");
    }

    #[test]
    fn parameters_are_kept_verbatim() {
        let map = headers(&[("content-type", "audio/ogg; codecs=opus")]);
        assert_eq!(negotiate_content_type(&map), "audio/ogg; codecs=opus");
    }

    #[test]
    fn missing_content_type_falls_back_to_default() {
        assert_eq!(
            negotiate_content_type(&HeaderMap::new()),
            DEFAULT_CONTENT_TYPE
        );
    }

    #[test]
    fn empty_content_type_falls_back_to_default() {
        let map = headers(&[("content-type", "")]);
        assert_eq!(negotiate_content_type(&map), DEFAULT_CONTENT_TYPE);
    }

    #[test]
    fn bitrate_header_does_not_change_fallback() {
        let map = headers(&[("icy-br", "128"), ("icy-name", "KEXP")]);
        assert_eq!(negotiate_content_type(&map), DEFAULT_CONTENT_TYPE);
    }
}
