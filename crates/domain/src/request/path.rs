//! Path segment encoding.

/// Percent-encodes each path segment of `url` on its own and re-joins them.
///
/// Segments are decoded first so already-encoded input is not encoded twice;
/// bytes that do not form UTF-8 keep their escaped form. The scheme and
/// authority of an absolute URL and any query string or fragment following
/// the path are kept verbatim.
#[must_use]
pub fn encode_path(url: &str) -> String {
    let (origin, target) = split_origin(url);
    let split_at = target.find(['?', '#']).unwrap_or(target.len());
    let (path, rest) = target.split_at(split_at);

    let encoded: Vec<String> = path
        .split('/')
        .map(|segment| {
            let decoded = urlencoding::decode_binary(segment.as_bytes());
            urlencoding::encode_binary(&decoded).into_owned()
        })
        .collect();

    format!("{origin}{}{rest}", encoded.join("/"))
}

/// Splits `scheme://authority` off an absolute URL.
fn split_origin(url: &str) -> (&str, &str) {
    url.find("://").map_or(("", url), |scheme_end| {
        let authority_start = scheme_end + 3;
        let path_start = url[authority_start..]
            .find(['/', '?', '#'])
            .map_or(url.len(), |offset| authority_start + offset);
        url.split_at(path_start)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_plain_path_is_unchanged() {
        assert_eq!(encode_path("/api/v1/members"), "/api/v1/members");
    }

    #[test]
    fn test_reserved_characters_are_encoded_per_segment() {
        assert_eq!(
            encode_path("/api/v1/members/a b#c"),
            "/api/v1/members/a%20b#c"
        );
        assert_eq!(encode_path("/api/v1/members/王小明"), "/api/v1/members/%E7%8E%8B%E5%B0%8F%E6%98%8E");
    }

    #[test]
    fn test_already_encoded_is_not_double_encoded() {
        assert_eq!(encode_path("/members/a%20b"), "/members/a%20b");
        assert_eq!(encode_path("/members/%FF"), "/members/%FF");
    }

    #[test]
    fn test_query_is_kept() {
        assert_eq!(encode_path("/members/x y?a=1"), "/members/x%20y?a=1");
    }

    #[test]
    fn test_absolute_url_keeps_scheme_and_authority() {
        assert_eq!(
            encode_path("http://example.com:8080/a b/c?x=1"),
            "http://example.com:8080/a%20b/c?x=1"
        );
        assert_eq!(encode_path("http://example.com"), "http://example.com");
    }
}
