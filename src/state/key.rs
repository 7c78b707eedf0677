/// Stands in for `.` in state map keys, which cannot hold it
pub const DOT_ESCAPE: &str = "%%";

/// Turn a relative path into a state map key.
///
/// Paths that already contain `%%` (or a `%` right before a `.`) do not
/// survive `decode_key(encode_key(p))`.
pub fn encode_key(relative_path: &str) -> String {
    relative_path.replace('.', DOT_ESCAPE)
}

/// Turn a state map key back into the relative path it was made from
pub fn decode_key(key: &str) -> String {
    key.replace(DOT_ESCAPE, ".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_key() {
        assert_eq!(encode_key("index.html"), "index%%html");
        assert_eq!(encode_key("assets/app.min.js"), "assets/app%%min%%js");
        assert_eq!(encode_key("LICENSE"), "LICENSE");
    }

    #[test]
    fn test_round_trip() {
        for path in ["index.html", "a/b/c.d.e", ".hidden", "dir.v2/file", "trailing."] {
            assert_eq!(decode_key(&encode_key(path)), path);
        }
    }

    #[test]
    fn test_encode_is_injective_on_dot_paths() {
        assert_ne!(encode_key("a.b"), encode_key("a..b"));
        assert_ne!(encode_key("a.b"), encode_key("ab"));
    }

    #[test]
    fn test_literal_escape_collides() {
        // Known limitation: a path holding the escape itself decodes to a dot
        assert_eq!(decode_key(&encode_key("50%%off")), "50.off");
    }
}
