//! Smol utilities for logging

use std::ascii;

/// Make an Ascii-safe string
pub fn ascii_escape(s: &[u8]) -> String {
    s.iter()
        .flat_map(|&b| ascii::escape_default(b))
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn escapes_control_and_high_bytes() {
        assert_eq!(ascii_escape(b"/a b"), "/a b");
        assert_eq!(ascii_escape(b"x\r\n\"\xff"), "x\\r\\n\\\"\\xff");
    }
}
