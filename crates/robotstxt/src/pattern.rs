// robotstxt is an open source robots.txt parser and matcher.
// Copyright (C) 2026 the robotstxt developers
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use std::borrow::Cow;

use percent_encoding::percent_encode_byte;

/// Returns true if the URI path matches the pattern. The pattern is anchored
/// at the beginning of the path. `*` matches any (possibly empty) byte
/// sequence and `$` anchors the match to the end of the path; `$` is special
/// only as the last byte of the pattern.
///
/// Both path and pattern are webmaster-controlled, so the worst case has to
/// stay acceptable: `pos` holds the sorted set of path prefixes that the
/// pattern prefix consumed so far can reach, which bounds every step by
/// `|path|` and the whole match by `|path| * |pattern|`.
pub fn matches(path: &[u8], pattern: &[u8]) -> bool {
    let pathlen = path.len();
    let mut pos = Vec::with_capacity(pathlen + 1);
    pos.push(0usize);

    for (i, &pat) in pattern.iter().enumerate() {
        if pat == b'$' && i + 1 == pattern.len() {
            return pos.last() == Some(&pathlen);
        }

        if pat == b'*' {
            // Every position from the smallest reachable one onward becomes
            // reachable.
            let min = pos[0];
            pos.clear();
            pos.extend(min..=pathlen);
        } else {
            // Includes '$' when not at the end of the pattern.
            let mut kept = 0;
            for idx in 0..pos.len() {
                let p = pos[idx];
                if p < pathlen && path[p] == pat {
                    pos[kept] = p + 1;
                    kept += 1;
                }
            }
            pos.truncate(kept);
            if pos.is_empty() {
                return false;
            }
        }
    }

    true
}

/// Canonicalizes an allow/disallow pattern. Bytes outside the ASCII range are
/// %-escaped and existing `%xx` escapes are normalized to uppercase:
///
/// * `/SanJoséSellers` becomes `/SanJos%C3%A9Sellers`
/// * `%aa` becomes `%AA`
///
/// Most patterns need no rewrite and are returned as the borrowed input.
pub fn maybe_escape_pattern(value: &[u8]) -> Cow<'_, [u8]> {
    let mut needs_rewrite = false;
    let mut i = 0;
    while i < value.len() {
        if is_escape_sequence(value, i) {
            if value[i + 1].is_ascii_lowercase() || value[i + 2].is_ascii_lowercase() {
                needs_rewrite = true;
            }
            i += 3;
        } else {
            if value[i] & 0x80 != 0 {
                needs_rewrite = true;
            }
            i += 1;
        }
    }

    if !needs_rewrite {
        return Cow::Borrowed(value);
    }

    let mut escaped = Vec::with_capacity(value.len() * 3);
    let mut i = 0;
    while i < value.len() {
        if is_escape_sequence(value, i) {
            escaped.push(b'%');
            escaped.push(value[i + 1].to_ascii_uppercase());
            escaped.push(value[i + 2].to_ascii_uppercase());
            i += 3;
        } else {
            if value[i] & 0x80 != 0 {
                escaped.extend_from_slice(percent_encode_byte(value[i]).as_bytes());
            } else {
                escaped.push(value[i]);
            }
            i += 1;
        }
    }

    Cow::Owned(escaped)
}

fn is_escape_sequence(value: &[u8], i: usize) -> bool {
    value[i] == b'%'
        && i + 2 < value.len()
        && value[i + 1].is_ascii_hexdigit()
        && value[i + 2].is_ascii_hexdigit()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_empty_match() {
        assert!(matches(b"", b""));
        assert!(matches(b"foo", b""));
    }

    #[test]
    fn test_prefix_match() {
        let pattern = b"/foo/bar";
        assert!(matches(b"/foo/bar", pattern));
        assert!(matches(b"/foo/bar/", pattern));
        assert!(matches(b"/foo/bar/baz", pattern));
        assert!(matches(b"/foo/barbaz", pattern));
        assert!(!matches(b"/foo", pattern));
        assert!(!matches(b"/foo/baz", pattern));
    }

    #[test]
    fn test_wildcard_match() {
        let pattern = b"/foo/*/bar";
        assert!(matches(b"/foo/baz/bar", pattern));
        assert!(matches(b"/foo/baz/bar/baz", pattern));
        assert!(matches(b"/foo/baz/baz/bar/baz", pattern));
        assert!(matches(b"/foo//bar", pattern));
        assert!(!matches(b"/foo/bar", pattern));
        assert!(!matches(b"/foo/baz", pattern));

        let pattern = b"/foo/bar*";
        assert!(matches(b"/foo/bar", pattern));
        assert!(matches(b"/foo/barbaz", pattern));
        assert!(matches(b"/foo/bar/baz", pattern));
        assert!(!matches(b"/foo", pattern));

        let pattern = b"*/bar";
        assert!(matches(b"foo/bar", pattern));
        assert!(matches(b"foo/bar/", pattern));
        assert!(matches(b"foo/barbaz", pattern));
        assert!(matches(b"/bar", pattern));
        assert!(!matches(b"foo", pattern));
        assert!(!matches(b"foo/baz", pattern));
    }

    #[test]
    fn test_end_match() {
        let pattern = b"/foo/bar$";
        assert!(matches(b"/foo/bar", pattern));
        assert!(!matches(b"/foo/bar/", pattern));
        assert!(!matches(b"/foo/bar/baz", pattern));
        assert!(!matches(b"/foo", pattern));
        assert!(!matches(b"/foo/barbaz", pattern));
    }

    #[test]
    fn test_wildcard_end_match() {
        let pattern = b"/foo/*/bar$";
        assert!(matches(b"/foo/baz/bar", pattern));
        assert!(matches(b"/foo/baz/baz/bar", pattern));
        assert!(!matches(b"/foo/baz/bar/baz", pattern));
        assert!(!matches(b"/foo/bar", pattern));
        assert!(!matches(b"/foo/baz/bar/", pattern));

        let pattern = b"/foo/*$";
        assert!(matches(b"/foo/bar", pattern));
        assert!(matches(b"/foo/", pattern));
        assert!(matches(b"/foo/baz/baz", pattern));
        assert!(!matches(b"/foo", pattern));
        assert!(!matches(b"/bar/bar/", pattern));

        assert!(matches(b"AAA", b"*A$"));
    }

    #[test]
    fn test_multi_wildcard() {
        let pattern = b"/foo/*/bar/*/baz";
        assert!(matches(b"/foo/baz/bar/baz/baz", pattern));
        assert!(matches(b"/foo/baz/bar/baz/baz/baz", pattern));
        assert!(!matches(b"/foo/bar/baz/baz", pattern));

        let pattern = b"/foo/******/bar";
        assert!(matches(b"/foo/baz/bar", pattern));
        assert!(matches(b"/foo/baz/baz/baz/bar", pattern));
        assert!(!matches(b"/foo/bar", pattern));
    }

    // '$' anywhere but at the end of the pattern is an ordinary byte.
    #[test]
    fn test_dollar_mid_pattern_is_literal() {
        let pattern = b"/foo/bar$/baz";
        assert!(!matches(b"/foo/bar", pattern));
        assert!(!matches(b"/foo/bar/baz", pattern));
        assert!(matches(b"/foo/bar$/baz", pattern));

        let pattern = b"$";
        assert!(matches(b"", pattern));
        assert!(!matches(b"/foo", pattern));
    }

    #[test]
    fn test_adversarial_wildcards_terminate() {
        let pattern = [b"/".to_vec(), b"*a".repeat(1_000)].concat();
        let path = [b"/".to_vec(), b"a".repeat(10_000)].concat();

        assert!(matches(&path, &pattern));

        let pattern = [&pattern[..], &b"b"[..]].concat();
        assert!(!matches(&path, &pattern));
    }

    #[test]
    fn test_maybe_escape_pattern() {
        assert_eq!(
            maybe_escape_pattern(b"http://www.example.com").as_ref(),
            b"http://www.example.com"
        );
        assert_eq!(maybe_escape_pattern(b"/a/b/c").as_ref(), b"/a/b/c");
        assert_eq!(maybe_escape_pattern("á".as_bytes()).as_ref(), b"%C3%A1");
        assert_eq!(maybe_escape_pattern(b"%aa").as_ref(), b"%AA");
        assert_eq!(maybe_escape_pattern("aá".as_bytes()).as_ref(), b"a%C3%A1");
    }

    #[test]
    fn test_maybe_escape_pattern_borrows_when_clean() {
        assert!(std::matches!(
            maybe_escape_pattern(b"/foo/%2A"),
            Cow::Borrowed(_)
        ));
        assert!(std::matches!(
            maybe_escape_pattern(b"/foo/%2a"),
            Cow::Owned(_)
        ));
    }

    #[test]
    fn test_maybe_escape_pattern_truncated_escape() {
        // A '%' without two hex digits after it is kept as-is.
        assert_eq!(maybe_escape_pattern(b"/a%").as_ref(), b"/a%");
        assert_eq!(maybe_escape_pattern(b"/a%f").as_ref(), b"/a%f");
        assert_eq!(maybe_escape_pattern(b"/a%zz").as_ref(), b"/a%zz");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(8192))]

        #[test]
        fn proptest_identity(s in "[a-zA-Z0-9/]*") {
            prop_assert!(matches(s.as_bytes(), s.as_bytes()));
        }

        #[test]
        fn wildcard_end_matches_anything(path in "[a-zA-Z0-9/]*") {
            prop_assert!(matches(path.as_bytes(), b"*$"));
        }

        #[test]
        fn proptest_regex(pattern in "[a-zA-Z0-9/*$]{0,20}", path in "[a-zA-Z0-9/$]{0,40}") {
            let (body, anchored) = match pattern.strip_suffix('$') {
                Some(body) => (body, true),
                None => (pattern.as_str(), false),
            };

            let mut re = String::from("^");
            re.push_str(&regex::escape(body).replace("\\*", ".*"));
            if anchored {
                re.push('$');
            }
            let re = regex::Regex::new(&re).unwrap();

            prop_assert_eq!(matches(path.as_bytes(), pattern.as_bytes()), re.is_match(&path));
        }

        #[test]
        fn escape_idempotent(bytes in proptest::collection::vec(any::<u8>(), 0..256)) {
            let escaped = maybe_escape_pattern(&bytes).into_owned();
            let reescaped = maybe_escape_pattern(&escaped);
            prop_assert_eq!(reescaped.as_ref(), escaped.as_slice());
        }
    }
}
