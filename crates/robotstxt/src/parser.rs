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

use itertools::Itertools;

use crate::pattern::maybe_escape_pattern;

const MAX_CHAR_LIMIT_DEFAULT: usize = 512_000; // 512 KB

// Certain browsers limit the URL length to 2083 bytes, and a valid line is
// not going to be many times longer than that. Bytes past this limit on a
// single line are ignored.
const MAX_LINE_LEN: usize = 2083 * 8;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, Clone, Copy)]
pub struct Params {
    /// Bytes of the body past this limit are ignored.
    pub char_limit: usize,
    /// Accept frequent key misspellings such as `disalow`.
    pub allow_frequent_typos: bool,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            char_limit: MAX_CHAR_LIMIT_DEFAULT,
            allow_frequent_typos: true,
        }
    }
}

/// Consumer of the directive stream produced by [`parse_robotstxt`].
///
/// All methods default to no-ops, so implementations only handle the events
/// they care about. Line numbers are 1-based. `user_agent` and `sitemap`
/// values are verbatim subslices of the body; all other values have been
/// canonicalized with [`crate::pattern::maybe_escape_pattern`].
pub trait ParseHandler {
    fn on_start(&mut self) {}
    fn on_end(&mut self) {}
    fn on_user_agent(&mut self, line_num: u32, value: &[u8]) {
        let _ = (line_num, value);
    }
    fn on_allow(&mut self, line_num: u32, value: &[u8]) {
        let _ = (line_num, value);
    }
    fn on_disallow(&mut self, line_num: u32, value: &[u8]) {
        let _ = (line_num, value);
    }
    fn on_sitemap(&mut self, line_num: u32, value: &[u8]) {
        let _ = (line_num, value);
    }
    fn on_crawl_delay(&mut self, line_num: u32, value: &[u8]) {
        let _ = (line_num, value);
    }
    fn on_unknown(&mut self, line_num: u32, key: &[u8], value: &[u8]) {
        let _ = (line_num, key, value);
    }
}

/// The key of a `key: value` directive line, classified from its text
/// representation including common misspellings. Unrecognized keys keep the
/// original text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key<'a> {
    UserAgent,
    Allow,
    Disallow,
    Sitemap,
    CrawlDelay,
    Unknown(&'a [u8]),
}

impl<'a> Key<'a> {
    pub fn parse(key: &'a [u8], allow_frequent_typos: bool) -> Self {
        if is_user_agent(key, allow_frequent_typos) {
            Key::UserAgent
        } else if is_allow(key) {
            Key::Allow
        } else if is_disallow(key, allow_frequent_typos) {
            Key::Disallow
        } else if is_sitemap(key) {
            Key::Sitemap
        } else if is_crawl_delay(key, allow_frequent_typos) {
            Key::CrawlDelay
        } else {
            Key::Unknown(key)
        }
    }
}

fn starts_with_ignore_case(key: &[u8], prefix: &str) -> bool {
    key.len() >= prefix.len() && key[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}

fn is_user_agent(key: &[u8], typos: bool) -> bool {
    starts_with_ignore_case(key, "user-agent")
        || (typos
            && (starts_with_ignore_case(key, "useragent")
                || starts_with_ignore_case(key, "user agent")))
}

fn is_allow(key: &[u8]) -> bool {
    starts_with_ignore_case(key, "allow")
}

fn is_disallow(key: &[u8], typos: bool) -> bool {
    starts_with_ignore_case(key, "disallow")
        || (typos
            && (starts_with_ignore_case(key, "dissallow")
                || starts_with_ignore_case(key, "dissalow")
                || starts_with_ignore_case(key, "disalow")
                || starts_with_ignore_case(key, "diasllow")
                || starts_with_ignore_case(key, "disallaw")))
}

fn is_sitemap(key: &[u8]) -> bool {
    starts_with_ignore_case(key, "sitemap") || starts_with_ignore_case(key, "site-map")
}

fn is_crawl_delay(key: &[u8], typos: bool) -> bool {
    starts_with_ignore_case(key, "crawl-delay")
        || (typos
            && (starts_with_ignore_case(key, "crawldelay")
                || starts_with_ignore_case(key, "crawl delay")))
}

/// Parses a robots.txt body and streams its directives to `handler`.
pub fn parse_robotstxt<H: ParseHandler>(robots_body: &[u8], handler: &mut H) {
    parse_robotstxt_with_params(robots_body, handler, Params::default());
}

pub fn parse_robotstxt_with_params<H: ParseHandler>(
    robots_body: &[u8],
    handler: &mut H,
    params: Params,
) {
    let body = &robots_body[..robots_body.len().min(params.char_limit)];

    handler.on_start();

    // UTF-8 byte order marks should never appear in a robots.txt file, but
    // they do nevertheless. Any leading prefix of one is skipped.
    let bom_len = body
        .iter()
        .zip(UTF8_BOM)
        .take_while(|(a, b)| a == b)
        .count();

    let mut line_start = bom_len;
    let mut line_num: u32 = 0;
    let mut last_was_carriage_return = false;

    for (i, &ch) in body.iter().enumerate().skip(bom_len) {
        if ch != b'\n' && ch != b'\r' {
            continue;
        }

        // The second byte of a DOS line ending must not produce an extra
        // empty line.
        let is_crlf_continuation = line_start == i && last_was_carriage_return && ch == b'\n';
        if !is_crlf_continuation {
            line_num += 1;
            parse_and_emit_line(&body[line_start..i], line_num, handler, &params);
        }
        line_start = i + 1;
        last_was_carriage_return = ch == b'\r';
    }

    // The final line may be unterminated.
    line_num += 1;
    parse_and_emit_line(&body[line_start..], line_num, handler, &params);

    handler.on_end();
}

fn parse_and_emit_line<H: ParseHandler>(
    line: &[u8],
    line_num: u32,
    handler: &mut H,
    params: &Params,
) {
    if line.len() > MAX_LINE_LEN {
        tracing::debug!("ignoring {} bytes past the line limit", line.len() - MAX_LINE_LEN);
    }
    let line = &line[..line.len().min(MAX_LINE_LEN)];

    let line = match line.iter().position(|&b| b == b'#') {
        Some(comment) => &line[..comment],
        None => line,
    };
    let line = line.trim_ascii();

    let Some((key, value)) = split_key_value(line) else {
        if !line.is_empty() {
            tracing::trace!("discarding malformed robots.txt line {line_num}");
        }
        return;
    };

    match Key::parse(key, params.allow_frequent_typos) {
        Key::UserAgent => handler.on_user_agent(line_num, value),
        Key::Sitemap => handler.on_sitemap(line_num, value),
        Key::Allow => handler.on_allow(line_num, &maybe_escape_pattern(value)),
        Key::Disallow => handler.on_disallow(line_num, &maybe_escape_pattern(value)),
        Key::CrawlDelay => handler.on_crawl_delay(line_num, &maybe_escape_pattern(value)),
        Key::Unknown(key) => handler.on_unknown(line_num, key, &maybe_escape_pattern(value)),
    }
}

// Directive lines match `<key>[ \t]*:[ \t]*<value>`. Some people forget the
// colon, so a run of spaces or tabs is accepted in its stead, but only if the
// line consists of exactly two fields.
fn split_key_value(line: &[u8]) -> Option<(&[u8], &[u8])> {
    let (key, value) = match line.iter().position(|&b| b == b':') {
        Some(sep) => (&line[..sep], &line[sep + 1..]),
        None => line
            .split(|&b| b == b' ' || b == b'\t')
            .filter(|field| !field.is_empty())
            .collect_tuple()?,
    };

    let key = key.trim_ascii();
    if key.is_empty() {
        return None;
    }

    Some((key, value.trim_ascii()))
}
