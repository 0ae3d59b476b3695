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

/// Extracts the path (with params) and query part of a URL, removing scheme,
/// authority and fragment. The result always starts with `/`; an invalid URL
/// or one without a path yields `/`.
pub fn path_params_query(url: &str) -> Cow<'_, str> {
    // Initial two slashes (a protocol-relative URL) are ignored.
    let search_start = if url.starts_with("//") { 2 } else { 0 };

    let early_path = find_from(url, search_start, |c| matches!(c, '/' | '?' | ';'));
    let mut protocol_end = url[search_start..].find("://").map(|i| i + search_start);
    if let (Some(early), Some(protocol)) = (early_path, protocol_end) {
        if early < protocol {
            // The path, params or query start before "://", so "://" does not
            // terminate a scheme here.
            protocol_end = None;
        }
    }
    let scan_from = match protocol_end {
        Some(protocol) => protocol + 3,
        None => search_start,
    };

    let Some(path_start) = find_from(url, scan_from, |c| matches!(c, '/' | '?' | ';')) else {
        return Cow::Borrowed("/");
    };

    let hash_pos = find_from(url, search_start, |c| c == '#');
    if hash_pos.is_some_and(|hash| hash < path_start) {
        return Cow::Borrowed("/");
    }
    let path_end = hash_pos.unwrap_or(url.len());

    if !url[path_start..].starts_with('/') {
        // Prepend a slash if the result would start with e.g. '?'.
        return Cow::Owned(format!("/{}", &url[path_start..path_end]));
    }

    Cow::Borrowed(&url[path_start..path_end])
}

fn find_from(url: &str, start: usize, pred: impl Fn(char) -> bool) -> Option<usize> {
    url[start..].find(pred).map(|i| i + start)
}
