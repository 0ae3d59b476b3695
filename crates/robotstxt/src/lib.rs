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

//! A robots.txt parser and matcher implementing the expired
//! [robots.txt internet draft](http://www.robotstxt.org/norobots-rfc.txt)
//! together with the widely deployed operator extensions ([RFC
//! 9309](https://www.rfc-editor.org/rfc/rfc9309.html)-style wildcards,
//! longest-match precedence, typo tolerance).
//!
//! The crate is a single-pass streaming engine: [`parse_robotstxt`] tokenizes
//! a body into directives and feeds them to a [`ParseHandler`], and
//! [`RobotsMatcher`] is the handler that turns that stream into an
//! allowed/disallowed verdict for a URL. [`Robots`] wraps both behind a
//! parse-once interface.

mod matcher;
mod parser;
mod path;
pub mod pattern;

use thiserror::Error;
use url::Url;

pub use crate::matcher::{is_valid_user_agent, LongestMatch, MatchStrategy, RobotsMatcher};
pub use crate::parser::{parse_robotstxt, parse_robotstxt_with_params, Key, Params, ParseHandler};
pub use crate::path::path_params_query;

pub(crate) type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// User agents must be bare, non-empty product tokens (`[a-zA-Z_-]+`).
    #[error("invalid user agent")]
    InvalidUserAgent,
}

/// Returns true if any member of `user_agents` may fetch `url` under the
/// given robots.txt body. Malformed bodies are interpreted permissively; this
/// never fails.
pub fn is_allowed(robots_body: &[u8], user_agents: &[&str], url: &str) -> bool {
    RobotsMatcher::new().allowed_by_robots(robots_body, user_agents, url)
}

/// [`is_allowed`] for a single user agent.
pub fn is_allowed_one(robots_body: &[u8], user_agent: &str, url: &str) -> bool {
    is_allowed(robots_body, &[user_agent], url)
}

#[derive(Default)]
struct SitemapCollector {
    sitemaps: Vec<String>,
}

impl ParseHandler for SitemapCollector {
    fn on_sitemap(&mut self, _line_num: u32, value: &[u8]) {
        if !value.is_empty() {
            self.sitemaps
                .push(String::from_utf8_lossy(value).into_owned());
        }
    }
}

/// A parsed robots.txt body, bound to a single user agent.
#[derive(Debug)]
pub struct Robots {
    body: Vec<u8>,
    user_agent: String,
    params: Params,
    sitemaps: Vec<String>,
}

impl Robots {
    pub fn parse_with_params(useragent: &str, robotstxt: &[u8], params: Params) -> Result<Self> {
        if !is_valid_user_agent(useragent) {
            return Err(Error::InvalidUserAgent);
        }

        let body = robotstxt[..robotstxt.len().min(params.char_limit)].to_vec();

        let mut collector = SitemapCollector::default();
        parse_robotstxt_with_params(&body, &mut collector, params);

        Ok(Self {
            body,
            user_agent: useragent.to_string(),
            params,
            sitemaps: collector.sitemaps,
        })
    }

    pub fn parse(useragent: &str, robotstxt: &[u8]) -> Result<Self> {
        Self::parse_with_params(useragent, robotstxt, Params::default())
    }

    pub fn is_allowed(&self, url: &Url) -> bool {
        self.is_path_allowed(&path_params_query(url.as_str()))
    }

    pub fn is_path_allowed(&self, path: &str) -> bool {
        let path = if path.is_empty() { "/" } else { path };

        if path == "/robots.txt" {
            return true;
        }

        RobotsMatcher::new().allowed_by_robots_with_params(
            &self.body,
            &[self.user_agent.as_str()],
            path,
            self.params,
        )
    }

    pub fn sitemaps(&self) -> &[String] {
        &self.sitemaps
    }
}
