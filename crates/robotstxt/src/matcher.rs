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

use crate::parser::{parse_robotstxt_with_params, Params, ParseHandler};
use crate::path::path_params_query;
use crate::pattern;

/// Decides how well a directive pattern matches a request path.
///
/// * a priority below zero is no match at all,
/// * a priority of zero is a match equivalent to an empty pattern,
/// * a priority above zero is a regular match.
pub trait MatchStrategy {
    fn match_priority(&self, path: &[u8], pattern: &[u8]) -> i32;
}

/// The default matching strategy: the number of pattern bytes matched is the
/// priority, so more specific patterns beat less specific ones.
#[derive(Debug, Default, Clone, Copy)]
pub struct LongestMatch;

impl MatchStrategy for LongestMatch {
    fn match_priority(&self, path: &[u8], pattern: &[u8]) -> i32 {
        if pattern::matches(path, pattern) {
            pattern.len() as i32
        } else {
            -1
        }
    }
}

/// Rather than a boolean per directive, we keep the priority of the best
/// match seen so far together with the line it came from. Updates require a
/// strictly higher priority, so for equal priorities the earliest line wins.
#[derive(Debug, Default, Clone, Copy)]
struct Match {
    priority: i32,
    line: u32,
}

impl Match {
    fn set(&mut self, priority: i32, line: u32) {
        self.priority = priority;
        self.line = line;
    }

    fn clear(&mut self) {
        self.set(0, 0);
    }

    fn higher_priority<'a>(a: &'a Match, b: &'a Match) -> &'a Match {
        if a.priority > b.priority {
            a
        } else {
            b
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct MatchHierarchy {
    global: Match,
    specific: Match,
}

impl MatchHierarchy {
    fn clear(&mut self) {
        self.global.clear();
        self.specific.clear();
    }
}

/// Matches robots.txt bodies against URLs for a set of user agents.
///
/// The matcher consumes the directive stream of [`crate::parse_robotstxt`]
/// and arbitrates conflicting allow and disallow rules across the global
/// (`*`) group and the groups naming one of the caller's agents. It can be
/// reused across calls but is not thread-safe.
pub struct RobotsMatcher<S = LongestMatch> {
    allow: MatchHierarchy,
    disallow: MatchHierarchy,
    seen_global_agent: bool,
    seen_specific_agent: bool,
    ever_seen_specific_agent: bool,
    seen_separator: bool,
    path: String,
    user_agents: Vec<String>,
    strategy: S,
}

impl RobotsMatcher {
    pub fn new() -> Self {
        Self::with_strategy(LongestMatch)
    }
}

impl Default for RobotsMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: MatchStrategy> RobotsMatcher<S> {
    pub fn with_strategy(strategy: S) -> Self {
        Self {
            allow: MatchHierarchy::default(),
            disallow: MatchHierarchy::default(),
            seen_global_agent: false,
            seen_specific_agent: false,
            ever_seen_specific_agent: false,
            seen_separator: false,
            path: String::new(),
            user_agents: Vec::new(),
            strategy,
        }
    }

    /// Returns true if any member of `user_agents` is allowed to fetch `url`
    /// under the given robots.txt body. The url must be %-encoded according
    /// to RFC 3986 already.
    pub fn allowed_by_robots(
        &mut self,
        robots_body: &[u8],
        user_agents: &[&str],
        url: &str,
    ) -> bool {
        self.allowed_by_robots_with_params(robots_body, user_agents, url, Params::default())
    }

    pub fn allowed_by_robots_with_params(
        &mut self,
        robots_body: &[u8],
        user_agents: &[&str],
        url: &str,
        params: Params,
    ) -> bool {
        self.path = path_params_query(url).into_owned();
        debug_assert!(self.path.starts_with('/'));
        self.user_agents = user_agents.iter().map(|agent| agent.to_string()).collect();

        parse_robotstxt_with_params(robots_body, self, params);

        !self.disallow()
    }

    /// [`Self::allowed_by_robots`] for a single user agent.
    pub fn one_agent_allowed_by_robots(
        &mut self,
        robots_body: &[u8],
        user_agent: &str,
        url: &str,
    ) -> bool {
        self.allowed_by_robots(robots_body, &[user_agent], url)
    }

    /// Returns true if the last checked URL was disallowed.
    pub fn disallow(&self) -> bool {
        if self.allow.specific.priority > 0 || self.disallow.specific.priority > 0 {
            return self.disallow.specific.priority > self.allow.specific.priority;
        }

        if self.ever_seen_specific_agent {
            // A group for one of our agents existed, but with no rule (or
            // only an empty one) matching the path.
            return false;
        }

        if self.disallow.global.priority > 0 || self.allow.global.priority > 0 {
            return self.disallow.global.priority > self.allow.global.priority;
        }

        false
    }

    /// Like [`Self::disallow`], but ignores the global (`*`) group entirely.
    pub fn disallow_ignore_global(&self) -> bool {
        if self.allow.specific.priority > 0 || self.disallow.specific.priority > 0 {
            return self.disallow.specific.priority > self.allow.specific.priority;
        }

        false
    }

    /// The line of the directive that decided the last checked URL, or 0 if
    /// no directive matched.
    pub fn matching_line(&self) -> u32 {
        if self.ever_seen_specific_agent {
            Match::higher_priority(&self.disallow.specific, &self.allow.specific).line
        } else {
            Match::higher_priority(&self.disallow.global, &self.allow.global).line
        }
    }

    /// Returns true if any user-agent line referenced one of the caller's
    /// agents.
    pub fn ever_seen_specific_agent(&self) -> bool {
        self.ever_seen_specific_agent
    }

    fn seen_any_agent(&self) -> bool {
        self.seen_global_agent || self.seen_specific_agent
    }

    /// The product token of a user-agent value: its leading run of
    /// `[a-zA-Z_-]` characters.
    fn extract_user_agent(user_agent: &[u8]) -> &[u8] {
        let end = user_agent
            .iter()
            .position(|&b| !(b.is_ascii_alphabetic() || b == b'-' || b == b'_'))
            .unwrap_or(user_agent.len());

        &user_agent[..end]
    }

    fn record_match(hierarchy: &mut MatchHierarchy, specific: bool, priority: i32, line_num: u32) {
        let record = if specific {
            &mut hierarchy.specific
        } else {
            &mut hierarchy.global
        };

        if record.priority < priority {
            record.set(priority, line_num);
        }
    }
}

/// A user agent is valid to obey if it is a bare, non-empty product token.
pub fn is_valid_user_agent(user_agent: &str) -> bool {
    user_agent
        .chars()
        .all(|c| c.is_ascii_alphabetic() || c == '-' || c == '_')
        && !user_agent.is_empty()
}

impl<S: MatchStrategy> ParseHandler for RobotsMatcher<S> {
    fn on_start(&mut self) {
        self.allow.clear();
        self.disallow.clear();

        self.seen_global_agent = false;
        self.seen_specific_agent = false;
        self.ever_seen_specific_agent = false;
        self.seen_separator = false;
    }

    fn on_user_agent(&mut self, _line_num: u32, user_agent: &[u8]) {
        if self.seen_separator {
            // A new group is beginning.
            self.seen_specific_agent = false;
            self.seen_global_agent = false;
            self.seen_separator = false;
        }

        // A '*' followed by whitespace and more characters is still a global
        // group.
        if user_agent.first() == Some(&b'*')
            && (user_agent.len() == 1 || user_agent[1].is_ascii_whitespace())
        {
            self.seen_global_agent = true;
        } else {
            let user_agent = Self::extract_user_agent(user_agent);
            if self
                .user_agents
                .iter()
                .any(|agent| user_agent.eq_ignore_ascii_case(agent.as_bytes()))
            {
                self.ever_seen_specific_agent = true;
                self.seen_specific_agent = true;
            }
        }
    }

    fn on_allow(&mut self, line_num: u32, value: &[u8]) {
        if !self.seen_any_agent() {
            return;
        }

        self.seen_separator = true;
        let priority = self.strategy.match_priority(self.path.as_bytes(), value);
        if priority >= 0 {
            Self::record_match(
                &mut self.allow,
                self.seen_specific_agent,
                priority,
                line_num,
            );
            return;
        }

        // '/x/index.htm(l)' is an alias for its directory '/x/', so retry
        // once with the directory pattern.
        let Some(slash) = value.iter().rposition(|&b| b == b'/') else {
            return;
        };
        if !value[slash..].starts_with(b"/index.htm") {
            return;
        }

        let mut directory = Vec::with_capacity(slash + 2);
        directory.extend_from_slice(&value[..=slash]);
        directory.push(b'$');

        let priority = self
            .strategy
            .match_priority(self.path.as_bytes(), &directory);
        if priority >= 0 {
            Self::record_match(
                &mut self.allow,
                self.seen_specific_agent,
                priority,
                line_num,
            );
        }
    }

    fn on_disallow(&mut self, line_num: u32, value: &[u8]) {
        if !self.seen_any_agent() {
            return;
        }

        self.seen_separator = true;
        let priority = self.strategy.match_priority(self.path.as_bytes(), value);
        if priority >= 0 {
            Self::record_match(
                &mut self.disallow,
                self.seen_specific_agent,
                priority,
                line_num,
            );
        }
    }

    fn on_sitemap(&mut self, _line_num: u32, _value: &[u8]) {
        self.seen_separator = true;
    }

    fn on_crawl_delay(&mut self, _line_num: u32, _value: &[u8]) {
        self.seen_separator = true;
    }

    fn on_unknown(&mut self, _line_num: u32, _key: &[u8], _value: &[u8]) {
        self.seen_separator = true;
    }
}
