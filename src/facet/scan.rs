// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! Scanners that find mentions and links in raw post text.
//!
//! Both scanners work on the UTF-8 bytes of the text, so every [`Span`]
//! they report is a byte range, which is what facets in a post record
//! index into. Word boundaries are ASCII-only: any byte outside of
//! `[A-Za-z0-9_]`, including every byte of a multi-byte character, counts
//! as a boundary.

use crate::facet::Span;
use regex::bytes::Regex;
use std::sync::LazyLock;

// The mention itself is group 1, which still contains the leading '@'.
static MENTION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?-u)(?:^|\W)(@(?:[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?\.)+[a-zA-Z](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)",
    )
    .unwrap()
});

static URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?-u)(?:^|\W)(https?://(?:www\.)?[-a-zA-Z0-9@:%._+~#=]{1,256}\.[a-zA-Z0-9]{1,6}\b(?:[-a-zA-Z0-9()@:%_+.~#?&/=]*[-a-zA-Z0-9@%_+~#/=])?)",
    )
    .unwrap()
});

/// An `@handle` found in post text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MentionMatch {
    /// Location of the handle, not including the `@`.
    pub span: Span,

    /// The handle, not including the `@`.
    pub handle: String,
}

/// A link found in post text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UrlMatch {
    /// Location of the URL.
    pub span: Span,

    /// The URL exactly as it appears in the text.
    pub url: String,
}

/// Finds every mention in `text`, in the order they appear.
///
/// A mention is an `@` at the start of the text or after a non-word
/// character, followed by a domain-like handle whose last label starts with
/// a letter. Addresses like `me@example.com` are not mentions.
///
/// # Examples
///
/// ```
/// use bskypost::facet::scan::parse_mentions;
/// let mentions = parse_mentions("hi @alice.bsky.social!");
/// assert_eq!(mentions.len(), 1);
/// assert_eq!(mentions[0].handle, "alice.bsky.social");
/// assert_eq!((mentions[0].span.start, mentions[0].span.end), (4, 21));
/// ```
pub fn parse_mentions(text: &str) -> Vec<MentionMatch> {
    MENTION_REGEX
        .captures_iter(text.as_bytes())
        .filter_map(|caps| caps.get(1))
        .map(|m| {
            // Skip the '@'. The pattern only matches ASCII, so both ends
            // fall on character boundaries.
            let span = Span::new(m.start() + 1, m.end());
            let handle = text[span.range()].to_string();
            MentionMatch { span, handle }
        })
        .collect()
}

/// Finds every `http://` or `https://` link in `text`, in the order they
/// appear.
///
/// Trailing punctuation such as a sentence-ending period or a closing
/// parenthesis is not considered part of the link.
///
/// # Examples
///
/// ```
/// use bskypost::facet::scan::parse_urls;
/// let urls = parse_urls("read https://example.com/page.");
/// assert_eq!(urls.len(), 1);
/// assert_eq!(urls[0].url, "https://example.com/page");
/// ```
pub fn parse_urls(text: &str) -> Vec<UrlMatch> {
    URL_REGEX
        .captures_iter(text.as_bytes())
        .filter_map(|caps| caps.get(1))
        .map(|m| {
            let span = Span::new(m.start(), m.end());
            let url = text[span.range()].to_string();
            UrlMatch { span, url }
        })
        .collect()
}
