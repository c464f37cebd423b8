// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! Rich text facets for post text.
//!
//! A facet marks a byte range of a post's text as a mention or a link.
//! [`resolve_facets`] scans text with the [scanners](scan), looks up the
//! DID for each mentioned handle, and returns the facets ready to be
//! attached to a [`PostRecord`](crate::post::PostRecord).
//!
//! Mentions whose handles cannot be found are left as plain text. Any other
//! lookup failure aborts the whole operation, since posting with some
//! mentions silently missing is worse than not posting at all.

pub mod scan;

use crate::http::HTTPError;
use log::{info, warn};
use scan::{parse_mentions, parse_urls};
use serde::Serialize;
use std::ops::Range;
use thiserror::Error;

/// A half-open range of bytes in the UTF-8 encoding of a post's text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Span {
    /// Offset of the first byte in the range.
    #[serde(rename = "byteStart")]
    pub start: usize,

    /// Offset one past the last byte in the range.
    #[serde(rename = "byteEnd")]
    pub end: usize,
}

impl Span {
    /// Creates a new span covering `start..end`.
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start < end, "empty span {start}..{end}");
        Self { start, end }
    }

    /// The span as a range that can be used to slice text.
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// A rich text feature attached to a span of text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "$type")]
pub enum Feature {
    /// A mention of another account.
    #[serde(rename = "app.bsky.richtext.facet#mention")]
    Mention {
        /// DID of the mentioned account.
        did: String,
    },

    /// A hyperlink.
    #[serde(rename = "app.bsky.richtext.facet#link")]
    Link {
        /// Target of the link.
        uri: String,
    },
}

/// Annotates a span of post text with one or more features.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Facet {
    /// The annotated bytes.
    pub index: Span,

    /// Features that apply to the annotated bytes.
    pub features: Vec<Feature>,
}

impl Facet {
    /// A facet linking `span` to the account identified by `did`.
    pub fn mention(span: Span, did: impl Into<String>) -> Self {
        let did = did.into();
        Self {
            index: span,
            features: vec![Feature::Mention { did }],
        }
    }

    /// A facet linking `span` to `uri`.
    pub fn link(span: Span, uri: impl Into<String>) -> Self {
        let uri = uri.into();
        Self {
            index: span,
            features: vec![Feature::Link { uri }],
        }
    }
}

/// The outcome of looking up a handle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// The handle belongs to the account with this DID.
    Found(String),

    /// No account uses the handle.
    NotFound,
}

/// Looks up the DIDs of handles.
pub trait Resolver {
    /// Resolves `handle` to a DID.
    ///
    /// Handles that do not exist resolve to [`Resolution::NotFound`];
    /// errors are reserved for failures that say nothing about whether
    /// the handle exists, such as a dropped connection or a server error.
    fn resolve_handle(
        &self,
        handle: &str,
    ) -> impl Future<Output = Result<Resolution, HTTPError>> + Send;
}

/// An error resolving facets.
#[derive(Debug, Error)]
pub enum Error {
    /// A handle could not be looked up.
    #[error("Could not resolve @{handle}: {source}")]
    Resolve {
        /// The handle being looked up.
        handle: String,

        /// The underlying failure.
        #[source]
        source: HTTPError,
    },
}

/// Finds the mentions and links in `text` and converts them into facets.
///
/// Handles are resolved one at a time, in the order they appear, using
/// `resolver`. A handle that is mentioned twice is looked up twice.
///
/// Mention facets come first, in text order, followed by link facets, in
/// text order.
pub async fn resolve_facets<R: Resolver>(text: &str, resolver: &R) -> Result<Vec<Facet>, Error> {
    let mut facets = Vec::new();

    for mention in parse_mentions(text) {
        let resolution = resolver
            .resolve_handle(&mention.handle)
            .await
            .map_err(|source| Error::Resolve {
                handle: mention.handle.clone(),
                source,
            })?;
        match resolution {
            Resolution::Found(did) => {
                info!("Resolved @{} to {}", mention.handle, did);
                facets.push(Facet::mention(mention.span, did));
            }
            Resolution::NotFound => {
                warn!("Could not find @{}; leaving it as plain text", mention.handle);
            }
        }
    }

    facets.extend(
        parse_urls(text)
            .into_iter()
            .map(|link| Facet::link(link.span, link.url)),
    );

    Ok(facets)
}
