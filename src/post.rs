// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! Post records and their image attachments.

use crate::bsky::Blob;
use crate::facet::Facet;
use itertools::{EitherOrBoth, Itertools};
use log::warn;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Collection that post records are written to.
pub const COLLECTION: &str = "app.bsky.feed.post";

/// Largest image, in bytes, that may be attached to a post.
pub const MAX_IMAGE_SIZE: usize = 1_000_000;

/// Most images that may be attached to a single post.
pub const MAX_IMAGES: usize = 4;

/// A post, ready to be written to a repository.
///
/// This structure follows a "builder" pattern where facets and images are
/// added after the text is set:
///
/// ```
/// use bskypost::post::PostRecord;
/// let record = PostRecord::new("Hello, world!", "2025-05-23T17:13:00.000000Z")
///     .facets(vec![]);
/// assert_eq!(record.text(), "Hello, world!");
/// ```
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRecord {
    #[serde(rename = "$type")]
    kind: &'static str,

    text: String,

    created_at: String,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    facets: Vec<Facet>,

    #[serde(skip_serializing_if = "Option::is_none")]
    embed: Option<ImagesEmbed>,
}

impl PostRecord {
    /// Creates a post with the given `text`, created at `created_at` (an
    /// RFC 3339 timestamp).
    pub fn new(text: impl Into<String>, created_at: impl Into<String>) -> Self {
        let text = text.into();
        let created_at = created_at.into();
        Self {
            kind: COLLECTION,
            text,
            created_at,
            facets: vec![],
            embed: None,
        }
    }

    /// Sets the rich text facets for the post's text.
    pub fn facets(self, facets: Vec<Facet>) -> Self {
        Self { facets, ..self }
    }

    /// Embeds uploaded images in the post.
    ///
    /// An empty list removes the embed entirely.
    pub fn images(self, images: Vec<EmbeddedImage>) -> Self {
        let embed = if images.is_empty() {
            None
        } else {
            Some(ImagesEmbed::new(images))
        };
        Self { embed, ..self }
    }

    /// The post's text.
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// An `app.bsky.embed.images` embed.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ImagesEmbed {
    #[serde(rename = "$type")]
    kind: &'static str,

    images: Vec<EmbeddedImage>,
}

impl ImagesEmbed {
    fn new(images: Vec<EmbeddedImage>) -> Self {
        Self {
            kind: "app.bsky.embed.images",
            images,
        }
    }
}

/// An uploaded image and its alt text.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EmbeddedImage {
    /// Alt text describing the image.
    pub alt: String,

    /// The uploaded image.
    pub image: Blob,
}

/// An image on disk to attach to a post.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageAttachment {
    path: PathBuf,
    alt: String,
}

impl ImageAttachment {
    /// Creates an attachment for the image at `path` with the given alt text.
    pub fn new(path: impl Into<PathBuf>, alt: impl Into<String>) -> Self {
        let path = path.into();
        let alt = alt.into();
        Self { path, alt }
    }

    /// Pairs each image path with the alt text in the same position.
    ///
    /// Images without a matching alt text get an empty alt text. Alt texts
    /// without a matching image are ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use bskypost::post::ImageAttachment;
    /// let images = vec!["cat.png".into(), "dog.jpg".into()];
    /// let alts = vec!["A cat".to_string()];
    /// let attachments = ImageAttachment::pair(images, alts);
    /// assert_eq!(attachments[0].alt(), "A cat");
    /// assert_eq!(attachments[1].alt(), "");
    /// ```
    pub fn pair(images: Vec<PathBuf>, alts: Vec<String>) -> Vec<Self> {
        images
            .into_iter()
            .zip_longest(alts)
            .filter_map(|pair| match pair {
                EitherOrBoth::Both(path, alt) => Some(Self::new(path, alt)),
                EitherOrBoth::Left(path) => Some(Self::new(path, "")),
                EitherOrBoth::Right(alt) => {
                    warn!("Ignoring alt text without an image: {alt:?}");
                    None
                }
            })
            .collect()
    }

    /// Location of the image on disk.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Alt text describing the image.
    pub fn alt(&self) -> &str {
        &self.alt
    }

    /// MIME type of the image, inferred from its file extension.
    ///
    /// Unknown extensions are assumed to be JPEG images.
    ///
    /// # Examples
    ///
    /// ```
    /// use bskypost::post::ImageAttachment;
    /// assert_eq!(ImageAttachment::new("cat.PNG", "").content_type(), "image/png");
    /// assert_eq!(ImageAttachment::new("cat", "").content_type(), "image/jpeg");
    /// ```
    pub fn content_type(&self) -> &'static str {
        let extension = self
            .path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());
        match extension.as_deref() {
            Some("png") => "image/png",
            Some("gif") => "image/gif",
            Some("webp") => "image/webp",
            _ => "image/jpeg",
        }
    }
}
