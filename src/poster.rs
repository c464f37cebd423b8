// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! Publishes posts.
//!
//! Publishing is a single, strictly sequential pipeline: log in, build the
//! record, resolve its facets, upload its images one by one, and finally
//! create the record. Nothing is retried and nothing is rolled back; if an
//! image fails after earlier images were uploaded, those blobs are simply
//! never referenced.

use crate::bsky::{Credentials, Service, Session};
use crate::clock::Clock;
use crate::facet::{self, resolve_facets};
use crate::http::HTTPError;
use crate::post::{EmbeddedImage, ImageAttachment, MAX_IMAGE_SIZE, MAX_IMAGES, PostRecord};
use log::info;
use reqwest::StatusCode;
use serde_json::Value;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// A post that has not been published yet.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Draft {
    text: String,
    images: Vec<ImageAttachment>,
}

impl Draft {
    /// Creates a draft with the given text and no images.
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            text,
            images: vec![],
        }
    }

    /// Attaches images to the draft.
    pub fn images(self, images: Vec<ImageAttachment>) -> Self {
        Self { images, ..self }
    }

    /// The text of the post.
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// An error publishing a post.
#[derive(Debug, Error)]
pub enum Error {
    /// Logging in failed.
    #[error("Authentication failed: {0}")]
    Authentication(#[source] HTTPError),

    /// A mentioned handle could not be looked up.
    #[error(transparent)]
    Facet(#[from] facet::Error),

    /// More images were attached than a post can hold.
    #[error("{0} images attached, but a post can have at most {max}", max = MAX_IMAGES)]
    TooManyImages(usize),

    /// An image could not be read from disk.
    #[error("Could not read image {}: {source}", .path.display())]
    ImageRead {
        /// Location of the image.
        path: PathBuf,

        /// The underlying failure.
        #[source]
        source: io::Error,
    },

    /// An image is larger than the server accepts.
    #[error(
        "Image {} is {size} bytes, but images can be at most {max} bytes",
        .path.display(),
        max = MAX_IMAGE_SIZE
    )]
    ImageTooLarge {
        /// Location of the image.
        path: PathBuf,

        /// Size of the image, in bytes.
        size: u64,
    },

    /// An image could not be uploaded.
    #[error("Could not upload image {}: {source}", .path.display())]
    Upload {
        /// Location of the image.
        path: PathBuf,

        /// The underlying failure.
        #[source]
        source: HTTPError,
    },

    /// The post could not be sent.
    #[error("Could not create post: {0}")]
    Record(#[source] HTTPError),

    /// The server refused to create the post.
    #[error("Post was rejected with HTTP {status}")]
    Rejected {
        /// HTTP status returned by the server.
        status: StatusCode,

        /// Body returned by the server, usually describing the problem.
        body: Value,
    },
}

/// Publishes drafts using a [`Service`].
#[derive(Debug)]
pub struct Poster<S: Service> {
    service: S,
}

impl<S: Service> Poster<S> {
    /// Creates a poster that publishes through `service`.
    pub fn new(service: S) -> Self {
        Self { service }
    }

    #[cfg(test)]
    pub(crate) fn service(&self) -> &S {
        &self.service
    }

    /// Publishes `draft` to the account identified by `credentials`.
    ///
    /// `clock` provides the post's creation time. Returns the server's
    /// response to the record creation, which includes the new post's
    /// URI.
    pub async fn publish<C: Clock>(
        &self,
        credentials: &Credentials,
        draft: &Draft,
        clock: &C,
    ) -> Result<Value, Error> {
        if draft.images.len() > MAX_IMAGES {
            return Err(Error::TooManyImages(draft.images.len()));
        }

        let session = self
            .service
            .create_session(credentials)
            .await
            .map_err(Error::Authentication)?;
        let handle = session.handle().unwrap_or(credentials.identifier());
        info!("Logged in as {handle} ({})", session.did());

        let record = PostRecord::new(draft.text(), clock.timestamp());
        let facets = resolve_facets(draft.text(), &self.service).await?;
        let images = self.upload_images(&session, &draft.images).await?;
        let record = record.facets(facets).images(images);

        let response = self
            .service
            .create_record(&session, &record)
            .await
            .map_err(Error::Record)?;
        if response.is_success() {
            Ok(response.body)
        } else {
            Err(Error::Rejected {
                status: response.status,
                body: response.body,
            })
        }
    }

    async fn upload_images(
        &self,
        session: &Session,
        attachments: &[ImageAttachment],
    ) -> Result<Vec<EmbeddedImage>, Error> {
        let mut images = Vec::with_capacity(attachments.len());

        for attachment in attachments {
            let path = attachment.path();
            let read_error = |source| Error::ImageRead {
                path: path.to_path_buf(),
                source,
            };
            let too_large = |size| Error::ImageTooLarge {
                path: path.to_path_buf(),
                size,
            };

            let size = tokio::fs::metadata(path).await.map_err(read_error)?.len();
            if size > MAX_IMAGE_SIZE as u64 {
                return Err(too_large(size));
            }

            let data = tokio::fs::read(path).await.map_err(read_error)?;
            let size = data.len();
            if size > MAX_IMAGE_SIZE {
                return Err(too_large(size as u64));
            }

            let image = self
                .service
                .upload_blob(session, data, attachment.content_type())
                .await
                .map_err(|source| Error::Upload {
                    path: path.to_path_buf(),
                    source,
                })?;
            info!("Uploaded {} ({size} bytes)", path.display());

            images.push(EmbeddedImage {
                alt: attachment.alt().to_string(),
                image,
            });
        }

        Ok(images)
    }
}
