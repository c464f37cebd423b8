// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! Services for communicating with APIs using HTTP.

use reqwest::{Client, ClientBuilder, Response, StatusCode, header};
use serde::de::DeserializeOwned;
use std::{error, fmt};

/// A general service for making HTTP calls.
///
/// It might be a bit odd to refer to this trait as a "service", since
/// it appears to be more of a _client_ implementation, but think of
/// this as a proxy for a remote _service_ (even though a _client_ is used
/// to communicate with that remote service). A service might not always
/// be remote, such as when the implementation is a deterministic service
/// used for testing.
pub trait HTTPService {
    /// Default HTTP client that can be used to make HTTP requests.
    fn client() -> HTTPResult<Client> {
        ClientBuilder::new()
            .user_agent(Self::user_agent())
            .build()
            .map_err(HTTPError::Request)
    }

    /// An appropriate user agent to use when making HTTP requests.
    fn user_agent() -> String {
        format!("{} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
    }
}

/// Reads a successful JSON response into `R`.
///
/// Unsuccessful status codes and bodies that are not labeled as JSON are
/// returned as errors without attempting to parse the body.
pub async fn read_json<R: DeserializeOwned>(resp: Response) -> HTTPResult<R> {
    let status = resp.status();
    if !status.is_success() {
        return Err(HTTPError::Http(status));
    }

    let content_type = resp
        .headers()
        .get(header::CONTENT_TYPE)
        .ok_or(HTTPError::MissingContentType)?
        .to_str()
        .map_err(HTTPError::InvalidContentType)?;
    if !content_type.starts_with("application/json") {
        return Err(HTTPError::UnexpectedContentType(content_type.to_string()));
    }

    let body = resp.text().await.map_err(HTTPError::Body)?;
    serde_json::from_str(&body).map_err(HTTPError::Deserialization)
}

/// The result of an HTTP request.
pub type HTTPResult<T> = Result<T, HTTPError>;

/// Indicates an error has occurred when making an HTTP call.
#[derive(Debug)]
pub enum HTTPError {
    /// An error retrieving the body of a response.
    Body(reqwest::Error),

    /// An error that occurred while making an HTTP request.
    Request(reqwest::Error),

    /// A response body that could not be decoded from JSON.
    Deserialization(serde_json::Error),

    /// An unsuccessful HTTP status code in an HTTP response.
    Http(StatusCode),

    /// A missing Content-Type header in a response.
    MissingContentType,

    /// An invalid Content-Type header.
    InvalidContentType(header::ToStrError),

    /// A Content-Type that is not understood by the service.
    UnexpectedContentType(String),
}

impl From<reqwest::Error> for HTTPError {
    fn from(error: reqwest::Error) -> Self {
        HTTPError::Request(error)
    }
}

impl fmt::Display for HTTPError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HTTPError::Body(err) => write!(f, "Error retrieving body of HTTP response: {err}"),
            HTTPError::Request(err) => write!(f, "Error while making HTTP request: {err}"),
            HTTPError::Deserialization(err) => write!(f, "Error decoding response body: {err}"),
            HTTPError::Http(status) => write!(f, "Request returned HTTP {status}"),
            HTTPError::MissingContentType => write!(f, "Missing Content-Type header"),
            HTTPError::InvalidContentType(err) => {
                write!(f, "Invalid Content-Type header value: {err}")
            }
            HTTPError::UnexpectedContentType(content_type) => {
                write!(f, "Unexpected content type: {content_type}")
            }
        }
    }
}

impl error::Error for HTTPError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            HTTPError::Body(err) => Some(err),
            HTTPError::Request(err) => Some(err),
            HTTPError::Deserialization(err) => Some(err),
            HTTPError::Http(_) => None,
            HTTPError::MissingContentType => None,
            HTTPError::InvalidContentType(err) => Some(err),
            HTTPError::UnexpectedContentType(_) => None,
        }
    }
}
