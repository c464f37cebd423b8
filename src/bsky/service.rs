// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! HTTPS connector for the Bluesky XRPC API.
//!
//! Service structures in this module provide a low-level way to interact
//! with a personal data server (PDS) over HTTPS, essentially a specialized
//! HTTPS client for the handful of XRPC procedures needed to publish a post.

use crate::bsky::session::{Credentials, Session};
use crate::facet::{Resolution, Resolver};
use crate::http::{self, HTTPError, HTTPResult, HTTPService};
use crate::post::{COLLECTION, PostRecord};
use log::debug;
use reqwest::{Client, StatusCode, header};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A reference to an uploaded blob.
///
/// The contents are opaque: the reference is copied verbatim from the
/// `uploadBlob` response into the record that uses the blob.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Blob(Value);

impl Blob {
    /// Wraps a raw blob reference.
    pub fn new(reference: Value) -> Self {
        Self(reference)
    }
}

/// The server's reply to a `createRecord` call.
///
/// Unlike other calls, the body is kept even when the status is not
/// successful so that it can be shown to the user.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordResponse {
    /// HTTP status of the response.
    pub status: StatusCode,

    /// Response body, or the raw text as a JSON string if the body was
    /// not valid JSON.
    pub body: Value,
}

impl RecordResponse {
    /// True if the record was created.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// A service for publishing posts to Bluesky.
///
/// Using this trait, clients can implement different ways of connecting
/// to a PDS, such as an actual connector for production code, and a
/// mocked connector for testing purposes.
pub trait Service: Resolver {
    /// Logs in with `credentials` and returns a new session.
    fn create_session(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = HTTPResult<Session>> + Send;

    /// Uploads `data` as a blob of the given `content_type`.
    fn upload_blob(
        &self,
        session: &Session,
        data: Vec<u8>,
        content_type: &str,
    ) -> impl Future<Output = HTTPResult<Blob>> + Send;

    /// Writes `record` to the logged-in account's post collection.
    ///
    /// Only transport failures are errors; an unsuccessful status is
    /// reported through the returned [`RecordResponse`].
    fn create_record(
        &self,
        session: &Session,
        record: &PostRecord,
    ) -> impl Future<Output = HTTPResult<RecordResponse>> + Send;
}

#[derive(Deserialize)]
struct ResolveHandleResponse {
    did: String,
}

#[derive(Deserialize)]
struct UploadBlobResponse {
    blob: Blob,
}

#[derive(Serialize)]
struct CreateRecordRequest<'a> {
    repo: &'a str,
    collection: &'a str,
    record: &'a PostRecord,
}

/// A service that contacts a PDS directly.
#[derive(Debug)]
pub struct BlueskyService {
    client: Client,
    host: String,
}

impl HTTPService for BlueskyService {}

impl BlueskyService {
    /// Creates a new service that talks to the PDS at `host`, such as
    /// `https://bsky.social`.
    pub fn new(host: impl Into<String>) -> HTTPResult<Self> {
        let client = Self::client()?;
        let host = host.into();
        Ok(Self { client, host })
    }

    fn uri(&self, nsid: &str) -> String {
        format!("{}/xrpc/{nsid}", self.host)
    }
}

/// Outcome of a `resolveHandle` call that can be decided from its status
/// alone.
///
/// 400 and 404 mean the handle does not exist. Any other unsuccessful
/// status is an error. `None` means the body holds the DID.
fn resolution_for(status: StatusCode) -> Option<HTTPResult<Resolution>> {
    match status {
        StatusCode::BAD_REQUEST | StatusCode::NOT_FOUND => Some(Ok(Resolution::NotFound)),
        status if !status.is_success() => Some(Err(HTTPError::Http(status))),
        _ => None,
    }
}

impl Resolver for BlueskyService {
    async fn resolve_handle(&self, handle: &str) -> HTTPResult<Resolution> {
        let uri = self.uri("com.atproto.identity.resolveHandle");
        debug!("GET {uri}?handle={handle}");
        let resp = self
            .client
            .get(&uri)
            .query(&[("handle", handle)])
            .send()
            .await?;

        if let Some(resolution) = resolution_for(resp.status()) {
            return resolution;
        }
        let body: ResolveHandleResponse = http::read_json(resp).await?;
        Ok(Resolution::Found(body.did))
    }
}

impl Service for BlueskyService {
    async fn create_session(&self, credentials: &Credentials) -> HTTPResult<Session> {
        let uri = self.uri("com.atproto.server.createSession");
        debug!("POST {uri} as {}", credentials.identifier());
        let resp = self.client.post(&uri).json(credentials).send().await?;
        http::read_json(resp).await
    }

    async fn upload_blob(
        &self,
        session: &Session,
        data: Vec<u8>,
        content_type: &str,
    ) -> HTTPResult<Blob> {
        let uri = self.uri("com.atproto.repo.uploadBlob");
        debug!("POST {uri} ({} bytes of {content_type})", data.len());
        let resp = self
            .client
            .post(&uri)
            .header(header::CONTENT_TYPE, content_type)
            .header(header::AUTHORIZATION, session.bearer())
            .body(data)
            .send()
            .await?;
        let body: UploadBlobResponse = http::read_json(resp).await?;
        Ok(body.blob)
    }

    async fn create_record(
        &self,
        session: &Session,
        record: &PostRecord,
    ) -> HTTPResult<RecordResponse> {
        let uri = self.uri("com.atproto.repo.createRecord");
        debug!("POST {uri} to {}", session.did());
        let request = CreateRecordRequest {
            repo: session.did(),
            collection: COLLECTION,
            record,
        };
        let resp = self
            .client
            .post(&uri)
            .header(header::AUTHORIZATION, session.bearer())
            .json(&request)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await.map_err(HTTPError::Body)?;
        let body = serde_json::from_str(&text).unwrap_or(Value::String(text));
        Ok(RecordResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::post::PostRecord;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn it_returns_a_uri_for_create_session() {
        let service = BlueskyService::new("https://bsky.social").unwrap();
        let actual_uri = service.uri("com.atproto.server.createSession");
        let expected_uri = "https://bsky.social/xrpc/com.atproto.server.createSession";
        assert_eq!(actual_uri, expected_uri);
    }

    #[test]
    fn it_returns_a_uri_for_a_custom_pds() {
        let service = BlueskyService::new("https://pds.example.com").unwrap();
        let actual_uri = service.uri("com.atproto.repo.createRecord");
        let expected_uri = "https://pds.example.com/xrpc/com.atproto.repo.createRecord";
        assert_eq!(actual_uri, expected_uri);
    }

    #[test]
    fn it_treats_bad_request_and_not_found_as_unknown_handles() {
        for status in [StatusCode::BAD_REQUEST, StatusCode::NOT_FOUND] {
            let resolution = resolution_for(status);
            assert!(
                matches!(resolution, Some(Ok(Resolution::NotFound))),
                "{status}: {resolution:?}"
            );
        }
    }

    #[test]
    fn it_fails_resolution_on_other_error_statuses() {
        let statuses = [
            StatusCode::UNAUTHORIZED,
            StatusCode::INTERNAL_SERVER_ERROR,
            StatusCode::BAD_GATEWAY,
        ];
        for status in statuses {
            match resolution_for(status) {
                Some(Err(HTTPError::Http(actual))) => assert_eq!(actual, status),
                resolution => panic!("{status}: unexpected resolution {resolution:?}"),
            }
        }
    }

    #[test]
    fn it_reads_the_body_of_a_successful_resolution() {
        assert!(resolution_for(StatusCode::OK).is_none());
        let body: ResolveHandleResponse =
            serde_json::from_str(r#"{"did": "did:plc:alice"}"#).unwrap();
        assert_eq!(body.did, "did:plc:alice");
    }

    #[test]
    fn it_deserializes_an_upload_blob_response() {
        let data = r#"{
            "blob": {
                "$type": "blob",
                "ref": {"$link": "bafkreibabalobzn6cd366ukcsjycp4yymjymgfxcv6xczmlgpemzkz3cfa"},
                "mimeType": "image/png",
                "size": 760898
            }
        }"#;
        let body: UploadBlobResponse = serde_json::from_str(data).unwrap();
        assert_eq!(body.blob.0["mimeType"], "image/png");
        assert_eq!(body.blob.0["size"], 760898);
    }

    #[test]
    fn it_serializes_a_create_record_request() {
        let record = PostRecord::new("hi", "2025-05-23T17:13:00.000000Z");
        let request = CreateRecordRequest {
            repo: "did:plc:alice",
            collection: COLLECTION,
            record: &record,
        };
        let expected = indoc! {r#"{
          "repo": "did:plc:alice",
          "collection": "app.bsky.feed.post",
          "record": {
            "$type": "app.bsky.feed.post",
            "text": "hi",
            "createdAt": "2025-05-23T17:13:00.000000Z"
          }
        }"#};
        let actual = serde_json::to_string_pretty(&request).unwrap();
        assert_eq!(actual, expected);
    }

    #[test]
    fn it_reports_record_success_from_the_status() {
        let ok = RecordResponse {
            status: StatusCode::OK,
            body: json!({"uri": "at://did:plc:alice/app.bsky.feed.post/3k"}),
        };
        let rejected = RecordResponse {
            status: StatusCode::BAD_REQUEST,
            body: json!({"error": "InvalidRequest"}),
        };
        assert!(ok.is_success());
        assert!(!rejected.is_success());
    }
}
