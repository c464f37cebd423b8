use crate::bsky::{Blob, Credentials, RecordResponse, Service, Session};
use crate::clock::{Clock, DateTime, Utc};
use crate::facet::{Resolution, Resolver};
use crate::http::{HTTPError, HTTPResult};
use crate::post::PostRecord;
use reqwest::StatusCode;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Mutex;

pub fn do_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A call made to a [`TestService`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    CreateSession,
    ResolveHandle(String),
    UploadBlob(usize, String),
    CreateRecord,
}

/// An in-memory PDS that records every call made to it.
#[derive(Debug, Default)]
pub struct TestService {
    dids: HashMap<String, String>,
    fail_session: bool,
    fail_resolution: bool,
    reject_records: bool,
    calls: Mutex<Vec<Call>>,
    records: Mutex<Vec<Value>>,
}

impl TestService {
    pub fn with_handle(mut self, handle: &str, did: &str) -> Self {
        self.dids.insert(handle.to_string(), did.to_string());
        self
    }

    pub fn failing_session(self) -> Self {
        Self {
            fail_session: true,
            ..self
        }
    }

    pub fn failing_resolution(self) -> Self {
        Self {
            fail_resolution: true,
            ..self
        }
    }

    pub fn rejecting_records(self) -> Self {
        Self {
            reject_records: true,
            ..self
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// The most recent record passed to `create_record`, as JSON.
    pub fn last_record(&self) -> Option<Value> {
        self.records.lock().unwrap().last().cloned()
    }

    fn record_call(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

impl Resolver for TestService {
    async fn resolve_handle(&self, handle: &str) -> HTTPResult<Resolution> {
        self.record_call(Call::ResolveHandle(handle.to_string()));
        if self.fail_resolution {
            return Err(HTTPError::Http(StatusCode::INTERNAL_SERVER_ERROR));
        }
        Ok(match self.dids.get(handle) {
            Some(did) => Resolution::Found(did.clone()),
            None => Resolution::NotFound,
        })
    }
}

impl Service for TestService {
    async fn create_session(&self, credentials: &Credentials) -> HTTPResult<Session> {
        self.record_call(Call::CreateSession);
        if self.fail_session {
            Err(HTTPError::Http(StatusCode::UNAUTHORIZED))
        } else {
            let did = format!("did:plc:{}", credentials.identifier().replace('.', "-"));
            Ok(Session::new("test-access-jwt", did))
        }
    }

    async fn upload_blob(
        &self,
        _session: &Session,
        data: Vec<u8>,
        content_type: &str,
    ) -> HTTPResult<Blob> {
        self.record_call(Call::UploadBlob(data.len(), content_type.to_string()));
        Ok(Blob::new(json!({
            "$type": "blob",
            "ref": {"$link": "bafkreitestblob"},
            "mimeType": content_type,
            "size": data.len(),
        })))
    }

    async fn create_record(
        &self,
        _session: &Session,
        record: &PostRecord,
    ) -> HTTPResult<RecordResponse> {
        self.record_call(Call::CreateRecord);
        let record = serde_json::to_value(record).expect("could not serialize record");
        self.records.lock().unwrap().push(record);

        if self.reject_records {
            Ok(RecordResponse {
                status: StatusCode::BAD_REQUEST,
                body: json!({"error": "InvalidRequest", "message": "Invalid record"}),
            })
        } else {
            Ok(RecordResponse {
                status: StatusCode::OK,
                body: json!({
                    "uri": "at://did:plc:alice/app.bsky.feed.post/3kabc",
                    "cid": "bafyreitestcid",
                }),
            })
        }
    }
}

pub struct FrozenClock {
    datetime: DateTime<Utc>,
}

impl FrozenClock {
    pub fn new(datetime: DateTime<Utc>) -> Self {
        FrozenClock { datetime }
    }
}

impl Default for FrozenClock {
    fn default() -> Self {
        let datetime = DateTime::parse_from_rfc3339("2025-05-23T10:13:00-07:00")
            .expect("invalid date supplied")
            .with_timezone(&Utc);
        Self::new(datetime)
    }
}

impl Clock for FrozenClock {
    fn now(&self) -> DateTime<Utc> {
        self.datetime
    }
}
