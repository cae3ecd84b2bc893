//! In-process registry double: records every call and answers through a
//! caller-supplied responder.

#![allow(dead_code)]

use std::cell::RefCell;

use serde_json::{json, Value};
use svcad_registry::{HttpMethod, RegistryResponse, RegistryTransport, TransportError};

#[derive(Clone, Debug, PartialEq)]
pub struct RecordedCall {
    pub method: HttpMethod,
    pub uri: String,
    pub body: Option<Value>,
}

type Responder = Box<dyn Fn(HttpMethod, &str) -> Result<RegistryResponse, TransportError>>;

pub struct RecordingTransport {
    calls: RefCell<Vec<RecordedCall>>,
    responder: Responder,
}

impl RecordingTransport {
    pub fn new(
        responder: impl Fn(HttpMethod, &str) -> Result<RegistryResponse, TransportError> + 'static,
    ) -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            responder: Box::new(responder),
        }
    }

    /// Registry that accepts everything. Offering creates return
    /// `created_guid`; offering updates echo the guid from the path.
    pub fn accepting(created_guid: &'static str) -> Self {
        Self::new(move |method, uri| default_response(method, uri, created_guid))
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.borrow().clone()
    }

    pub fn call_lines(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .map(|c| format!("{} {}", c.method, c.uri))
            .collect()
    }
}

impl RegistryTransport for RecordingTransport {
    fn request(
        &self,
        method: HttpMethod,
        uri: &str,
        body: Option<&Value>,
    ) -> Result<RegistryResponse, TransportError> {
        self.calls.borrow_mut().push(RecordedCall {
            method,
            uri: uri.to_string(),
            body: body.cloned(),
        });
        (self.responder)(method, uri)
    }
}

pub fn default_response(
    method: HttpMethod,
    uri: &str,
    created_guid: &str,
) -> Result<RegistryResponse, TransportError> {
    match (method, uri) {
        (HttpMethod::Post, "/v2/services") => Ok(with_guid(201, created_guid)),
        (HttpMethod::Put, u) if u.starts_with("/v2/services/") => {
            Ok(with_guid(200, u.trim_start_matches("/v2/services/")))
        }
        (HttpMethod::Post, "/v2/service_plans") => Ok(status(201)),
        (HttpMethod::Put, u) if u.starts_with("/v2/service_plans/") => Ok(status(200)),
        _ => Ok(status(404)),
    }
}

pub fn with_guid(status: u16, guid: &str) -> RegistryResponse {
    RegistryResponse {
        status,
        body: json!({ "metadata": { "guid": guid }, "entity": {} }).to_string(),
    }
}

pub fn status(status: u16) -> RegistryResponse {
    RegistryResponse {
        status,
        body: "{}".to_string(),
    }
}
