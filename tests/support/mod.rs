//! Shared helpers for the behaviour tests.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use etfscope_core::{EtfCode, EtfRecord, HttpClient, HttpError, HttpRequest, HttpResponse};

/// In-memory transport that answers by exact URL and records every request.
/// Unknown URLs answer 404.
#[derive(Default)]
pub struct RecordingHttpClient {
    routes: Mutex<BTreeMap<String, Result<HttpResponse, HttpError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl RecordingHttpClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, url: &str, status: u16, body: &str) {
        self.routes
            .lock()
            .expect("routes lock")
            .insert(url.to_owned(), Ok(HttpResponse::new(status, body)));
    }

    pub fn fail(&self, url: &str, error: HttpError) {
        self.routes
            .lock()
            .expect("routes lock")
            .insert(url.to_owned(), Err(error));
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().expect("requests lock").clone()
    }

    pub fn urls(&self) -> Vec<String> {
        self.requests().into_iter().map(|request| request.url).collect()
    }
}

impl HttpClient for RecordingHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        let response = self
            .routes
            .lock()
            .expect("routes lock")
            .get(&request.url)
            .cloned()
            .unwrap_or_else(|| Ok(HttpResponse::new(404, "not found")));
        self.requests.lock().expect("requests lock").push(request);
        Box::pin(async move { response })
    }
}

pub fn code(raw: &str) -> EtfCode {
    EtfCode::parse(raw).expect("valid code")
}

pub fn record(name: &str, raw_code: &str) -> EtfRecord {
    EtfRecord::new(name, code(raw_code))
}
