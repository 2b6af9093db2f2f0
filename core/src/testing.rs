//! Scripted `HttpSend` for unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::client::Client;
use crate::config::Tier;
use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse, HttpSend};

/// Records every request and answers from a queue of scripted outcomes.
/// An exhausted queue answers `200` with an empty body.
#[derive(Default)]
pub(crate) struct FakeSender {
    requests: Arc<Mutex<Vec<HttpRequest>>>,
    outcomes: Mutex<VecDeque<Result<HttpResponse, String>>>,
}

impl FakeSender {
    pub fn reply(self, status: u16, body: &str) -> Self {
        self.push(Ok(response(status, body)))
    }

    pub fn fail(self, message: &str) -> Self {
        self.push(Err(message.to_string()))
    }

    fn push(self, outcome: Result<HttpResponse, String>) -> Self {
        self.outcomes.lock().unwrap().push_back(outcome);
        self
    }

    pub fn requests(&self) -> Arc<Mutex<Vec<HttpRequest>>> {
        Arc::clone(&self.requests)
    }
}

impl HttpSend for FakeSender {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request);
        match self.outcomes.lock().unwrap().pop_front() {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(message.into()),
            None => Ok(response(200, "")),
        }
    }
}

pub(crate) fn response(status: u16, body: &str) -> HttpResponse {
    HttpResponse {
        status,
        headers: Vec::new(),
        body: body.as_bytes().to_vec(),
    }
}

pub(crate) fn client_with(sender: FakeSender) -> Client {
    Client::with_sender("https://project.example.co", "test-key", Tier::Anonymous, sender).unwrap()
}
