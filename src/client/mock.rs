//! Scripted in-process transport for tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use super::transport::{HttpRequest, HttpResponse, Transport, TransportError};

type Scripted = Result<HttpResponse, TransportError>;

/// Replays queued responses in order and records every request sent.
///
/// Once the queue is empty the `repeat` response is used; without one a
/// connection error is returned.
#[derive(Default)]
pub struct ScriptedTransport {
  queue: Mutex<VecDeque<Scripted>>,
  repeat: Mutex<Option<HttpResponse>>,
  requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn then(self, response: HttpResponse) -> Self {
    self.push(Ok(response));
    self
  }

  pub fn then_error(self, error: TransportError) -> Self {
    self.push(Err(error));
    self
  }

  pub fn always(self, response: HttpResponse) -> Self {
    *self.repeat.lock().unwrap() = Some(response);
    self
  }

  /// Queue another response on a transport already owned by a client.
  pub fn push(&self, response: Scripted) {
    self.queue.lock().unwrap().push_back(response);
  }

  pub fn calls(&self) -> usize {
    self.requests.lock().unwrap().len()
  }

  pub fn requests(&self) -> Vec<HttpRequest> {
    self.requests.lock().unwrap().clone()
  }

  pub fn last_request(&self) -> HttpRequest {
    self
      .requests
      .lock()
      .unwrap()
      .last()
      .cloned()
      .expect("no request was sent")
  }
}

impl Transport for ScriptedTransport {
  async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
    self.requests.lock().unwrap().push(request);

    if let Some(next) = self.queue.lock().unwrap().pop_front() {
      return next;
    }

    match self.repeat.lock().unwrap().clone() {
      Some(response) => Ok(response),
      None => Err(TransportError::Connect("no scripted response".to_string())),
    }
  }
}
