//! Background relay task and the message protocol between it and the controller.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::errors::RelayError;
use crate::models::{ExplanationRequest, ExplanationResult};
use crate::network::Explainer;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayRequest {
    Explain { generation: u64, request: ExplanationRequest },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayMessage {
    Explained { generation: u64, result: ExplanationResult },
    /// Diagnostic only.
    Trace(String),
}

/// Controller-side handle for sending requests to the relay.
#[derive(Debug, Clone)]
pub struct RelayClient {
    requests: mpsc::UnboundedSender<RelayRequest>,
}

impl RelayClient {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<RelayRequest>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { requests: tx }, rx)
    }

    pub fn explain(&self, generation: u64, text: &str) -> Result<(), RelayError> {
        let request = ExplanationRequest { text: text.to_string() };
        self.requests
            .send(RelayRequest::Explain { generation, request })
            .map_err(|_| RelayError::Disconnected)
    }
}

/// Starts the relay. Each request is served on its own task so a slow request never
/// holds back a newer one; superseded requests still run to completion.
pub fn spawn_relay(
    explainer: Arc<dyn Explainer>,
    cancel: CancellationToken,
) -> (RelayClient, mpsc::UnboundedReceiver<RelayMessage>, JoinHandle<()>) {
    let (client, requests) = RelayClient::channel();
    let (replies, messages) = mpsc::unbounded_channel();
    let handle = tokio::spawn(run_relay(explainer, requests, replies, cancel));
    (client, messages, handle)
}

async fn run_relay(
    explainer: Arc<dyn Explainer>,
    mut requests: mpsc::UnboundedReceiver<RelayRequest>,
    replies: mpsc::UnboundedSender<RelayMessage>,
    cancel: CancellationToken,
) {
    loop {
        let request = tokio::select! {
            _ = cancel.cancelled() => break,
            request = requests.recv() => match request {
                Some(request) => request,
                None => break,
            },
        };

        let RelayRequest::Explain { generation, request } = request;
        let explainer = explainer.clone();
        let replies = replies.clone();
        tokio::spawn(async move {
            let preview: String = request.text.chars().take(30).collect();
            let _ = replies.send(RelayMessage::Trace(format!(
                "Received request for text: {}...",
                preview
            )));

            let result = match explainer.explain(&request.text).await {
                Ok(explanation) => {
                    let _ = replies.send(RelayMessage::Trace("API Success!".to_string()));
                    ExplanationResult::Explanation(explanation)
                }
                Err(err) => {
                    warn!(generation, error = %err, "explanation failed");
                    let _ = replies.send(RelayMessage::Trace(format!("API FAILED: {}", err)));
                    ExplanationResult::Error(err.normalized())
                }
            };

            if replies.send(RelayMessage::Explained { generation, result }).is_err() {
                debug!(generation, "controller gone, dropping explanation");
            }
        });
    }
    debug!("relay stopped");
}
