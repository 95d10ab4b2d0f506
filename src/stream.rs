//! Ordered request/response validation over one streaming connection.
//!
//! A connection starts `Open` and ends `Closed`. Each inbound request is
//! validated, measured and answered before the next one is read, so responses
//! leave in arrival order and at most one request is in flight. The end of the
//! inbound stream closes the connection cleanly; a send or receive failure
//! closes it and is returned to the caller. A request whose payload cannot be
//! decoded is answered with a failed response and the connection stays open.

use std::io::{BufRead, Write};
use std::sync::mpsc;
use std::time::Instant;

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::contract::{all_passed, ContractValidator};
use crate::error::{Result, TransportError};
use crate::generated::{GeneratedType, ValidationTestMessage};
use crate::harness::throughput;
use crate::schema::{ProcessingStats, StreamRequest, StreamResponse};

/// One inbound frame as decoded by a transport.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    Request(StreamRequest),
    /// The envelope identified a request but its payload did not decode.
    MalformedPayload {
        request_id: String,
        sequence_number: i64,
        reason: String,
    },
}

/// Bidirectional message channel for one connection.
pub trait StreamTransport {
    /// `Ok(None)` once the peer has finished sending.
    fn recv(&mut self) -> std::result::Result<Option<Inbound>, TransportError>;

    fn send(&mut self, response: StreamResponse) -> std::result::Result<(), TransportError>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    Open,
    Closed,
}

#[derive(Debug)]
pub struct StreamingProcessor {
    validator: ContractValidator,
    state: ConnectionState,
    processed: usize,
}

impl StreamingProcessor {
    pub fn new(validator: ContractValidator) -> Self {
        Self {
            validator,
            state: ConnectionState::Open,
            processed: 0,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn processed(&self) -> usize {
        self.processed
    }

    /// Validate one request and build its response.
    pub fn process(&self, request: StreamRequest) -> StreamResponse {
        let start = Instant::now();

        let (success, message, items) = match &request.payload {
            None => (false, "missing payload".to_string(), 0),
            Some(payload) => {
                let results = self.validator.validate(payload);
                let items = payload.items_processed();
                if all_passed(&results) {
                    (true, format!("processed request {}", request.request_id), items)
                } else {
                    let failures: Vec<String> = results
                        .iter()
                        .filter(|r| !r.passed)
                        .map(|r| format!("{}: {}", r.scenario_id, r.error_message))
                        .collect();
                    (false, failures.join("; "), items)
                }
            }
        };

        let processing_time_ns = start.elapsed().as_nanos();

        StreamResponse {
            request_id: request.request_id,
            sequence_number: request.sequence_number,
            success,
            message,
            stats: ProcessingStats {
                processing_time_ns,
                items_processed: items as u64,
                throughput: throughput(items as f64, processing_time_ns),
            },
        }
    }

    /// Failed response for a request whose payload could not be decoded.
    pub fn reject(&self, request_id: String, sequence_number: i64, reason: &str) -> StreamResponse {
        StreamResponse {
            request_id,
            sequence_number,
            success: false,
            message: format!("malformed payload: {reason}"),
            stats: ProcessingStats {
                processing_time_ns: 0,
                items_processed: 0,
                throughput: 0.0,
            },
        }
    }

    /// Serve the connection until the inbound stream ends or the transport
    /// fails. Returns the number of responses sent.
    pub fn run<T: StreamTransport>(&mut self, transport: &mut T) -> Result<usize> {
        if self.state == ConnectionState::Closed {
            return Err(TransportError::Closed.into());
        }
        debug!("stream opened");

        loop {
            let inbound = match transport.recv() {
                Ok(Some(inbound)) => inbound,
                Ok(None) => {
                    self.state = ConnectionState::Closed;
                    info!(responses = self.processed as u64, "stream closed by peer");
                    return Ok(self.processed);
                }
                Err(err) => {
                    self.state = ConnectionState::Closed;
                    warn!(error = %err, "stream receive failed");
                    return Err(err.into());
                }
            };

            let response = match inbound {
                Inbound::Request(request) => self.process(request),
                Inbound::MalformedPayload {
                    request_id,
                    sequence_number,
                    reason,
                } => self.reject(request_id, sequence_number, &reason),
            };
            if !response.success {
                debug!(
                    request_id = response.request_id.as_str(),
                    message = response.message.as_str(),
                    "request failed validation"
                );
            }

            if let Err(err) = transport.send(response) {
                self.state = ConnectionState::Closed;
                warn!(error = %err, "stream send failed");
                return Err(err.into());
            }
            self.processed += 1;
        }
    }
}

/// Request line with the payload left undecoded.
#[derive(Deserialize)]
struct Envelope {
    request_id: String,
    sequence_number: i64,
    #[serde(default)]
    payload: Option<serde_json::Value>,
}

impl Envelope {
    fn into_inbound(self) -> Inbound {
        let payload = match self.payload {
            None => None,
            Some(value) => match serde_json::from_value::<ValidationTestMessage>(value) {
                Ok(message) => Some(message),
                Err(err) => {
                    return Inbound::MalformedPayload {
                        request_id: self.request_id,
                        sequence_number: self.sequence_number,
                        reason: err.to_string(),
                    }
                }
            },
        };
        Inbound::Request(StreamRequest {
            request_id: self.request_id,
            sequence_number: self.sequence_number,
            payload,
        })
    }
}

/// One JSON object per line in each direction. A line without a usable
/// `request_id` and `sequence_number` is a receive error.
pub struct JsonLinesTransport<R, W> {
    reader: R,
    writer: W,
    line: String,
}

impl<R: BufRead, W: Write> JsonLinesTransport<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            line: String::new(),
        }
    }

    pub fn into_writer(self) -> W {
        self.writer
    }
}

impl<R: BufRead, W: Write> StreamTransport for JsonLinesTransport<R, W> {
    fn recv(&mut self) -> std::result::Result<Option<Inbound>, TransportError> {
        loop {
            self.line.clear();
            let n = self
                .reader
                .read_line(&mut self.line)
                .map_err(|e| TransportError::Recv(e.to_string()))?;
            if n == 0 {
                return Ok(None);
            }
            let trimmed = self.line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let envelope: Envelope = serde_json::from_str(trimmed)
                .map_err(|e| TransportError::Recv(format!("malformed request: {e}")))?;
            return Ok(Some(envelope.into_inbound()));
        }
    }

    fn send(&mut self, response: StreamResponse) -> std::result::Result<(), TransportError> {
        serde_json::to_writer(&mut self.writer, &response)
            .map_err(|e| TransportError::Send(e.to_string()))?;
        self.writer
            .write_all(b"\n")
            .and_then(|_| self.writer.flush())
            .map_err(|e| TransportError::Send(e.to_string()))
    }
}

/// In-process transport over a pair of channels.
pub struct ChannelTransport {
    inbound: mpsc::Receiver<StreamRequest>,
    outbound: mpsc::Sender<StreamResponse>,
}

/// Peer end of a [`ChannelTransport`].
pub struct ChannelClient {
    requests: mpsc::Sender<StreamRequest>,
    responses: mpsc::Receiver<StreamResponse>,
}

impl ChannelTransport {
    pub fn pair() -> (ChannelTransport, ChannelClient) {
        let (req_tx, req_rx) = mpsc::channel();
        let (resp_tx, resp_rx) = mpsc::channel();
        (
            ChannelTransport {
                inbound: req_rx,
                outbound: resp_tx,
            },
            ChannelClient {
                requests: req_tx,
                responses: resp_rx,
            },
        )
    }
}

impl StreamTransport for ChannelTransport {
    fn recv(&mut self) -> std::result::Result<Option<Inbound>, TransportError> {
        // A disconnected sender is the end of the request stream.
        Ok(self.inbound.recv().ok().map(Inbound::Request))
    }

    fn send(&mut self, response: StreamResponse) -> std::result::Result<(), TransportError> {
        self.outbound
            .send(response)
            .map_err(|_| TransportError::Send("response receiver dropped".to_string()))
    }
}

impl ChannelClient {
    pub fn send(&self, request: StreamRequest) -> std::result::Result<(), TransportError> {
        self.requests
            .send(request)
            .map_err(|_| TransportError::Send("connection closed".to_string()))
    }

    /// Finish sending; the returned receiver yields every remaining response.
    pub fn close_send(self) -> mpsc::Receiver<StreamResponse> {
        self.responses
    }
}
