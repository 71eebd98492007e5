/// Queue Service - single-writer owner of the kitchen queue
///
/// Network front ends never touch the queue directly. They hold a
/// `QueueHandle` and send requests over an MPSC channel to one task that
/// owns the `Dispatcher`; each request carries a oneshot channel for its
/// reply. Requests are applied strictly one at a time, in arrival order.
///
/// ## Usage
/// ```rust,ignore
/// use kitchen_queue::application::service::QueueService;
///
/// let (service, handle) = QueueService::new();
/// tokio::spawn(service.run());
/// let response = handle.handle_line("ADD,1,Burger,10".into()).await?;
/// ```

use super::dispatcher::{CommandError, Dispatcher, Outcome};
use crate::shared::protocol::{Command, OrderRecord};
use thiserror::Error;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::oneshot;

/// Requests the service task can receive
#[derive(Debug)]
pub enum ServiceRequest {
    /// Apply a typed command.
    Execute {
        command: Command,
        reply: oneshot::Sender<Result<Outcome, CommandError>>,
    },
    /// Parse and apply a protocol line, answering with the response line.
    Line {
        line: String,
        reply: oneshot::Sender<Option<String>>,
    },
    /// Remove an order by id and count it as completed.
    CompleteSelected {
        id: i64,
        reply: oneshot::Sender<Result<Outcome, CommandError>>,
    },
    /// Read the queue without changing it.
    Snapshot {
        reply: oneshot::Sender<Vec<OrderRecord>>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("queue service is not running")]
    Closed,
}

/// Cloneable sender side of the queue service.
#[derive(Debug, Clone)]
pub struct QueueHandle {
    sender: UnboundedSender<ServiceRequest>,
}

impl QueueHandle {
    pub async fn execute(&self, command: Command) -> Result<Result<Outcome, CommandError>, ServiceError> {
        self.request(|reply| ServiceRequest::Execute { command, reply }).await
    }

    pub async fn handle_line(&self, line: String) -> Result<Option<String>, ServiceError> {
        self.request(|reply| ServiceRequest::Line { line, reply }).await
    }

    pub async fn complete_selected(&self, id: i64) -> Result<Result<Outcome, CommandError>, ServiceError> {
        self.request(|reply| ServiceRequest::CompleteSelected { id, reply }).await
    }

    pub async fn snapshot(&self) -> Result<Vec<OrderRecord>, ServiceError> {
        self.request(|reply| ServiceRequest::Snapshot { reply }).await
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> ServiceRequest,
    ) -> Result<T, ServiceError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(build(reply_tx))
            .map_err(|_| ServiceError::Closed)?;
        reply_rx.await.map_err(|_| ServiceError::Closed)
    }
}

/// The task that owns the queue.
pub struct QueueService {
    dispatcher: Dispatcher,
    request_receiver: UnboundedReceiver<ServiceRequest>,
}

impl QueueService {
    /// Creates a service around an empty queue and its first handle.
    pub fn new() -> (Self, QueueHandle) {
        Self::with_dispatcher(Dispatcher::new())
    }

    pub fn with_dispatcher(dispatcher: Dispatcher) -> (Self, QueueHandle) {
        let (sender, request_receiver) = mpsc::unbounded_channel();
        let service = QueueService {
            dispatcher,
            request_receiver,
        };
        (service, QueueHandle { sender })
    }

    /// Runs until every `QueueHandle` has been dropped.
    pub async fn run(mut self) {
        tracing::info!("queue service started");
        while let Some(request) = self.request_receiver.recv().await {
            self.process(request);
        }
        tracing::info!(
            remaining = self.dispatcher.queue().len(),
            "queue service stopped"
        );
    }

    #[inline]
    fn process(&mut self, request: ServiceRequest) {
        // 请求方可能已经放弃等待，发送失败直接忽略
        match request {
            ServiceRequest::Execute { command, reply } => {
                let _ = reply.send(self.dispatcher.execute(command));
            }
            ServiceRequest::Line { line, reply } => {
                let _ = reply.send(self.dispatcher.handle_line(&line));
            }
            ServiceRequest::CompleteSelected { id, reply } => {
                let _ = reply.send(self.dispatcher.complete_by_id(id));
            }
            ServiceRequest::Snapshot { reply } => {
                let _ = reply.send(self.dispatcher.records());
            }
        }
    }
}
