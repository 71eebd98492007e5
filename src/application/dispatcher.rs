/// Command Dispatcher
///
/// Owns a `KitchenQueue`, applies protocol commands to it and renders the
/// result as one response line. Every front end (stdio session, TCP server,
/// HTTP API) goes through this type so they all share the same semantics
/// and error tokens.
///
/// ## Response rules
/// - any successful command answers with the full queue as JSON
/// - a failed command answers with `ERROR:<TOKEN>` and nothing else
/// - a blank line gets no answer

use crate::domain::{KitchenQueue, QueueError, Tier};
use crate::shared::metrics::METRICS;
use crate::shared::protocol::{self, Command, OrderRecord, ProtocolError};
use thiserror::Error;

/// Why a command produced an `ERROR:` line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Queue(#[from] QueueError),
}

impl CommandError {
    /// Token written after `ERROR:` on the wire.
    pub fn code(&self) -> &'static str {
        match self {
            CommandError::Protocol(e) => e.code(),
            CommandError::Queue(QueueError::EmptyQueue) => "NO_ORDERS",
            CommandError::Queue(QueueError::NotFound(_)) => "ORDER_NOT_FOUND",
        }
    }
}

/// Result of a command that changed or read the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// The order taken off the queue by COMPLETE or CANCEL.
    pub removed: Option<OrderRecord>,
    /// Queue contents after the command, front to back.
    pub queue: Vec<OrderRecord>,
}

pub struct Dispatcher {
    queue: KitchenQueue,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::with_queue(KitchenQueue::new())
    }

    pub fn with_queue(queue: KitchenQueue) -> Self {
        Dispatcher { queue }
    }

    pub fn queue(&self) -> &KitchenQueue {
        &self.queue
    }

    /// Applies one command. On error the queue is left untouched.
    pub fn execute(&mut self, command: Command) -> Result<Outcome, CommandError> {
        let kind = command.kind();
        let result = self.apply(command);

        match &result {
            Ok(outcome) => {
                tracing::debug!(command = %kind, depth = outcome.queue.len(), "command applied");
            }
            Err(e) => {
                tracing::warn!(command = %kind, "command rejected: {}", e);
                METRICS.errors_total.with_label_values(&[e.code()]).inc();
            }
        }

        result
    }

    /// Completes an arbitrary order by id. Removal works like CANCEL, but
    /// the order is counted as completed.
    pub fn complete_by_id(&mut self, id: i64) -> Result<Outcome, CommandError> {
        let result = self
            .queue
            .cancel_by_id(id)
            .map_err(CommandError::from)
            .map(|order| {
                tracing::info!(id = order.id, "selected order completed");
                METRICS.completions_total.inc();
                METRICS.set_depth(self.queue.tier_counts());
                Outcome {
                    removed: Some(OrderRecord::from(&order)),
                    queue: self.records(),
                }
            });

        if let Err(e) = &result {
            tracing::warn!(id, "complete-selected rejected: {}", e);
            METRICS.errors_total.with_label_values(&[e.code()]).inc();
        }
        result
    }

    /// Parses and executes one protocol line, returning the response line.
    pub fn handle_line(&mut self, line: &str) -> Option<String> {
        let command = match protocol::parse_line(line) {
            Ok(Some(command)) => command,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("unparseable line {:?}: {}", line, e);
                METRICS.errors_total.with_label_values(&[e.code()]).inc();
                return Some(protocol::render_error(e.code()));
            }
        };

        Some(render_response(&self.execute(command)))
    }

    fn apply(&mut self, command: Command) -> Result<Outcome, CommandError> {
        let removed = match command {
            Command::Add(request) => {
                let tier = if request.is_express { Tier::Express } else { Tier::Normal };
                record_insert(tier, request.prep_time);
                self.queue.insert_normal(request);
                None
            }
            Command::Vip(request) => {
                record_insert(Tier::Vip, request.prep_time);
                self.queue.insert_vip(request);
                None
            }
            Command::Complete => {
                let order = self.queue.complete_front()?;
                tracing::info!(id = order.id, "order completed");
                METRICS.completions_total.inc();
                Some(OrderRecord::from(&order))
            }
            Command::Cancel { id } => {
                let order = self.queue.cancel_by_id(id)?;
                tracing::info!(id = order.id, "order cancelled");
                METRICS.cancellations_total.inc();
                Some(OrderRecord::from(&order))
            }
            Command::Print => None,
        };

        METRICS.set_depth(self.queue.tier_counts());

        Ok(Outcome {
            removed,
            queue: self.records(),
        })
    }

    /// Current queue as JSON records.
    pub fn records(&self) -> Vec<OrderRecord> {
        self.queue.iter().map(OrderRecord::from).collect()
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

fn record_insert(tier: Tier, prep_time: u32) {
    METRICS.orders_total.with_label_values(&[tier.as_str()]).inc();
    METRICS.prep_time.observe(f64::from(prep_time));
}

/// Renders a command result as one response line.
pub fn render_response(result: &Result<Outcome, CommandError>) -> String {
    match result {
        Ok(outcome) => protocol::render_snapshot(&outcome.queue).unwrap_or_else(|e| {
            tracing::error!("failed to serialize queue: {}", e);
            protocol::render_error("INTERNAL")
        }),
        Err(e) => protocol::render_error(e.code()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NewOrderRequest;

    fn run(dispatcher: &mut Dispatcher, lines: &[&str]) -> Vec<String> {
        lines
            .iter()
            .filter_map(|line| dispatcher.handle_line(line))
            .collect()
    }

    #[test]
    fn test_add_and_print() {
        let mut dispatcher = Dispatcher::new();
        let output = run(&mut dispatcher, &["ADD,1,Burger,10", "PRINT"]);

        let expected = r#"[{"id":1,"items":"Burger","isVip":false,"isExpress":false,"prepTime":10}]"#;
        assert_eq!(output, vec![expected, expected]);
    }

    #[test]
    fn test_worked_example_lines() {
        let mut dispatcher = Dispatcher::new();
        let output = run(
            &mut dispatcher,
            &[
                "ADD,1,Burger,10",
                "ADD,2,Fries,5",
                "VIP,3,Salad,1",
                "ADD,4,Shake,99,true",
                "COMPLETE",
                "CANCEL,2",
                "CANCEL,99",
            ],
        );

        assert_eq!(output.len(), 7);
        assert_eq!(
            output[3],
            concat!(
                r#"[{"id":3,"items":"Salad","isVip":true,"isExpress":false,"prepTime":1},"#,
                r#"{"id":4,"items":"Shake","isVip":false,"isExpress":true,"prepTime":99},"#,
                r#"{"id":2,"items":"Fries","isVip":false,"isExpress":false,"prepTime":5},"#,
                r#"{"id":1,"items":"Burger","isVip":false,"isExpress":false,"prepTime":10}]"#
            )
        );
        assert_eq!(
            output[5],
            concat!(
                r#"[{"id":4,"items":"Shake","isVip":false,"isExpress":true,"prepTime":99},"#,
                r#"{"id":1,"items":"Burger","isVip":false,"isExpress":false,"prepTime":10}]"#
            )
        );
        assert_eq!(output[6], "ERROR:ORDER_NOT_FOUND");
        assert_eq!(dispatcher.queue().len(), 2);
    }

    #[test]
    fn test_empty_queue_errors() {
        let mut dispatcher = Dispatcher::new();
        let output = run(&mut dispatcher, &["COMPLETE", "CANCEL,1", "PRINT"]);
        assert_eq!(output, vec!["ERROR:NO_ORDERS", "ERROR:NO_ORDERS", "[]"]);
    }

    #[test]
    fn test_protocol_errors() {
        let mut dispatcher = Dispatcher::new();
        let output = run(
            &mut dispatcher,
            &["ADD,1,Burger", "VIP,1", "CANCEL", "ADD,one,Burger,3", "REFUND,1", ""],
        );
        assert_eq!(
            output,
            vec![
                "ERROR:INVALID_ADD_FORMAT",
                "ERROR:INVALID_VIP_FORMAT",
                "ERROR:INVALID_CANCEL_FORMAT",
                "ERROR:INVALID_NUMBER_FORMAT",
                "ERROR:UNKNOWN_COMMAND",
            ]
        );
        assert!(dispatcher.queue().is_empty());
    }

    #[test]
    fn test_execute_reports_removed_order() {
        let mut dispatcher = Dispatcher::new();
        dispatcher
            .execute(Command::Vip(NewOrderRequest::new(8, "Nuggets", 4, true)))
            .unwrap();

        let outcome = dispatcher.execute(Command::Complete).unwrap();
        let removed = outcome.removed.unwrap();
        assert_eq!(removed.id, 8);
        assert!(removed.is_vip);
        assert!(removed.is_express);
        assert!(outcome.queue.is_empty());
    }

    #[test]
    fn test_execute_errors_map_to_codes() {
        let mut dispatcher = Dispatcher::new();
        let err = dispatcher.execute(Command::Complete).unwrap_err();
        assert_eq!(err, CommandError::Queue(QueueError::EmptyQueue));
        assert_eq!(err.code(), "NO_ORDERS");

        dispatcher
            .execute(Command::Add(NewOrderRequest::new(1, "Burger", 1, false)))
            .unwrap();
        let err = dispatcher.execute(Command::Cancel { id: 2 }).unwrap_err();
        assert_eq!(err.code(), "ORDER_NOT_FOUND");
    }

    #[test]
    fn test_complete_by_id_removes_selected_order() {
        let mut dispatcher = Dispatcher::new();
        run(&mut dispatcher, &["ADD,1,Burger,10", "ADD,2,Fries,5", "VIP,3,Salad,1"]);

        let outcome = dispatcher.complete_by_id(2).unwrap();
        assert_eq!(outcome.removed.unwrap().id, 2);
        let ids: Vec<i64> = outcome.queue.iter().map(|record| record.id).collect();
        assert_eq!(ids, vec![3, 1]);

        let err = dispatcher.complete_by_id(2).unwrap_err();
        assert_eq!(err.code(), "ORDER_NOT_FOUND");
        assert_eq!(dispatcher.queue().len(), 2);
    }
}
