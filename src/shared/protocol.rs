//! Line protocol
//!
//! One command per line, comma-separated fields, case-insensitive command
//! name:
//!
//! ```text
//! ADD,id,items,prepTime[,isExpress]
//! VIP,id,items,prepTime[,isExpress]
//! COMPLETE
//! CANCEL,id
//! PRINT
//! ```
//!
//! Successful commands answer with the queue as a JSON array of
//! [`OrderRecord`]s, failures with a single `ERROR:<TOKEN>` line.

use crate::domain::{NewOrderRequest, Order, Tier};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 命令类型，用于区分格式错误的来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Add,
    Vip,
    Complete,
    Cancel,
    Print,
}

impl CommandKind {
    pub fn as_str(self) -> &'static str {
        match self {
            CommandKind::Add => "ADD",
            CommandKind::Vip => "VIP",
            CommandKind::Complete => "COMPLETE",
            CommandKind::Cancel => "CANCEL",
            CommandKind::Print => "PRINT",
        }
    }
}

impl std::fmt::Display for CommandKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed protocol command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add(NewOrderRequest),
    Vip(NewOrderRequest),
    Complete,
    Cancel { id: i64 },
    Print,
}

impl Command {
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::Add(_) => CommandKind::Add,
            Command::Vip(_) => CommandKind::Vip,
            Command::Complete => CommandKind::Complete,
            Command::Cancel { .. } => CommandKind::Cancel,
            Command::Print => CommandKind::Print,
        }
    }

    /// Renders the command back into its wire form.
    pub fn to_line(&self) -> String {
        match self {
            Command::Add(request) => format_order_line(CommandKind::Add, request),
            Command::Vip(request) => format_order_line(CommandKind::Vip, request),
            Command::Complete => "COMPLETE".to_string(),
            Command::Cancel { id } => format!("CANCEL,{id}"),
            Command::Print => "PRINT".to_string(),
        }
    }
}

fn format_order_line(kind: CommandKind, request: &NewOrderRequest) -> String {
    format!(
        "{},{},{},{},{}",
        kind, request.id, request.items, request.prep_time, request.is_express
    )
}

/// Input the dispatcher could not turn into a command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// Too few fields for the command.
    #[error("invalid {0} format")]
    InvalidFormat(CommandKind),

    /// A numeric field did not parse.
    #[error("invalid number: {0:?}")]
    InvalidNumber(String),

    #[error("unknown command: {0:?}")]
    UnknownCommand(String),
}

impl ProtocolError {
    /// Token written after `ERROR:` on the wire.
    pub fn code(&self) -> &'static str {
        match self {
            ProtocolError::InvalidFormat(CommandKind::Add) => "INVALID_ADD_FORMAT",
            ProtocolError::InvalidFormat(CommandKind::Vip) => "INVALID_VIP_FORMAT",
            ProtocolError::InvalidFormat(CommandKind::Cancel) => "INVALID_CANCEL_FORMAT",
            // COMPLETE 和 PRINT 不带参数，不会出现格式错误
            ProtocolError::InvalidFormat(_) => "INVALID_FORMAT",
            ProtocolError::InvalidNumber(_) => "INVALID_NUMBER_FORMAT",
            ProtocolError::UnknownCommand(_) => "UNKNOWN_COMMAND",
        }
    }
}

/// Parses one input line.
///
/// Returns `Ok(None)` for a blank line. Extra trailing fields are ignored and
/// trailing empty fields are dropped before counting, so `CANCEL,` is a
/// format error while `ADD,1,,5` queues an order with empty items.
pub fn parse_line(line: &str) -> Result<Option<Command>, ProtocolError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let mut fields: Vec<&str> = line.split(',').collect();
    while fields.len() > 1 && fields.last().is_some_and(|field| field.is_empty()) {
        fields.pop();
    }

    let name = fields[0].to_ascii_uppercase();
    let command = match name.as_str() {
        "ADD" => Command::Add(parse_order(CommandKind::Add, &fields)?),
        "VIP" => Command::Vip(parse_order(CommandKind::Vip, &fields)?),
        "COMPLETE" => Command::Complete,
        "CANCEL" => {
            if fields.len() < 2 {
                return Err(ProtocolError::InvalidFormat(CommandKind::Cancel));
            }
            Command::Cancel {
                id: parse_number(fields[1])?,
            }
        }
        "PRINT" => Command::Print,
        _ => return Err(ProtocolError::UnknownCommand(fields[0].to_string())),
    };

    Ok(Some(command))
}

fn parse_order(kind: CommandKind, fields: &[&str]) -> Result<NewOrderRequest, ProtocolError> {
    if fields.len() < 4 {
        return Err(ProtocolError::InvalidFormat(kind));
    }

    Ok(NewOrderRequest {
        id: parse_number(fields[1])?,
        items: fields[2].to_string(),
        prep_time: parse_number(fields[3])?,
        is_express: fields
            .get(4)
            .is_some_and(|flag| flag.eq_ignore_ascii_case("true")),
    })
}

fn parse_number<T: std::str::FromStr>(field: &str) -> Result<T, ProtocolError> {
    field
        .parse()
        .map_err(|_| ProtocolError::InvalidNumber(field.to_string()))
}

/// JSON view of a queued order, keys in wire order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    pub id: i64,
    pub items: String,
    pub is_vip: bool,
    pub is_express: bool,
    pub prep_time: u32,
}

impl From<&Order> for OrderRecord {
    fn from(order: &Order) -> Self {
        OrderRecord {
            id: order.id,
            items: order.items.clone(),
            is_vip: order.tier == Tier::Vip,
            is_express: order.is_express,
            prep_time: order.prep_time,
        }
    }
}

/// Serializes a snapshot as a single JSON line; an empty queue is `[]`.
pub fn render_snapshot(records: &[OrderRecord]) -> Result<String, serde_json::Error> {
    serde_json::to_string(records)
}

pub fn render_error(code: &str) -> String {
    format!("ERROR:{code}")
}
