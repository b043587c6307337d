//! Routing decision events
//!
//! The resolver can emit one event per resolution to an analytics sink.
//! Persistence, retention and pruning live outside this crate; the sink here
//! is a boundary trait, and a sink failure must never propagate into routing
//! (the resolver logs it and moves on).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use thiserror::Error;
use uuid::Uuid;

/// One routing decision, as seen by the analytics sink
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoutingEvent {
    /// A rule matched and a delegation target was chosen
    RouteResolved {
        event_id: Uuid,
        timestamp: DateTime<Utc>,
        source: String,
        target: String,
        matcher_kind: String,
    },
    /// Every rule evaluated false
    NoMatch {
        event_id: Uuid,
        timestamp: DateTime<Utc>,
        source: String,
    },
}

impl RoutingEvent {
    /// Create a resolved-route event
    pub fn resolved<S: Into<String>>(source: S, target: S, matcher_kind: S) -> Self {
        Self::RouteResolved {
            event_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            source: source.into(),
            target: target.into(),
            matcher_kind: matcher_kind.into(),
        }
    }

    /// Create a no-match event
    pub fn no_match<S: Into<String>>(source: S) -> Self {
        Self::NoMatch {
            event_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            source: source.into(),
        }
    }

    /// The identity that initiated the resolution
    pub fn source(&self) -> &str {
        match self {
            RoutingEvent::RouteResolved { source, .. } | RoutingEvent::NoMatch { source, .. } => {
                source
            }
        }
    }
}

/// Errors a sink may report; the resolver logs and discards them
#[derive(Debug, Error)]
pub enum EventSinkError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("sink lock poisoned")]
    Poisoned,
}

/// Destination for routing events
pub trait EventSink: Send + Sync {
    fn record(&self, event: &RoutingEvent) -> Result<(), EventSinkError>;
}

/// Sink that discards everything
#[derive(Debug, Clone, Default)]
pub struct NoopEventSink;

impl EventSink for NoopEventSink {
    fn record(&self, _event: &RoutingEvent) -> Result<(), EventSinkError> {
        Ok(())
    }
}

/// Appends one JSON line per event to a file
pub struct JsonlEventSink {
    file: Mutex<File>,
}

impl JsonlEventSink {
    /// Open (or create) the event log file in append mode
    pub fn open(path: &Path) -> Result<Self, EventSinkError> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl EventSink for JsonlEventSink {
    fn record(&self, event: &RoutingEvent) -> Result<(), EventSinkError> {
        let line = serde_json::to_string(event)?;
        let mut file = self.file.lock().map_err(|_| EventSinkError::Poisoned)?;
        writeln!(file, "{line}")?;
        Ok(())
    }
}
