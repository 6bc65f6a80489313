//! Audit emission.
//!
//! The emitter holds an ordered list of sinks invoked synchronously after
//! each successful mutation. Emission is best-effort: a failing sink is
//! logged and skipped. A strict emitter surfaces the first sink failure
//! instead, for deployments that need delivery guarantees.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

use togglr_types::event::{AuditSink, Event};
use togglr_types::prelude::*;

#[derive(Clone, Debug)]
pub struct AuditEmitter {
	sinks: Vec<Arc<dyn AuditSink>>,
	strict: bool,
}

impl AuditEmitter {
	pub fn best_effort() -> Self {
		Self { sinks: Vec::new(), strict: false }
	}

	pub fn strict() -> Self {
		Self { sinks: Vec::new(), strict: true }
	}

	pub fn with_sink(mut self, sink: Arc<dyn AuditSink>) -> Self {
		self.sinks.push(sink);
		self
	}

	/// Append the event to every sink, in registration order. The event is
	/// emitted after the mutation succeeded; failures here never roll the
	/// mutation back.
	pub async fn emit(&self, event: Event) -> TgResult<()> {
		for sink in &self.sinks {
			if let Err(err) = sink.append(event.clone()).await {
				if self.strict {
					return Err(err);
				}
				warn!(%err, entity = %event.entity_ref, "audit sink failed, event dropped");
			}
		}
		Ok(())
	}
}

impl Default for AuditEmitter {
	fn default() -> Self {
		Self::best_effort().with_sink(Arc::new(LogSink))
	}
}

/// Writes events to the tracing log
#[derive(Debug)]
pub struct LogSink;

#[async_trait]
impl AuditSink for LogSink {
	async fn append(&self, event: Event) -> TgResult<()> {
		info!(
			action = ?event.action,
			scope = %event.scope,
			entity = %event.entity_ref,
			timestamp = %event.timestamp,
			"audit"
		);
		Ok(())
	}
}

/// Captures events in memory; the test substrate for audit assertions
#[derive(Debug, Default)]
pub struct MemorySink {
	events: Mutex<Vec<Event>>,
}

impl MemorySink {
	pub fn events(&self) -> Vec<Event> {
		self.events.lock().clone()
	}
}

#[async_trait]
impl AuditSink for MemorySink {
	async fn append(&self, event: Event) -> TgResult<()> {
		self.events.lock().push(event);
		Ok(())
	}
}


// vim: ts=4
