//! Task queue for fire-and-forget background work
//!
//! A bounded queue drained by a fixed pool of workers. Submitting never waits:
//! a full queue is reported to the caller immediately. Each job runs under a
//! timeout, and every state change is published as a [`JobEvent`] to the
//! callbacks registered on the [`EventBus`].

pub mod bus;
pub mod errors;
pub mod event;
pub mod job;
pub mod queue;

pub use bus::{EventBus, EventCallback};
pub use errors::QueueError;
pub use event::{JobEvent, JobEventKind};
pub use job::Job;
pub use queue::JobQueue;
