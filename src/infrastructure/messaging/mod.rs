// Messaging Infrastructure
//
// This module provides the in-memory event bus used to decouple
// job-lifecycle events from their reactions (webhook fan-out).

pub mod in_memory_event_bus;

pub use in_memory_event_bus::InMemoryEventBus;
