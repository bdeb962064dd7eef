// Persistence Implementations
//
// Concrete repository adapters, grouped by backing store.

pub mod sqlite;
