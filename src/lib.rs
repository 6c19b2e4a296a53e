//! Bakery recommendations from a free-text personality description.
//!
//! Records are flattened into search documents and embedded into a vector
//! index offline (`ingest` binary). At request time the query is embedded, the
//! nearest bakeries are retrieved and a hosted model picks among them (`api`
//! binary).

pub mod api;
pub mod application;
pub mod domain;
pub mod infrastructure;

#[cfg(test)]
pub(crate) mod testing;
