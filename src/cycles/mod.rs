//! Cycle pairing and aggregation.
//!
//! Each discharge event of a battery becomes one [`types::CycleRow`]. The
//! discharge is paired with a charge event by [`pairing::select_charge`] and
//! both traces are summarized through a [`crate::trace::TraceSource`].

pub mod aggregate;
pub mod pairing;
pub mod types;
