//! # Observable container consumed by the conductors.
//!
//! [`ObservableVec`] is an ordered container that records every mutation
//! as a [`Change`]. Conductors drain the change log after each batch of
//! mutations and react to it — whether the mutation came from a conductor
//! method or from direct caller manipulation, it funnels through the same
//! notification path, keeping parent pointers and activation state in a
//! single source of truth.

mod observable;

pub use observable::{Change, ObservableVec};
