//! Raffle logic on top of a shared [`sorteio_core::DataStore`].
//!
//! The [`AdminController`] draws a number in an operator-supplied range and
//! publishes it. Every [`ClientController`] reacts to a new draw by renewing
//! its participant entry and revealing whether its key-derived pseudo-number
//! matches the drawn one.

pub mod admin;
pub mod client;
pub mod error;
pub mod history;
pub mod log;
pub mod pending;
pub mod pseudo;
pub mod range;
pub mod registry;
pub mod spinner;
pub mod view;

#[cfg(test)]
mod test_support;

pub use admin::{AdminController, AdminStatus, AdminWatchers, PendingDraw};
pub use client::{
    ClientController, ClientState, ClientWatchers, Reconciliation, Registration, RevealHandle,
};
pub use error::{RaffleError, Result};
pub use log::DrawLog;
pub use pending::PendingWrite;
pub use pseudo::pseudo_number;
pub use range::DrawRange;
pub use registry::ParticipantRegistry;
pub use spinner::{CancelHandle, RepeatingTask, Spinner, TaskEnd};
pub use view::{AdminView, ClientView, Outcome};
