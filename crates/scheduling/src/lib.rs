//! Scheduling engine for the clinic agent
//!
//! - [`availability`]: pure slot calculation over a schedule snapshot and
//!   the day's existing bookings
//! - [`booking`]: validated appointment creation with commit-time slot
//!   uniqueness and a fire-and-forget confirmation notification
//! - [`notify`]: notification seam and its stub implementation
//!
//! The calculator reads snapshots without locking; a booking created
//! between snapshot and calculation is caught by the store's commit-time
//! check, not here.

pub mod availability;
pub mod booking;
pub mod notify;

pub use availability::{compute_slots, BookedSpan};
pub use booking::{BookingError, BookingOrigin, BookingRequest, BookingService};
pub use notify::{Notifier, StubNotifier};
