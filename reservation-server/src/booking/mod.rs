//! Booking domain: seating resolution, holding fee rules and the
//! reservation workflow built on them.

pub mod holding_fee;
pub mod resolver;
pub mod service;

pub use holding_fee::{CreditCardInput, HoldingFee};
pub use resolver::resolve;
pub use service::{Availability, BookingPolicy, BookingRequest};
