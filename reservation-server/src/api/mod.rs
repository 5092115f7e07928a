//! HTTP API
//!
//! # Structure
//!
//! - [`health`] - liveness and database check
//! - [`auth`] - register, login, current user, forgot password
//! - [`profile`] - own profile, reservation history and points
//! - [`availability`] - table availability for a date and party
//! - [`reservations`] - reservation creation
//! - [`admin`] - reservations, tables, users, points and high-traffic dates

pub mod admin;
pub mod auth;
pub mod availability;
pub mod health;
pub mod profile;
pub mod reservations;

pub use crate::utils::{AppError, AppResult};
