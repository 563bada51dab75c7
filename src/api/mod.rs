//! Portal REST API access.
//!
//! `client` owns transport concerns (base URL, bearer token, status and
//! error-body mapping); `endpoints` adds the typed routes on top.

pub mod client;
pub mod endpoints;

pub use client::{take_field, ApiClient};
pub use endpoints::{
    Allergies, Histories, LoginRequest, LoginResponse, PatientCollection, Prescriptions,
};
