//! Use-case services.
//!
//! # Responsibility
//! - Expose the people façade operations to callers.
//! - Keep CLI callers decoupled from storage details.

pub mod person_service;
