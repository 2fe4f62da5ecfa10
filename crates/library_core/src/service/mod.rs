//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep presentation layers decoupled from storage details.
//! - Convert entities into serializable views.

pub mod auth_service;
pub mod book_service;
pub mod catalog_service;
pub mod view;
