//! Utility functions for URL processing, password hashing and database errors.
//!
//! This module provides helper functions used across the application:
//!
//! - [`url_normalizer`] - URL normalization and sanitization
//! - [`password`] - Argon2 hashing and verification
//! - [`db_error`] - Mapping of constraint names to API field names

pub mod db_error;
pub mod password;
pub mod url_normalizer;
