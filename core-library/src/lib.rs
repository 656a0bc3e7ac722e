//! # Course Library Module
//!
//! Owns the canonical course library database and provides repository
//! patterns for data access.
//!
//! ## Overview
//!
//! This module manages:
//! - SQLite connection pooling and embedded migrations
//! - Domain models for courses, assets and attachments
//! - Repository traits and SQLite implementations used by the scan engine
//!   and the surrounding API layer

pub mod db;
pub mod error;
pub mod models;
pub mod repositories;

pub use db::{create_pool, create_test_pool, DatabaseConfig};
pub use error::{LibraryError, Result};
pub use models::{Asset, AssetType, Attachment, Course};
pub use sqlx::SqlitePool;
