#![forbid(unsafe_code)]

//! Core domain model and gamification logic for SeniorFit.
//!
//! This crate provides:
//! - Domain types (exercises, progress records, users)
//! - Exercise and achievement catalog
//! - Scoring, streaks, weekly goals and the perfect-day bonus
//! - Achievement evaluation
//! - Progress submission and exercise recommendation
//! - Persistence (memory and file-backed stores, CSV export)

pub mod types;
pub mod error;
pub mod calendar;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod frequency;
pub mod points;
pub mod streak;
pub mod goals;
pub mod perfect_day;
pub mod achievements;
pub mod feedback;
pub mod store;
pub mod progress_log;
pub mod file_store;
pub mod history;
pub mod engine;
pub mod recommend;
pub mod account;
pub mod export;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use catalog::{build_default_catalog, catalog_with_config, get_default_catalog};
pub use config::Config;
pub use store::{MemoryStore, ProgressQuery, Store};
pub use file_store::FileStore;
pub use achievements::{achievement_overview, AchievementDefinition, Requirement};
pub use engine::{submit_progress, SubmitOutcome, SubmitProgress};
pub use recommend::{recommend_next, Recommendation};
pub use account::{create_user, delete_user, reset_progress, user_status, UserStatus};
pub use export::export_progress;
