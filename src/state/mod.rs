/// State management module
///
/// This module handles all persisted application state:
/// - Key-value settings storage (settings.rs)
/// - Filter-change tap counter and review prompt gate (review.rs)

pub mod review;
pub mod settings;
