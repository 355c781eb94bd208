/// Filter-change tap counter and review prompt gate
///
/// Every confirmed filter change bumps a persisted counter. Once the count
/// passes the threshold, every further change asks for a review; the
/// [`ReviewPrompt`] decides how many of those requests reach the user.

use super::settings::{self, SettingsResult, SettingsStore};
use crate::filter::FilterKind;
use crate::pipeline::{FilterChange, Pipeline};

/// Settings key for the persisted counter
pub const TAP_COUNT_KEY: &str = "changeFilterTapCount";

/// Number of filter changes that must be exceeded before asking for a review
pub const DEFAULT_REVIEW_THRESHOLD: u64 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TapOutcome {
    /// Counter value after this change
    pub count: u64,
    /// True on every change once the count is past the threshold
    pub request_review: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct TapCounter {
    threshold: u64,
}

impl Default for TapCounter {
    fn default() -> Self {
        Self::new(DEFAULT_REVIEW_THRESHOLD)
    }
}

impl TapCounter {
    pub fn new(threshold: u64) -> Self {
        Self { threshold }
    }

    /// Current persisted count (0 if never written)
    pub fn count(&self, store: &dyn SettingsStore) -> SettingsResult<u64> {
        Ok(settings::load::<u64>(store, TAP_COUNT_KEY)?.unwrap_or(0))
    }

    /// Record one confirmed filter change
    pub fn record_filter_change(&self, store: &mut dyn SettingsStore) -> SettingsResult<TapOutcome> {
        let count = self.count(store)?.saturating_add(1);
        settings::store(store, TAP_COUNT_KEY, &count)?;

        Ok(TapOutcome {
            count,
            request_review: count > self.threshold,
        })
    }
}

/// Receives review requests and throttles what is actually shown
pub trait ReviewPrompt {
    fn request_review(&mut self, count: u64);
}

/// Lets the first review request of a session through and drops the rest
#[derive(Debug, Default)]
pub struct SessionReviewPrompt {
    shown: bool,
    pending: Option<u64>,
}

impl SessionReviewPrompt {
    /// The request waiting to be shown, if any. Taking it counts as shown.
    pub fn take_pending(&mut self) -> Option<u64> {
        let pending = self.pending.take();
        if pending.is_some() {
            self.shown = true;
        }
        pending
    }
}

impl ReviewPrompt for SessionReviewPrompt {
    fn request_review(&mut self, count: u64) {
        if self.shown || self.pending.is_some() {
            log::debug!("Review already requested this session ({} changes)", count);
            return;
        }
        self.pending = Some(count);
    }
}

/// Apply a filter picked from the menu and count it.
///
/// Without a photo the pipeline ignores the choice and nothing is counted.
/// A settings failure is logged; the filter change itself still stands.
pub fn confirm_filter_change(
    pipeline: &mut Pipeline,
    kind: FilterKind,
    counter: &TapCounter,
    store: &mut dyn SettingsStore,
    prompt: &mut dyn ReviewPrompt,
) -> FilterChange {
    let change = pipeline.select_filter(kind);
    if change == FilterChange::Ignored {
        log::debug!("Ignoring filter change to {}: no photo loaded", kind);
        return change;
    }

    log::info!("🎨 Filter changed to {}", kind);

    match counter.record_filter_change(store) {
        Ok(outcome) if outcome.request_review => {
            log::info!("⭐ {} filter changes, asking for a review", outcome.count);
            prompt.request_review(outcome.count);
        }
        Ok(_) => {}
        Err(e) => log::warn!("⚠️  Could not update filter change count: {}", e),
    }

    change
}
