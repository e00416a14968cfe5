//! Deferred scroll-to-bottom for the transcript view.
//!
//! Requests only mark a scroll as pending. The view calls [`ScrollScheduler::after_layout`]
//! once it has rendered the latest messages; at most one scroll runs per call.

/// The view cannot scroll right now (e.g. container not mounted yet).
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("scroll container unavailable")]
pub struct ScrollUnavailable;

/// A scrollable transcript container.
pub trait ScrollTarget {
    /// Bring the message at `last_index` into view.
    fn scroll_to_bottom(&mut self, last_index: usize) -> Result<(), ScrollUnavailable>;
}

/// Coalesces scroll requests between two layout passes.
#[derive(Debug, Default)]
pub struct ScrollScheduler {
    pending: bool,
    requested: usize,
}

impl ScrollScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&mut self) {
        self.pending = true;
        self.requested += 1;
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Run the pending scroll, if any, against the final transcript length.
    /// Returns the index scrolled to. A missing or unavailable target is ignored and the request is dropped.
    pub fn after_layout(
        &mut self,
        transcript_len: usize,
        target: Option<&mut dyn ScrollTarget>,
    ) -> Option<usize> {
        if !self.pending {
            return None;
        }
        self.pending = false;
        let coalesced = std::mem::take(&mut self.requested);
        let last_index = transcript_len.checked_sub(1)?;
        let target = target?;
        match target.scroll_to_bottom(last_index) {
            Ok(()) => {
                log::trace!("scroll: {} request(s) -> index {}", coalesced, last_index);
                Some(last_index)
            }
            Err(ScrollUnavailable) => None,
        }
    }
}
