//! Per-page dirty and erase tracking.
//!
//! Every page of the frame buffer carries an inclusive column range of bytes
//! changed since the last flush. A second table records what has been sent
//! to the device since the last full clear, so the visible region can be
//! blanked or resent after erase, flip and scroll.

/// Sentinel minimum for a clean range; any real column is below it.
const CLEAN_MIN: i16 = i16::MAX;
/// Sentinel maximum for a clean range; any real column is above it.
const CLEAN_MAX: i16 = -1;

/// Inclusive column bounds touched on one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    min: i16,
    max: i16,
}

impl Default for PageRange {
    fn default() -> Self {
        Self::CLEAN
    }
}

impl PageRange {
    /// The untouched range.
    pub const CLEAN: PageRange = PageRange {
        min: CLEAN_MIN,
        max: CLEAN_MAX,
    };

    /// Expands the range to include column `x`.
    #[inline]
    pub fn include(&mut self, x: u8) {
        let x = i16::from(x);
        self.min = self.min.min(x);
        self.max = self.max.max(x);
    }

    /// Expands the range to include columns `x0..=x1`, in either order.
    #[inline]
    pub fn include_span(&mut self, x0: u8, x1: u8) {
        self.include(x0.min(x1));
        self.include(x0.max(x1));
    }

    /// Expands the range to include `other`.
    #[inline]
    pub fn merge(&mut self, other: &PageRange) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    /// Returns true if nothing has been recorded.
    #[inline]
    pub fn is_clean(&self) -> bool {
        self.min == CLEAN_MIN && self.max == CLEAN_MAX
    }

    /// Resets to the untouched range.
    #[inline]
    pub fn set_clean(&mut self) {
        *self = Self::CLEAN;
    }

    /// Returns the inclusive `(min, max)` columns, or `None` when clean.
    pub fn bounds(&self) -> Option<(u8, u8)> {
        if self.min > self.max {
            return None;
        }
        // Both ends came from u8 columns.
        Some((self.min as u8, self.max as u8))
    }
}

/// Dirty and erase tables for every page of a buffer.
#[derive(Debug, Clone, Default)]
pub struct PageTracker {
    dirty: Vec<PageRange>,
    erase: Vec<PageRange>,
    pending_erase: bool,
}

impl PageTracker {
    /// Creates a tracker for `pages` clean pages.
    pub fn new(pages: usize) -> Self {
        Self {
            dirty: vec![PageRange::CLEAN; pages],
            erase: vec![PageRange::CLEAN; pages],
            pending_erase: false,
        }
    }

    /// Number of pages tracked.
    pub fn pages(&self) -> usize {
        self.dirty.len()
    }

    /// Marks every page clean in both tables, resizing to `pages`.
    pub fn reset(&mut self, pages: usize) {
        self.dirty.clear();
        self.dirty.resize(pages, PageRange::CLEAN);
        self.erase.clear();
        self.erase.resize(pages, PageRange::CLEAN);
        self.pending_erase = false;
    }

    /// Records a change at column `x` on `page`.
    #[inline]
    pub fn mark(&mut self, page: usize, x: u8) {
        if let Some(range) = self.dirty.get_mut(page) {
            range.include(x);
        }
    }

    /// Records a change over columns `x0..=x1` on `page`.
    #[inline]
    pub fn mark_span(&mut self, page: usize, x0: u8, x1: u8) {
        if let Some(range) = self.dirty.get_mut(page) {
            range.include_span(x0, x1);
        }
    }

    /// Dirty range of `page`.
    pub fn dirty(&self, page: usize) -> PageRange {
        self.dirty.get(page).copied().unwrap_or_default()
    }

    /// Range of `page` currently shown on the device.
    pub fn erase(&self, page: usize) -> PageRange {
        self.erase.get(page).copied().unwrap_or_default()
    }

    /// Returns true if the next flush must also resend erased regions.
    pub fn pending_erase(&self) -> bool {
        self.pending_erase
    }

    /// Returns true if no page would be sent by a flush.
    pub fn is_clean(&self) -> bool {
        (0..self.pages()).all(|page| self.transfer_range(page).is_clean())
    }

    /// Range a flush must send for `page`: dirty, plus erased when pending.
    pub fn transfer_range(&self, page: usize) -> PageRange {
        let mut range = self.dirty(page);
        if self.pending_erase {
            range.merge(&self.erase(page));
        }
        range
    }

    /// Records that `page` has been sent.
    ///
    /// A pending erase region is now blank on the device, so it is dropped
    /// before the just-sent dirty range is folded into the erase table.
    pub fn commit(&mut self, page: usize) {
        let pending = self.pending_erase;
        if let (Some(dirty), Some(erase)) = (self.dirty.get_mut(page), self.erase.get_mut(page)) {
            if pending {
                erase.set_clean();
            }
            erase.merge(dirty);
            dirty.set_clean();
        }
    }

    /// Ends a flush pass.
    pub fn finish_flush(&mut self) {
        self.pending_erase = false;
    }

    /// Folds the erase range of `page` into its dirty range.
    pub fn absorb_erase(&mut self, page: usize) {
        if let (Some(dirty), Some(erase)) = (self.dirty.get_mut(page), self.erase.get(page)) {
            dirty.merge(erase);
        }
    }

    /// Folds every erase range into its dirty range so the next flush
    /// resends everything currently visible.
    pub fn absorb_erase_all(&mut self) {
        for page in 0..self.pages() {
            self.absorb_erase(page);
        }
    }

    /// Clears the dirty range of `page`, returning its bounds.
    pub fn take_dirty(&mut self, page: usize) -> Option<(u8, u8)> {
        let range = self.dirty.get_mut(page)?;
        let bounds = range.bounds();
        range.set_clean();
        bounds
    }

    /// Requests that the next flush also sends the erase regions.
    pub fn set_pending_erase(&mut self) {
        self.pending_erase = true;
    }
}
