//! Page navigation and confidence banding for the detail panel

use serde::{Deserialize, Serialize};

/// Zero-based page cursor clamped to `[0, total)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageNavigator {
    current: usize,
    total: usize,
}

impl PageNavigator {
    pub fn new(total: usize) -> Self {
        Self { current: 0, total }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn has_previous(&self) -> bool {
        self.current > 0
    }

    pub fn has_next(&self) -> bool {
        self.current + 1 < self.total
    }

    pub fn previous(&mut self) -> usize {
        self.current = self.current.saturating_sub(1);
        self.current
    }

    pub fn next(&mut self) -> usize {
        if self.has_next() {
            self.current += 1;
        }
        self.current
    }

    /// Jump to a page index; out-of-range requests go to the last page
    pub fn go_to(&mut self, index: usize) -> usize {
        self.current = index.min(self.total.saturating_sub(1));
        self.current
    }
}

/// Colour band for a detection confidence bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

pub fn confidence_level(confidence: f64) -> ConfidenceLevel {
    if confidence > 0.9 {
        ConfidenceLevel::High
    } else if confidence > 0.7 {
        ConfidenceLevel::Medium
    } else {
        ConfidenceLevel::Low
    }
}
