use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlineConfig {
    /// Rendered row height in pixels. A drag must travel at least this far
    /// before it reorders anything.
    pub row_height: f32,
    /// How long the dropped tree stays on screen after a move is sent.
    pub settle_window_ms: u64,
    /// Whether the store reports a set of selected blocks.
    pub multi_selection: bool,
    pub connector_lines: bool,
    pub selected_branch_only: bool,
}

impl Default for OutlineConfig {
    fn default() -> Self {
        Self {
            row_height: 36.,
            settle_window_ms: 200,
            multi_selection: false,
            connector_lines: true,
            selected_branch_only: false,
        }
    }
}

impl OutlineConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Self>(json).map(Self::with_defaults)
    }

    /// Replace zeroed sizes with the defaults.
    pub fn with_defaults(mut self) -> Self {
        let defaults = Self::default();
        if self.row_height <= 0. {
            self.row_height = defaults.row_height;
        }
        if self.settle_window_ms == 0 {
            self.settle_window_ms = defaults.settle_window_ms;
        }
        self
    }

    pub fn row_height(mut self, row_height: f32) -> Self {
        self.row_height = row_height;
        self
    }

    pub fn settle_window(mut self, window: Duration) -> Self {
        self.settle_window_ms = window.as_millis() as u64;
        self
    }

    pub fn multi_selection(mut self, multi_selection: bool) -> Self {
        self.multi_selection = multi_selection;
        self
    }

    pub fn settle_duration(&self) -> Duration {
        Duration::from_millis(self.settle_window_ms)
    }
}
