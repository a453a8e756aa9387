//! Startup splash that tracks how many images have been loaded.

use std::time::Duration;

use crate::config::PreloaderConfig;
use crate::tasks::{Scheduler, TaskPurpose};

const MESSAGES: [&str; 7] = [
    "Loading amazing photos",
    "Preparing your visual journey",
    "Processing your collection",
    "Optimizing display quality",
    "Almost there",
    "Arranging your gallery",
    "Finalizing your experience",
];

const READY_TEXT: &str = "Ready to explore!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreloaderTask {
    Exit,
}

/// Progress message for a completion percentage.
pub fn message_for(percent: u8) -> &'static str {
    let index = match percent {
        91.. => 6,
        76.. => 5,
        61.. => 4,
        46.. => 3,
        31.. => 2,
        16.. => 1,
        _ => 0,
    };
    MESSAGES[index]
}

#[derive(Debug)]
pub struct Preloader {
    config: PreloaderConfig,
    total: usize,
    loaded: usize,
    removed: bool,
    text: String,
}

impl Preloader {
    pub fn new(total: usize, config: PreloaderConfig) -> Self {
        Self {
            config,
            total,
            loaded: 0,
            removed: false,
            text: format!("{}...", MESSAGES[0]),
        }
    }

    /// Arm the exit timers. With nothing to load the splash still stays up
    /// for the minimum display time.
    pub fn start<T: From<PreloaderTask>>(&mut self, scheduler: &mut Scheduler<T>) {
        let delay = if self.total == 0 {
            self.config.min_display_ms
        } else {
            self.config.force_ms
        };
        scheduler.schedule(
            TaskPurpose::PreloaderExit,
            Duration::from_millis(delay),
            PreloaderTask::Exit.into(),
        );
    }

    /// Count one asset as loaded. Failed loads count too. Returns the
    /// completion percentage.
    pub fn asset_loaded<T: From<PreloaderTask>>(&mut self, scheduler: &mut Scheduler<T>) -> u8 {
        if self.total == 0 || self.loaded >= self.total {
            return self.percent();
        }

        self.loaded += 1;
        let percent = self.percent();
        if !self.removed {
            self.text = format!("{}... {}%", message_for(percent), percent);
        }

        if self.loaded == self.total && !self.removed {
            tracing::debug!(total = self.total, "All assets loaded");
            self.assets_settled(scheduler);
        }
        percent
    }

    /// Everything the splash waits for has arrived. It leaves after a short
    /// settle pause. With no assets the minimum display timer stays armed.
    pub fn assets_settled<T: From<PreloaderTask>>(&mut self, scheduler: &mut Scheduler<T>) {
        if self.removed || self.total == 0 {
            return;
        }
        scheduler.schedule(
            TaskPurpose::PreloaderExit,
            Duration::from_millis(self.config.settle_ms),
            PreloaderTask::Exit.into(),
        );
    }

    /// Dismiss the splash. Only the first call has any effect.
    pub fn hide(&mut self) -> bool {
        if self.removed {
            return false;
        }
        self.removed = true;
        self.text = READY_TEXT.to_string();
        tracing::info!(loaded = self.loaded, total = self.total, "Preloader hidden");
        true
    }

    pub fn on_task(&mut self, task: PreloaderTask) -> bool {
        match task {
            PreloaderTask::Exit => self.hide(),
        }
    }

    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        ((self.loaded as f64 / self.total as f64) * 100.0).round() as u8
    }

    pub fn is_visible(&self) -> bool {
        !self.removed
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn loaded(&self) -> usize {
        self.loaded
    }

    pub fn total(&self) -> usize {
        self.total
    }
}
