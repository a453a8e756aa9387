//! Deferred UI work.
//!
//! Every delayed effect in the application (staggered reveals, the resize
//! debounce, the lightbox auto-hide countdown, transition steps) is a task
//! with a purpose. Scheduling a task cancels any pending task with the same
//! purpose, so a newer event always supersedes an older one.

pub mod scheduler;

pub use scheduler::Scheduler;

/// Why a task was scheduled. Pending tasks are cancelled per purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskPurpose {
    ResizeDebounce,
    AutoHide,
    RevealBatch,
    ContentSwap,
    ImageScale,
    ThemeUnlock,
    PreloaderExit,
}

impl TaskPurpose {
    /// Short name used in log fields.
    pub fn short_name(&self) -> &'static str {
        match self {
            TaskPurpose::ResizeDebounce => "resize-debounce",
            TaskPurpose::AutoHide => "autohide",
            TaskPurpose::RevealBatch => "reveal-batch",
            TaskPurpose::ContentSwap => "content-swap",
            TaskPurpose::ImageScale => "image-scale",
            TaskPurpose::ThemeUnlock => "theme-unlock",
            TaskPurpose::PreloaderExit => "preloader-exit",
        }
    }
}

impl std::fmt::Display for TaskPurpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.short_name())
    }
}
