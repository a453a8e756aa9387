//! Full-size viewer over the flat photo collection.
//!
//! The lightbox ignores category filtering: it always walks the whole
//! catalog, wrapping at both ends. While open it traps focus among its own
//! controls, turns horizontal swipes into navigation and hides its chrome
//! after a period without activity.

use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;
use thiserror::Error;

use crate::catalog::Catalog;
use crate::config::LightboxConfig;
use crate::diagnostics::{Diagnostics, MissingAnchor};
use crate::tasks::{Scheduler, TaskPurpose};

const REST_SCALE: f32 = 1.0;
const ZOOM_SCALE: f32 = 1.02;
const SHRINK_SCALE: f32 = 0.98;
/// How far the image follows the pointer while dragging.
const DRAG_FOLLOW: f32 = 0.08;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Prev,
    Next,
}

impl Direction {
    pub fn offset(self) -> isize {
        match self {
            Direction::Prev => -1,
            Direction::Next => 1,
        }
    }
}

/// Focusable controls inside the viewer, in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightboxControl {
    Close,
    Previous,
    Next,
    Download,
}

impl LightboxControl {
    pub const TAB_ORDER: [LightboxControl; 4] = [
        LightboxControl::Close,
        LightboxControl::Previous,
        LightboxControl::Next,
        LightboxControl::Download,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            LightboxControl::Close => "Close",
            LightboxControl::Previous => "Previous",
            LightboxControl::Next => "Next",
            LightboxControl::Download => "Download",
        }
    }
}

/// Deferred lightbox work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightboxTask {
    AutoHide,
    ContentSwap,
    ScaleUp,
}

/// What the viewer is showing.
#[derive(Debug, Clone, PartialEq)]
pub struct LightboxContent {
    pub image: PathBuf,
    pub caption: String,
    pub meta: String,
}

/// An element outside the viewer that can hold focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FocusTarget(pub usize);

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum FocusError {
    #[error("focusing without scrolling is not supported")]
    Unsupported,
    #[error("focus target no longer exists")]
    Missing,
}

/// The page around the viewer: its focus and scroll position.
pub trait FocusHost {
    fn focused(&self) -> Option<FocusTarget>;
    fn scroll_offset(&self) -> f32;
    fn focus(&mut self, target: FocusTarget, prevent_scroll: bool) -> Result<(), FocusError>;
    fn scroll_to(&mut self, offset: f32);
}

/// Warms up images before they are needed.
pub trait ImagePreloader {
    fn preload(&mut self, image: &Path);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Tab,
    Escape,
    ArrowLeft,
    ArrowRight,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyInput {
    pub key: Key,
    pub shift: bool,
}

impl KeyInput {
    pub fn new(key: Key) -> Self {
        Self { key, shift: false }
    }

    pub fn shifted(key: Key) -> Self {
        Self { key, shift: true }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct RestorePoint {
    focus: Option<FocusTarget>,
    scroll: f32,
}

#[derive(Debug, Clone, Copy)]
struct Drag {
    start_x: f32,
    last_x: f32,
}

#[derive(Debug)]
struct OpenState {
    index: usize,
    content: LightboxContent,
    controls_visible: bool,
    focus: usize,
    restore: RestorePoint,
    drag: Option<Drag>,
    scale: f32,
}

#[derive(Debug)]
enum State {
    Closed,
    Open(OpenState),
}

pub struct Lightbox {
    catalog: Arc<Catalog>,
    config: LightboxConfig,
    diagnostics: Rc<dyn Diagnostics>,
    state: State,
    last_index: usize,
}

impl Lightbox {
    pub fn new(catalog: Arc<Catalog>, config: LightboxConfig, diagnostics: Rc<dyn Diagnostics>) -> Self {
        Self {
            catalog,
            config,
            diagnostics,
            state: State::Closed,
            last_index: 0,
        }
    }

    /// Open on `image`, remembering where focus and scroll were.
    pub fn open<T: From<LightboxTask>>(
        &mut self,
        image: &Path,
        host: &dyn FocusHost,
        preloader: &mut dyn ImagePreloader,
        scheduler: &mut Scheduler<T>,
    ) {
        if self.catalog.is_empty() {
            self.diagnostics
                .missing_anchor(MissingAnchor::ImageCollection, "no images to open");
            return;
        }

        let index = match self.catalog.position(image) {
            Some(i) => i,
            None => {
                self.diagnostics.missing_anchor(
                    MissingAnchor::GalleryImage,
                    &format!("{} is not in the gallery, showing the first image", image.display()),
                );
                0
            }
        };

        // Reopening keeps the first restore point
        let restore = match &self.state {
            State::Open(open) => open.restore.clone(),
            State::Closed => RestorePoint {
                focus: host.focused(),
                scroll: host.scroll_offset(),
            },
        };

        self.state = State::Open(OpenState {
            index,
            content: self.content_at(index),
            controls_visible: true,
            focus: 0,
            restore,
            drag: None,
            scale: REST_SCALE,
        });
        self.last_index = index;

        scheduler.schedule(
            TaskPurpose::ImageScale,
            self.config.open_zoom_delay(),
            LightboxTask::ScaleUp.into(),
        );
        self.reset_auto_hide(scheduler);
        self.preload_adjacent(preloader);

        tracing::debug!(index, total = self.catalog.len(), "Lightbox opened");
    }

    /// Close and hand focus and scroll back to the page. No-op when closed.
    pub fn close<T>(&mut self, host: &mut dyn FocusHost, scheduler: &mut Scheduler<T>) {
        let open = match std::mem::replace(&mut self.state, State::Closed) {
            State::Open(open) => open,
            State::Closed => return,
        };

        scheduler.cancel(TaskPurpose::AutoHide);
        scheduler.cancel(TaskPurpose::ContentSwap);
        scheduler.cancel(TaskPurpose::ImageScale);

        if let Some(target) = open.restore.focus {
            let restored = match host.focus(target, true) {
                Err(FocusError::Unsupported) => host.focus(target, false),
                other => other,
            };
            if let Err(e) = restored {
                self.diagnostics
                    .missing_anchor(MissingAnchor::FocusTarget, &format!("cannot restore focus: {}", e));
            }
        }
        host.scroll_to(open.restore.scroll);

        tracing::debug!(index = open.index, "Lightbox closed");
    }

    /// Step one image back or forward, wrapping at both ends.
    /// Returns false when the viewer is closed.
    pub fn navigate<T: From<LightboxTask>>(
        &mut self,
        direction: Direction,
        preloader: &mut dyn ImagePreloader,
        scheduler: &mut Scheduler<T>,
    ) -> bool {
        let total = self.catalog.len();
        let open = match &mut self.state {
            State::Open(open) if total > 0 => open,
            _ => return false,
        };

        open.index = (open.index as isize + direction.offset()).rem_euclid(total as isize) as usize;
        open.scale = SHRINK_SCALE;
        self.last_index = open.index;

        scheduler.schedule(
            TaskPurpose::ContentSwap,
            self.config.swap_delay(),
            LightboxTask::ContentSwap.into(),
        );
        scheduler.cancel(TaskPurpose::ImageScale);
        self.reset_auto_hide(scheduler);
        self.preload_adjacent(preloader);
        true
    }

    /// Keyboard input while open. Returns whether the key was used.
    pub fn handle_key<T: From<LightboxTask>>(
        &mut self,
        input: KeyInput,
        host: &mut dyn FocusHost,
        preloader: &mut dyn ImagePreloader,
        scheduler: &mut Scheduler<T>,
    ) -> bool {
        if !self.is_open() {
            return false;
        }
        self.activity(scheduler);

        match input.key {
            Key::Tab => {
                if let State::Open(open) = &mut self.state {
                    let len = LightboxControl::TAB_ORDER.len();
                    open.focus = if input.shift {
                        (open.focus + len - 1) % len
                    } else {
                        (open.focus + 1) % len
                    };
                }
                true
            }
            Key::Escape => {
                self.close(host, scheduler);
                true
            }
            Key::ArrowLeft => self.navigate(Direction::Prev, preloader, scheduler),
            Key::ArrowRight => self.navigate(Direction::Next, preloader, scheduler),
            Key::Other => false,
        }
    }

    /// Pointer or key activity: show the controls and restart the countdown.
    pub fn activity<T: From<LightboxTask>>(&mut self, scheduler: &mut Scheduler<T>) {
        if let State::Open(open) = &mut self.state {
            open.controls_visible = true;
            self.reset_auto_hide(scheduler);
        }
    }

    pub fn drag_start(&mut self, x: f32) {
        if let State::Open(open) = &mut self.state {
            open.drag = Some(Drag { start_x: x, last_x: x });
        }
    }

    pub fn drag_move(&mut self, x: f32) {
        if let State::Open(OpenState { drag: Some(drag), .. }) = &mut self.state {
            drag.last_x = x;
        }
    }

    /// Finish a drag. Past the threshold it navigates once, otherwise the
    /// image snaps back.
    pub fn drag_end<T: From<LightboxTask>>(
        &mut self,
        preloader: &mut dyn ImagePreloader,
        scheduler: &mut Scheduler<T>,
    ) -> Option<Direction> {
        let drag = match &mut self.state {
            State::Open(open) => open.drag.take()?,
            State::Closed => return None,
        };

        let delta = drag.last_x - drag.start_x;
        if delta.abs() <= self.config.drag_threshold {
            return None;
        }

        // Dragging left brings in the next image
        let direction = if delta < 0.0 { Direction::Next } else { Direction::Prev };
        self.navigate(direction, preloader, scheduler).then_some(direction)
    }

    /// The pointer left the viewer mid-drag.
    pub fn drag_cancel<T: From<LightboxTask>>(
        &mut self,
        preloader: &mut dyn ImagePreloader,
        scheduler: &mut Scheduler<T>,
    ) -> Option<Direction> {
        if self.is_dragging() {
            self.drag_end(preloader, scheduler)
        } else {
            None
        }
    }

    /// Trackpad or wheel scroll. Mostly-horizontal deltas past the threshold
    /// navigate.
    pub fn wheel<T: From<LightboxTask>>(
        &mut self,
        dx: f32,
        dy: f32,
        preloader: &mut dyn ImagePreloader,
        scheduler: &mut Scheduler<T>,
    ) -> Option<Direction> {
        if dx.abs() <= dy.abs() || dx.abs() <= self.config.wheel_threshold {
            return None;
        }
        let direction = if dx > 0.0 { Direction::Next } else { Direction::Prev };
        self.navigate(direction, preloader, scheduler).then_some(direction)
    }

    /// Run a due lightbox task. Stale tasks after close are ignored.
    pub fn on_task<T: From<LightboxTask>>(&mut self, task: LightboxTask, scheduler: &mut Scheduler<T>) {
        let index = match &self.state {
            State::Open(open) => open.index,
            State::Closed => return,
        };

        match task {
            LightboxTask::AutoHide => {
                if let State::Open(open) = &mut self.state {
                    open.controls_visible = false;
                }
            }
            LightboxTask::ContentSwap => {
                let content = self.content_at(index);
                if let State::Open(open) = &mut self.state {
                    open.content = content;
                }
                scheduler.schedule(
                    TaskPurpose::ImageScale,
                    self.config.scale_up_delay(),
                    LightboxTask::ScaleUp.into(),
                );
            }
            LightboxTask::ScaleUp => {
                if let State::Open(open) = &mut self.state {
                    open.scale = ZOOM_SCALE;
                }
            }
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, State::Open(_))
    }

    /// Current position in the flat collection, while open.
    pub fn index(&self) -> Option<usize> {
        match &self.state {
            State::Open(open) => Some(open.index),
            State::Closed => None,
        }
    }

    /// Index shown most recently, kept after close.
    pub fn last_index(&self) -> usize {
        self.last_index
    }

    pub fn total(&self) -> usize {
        self.catalog.len()
    }

    pub fn content(&self) -> Option<&LightboxContent> {
        match &self.state {
            State::Open(open) => Some(&open.content),
            State::Closed => None,
        }
    }

    pub fn controls_visible(&self) -> bool {
        matches!(&self.state, State::Open(open) if open.controls_visible)
    }

    pub fn focused_control(&self) -> Option<LightboxControl> {
        match &self.state {
            State::Open(open) => Some(LightboxControl::TAB_ORDER[open.focus]),
            State::Closed => None,
        }
    }

    pub fn image_scale(&self) -> f32 {
        match &self.state {
            State::Open(open) => open.scale,
            State::Closed => REST_SCALE,
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(&self.state, State::Open(OpenState { drag: Some(_), .. }))
    }

    /// Horizontal offset of the image while it follows a drag.
    pub fn drag_offset(&self) -> f32 {
        match &self.state {
            State::Open(OpenState { drag: Some(drag), .. }) => (drag.last_x - drag.start_x) * DRAG_FOLLOW,
            _ => 0.0,
        }
    }

    fn content_at(&self, index: usize) -> LightboxContent {
        match self.catalog.get(index) {
            Some(item) => LightboxContent {
                image: item.image.clone(),
                caption: item.caption.clone(),
                meta: item.meta_line(),
            },
            None => LightboxContent {
                image: PathBuf::new(),
                caption: String::new(),
                meta: String::new(),
            },
        }
    }

    fn reset_auto_hide<T: From<LightboxTask>>(&self, scheduler: &mut Scheduler<T>) {
        scheduler.schedule(
            TaskPurpose::AutoHide,
            self.config.auto_hide(),
            LightboxTask::AutoHide.into(),
        );
    }

    fn preload_adjacent(&self, preloader: &mut dyn ImagePreloader) {
        let (index, total) = match &self.state {
            State::Open(open) if !self.catalog.is_empty() => (open.index, self.catalog.len()),
            _ => return,
        };
        for neighbour in [(index + 1) % total, (index + total - 1) % total] {
            if let Some(item) = self.catalog.get(neighbour) {
                preloader.preload(&item.image);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Category, GalleryItem};
    use crate::diagnostics::RecordingDiagnostics;
    use std::time::Duration;

    struct FakeHost {
        focused: Option<FocusTarget>,
        scroll: f32,
        existing: Vec<FocusTarget>,
        prevent_scroll_supported: bool,
        focus_calls: Vec<(FocusTarget, bool)>,
    }

    impl FakeHost {
        fn new() -> Self {
            Self {
                focused: Some(FocusTarget(3)),
                scroll: 420.0,
                existing: vec![FocusTarget(3)],
                prevent_scroll_supported: true,
                focus_calls: Vec::new(),
            }
        }
    }

    impl FocusHost for FakeHost {
        fn focused(&self) -> Option<FocusTarget> {
            self.focused
        }

        fn scroll_offset(&self) -> f32 {
            self.scroll
        }

        fn focus(&mut self, target: FocusTarget, prevent_scroll: bool) -> Result<(), FocusError> {
            self.focus_calls.push((target, prevent_scroll));
            if !self.existing.contains(&target) {
                return Err(FocusError::Missing);
            }
            if prevent_scroll && !self.prevent_scroll_supported {
                return Err(FocusError::Unsupported);
            }
            self.focused = Some(target);
            Ok(())
        }

        fn scroll_to(&mut self, offset: f32) {
            self.scroll = offset;
        }
    }

    #[derive(Default)]
    struct RecordingPreloader(Vec<PathBuf>);

    impl ImagePreloader for RecordingPreloader {
        fn preload(&mut self, image: &Path) {
            self.0.push(image.to_path_buf());
        }
    }

    fn catalog(n: usize) -> Arc<Catalog> {
        let items = (0..n)
            .map(|i| {
                GalleryItem::new(format!("{}.jpg", i), Category::Scenery, format!("Photo {}", i))
                    .with_location(format!("Place {}", i))
                    .with_camera("Nikon D750")
            })
            .collect();
        Arc::new(Catalog::new(items))
    }

    struct Harness {
        lightbox: Lightbox,
        diagnostics: Rc<RecordingDiagnostics>,
        host: FakeHost,
        preloader: RecordingPreloader,
        scheduler: Scheduler<LightboxTask>,
    }

    impl Harness {
        fn new(n: usize) -> Self {
            let diagnostics = Rc::new(RecordingDiagnostics::default());
            Self {
                lightbox: Lightbox::new(catalog(n), LightboxConfig::default(), diagnostics.clone()),
                diagnostics,
                host: FakeHost::new(),
                preloader: RecordingPreloader::default(),
                scheduler: Scheduler::new(),
            }
        }

        fn open(&mut self, index: usize) {
            let image = PathBuf::from(format!("{}.jpg", index));
            self.lightbox
                .open(&image, &self.host, &mut self.preloader, &mut self.scheduler);
        }

        fn navigate(&mut self, direction: Direction) -> bool {
            self.lightbox
                .navigate(direction, &mut self.preloader, &mut self.scheduler)
        }

        fn key(&mut self, input: KeyInput) -> bool {
            self.lightbox.handle_key(
                input,
                &mut self.host,
                &mut self.preloader,
                &mut self.scheduler,
            )
        }

        fn close(&mut self) {
            self.lightbox.close(&mut self.host, &mut self.scheduler);
        }

        fn run_for(&mut self, span: Duration) {
            let target = self.scheduler.now() + span;
            loop {
                let due = self.scheduler.advance_to(target);
                if due.is_empty() {
                    break;
                }
                for task in due {
                    self.lightbox.on_task(task, &mut self.scheduler);
                }
            }
        }
    }

    #[test]
    fn test_backward_sequence_wraps() {
        let mut h = Harness::new(7);
        h.open(3);
        assert_eq!(h.lightbox.index(), Some(3));

        let mut seen = Vec::new();
        for _ in 0..5 {
            assert!(h.navigate(Direction::Prev));
            seen.push(h.lightbox.index().unwrap());
        }
        assert_eq!(seen, vec![2, 1, 0, 6, 5]);
    }

    #[test]
    fn test_forward_wraps_to_start() {
        let mut h = Harness::new(4);
        h.open(3);
        h.navigate(Direction::Next);
        assert_eq!(h.lightbox.index(), Some(0));
    }

    #[test]
    fn test_open_populates_content_and_focus() {
        let mut h = Harness::new(5);
        h.open(2);

        let content = h.lightbox.content().unwrap();
        assert_eq!(content.image, PathBuf::from("2.jpg"));
        assert_eq!(content.caption, "Photo 2");
        assert_eq!(content.meta, "Place 2 • Nikon D750");
        assert_eq!(h.lightbox.focused_control(), Some(LightboxControl::Close));
        assert!(h.lightbox.controls_visible());
        assert_eq!(
            h.preloader.0,
            vec![PathBuf::from("3.jpg"), PathBuf::from("1.jpg")]
        );
    }

    #[test]
    fn test_open_unknown_image_falls_back_to_first() {
        let mut h = Harness::new(3);
        h.lightbox.open(
            Path::new("elsewhere.jpg"),
            &h.host,
            &mut h.preloader,
            &mut h.scheduler,
        );
        assert_eq!(h.lightbox.index(), Some(0));
        assert_eq!(h.diagnostics.count(MissingAnchor::GalleryImage), 1);
    }

    #[test]
    fn test_open_with_no_images_stays_closed() {
        let mut h = Harness::new(0);
        h.open(0);
        assert!(!h.lightbox.is_open());
        assert_eq!(h.diagnostics.count(MissingAnchor::ImageCollection), 1);
        assert!(!h.navigate(Direction::Next));
    }

    #[test]
    fn test_content_swaps_after_transition() {
        let mut h = Harness::new(3);
        h.open(0);
        h.run_for(Duration::from_millis(150));
        assert_eq!(h.lightbox.image_scale(), ZOOM_SCALE);

        h.navigate(Direction::Next);
        assert_eq!(h.lightbox.index(), Some(1));
        assert_eq!(h.lightbox.image_scale(), SHRINK_SCALE);
        assert_eq!(h.lightbox.content().unwrap().caption, "Photo 0");

        h.run_for(Duration::from_millis(100));
        assert_eq!(h.lightbox.content().unwrap().caption, "Photo 1");
        assert_eq!(h.lightbox.image_scale(), SHRINK_SCALE);

        h.run_for(Duration::from_millis(50));
        assert_eq!(h.lightbox.image_scale(), ZOOM_SCALE);
    }

    #[test]
    fn test_navigate_preloads_neighbours() {
        let mut h = Harness::new(5);
        h.open(0);
        h.preloader.0.clear();

        h.navigate(Direction::Prev);
        assert_eq!(
            h.preloader.0,
            vec![PathBuf::from("0.jpg"), PathBuf::from("3.jpg")]
        );
    }

    #[test]
    fn test_close_restores_focus_and_scroll() {
        let mut h = Harness::new(3);
        h.open(1);
        h.host.focused = None;
        h.host.scroll = 0.0;

        h.close();
        assert!(!h.lightbox.is_open());
        assert_eq!(h.host.focused, Some(FocusTarget(3)));
        assert_eq!(h.host.scroll, 420.0);
        assert_eq!(h.host.focus_calls, vec![(FocusTarget(3), true)]);
        assert!(h.scheduler.is_idle());
        assert_eq!(h.lightbox.last_index(), 1);
    }

    #[test]
    fn test_close_falls_back_to_plain_focus() {
        let mut h = Harness::new(3);
        h.host.prevent_scroll_supported = false;
        h.open(0);
        h.close();

        assert_eq!(
            h.host.focus_calls,
            vec![(FocusTarget(3), true), (FocusTarget(3), false)]
        );
        assert!(h.diagnostics.is_empty());
    }

    #[test]
    fn test_close_with_vanished_focus_target_still_closes() {
        let mut h = Harness::new(3);
        h.open(0);
        h.host.existing.clear();

        h.close();
        assert!(!h.lightbox.is_open());
        assert_eq!(h.diagnostics.count(MissingAnchor::FocusTarget), 1);
        assert_eq!(h.host.scroll, 420.0);
    }

    #[test]
    fn test_close_when_closed_is_a_no_op() {
        let mut h = Harness::new(3);
        h.close();
        assert!(!h.lightbox.is_open());
        assert!(h.host.focus_calls.is_empty());
        assert_eq!(h.host.scroll, 420.0);

        h.open(0);
        h.close();
        h.close();
        assert_eq!(h.host.focus_calls.len(), 1);
    }

    #[test]
    fn test_reopen_keeps_first_restore_point() {
        let mut h = Harness::new(3);
        h.open(0);
        h.host.scroll = 10.0;
        h.open(2);
        assert_eq!(h.lightbox.index(), Some(2));

        h.close();
        assert_eq!(h.host.scroll, 420.0);
    }

    #[test]
    fn test_tab_cycles_within_controls() {
        let mut h = Harness::new(3);
        h.open(0);

        assert!(h.key(KeyInput::shifted(Key::Tab)));
        assert_eq!(h.lightbox.focused_control(), Some(LightboxControl::Download));

        h.key(KeyInput::new(Key::Tab));
        assert_eq!(h.lightbox.focused_control(), Some(LightboxControl::Close));

        for _ in 0..3 {
            h.key(KeyInput::new(Key::Tab));
        }
        assert_eq!(h.lightbox.focused_control(), Some(LightboxControl::Download));
        h.key(KeyInput::new(Key::Tab));
        assert_eq!(h.lightbox.focused_control(), Some(LightboxControl::Close));
    }

    #[test]
    fn test_keys_navigate_and_close() {
        let mut h = Harness::new(3);
        h.open(0);

        assert!(h.key(KeyInput::new(Key::ArrowLeft)));
        assert_eq!(h.lightbox.index(), Some(2));
        assert!(h.key(KeyInput::new(Key::ArrowRight)));
        assert_eq!(h.lightbox.index(), Some(0));
        assert!(!h.key(KeyInput::new(Key::Other)));

        assert!(h.key(KeyInput::new(Key::Escape)));
        assert!(!h.lightbox.is_open());
        assert!(!h.key(KeyInput::new(Key::ArrowRight)));
    }

    #[test]
    fn test_drag_threshold() {
        let mut h = Harness::new(5);
        h.open(2);

        h.lightbox.drag_start(100.0);
        h.lightbox.drag_move(80.0);
        h.lightbox.drag_move(65.0);
        assert!((h.lightbox.drag_offset() - (-35.0 * DRAG_FOLLOW)).abs() < f32::EPSILON);
        assert_eq!(h.lightbox.drag_end(&mut h.preloader, &mut h.scheduler), None);
        assert_eq!(h.lightbox.index(), Some(2));
        assert_eq!(h.lightbox.drag_offset(), 0.0);

        h.lightbox.drag_start(100.0);
        h.lightbox.drag_move(50.0);
        assert_eq!(
            h.lightbox.drag_end(&mut h.preloader, &mut h.scheduler),
            Some(Direction::Next)
        );
        assert_eq!(h.lightbox.index(), Some(3));

        h.lightbox.drag_start(0.0);
        h.lightbox.drag_move(41.0);
        assert_eq!(
            h.lightbox.drag_cancel(&mut h.preloader, &mut h.scheduler),
            Some(Direction::Prev)
        );
        assert_eq!(h.lightbox.index(), Some(2));

        // One navigation per gesture
        assert_eq!(h.lightbox.drag_end(&mut h.preloader, &mut h.scheduler), None);
        assert_eq!(h.lightbox.index(), Some(2));
    }

    #[test]
    fn test_drag_ignored_while_closed() {
        let mut h = Harness::new(5);
        h.lightbox.drag_start(0.0);
        h.lightbox.drag_move(200.0);
        assert!(!h.lightbox.is_dragging());
        assert_eq!(h.lightbox.drag_end(&mut h.preloader, &mut h.scheduler), None);
    }

    #[test]
    fn test_wheel_rule() {
        let mut h = Harness::new(5);
        h.open(0);

        assert_eq!(h.lightbox.wheel(8.0, 0.0, &mut h.preloader, &mut h.scheduler), None);
        assert_eq!(h.lightbox.wheel(30.0, 40.0, &mut h.preloader, &mut h.scheduler), None);
        assert_eq!(
            h.lightbox.wheel(24.0, 3.0, &mut h.preloader, &mut h.scheduler),
            Some(Direction::Next)
        );
        assert_eq!(
            h.lightbox.wheel(-11.0, 0.0, &mut h.preloader, &mut h.scheduler),
            Some(Direction::Prev)
        );
        assert_eq!(h.lightbox.index(), Some(0));
    }

    #[test]
    fn test_controls_auto_hide_and_reappear() {
        let mut h = Harness::new(3);
        h.open(0);

        h.run_for(Duration::from_millis(1500));
        assert!(h.lightbox.controls_visible());
        h.lightbox.activity(&mut h.scheduler);
        h.run_for(Duration::from_millis(1500));
        assert!(h.lightbox.controls_visible());

        h.run_for(Duration::from_millis(600));
        assert!(!h.lightbox.controls_visible());

        // Navigation still works with the chrome hidden
        assert!(h.key(KeyInput::new(Key::ArrowRight)));
        assert_eq!(h.lightbox.index(), Some(1));
        assert!(h.lightbox.controls_visible());
    }

    #[test]
    fn test_stale_tasks_after_close_are_ignored() {
        let mut h = Harness::new(3);
        h.open(0);
        h.close();
        h.lightbox.on_task(LightboxTask::ContentSwap, &mut h.scheduler);
        h.lightbox.on_task(LightboxTask::AutoHide, &mut h.scheduler);
        assert!(!h.lightbox.is_open());
        assert!(h.scheduler.is_idle());
    }
}
