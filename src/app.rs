use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::prelude::*;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::{mpsc, Arc};
use std::time::{Duration, Instant};

use crate::catalog::{Catalog, CategoryTag};
use crate::config::Config;
use crate::diagnostics::TracingDiagnostics;
use crate::gallery::{GalleryController, GalleryTask};
use crate::layout::GridProbe;
use crate::lightbox::{
    Direction, FocusError, FocusHost, FocusTarget, Key, KeyInput, Lightbox, LightboxControl, LightboxTask,
};
use crate::preloader::{Preloader, PreloaderTask};
use crate::tasks::Scheduler;
use crate::theme::{self, KeyValueStore, ThemeSwitcher, ThemeTask};
use crate::ui;
use crate::ui::image_cache::ImageCache;

/// Every deferred task the application schedules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppTask {
    Gallery(GalleryTask),
    Lightbox(LightboxTask),
    Theme(ThemeTask),
    Preloader(PreloaderTask),
}

impl From<GalleryTask> for AppTask {
    fn from(task: GalleryTask) -> Self {
        AppTask::Gallery(task)
    }
}

impl From<LightboxTask> for AppTask {
    fn from(task: LightboxTask) -> Self {
        AppTask::Lightbox(task)
    }
}

impl From<ThemeTask> for AppTask {
    fn from(task: ThemeTask) -> Self {
        AppTask::Theme(task)
    }
}

impl From<PreloaderTask> for AppTask {
    fn from(task: PreloaderTask) -> Self {
        AppTask::Preloader(task)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    Loading,
    Gallery,
    Lightbox,
    Help,
}

/// Focus and scroll on the gallery page: the selected photo and the first
/// grid row on screen.
#[derive(Debug, Default)]
pub struct TerminalFocus {
    pub selected: Option<usize>,
    pub scroll_offset: f32,
    displayed: Vec<usize>,
}

impl TerminalFocus {
    /// Track what the gallery displays, keeping the selection on screen.
    pub fn sync(&mut self, displayed: Vec<usize>) {
        if !self.selected.is_some_and(|s| displayed.contains(&s)) {
            self.selected = displayed.first().copied();
        }
        self.displayed = displayed;
    }

    /// Position of the selection among displayed items.
    pub fn position(&self) -> Option<usize> {
        let selected = self.selected?;
        self.displayed.iter().position(|&i| i == selected)
    }

    pub fn displayed(&self) -> &[usize] {
        &self.displayed
    }
}

impl FocusHost for TerminalFocus {
    fn focused(&self) -> Option<FocusTarget> {
        self.selected.map(FocusTarget)
    }

    fn scroll_offset(&self) -> f32 {
        self.scroll_offset
    }

    // Selecting a cell never scrolls the grid by itself
    fn focus(&mut self, target: FocusTarget, _prevent_scroll: bool) -> Result<(), FocusError> {
        if !self.displayed.contains(&target.0) {
            return Err(FocusError::Missing);
        }
        self.selected = Some(target.0);
        Ok(())
    }

    fn scroll_to(&mut self, offset: f32) {
        self.scroll_offset = offset.max(0.0);
    }
}

pub struct App {
    pub config: Config,
    pub mode: AppMode,
    pub gallery: GalleryController,
    pub lightbox: Lightbox,
    pub theme: ThemeSwitcher<Box<dyn KeyValueStore>>,
    pub preloader: Preloader,
    pub images: ImageCache,
    pub focus: TerminalFocus,
    pub grid: GridProbe,
    pub status_message: Option<String>,
    pub should_quit: bool,
    scheduler: Scheduler<AppTask>,
    started: Instant,
    assets: Option<mpsc::Receiver<bool>>,
}

/// Columns lost to the grid border.
const GRID_BORDER: u16 = 2;

impl App {
    pub fn new(
        config: Config,
        catalog: Catalog,
        images: ImageCache,
        store: Box<dyn KeyValueStore>,
        system_prefers_dark: bool,
        width: u16,
    ) -> Self {
        let catalog = Arc::new(catalog);
        let diagnostics = Rc::new(TracingDiagnostics);
        let mut scheduler = Scheduler::new();

        let mut gallery = GalleryController::new(catalog.clone(), config.gallery.clone(), diagnostics.clone());
        let lightbox = Lightbox::new(catalog.clone(), config.lightbox.clone(), diagnostics);

        let mut theme = ThemeSwitcher::new(store, config.theme.toggle_lock());
        theme.initialize(system_prefers_dark);

        let mut preloader = Preloader::new(catalog.len(), config.preloader.clone());
        preloader.start(&mut scheduler);

        let mut grid = GridProbe::new(
            width.saturating_sub(GRID_BORDER),
            config.gallery.cell_width,
            config.gallery.cell_height,
        );
        gallery.select_category(CategoryTag::All, &mut grid, &mut scheduler);

        let mut focus = TerminalFocus::default();
        focus.sync(gallery.visible_items());

        Self {
            config,
            mode: AppMode::Loading,
            gallery,
            lightbox,
            theme,
            preloader,
            images,
            focus,
            grid,
            status_message: None,
            should_quit: false,
            scheduler,
            started: Instant::now(),
            assets: None,
        }
    }

    pub async fn run(&mut self, terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>) -> Result<()> {
        self.assets = Some(spawn_asset_probe(self.image_paths()));

        while !self.should_quit {
            self.poll_assets();
            self.images.poll();
            self.run_due(self.started.elapsed());

            terminal.draw(|frame| ui::render(frame, self))?;

            if event::poll(Duration::from_millis(100))? {
                match event::read()? {
                    Event::Key(key) => self.handle_key(key)?,
                    Event::Mouse(mouse) => self.handle_mouse(mouse),
                    Event::Resize(width, _) => self.resize(width),
                    Event::FocusLost => {
                        self.lightbox.drag_cancel(&mut self.images, &mut self.scheduler);
                    }
                    Event::FocusGained => {
                        if self.theme.system_changed(theme::system_prefers_dark()) {
                            tracing::debug!(theme = self.theme.current().as_str(), "Following system theme");
                        }
                    }
                    _ => {}
                }
            }
        }

        Ok(())
    }

    /// Run every task due by `now`, each at its own due time so follow-up
    /// tasks are timed from when their parent fired.
    pub fn run_due(&mut self, now: Duration) {
        while let Some(due) = self.scheduler.next_due() {
            if due > now {
                break;
            }
            for task in self.scheduler.advance_to(due) {
                self.dispatch(task);
            }
        }
        self.scheduler.advance_to(now);
    }

    fn dispatch(&mut self, task: AppTask) {
        match task {
            AppTask::Gallery(task) => {
                self.gallery.on_task(task, &mut self.grid, &mut self.scheduler);
                if task == GalleryTask::Relayout {
                    self.focus.sync(self.gallery.visible_items());
                }
            }
            AppTask::Lightbox(task) => self.lightbox.on_task(task, &mut self.scheduler),
            AppTask::Theme(task) => self.theme.on_task(task),
            AppTask::Preloader(task) => {
                if self.preloader.on_task(task) && self.mode == AppMode::Loading {
                    self.mode = AppMode::Gallery;
                }
            }
        }
    }

    fn poll_assets(&mut self) {
        let Some(receiver) = &self.assets else {
            return;
        };

        let mut finished = false;
        let mut loaded = 0;
        loop {
            match receiver.try_recv() {
                Ok(_) => loaded += 1,
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => {
                    finished = true;
                    break;
                }
            }
        }

        for _ in 0..loaded {
            self.preloader.asset_loaded(&mut self.scheduler);
        }
        if finished {
            self.assets = None;
            self.preloader.assets_settled(&mut self.scheduler);
        }
    }

    fn image_paths(&self) -> Vec<PathBuf> {
        self.gallery
            .catalog()
            .items()
            .iter()
            .map(|item| item.image.clone())
            .collect()
    }

    pub fn resize(&mut self, width: u16) {
        self.grid.width = width.saturating_sub(GRID_BORDER);
        self.gallery.request_relayout(&mut self.scheduler);
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        match self.mode {
            AppMode::Loading => {
                if matches!(key.code, KeyCode::Char('q')) {
                    self.should_quit = true;
                }
            }
            AppMode::Help => {
                if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                    self.mode = AppMode::Gallery;
                }
            }
            AppMode::Gallery => self.handle_gallery_key(key),
            AppMode::Lightbox => self.handle_lightbox_key(key)?,
        }
        Ok(())
    }

    fn handle_gallery_key(&mut self, key: KeyEvent) {
        self.status_message = None;

        match key.code {
            KeyCode::Char(c @ '0'..='6') => {
                let bar = CategoryTag::bar();
                let index = c as usize - '0' as usize;
                if let Some(tag) = bar.get(index).cloned() {
                    self.select_category(tag);
                }
            }
            KeyCode::Tab => self.cycle_category(1),
            KeyCode::BackTab => self.cycle_category(-1),
            KeyCode::Left | KeyCode::Char('h') => self.move_selection(-1, 0),
            KeyCode::Right | KeyCode::Char('l') => self.move_selection(1, 0),
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(0, -1),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(0, 1),
            KeyCode::Char('m') => self.load_more(),
            KeyCode::Enter => self.open_selected(),
            KeyCode::Char('t') => self.toggle_theme(),
            KeyCode::Char('?') => self.mode = AppMode::Help,
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            _ => {}
        }
    }

    fn handle_lightbox_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Enter | KeyCode::Char(' ') => {
                self.lightbox.activity(&mut self.scheduler);
                self.activate_control()?;
            }
            code => {
                let input = match code {
                    KeyCode::Tab => KeyInput {
                        key: Key::Tab,
                        shift: key.modifiers.contains(KeyModifiers::SHIFT),
                    },
                    KeyCode::BackTab => KeyInput::shifted(Key::Tab),
                    KeyCode::Esc | KeyCode::Char('q') => KeyInput::new(Key::Escape),
                    KeyCode::Left | KeyCode::Char('h') => KeyInput::new(Key::ArrowLeft),
                    KeyCode::Right | KeyCode::Char('l') => KeyInput::new(Key::ArrowRight),
                    _ => KeyInput::new(Key::Other),
                };
                self.lightbox
                    .handle_key(input, &mut self.focus, &mut self.images, &mut self.scheduler);
            }
        }

        self.leave_lightbox_if_closed();
        Ok(())
    }

    fn activate_control(&mut self) -> Result<()> {
        match self.lightbox.focused_control() {
            Some(LightboxControl::Close) => self.lightbox.close(&mut self.focus, &mut self.scheduler),
            Some(LightboxControl::Previous) => {
                self.lightbox
                    .navigate(Direction::Prev, &mut self.images, &mut self.scheduler);
            }
            Some(LightboxControl::Next) => {
                self.lightbox
                    .navigate(Direction::Next, &mut self.images, &mut self.scheduler);
            }
            Some(LightboxControl::Download) => self.download_current()?,
            None => {}
        }
        Ok(())
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        if self.mode == AppMode::Gallery {
            match mouse.kind {
                MouseEventKind::ScrollDown => self.move_selection(0, 1),
                MouseEventKind::ScrollUp => self.move_selection(0, -1),
                _ => {}
            }
            return;
        }
        if self.mode != AppMode::Lightbox {
            return;
        }

        let x = f32::from(mouse.column) * self.config.lightbox.pointer_unit;
        let step = self.config.lightbox.wheel_step;
        self.lightbox.activity(&mut self.scheduler);

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => self.lightbox.drag_start(x),
            MouseEventKind::Drag(MouseButton::Left) => self.lightbox.drag_move(x),
            MouseEventKind::Up(MouseButton::Left) => {
                self.lightbox.drag_move(x);
                self.lightbox.drag_end(&mut self.images, &mut self.scheduler);
            }
            MouseEventKind::ScrollRight => {
                self.lightbox
                    .wheel(step, 0.0, &mut self.images, &mut self.scheduler);
            }
            MouseEventKind::ScrollLeft => {
                self.lightbox
                    .wheel(-step, 0.0, &mut self.images, &mut self.scheduler);
            }
            _ => {}
        }
    }

    pub fn select_category(&mut self, tag: CategoryTag) {
        self.gallery.select_category(tag, &mut self.grid, &mut self.scheduler);
        self.focus.sync(self.gallery.visible_items());
        self.focus.scroll_to(0.0);
    }

    fn cycle_category(&mut self, step: isize) {
        let bar = CategoryTag::bar();
        let current = bar.iter().position(|t| t == self.gallery.active()).unwrap_or(0);
        let next = (current as isize + step).rem_euclid(bar.len() as isize) as usize;
        if let Some(tag) = bar.get(next).cloned() {
            self.select_category(tag);
        }
    }

    pub fn load_more(&mut self) {
        if !self.gallery.load_more_visible() {
            return;
        }
        let before = self.gallery.visible_count();
        self.gallery.expand_active_category(&mut self.scheduler);
        self.focus.sync(self.gallery.visible_items());
        self.status_message = Some(format!(
            "Showing {} more photos",
            self.gallery.visible_count().saturating_sub(before)
        ));
    }

    fn move_selection(&mut self, dx: isize, dy: isize) {
        let displayed = self.focus.displayed();
        if displayed.is_empty() {
            return;
        }
        let columns = self.gallery.items_per_row() as isize;
        let current = self.focus.position().unwrap_or(0) as isize;
        let target = current + dx + dy * columns;
        if target < 0 || target >= displayed.len() as isize {
            return;
        }
        self.focus.selected = Some(displayed[target as usize]);
    }

    pub fn open_selected(&mut self) {
        let Some(image) = self
            .focus
            .selected
            .and_then(|i| self.gallery.catalog().get(i))
            .map(|item| item.image.clone())
        else {
            return;
        };

        self.lightbox
            .open(&image, &self.focus, &mut self.images, &mut self.scheduler);
        if self.lightbox.is_open() {
            self.mode = AppMode::Lightbox;
        }
    }

    fn leave_lightbox_if_closed(&mut self) {
        if self.mode == AppMode::Lightbox && !self.lightbox.is_open() {
            self.mode = AppMode::Gallery;
        }
    }

    fn toggle_theme(&mut self) {
        if let Some(theme) = self.theme.toggle(&mut self.scheduler) {
            self.status_message = Some(format!("Switched to {} theme", theme.as_str()));
        }
    }

    /// Copy the photo on screen into the downloads folder.
    fn download_current(&mut self) -> Result<()> {
        let Some(content) = self.lightbox.content() else {
            return Ok(());
        };
        let Some(file_name) = content.image.file_name() else {
            return Ok(());
        };

        let target_dir = dirs::download_dir().unwrap_or_else(|| PathBuf::from("."));
        let target = target_dir.join(file_name);

        match std::fs::create_dir_all(&target_dir).and_then(|_| std::fs::copy(&content.image, &target)) {
            Ok(_) => {
                tracing::info!(from = %content.image.display(), to = %target.display(), "Wallpaper saved");
                self.status_message = Some("Wallpaper download started!".to_string());
            }
            Err(e) => {
                tracing::warn!(path = %content.image.display(), error = %e, "Wallpaper download failed");
                self.status_message = Some(format!("Download failed: {}", e));
            }
        }
        Ok(())
    }

    pub fn scheduler(&self) -> &Scheduler<AppTask> {
        &self.scheduler
    }
}

/// Probe every image off the UI thread, reporting one result per image.
fn spawn_asset_probe(paths: Vec<PathBuf>) -> mpsc::Receiver<bool> {
    let (tx, rx) = mpsc::channel();
    tokio::task::spawn_blocking(move || {
        for path in paths {
            let ok = image::image_dimensions(&path).is_ok();
            if !ok {
                tracing::debug!(path = %path.display(), "Image failed to load");
            }
            if tx.send(ok).is_err() {
                break;
            }
        }
    });
    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Category, GalleryItem};
    use crate::theme::{MemoryStore, Theme};

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE)).unwrap();
    }

    /// Ten wildlife shots and two flowers, on a grid four cells wide.
    fn app() -> App {
        let mut items: Vec<GalleryItem> = (0..10)
            .map(|i| GalleryItem::new(format!("wildlife/{}.jpg", i), Category::Wildlife, format!("Bird {}", i)))
            .collect();
        items.push(GalleryItem::new("flowers/a.jpg", Category::Flowers, "Orchid"));
        items.push(GalleryItem::new("flowers/b.jpg", Category::Flowers, "Lotus"));

        let config = Config::default();
        let width = config.gallery.cell_width * 4 + GRID_BORDER;
        let mut app = App::new(
            config,
            Catalog::new(items),
            ImageCache::without_protocol(512),
            Box::new(MemoryStore::default()),
            false,
            width,
        );
        app.run_due(Duration::from_secs(6));
        app
    }

    #[test]
    fn test_splash_gives_way_to_gallery() {
        let app = app();
        assert_eq!(app.mode, AppMode::Gallery);
        assert!(!app.preloader.is_visible());
    }

    #[test]
    fn test_empty_catalog_keeps_splash_for_minimum_display() {
        let mut app = App::new(
            Config::default(),
            Catalog::new(Vec::new()),
            ImageCache::without_protocol(512),
            Box::new(MemoryStore::default()),
            false,
            80,
        );
        let (tx, rx) = mpsc::channel();
        drop(tx);
        app.assets = Some(rx);
        app.poll_assets();
        assert!(app.assets.is_none());

        app.run_due(Duration::from_millis(800));
        assert_eq!(app.mode, AppMode::Loading);
        app.run_due(Duration::from_millis(1500));
        assert_eq!(app.mode, AppMode::Gallery);
    }

    #[test]
    fn test_category_keys_and_load_more() {
        let mut app = app();
        assert_eq!(app.gallery.visible_count(), 8);

        press(&mut app, KeyCode::Char('1'));
        assert_eq!(app.gallery.active(), &CategoryTag::Only(Category::Wildlife));
        assert_eq!(app.gallery.visible_count(), 8);
        assert!(app.gallery.load_more_visible());

        press(&mut app, KeyCode::Char('m'));
        assert_eq!(app.gallery.visible_count(), 10);
        assert!(!app.gallery.load_more_visible());

        press(&mut app, KeyCode::Tab);
        assert_eq!(app.gallery.active(), &CategoryTag::Only(Category::Flowers));
        assert_eq!(app.focus.selected, Some(10));

        press(&mut app, KeyCode::BackTab);
        press(&mut app, KeyCode::BackTab);
        assert_eq!(app.gallery.active(), &CategoryTag::All);
    }

    #[test]
    fn test_selection_moves_by_rows() {
        let mut app = app();
        assert_eq!(app.focus.selected, Some(0));

        press(&mut app, KeyCode::Down);
        assert_eq!(app.focus.selected, Some(4));
        press(&mut app, KeyCode::Right);
        assert_eq!(app.focus.selected, Some(5));
        press(&mut app, KeyCode::Down);
        assert_eq!(app.focus.selected, Some(5));
    }

    #[test]
    fn test_lightbox_round_trip_restores_selection() {
        let mut app = app();
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.mode, AppMode::Lightbox);
        assert_eq!(app.lightbox.index(), Some(1));

        press(&mut app, KeyCode::Left);
        press(&mut app, KeyCode::Left);
        assert_eq!(app.lightbox.index(), Some(11));

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.mode, AppMode::Gallery);
        assert_eq!(app.focus.selected, Some(1));
    }

    #[test]
    fn test_enter_activates_focused_control() {
        let mut app = app();
        press(&mut app, KeyCode::Enter);

        // Close -> Previous -> Next
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.lightbox.index(), Some(1));

        press(&mut app, KeyCode::BackTab);
        press(&mut app, KeyCode::BackTab);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.mode, AppMode::Gallery);
    }

    #[test]
    fn test_mouse_drag_navigates() {
        let mut app = app();
        press(&mut app, KeyCode::Enter);

        let mouse = |kind, column| MouseEvent {
            kind,
            column,
            row: 10,
            modifiers: KeyModifiers::NONE,
        };
        // Eight layout units per column: 10 columns is past the threshold
        app.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 40));
        app.handle_mouse(mouse(MouseEventKind::Drag(MouseButton::Left), 35));
        app.handle_mouse(mouse(MouseEventKind::Up(MouseButton::Left), 30));
        assert_eq!(app.lightbox.index(), Some(1));

        app.handle_mouse(mouse(MouseEventKind::ScrollLeft, 30));
        assert_eq!(app.lightbox.index(), Some(0));
    }

    #[test]
    fn test_theme_toggle_is_rate_limited() {
        let mut app = app();
        assert_eq!(app.theme.current(), Theme::Light);

        press(&mut app, KeyCode::Char('t'));
        press(&mut app, KeyCode::Char('t'));
        assert_eq!(app.theme.current(), Theme::Dark);

        app.run_due(Duration::from_secs(7));
        press(&mut app, KeyCode::Char('t'));
        assert_eq!(app.theme.current(), Theme::Light);
    }

    #[test]
    fn test_resize_relayout_is_debounced() {
        let mut app = app();
        app.resize(app.config.gallery.cell_width * 3 + GRID_BORDER);
        app.resize(app.config.gallery.cell_width * 2 + GRID_BORDER);
        assert_eq!(app.gallery.items_per_row(), 4);

        app.run_due(Duration::from_millis(6300));
        assert_eq!(app.gallery.items_per_row(), 2);
        assert_eq!(app.gallery.visible_count(), 4);
    }
}
