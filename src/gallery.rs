//! Category filtering and progressive disclosure for the photo grid.
//!
//! The controller decides which catalog items are displayed for the active
//! category, how many of them fit in the initial rows, and whether the
//! "load more" control is offered. Displayed items fade in one after another
//! through reveal tasks on the [`Scheduler`].

use std::collections::BTreeSet;
use std::rc::Rc;
use std::sync::Arc;

use crate::catalog::{Catalog, CategoryTag};
use crate::config::GalleryConfig;
use crate::diagnostics::{Diagnostics, MissingAnchor};
use crate::layout::{self, LayoutProbe, DEFAULT_ITEMS_PER_ROW};
use crate::tasks::{Scheduler, TaskPurpose};

/// Deferred gallery work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GalleryTask {
    /// Fade in one catalog item. Ignored unless `generation` is current.
    Reveal { generation: u64, item: usize },
    /// The viewport settled after a resize.
    Relayout,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct ItemVisibility {
    displayed: bool,
    revealed: bool,
}

pub struct GalleryController {
    catalog: Arc<Catalog>,
    config: GalleryConfig,
    diagnostics: Rc<dyn Diagnostics>,
    active: CategoryTag,
    /// Tags whose "load more" was used while they were active.
    expanded: BTreeSet<CategoryTag>,
    items_per_row: usize,
    visibility: Vec<ItemVisibility>,
    load_more_visible: bool,
    placeholder_visible: bool,
    /// Bumped on every selection so reveals from older ones are dropped.
    generation: u64,
}

impl GalleryController {
    pub fn new(catalog: Arc<Catalog>, config: GalleryConfig, diagnostics: Rc<dyn Diagnostics>) -> Self {
        let visibility = vec![ItemVisibility::default(); catalog.len()];
        Self {
            catalog,
            config,
            diagnostics,
            active: CategoryTag::All,
            expanded: BTreeSet::new(),
            items_per_row: DEFAULT_ITEMS_PER_ROW,
            visibility,
            load_more_visible: false,
            placeholder_visible: false,
            generation: 0,
        }
    }

    /// Make `tag` the active category and lay out its initial rows.
    pub fn select_category<T: From<GalleryTask>>(
        &mut self,
        tag: CategoryTag,
        probe: &mut dyn LayoutProbe,
        scheduler: &mut Scheduler<T>,
    ) {
        if self.catalog.is_empty() {
            self.diagnostics
                .missing_anchor(MissingAnchor::GalleryItems, "cannot filter an empty gallery");
            return;
        }

        for v in &mut self.visibility {
            *v = ItemVisibility::default();
        }

        // Switching away collapses the category we leave
        if self.active != tag {
            self.expanded.remove(&self.active);
        }
        self.active = tag;
        self.generation += 1;
        scheduler.cancel(TaskPurpose::RevealBatch);

        let members = self.catalog.members(&self.active);

        if members.is_empty() {
            self.load_more_visible = false;
            self.placeholder_visible = probe.grid_present();
            if !self.placeholder_visible {
                self.diagnostics.missing_anchor(
                    MissingAnchor::GridContainer,
                    "no grid to hold the empty-category message",
                );
            }
            tracing::debug!(category = %self.active, "No images in category");
            return;
        }

        self.placeholder_visible = false;
        self.items_per_row = self.measure(probe);

        let expanded = self.expanded.contains(&self.active);
        let visible = if expanded {
            members.len()
        } else {
            members.len().min(self.initial_window())
        };

        let shown = &members[..visible];
        for &item in shown {
            self.visibility[item].displayed = true;
        }
        self.schedule_reveals(shown, false, scheduler);

        self.load_more_visible = !expanded && members.len() > visible;

        tracing::debug!(
            category = %self.active,
            members = members.len(),
            visible,
            items_per_row = self.items_per_row,
            "Category selected"
        );
    }

    /// Show everything still hidden in the active category ("load more").
    pub fn expand_active_category<T: From<GalleryTask>>(&mut self, scheduler: &mut Scheduler<T>) {
        if self.catalog.is_empty() {
            self.diagnostics
                .missing_anchor(MissingAnchor::GalleryItems, "nothing to load");
            return;
        }

        let hidden: Vec<usize> = self
            .catalog
            .members(&self.active)
            .into_iter()
            .filter(|&i| !self.visibility[i].displayed)
            .collect();

        for &item in &hidden {
            self.visibility[item].displayed = true;
        }
        // Items from the initial rows may still be fading in
        self.schedule_reveals(&hidden, true, scheduler);

        self.expanded.insert(self.active.clone());
        self.load_more_visible = false;

        tracing::debug!(category = %self.active, revealed = hidden.len(), "Category expanded");
    }

    /// Re-measure the grid and re-apply the active category.
    pub fn recompute_layout<T: From<GalleryTask>>(
        &mut self,
        probe: &mut dyn LayoutProbe,
        scheduler: &mut Scheduler<T>,
    ) {
        let active = self.active.clone();
        self.select_category(active, probe, scheduler);
    }

    /// The viewport changed size. The relayout runs once resizing settles.
    pub fn request_relayout<T: From<GalleryTask>>(&self, scheduler: &mut Scheduler<T>) {
        scheduler.schedule(
            TaskPurpose::ResizeDebounce,
            self.config.resize_debounce(),
            GalleryTask::Relayout.into(),
        );
    }

    /// Run a due gallery task.
    pub fn on_task<T: From<GalleryTask>>(
        &mut self,
        task: GalleryTask,
        probe: &mut dyn LayoutProbe,
        scheduler: &mut Scheduler<T>,
    ) {
        match task {
            GalleryTask::Reveal { generation, item } => {
                self.apply_reveal(generation, item);
            }
            GalleryTask::Relayout => self.recompute_layout(probe, scheduler),
        }
    }

    /// Fade in one item. Returns false for stale or out-of-category reveals.
    pub fn apply_reveal(&mut self, generation: u64, item: usize) -> bool {
        if generation != self.generation {
            return false;
        }
        let in_category = self
            .catalog
            .get(item)
            .is_some_and(|i| self.active.matches(i.category));
        match self.visibility.get_mut(item) {
            Some(v) if v.displayed && in_category => {
                v.revealed = true;
                true
            }
            _ => false,
        }
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn active(&self) -> &CategoryTag {
        &self.active
    }

    pub fn is_expanded(&self, tag: &CategoryTag) -> bool {
        self.expanded.contains(tag)
    }

    pub fn items_per_row(&self) -> usize {
        self.items_per_row
    }

    /// Catalog indices of displayed items, in catalog order.
    pub fn visible_items(&self) -> Vec<usize> {
        self.visibility
            .iter()
            .enumerate()
            .filter(|(_, v)| v.displayed)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn visible_count(&self) -> usize {
        self.visibility.iter().filter(|v| v.displayed).count()
    }

    pub fn member_count(&self, tag: &CategoryTag) -> usize {
        self.catalog.count(tag)
    }

    pub fn is_displayed(&self, item: usize) -> bool {
        self.visibility.get(item).is_some_and(|v| v.displayed)
    }

    pub fn is_revealed(&self, item: usize) -> bool {
        self.visibility.get(item).is_some_and(|v| v.revealed)
    }

    pub fn load_more_visible(&self) -> bool {
        self.load_more_visible
    }

    pub fn placeholder_visible(&self) -> bool {
        self.placeholder_visible
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn initial_window(&self) -> usize {
        self.config.rows_initially * self.items_per_row
    }

    fn measure(&mut self, probe: &mut dyn LayoutProbe) -> usize {
        match probe.item_tops(self.catalog.len()) {
            Some(tops) => layout::items_per_row(&tops, self.config.row_epsilon),
            None => {
                self.diagnostics
                    .missing_anchor(MissingAnchor::GridContainer, "no grid to measure");
                DEFAULT_ITEMS_PER_ROW
            }
        }
    }

    fn schedule_reveals<T: From<GalleryTask>>(
        &self,
        items: &[usize],
        keep_pending: bool,
        scheduler: &mut Scheduler<T>,
    ) {
        let stagger = self.config.reveal_stagger();
        let generation = self.generation;
        let batch: Vec<_> = items
            .iter()
            .enumerate()
            .map(|(position, &item)| {
                (
                    stagger * position as u32,
                    GalleryTask::Reveal { generation, item }.into(),
                )
            })
            .collect();

        if keep_pending {
            scheduler.append_batch(TaskPurpose::RevealBatch, batch);
        } else {
            scheduler.schedule_batch(TaskPurpose::RevealBatch, batch);
        }
    }
}
