//! The photo collection: categories, items and the ordered catalog.
//!
//! A catalog is built once at startup, either from a TOML manifest or by
//! walking a directory tree whose top-level folders name categories. Items
//! keep their load order for the whole session; both the gallery grid and
//! the lightbox index into that order.

mod discovery;
mod manifest;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use discovery::discover_catalog;
pub use manifest::parse_manifest;

/// Fixed photo categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Wildlife,
    Flowers,
    Scenery,
    Monuments,
    Lunar,
    Others,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Wildlife,
        Category::Flowers,
        Category::Scenery,
        Category::Monuments,
        Category::Lunar,
        Category::Others,
    ];

    /// Tag name as used in manifests and directory names.
    pub fn name(&self) -> &'static str {
        match self {
            Category::Wildlife => "wildlife",
            Category::Flowers => "flowers",
            Category::Scenery => "scenery",
            Category::Monuments => "monuments",
            Category::Lunar => "lunar",
            Category::Others => "others",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::Wildlife => "Wildlife",
            Category::Flowers => "Flowers",
            Category::Scenery => "Scenery",
            Category::Monuments => "Monuments",
            Category::Lunar => "Lunar",
            Category::Others => "Others",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(name))
    }
}

/// What the gallery is filtered by.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum CategoryTag {
    #[default]
    All,
    Only(Category),
    /// A tag that names no known category. It matches nothing.
    Unrecognized(String),
}

impl CategoryTag {
    /// Tags in the order the category bar shows them.
    pub fn bar() -> Vec<CategoryTag> {
        std::iter::once(CategoryTag::All)
            .chain(Category::ALL.into_iter().map(CategoryTag::Only))
            .collect()
    }

    pub fn parse(tag: &str) -> Self {
        if tag.trim().eq_ignore_ascii_case("all") {
            return CategoryTag::All;
        }
        match Category::parse(tag) {
            Some(category) => CategoryTag::Only(category),
            None => CategoryTag::Unrecognized(tag.to_string()),
        }
    }

    pub fn matches(&self, category: Category) -> bool {
        match self {
            CategoryTag::All => true,
            CategoryTag::Only(c) => *c == category,
            CategoryTag::Unrecognized(_) => false,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            CategoryTag::All => "All Photos",
            CategoryTag::Only(c) => c.label(),
            CategoryTag::Unrecognized(tag) => tag,
        }
    }
}

impl From<Category> for CategoryTag {
    fn from(category: Category) -> Self {
        CategoryTag::Only(category)
    }
}

impl fmt::Display for CategoryTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryTag::All => f.write_str("all"),
            CategoryTag::Only(c) => f.write_str(c.name()),
            CategoryTag::Unrecognized(tag) => f.write_str(tag),
        }
    }
}

/// One photo and its display metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct GalleryItem {
    pub image: PathBuf,
    pub category: Category,
    pub caption: String,
    pub location: Option<String>,
    pub camera: Option<String>,
}

impl GalleryItem {
    pub fn new(image: impl Into<PathBuf>, category: Category, caption: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            category,
            caption: caption.into(),
            location: None,
            camera: None,
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_camera(mut self, camera: impl Into<String>) -> Self {
        self.camera = Some(camera.into());
        self
    }

    /// "location • camera", or empty unless both are known.
    pub fn meta_line(&self) -> String {
        match (&self.location, &self.camera) {
            (Some(location), Some(camera)) => format!("{} • {}", location.trim(), camera.trim()),
            _ => String::new(),
        }
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog path {0} does not exist")]
    NotFound(PathBuf),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid catalog manifest {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("photo {image} has unknown category '{category}'")]
    UnknownCategory { image: PathBuf, category: String },
}

/// Every gallery item in display order.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    items: Vec<GalleryItem>,
}

impl Catalog {
    pub fn new(items: Vec<GalleryItem>) -> Self {
        Self { items }
    }

    /// Load a manifest file, or discover photos when `path` is a directory.
    pub fn load(path: &Path, extensions: &[String]) -> Result<Self, CatalogError> {
        if !path.exists() {
            return Err(CatalogError::NotFound(path.to_path_buf()));
        }

        let catalog = if path.is_dir() {
            discover_catalog(path, extensions)?
        } else {
            let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            parse_manifest(&content, path)?
        };

        tracing::info!(path = %path.display(), photos = catalog.len(), "Catalog loaded");
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[GalleryItem] {
        &self.items
    }

    pub fn get(&self, index: usize) -> Option<&GalleryItem> {
        self.items.get(index)
    }

    /// Position of an image in the flat collection.
    pub fn position(&self, image: &Path) -> Option<usize> {
        self.items.iter().position(|item| item.image == image)
    }

    /// Catalog indices of the items a tag selects, in catalog order.
    pub fn members(&self, tag: &CategoryTag) -> Vec<usize> {
        self.items
            .iter()
            .enumerate()
            .filter(|(_, item)| tag.matches(item.category))
            .map(|(i, _)| i)
            .collect()
    }

    pub fn count(&self, tag: &CategoryTag) -> usize {
        self.items.iter().filter(|item| tag.matches(item.category)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Catalog {
        Catalog::new(vec![
            GalleryItem::new("a.jpg", Category::Wildlife, "A"),
            GalleryItem::new("b.jpg", Category::Flowers, "B"),
            GalleryItem::new("c.jpg", Category::Wildlife, "C"),
        ])
    }

    #[test]
    fn test_tag_parsing() {
        assert_eq!(CategoryTag::parse("all"), CategoryTag::All);
        assert_eq!(CategoryTag::parse("Lunar"), CategoryTag::Only(Category::Lunar));
        assert_eq!(
            CategoryTag::parse("portraits"),
            CategoryTag::Unrecognized("portraits".to_string())
        );
    }

    #[test]
    fn test_members_follow_catalog_order() {
        let catalog = sample();
        assert_eq!(catalog.members(&CategoryTag::All), vec![0, 1, 2]);
        assert_eq!(catalog.members(&Category::Wildlife.into()), vec![0, 2]);
        assert!(catalog.members(&Category::Lunar.into()).is_empty());
        assert!(catalog.members(&CategoryTag::parse("portraits")).is_empty());
    }

    #[test]
    fn test_position_in_flat_collection() {
        let catalog = sample();
        assert_eq!(catalog.position(Path::new("c.jpg")), Some(2));
        assert_eq!(catalog.position(Path::new("missing.jpg")), None);
    }

    #[test]
    fn test_meta_line_needs_both_fields() {
        let item = GalleryItem::new("a.jpg", Category::Scenery, "Dunes")
            .with_location(" Thar Desert ")
            .with_camera("Nikon D750");
        assert_eq!(item.meta_line(), "Thar Desert • Nikon D750");

        let partial = GalleryItem::new("b.jpg", Category::Scenery, "Hills").with_location("Ooty");
        assert_eq!(partial.meta_line(), "");
    }

    #[test]
    fn test_bar_starts_with_all() {
        let bar = CategoryTag::bar();
        assert_eq!(bar.len(), 7);
        assert_eq!(bar[0], CategoryTag::All);
        assert_eq!(bar[6], CategoryTag::Only(Category::Others));
    }
}
