use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use walkdir::WalkDir;

use super::{Catalog, CatalogError, Category, GalleryItem};

/// Build a catalog from `root/<category>/**/<image>`.
///
/// Images directly under the root, or under a folder that names no category,
/// land in `others`. The camera model is read from EXIF when present.
pub fn discover_catalog(root: &Path, extensions: &[String]) -> Result<Catalog, CatalogError> {
    let mut paths = Vec::new();

    for entry in WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();

        if path.is_file() {
            if let Some(ext) = path.extension() {
                let ext_lower = ext.to_string_lossy().to_lowercase();
                if extensions.iter().any(|e| e.to_lowercase() == ext_lower) {
                    paths.push(path.to_path_buf());
                }
            }
        }
    }

    if paths.is_empty() && !root.is_dir() {
        return Err(CatalogError::NotFound(root.to_path_buf()));
    }

    // Sort by path for consistent ordering
    paths.sort();

    let items = paths
        .into_iter()
        .map(|path| {
            let category = category_for(root, &path);
            let caption = caption_from_path(&path);
            let mut item = GalleryItem::new(path, category, caption);
            item.camera = camera_model(&item.image);
            item
        })
        .collect();

    Ok(Catalog::new(items))
}

fn category_for(root: &Path, path: &Path) -> Category {
    let relative = match path.strip_prefix(root) {
        Ok(r) => r,
        Err(_) => return Category::Others,
    };

    let mut components = relative.components();
    let first = components.next();
    // A bare file under the root has no category folder
    if components.next().is_none() {
        return Category::Others;
    }

    first
        .and_then(|c| Category::parse(&c.as_os_str().to_string_lossy()))
        .unwrap_or_else(|| {
            tracing::debug!(path = %path.display(), "No category folder, filing under others");
            Category::Others
        })
}

/// "grey-heron_02.jpg" -> "grey heron 02"
pub(crate) fn caption_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().replace(['-', '_'], " "))
        .unwrap_or_default()
}

pub(super) fn camera_model(path: &Path) -> Option<String> {
    let file = File::open(path).ok()?;
    let mut bufreader = BufReader::new(file);
    let exif = exif::Reader::new().read_from_container(&mut bufreader).ok()?;
    let field = exif.get_field(exif::Tag::Model, exif::In::PRIMARY)?;
    let model = field.display_value().to_string().trim_matches('"').trim().to_string();
    (!model.is_empty()).then_some(model)
}
