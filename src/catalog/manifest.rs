//! TOML catalog manifests.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::{Catalog, CatalogError, Category, GalleryItem};

#[derive(Debug, Deserialize)]
struct Manifest {
    #[serde(default)]
    photos: Vec<ManifestEntry>,
}

#[derive(Debug, Deserialize)]
struct ManifestEntry {
    image: PathBuf,
    category: String,
    #[serde(default)]
    caption: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    camera: Option<String>,
}

/// Parse manifest text. Relative image paths resolve against the manifest's
/// directory; a missing caption falls back to the file name and a missing
/// camera to the image's EXIF model.
pub fn parse_manifest(content: &str, manifest_path: &Path) -> Result<Catalog, CatalogError> {
    let manifest: Manifest = toml::from_str(content).map_err(|source| CatalogError::Parse {
        path: manifest_path.to_path_buf(),
        source,
    })?;

    let base = manifest_path.parent().unwrap_or_else(|| Path::new(""));

    let mut items = Vec::with_capacity(manifest.photos.len());
    for entry in manifest.photos {
        let image = if entry.image.is_absolute() {
            entry.image
        } else {
            base.join(entry.image)
        };

        let category = Category::parse(&entry.category).ok_or_else(|| CatalogError::UnknownCategory {
            image: image.clone(),
            category: entry.category.clone(),
        })?;

        let caption = entry
            .caption
            .unwrap_or_else(|| super::discovery::caption_from_path(&image));

        let camera = entry.camera.or_else(|| super::discovery::camera_model(&image));

        items.push(GalleryItem {
            image,
            category,
            caption,
            location: entry.location,
            camera,
        });
    }

    Ok(Catalog::new(items))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_parse_manifest() {
        let content = r#"
            [[photos]]
            image = "wildlife/heron.jpg"
            category = "wildlife"
            caption = "Grey heron"
            location = "Kerala, India"
            camera = "Nikon D750"

            [[photos]]
            image = "/srv/photos/moon.jpg"
            category = "Lunar"
        "#;

        let catalog = parse_manifest(content, Path::new("/gallery/photos.toml")).unwrap();
        assert_eq!(catalog.len(), 2);

        let heron = catalog.get(0).unwrap();
        assert_eq!(heron.image, PathBuf::from("/gallery/wildlife/heron.jpg"));
        assert_eq!(heron.meta_line(), "Kerala, India • Nikon D750");

        let moon = catalog.get(1).unwrap();
        assert_eq!(moon.image, PathBuf::from("/srv/photos/moon.jpg"));
        assert_eq!(moon.category, Category::Lunar);
        assert_eq!(moon.caption, "moon");
    }

    #[test]
    fn test_unknown_category_is_rejected() {
        let content = r#"
            [[photos]]
            image = "x.jpg"
            category = "portraits"
        "#;
        let err = parse_manifest(content, Path::new("photos.toml")).unwrap_err();
        assert!(matches!(err, CatalogError::UnknownCategory { .. }));
    }

    #[test]
    fn test_empty_manifest_is_an_empty_catalog() {
        let catalog = parse_manifest("", Path::new("photos.toml")).unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("photos.toml");
        fs::write(
            &path,
            "[[photos]]\nimage = \"a.jpg\"\ncategory = \"flowers\"\ncaption = \"Lotus\"\n",
        )
        .unwrap();

        let catalog = Catalog::load(&path, &[]).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get(0).unwrap().image, dir.path().join("a.jpg"));

        let missing = Catalog::load(&dir.path().join("nope.toml"), &[]).unwrap_err();
        assert!(matches!(missing, CatalogError::NotFound(_)));
    }

    fn write_tiff_with_model(path: &Path, model: &str) {
        use exif::experimental::Writer;
        use exif::{Field, In, Tag, Value};

        let field = Field {
            tag: Tag::Model,
            ifd_num: In::PRIMARY,
            value: Value::Ascii(vec![model.as_bytes().to_vec()]),
        };
        let mut writer = Writer::new();
        let mut buf = std::io::Cursor::new(Vec::new());
        writer.push_field(&field);
        writer.write(&mut buf, false).unwrap();
        fs::write(path, buf.into_inner()).unwrap();
    }

    #[test]
    fn test_camera_falls_back_to_exif_model() {
        let dir = tempdir().unwrap();
        write_tiff_with_model(&dir.path().join("heron.tif"), "Nikon D750");
        fs::write(dir.path().join("notes.jpg"), b"not an image").unwrap();

        let content = r#"
            [[photos]]
            image = "heron.tif"
            category = "wildlife"
            location = "Kerala, India"

            [[photos]]
            image = "heron.tif"
            category = "wildlife"
            location = "Kerala, India"
            camera = "Canon R5"

            [[photos]]
            image = "notes.jpg"
            category = "flowers"
            location = "Kyoto"

            [[photos]]
            image = "missing.jpg"
            category = "flowers"
        "#;
        let catalog = parse_manifest(content, &dir.path().join("photos.toml")).unwrap();
        assert_eq!(catalog.len(), 4);

        let heron = catalog.get(0).unwrap();
        assert_eq!(heron.camera.as_deref(), Some("Nikon D750"));
        assert_eq!(heron.meta_line(), "Kerala, India • Nikon D750");

        assert_eq!(catalog.get(1).unwrap().camera.as_deref(), Some("Canon R5"));

        let notes = catalog.get(2).unwrap();
        assert_eq!(notes.camera, None);
        assert_eq!(notes.meta_line(), "");

        assert_eq!(catalog.get(3).unwrap().camera, None);
    }

    #[test]
    fn test_malformed_manifest_reports_path() {
        let err = parse_manifest("[[photos]\n", Path::new("broken.toml")).unwrap_err();
        assert!(err.to_string().contains("broken.toml"));
    }
}
