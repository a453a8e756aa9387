//! Background image decoding for the lightbox.

use image::{imageops::FilterType, DynamicImage};
use ratatui_image::{picker::Picker, protocol::StatefulProtocol};
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::mpsc;

use crate::config::ImageProtocol;
use crate::lightbox::ImagePreloader;

type Decoded = (PathBuf, Option<DynamicImage>);

/// Decoded images kept at once: the current photo, its neighbours and a few
/// recently viewed ones.
const CACHE_LIMIT: usize = 8;

/// Paths ordered from least to most recently used.
#[derive(Debug)]
struct RecentPaths {
    limit: usize,
    order: VecDeque<PathBuf>,
}

impl RecentPaths {
    fn new(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
            order: VecDeque::new(),
        }
    }

    /// Mark `path` as most recently used. Returns the path that fell out.
    fn touch(&mut self, path: &Path) -> Option<PathBuf> {
        if let Some(pos) = self.order.iter().position(|p| p == path) {
            if let Some(existing) = self.order.remove(pos) {
                self.order.push_back(existing);
            }
            return None;
        }
        self.order.push_back(path.to_path_buf());
        if self.order.len() > self.limit {
            self.order.pop_front()
        } else {
            None
        }
    }
}

/// Decoded images ready for the terminal, keyed by path. Only the most
/// recently used ones are kept.
///
/// Decoding happens on worker threads. Results are picked up by [`poll`]
/// on the UI thread.
///
/// [`poll`]: ImageCache::poll
pub struct ImageCache {
    picker: Option<Picker>,
    max_size: u32,
    cache: HashMap<PathBuf, StatefulProtocol>,
    recent: RecentPaths,
    loading: HashSet<PathBuf>,
    failed: HashSet<PathBuf>,
    receiver: mpsc::Receiver<Decoded>,
    sender: mpsc::Sender<Decoded>,
}

impl ImageCache {
    pub fn new(protocol: ImageProtocol, max_size: u32) -> Self {
        let picker = match protocol {
            ImageProtocol::None => None,
            _ => Picker::from_query_stdio().ok(),
        };
        if picker.is_none() {
            tracing::info!("No terminal image protocol, the lightbox shows captions only");
        }
        Self::with_picker(picker, max_size)
    }

    /// A cache that never decodes anything.
    pub fn without_protocol(max_size: u32) -> Self {
        Self::with_picker(None, max_size)
    }

    fn with_picker(picker: Option<Picker>, max_size: u32) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            picker,
            max_size,
            cache: HashMap::new(),
            recent: RecentPaths::new(CACHE_LIMIT),
            loading: HashSet::new(),
            failed: HashSet::new(),
            receiver,
            sender,
        }
    }

    /// Whether images can be drawn at all.
    pub fn is_available(&self) -> bool {
        self.picker.is_some()
    }

    /// Collect finished decodes.
    pub fn poll(&mut self) {
        while let Ok((path, decoded)) = self.receiver.try_recv() {
            self.loading.remove(&path);
            match (decoded, self.picker.as_mut()) {
                (Some(img), Some(picker)) => {
                    let protocol = picker.new_resize_protocol(img);
                    if let Some(evicted) = self.recent.touch(&path) {
                        tracing::trace!(path = %evicted.display(), "Evicting decoded image");
                        self.cache.remove(&evicted);
                    }
                    self.cache.insert(path, protocol);
                }
                (None, _) => {
                    self.failed.insert(path);
                }
                (Some(_), None) => {}
            }
        }
    }

    /// Start decoding `path` unless it is cached, in flight or known bad.
    pub fn request(&mut self, path: &Path) {
        if self.picker.is_none()
            || self.cache.contains_key(path)
            || self.loading.contains(path)
            || self.failed.contains(path)
        {
            return;
        }

        self.loading.insert(path.to_path_buf());
        let path = path.to_path_buf();
        let sender = self.sender.clone();
        let max_size = self.max_size;

        std::thread::spawn(move || {
            let decoded = image::ImageReader::open(&path)
                .map_err(image::ImageError::IoError)
                .and_then(|r| r.with_guessed_format().map_err(image::ImageError::IoError))
                .and_then(|r| r.decode());
            let resized = match decoded {
                Ok(img) => Some(img.resize(max_size, max_size, FilterType::Lanczos3)),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to decode image");
                    None
                }
            };
            let _ = sender.send((path, resized));
        });
    }

    /// The decoded image for `path`, requesting it if needed.
    pub fn get(&mut self, path: &Path) -> Option<&mut StatefulProtocol> {
        if !self.cache.contains_key(path) {
            self.request(path);
            return None;
        }
        self.recent.touch(path);
        self.cache.get_mut(path)
    }

    pub fn is_loading(&self, path: &Path) -> bool {
        self.loading.contains(path)
    }

    pub fn has_failed(&self, path: &Path) -> bool {
        self.failed.contains(path)
    }
}

impl ImagePreloader for ImageCache {
    fn preload(&mut self, image: &Path) {
        self.request(image);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requests_are_ignored_without_protocol() {
        let mut cache = ImageCache::without_protocol(512);
        cache.preload(Path::new("missing.jpg"));
        assert!(!cache.is_available());
        assert!(!cache.is_loading(Path::new("missing.jpg")));
        assert!(cache.get(Path::new("missing.jpg")).is_none());
    }

    #[test]
    fn test_recent_paths_drop_least_recently_used() {
        let mut recent = RecentPaths::new(3);
        assert_eq!(recent.touch(Path::new("a.jpg")), None);
        assert_eq!(recent.touch(Path::new("b.jpg")), None);
        assert_eq!(recent.touch(Path::new("c.jpg")), None);

        // Viewing a again keeps it, b is now the oldest
        assert_eq!(recent.touch(Path::new("a.jpg")), None);
        assert_eq!(recent.touch(Path::new("d.jpg")), Some(PathBuf::from("b.jpg")));
        assert_eq!(recent.touch(Path::new("e.jpg")), Some(PathBuf::from("c.jpg")));
        assert_eq!(recent.order.len(), 3);
    }

    #[test]
    fn test_recent_paths_keep_at_least_one() {
        let mut recent = RecentPaths::new(0);
        assert_eq!(recent.touch(Path::new("a.jpg")), None);
        assert_eq!(recent.touch(Path::new("b.jpg")), Some(PathBuf::from("a.jpg")));
    }
}
