pub mod drag_reorder;
pub mod manual_rank;
pub mod selection_store;

pub use drag_reorder::{DragOver, DragReorder, DropOutcome};
pub use manual_rank::{apply_manual_sort, parse_declared_rank, resolve_order, RankEntry};
pub use selection_store::{AssemblyTicket, SelectionStore};

use chrono::{DateTime, Utc};
use std::fmt;
use std::fs;
use std::io;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Extensions the image decoder is expected to understand
const IMAGE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "bmp", "webp", "tif", "tiff", "ico", "tga", "pnm", "qoi",
];

/// Returns true when the extension looks like a decodable image
pub fn is_image_extension(ext: &str) -> bool {
    let ext = ext.to_lowercase();
    IMAGE_EXTENSIONS.contains(&ext.as_str())
}

#[derive(Debug, Clone)]
pub struct FileEntry {
    pub path: PathBuf,
    pub name: String,
    pub size: u64,
    pub modified_date: DateTime<Utc>,
}

impl FileEntry {
    pub fn from_path(path: &Path) -> io::Result<Self> {
        let metadata = fs::metadata(path)?;
        let modified = metadata.modified()?;
        let modified_date: DateTime<Utc> = modified.into();

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        Ok(FileEntry {
            path: path.to_path_buf(),
            name,
            size: metadata.len(),
            modified_date,
        })
    }
}

/// Opaque reference to one selected image.
///
/// Equality is identity: two handles are equal only if they were cloned from
/// the same selection entry, even when they point at the same path.
#[derive(Clone)]
pub struct FileHandle(Arc<FileEntry>);

impl FileHandle {
    pub fn new(entry: FileEntry) -> Self {
        Self(Arc::new(entry))
    }

    /// Stable identity key, valid for as long as any clone of the handle is alive
    pub fn id(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }
}

impl Deref for FileHandle {
    type Target = FileEntry;

    fn deref(&self) -> &FileEntry {
        &self.0
    }
}

impl PartialEq for FileHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for FileHandle {}

impl fmt::Debug for FileHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FileHandle").field(&self.0.name).finish()
    }
}

/// Options for image discovery inside directories
#[derive(Debug, Clone, Default)]
pub struct DiscoveryOptions {
    /// Include hidden files
    pub show_hidden: bool,
    /// Sort order
    pub sort_by: SortBy,
    /// Reverse sort order
    pub reverse: bool,
}

/// Sort order for discovered images
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortBy {
    /// Sort by file name
    #[default]
    Name,
    /// Sort by modification date
    Date,
    /// Sort by file size
    Size,
}

/// Discovers images in a directory, sorted by name.
///
/// # Behavior
/// - Filters out hidden files (names starting with '.')
/// - Filters out directories and non-image extensions
/// - Does not recurse into subdirectories
/// - Skips entries that cannot be read
pub fn discover_images(dir_path: &Path) -> io::Result<Vec<FileEntry>> {
    discover_images_with_options(dir_path, &DiscoveryOptions::default())
}

/// Discovers images with custom options
pub fn discover_images_with_options(
    dir_path: &Path,
    options: &DiscoveryOptions,
) -> io::Result<Vec<FileEntry>> {
    let mut files = Vec::new();

    for entry_result in fs::read_dir(dir_path)? {
        let entry = match entry_result {
            Ok(e) => e,
            Err(_) => continue,
        };

        let path = entry.path();

        let file_name = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name,
            None => continue,
        };

        if !options.show_hidden && file_name.starts_with('.') {
            continue;
        }

        let is_image = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(is_image_extension);
        if !is_image {
            continue;
        }

        match fs::metadata(&path) {
            Ok(m) if m.is_file() => {}
            _ => continue,
        }

        match FileEntry::from_path(&path) {
            Ok(fe) => files.push(fe),
            Err(_) => continue,
        }
    }

    // Stable sorts keep name order as the tie breaker
    files.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    match options.sort_by {
        SortBy::Name => {}
        SortBy::Date => files.sort_by(|a, b| a.modified_date.cmp(&b.modified_date)),
        SortBy::Size => files.sort_by(|a, b| a.size.cmp(&b.size)),
    }

    if options.reverse {
        files.reverse();
    }

    Ok(files)
}

/// Builds a selection from command line paths.
///
/// Files are kept in the order given; each directory contributes its images
/// in discovery order at the position it was named.
pub fn collect_selection(paths: &[PathBuf], options: &DiscoveryOptions) -> io::Result<Vec<FileEntry>> {
    let mut entries = Vec::new();

    for path in paths {
        if path.is_dir() {
            entries.extend(discover_images_with_options(path, options)?);
        } else {
            entries.push(FileEntry::from_path(path)?);
        }
    }

    Ok(entries)
}

/// Human readable selection count ("Selected 3 images"), empty for no files
pub fn selection_summary(count: usize) -> String {
    match count {
        0 => String::new(),
        1 => "Selected 1 image".to_string(),
        n => format!("Selected {} images", n),
    }
}

/// The set of files the user picked, as the outside world sees it.
///
/// The app writes every reordered sequence back here, so the selection always
/// mirrors the tile grid and its summary. A rescan rebuilds it from disk.
#[derive(Debug, Default)]
pub struct FileSelection {
    files: Vec<FileHandle>,
}

impl FileSelection {
    pub fn new(entries: Vec<FileEntry>) -> Self {
        Self {
            files: entries.into_iter().map(FileHandle::new).collect(),
        }
    }

    /// Re-runs discovery for the given paths, producing a fresh selection
    pub fn scan(paths: &[PathBuf], options: &DiscoveryOptions) -> io::Result<Self> {
        Ok(Self::new(collect_selection(paths, options)?))
    }

    pub fn files(&self) -> &[FileHandle] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Replaces the active selection with a reordered sequence
    pub fn write_back(&mut self, order: &[FileHandle]) {
        self.files = order.to_vec();
    }

    pub fn summary(&self) -> String {
        selection_summary(self.files.len())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    mod extension_tests {
        use super::*;

        #[test]
        fn test_image_extensions() {
            assert!(is_image_extension("png"));
            assert!(is_image_extension("jpg"));
            assert!(is_image_extension("jpeg"));
            assert!(is_image_extension("webp"));
            assert!(is_image_extension("JPG"));
        }

        #[test]
        fn test_non_image_extensions() {
            assert!(!is_image_extension("pdf"));
            assert!(!is_image_extension("txt"));
            assert!(!is_image_extension(""));
        }
    }

    mod handle_tests {
        use super::test_support::handle;
        use super::*;

        #[test]
        fn test_handle_equality_is_identity() {
            let a = handle("same.png");
            let b = handle("same.png");

            assert_eq!(a, a.clone());
            assert_ne!(a, b);
            assert_eq!(a.id(), a.clone().id());
            assert_ne!(a.id(), b.id());
        }

        #[test]
        fn test_handle_derefs_to_entry() {
            let a = handle("photo.png");
            assert_eq!(a.name, "photo.png");
            assert_eq!(a.path, PathBuf::from("photo.png"));
        }
    }

    mod discovery_tests {
        use super::*;
        use std::thread;
        use std::time::Duration;
        use tempfile::TempDir;

        #[test]
        fn test_discover_only_images() {
            let temp_dir = TempDir::new().unwrap();
            let dir_path = temp_dir.path();

            fs::write(dir_path.join("b.png"), b"png").unwrap();
            fs::write(dir_path.join("a.jpg"), b"jpg").unwrap();
            fs::write(dir_path.join("notes.txt"), b"notes").unwrap();
            fs::create_dir(dir_path.join("nested.png")).unwrap();

            let files = discover_images(dir_path).unwrap();

            let names: Vec<_> = files.iter().map(|f| f.name.as_str()).collect();
            assert_eq!(names, vec!["a.jpg", "b.png"]);
        }

        #[test]
        fn test_discover_skips_hidden_unless_requested() {
            let temp_dir = TempDir::new().unwrap();
            let dir_path = temp_dir.path();

            fs::write(dir_path.join("visible.png"), b"v").unwrap();
            fs::write(dir_path.join(".hidden.png"), b"h").unwrap();

            assert_eq!(discover_images(dir_path).unwrap().len(), 1);

            let options = DiscoveryOptions {
                show_hidden: true,
                ..Default::default()
            };
            assert_eq!(
                discover_images_with_options(dir_path, &options)
                    .unwrap()
                    .len(),
                2
            );
        }

        #[test]
        fn test_discover_sort_by_size_reversed() {
            let temp_dir = TempDir::new().unwrap();
            let dir_path = temp_dir.path();

            fs::write(dir_path.join("small.png"), b"s").unwrap();
            fs::write(dir_path.join("large.png"), vec![b'x'; 100]).unwrap();
            fs::write(dir_path.join("medium.png"), vec![b'x'; 50]).unwrap();

            let options = DiscoveryOptions {
                sort_by: SortBy::Size,
                reverse: true,
                ..Default::default()
            };

            let files = discover_images_with_options(dir_path, &options).unwrap();
            let names: Vec<_> = files.iter().map(|f| f.name.as_str()).collect();
            assert_eq!(names, vec!["large.png", "medium.png", "small.png"]);
        }

        #[test]
        fn test_discover_sort_by_date() {
            let temp_dir = TempDir::new().unwrap();
            let dir_path = temp_dir.path();

            fs::write(dir_path.join("zeta.png"), b"first").unwrap();
            thread::sleep(Duration::from_millis(20));
            fs::write(dir_path.join("alpha.png"), b"second").unwrap();

            let options = DiscoveryOptions {
                sort_by: SortBy::Date,
                ..Default::default()
            };

            let files = discover_images_with_options(dir_path, &options).unwrap();
            assert_eq!(files[0].name, "zeta.png");
            assert_eq!(files[1].name, "alpha.png");
        }

        #[test]
        fn test_discover_nonexistent_directory() {
            assert!(discover_images(Path::new("/nonexistent/directory")).is_err());
        }

        #[test]
        fn test_collect_selection_keeps_argument_order() {
            let temp_dir = TempDir::new().unwrap();
            let dir_path = temp_dir.path();

            let album = dir_path.join("album");
            fs::create_dir(&album).unwrap();
            fs::write(album.join("2.png"), b"2").unwrap();
            fs::write(album.join("1.png"), b"1").unwrap();
            fs::write(dir_path.join("cover.jpg"), b"c").unwrap();
            fs::write(dir_path.join("back.jpg"), b"b").unwrap();

            let paths = vec![dir_path.join("cover.jpg"), album, dir_path.join("back.jpg")];
            let entries = collect_selection(&paths, &DiscoveryOptions::default()).unwrap();

            let names: Vec<_> = entries.iter().map(|f| f.name.as_str()).collect();
            assert_eq!(names, vec!["cover.jpg", "1.png", "2.png", "back.jpg"]);
        }

        #[test]
        fn test_collect_selection_missing_file_fails() {
            let result = collect_selection(
                &[PathBuf::from("/nonexistent/image.png")],
                &DiscoveryOptions::default(),
            );
            assert!(result.is_err());
        }
    }

    mod selection_tests {
        use super::test_support::{handles, names};
        use super::*;

        #[test]
        fn test_selection_summary_wording() {
            assert_eq!(selection_summary(0), "");
            assert_eq!(selection_summary(1), "Selected 1 image");
            assert_eq!(selection_summary(4), "Selected 4 images");
        }

        #[test]
        fn test_write_back_replaces_order() {
            let mut selection = FileSelection::default();
            assert!(selection.is_empty());

            let order = handles(&["a.png", "b.png"]);
            selection.write_back(&order);
            assert_eq!(selection.len(), 2);

            let reversed: Vec<_> = order.iter().rev().cloned().collect();
            selection.write_back(&reversed);
            assert_eq!(names(selection.files()), vec!["b.png", "a.png"]);
            assert_eq!(selection.summary(), "Selected 2 images");
        }
    }
}
