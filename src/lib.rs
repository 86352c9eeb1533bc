//! pdfstack - arrange a stack of images and save them as one PDF
//!
//! This crate provides the ordering, assembly and terminal UI pieces of the
//! pdfstack application: an ordered selection that can be reordered by drag
//! and drop or by typed ranks, and a pipeline that decodes each image and
//! places it on its own A4 page.

pub mod app;
pub mod artifact;
pub mod assembly;
pub mod cli;
pub mod config;
pub mod decoder;
pub mod domain;
pub mod error;
pub mod file_opener;
pub mod logging;
pub mod preview;
pub mod thumbnails;
pub mod tui;

// Re-export primary types for convenience
pub use artifact::{DocumentBuilder, PdfDocumentBuilder};
pub use assembly::{
    AssembledDocument, AssemblyPipeline, AssemblyProgress, AssemblyStatus, BackgroundAssembly,
    OutputTarget,
};
pub use config::UserConfig;
pub use decoder::{FsImageDecoder, ImageDecoder};
pub use domain::{
    apply_manual_sort, discover_images, discover_images_with_options, DiscoveryOptions,
    DragReorder, FileEntry, FileHandle, FileSelection, SelectionStore, SortBy,
};
pub use error::{PdfStackError, Result};
pub use file_opener::open_file;
