//! Sequential decode-and-place pipeline that turns the page order into a PDF

use crate::artifact::{DocumentBuilder, ImageEncoding, Placement};
use crate::decoder::ImageDecoder;
use crate::domain::{AssemblyTicket, SelectionStore};
use crate::error::{PdfStackError, Result};
use std::path::PathBuf;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Name used when the user leaves the output name empty
pub const DEFAULT_OUTPUT_NAME: &str = "document";

/// Geometry of one image scaled to the page width
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Page {
    pub image_width: u32,
    pub image_height: u32,
    pub render_width: f32,
    pub render_height: f32,
}

impl Page {
    /// Scales an image to `page_width`, preserving its aspect ratio
    pub fn fit_to_width(image_width: u32, image_height: u32, page_width: f32) -> Self {
        let render_height = image_height as f32 * page_width / image_width as f32;
        Self {
            image_width,
            image_height,
            render_width: page_width,
            render_height,
        }
    }
}

/// Pages completed out of the total, published after every placed page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssemblyProgress {
    pub completed: usize,
    pub total: usize,
}

impl AssemblyProgress {
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }

    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.completed == self.total
    }
}

/// Rejects names that would place the document outside its directory
pub fn check_output_name(name: &str) -> Result<()> {
    if name.contains(['/', '\\']) {
        return Err(PdfStackError::InvalidOutputName(name.to_string()));
    }
    Ok(())
}

/// Where the finished document is written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTarget {
    pub directory: PathBuf,
    pub name: String,
}

impl OutputTarget {
    /// Blank names fall back to [`DEFAULT_OUTPUT_NAME`]
    pub fn new(directory: impl Into<PathBuf>, name: &str) -> Self {
        let name = name.trim();
        Self {
            directory: directory.into(),
            name: if name.is_empty() {
                DEFAULT_OUTPUT_NAME.to_string()
            } else {
                name.to_string()
            },
        }
    }

    /// Path the persistence step will produce
    pub fn file_path(&self) -> PathBuf {
        self.directory.join(format!("{}.pdf", self.name))
    }
}

/// Result of a successful assembly
#[derive(Debug, Clone)]
pub struct AssembledDocument {
    pub path: PathBuf,
    pub pages: Vec<Page>,
}

/// Decodes the page order one image at a time and places each on its own page
pub struct AssemblyPipeline<D> {
    decoder: D,
    progress: watch::Sender<AssemblyProgress>,
}

impl<D: ImageDecoder> AssemblyPipeline<D> {
    pub fn new(decoder: D) -> Self {
        let (progress, _) = watch::channel(AssemblyProgress::default());
        Self { decoder, progress }
    }

    /// Observe progress of the current (or next) run
    pub fn subscribe(&self) -> watch::Receiver<AssemblyProgress> {
        self.progress.subscribe()
    }

    /// Locks the store for the duration of the run and assembles its order
    pub async fn assemble_store<B, F>(
        &self,
        store: &SelectionStore,
        new_document: F,
        target: &OutputTarget,
    ) -> Result<AssembledDocument>
    where
        B: DocumentBuilder,
        F: FnOnce() -> B,
    {
        let ticket = store.begin_assembly()?;
        self.assemble(ticket, new_document, target).await
    }

    /// Assembles the order held by `ticket`.
    ///
    /// The first decode failure aborts the run; the partially built document
    /// is dropped without being saved. The ticket, and with it the store
    /// lock, is released when this returns.
    pub async fn assemble<B, F>(
        &self,
        ticket: AssemblyTicket,
        new_document: F,
        target: &OutputTarget,
    ) -> Result<AssembledDocument>
    where
        B: DocumentBuilder,
        F: FnOnce() -> B,
    {
        let order = ticket.order();
        let total = order.len();
        if total == 0 {
            return Err(PdfStackError::EmptySelection);
        }

        tracing::info!(pages = total, output = %target.file_path().display(), "assembly started");
        self.progress.send_replace(AssemblyProgress {
            completed: 0,
            total,
        });

        let mut document = new_document();
        let page_width = document.page_width();
        let mut pages = Vec::with_capacity(total);

        for (i, handle) in order.iter().enumerate() {
            let image = match self.decoder.decode(handle).await {
                Ok(image) => image,
                Err(source) => {
                    tracing::warn!(
                        page = i + 1,
                        path = %handle.path.display(),
                        error = %source,
                        "decode failed, aborting assembly"
                    );
                    return Err(PdfStackError::DecodeFailure {
                        path: handle.path.clone(),
                        page: i + 1,
                        pages_placed: i,
                        source,
                    });
                }
            };

            let page = Page::fit_to_width(image.width, image.height, page_width);

            if i > 0 {
                document.add_page();
            }
            document.place_image(
                &image,
                ImageEncoding::Jpeg,
                Placement {
                    x: 0.0,
                    y: 0.0,
                    width: page.render_width,
                    height: page.render_height,
                },
            )?;
            pages.push(page);

            tracing::debug!(page = i + 1, name = %handle.name, "placed page");
            self.progress.send_replace(AssemblyProgress {
                completed: i + 1,
                total,
            });
        }

        let path = document.save(&target.directory, &target.name)?;
        tracing::info!(path = %path.display(), pages = pages.len(), "assembly finished");

        Ok(AssembledDocument { path, pages })
    }
}

/// State of an assembly running in the background
#[derive(Debug)]
pub enum AssemblyStatus {
    Running(AssemblyProgress),
    Finished(Result<AssembledDocument>),
}

/// Runs an assembly on a tokio runtime while a synchronous loop polls it
pub struct BackgroundAssembly {
    runtime: Handle,
    task: Option<JoinHandle<Result<AssembledDocument>>>,
    progress: watch::Receiver<AssemblyProgress>,
}

impl BackgroundAssembly {
    /// Spawns the pipeline for the order held by `ticket`
    pub fn spawn<D, B, F>(
        runtime: Handle,
        pipeline: AssemblyPipeline<D>,
        ticket: AssemblyTicket,
        new_document: F,
        target: OutputTarget,
    ) -> Self
    where
        D: ImageDecoder + 'static,
        B: DocumentBuilder + 'static,
        F: FnOnce() -> B + Send + 'static,
    {
        let progress = pipeline.subscribe();
        let task = runtime.spawn(async move {
            pipeline.assemble(ticket, new_document, &target).await
        });

        Self {
            runtime,
            task: Some(task),
            progress,
        }
    }

    /// Non-blocking check; yields `Finished` exactly once
    pub fn poll(&mut self) -> Option<AssemblyStatus> {
        let task = self.task.as_ref()?;

        if !task.is_finished() {
            return Some(AssemblyStatus::Running(*self.progress.borrow()));
        }

        let task = self.task.take()?;
        let result = self.runtime.block_on(task).unwrap_or_else(|e| {
            Err(PdfStackError::Artifact(format!("Assembly task failed: {}", e)))
        });
        Some(AssemblyStatus::Finished(result))
    }

    /// Latest published progress
    pub fn progress(&self) -> AssemblyProgress {
        *self.progress.borrow()
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }
}
