//! Output document construction
//!
//! The assembly pipeline only talks to [`DocumentBuilder`]; the PDF encoding
//! lives in [`PdfDocumentBuilder`], which writes one JPEG image XObject per
//! placement with `lopdf`.

use crate::decoder::DecodedImage;
use crate::error::{PdfStackError, Result};
use image::DynamicImage;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// A4 portrait width in PDF points
pub const A4_WIDTH_PT: f32 = 595.28;
/// A4 portrait height in PDF points
pub const A4_HEIGHT_PT: f32 = 841.89;

const JPEG_QUALITY: u8 = 92;

/// Encoding used to embed pixels into the document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageEncoding {
    #[default]
    Jpeg,
}

/// Where an image lands on the current page, in points from the top-left corner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Opaque multi-page document builder.
///
/// A new document starts with one blank page; `add_page` appends another and
/// makes it current.
pub trait DocumentBuilder: Send {
    /// Fixed width of every page
    fn page_width(&self) -> f32;

    fn page_count(&self) -> usize;

    fn add_page(&mut self);

    /// Places an image on the current page
    fn place_image(
        &mut self,
        image: &DecodedImage,
        encoding: ImageEncoding,
        placement: Placement,
    ) -> Result<()>;

    /// Finalizes the document as `<directory>/<name>.pdf`
    fn save(self, directory: &Path, name: &str) -> Result<PathBuf>
    where
        Self: Sized;
}

#[derive(Debug, Default)]
struct PendingPage {
    operations: Vec<Operation>,
    xobjects: Dictionary,
}

/// Builds an A4 portrait PDF with `lopdf`
pub struct PdfDocumentBuilder {
    doc: Document,
    pages: Vec<PendingPage>,
    page_width: f32,
    page_height: f32,
    image_count: usize,
}

impl PdfDocumentBuilder {
    pub fn new() -> Self {
        Self::with_page_size(A4_WIDTH_PT, A4_HEIGHT_PT)
    }

    pub fn with_page_size(page_width: f32, page_height: f32) -> Self {
        Self {
            doc: Document::with_version("1.5"),
            pages: vec![PendingPage::default()],
            page_width,
            page_height,
            image_count: 0,
        }
    }

    /// Serializes the finished document to bytes
    pub fn to_bytes(mut self) -> Result<Vec<u8>> {
        self.finish()?;
        let mut buffer = Vec::new();
        self.doc
            .save_to(&mut buffer)
            .map_err(|e| PdfStackError::Artifact(format!("Failed to write PDF: {}", e)))?;
        Ok(buffer)
    }

    /// Writes pages, page tree and catalog into the underlying document
    fn finish(&mut self) -> Result<()> {
        let pages_id = self.doc.new_object_id();
        let mut kids: Vec<Object> = Vec::with_capacity(self.pages.len());

        for page in std::mem::take(&mut self.pages) {
            let content = Content {
                operations: page.operations,
            };
            let encoded = content
                .encode()
                .map_err(|e| PdfStackError::Artifact(format!("Failed to encode page: {}", e)))?;
            let content_id = self.doc.add_object(Stream::new(Dictionary::new(), encoded));

            let resources_id = self.doc.add_object(dictionary! {
                "XObject" => page.xobjects,
            });

            let page_id = self.doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
                "MediaBox" => vec![
                    0.into(),
                    0.into(),
                    self.page_width.into(),
                    self.page_height.into(),
                ],
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        self.doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );

        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);

        Ok(())
    }

    fn embed_jpeg(&mut self, image: &DecodedImage) -> Result<ObjectId> {
        let rgb = DynamicImage::ImageRgb8(image.pixels.to_rgb8());
        let mut bytes = Vec::new();
        let encoder =
            image::codecs::jpeg::JpegEncoder::new_with_quality(Cursor::new(&mut bytes), JPEG_QUALITY);
        rgb.write_with_encoder(encoder)
            .map_err(|e| PdfStackError::Artifact(format!("Failed to encode JPEG: {}", e)))?;

        let stream = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => i64::from(image.width),
                "Height" => i64::from(image.height),
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "Filter" => "DCTDecode",
            },
            bytes,
        );

        Ok(self.doc.add_object(stream))
    }
}

impl Default for PdfDocumentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentBuilder for PdfDocumentBuilder {
    fn page_width(&self) -> f32 {
        self.page_width
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn add_page(&mut self) {
        self.pages.push(PendingPage::default());
    }

    fn place_image(
        &mut self,
        image: &DecodedImage,
        encoding: ImageEncoding,
        placement: Placement,
    ) -> Result<()> {
        let image_id = match encoding {
            ImageEncoding::Jpeg => self.embed_jpeg(image)?,
        };

        self.image_count += 1;
        let name = format!("Im{}", self.image_count);

        // PDF user space starts at the bottom-left corner
        let bottom = self.page_height - placement.y - placement.height;

        let page = self
            .pages
            .last_mut()
            .ok_or_else(|| PdfStackError::Artifact("Document has no pages".to_string()))?;
        page.xobjects.set(name.as_bytes().to_vec(), image_id);
        page.operations.extend([
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    placement.width.into(),
                    0.into(),
                    0.into(),
                    placement.height.into(),
                    placement.x.into(),
                    bottom.into(),
                ],
            ),
            Operation::new("Do", vec![Object::Name(name.into_bytes())]),
            Operation::new("Q", vec![]),
        ]);

        Ok(())
    }

    fn save(self, directory: &Path, name: &str) -> Result<PathBuf> {
        let path = directory.join(format!("{}.pdf", name));
        let bytes = self.to_bytes()?;
        std::fs::write(&path, bytes)?;

        Ok(path)
    }
}
