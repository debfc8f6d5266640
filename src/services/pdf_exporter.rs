//! PDF export of reviewed captures.
//!
//! One page per capture: the screenshot scaled to a fixed width, a filled
//! circle where the click happened, and the annotation (if any) below the
//! image. Layout values come from `ExportSettings` and are in millimetres;
//! PDF user space is points with the origin at the bottom-left corner.

use std::fs;
use std::path::{Path, PathBuf};

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};
use tracing::{debug, info};

use crate::types::capture::Capture;
use crate::types::errors::ExportError;
use crate::types::settings::ExportSettings;

const POINTS_PER_MM: f32 = 72.0 / 25.4;
/// Control point distance for approximating a quarter circle with a cubic Bézier.
const BEZIER_CIRCLE_K: f32 = 0.552_284_8;

/// Where the elements of one page go, in millimetres from the top-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub image_x_mm: f32,
    pub image_y_mm: f32,
    pub image_width_mm: f32,
    pub image_height_mm: f32,
    pub marker_x_mm: f32,
    pub marker_y_mm: f32,
    pub annotation_y_mm: f32,
}

/// Computes the page placement for an image of `pixel_width` x `pixel_height`
/// clicked at (`click_x`, `click_y`) image pixels.
pub fn placement(
    layout: &ExportSettings,
    pixel_width: u32,
    pixel_height: u32,
    click_x: f64,
    click_y: f64,
) -> Placement {
    let pixel_width = pixel_width.max(1) as f32;
    let scale = layout.image_width_mm / pixel_width;
    let image_height_mm = pixel_height as f32 * scale;
    Placement {
        image_x_mm: layout.margin_mm,
        image_y_mm: layout.margin_mm,
        image_width_mm: layout.image_width_mm,
        image_height_mm,
        marker_x_mm: layout.margin_mm + click_x as f32 * scale,
        marker_y_mm: layout.margin_mm + click_y as f32 * scale,
        annotation_y_mm: layout.margin_mm + image_height_mm + layout.annotation_offset_mm,
    }
}

/// What ended up on one exported page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSummary {
    pub click_x: f64,
    pub click_y: f64,
    pub placement: Placement,
    pub annotation: Option<String>,
}

/// A finished PDF, ready to be written or offered for download.
#[derive(Debug, Clone)]
pub struct ExportedDocument {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub pages: Vec<PageSummary>,
}

impl ExportedDocument {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Writes the document into `dir` under its file name.
    pub fn write_to_dir(&self, dir: &Path) -> Result<PathBuf, ExportError> {
        fs::create_dir_all(dir).map_err(|e| {
            ExportError::Io(format!("Failed to create export directory: {}", e))
        })?;
        let path = dir.join(&self.file_name);
        fs::write(&path, &self.bytes)
            .map_err(|e| ExportError::Io(format!("Failed to write {}: {}", path.display(), e)))?;
        info!(path = %path.display(), pages = self.page_count(), "PDF written");
        Ok(path)
    }
}

pub struct PdfExporter {
    layout: ExportSettings,
}

impl PdfExporter {
    pub fn new(layout: ExportSettings) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &ExportSettings {
        &self.layout
    }

    /// Renders `captures` in order, one page each.
    ///
    /// An empty slice produces a valid document with an empty page tree.
    pub fn render(&self, captures: &[Capture]) -> Result<ExportedDocument, ExportError> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });

        let mut kids = Vec::with_capacity(captures.len());
        let mut pages = Vec::with_capacity(captures.len());
        for (index, capture) in captures.iter().enumerate() {
            let (page_id, summary) = self.add_page(&mut doc, pages_id, font_id, index, capture)?;
            kids.push(Object::Reference(page_id));
            pages.push(summary);
        }

        let page_count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => Object::Integer(page_count),
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        let info_id = doc.add_object(dictionary! {
            "Title" => Object::string_literal(self.layout.file_name.trim_end_matches(".pdf")),
            "Producer" => Object::string_literal(concat!("clicktrail ", env!("CARGO_PKG_VERSION"))),
        });
        doc.trailer.set("Root", catalog_id);
        doc.trailer.set("Info", info_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes)
            .map_err(|e| ExportError::Pdf(e.to_string()))?;
        info!(pages = pages.len(), bytes = bytes.len(), "PDF rendered");

        Ok(ExportedDocument {
            file_name: self.layout.file_name.clone(),
            bytes,
            pages,
        })
    }

    fn add_page(
        &self,
        doc: &mut Document,
        pages_id: ObjectId,
        font_id: ObjectId,
        index: usize,
        capture: &Capture,
    ) -> Result<(ObjectId, PageSummary), ExportError> {
        let decoded = image::load_from_memory(&capture.image.bytes)
            .map_err(|e| ExportError::InvalidImage {
                index,
                reason: e.to_string(),
            })?
            .to_rgb8();
        let (pixel_width, pixel_height) = decoded.dimensions();
        let place = placement(
            &self.layout,
            pixel_width,
            pixel_height,
            capture.click_x,
            capture.click_y,
        );
        debug!(index, pixel_width, pixel_height, ?place, "Laying out page");

        let image_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => Object::Integer(pixel_width as i64),
                "Height" => Object::Integer(pixel_height as i64),
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => Object::Integer(8),
            },
            decoded.into_raw(),
        ));

        let content = Content {
            operations: self.page_operations(&place, capture.annotation.as_deref()),
        };
        let encoded = content
            .encode()
            .map_err(|e| ExportError::Pdf(e.to_string()))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));

        let page_width = self.layout.page_width_mm * POINTS_PER_MM;
        let page_height = self.layout.page_height_mm * POINTS_PER_MM;
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(page_width),
                Object::Real(page_height),
            ],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
                "XObject" => dictionary! { "Im0" => image_id },
            },
        });

        let summary = PageSummary {
            click_x: capture.click_x,
            click_y: capture.click_y,
            placement: place,
            annotation: capture.annotation.clone(),
        };
        Ok((page_id, summary))
    }

    fn page_operations(&self, place: &Placement, annotation: Option<&str>) -> Vec<Operation> {
        let page_height = self.layout.page_height_mm;
        // Flip from top-left millimetres to bottom-left points.
        let x = |mm: f32| Object::Real(mm * POINTS_PER_MM);
        let y = |mm: f32| Object::Real((page_height - mm) * POINTS_PER_MM);

        let image_w = place.image_width_mm * POINTS_PER_MM;
        let image_h = place.image_height_mm * POINTS_PER_MM;
        let mut ops = vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    Object::Real(image_w),
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Real(image_h),
                    x(place.image_x_mm),
                    y(place.image_y_mm + place.image_height_mm),
                ],
            ),
            Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
            Operation::new("Q", vec![]),
        ];

        let [r, g, b] = self.layout.marker_color;
        ops.push(Operation::new(
            "rg",
            vec![
                Object::Real(r as f32 / 255.0),
                Object::Real(g as f32 / 255.0),
                Object::Real(b as f32 / 255.0),
            ],
        ));
        ops.extend(circle(
            place.marker_x_mm * POINTS_PER_MM,
            (page_height - place.marker_y_mm) * POINTS_PER_MM,
            self.layout.marker_radius_mm * POINTS_PER_MM,
        ));

        if let Some(text) = annotation.filter(|t| !t.is_empty()) {
            ops.extend([
                Operation::new("rg", vec![Object::Integer(0), Object::Integer(0), Object::Integer(0)]),
                Operation::new("BT", vec![]),
                Operation::new(
                    "Tf",
                    vec![
                        Object::Name(b"F1".to_vec()),
                        Object::Real(self.layout.annotation_font_size_pt),
                    ],
                ),
                Operation::new("Td", vec![x(place.image_x_mm), y(place.annotation_y_mm)]),
                Operation::new(
                    "Tj",
                    vec![Object::String(encode_latin1(text), StringFormat::Literal)],
                ),
                Operation::new("ET", vec![]),
            ]);
        }
        ops
    }
}

/// Filled circle as four cubic Bézier segments.
fn circle(cx: f32, cy: f32, r: f32) -> Vec<Operation> {
    let k = BEZIER_CIRCLE_K * r;
    let pt = |v: f32| Object::Real(v);
    vec![
        Operation::new("m", vec![pt(cx + r), pt(cy)]),
        Operation::new(
            "c",
            vec![pt(cx + r), pt(cy + k), pt(cx + k), pt(cy + r), pt(cx), pt(cy + r)],
        ),
        Operation::new(
            "c",
            vec![pt(cx - k), pt(cy + r), pt(cx - r), pt(cy + k), pt(cx - r), pt(cy)],
        ),
        Operation::new(
            "c",
            vec![pt(cx - r), pt(cy - k), pt(cx - k), pt(cy - r), pt(cx), pt(cy - r)],
        ),
        Operation::new(
            "c",
            vec![pt(cx + k), pt(cy - r), pt(cx + r), pt(cy - k), pt(cx + r), pt(cy)],
        ),
        Operation::new("h", vec![]),
        Operation::new("f", vec![]),
    ]
}

/// Helvetica only covers Latin-1 here; anything else becomes `?` and
/// control characters become spaces.
fn encode_latin1(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c as u32 {
            _ if c.is_control() => b' ',
            code @ 0..=255 => code as u8,
            _ => b'?',
        })
        .collect()
}
