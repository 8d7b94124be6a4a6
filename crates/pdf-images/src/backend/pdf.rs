//! PDF output through lopdf
//!
//! Each image becomes an `/Image` XObject holding Flate-compressed RGB
//! samples, with an `/SMask` when the source had transparency. Page
//! dictionaries are written once at the end so every page shares the
//! same parent and MediaBox.

use super::DocumentBackend;
use crate::constants::{PDF_VERSION, mm_to_pt};
use crate::decode::DecodedImage;
use crate::layout::{PageGeometry, PlacementRect};
use crate::types::*;
use flate2::Compression;
use flate2::write::ZlibEncoder;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::io::Write;

/// Writes documents with lopdf
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfBackend;

/// A document under construction
pub struct PdfBuild {
    doc: Document,
    pages_id: ObjectId,
    geometry: PageGeometry,
    pages: Vec<PendingPage>,
    image_count: usize,
}

#[derive(Default)]
struct PendingPage {
    xobjects: Dictionary,
    content: String,
}

impl DocumentBackend for LopdfBackend {
    type Document = PdfBuild;

    fn create_document(&self, geometry: &PageGeometry) -> Result<PdfBuild> {
        let mut doc = Document::with_version(PDF_VERSION);
        let pages_id = doc.new_object_id();

        Ok(PdfBuild {
            doc,
            pages_id,
            geometry: *geometry,
            pages: vec![PendingPage::default()],
            image_count: 0,
        })
    }

    fn add_page(&self, build: &mut PdfBuild) -> Result<()> {
        build.pages.push(PendingPage::default());
        Ok(())
    }

    fn add_image(
        &self,
        build: &mut PdfBuild,
        image: &DecodedImage,
        rect: &PlacementRect,
        compression: CompressionLevel,
    ) -> Result<()> {
        let xobject_id = embed_image(&mut build.doc, image, compression)?;
        let name = format!("Im{}", build.image_count);
        build.image_count += 1;

        // Layout uses a top-left origin; PDF user space starts bottom-left
        let command = placement_command(
            &name,
            mm_to_pt(rect.x),
            mm_to_pt(rect.bottom_offset(build.geometry.height_mm)),
            mm_to_pt(rect.width),
            mm_to_pt(rect.height),
        );

        let page = build
            .pages
            .last_mut()
            .ok_or_else(|| ConvertError::Encoding("document has no pages".to_string()))?;
        page.xobjects.set(name.as_bytes(), Object::Reference(xobject_id));
        page.content.push_str(&command);

        Ok(())
    }

    fn page_width(&self, build: &PdfBuild) -> f32 {
        build.geometry.width_mm
    }

    fn page_height(&self, build: &PdfBuild) -> f32 {
        build.geometry.height_mm
    }

    fn page_count(&self, build: &PdfBuild) -> usize {
        build.pages.len()
    }

    fn finalize(&self, build: PdfBuild, file_name: &str) -> Result<Vec<u8>> {
        let PdfBuild {
            mut doc,
            pages_id,
            geometry,
            pages,
            ..
        } = build;

        let media_box = vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(mm_to_pt(geometry.width_mm)),
            Object::Real(mm_to_pt(geometry.height_mm)),
        ];

        let mut kids = Vec::with_capacity(pages.len());
        for page in pages {
            let content_id =
                doc.add_object(Stream::new(Dictionary::new(), page.content.into_bytes()));

            let mut resources = Dictionary::new();
            resources.set("XObject", Object::Dictionary(page.xobjects));

            let page_id = doc.add_object(Dictionary::from_iter(vec![
                ("Type", Object::Name(b"Page".to_vec())),
                ("Parent", Object::Reference(pages_id)),
                ("MediaBox", Object::Array(media_box.clone())),
                ("Resources", Object::Dictionary(resources)),
                ("Contents", Object::Reference(content_id)),
            ]));
            kids.push(Object::Reference(page_id));
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(Dictionary::from_iter(vec![
                ("Type", Object::Name(b"Pages".to_vec())),
                ("Kids", Object::Array(kids)),
                ("Count", Object::Integer(count)),
            ])),
        );

        let catalog_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(pages_id)),
        ]));
        doc.trailer.set("Root", catalog_id);

        let info_id = doc.add_object(Dictionary::from_iter(vec![
            ("Title", Object::string_literal(file_name)),
            ("Producer", Object::string_literal("pdf-tools")),
        ]));
        doc.trailer.set("Info", info_id);

        let mut writer = Vec::new();
        doc.save_to(&mut writer)?;
        Ok(writer)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Add the image (and its soft mask) to `doc`, returning the image XObject id
fn embed_image(
    doc: &mut Document,
    image: &DecodedImage,
    compression: CompressionLevel,
) -> Result<ObjectId> {
    let pixels = image.width as usize * image.height as usize;
    if image.rgb.len() != pixels * 3 {
        return Err(ConvertError::Encoding(format!(
            "expected {} RGB bytes for a {}x{} image, got {}",
            pixels * 3,
            image.width,
            image.height,
            image.rgb.len()
        )));
    }

    let smask_id = match &image.alpha {
        Some(alpha) if alpha.len() == pixels => {
            let dict = image_dictionary(image, b"DeviceGray");
            Some(doc.add_object(Stream::new(dict, deflate(alpha, compression)?)))
        }
        Some(alpha) => {
            return Err(ConvertError::Encoding(format!(
                "expected {} alpha bytes, got {}",
                pixels,
                alpha.len()
            )));
        }
        None => None,
    };

    let mut dict = image_dictionary(image, b"DeviceRGB");
    if let Some(smask_id) = smask_id {
        dict.set("SMask", Object::Reference(smask_id));
    }

    Ok(doc.add_object(Stream::new(dict, deflate(&image.rgb, compression)?)))
}

fn image_dictionary(image: &DecodedImage, color_space: &[u8]) -> Dictionary {
    Dictionary::from_iter(vec![
        ("Type", Object::Name(b"XObject".to_vec())),
        ("Subtype", Object::Name(b"Image".to_vec())),
        ("Width", Object::Integer(image.width as i64)),
        ("Height", Object::Integer(image.height as i64)),
        ("ColorSpace", Object::Name(color_space.to_vec())),
        ("BitsPerComponent", Object::Integer(8)),
        ("Filter", Object::Name(b"FlateDecode".to_vec())),
    ])
}

fn flate_level(compression: CompressionLevel) -> Compression {
    match compression {
        CompressionLevel::Fast => Compression::fast(),
        CompressionLevel::Balanced => Compression::default(),
        CompressionLevel::Best => Compression::best(),
    }
}

fn deflate(data: &[u8], compression: CompressionLevel) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), flate_level(compression));
    encoder
        .write_all(data)
        .map_err(|e| ConvertError::Encoding(e.to_string()))?;
    encoder
        .finish()
        .map_err(|e| ConvertError::Encoding(e.to_string()))
}

/// Content stream command drawing an image XObject into a rectangle (points)
fn placement_command(name: &str, x: f32, y: f32, width: f32, height: f32) -> String {
    format!("q {} 0 0 {} {} {} cm /{} Do Q\n", width, height, x, y, name)
}
