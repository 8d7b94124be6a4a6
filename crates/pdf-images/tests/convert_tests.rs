use lopdf::Document;
use pdf_images::*;
use std::io::Cursor;
use std::sync::Mutex;

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([30, 60, 90, 255]));
    let mut out = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut out, image::ImageFormat::Png)
        .unwrap();
    out.into_inner()
}

fn png_file(name: &str, width: u32, height: u32) -> ImageFile {
    ImageFile::from_bytes(name, "image/png", png_bytes(width, height))
}

fn broken_file(name: &str) -> ImageFile {
    ImageFile::from_bytes(name, "image/png", b"definitely not a png".to_vec())
}

/// `<prefix>_YYYY-MM-DDTHH-MM-SS.pdf`
fn assert_file_name_pattern(name: &str, prefix: &str) {
    let stamp = name
        .strip_prefix(&format!("{}_", prefix))
        .and_then(|rest| rest.strip_suffix(".pdf"))
        .unwrap_or_else(|| panic!("unexpected file name {}", name));
    assert_eq!(stamp.len(), 19, "{}", stamp);
    for (i, c) in stamp.chars().enumerate() {
        match i {
            4 | 7 | 13 | 16 => assert_eq!(c, '-', "{}", stamp),
            10 => assert_eq!(c, 'T', "{}", stamp),
            _ => assert!(c.is_ascii_digit(), "{}", stamp),
        }
    }
}

// =============================================================================
// Recording backend
// =============================================================================

#[derive(Debug, Default)]
struct RecordedDoc {
    geometry: Option<PageGeometry>,
    pages: usize,
    images: Vec<(usize, PlacementRect, CompressionLevel)>,
}

#[derive(Default)]
struct RecordingBackend {
    calls: Mutex<Vec<String>>,
    fail_on_image: Option<usize>,
}

impl RecordingBackend {
    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl DocumentBackend for RecordingBackend {
    type Document = RecordedDoc;

    fn create_document(&self, geometry: &PageGeometry) -> Result<RecordedDoc> {
        self.record(format!("create {}x{}", geometry.width_mm, geometry.height_mm));
        Ok(RecordedDoc {
            geometry: Some(*geometry),
            pages: 1,
            images: Vec::new(),
        })
    }

    fn add_page(&self, doc: &mut RecordedDoc) -> Result<()> {
        self.record("add_page");
        doc.pages += 1;
        Ok(())
    }

    fn add_image(
        &self,
        doc: &mut RecordedDoc,
        _image: &DecodedImage,
        rect: &PlacementRect,
        compression: CompressionLevel,
    ) -> Result<()> {
        if self.fail_on_image == Some(doc.images.len()) {
            return Err(ConvertError::Encoding("backend refused image".to_string()));
        }
        self.record(format!("add_image {:?}", compression));
        doc.images.push((doc.pages, *rect, compression));
        Ok(())
    }

    fn page_width(&self, doc: &RecordedDoc) -> f32 {
        doc.geometry.map(|g| g.width_mm).unwrap_or_default()
    }

    fn page_height(&self, doc: &RecordedDoc) -> f32 {
        doc.geometry.map(|g| g.height_mm).unwrap_or_default()
    }

    fn page_count(&self, doc: &RecordedDoc) -> usize {
        doc.pages
    }

    fn finalize(&self, doc: RecordedDoc, file_name: &str) -> Result<Vec<u8>> {
        self.record(format!("finalize {}", file_name));
        // One byte per image, holding the page it landed on
        Ok(doc.images.iter().map(|(page, _, _)| *page as u8).collect())
    }
}

// =============================================================================
// Converter with the recording backend
// =============================================================================

#[tokio::test]
async fn test_three_images_on_a4_portrait() {
    let converter = Converter::new(RecordingBackend::default());
    let images = vec![
        png_file("one.png", 40, 30),
        png_file("two.png", 30, 40),
        png_file("three.png", 10, 10),
    ];
    let settings = ConversionSettings::default();
    let mut progress = Vec::new();

    let result = converter
        .convert(&images, &settings, |p| progress.push(p))
        .await
        .unwrap();

    assert_eq!(result.page_count, 3);
    assert_eq!(progress, vec![34, 67, 100]);
    assert_file_name_pattern(&result.file_name, "images");
    // Each image on its own page, in order
    assert_eq!(result.bytes, vec![1, 2, 3]);

    let calls = converter.backend().calls();
    assert_eq!(calls[0], "create 210x297");
    assert_eq!(
        &calls[1..6],
        &[
            "add_image Balanced",
            "add_page",
            "add_image Balanced",
            "add_page",
            "add_image Balanced"
        ]
    );
    assert!(calls[6].starts_with("finalize images_"));
}

#[tokio::test]
async fn test_quality_selects_compression() {
    for (quality, expected) in [
        (Quality::Low, "add_image Fast"),
        (Quality::Medium, "add_image Balanced"),
        (Quality::High, "add_image Best"),
    ] {
        let converter = Converter::new(RecordingBackend::default());
        let settings = ConversionSettings {
            quality,
            ..Default::default()
        };

        converter
            .convert(&[png_file("q.png", 2, 2)], &settings, |_| {})
            .await
            .unwrap();

        assert_eq!(converter.backend().calls()[1], expected);
    }
}

#[tokio::test]
async fn test_landscape_geometry_reaches_backend() {
    let converter = Converter::new(RecordingBackend::default());
    let settings = ConversionSettings {
        orientation: Orientation::Landscape,
        paper_size: PaperSize::Legal,
        ..Default::default()
    };

    converter
        .convert(&[png_file("wide.png", 80, 20)], &settings, |_| {})
        .await
        .unwrap();

    let calls = converter.backend().calls();
    assert_eq!(calls[0], "create 356x216");
    assert_eq!(calls.len(), 3);
}

#[tokio::test]
async fn test_decode_failure_aborts_before_finalize() {
    let converter = Converter::new(RecordingBackend::default());
    let images = vec![
        png_file("good.png", 4, 4),
        broken_file("bad.png"),
        png_file("never.png", 4, 4),
    ];
    let mut progress = Vec::new();

    let err = converter
        .convert(&images, &ConversionSettings::default(), |p| progress.push(p))
        .await
        .unwrap_err();

    match err {
        ConvertError::Decode { name, .. } => assert_eq!(name, "bad.png"),
        other => panic!("Expected Decode error, got {:?}", other),
    }
    assert_eq!(progress, vec![34]);

    let calls = converter.backend().calls();
    assert!(!calls.iter().any(|c| c.starts_with("finalize")));
    assert_eq!(calls.iter().filter(|c| c.starts_with("add_image")).count(), 1);
}

#[tokio::test]
async fn test_encoding_failure_aborts_before_finalize() {
    let converter = Converter::new(RecordingBackend {
        fail_on_image: Some(1),
        ..Default::default()
    });
    let images = vec![png_file("a.png", 4, 4), png_file("b.png", 4, 4)];

    let err = converter
        .convert(&images, &ConversionSettings::default(), |_| {})
        .await
        .unwrap_err();

    assert!(matches!(err, ConvertError::Encoding(_)));
    assert!(
        !converter
            .backend()
            .calls()
            .iter()
            .any(|c| c.starts_with("finalize"))
    );
}

#[tokio::test]
async fn test_empty_input_never_reaches_backend() {
    let converter = Converter::new(RecordingBackend::default());

    let err = converter
        .convert(&[], &ConversionSettings::default(), |_| {})
        .await
        .unwrap_err();

    assert!(matches!(err, ConvertError::NoFiles));
    assert_eq!(err.to_string(), "No files to convert");
    assert!(converter.backend().calls().is_empty());
}

#[tokio::test]
async fn test_invalid_settings_never_reach_backend() {
    let converter = Converter::new(RecordingBackend::default());
    let settings = ConversionSettings {
        file_prefix: String::new(),
        ..Default::default()
    };

    let err = converter
        .convert(&[png_file("a.png", 2, 2)], &settings, |_| {})
        .await
        .unwrap_err();

    assert!(matches!(err, ConvertError::Config(_)));
    assert!(converter.backend().calls().is_empty());
}

#[tokio::test]
async fn test_runs_are_independent() {
    let converter = Converter::new(RecordingBackend::default());
    let settings = ConversionSettings::default();

    let first = converter
        .convert(&[png_file("a.png", 2, 2), png_file("b.png", 2, 2)], &settings, |_| {})
        .await
        .unwrap();
    let second = converter
        .convert(&[png_file("c.png", 2, 2)], &settings, |_| {})
        .await
        .unwrap();

    assert_eq!(first.page_count, 2);
    assert_eq!(second.page_count, 1);
}

#[test]
fn test_progress_is_monotonic_and_ends_at_100() {
    for total in 1..=300 {
        let values: Vec<u8> = (1..=total).map(|i| progress_percent(i, total)).collect();
        assert!(values.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(*values.last().unwrap(), 100);
    }
}

// =============================================================================
// End to end with lopdf
// =============================================================================

#[tokio::test]
async fn test_convert_files_writes_real_pdf() {
    let files = vec![
        png_file("a.png", 64, 48),
        ImageFile::from_bytes("skip.gif", "image/gif", png_bytes(8, 8)),
        png_file("b.png", 48, 64),
    ];
    let settings = ConversionSettings {
        file_prefix: "album".to_string(),
        quality: Quality::High,
        ..Default::default()
    };
    let mut progress = Vec::new();

    let result = convert_files(&files, &settings, &ValidationRules::default(), |p| {
        progress.push(p)
    })
    .await
    .unwrap();

    assert_eq!(result.page_count, 2);
    assert_eq!(progress, vec![50, 100]);
    assert_file_name_pattern(&result.file_name, "album");

    let doc = Document::load_mem(&result.bytes).unwrap();
    assert_eq!(doc.get_pages().len(), 2);

    let dir = tempfile::tempdir().unwrap();
    let path = save_result(&result, dir.path()).await.unwrap();
    assert_eq!(path.file_name().unwrap().to_str().unwrap(), result.file_name);
    assert_eq!(std::fs::read(&path).unwrap(), result.bytes);
}

#[tokio::test]
async fn test_convert_files_oversized_and_valid() {
    let mut big = png_file("big.png", 8, 8);
    big.size_bytes = 15 * 1024 * 1024;
    let files = vec![big, png_file("small.png", 8, 8)];

    let result = convert_files(
        &files,
        &ConversionSettings::default(),
        &ValidationRules::default(),
        |_| {},
    )
    .await
    .unwrap();

    assert_eq!(result.page_count, 1);
}

#[tokio::test]
async fn test_convert_files_nothing_valid() {
    let files = vec![ImageFile::from_bytes("a.gif", "image/gif", png_bytes(2, 2))];

    let err = convert_files(
        &files,
        &ConversionSettings::default(),
        &ValidationRules::default(),
        |_| {},
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ConvertError::NoValidFiles));

    let err = convert_files(
        &[],
        &ConversionSettings::default(),
        &ValidationRules::default(),
        |_| {},
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ConvertError::NoFiles));
}

#[tokio::test]
async fn test_transparent_png_gets_soft_mask() {
    let img = image::RgbaImage::from_fn(4, 4, |x, _| image::Rgba([255, 0, 0, (x * 60) as u8]));
    let mut out = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut out, image::ImageFormat::Png)
        .unwrap();
    let file = ImageFile::from_bytes("alpha.png", "image/png", out.into_inner());

    let decoded = load_image(&file).await.unwrap();
    assert_eq!(decoded.alpha.as_ref().map(|a| a.len()), Some(16));

    let result = Converter::new(LopdfBackend)
        .convert(&[file], &ConversionSettings::default(), |_| {})
        .await
        .unwrap();
    let doc = Document::load_mem(&result.bytes).unwrap();
    let has_smask = doc.objects.values().any(|obj| {
        obj.as_stream()
            .map(|s| s.dict.get(b"SMask").is_ok())
            .unwrap_or(false)
    });
    assert!(has_smask);
}

#[test]
fn test_opaque_rgba_has_no_alpha_plane() {
    let decoded = decode_image("opaque.png", &png_bytes(3, 2), None).unwrap();
    assert_eq!((decoded.width, decoded.height), (3, 2));
    assert_eq!(decoded.rgb.len(), 18);
    assert!(decoded.alpha.is_none());
}
