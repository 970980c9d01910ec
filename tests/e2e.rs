//! End-to-end tests for img2pdf.
//!
//! Every test builds synthetic JPEG/PNG fixtures in memory, runs the real
//! pipeline, and parses the produced bytes back with lopdf to assert on the
//! actual document structure: page count and order, media boxes, placement
//! rectangles, index stamps. No external services and no fixture files.

use img2pdf::pipeline::geometry;
use img2pdf::{
    ConversionOutput, ConvertError, ImageInput, Limits, Margin, Orientation, PageSize, PdfOptions,
    Router,
};
use image::{Rgb, RgbImage};
use lopdf::{Document, Object, ObjectId};
use std::io::Cursor;

// ── Test helpers ─────────────────────────────────────────────────────────────

fn encoded_input(name: &str, width: u32, height: u32, format: image::ImageFormat) -> ImageInput {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), format).unwrap();
    let mime = match format {
        image::ImageFormat::Png => "image/png",
        _ => "image/jpeg",
    };
    ImageInput::new(name, mime, bytes)
}

fn jpeg_input(name: &str, width: u32, height: u32) -> ImageInput {
    encoded_input(name, width, height, image::ImageFormat::Jpeg)
}

fn png_input(name: &str, width: u32, height: u32) -> ImageInput {
    encoded_input(name, width, height, image::ImageFormat::Png)
}

async fn convert(images: Vec<ImageInput>, options: PdfOptions) -> ConversionOutput {
    img2pdf::assemble(images, options).await.expect("conversion should succeed")
}

fn load(output: &ConversionOutput) -> Document {
    Document::load_mem(&output.bytes).expect("produced bytes should parse as a PDF")
}

/// Page object ids in page order.
fn pages(doc: &Document) -> Vec<ObjectId> {
    doc.get_pages().into_values().collect()
}

fn media_box(doc: &Document, page_id: ObjectId) -> (f32, f32) {
    let page = doc.get_dictionary(page_id).unwrap();
    let mb = page.get(b"MediaBox").unwrap().as_array().unwrap();
    let num = |o: &Object| match o {
        Object::Integer(i) => *i as f32,
        Object::Real(r) => *r,
        other => panic!("unexpected MediaBox entry: {other:?}"),
    };
    (num(&mb[2]), num(&mb[3]))
}

fn content(doc: &Document, page_id: ObjectId) -> String {
    let page = doc.get_dictionary(page_id).unwrap();
    let Object::Reference(id) = page.get(b"Contents").unwrap() else {
        panic!("Contents should be a single stream reference");
    };
    let stream = doc.get_object(*id).unwrap().as_stream().unwrap();
    let bytes = stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone());
    String::from_utf8(bytes).unwrap()
}

/// Placement rectangle drawn on the page, parsed from the `cm` operator:
/// `q w 0 0 h x y cm /Im0 Do Q`.
fn drawn_rect(doc: &Document, page_id: ObjectId) -> (f32, f32, f32, f32) {
    let content = content(doc, page_id);
    let tokens: Vec<&str> = content.split_whitespace().collect();
    assert_eq!(tokens[0], "q");
    assert_eq!(tokens[7], "cm");
    let parse = |s: &str| s.parse::<f32>().unwrap();
    (
        parse(tokens[5]),
        parse(tokens[6]),
        parse(tokens[1]),
        parse(tokens[4]),
    )
}

/// Pixel width of the embedded image XObject.
fn embedded_width(doc: &Document, page_id: ObjectId) -> i64 {
    let page = doc.get_dictionary(page_id).unwrap();
    let resources = page.get(b"Resources").unwrap().as_dict().unwrap();
    let xobjects = resources.get(b"XObject").unwrap().as_dict().unwrap();
    let Object::Reference(im0) = xobjects.get(b"Im0").unwrap() else {
        panic!("Im0 should be a reference");
    };
    let stream = doc.get_object(*im0).unwrap().as_stream().unwrap();
    stream.dict.get(b"Width").unwrap().as_i64().unwrap()
}

fn options(size: PageSize, orientation: Orientation, margin: Margin) -> PdfOptions {
    PdfOptions::builder()
        .page_size(size)
        .orientation(orientation)
        .margin(margin)
        .build()
}

// ── Single-image scenarios ───────────────────────────────────────────────────

#[tokio::test]
async fn single_square_jpeg_on_a4_portrait() {
    // The reference scenario: 1000x1000 px, A4 portrait, 5 mm margins,
    // quality 85, max DPI 200.
    let output = convert(vec![jpeg_input("square.jpg", 1000, 1000)], PdfOptions::default()).await;

    assert_eq!(output.byte_len, output.bytes.len());
    let doc = load(&output);
    let pages = pages(&doc);
    assert_eq!(pages.len(), 1);

    let (w, h) = media_box(&doc, pages[0]);
    assert!((w - 595.0).abs() < 0.01);
    assert!((h - 842.0).abs() < 0.01);

    // Centred within the 566.66 x 813.66 pt available area.
    let (x, y, dw, dh) = drawn_rect(&doc, pages[0]);
    assert!((dw - 566.66).abs() < 0.05, "drawn width {dw}");
    assert!((dh - 566.66).abs() < 0.05, "drawn height {dh}");
    assert!((x - 14.17).abs() < 0.05, "x {x}");
    assert!((y - (14.17 + (813.66 - 566.66) / 2.0)).abs() < 0.05, "y {y}");

    // Stored resolution follows the placement at 200 DPI, not the source.
    let (_, placement) = geometry::resolve(&PdfOptions::default(), 1000, 1000).unwrap();
    let expected_px = ((placement.width / 72.0) * 200.0).round() as i64;
    assert_eq!(embedded_width(&doc, pages[0]), expected_px);

    // Single-image documents carry no index stamp.
    assert!(!content(&doc, pages[0]).contains("Tj"));
}

#[tokio::test]
async fn letter_page_dimensions() {
    let output = convert(
        vec![jpeg_input("a.jpg", 800, 600)],
        options(PageSize::Letter, Orientation::Portrait, Margin::Mm0),
    )
    .await;

    let doc = load(&output);
    let (w, h) = media_box(&doc, pages(&doc)[0]);
    assert!((w - 612.0).abs() < 0.01);
    assert!((h - 792.0).abs() < 0.01);
}

#[tokio::test]
async fn fit_mode_composes_on_the_a4_canvas() {
    // Fit keeps the fixed A4 portrait canvas even when landscape is asked
    // for; images still scale to fit within the margins.
    let output = convert(
        vec![jpeg_input("a.jpg", 400, 300)],
        options(PageSize::Fit, Orientation::Landscape, Margin::Mm10),
    )
    .await;

    let doc = load(&output);
    let (w, h) = media_box(&doc, pages(&doc)[0]);
    assert!((w - 595.0).abs() < 0.01);
    assert!((h - 842.0).abs() < 0.01);
}

#[tokio::test]
async fn png_inputs_are_recompressed_to_jpeg() {
    let output = convert(vec![png_input("chart.png", 640, 480)], PdfOptions::default()).await;

    let doc = load(&output);
    let page = pages(&doc)[0];
    let dict = doc.get_dictionary(page).unwrap();
    let resources = dict.get(b"Resources").unwrap().as_dict().unwrap();
    let xobjects = resources.get(b"XObject").unwrap().as_dict().unwrap();
    let Object::Reference(im0) = xobjects.get(b"Im0").unwrap() else {
        panic!("Im0 should be a reference");
    };
    let stream = doc.get_object(*im0).unwrap().as_stream().unwrap();
    assert_eq!(
        stream.dict.get(b"Filter").unwrap().as_name().unwrap(),
        &b"DCTDecode"[..]
    );
    assert_eq!(&stream.content[..2], &[0xFF, 0xD8][..]);
}

// ── Multi-image scenarios ────────────────────────────────────────────────────

#[tokio::test]
async fn three_landscape_pages_in_input_order() {
    let inputs = vec![
        jpeg_input("first.jpg", 400, 400),
        jpeg_input("second.jpg", 800, 400),
        jpeg_input("third.jpg", 400, 800),
    ];
    let o = options(PageSize::A4, Orientation::Landscape, Margin::Mm5);

    // Expected stored widths differ per image, which pins page order.
    let expected_px: Vec<i64> = [(400u32, 400u32), (800, 400), (400, 800)]
        .iter()
        .map(|&(w, h)| {
            let (_, p) = geometry::resolve(&o, w, h).unwrap();
            ((p.width / 72.0) * o.max_dpi as f32).round() as i64
        })
        .collect();

    let output = convert(inputs, o).await;
    let doc = load(&output);
    let pages = pages(&doc);
    assert_eq!(pages.len(), 3);

    for (i, page_id) in pages.iter().enumerate() {
        let (w, h) = media_box(&doc, *page_id);
        assert!((w - 842.0).abs() < 0.01, "page {} width {w}", i + 1);
        assert!((h - 595.0).abs() < 0.01, "page {} height {h}", i + 1);

        let text = content(&doc, *page_id);
        assert!(
            text.contains(&format!("({}) Tj", i + 1)),
            "page {} should be stamped with its index, got: {text}",
            i + 1
        );
        assert_eq!(embedded_width(&doc, *page_id), expected_px[i]);
    }
}

#[tokio::test]
async fn placement_respects_every_margin_preset() {
    for margin in [Margin::Mm0, Margin::Mm5, Margin::Mm10, Margin::Mm20] {
        let o = options(PageSize::A4, Orientation::Portrait, margin);
        let output = convert(vec![jpeg_input("wide.jpg", 3000, 1000)], o).await;

        let doc = load(&output);
        let page = pages(&doc)[0];
        let (page_w, page_h) = media_box(&doc, page);
        let (x, y, w, h) = drawn_rect(&doc, page);
        let m = margin.to_pt();
        let eps = 0.05;

        assert!(x >= m - eps, "margin {m}: x {x}");
        assert!(y >= m - eps, "margin {m}: y {y}");
        assert!(x + w <= page_w - m + eps, "margin {m}: right edge");
        assert!(y + h <= page_h - m + eps, "margin {m}: top edge");
    }
}

#[tokio::test]
async fn layout_is_idempotent_across_runs() {
    let o = options(PageSize::A4, Orientation::Portrait, Margin::Mm10);
    let inputs = || vec![jpeg_input("a.jpg", 900, 700), jpeg_input("b.jpg", 300, 500)];

    let first = convert(inputs(), o).await;
    let second = convert(inputs(), o).await;

    let doc_a = load(&first);
    let doc_b = load(&second);
    let pages_a = pages(&doc_a);
    let pages_b = pages(&doc_b);
    assert_eq!(pages_a.len(), pages_b.len());

    for (a, b) in pages_a.iter().zip(&pages_b) {
        assert_eq!(media_box(&doc_a, *a), media_box(&doc_b, *b));
        assert_eq!(drawn_rect(&doc_a, *a), drawn_rect(&doc_b, *b));
    }
}

// ── Failure paths ────────────────────────────────────────────────────────────

#[tokio::test]
async fn corrupt_payload_fails_the_whole_document() {
    let inputs = vec![
        jpeg_input("good-1.jpg", 100, 100),
        ImageInput::new("corrupt.jpg", "image/jpeg", vec![0xBA, 0xAD, 0xF0, 0x0D]),
        jpeg_input("good-2.jpg", 100, 100),
    ];

    let err = img2pdf::assemble(inputs, PdfOptions::default())
        .await
        .unwrap_err();

    match err {
        ConvertError::ImageDecode { name, .. } => assert_eq!(name, "corrupt.jpg"),
        other => panic!("expected ImageDecode, got {other:?}"),
    }
}

// ── Routing ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn payload_at_the_local_threshold_converts_locally() {
    let images = vec![jpeg_input("a.jpg", 64, 64)];
    let total: u64 = images.iter().map(|i| i.bytes.len() as u64).sum();

    let limits = Limits {
        max_local_bytes: total,
        ..Limits::default()
    };
    let output = Router::new(limits)
        .convert(images, PdfOptions::default())
        .await
        .expect("at-threshold payload should convert locally");
    assert!(output.byte_len > 0);
}

#[tokio::test]
async fn payload_over_the_threshold_without_remote_is_rejected() {
    let images = vec![jpeg_input("a.jpg", 64, 64)];
    let total: u64 = images.iter().map(|i| i.bytes.len() as u64).sum();

    let limits = Limits {
        max_local_bytes: total - 1,
        ..Limits::default()
    };
    let err = Router::new(limits)
        .convert(images, PdfOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ConvertError::RemoteDisabled { .. }));
}

#[tokio::test]
async fn router_enforces_per_image_and_count_ceilings() {
    let limits = Limits {
        max_image_bytes: 4,
        ..Limits::default()
    };
    let err = Router::new(limits)
        .convert(
            vec![ImageInput::new("big.jpg", "image/jpeg", vec![0u8; 5])],
            PdfOptions::default(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ConvertError::ImageTooLarge { .. }));

    let limits = Limits {
        max_images: 1,
        ..Limits::default()
    };
    let err = Router::new(limits)
        .convert(
            vec![jpeg_input("a.jpg", 8, 8), jpeg_input("b.jpg", 8, 8)],
            PdfOptions::default(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ConvertError::TooManyImages { .. }));
}

#[tokio::test]
async fn unsupported_type_is_rejected_before_processing() {
    let err = Router::new(Limits::default())
        .convert(
            vec![ImageInput::new("anim.gif", "image/gif", vec![0u8; 10])],
            PdfOptions::default(),
        )
        .await
        .unwrap_err();
    match err {
        ConvertError::UnsupportedType { name, mime } => {
            assert_eq!(name, "anim.gif");
            assert_eq!(mime, "image/gif");
        }
        other => panic!("expected UnsupportedType, got {other:?}"),
    }
}

// ── Output metadata ──────────────────────────────────────────────────────────

#[tokio::test]
async fn output_filename_and_headers_are_consistent() {
    let output = convert(vec![jpeg_input("a.jpg", 50, 50)], PdfOptions::default()).await;

    assert!(output.file_name.starts_with("converted-images-"));
    assert!(output.file_name.ends_with(".pdf"));
    assert_eq!(
        output.content_disposition(),
        format!("attachment; filename=\"{}\"", output.file_name)
    );
    assert_eq!(output.byte_len, output.bytes.len());
    assert!(output.bytes.starts_with(b"%PDF-"));
}
