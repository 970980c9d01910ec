//! Page composition: one lopdf page per image.
//!
//! For each image this stage resolves the placement geometry, obtains the
//! normalised raster, and appends a page object to the document: a media box
//! sized from the geometry, an image XObject holding the JPEG bytes, and a
//! content stream that draws the XObject at the placement rectangle.
//!
//! The JPEG produced by the normaliser is embedded as-is under the
//! `DCTDecode` filter. The stream must not be Flate-compressed on top, so
//! compression is disabled on the image stream object.

use crate::config::PdfOptions;
use crate::error::ConvertError;
use crate::input::ImageInput;
use crate::pipeline::{geometry, raster};
use image::GenericImageView;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use tracing::debug;

const STAMP_FONT_SIZE: f32 = 10.0;
const STAMP_X_INSET: f32 = 20.0;
const STAMP_Y_DROP: f32 = 10.0;

/// Register the Helvetica Type1 font used for page-index stamps.
///
/// Added once per document by the assembler; pages reference it as `/F1`.
pub fn add_helvetica(doc: &mut Document) -> ObjectId {
    let mut font_dict = Dictionary::new();
    font_dict.set("Type", Object::Name(b"Font".to_vec()));
    font_dict.set("Subtype", Object::Name(b"Type1".to_vec()));
    font_dict.set("BaseFont", Object::Name(b"Helvetica".to_vec()));
    doc.add_object(font_dict)
}

/// Compose one page for `image` and add it to `doc` under `parent`.
///
/// `index` is 0-based; the stamp prints `index + 1`. When `total == 1` no
/// stamp is drawn at all.
///
/// Returns the object id of the new page; the caller owns page ordering via
/// the Kids array.
pub fn compose_page(
    doc: &mut Document,
    parent: ObjectId,
    font: ObjectId,
    image: &ImageInput,
    options: &PdfOptions,
    index: usize,
    total: usize,
) -> Result<ObjectId, ConvertError> {
    let decoded = raster::decode(image)?;
    let (px_width, px_height) = decoded.dimensions();
    let (geometry, placement) = geometry::resolve(options, px_width, px_height)?;
    let normalized = raster::normalize(
        &image.name,
        &decoded,
        &placement,
        options.quality,
        options.max_dpi,
    )?;

    // Image XObject: JPEG pass-through via DCTDecode.
    let mut xobject_dict = Dictionary::new();
    xobject_dict.set("Type", Object::Name(b"XObject".to_vec()));
    xobject_dict.set("Subtype", Object::Name(b"Image".to_vec()));
    xobject_dict.set("Width", Object::Integer(normalized.px_width as i64));
    xobject_dict.set("Height", Object::Integer(normalized.px_height as i64));
    xobject_dict.set("ColorSpace", Object::Name(b"DeviceRGB".to_vec()));
    xobject_dict.set("BitsPerComponent", Object::Integer(8));
    xobject_dict.set("Filter", Object::Name(b"DCTDecode".to_vec()));
    let xobject_id = doc.add_object(Stream::new(xobject_dict, normalized.jpeg).with_compression(false));

    let mut content = format!(
        "q {} 0 0 {} {} {} cm /Im0 Do Q\n",
        placement.width, placement.height, placement.x, placement.y
    );

    let mut fonts = Dictionary::new();
    if total > 1 {
        let text_x = geometry.page_width - geometry.margin - STAMP_X_INSET;
        let text_y = geometry.margin - STAMP_Y_DROP;
        content.push_str(&format!(
            "BT /F1 {} Tf 0.5 0.5 0.5 rg {} {} Td ({}) Tj ET\n",
            STAMP_FONT_SIZE,
            text_x,
            text_y,
            index + 1
        ));
        fonts.set("F1", Object::Reference(font));
    }

    let content_id = doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));

    let mut xobjects = Dictionary::new();
    xobjects.set("Im0", Object::Reference(xobject_id));
    let mut resources = Dictionary::new();
    resources.set("XObject", Object::Dictionary(xobjects));
    if !fonts.is_empty() {
        resources.set("Font", Object::Dictionary(fonts));
    }

    let mut page_dict = Dictionary::new();
    page_dict.set("Type", Object::Name(b"Page".to_vec()));
    page_dict.set("Parent", Object::Reference(parent));
    page_dict.set(
        "MediaBox",
        Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(geometry.page_width),
            Object::Real(geometry.page_height),
        ]),
    );
    page_dict.set("Contents", Object::Reference(content_id));
    page_dict.set("Resources", Object::Dictionary(resources));

    let page_id = doc.add_object(page_dict);
    debug!(
        name = %image.name,
        page = index + 1,
        total,
        width = geometry.page_width,
        height = geometry.page_height,
        "Composed page"
    );

    Ok(page_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PdfOptions;
    use image::{Rgb, RgbImage};
    use std::io::Cursor;

    fn jpeg_input(name: &str, width: u32, height: u32) -> ImageInput {
        let img = RgbImage::from_pixel(width, height, Rgb([200, 60, 60]));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Jpeg)
            .unwrap();
        ImageInput::new(name, "image/jpeg", bytes)
    }

    fn page_content(doc: &Document, page_id: ObjectId) -> String {
        let page = doc.get_dictionary(page_id).unwrap();
        let Object::Reference(content_id) = page.get(b"Contents").unwrap() else {
            panic!("Contents is not a reference");
        };
        let stream = doc.get_object(*content_id).unwrap().as_stream().unwrap();
        String::from_utf8(stream.content.clone()).unwrap()
    }

    #[test]
    fn single_page_has_no_stamp() {
        let mut doc = Document::with_version("1.5");
        let parent = doc.new_object_id();
        let font = add_helvetica(&mut doc);
        let input = jpeg_input("only.jpg", 100, 100);

        let page_id =
            compose_page(&mut doc, parent, font, &input, &PdfOptions::default(), 0, 1).unwrap();

        let content = page_content(&doc, page_id);
        assert!(content.contains("/Im0 Do"));
        assert!(!content.contains("Tj"), "got: {content}");
    }

    #[test]
    fn multi_page_stamps_one_based_index() {
        let mut doc = Document::with_version("1.5");
        let parent = doc.new_object_id();
        let font = add_helvetica(&mut doc);
        let input = jpeg_input("third.jpg", 100, 100);

        let page_id =
            compose_page(&mut doc, parent, font, &input, &PdfOptions::default(), 2, 3).unwrap();

        let content = page_content(&doc, page_id);
        assert!(content.contains("(3) Tj"), "got: {content}");
        assert!(content.contains("0.5 0.5 0.5 rg"));
    }

    #[test]
    fn image_stream_is_uncompressed_dct() {
        let mut doc = Document::with_version("1.5");
        let parent = doc.new_object_id();
        let font = add_helvetica(&mut doc);
        let input = jpeg_input("a.jpg", 64, 64);

        let page_id =
            compose_page(&mut doc, parent, font, &input, &PdfOptions::default(), 0, 1).unwrap();

        let page = doc.get_dictionary(page_id).unwrap();
        let resources = page.get(b"Resources").unwrap().as_dict().unwrap();
        let xobjects = resources.get(b"XObject").unwrap().as_dict().unwrap();
        let Object::Reference(im0) = xobjects.get(b"Im0").unwrap() else {
            panic!("Im0 is not a reference");
        };
        let stream = doc.get_object(*im0).unwrap().as_stream().unwrap();
        assert!(!stream.allows_compression);
        assert_eq!(
            stream.dict.get(b"Filter").unwrap().as_name().unwrap(),
            &b"DCTDecode"[..]
        );
        // SOI marker: the JPEG went in verbatim.
        assert_eq!(&stream.content[..2], &[0xFF, 0xD8][..]);
    }
}
