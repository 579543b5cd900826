//! Integration tests for the document merger: page ordering, image pages,
//! inherited attributes, and atomicity.

use lopdf::{Object, ObjectId, Stream, dictionary};

use meis_verify::{Document, VerifyError, merge};

/// Build a PDF whose pages are identifiable by MediaBox width.
fn pdf_with_widths(widths: &[i64]) -> Vec<u8> {
    let mut doc = lopdf::Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let mut kids: Vec<Object> = Vec::new();
    for width in widths {
        let content_id = doc.add_object(Object::Stream(Stream::new(
            dictionary! {},
            b"q Q".to_vec(),
        )));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(*width),
                Object::Integer(842),
            ],
            "Resources" => dictionary! {},
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => widths.len() as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
    doc.trailer.set("Root", catalog_id);
    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

/// Like `pdf_with_widths`, but MediaBox lives on the Pages node so every
/// page inherits it.
fn pdf_with_inherited_media_box(pages: usize, width: i64) -> Vec<u8> {
    let mut doc = lopdf::Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let mut kids: Vec<Object> = Vec::new();
    for _ in 0..pages {
        let content_id = doc.add_object(Object::Stream(Stream::new(
            dictionary! {},
            b"q Q".to_vec(),
        )));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Resources" => dictionary! {},
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(width),
                Object::Integer(842),
            ],
        }),
    );
    let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
    doc.trailer.set("Root", catalog_id);
    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([30, 60, 90]));
    let mut out = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut out, image::ImageFormat::Png)
        .unwrap();
    out.into_inner()
}

fn pdf_doc(bytes: Vec<u8>) -> Document {
    Document::new(bytes, "application/pdf", "scan.pdf")
}

fn png_doc(bytes: Vec<u8>) -> Document {
    Document::new(bytes, "image/png", "scan.png")
}

/// MediaBox widths of the merged output, in page order.
fn page_widths(bytes: &[u8]) -> Vec<i64> {
    let doc = lopdf::Document::load_mem(bytes).unwrap();
    let pages = doc.get_pages();
    pages
        .values()
        .map(|id: &ObjectId| {
            let dict = doc.get_object(*id).unwrap().as_dict().unwrap();
            let media_box = dict.get(b"MediaBox").unwrap().as_array().unwrap();
            media_box[2].as_i64().unwrap()
        })
        .collect()
}

#[test]
fn single_pdf_passes_through_with_all_pages() {
    let merged = merge(Some(&pdf_doc(pdf_with_widths(&[100, 101, 102]))), None).unwrap();
    assert_eq!(merged.mime_type, "application/pdf");
    assert_eq!(page_widths(&merged.bytes), vec![100, 101, 102]);
}

#[test]
fn pdf_then_image_keeps_submission_order() {
    let merged = merge(
        Some(&pdf_doc(pdf_with_widths(&[100, 101]))),
        Some(&png_doc(png_bytes(40, 60))),
    )
    .unwrap();
    // The image page's MediaBox equals its native pixel dimensions.
    assert_eq!(page_widths(&merged.bytes), vec![100, 101, 40]);
}

#[test]
fn image_then_pdf_keeps_submission_order() {
    let merged = merge(
        Some(&png_doc(png_bytes(40, 60))),
        Some(&pdf_doc(pdf_with_widths(&[100]))),
    )
    .unwrap();
    assert_eq!(page_widths(&merged.bytes), vec![40, 100]);
}

#[test]
fn two_images_make_two_pages() {
    let merged = merge(
        Some(&png_doc(png_bytes(40, 60))),
        Some(&png_doc(png_bytes(80, 20))),
    )
    .unwrap();
    assert_eq!(page_widths(&merged.bytes), vec![40, 80]);
}

#[test]
fn single_image_yields_exactly_one_page() {
    let merged = merge(Some(&png_doc(png_bytes(33, 44))), None).unwrap();
    assert_eq!(page_widths(&merged.bytes), vec![33]);
}

#[test]
fn inherited_media_box_is_pulled_down_onto_pages() {
    let merged = merge(
        Some(&pdf_doc(pdf_with_inherited_media_box(2, 595))),
        None,
    )
    .unwrap();
    assert_eq!(page_widths(&merged.bytes), vec![595, 595]);
}

#[test]
fn unsupported_second_document_fails_whole_merge() {
    let err = merge(
        Some(&pdf_doc(pdf_with_widths(&[100]))),
        Some(&Document::new(
            b"not a document".to_vec(),
            "text/plain",
            "notes.txt",
        )),
    )
    .unwrap_err();
    assert!(matches!(err, VerifyError::UnsupportedFormat { .. }));
}

#[test]
fn missing_first_document_is_required() {
    assert!(matches!(merge(None, None), Err(VerifyError::NoDocument)));
}

#[test]
fn merge_page_order_is_deterministic() {
    let a = pdf_doc(pdf_with_widths(&[100, 101]));
    let b = png_doc(png_bytes(50, 50));
    let first = merge(Some(&a), Some(&b)).unwrap();
    let second = merge(Some(&a), Some(&b)).unwrap();
    assert_eq!(page_widths(&first.bytes), page_widths(&second.bytes));
}
