//! Document Merger: fold one or two uploads into a single archival PDF.
//!
//! Pure in-memory computation, safe to call concurrently; the merger never
//! learns student identity. PDF inputs contribute all their pages in
//! original order; raster inputs become exactly one page sized to the
//! image's native pixel dimensions. The merge is atomic: the output is
//! assembled fully before any bytes are returned, so a failure on the
//! second document never yields a partial result.

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Object, ObjectId, Stream, dictionary};

use crate::constants::{MAGIC_SNIFF_BYTES, MERGED_DOCUMENT_FILENAME, MERGED_DOCUMENT_MIME};
use crate::error::{Result, VerifyError};
use crate::types::{Document, MergedDocument};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DocFormat {
    Pdf,
    Raster,
}

/// Decide how to treat an input: declared MIME type first, magic-byte sniff
/// as the fallback for missing or vague types.
fn detect_format(doc: &Document) -> Result<DocFormat> {
    let mime = doc.mime_type.trim().to_ascii_lowercase();
    if mime == "application/pdf" || mime == "pdf" {
        return Ok(DocFormat::Pdf);
    }
    if mime.starts_with("image/") {
        return Ok(DocFormat::Raster);
    }

    let head = &doc.bytes[..doc.bytes.len().min(MAGIC_SNIFF_BYTES)];
    if head.starts_with(b"%PDF-") {
        return Ok(DocFormat::Pdf);
    }
    let png = head.starts_with(&[0x89, b'P', b'N', b'G']);
    let jpeg = head.starts_with(&[0xFF, 0xD8, 0xFF]);
    let webp = head.len() >= 12 && &head[..4] == b"RIFF" && &head[8..12] == b"WEBP";
    if png || jpeg || webp {
        return Ok(DocFormat::Raster);
    }

    Err(VerifyError::UnsupportedFormat {
        detail: if mime.is_empty() {
            format!("unrecognized content in {}", doc.filename)
        } else {
            mime
        },
    })
}

/// Merge `primary` then (if present) `secondary` into one PDF container.
///
/// Page order is deterministic: every page of `primary` precedes every page
/// of `secondary`. Fails with [`VerifyError::NoDocument`] when `primary` is
/// absent, even if `secondary` was supplied.
pub fn merge(
    primary: Option<&Document>,
    secondary: Option<&Document>,
) -> Result<MergedDocument> {
    let primary = primary.ok_or(VerifyError::NoDocument)?;

    let mut out = lopdf::Document::with_version("1.5");
    let pages_id = out.new_object_id();
    let mut kids: Vec<ObjectId> = Vec::new();

    append_input(&mut out, pages_id, &mut kids, primary)?;
    if let Some(doc) = secondary {
        append_input(&mut out, pages_id, &mut kids, doc)?;
    }

    out.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids.iter().map(|id| Object::Reference(*id)).collect::<Vec<Object>>(),
            "Count" => kids.len() as i64,
        }),
    );
    let catalog_id = out.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    out.trailer.set("Root", catalog_id);
    out.renumber_objects();

    let mut bytes = Vec::new();
    out.save_to(&mut bytes)?;

    Ok(MergedDocument {
        bytes,
        mime_type: MERGED_DOCUMENT_MIME.to_string(),
        filename: MERGED_DOCUMENT_FILENAME.to_string(),
    })
}

fn append_input(
    out: &mut lopdf::Document,
    pages_id: ObjectId,
    kids: &mut Vec<ObjectId>,
    doc: &Document,
) -> Result<()> {
    match detect_format(doc)? {
        DocFormat::Pdf => append_pdf_pages(out, pages_id, kids, &doc.bytes),
        DocFormat::Raster => append_image_page(out, pages_id, kids, &doc.bytes),
    }
}

/// Page attributes a page may inherit from its ancestors in the source page
/// tree. The source tree is dropped during import, so these are resolved and
/// pulled down onto each page first.
const INHERITABLE_PAGE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

fn append_pdf_pages(
    out: &mut lopdf::Document,
    pages_id: ObjectId,
    kids: &mut Vec<ObjectId>,
    bytes: &[u8],
) -> Result<()> {
    let mut src = lopdf::Document::load_mem(bytes)?;
    src.renumber_objects_with(out.max_id + 1);
    out.max_id = src.max_id;

    // get_pages is keyed by 1-based page number, so iteration preserves the
    // source page order.
    let pages = src.get_pages();

    let mut pulled_down: Vec<(ObjectId, Vec<(Vec<u8>, Object)>)> = Vec::new();
    for page_id in pages.values() {
        let mut attrs = Vec::new();
        for key in INHERITABLE_PAGE_KEYS {
            if let Some(value) = inherited_page_attr(&src, *page_id, key) {
                attrs.push((key.to_vec(), value));
            }
        }
        pulled_down.push((*page_id, attrs));
    }

    // Import everything except the source catalog and page-tree nodes; the
    // pages are re-parented under the output tree.
    for (id, object) in std::mem::take(&mut src.objects) {
        let tree_node = matches!(dict_type(&object), Some(b"Catalog" | b"Pages"));
        if !tree_node {
            out.objects.insert(id, object);
        }
    }

    for (page_id, attrs) in pulled_down {
        let page = out
            .objects
            .get_mut(&page_id)
            .and_then(|obj| match obj {
                Object::Dictionary(dict) => Some(dict),
                _ => None,
            })
            .ok_or_else(|| VerifyError::UnsupportedFormat {
                detail: "pdf page object missing after import".to_string(),
            })?;
        page.set("Parent", Object::Reference(pages_id));
        for (key, value) in attrs {
            if !page.has(&key) {
                page.set(key, value);
            }
        }
        kids.push(page_id);
    }
    Ok(())
}

/// Resolve a possibly-inherited page attribute by walking the Parent chain.
fn inherited_page_attr(doc: &lopdf::Document, page: ObjectId, key: &[u8]) -> Option<Object> {
    let mut current = page;
    loop {
        let dict: &Dictionary = doc.get_object(current).ok()?.as_dict().ok()?;
        if let Ok(value) = dict.get(key) {
            return Some(value.clone());
        }
        match dict.get(b"Parent") {
            Ok(Object::Reference(parent)) => current = *parent,
            _ => return None,
        }
    }
}

fn dict_type(object: &Object) -> Option<&[u8]> {
    object.as_dict().ok()?.get(b"Type").ok()?.as_name().ok()
}

/// One output page per raster input: MediaBox equals the image's pixel
/// dimensions and the image is drawn over the full page bounds, so there is
/// no scaling distortion.
fn append_image_page(
    out: &mut lopdf::Document,
    pages_id: ObjectId,
    kids: &mut Vec<ObjectId>,
    bytes: &[u8],
) -> Result<()> {
    let img = image::load_from_memory(bytes)?;
    let width = img.width() as i64;
    let height = img.height() as i64;
    let rgb = img.to_rgb8().into_raw();

    let xobject_id = out.add_object(Object::Stream(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width,
            "Height" => height,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
        },
        rgb,
    )));

    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    Object::Integer(width),
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(height),
                    Object::Integer(0),
                    Object::Integer(0),
                ],
            ),
            Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let content_id = out.add_object(Object::Stream(Stream::new(
        dictionary! {},
        content.encode()?,
    )));

    let page_id = out.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(width),
            Object::Integer(height),
        ],
        "Contents" => content_id,
        "Resources" => dictionary! {
            "XObject" => dictionary! { "Im0" => xobject_id },
        },
    });
    kids.push(page_id);
    Ok(())
}
