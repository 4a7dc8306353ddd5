//! PDF assembly checked by parsing the output back with lopdf

mod common;

use imgtools::{images_to_pdf, ImgToolsError, PdfAssembler, UploadedImage};
use lopdf::{Document, Object};

fn media_boxes(pdf: &[u8]) -> Vec<(i64, i64)> {
    let doc = Document::load_mem(pdf).expect("output must parse as PDF");
    doc.get_pages()
        .values()
        .map(|&page_id| {
            let page = doc.get_object(page_id).unwrap().as_dict().unwrap();
            let media_box = page.get(b"MediaBox").unwrap().as_array().unwrap();
            let value = |o: &Object| o.as_i64().unwrap();
            assert_eq!(value(&media_box[0]), 0);
            assert_eq!(value(&media_box[1]), 0);
            (value(&media_box[2]), value(&media_box[3]))
        })
        .collect()
}

#[test]
fn test_one_page_per_image_in_order() {
    let pdf = images_to_pdf(&[
        UploadedImage::new(common::solid_png(100, 200, [255, 0, 0, 255])).with_file_name("a.png"),
        UploadedImage::new(common::jpeg(50, 50)).with_file_name("b.jpg"),
        UploadedImage::new(common::solid_png(640, 480, [0, 0, 0, 0])).with_file_name("c.png"),
    ])
    .unwrap();

    assert!(pdf.starts_with(b"%PDF-"));
    assert_eq!(media_boxes(&pdf), vec![(100, 200), (50, 50), (640, 480)]);
}

#[test]
fn test_page_content_draws_image_full_bleed() {
    let pdf = images_to_pdf(&[UploadedImage::new(common::solid_png(30, 20, [1, 2, 3, 255]))]).unwrap();
    let doc = Document::load_mem(&pdf).unwrap();
    let page_id = *doc.get_pages().values().next().unwrap();

    let content = doc.get_and_decode_page_content(page_id).unwrap();
    let cm = content
        .operations
        .iter()
        .find(|op| op.operator == "cm")
        .expect("page must set a transform");
    let operands: Vec<i64> = cm.operands.iter().map(|o| o.as_i64().unwrap()).collect();
    assert_eq!(operands, vec![30, 0, 0, 20, 0, 0]);
    assert!(content.operations.iter().any(|op| op.operator == "Do"));
}

#[test]
fn test_alpha_is_carried_as_soft_mask() {
    let translucent = common::solid_png(8, 8, [10, 20, 30, 128]);
    let opaque = common::solid_png(8, 8, [10, 20, 30, 255]);
    let pdf = images_to_pdf(&[UploadedImage::new(translucent), UploadedImage::new(opaque)]).unwrap();
    let doc = Document::load_mem(&pdf).unwrap();

    let smasks: Vec<bool> = doc
        .get_pages()
        .values()
        .map(|&page_id| {
            let page = doc.get_dictionary(page_id).unwrap();
            let resources = page.get(b"Resources").unwrap().as_dict().unwrap();
            let xobjects = resources.get(b"XObject").unwrap().as_dict().unwrap();
            let image_id = xobjects.get(b"Im0").unwrap().as_reference().unwrap();
            let stream = doc.get_object(image_id).unwrap().as_stream().unwrap();
            stream.dict.has(b"SMask")
        })
        .collect();
    assert_eq!(smasks, vec![true, false]);
}

#[test]
fn test_empty_input_yields_zero_pages() {
    let pdf = PdfAssembler::new().assemble(&[]).unwrap();
    let doc = Document::load_mem(&pdf).unwrap();
    assert!(doc.get_pages().is_empty());
}

#[test]
fn test_unreadable_image_fails_whole_document() {
    let err = images_to_pdf(&[
        UploadedImage::new(common::solid_png(4, 4, [0, 0, 0, 255])),
        UploadedImage::new(common::solid_png(4, 4, [0, 0, 0, 255])),
        UploadedImage::new(b"definitely not an image".to_vec()).with_file_name("notes.txt"),
    ])
    .unwrap_err();

    assert!(matches!(err, ImgToolsError::UnreadableImage { index: 2, .. }));
    assert!(err.user_message().contains("#3"));
}

#[test]
fn test_compression_level_changes_nothing_visible() {
    let pages = [UploadedImage::new(common::jpeg(64, 48))];
    let fast = PdfAssembler::new()
        .with_compression(flate2::Compression::fast())
        .assemble(&pages)
        .unwrap();
    let best = PdfAssembler::new()
        .with_compression(flate2::Compression::best())
        .assemble(&pages)
        .unwrap();
    assert_eq!(media_boxes(&fast), media_boxes(&best));
}
