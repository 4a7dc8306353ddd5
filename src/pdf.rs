//! Image-to-PDF assembly
//!
//! Each input image becomes one page whose `MediaBox` equals the image's pixel
//! size (1 px = 1 pt), with the image drawn full-bleed at the origin. Pages
//! keep input order; nothing is reordered, scaled, or margined.

use crate::{
    error::{ImgToolsError, Result},
    services::ImageIOService,
    types::{ImageRole, UploadedImage},
};
use flate2::{write::ZlibEncoder, Compression};
use image::{ColorType, DynamicImage};
use lopdf::{
    content::{Content, Operation},
    dictionary, Dictionary, Document, Object, ObjectId, Stream,
};
use std::io::Write;

/// XObject name used for the single image on every page
const IMAGE_NAME: &[u8] = b"Im0";

/// Builds PDF documents from ordered image uploads
#[derive(Debug, Clone, Copy)]
pub struct PdfAssembler {
    compression: Compression,
}

impl Default for PdfAssembler {
    fn default() -> Self {
        Self {
            compression: Compression::default(),
        }
    }
}

/// Pixel data split into PDF-ready planes
struct EncodedImage {
    width: u32,
    height: u32,
    color_space: &'static [u8],
    color: Vec<u8>,
    alpha: Option<Vec<u8>>,
}

impl PdfAssembler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the zlib level used for image streams
    #[must_use]
    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Assemble `images` into a PDF, one page per image, in order
    ///
    /// An empty slice yields a valid document with zero pages.
    ///
    /// # Errors
    /// - `UnreadableImage` naming the first image that fails to decode; no
    ///   partial document is produced
    /// - `Pdf` if serialization fails
    pub fn assemble(&self, images: &[UploadedImage]) -> Result<Vec<u8>> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let mut kids = Vec::with_capacity(images.len());

        for (index, upload) in images.iter().enumerate() {
            let decoded = ImageIOService::load_from_bytes(&upload.data, ImageRole::Page(index))?;
            let page_id = self.add_page(&mut doc, pages_id, &decoded)?;
            tracing::debug!(
                page = index + 1,
                width = decoded.width(),
                height = decoded.height(),
                file = upload.file_name.as_deref().unwrap_or("-"),
                "added PDF page"
            );
            kids.push(Object::Reference(page_id));
        }

        let page_count = kids.len();
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => Object::Integer(page_count as i64),
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
        });
        let info_id = doc.add_object(dictionary! {
            "Producer" => Object::string_literal("imgtools"),
        });
        doc.trailer.set("Root", Object::Reference(catalog_id));
        doc.trailer.set("Info", Object::Reference(info_id));

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer)
            .map_err(|e| ImgToolsError::pdf(format!("Failed to write PDF: {}", e)))?;

        tracing::info!(pages = page_count, bytes = buffer.len(), "assembled PDF");
        Ok(buffer)
    }

    fn add_page(
        &self,
        doc: &mut Document,
        pages_id: ObjectId,
        image: &DynamicImage,
    ) -> Result<ObjectId> {
        let encoded = encode_planes(image);
        let (width, height) = (i64::from(encoded.width), i64::from(encoded.height));

        let smask_id = match &encoded.alpha {
            Some(alpha) => Some(doc.add_object(self.image_stream(
                encoded.width,
                encoded.height,
                b"DeviceGray",
                alpha,
                None,
            )?)),
            None => None,
        };
        let image_id = doc.add_object(self.image_stream(
            encoded.width,
            encoded.height,
            encoded.color_space,
            &encoded.color,
            smask_id,
        )?);

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
                Operation::new("Do", vec![Object::Name(IMAGE_NAME.to_vec())]),
                Operation::new("Q", vec![]),
            ],
        };
        let content_bytes = content
            .encode()
            .map_err(|e| ImgToolsError::pdf(format!("Failed to encode page content: {}", e)))?;
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content_bytes));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(pages_id),
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(width),
                Object::Integer(height),
            ],
            "Resources" => dictionary! {
                "XObject" => dictionary! {
                    "Im0" => Object::Reference(image_id),
                },
            },
            "Contents" => Object::Reference(content_id),
        });

        Ok(page_id)
    }

    fn image_stream(
        &self,
        width: u32,
        height: u32,
        color_space: &[u8],
        samples: &[u8],
        smask: Option<ObjectId>,
    ) -> Result<Stream> {
        let mut encoder = ZlibEncoder::new(Vec::new(), self.compression);
        encoder
            .write_all(samples)
            .map_err(|e| ImgToolsError::pdf(format!("Failed to compress image data: {}", e)))?;
        let compressed = encoder
            .finish()
            .map_err(|e| ImgToolsError::pdf(format!("Failed to compress image data: {}", e)))?;

        let mut dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => Object::Integer(i64::from(width)),
            "Height" => Object::Integer(i64::from(height)),
            "ColorSpace" => Object::Name(color_space.to_vec()),
            "BitsPerComponent" => Object::Integer(8),
            "Filter" => "FlateDecode",
        };
        if let Some(id) = smask {
            dict.set("SMask", Object::Reference(id));
        }

        // Already deflated; keep lopdf from touching it
        let mut stream = Stream::new(dict, compressed);
        stream.allows_compression = false;
        Ok(stream)
    }
}

/// Split an image into 8-bit colour samples and an optional alpha plane
///
/// The alpha plane is dropped when every pixel is opaque.
fn encode_planes(image: &DynamicImage) -> EncodedImage {
    let (width, height) = (image.width(), image.height());

    let grey = matches!(
        image.color(),
        ColorType::L8 | ColorType::L16 | ColorType::La8 | ColorType::La16
    );

    if !image.color().has_alpha() {
        return if grey {
            EncodedImage {
                width,
                height,
                color_space: b"DeviceGray",
                color: image.to_luma8().into_raw(),
                alpha: None,
            }
        } else {
            EncodedImage {
                width,
                height,
                color_space: b"DeviceRGB",
                color: image.to_rgb8().into_raw(),
                alpha: None,
            }
        };
    }

    let pixel_count = (width as usize) * (height as usize);
    let mut alpha = Vec::with_capacity(pixel_count);

    let (color_space, color): (&'static [u8], Vec<u8>) = if grey {
        let la = image.to_luma_alpha8();
        let mut luma = Vec::with_capacity(pixel_count);
        for px in la.pixels() {
            luma.push(px[0]);
            alpha.push(px[1]);
        }
        (b"DeviceGray", luma)
    } else {
        let rgba = image.to_rgba8();
        let mut rgb = Vec::with_capacity(pixel_count * 3);
        for px in rgba.pixels() {
            rgb.extend_from_slice(&[px[0], px[1], px[2]]);
            alpha.push(px[3]);
        }
        (b"DeviceRGB", rgb)
    };

    let alpha = if alpha.iter().all(|&a| a == u8::MAX) {
        None
    } else {
        Some(alpha)
    };

    EncodedImage {
        width,
        height,
        color_space,
        color,
        alpha,
    }
}
