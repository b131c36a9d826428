//! EXIF and dimension extraction.
//!
//! Decoding and EXIF parsing are blocking work, so both run on
//! `spawn_blocking`. An image without an EXIF block is still a
//! successful extraction; only an undecodable image fails.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime, Utc};
use exif::{Exif, In, Tag, Value};
use tokio_util::sync::CancellationToken;

use photosift_core::ImageMetadata;

/// Read the pixel dimensions and EXIF fields of an image.
pub(crate) async fn extract(path: &Path, cancel: &CancellationToken) -> ImageMetadata {
    if cancel.is_cancelled() {
        return ImageMetadata::failed("extraction cancelled");
    }

    let path: PathBuf = path.to_owned();
    match tokio::task::spawn_blocking(move || extract_blocking(&path)).await {
        Ok(metadata) => metadata,
        Err(err) => ImageMetadata::failed(format!("extraction task failed: {err}")),
    }
}

fn extract_blocking(path: &Path) -> ImageMetadata {
    let decoded = match image::open(path) {
        Ok(image) => image,
        Err(err) => return ImageMetadata::failed(err.to_string()),
    };

    let mut metadata = ImageMetadata::ok(decoded.width(), decoded.height());

    if let Some(exif) = read_exif(path) {
        metadata.taken_at = taken_at(&exif);
        metadata.camera_make = ascii_value(&exif, Tag::Make);
        metadata.camera_model = ascii_value(&exif, Tag::Model);
        metadata.latitude = gps_coordinate(&exif, Tag::GPSLatitude, Tag::GPSLatitudeRef, "S");
        metadata.longitude = gps_coordinate(&exif, Tag::GPSLongitude, Tag::GPSLongitudeRef, "W");
        metadata.iso = uint_value(&exif, Tag::PhotographicSensitivity);
        metadata.aperture = rational_value(&exif, Tag::FNumber);
        metadata.shutter_speed = rational_value(&exif, Tag::ExposureTime);
        metadata.focal_length = rational_value(&exif, Tag::FocalLength);
    }

    metadata
}

/// Absent or unparseable EXIF is not an error, just empty fields.
fn read_exif(path: &Path) -> Option<Exif> {
    let file = File::open(path).ok()?;
    let mut reader = BufReader::new(file);
    exif::Reader::new().read_from_container(&mut reader).ok()
}

fn taken_at(exif: &Exif) -> Option<DateTime<Utc>> {
    let raw = ascii_field(exif, Tag::DateTimeOriginal)
        .or_else(|| ascii_field(exif, Tag::DateTime))?;
    NaiveDateTime::parse_from_str(&raw, "%Y:%m:%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

fn ascii_value(exif: &Exif, tag: Tag) -> Option<String> {
    ascii_field(exif, tag)
}

fn ascii_field(exif: &Exif, tag: Tag) -> Option<String> {
    let field = exif.get_field(tag, In::PRIMARY)?;
    match &field.value {
        Value::Ascii(values) => {
            let text = values
                .first()
                .map(|bytes| String::from_utf8_lossy(bytes).trim().to_string())?;
            (!text.is_empty()).then_some(text)
        }
        _ => None,
    }
}

fn uint_value(exif: &Exif, tag: Tag) -> Option<u32> {
    exif.get_field(tag, In::PRIMARY)?.value.get_uint(0)
}

fn rational_value(exif: &Exif, tag: Tag) -> Option<f64> {
    let field = exif.get_field(tag, In::PRIMARY)?;
    match &field.value {
        Value::Rational(values) => values.first().map(|r| r.to_f64()),
        Value::SRational(values) => values.first().map(|r| r.to_f64()),
        _ => None,
    }
}

/// Degrees/minutes/seconds to decimal degrees, negated for the southern
/// and western hemispheres.
fn gps_coordinate(exif: &Exif, tag: Tag, ref_tag: Tag, negative_ref: &str) -> Option<f64> {
    let field = exif.get_field(tag, In::PRIMARY)?;
    let Value::Rational(parts) = &field.value else {
        return None;
    };
    if parts.len() < 3 {
        return None;
    }
    let degrees = parts[0].to_f64() + parts[1].to_f64() / 60.0 + parts[2].to_f64() / 3600.0;

    let reference = ascii_field(exif, ref_tag)?;
    if reference.eq_ignore_ascii_case(negative_ref) {
        Some(-degrees)
    } else {
        Some(degrees)
    }
}
