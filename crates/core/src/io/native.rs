//! Native GeoTIFF reading
//!
//! Uses the `tiff` crate. The affine georeferencing tags
//! (ModelPixelScale + ModelTiepoint) are interpreted, and an EPSG code is
//! taken from the GeoKey directory when it names one. WKT projections are
//! not parsed; callers can attach a CRS themselves.

use crate::crs::CRS;
use crate::error::{Error, Result};
use crate::raster::{GeoTransform, Raster, RasterElement};
use std::fs::File;
use std::io::Cursor;
use std::path::Path;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::tags::Tag;

/// Read a GeoTIFF file into a Raster
///
/// The first band is read; integer and float pixel formats are cast to `T`,
/// with values that do not fit becoming `T::default_nodata()`.
pub fn read_geotiff<T, P>(path: P) -> Result<Raster<T>>
where
    T: RasterElement,
    P: AsRef<Path>,
{
    let file = File::open(path.as_ref())?;
    decode_geotiff(file)
}

/// Read a GeoTIFF from an in-memory buffer into a Raster
///
/// Same as `read_geotiff` but operates on a byte slice instead of a file path.
pub fn read_geotiff_from_buffer<T>(data: &[u8]) -> Result<Raster<T>>
where
    T: RasterElement,
{
    let cursor = Cursor::new(data);
    decode_geotiff(cursor)
}

/// Internal: decode a GeoTIFF from any `Read + Seek` source
fn decode_geotiff<T, R>(reader: R) -> Result<Raster<T>>
where
    T: RasterElement,
    R: std::io::Read + std::io::Seek,
{
    let mut decoder = Decoder::new(reader)
        .map_err(|e| Error::Other(format!("TIFF decode error: {}", e)))?;

    let (width, height) = decoder.dimensions()
        .map_err(|e| Error::Other(format!("Cannot read dimensions: {}", e)))?;

    let rows = height as usize;
    let cols = width as usize;

    // Read image data
    let result = decoder.read_image()
        .map_err(|e| Error::Other(format!("Cannot read image data: {}", e)))?;

    let data: Vec<T> = match result {
        DecodingResult::F32(buf) => cast_all(&buf),
        DecodingResult::F64(buf) => cast_all(&buf),
        DecodingResult::U8(buf) => cast_all(&buf),
        DecodingResult::U16(buf) => cast_all(&buf),
        DecodingResult::U32(buf) => cast_all(&buf),
        DecodingResult::I8(buf) => cast_all(&buf),
        DecodingResult::I16(buf) => cast_all(&buf),
        DecodingResult::I32(buf) => cast_all(&buf),
        _ => return Err(Error::UnsupportedDataType("Unsupported TIFF pixel format".to_string())),
    };

    if data.len() != rows * cols {
        return Err(Error::InvalidDimensions {
            width: cols,
            height: rows,
        });
    }

    let mut raster = Raster::from_vec(data, rows, cols)?;

    // Try to read GeoTIFF tags (ModelTiepointTag + ModelPixelScaleTag)
    if let Ok(transform) = read_geotransform(&mut decoder) {
        raster.set_transform(transform);
    }

    if let Some(code) = read_epsg(&mut decoder) {
        raster.set_crs(Some(CRS::from_epsg(code)));
    }

    // GDAL_NODATA is stored as an ASCII string
    if let Ok(text) = decoder.get_tag_ascii_string(Tag::from_u16_exhaustive(GDAL_NODATA))
        && let Ok(value) = text.trim_matches(char::from(0)).trim().parse::<f64>()
    {
        raster.set_nodata(num_traits::cast(value));
    }

    Ok(raster)
}

// GeoTIFF tag numbers. The tiff crate maps these to named variants, so they
// must go through `Tag::from_u16_exhaustive` rather than `Tag::Unknown`.
const MODEL_PIXEL_SCALE: u16 = 33550;
const MODEL_TIEPOINT: u16 = 33922;
const GEO_KEY_DIRECTORY: u16 = 34735;
const GDAL_NODATA: u16 = 42113;

fn cast_all<S, T>(buf: &[S]) -> Vec<T>
where
    S: num_traits::NumCast + Copy,
    T: RasterElement,
{
    buf.iter()
        .map(|&v| num_traits::cast(v).unwrap_or(T::default_nodata()))
        .collect()
}

/// Attempt to read GeoTransform from TIFF tags
fn read_geotransform<R: std::io::Read + std::io::Seek>(
    decoder: &mut Decoder<R>,
) -> Result<GeoTransform> {
    // ModelTransformationTag (34264) is not read
    let scale_tag = Tag::from_u16_exhaustive(MODEL_PIXEL_SCALE);
    let tiepoint_tag = Tag::from_u16_exhaustive(MODEL_TIEPOINT);

    let scale = decoder
        .get_tag_f64_vec(scale_tag)
        .map_err(|_| Error::Other("No pixel scale tag".into()))?;

    let tiepoint = decoder
        .get_tag_f64_vec(tiepoint_tag)
        .map_err(|_| Error::Other("No tiepoint tag".into()))?;

    if scale.len() >= 2 && tiepoint.len() >= 6 {
        // tiepoint: [I, J, K, X, Y, Z]
        // scale: [ScaleX, ScaleY, ScaleZ]
        let origin_x = tiepoint[3] - tiepoint[0] * scale[0];
        let origin_y = tiepoint[4] + tiepoint[1] * scale[1];
        let pixel_width = scale[0];
        let pixel_height = -scale[1]; // Negative for north-up

        return Ok(GeoTransform::new(origin_x, origin_y, pixel_width, pixel_height));
    }

    Err(Error::Other("Cannot determine geotransform".into()))
}

/// EPSG code from the GeoKeyDirectoryTag, if it carries one.
///
/// The directory is a header of four shorts followed by entries of
/// (key, location, count, value). Only inline values are read.
fn read_epsg<R: std::io::Read + std::io::Seek>(decoder: &mut Decoder<R>) -> Option<u32> {
    const PROJECTED_CS_TYPE: u16 = 3072;
    const GEOGRAPHIC_TYPE: u16 = 2048;
    const USER_DEFINED: u16 = 32767;

    let keys = decoder
        .get_tag_u16_vec(Tag::from_u16_exhaustive(GEO_KEY_DIRECTORY))
        .ok()?;
    let entries: Vec<&[u16]> = keys.get(4..)?.chunks_exact(4).collect();

    [PROJECTED_CS_TYPE, GEOGRAPHIC_TYPE].into_iter().find_map(|wanted| {
        entries
            .iter()
            .find(|e| e[0] == wanted && e[1] == 0 && e[3] != 0 && e[3] != USER_DEFINED)
            .map(|e| u32::from(e[3]))
    })
}
