//! I/O operations for reading rasters and writing vector results

mod geojson_io;
mod native;

pub use geojson_io::{to_geojson_string, write_geojson};
pub use native::{read_geotiff, read_geotiff_from_buffer};
