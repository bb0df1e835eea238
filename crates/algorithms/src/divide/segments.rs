//! Channel segments for export
//!
//! The network is cut into reaches that run from a channel head or a
//! confluence down to the next confluence or outlet. Reaches longer than the
//! segment length are cut again, so each exported line carries metrics
//! averaged over a comparable stretch of channel.

use geo_types::LineString;

use crate::hydrology::StreamNetwork;
use ridgeline_core::vector::{Feature, FeatureCollection};
use ridgeline_core::{Error, Result};

/// Vertex paths (network positions, downstream order) of every reach
pub fn reaches(network: &StreamNetwork) -> Vec<Vec<usize>> {
    let donors = network.donor_counts();
    let receivers = network.receivers();

    (0..network.len())
        .filter(|&p| donors[p] != 1)
        .map(|start| {
            let mut path = vec![start];
            let mut cur = start;
            while let Some(next) = receivers[cur] {
                path.push(next);
                if donors[next] != 1 {
                    break;
                }
                cur = next;
            }
            path
        })
        .collect()
}

/// Cut a vertex path into pieces of roughly `segment_length` map units.
///
/// Consecutive pieces share their boundary vertex. Pieces with fewer than
/// two vertices are dropped.
fn split_path(network: &StreamNetwork, path: &[usize], segment_length: f64) -> Vec<Vec<usize>> {
    let mut pieces = Vec::new();
    let mut current: Vec<usize> = Vec::new();
    let mut length = 0.0;

    for &p in path {
        if let Some(&prev) = current.last() {
            length += network.step_length(prev);
        }
        current.push(p);
        if length >= segment_length && current.len() > 1 {
            pieces.push(std::mem::replace(&mut current, vec![p]));
            length = 0.0;
        }
    }
    if current.len() > 1 {
        pieces.push(current);
    }
    pieces
}

fn mean_over(values: &[f64], positions: &[usize]) -> f64 {
    let (sum, count) = positions
        .iter()
        .map(|&p| values[p])
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if count > 0 { sum / count as f64 } else { f64::NAN }
}

/// Build line features for the network, one per segment.
///
/// Each entry of `attributes` is a name and a per-cell attribute aligned
/// with `network.cells()`; every segment gets the mean of each attribute
/// over its vertices, plus its `reach` number and `length`.
pub fn network_segments(
    network: &StreamNetwork,
    segment_length: f64,
    attributes: &[(&str, &[f64])],
) -> Result<FeatureCollection> {
    if !(segment_length > 0.0 && segment_length.is_finite()) {
        return Err(Error::InvalidParameter {
            name: "segment_length",
            value: segment_length.to_string(),
            reason: "must be > 0".into(),
        });
    }
    if let Some((name, values)) = attributes.iter().find(|(_, v)| v.len() != network.len()) {
        return Err(Error::Algorithm(format!(
            "attribute {name} has {} values for a network of {} cells",
            values.len(),
            network.len()
        )));
    }

    let mut fc = FeatureCollection::with_crs(network.crs().cloned());
    let mut n = 0;
    for (reach, path) in reaches(network).iter().enumerate() {
        for piece in split_path(network, path, segment_length) {
            let coords: Vec<(f64, f64)> = piece.iter().map(|&p| network.coordinates(p)).collect();
            let length: f64 = piece[..piece.len() - 1]
                .iter()
                .map(|&p| network.step_length(p))
                .sum();

            let mut feature = Feature::new(LineString::from(coords)).with_id(format!("segment-{n}"));
            feature.set_property("reach", reach as i64);
            feature.set_property("length", length);
            for (name, values) in attributes {
                feature.set_property(*name, mean_over(values, &piece));
            }
            fc.push(feature);
            n += 1;
        }
    }
    Ok(fc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ridgeline_core::raster::Raster;
    use ridgeline_core::vector::AttributeValue;
    use ridgeline_core::GeoTransform;

    /// Straight channel down column 0 of a 10x1 grid
    fn straight(rows: usize) -> StreamNetwork {
        let mut fdir: Raster<u8> = Raster::filled(rows, 1, 7);
        fdir.set_transform(GeoTransform::new(0.0, rows as f64, 1.0, -1.0));
        let mask: Raster<u8> = Raster::filled(rows, 1, 1);
        StreamNetwork::from_mask(&fdir, &mask).unwrap()
    }

    /// Y-shaped network on a 3x3 grid
    fn confluence() -> StreamNetwork {
        let mut fdir: Raster<u8> = Raster::new(3, 3);
        fdir.set_transform(GeoTransform::new(0.0, 3.0, 1.0, -1.0));
        fdir.set(0, 0, 8).unwrap();
        fdir.set(0, 2, 6).unwrap();
        fdir.set(1, 1, 7).unwrap();
        fdir.set(2, 1, 7).unwrap();
        let mut mask: Raster<u8> = Raster::new(3, 3);
        for (r, c) in [(0, 0), (0, 2), (1, 1), (2, 1)] {
            mask.set(r, c, 1).unwrap();
        }
        StreamNetwork::from_mask(&fdir, &mask).unwrap()
    }

    #[test]
    fn test_reaches_stop_at_confluence() {
        let net = confluence();
        let reaches = reaches(&net);
        assert_eq!(reaches.len(), 3);
        let junction = net.position(4).unwrap();
        let outlet = net.position(7).unwrap();
        for r in &reaches {
            assert_eq!(r.len(), 2);
            assert!(*r.last().unwrap() == junction || *r.last().unwrap() == outlet);
        }
    }

    #[test]
    fn test_split_by_length() {
        let net = straight(10);
        let zeros = vec![0.0; net.len()];
        let fc = network_segments(&net, 3.0, &[("chi", &zeros[..])]).unwrap();
        // 9 unit steps -> 3 segments of 3
        assert_eq!(fc.len(), 3);
        for f in fc.iter() {
            assert_relative_eq!(f.get_property("length").unwrap().as_f64().unwrap(), 3.0);
        }
    }

    #[test]
    fn test_segment_attribute_means() {
        let net = straight(3);
        let values: Vec<f64> = (0..net.len()).map(|p| p as f64).collect();
        let fc = network_segments(&net, 100.0, &[("chan_elev", &values[..])]).unwrap();
        assert_eq!(fc.len(), 1);
        let f = fc.iter().next().unwrap();
        assert_relative_eq!(f.get_property("chan_elev").unwrap().as_f64().unwrap(), 1.0);
        assert_eq!(f.get_property("reach"), Some(&AttributeValue::Int(0)));
    }

    #[test]
    fn test_mean_skips_nan() {
        let net = straight(3);
        let values = vec![f64::NAN, 2.0, 4.0];
        let fc = network_segments(&net, 100.0, &[("relief", &values[..])]).unwrap();
        let f = fc.iter().next().unwrap();
        assert_relative_eq!(f.get_property("relief").unwrap().as_f64().unwrap(), 3.0);
    }

    #[test]
    fn test_rejects_bad_input() {
        let net = straight(3);
        let short = vec![0.0; 1];
        assert!(network_segments(&net, 0.0, &[]).is_err());
        assert!(network_segments(&net, 1.0, &[("chi", &short[..])]).is_err());
    }
}
