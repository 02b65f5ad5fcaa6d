//! Geohash encoding for published location records.
//!
//! A geohash is a base-32 string naming a latitude/longitude cell. Each
//! character adds five bits of interleaved longitude/latitude bisection, so
//! the token length is the user-facing precision knob:
//!
//! | Length | Cell Width | Cell Height | Use Case |
//! |--------|-----------|-------------|----------|
//! | 1      | ±2500 km  | ±2500 km    | Continent |
//! | 5      | ±2.4 km   | ±2.4 km     | City |
//! | 8      | ±19 m     | ±19 m       | Building (default) |
//! | 12     | ±1.9 cm   | ±1.9 cm     | Survey grade |

use super::error::{LocationError, Result};

/// Geohash base-32 alphabet (no `a`, `i`, `l`, `o`).
const BASE32: &[u8; 32] = b"0123456789bcdefghjkmnpqrstuvwxyz";

/// Shortest supported geohash.
pub const MIN_PRECISION: u8 = 1;

/// Longest supported geohash.
pub const MAX_PRECISION: u8 = 12;

const BITS_PER_CHAR: u8 = 5;

/// Encodes a coordinate as a geohash of exactly `precision` characters.
///
/// Longitude and latitude ranges are bisected alternately, starting with
/// longitude. A coordinate equal to a midpoint always falls in the upper
/// half, so encoding is stable on cell boundaries.
///
/// # Errors
///
/// Returns an error if the latitude is not in [-90, 90], the longitude is not
/// in [-180, 180] (including NaN and infinities), or the precision is not in
/// [1, 12]. Out-of-range input is rejected, never clamped.
///
/// # Examples
///
/// ```
/// use sentinel_core::location::geohash;
///
/// assert_eq!(geohash::encode(42.6, -5.6, 5).unwrap(), "ezs42");
/// assert!(geohash::encode(91.0, 0.0, 5).is_err());
/// ```
pub fn encode(lat: f64, lon: f64, precision: u8) -> Result<String> {
    validate_coordinate(lat, lon)?;
    if !(MIN_PRECISION..=MAX_PRECISION).contains(&precision) {
        return Err(LocationError::InvalidPrecision(precision));
    }

    let mut lat_range = (-90.0_f64, 90.0_f64);
    let mut lon_range = (-180.0_f64, 180.0_f64);
    let mut hash = String::with_capacity(usize::from(precision));
    let mut is_lon = true;
    let mut bit = 0;
    let mut index = 0_usize;

    while hash.len() < usize::from(precision) {
        let (value, range) = if is_lon {
            (lon, &mut lon_range)
        } else {
            (lat, &mut lat_range)
        };

        let mid = (range.0 + range.1) / 2.0;
        index <<= 1;
        if value >= mid {
            index |= 1;
            range.0 = mid;
        } else {
            range.1 = mid;
        }

        is_lon = !is_lon;
        bit += 1;
        if bit == BITS_PER_CHAR {
            hash.push(char::from(BASE32[index]));
            bit = 0;
            index = 0;
        }
    }

    Ok(hash)
}

/// Decodes a geohash to the `(latitude, longitude)` centre of its cell.
///
/// # Errors
///
/// Returns an error if the string is empty or contains characters outside
/// the geohash alphabet.
///
/// # Examples
///
/// ```
/// use sentinel_core::location::geohash;
///
/// let (lat, lon) = geohash::decode("ezs42").unwrap();
/// assert!((lat - 42.6).abs() < 0.1);
/// assert!((lon - -5.6).abs() < 0.1);
/// ```
pub fn decode(hash: &str) -> Result<(f64, f64)> {
    if hash.is_empty() {
        return Err(LocationError::InvalidGeohash("empty geohash".to_string()));
    }

    ::geohash::decode(hash)
        .map(|(coord, _, _)| (coord.y, coord.x))
        .map_err(|e| LocationError::InvalidGeohash(e.to_string()))
}

/// Checks that a coordinate pair is finite and within WGS84 bounds.
///
/// # Errors
///
/// Returns the first offending axis.
pub fn validate_coordinate(lat: f64, lon: f64) -> Result<()> {
    if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
        return Err(LocationError::LatitudeOutOfRange(lat));
    }
    if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
        return Err(LocationError::LongitudeOutOfRange(lon));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_vector_short() {
        assert_eq!(encode(42.6, -5.6, 5).unwrap(), "ezs42");
    }

    #[test]
    fn known_vector_long() {
        assert_eq!(encode(57.649_11, 10.407_44, 11).unwrap(), "u4pruydqqvj");
    }

    #[test]
    fn origin_resolves_to_upper_halves() {
        // 0.0 sits exactly on the first lon and lat midpoints.
        assert_eq!(encode(0.0, 0.0, 1).unwrap(), "s");
        assert_eq!(encode(0.0, 0.0, 6).unwrap(), "s00000");
    }

    #[test]
    fn max_corner_is_all_ones() {
        for precision in MIN_PRECISION..=MAX_PRECISION {
            let hash = encode(90.0, 180.0, precision).unwrap();
            assert_eq!(hash, "z".repeat(usize::from(precision)));
        }
    }

    #[test]
    fn min_corner_is_all_zeros() {
        for precision in MIN_PRECISION..=MAX_PRECISION {
            let hash = encode(-90.0, -180.0, precision).unwrap();
            assert_eq!(hash, "0".repeat(usize::from(precision)));
        }
    }

    #[test]
    fn length_matches_precision() {
        for precision in MIN_PRECISION..=MAX_PRECISION {
            let hash = encode(60.17, 24.94, precision).unwrap();
            assert_eq!(hash.len(), usize::from(precision));
        }
    }

    #[test]
    fn longer_hash_extends_shorter() {
        let geo5 = encode(37.7749, -122.4194, 5).unwrap();
        let geo8 = encode(37.7749, -122.4194, 8).unwrap();
        assert!(geo8.starts_with(&geo5));
    }

    #[test]
    fn rejects_out_of_range_latitude() {
        assert_eq!(
            encode(90.5, 0.0, 8),
            Err(LocationError::LatitudeOutOfRange(90.5))
        );
        assert!(encode(-91.0, 0.0, 8).is_err());
    }

    #[test]
    fn rejects_out_of_range_longitude() {
        assert_eq!(
            encode(0.0, 180.5, 8),
            Err(LocationError::LongitudeOutOfRange(180.5))
        );
        assert!(encode(0.0, -181.0, 8).is_err());
    }

    #[test]
    fn rejects_non_finite() {
        assert!(encode(f64::NAN, 0.0, 8).is_err());
        assert!(encode(0.0, f64::INFINITY, 8).is_err());
        assert!(encode(f64::NEG_INFINITY, 0.0, 8).is_err());
    }

    #[test]
    fn rejects_invalid_precision() {
        assert_eq!(encode(0.0, 0.0, 0), Err(LocationError::InvalidPrecision(0)));
        assert_eq!(
            encode(0.0, 0.0, 13),
            Err(LocationError::InvalidPrecision(13))
        );
    }

    #[test]
    fn decode_returns_cell_centre() {
        let hash = encode(60.1699, 24.9384, 8).unwrap();
        let (lat, lon) = decode(&hash).unwrap();
        assert!((lat - 60.1699).abs() < 0.001);
        assert!((lon - 24.9384).abs() < 0.001);
    }

    #[test]
    fn decode_then_encode_is_stable() {
        let hash = encode(37.7749, -122.4194, 8).unwrap();
        let (lat, lon) = decode(&hash).unwrap();
        assert_eq!(encode(lat, lon, 8).unwrap(), hash);
    }

    #[test]
    fn decode_rejects_empty() {
        assert!(matches!(decode(""), Err(LocationError::InvalidGeohash(_))));
    }

    #[test]
    fn decode_rejects_invalid_characters() {
        assert!(decode("abc!").is_err());
    }
}
