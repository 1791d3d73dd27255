use super::math::GeoPoint;

pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

pub fn lerp_point(a: GeoPoint, b: GeoPoint, t: f64) -> GeoPoint {
    GeoPoint::new(lerp(a.lat, b.lat, t), lerp(a.lon, b.lon, t))
}

/// Position along `path` at normalized progress `t`.
///
/// Every segment gets an equal share of `[0, 1]` regardless of its length,
/// so entities cover short legs slowly and long legs quickly. `t <= 0`
/// yields the first point and `t >= 1` holds the last one; there is no
/// extrapolation.
///
/// `path` must be non-empty. Entities guarantee this at construction, see
/// [`crate::roster::Entity::new`]. Use [`try_interpolate`] for arbitrary
/// slices.
pub fn interpolate(path: &[GeoPoint], t: f64) -> GeoPoint {
    match try_interpolate(path, t) {
        Some(point) => point,
        None => GeoPoint::new(f64::NAN, f64::NAN),
    }
}

pub fn try_interpolate(path: &[GeoPoint], t: f64) -> Option<GeoPoint> {
    let first = *path.first()?;
    // A single point has zero segments; returning early avoids dividing time among them.
    if t <= 0.0 || path.len() == 1 {
        return Some(first);
    }

    let segments = path.len() - 1;
    let seg_float = t * segments as f64;
    // Float-to-int casts saturate (NaN becomes 0), then clamp to the last point.
    let idx = (seg_float.floor() as usize).min(segments);
    let frac = seg_float - idx as f64;

    let p1 = path[idx];
    match path.get(idx + 1) {
        Some(&p2) => Some(lerp_point(p1, p2, frac)),
        None => Some(p1),
    }
}
