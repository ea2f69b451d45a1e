//! Area-of-interest descriptors submitted to the prediction service.

/// A geographic point, in decimal degrees.
///
/// No range validation is performed; out-of-range values are forwarded to
/// the service uninterpreted and rejected there if invalid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub lat: f64,
    pub lon: f64,
}

impl Point {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Render the wire descriptor for this point.
    ///
    /// The closing parenthesis is intentionally absent: the live endpoint
    /// accepts the unterminated form and that is what is sent today.
    // TODO: confirm with the service operators whether the closing
    // parenthesis is required before changing the wire format.
    pub fn descriptor(&self) -> String {
        format!("POINT({} {}", self.lat, self.lon)
    }
}

/// A polygon area of interest.
///
/// Only the constructor surface is available; see [`crate::Client::polygon`]
/// for the (not yet wired) query path.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    wkt: String,
}

impl Polygon {
    /// Build a polygon from its well-known-text form.
    pub fn from_string(wkt: &str) -> Self {
        Self {
            wkt: wkt.trim().to_string(),
        }
    }

    pub fn descriptor(&self) -> &str {
        &self.wkt
    }
}
