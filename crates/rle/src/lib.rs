//! Red List of Ecosystems (RLE) spatial metrics.
//!
//! Extent of Occurrence (EOO) is the area of the minimum convex polygon
//! enclosing all known occurrences of an ecosystem, a standard range-size
//! metric in conservation assessments. The polygon must not exclude any
//! discontinuities: oceans, other countries and other unsuitable areas
//! stay inside the hull so the metric is comparable across ecosystem
//! types.

pub mod assets;
pub mod eoo;

pub use assets::ensure_asset_folder;
pub use eoo::{area_km2, make_eoo, EooOptions};
