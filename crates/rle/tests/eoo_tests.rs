//! EOO workflow tests against the mock compute service.

use std::sync::atomic::Ordering;

use bytes::Bytes;
use geo::{Geometry, MultiPoint, Point};
use raster::ImageHandle;
use rle::{area_km2, ensure_asset_folder, make_eoo, EooOptions};
use test_utils::MockComputeService;

fn presence_points() -> Geometry<f64> {
    Geometry::MultiPoint(MultiPoint(vec![
        Point::new(0.0, 0.0),
        Point::new(2.0, 0.0),
        Point::new(2.0, 2.0),
        Point::new(0.0, 2.0),
        // Interior point that must not appear on the hull.
        Point::new(1.0, 1.0),
    ]))
}

#[tokio::test]
async fn make_eoo_returns_a_convex_polygon() {
    let mock = MockComputeService::new(Bytes::new(), Bytes::new())
        .with_vector_result(presence_points());
    let region = Geometry::Point(Point::new(1.0, 1.0));

    let eoo = make_eoo(
        &mock,
        &ImageHandle::new("habitat"),
        &region,
        &EooOptions::default(),
    )
    .await
    .unwrap();

    let Geometry::Polygon(hull) = eoo else {
        panic!("EOO should be a polygon");
    };
    // Four corners survive; the interior point does not.
    use geo::CoordsIter;
    assert!(hull.exterior().coords_count() >= 4);
    assert!(!hull
        .exterior()
        .coords()
        .any(|c| (c.x - 1.0).abs() < 1e-9 && (c.y - 1.0).abs() < 1e-9));
}

#[tokio::test]
async fn hull_is_applied_twice() {
    let mock = MockComputeService::new(Bytes::new(), Bytes::new())
        .with_vector_result(presence_points());
    let region = Geometry::Point(Point::new(1.0, 1.0));

    make_eoo(
        &mock,
        &ImageHandle::new("habitat"),
        &region,
        &EooOptions::default(),
    )
    .await
    .unwrap();

    // One reduction, two hull calls: the second call is the documented
    // workaround for the upstream precision defect.
    assert_eq!(mock.hull_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn eoo_area_is_plausible() {
    let mock = MockComputeService::new(Bytes::new(), Bytes::new())
        .with_vector_result(presence_points());
    let region = Geometry::Point(Point::new(1.0, 1.0));

    let eoo = make_eoo(
        &mock,
        &ImageHandle::new("habitat"),
        &region,
        &EooOptions::default(),
    )
    .await
    .unwrap();

    // A 2x2 degree hull near the equator is roughly 49 000 km².
    let area = area_km2(&eoo);
    assert!((40_000.0..60_000.0).contains(&area), "area: {area}");
}

#[tokio::test]
async fn ensure_asset_folder_is_idempotent() {
    let mock = MockComputeService::new(Bytes::new(), Bytes::new());
    let path = "projects/demo/assets/mmr-t1-1-1";

    assert!(ensure_asset_folder(&mock, path).await.unwrap());
    // Second call finds the folder and does not re-create it.
    assert!(!ensure_asset_folder(&mock, path).await.unwrap());
}
