//! End-to-end composition tests: resolve a mocked boundary, fetch mocked
//! rasters, compose, and inspect pixels.

use std::sync::Arc;

use basemap_common::{RegionCode, RenderOptions};
use boundary::{resolve, ContextData, MemoryBoundaryStore, ResolvedBoundary};
use raster::{FetchOptions, FetchOutcome, ImageHandle, RasterFetcher};
use renderer::compose::{compose, default_output_path, render};
use renderer::Canvas;
use test_utils::fixtures::{geotiff_gray, rect_wkb};
use test_utils::MockComputeService;

async fn singapore() -> ResolvedBoundary {
    let mut store = MemoryBoundaryStore::new();
    store.insert("sg", rect_wkb(103.6, 1.2, 104.0, 1.5));
    resolve(&store, "sg").await.unwrap()
}

fn small_options() -> RenderOptions {
    RenderOptions {
        // Keep test canvases small: dpi 25 gives a 100px long edge.
        dpi: 25,
        ..RenderOptions::default()
    }
}

fn spine_pixels(canvas: &Canvas) -> Vec<[u8; 4]> {
    let (w, h) = (canvas.width() - 1, canvas.height() - 1);
    vec![
        canvas.image.get_pixel(0, 0).0,
        canvas.image.get_pixel(w, 0).0,
        canvas.image.get_pixel(0, h).0,
        canvas.image.get_pixel(w, h).0,
        canvas.image.get_pixel(w / 2, 0).0,
        canvas.image.get_pixel(0, h / 2).0,
    ]
}

#[tokio::test]
async fn grid_on_draws_all_spines() {
    let boundary = singapore().await;
    let options = RenderOptions {
        show_grid: true,
        ..small_options()
    };
    let canvas = compose(
        &options,
        &boundary,
        &FetchOutcome::not_requested(),
        &ContextData::default(),
        None,
    );
    for pixel in spine_pixels(&canvas) {
        assert_eq!(pixel, [0, 0, 0, 255], "spine pixel should be opaque black");
    }
}

#[tokio::test]
async fn grid_off_hides_all_spines() {
    let boundary = singapore().await;
    let options = RenderOptions {
        show_grid: false,
        ..small_options()
    };
    let canvas = compose(
        &options,
        &boundary,
        &FetchOutcome::not_requested(),
        &ContextData::default(),
        None,
    );
    // Without the grid the frame carries no axis box: border pixels keep
    // the background color.
    let background = canvas.image.get_pixel(canvas.width() / 2, 1).0;
    for pixel in spine_pixels(&canvas) {
        assert_eq!(pixel, background, "no spine may be drawn when grid is off");
    }
}

#[tokio::test]
async fn fully_masked_raster_is_invisible() {
    let boundary = singapore().await;
    let extent = boundary.extent;
    let mock = Arc::new(MockComputeService::new(
        geotiff_gray(8, 8, 42.0, extent),
        geotiff_gray(8, 8, 0.0, extent),
    ));
    let fetcher = RasterFetcher::new(mock);
    let outcome = fetcher
        .fetch(
            &ImageHandle::new("img"),
            &extent,
            boundary.zone,
            &FetchOptions::default(),
        )
        .await;
    assert!(outcome.layer().unwrap().is_fully_masked());

    let options = small_options();
    let with_raster = compose(&options, &boundary, &outcome, &ContextData::default(), None);
    let without_raster = compose(
        &options,
        &boundary,
        &FetchOutcome::not_requested(),
        &ContextData::default(),
        None,
    );
    assert_eq!(
        with_raster.image.as_raw(),
        without_raster.image.as_raw(),
        "an all-zero mask must leave no visible basemap pixels"
    );
}

#[tokio::test]
async fn visible_raster_changes_pixels() {
    let boundary = singapore().await;
    let extent = boundary.extent;
    let mock = Arc::new(MockComputeService::new(
        geotiff_gray(8, 8, 0.5, extent),
        geotiff_gray(8, 8, 1.0, extent),
    ));
    let fetcher = RasterFetcher::new(mock);
    let outcome = fetcher
        .fetch(
            &ImageHandle::new("img"),
            &extent,
            boundary.zone,
            &FetchOptions::default(),
        )
        .await;

    let options = RenderOptions {
        show_grid: false,
        show_border: false,
        show_surrounding_context: false,
        ..small_options()
    };
    let with_raster = compose(&options, &boundary, &outcome, &ContextData::default(), None);
    let without_raster = compose(
        &options,
        &boundary,
        &FetchOutcome::not_requested(),
        &ContextData::default(),
        None,
    );
    assert_ne!(with_raster.image.as_raw(), without_raster.image.as_raw());
}

#[tokio::test]
async fn timeout_still_writes_output_file() {
    let boundary = singapore().await;
    let mock = Arc::new(MockComputeService::timing_out());
    let fetcher = RasterFetcher::new(mock);
    let outcome = fetcher
        .fetch(
            &ImageHandle::new("img"),
            &boundary.extent,
            boundary.zone,
            &FetchOptions::default(),
        )
        .await;
    assert!(outcome.layer().is_none(), "timeout must skip the basemap");

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("sg.png");
    let options = RenderOptions {
        output_path: Some(out.clone()),
        ..small_options()
    };

    let written = render(&options, &boundary, &outcome, &ContextData::default()).unwrap();
    assert_eq!(written, out);
    let bytes = std::fs::read(&written).unwrap();
    assert!(!bytes.is_empty());
    assert_eq!(&bytes[..8], &[137, 80, 78, 71, 13, 10, 26, 10]);
}

#[tokio::test]
async fn title_is_drawn_only_when_non_empty() {
    let boundary = singapore().await;
    let base = RenderOptions {
        show_grid: false,
        ..small_options()
    };
    let untitled = compose(
        &base,
        &boundary,
        &FetchOutcome::not_requested(),
        &ContextData::default(),
        None,
    );

    let titled_options = RenderOptions {
        title: Some("SINGAPORE".to_string()),
        ..base.clone()
    };
    let titled = compose(
        &titled_options,
        &boundary,
        &FetchOutcome::not_requested(),
        &ContextData::default(),
        None,
    );
    assert_ne!(titled.image.as_raw(), untitled.image.as_raw());

    let empty_title_options = RenderOptions {
        title: Some(String::new()),
        ..base
    };
    let empty_titled = compose(
        &empty_title_options,
        &boundary,
        &FetchOutcome::not_requested(),
        &ContextData::default(),
        None,
    );
    assert_eq!(empty_titled.image.as_raw(), untitled.image.as_raw());
}

#[test]
fn default_output_path_is_lowercased_code() {
    let code = RegionCode::parse("SG").unwrap();
    assert_eq!(default_output_path(&code), std::path::PathBuf::from("sg.png"));
}
