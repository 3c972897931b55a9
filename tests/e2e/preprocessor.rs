use glam::*;
use wgpu_3dgs_sort::{
    CameraBuffer, PointPod, PointsBuffer, Preprocessor, PreprocessorCreateError,
    RadixSortConfig, RadixSorter, depth_key,
};

use crate::common::{TestContext, given, sort};

fn points() -> Vec<PointPod> {
    vec![
        // Visible
        given::point_at(Vec3::new(0.0, 0.0, -5.0)),
        // Behind the camera
        given::point_at(Vec3::new(0.0, 0.0, 5.0)),
        // Visible
        given::point_at(Vec3::new(1.0, -1.0, -50.0)),
        // Beyond the far plane
        given::point_at(Vec3::new(0.0, 0.0, -500.0)),
        // Visible
        given::point_at(Vec3::new(-2.0, 1.0, -12.5)),
        // Far outside the view
        given::point_at(Vec3::new(1000.0, 0.0, -5.0)),
        // Visible
        given::point_at(Vec3::new(0.5, 0.5, -7.25)),
    ]
}

#[test]
fn test_preprocessor_preprocess_should_append_visible_points_and_sort_back_to_front() {
    let ctx = TestContext::new();
    let points = points();
    let camera = CameraBuffer::new(&ctx.device);
    camera.update(&ctx.queue, given::view(), given::proj(), given::size());
    let points_buffer = PointsBuffer::new(&ctx.device, &points);
    let sorter = sort::sorter(&ctx, RadixSortConfig::new(points.len() as u32));
    let preprocessor =
        Preprocessor::new(&ctx.device, &camera, &points_buffer, &sorter).expect("preprocessor");

    let mut encoder = ctx.create_encoder();
    sorter.reset(&mut encoder);
    preprocessor.preprocess(&mut encoder, points.len() as u32);
    sorter.sort(&mut encoder);
    ctx.submit_and_wait(encoder);

    let output = sort::download(&ctx, &sorter);

    assert_eq!(output.info.live_count, 4);
    assert_eq!(output.info.sort_count, 4);
    assert_eq!(output.live_indices(), &[2, 4, 6, 0]);
    assert_eq!(
        output.live_keys(),
        [-50.0, -12.5, -7.25, -5.0].map(depth_key).as_slice()
    );
}

#[test]
fn test_preprocessor_preprocess_when_repeated_should_not_accumulate() {
    let ctx = TestContext::new();
    let points = points();
    let camera = CameraBuffer::new(&ctx.device);
    camera.update(&ctx.queue, given::view(), given::proj(), given::size());
    let points_buffer = PointsBuffer::new(&ctx.device, &points);
    let sorter = sort::sorter(&ctx, RadixSortConfig::new(points.len() as u32));
    let preprocessor =
        Preprocessor::new(&ctx.device, &camera, &points_buffer, &sorter).expect("preprocessor");

    for _ in 0..3 {
        let mut encoder = ctx.create_encoder();
        sorter.reset(&mut encoder);
        preprocessor.preprocess(&mut encoder, points.len() as u32);
        sorter.sort(&mut encoder);
        ctx.submit_and_wait(encoder);
    }

    let output = sort::download(&ctx, &sorter);

    assert_eq!(output.info.live_count, 4);
    assert_eq!(output.live_indices(), &[2, 4, 6, 0]);
}

#[test]
fn test_preprocessor_new_when_points_exceed_capacity_should_return_error() {
    let ctx = TestContext::new();
    let points = points();
    let camera = CameraBuffer::new(&ctx.device);
    let points_buffer = PointsBuffer::new(&ctx.device, &points);
    let sorter = RadixSorter::new(&ctx.device, &RadixSortConfig::new(4)).expect("radix sorter");

    assert!(matches!(
        Preprocessor::new(&ctx.device, &camera, &points_buffer, &sorter),
        Err(PreprocessorCreateError::PointCountExceedsCapacity {
            point_count: 7,
            capacity: 4,
        })
    ));
}
