use glam::*;
use wgpu_3dgs_sort::{BufferWrapper, PointPod, PointsBuffer};

use crate::common::{TestContext, given};

#[test]
fn test_points_buffer_new_should_hold_points() {
    let ctx = TestContext::new();
    let points = [
        given::point_at(Vec3::new(0.0, 0.0, -5.0)),
        given::point_at(Vec3::new(1.0, 0.0, -5.0)),
    ];

    let buffer = PointsBuffer::new(&ctx.device, &points);

    assert_eq!(buffer.len(), 2);
    assert!(!buffer.is_empty());
    assert_eq!(
        buffer.buffer().size(),
        2 * std::mem::size_of::<PointPod>() as wgpu::BufferAddress
    );
}

#[test]
fn test_points_buffer_new_when_points_are_empty_should_be_bindable_and_report_empty() {
    let ctx = TestContext::new();

    let buffer = PointsBuffer::new(&ctx.device, &[]);

    assert_eq!(buffer.len(), 0);
    assert!(buffer.is_empty());
    assert_eq!(
        buffer.buffer().size(),
        std::mem::size_of::<PointPod>() as wgpu::BufferAddress
    );
}
