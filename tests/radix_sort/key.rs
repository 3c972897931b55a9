use wgpu_3dgs_sort::{depth_from_key, depth_key};

#[test]
fn test_depth_key_should_preserve_float_order() {
    let depths = [
        f32::NEG_INFINITY,
        -1.0e30,
        -100.0,
        -1.5,
        -f32::MIN_POSITIVE,
        -0.0,
        0.0,
        f32::MIN_POSITIVE,
        0.25,
        1.0,
        42.0,
        1.0e30,
        f32::INFINITY,
    ];

    let keys = depths.map(depth_key);

    assert!(
        keys.windows(2).all(|pair| pair[0] < pair[1]),
        "keys are not strictly increasing: {keys:08x?}"
    );
}

#[test]
fn test_depth_key_when_sorting_negative_view_depths_should_put_farthest_first() {
    let mut view_depths = vec![-5.0f32, -50.0, -0.5, -12.25];

    view_depths.sort_by_key(|&depth| depth_key(depth));

    assert_eq!(view_depths, vec![-50.0, -12.25, -5.0, -0.5]);
}

#[test]
fn test_depth_from_key_should_invert_depth_key() {
    for depth in [-123.5f32, -0.0, 0.0, 7.75] {
        let decoded = depth_from_key(depth_key(depth));

        assert_eq!(decoded.to_bits(), depth.to_bits());
    }
}
