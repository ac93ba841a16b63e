// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use inspect_lite_geometry::{
    Aabb, CollisionDetector, CollisionKind, EngineConfig, Mesh, PathSample, Point3, VoxelGrid,
};

fn column_grid() -> VoxelGrid {
    let bounds = Aabb::new(Point3::new(-10.0, -10.0, 0.0), Point3::new(10.0, 10.0, 20.0));
    VoxelGrid::empty(bounds, 64)
}

fn vertical_path() -> [PathSample; 2] {
    [PathSample::new(0.0, 0.0, 0.0), PathSample::new(0.0, 0.0, 20.0)]
}

#[test]
fn segment_through_occupied_slab_collides() {
    let mut grid = column_grid();
    grid.mark_region(&Point3::new(-10.0, -10.0, 9.0), &Point3::new(10.0, 10.0, 11.0));
    let detector = CollisionDetector::with_grid(grid);

    let result = detector.detect(&vertical_path());
    assert!(result.has_collision);
    assert_eq!(result.collision_count, 1);

    let hit = result.collisions[0];
    assert_eq!(hit.kind, CollisionKind::Segment);
    assert_eq!(hit.path_index, 0);
    assert!(hit.z > 8.0 && hit.z < 11.0);
    // Close to the grid center
    assert!(hit.severity > 0.9);
}

#[test]
fn segment_through_empty_grid_is_clear() {
    let detector = CollisionDetector::with_grid(column_grid());
    let result = detector.detect(&vertical_path());
    assert!(!result.has_collision);
    assert!(result.collisions.is_empty());
}

#[test]
fn flight_into_wall_reports_point_and_segment() {
    // Vertical wall in the plane x = 5, 10 wide and 10 tall
    let wall = Mesh::new(
        vec![
            5.0, 0.0, 0.0, 5.0, 10.0, 0.0, 5.0, 10.0, 10.0, 5.0, 0.0, 10.0,
        ],
        Some(vec![0, 1, 2, 0, 2, 3]),
    );
    let detector = CollisionDetector::new(&wall.view(), &EngineConfig::default());

    let path = [
        PathSample::new(0.0, 5.0, 5.0),
        PathSample::new(5.0, 5.0, 5.0),
        PathSample::new(5.0, 5.0, 20.0),
    ];
    let result = detector.detect(&path);
    let shape: Vec<_> = result
        .collisions
        .iter()
        .map(|c| (c.path_index, c.kind))
        .collect();

    println!("wall collisions: {:?}", shape);
    assert_eq!(
        shape,
        vec![
            (0, CollisionKind::Segment),
            (1, CollisionKind::Point),
            (1, CollisionKind::Segment),
        ]
    );
    assert_eq!(result.collision_count, 3);
    for c in &result.collisions {
        assert!((0.0..=1.0).contains(&c.severity));
    }
}

#[test]
fn empty_mesh_never_collides() {
    let detector = CollisionDetector::new(&Mesh::default().view(), &EngineConfig::default());
    let result = detector.detect(&vertical_path());
    assert_eq!(result.collision_count, 0);
    assert!(!result.has_collision);
}

#[test]
fn voxel_resolution_comes_from_config() {
    let mesh = Mesh::soup(vec![0.0, 0.0, 0.0, 10.0, 0.0, 0.0, 0.0, 10.0, 5.0]);
    let config = EngineConfig::new().with_voxel_resolution(16);
    let detector = CollisionDetector::new(&mesh.view(), &config);

    assert_eq!(detector.grid().map(|g| g.resolution()), Some(16));
}
