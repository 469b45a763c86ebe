//! # Primitive Shape Generation
//!
//! Procedural shapes that need no asset fetch. The viewer only uses a cube,
//! as the stand-in shown until the real model arrives.

use super::GeometryData;

/// Generate a cube centered at the origin with edges `size` units long.
///
/// Each face has its own four vertices so normals stay flat per face.
pub fn generate_cube(size: f32) -> GeometryData {
    let h = size * 0.5;
    let mut data = GeometryData::default();

    #[rustfmt::skip]
    let positions = [
        // Front face
        [-h, -h,  h], [ h, -h,  h], [ h,  h,  h], [-h,  h,  h],
        // Back face
        [-h, -h, -h], [-h,  h, -h], [ h,  h, -h], [ h, -h, -h],
        // Left face
        [-h, -h, -h], [-h, -h,  h], [-h,  h,  h], [-h,  h, -h],
        // Right face
        [ h, -h,  h], [ h, -h, -h], [ h,  h, -h], [ h,  h,  h],
        // Top face
        [-h,  h,  h], [ h,  h,  h], [ h,  h, -h], [-h,  h, -h],
        // Bottom face
        [-h, -h, -h], [ h, -h, -h], [ h, -h,  h], [-h, -h,  h],
    ];

    let face_normals = [
        [0.0, 0.0, 1.0],
        [0.0, 0.0, -1.0],
        [-1.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, -1.0, 0.0],
    ];

    data.vertices = positions.to_vec();
    data.normals = face_normals
        .iter()
        .flat_map(|normal| std::iter::repeat(*normal).take(4))
        .collect();

    // Two counter-clockwise triangles per face
    data.indices = (0..6u32)
        .flat_map(|face| {
            let base = face * 4;
            [base, base + 1, base + 2, base + 2, base + 3, base]
        })
        .collect();

    data
}
