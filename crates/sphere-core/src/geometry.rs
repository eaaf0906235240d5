//! Mesh data uploaded once at bootstrap.

use std::f32::consts::PI;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SphereVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

pub struct SphereMesh {
    pub vertices: Vec<SphereVertex>,
    pub indices: Vec<u32>,
}

/// Latitude/longitude sphere. Row 0 is the north pole; uv.y runs 1 -> 0 from
/// north to south so photos sample upright with flipped-y image rows.
pub fn uv_sphere(radius: f32, width_segments: u32, height_segments: u32) -> SphereMesh {
    let ws = width_segments.max(3);
    let hs = height_segments.max(2);
    let mut vertices = Vec::with_capacity(((ws + 1) * (hs + 1)) as usize);
    for iy in 0..=hs {
        let v = iy as f32 / hs as f32;
        for ix in 0..=ws {
            let u = ix as f32 / ws as f32;
            let x = -radius * (u * 2.0 * PI).cos() * (v * PI).sin();
            let y = radius * (v * PI).cos();
            let z = radius * (u * 2.0 * PI).sin() * (v * PI).sin();
            let len = (x * x + y * y + z * z).sqrt().max(1e-6);
            vertices.push(SphereVertex {
                position: [x, y, z],
                normal: [x / len, y / len, z / len],
                uv: [u, 1.0 - v],
            });
        }
    }

    let row = ws + 1;
    let mut indices = Vec::with_capacity((ws * (hs - 1) * 6) as usize);
    for iy in 0..hs {
        for ix in 0..ws {
            let a = iy * row + ix + 1;
            let b = iy * row + ix;
            let c = (iy + 1) * row + ix;
            let d = (iy + 1) * row + ix + 1;
            // pole rows collapse to a single triangle per cell
            if iy != 0 {
                indices.extend_from_slice(&[a, b, d]);
            }
            if iy != hs - 1 {
                indices.extend_from_slice(&[b, c, d]);
            }
        }
    }
    SphereMesh { vertices, indices }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_and_index_counts() {
        let mesh = uv_sphere(1.0, 16, 8);
        assert_eq!(mesh.vertices.len(), 17 * 9);
        assert_eq!(mesh.indices.len(), (16 * (2 * 8 - 2) * 3) as usize);
        let max = *mesh.indices.iter().max().unwrap() as usize;
        assert!(max < mesh.vertices.len());
    }

    #[test]
    fn vertices_lie_on_radius() {
        let mesh = uv_sphere(1.3, 12, 6);
        for v in &mesh.vertices {
            let [x, y, z] = v.position;
            assert!(((x * x + y * y + z * z).sqrt() - 1.3).abs() < 1e-4);
        }
    }
}
