//! Wireframe scene geometry.
//!
//! Bodies are vertex/edge lists in their local frame; the render endpoint
//! places them with the simulation's position and orientation quaternions
//! and projects the edges through the camera.

use nalgebra::{UnitQuaternion, Vector3};
use std::f64::consts::PI;

/// A wireframe mesh: vertices in the body frame plus index-pair edges.
#[derive(Debug, Clone)]
pub struct Wireframe {
    pub vertices: Vec<Vector3<f64>>,
    pub edges: Vec<(usize, usize)>,
}

impl Wireframe {
    fn new() -> Self {
        Self {
            vertices: Vec::new(),
            edges: Vec::new(),
        }
    }

    /// Vertices transformed into the world frame.
    pub fn placed(
        &self,
        rotation: &UnitQuaternion<f64>,
        translation: Vector3<f64>,
    ) -> Vec<Vector3<f64>> {
        self.vertices
            .iter()
            .map(|v| rotation * v + translation)
            .collect()
    }
}

/// Latitude/longitude sphere shell. `density` longitude steps per ring,
/// `2·density + 1` rings pole to pole.
pub fn sphere(radius: f64, density: usize) -> Wireframe {
    let mut mesh = Wireframe::new();

    for i in 0..=(2 * density) {
        let alpha = 0.5 * PI * (i as f64 - density as f64) / density as f64;
        for j in 0..density {
            let theta = 2.0 * PI * j as f64 / density as f64;
            let ring = radius * alpha.cos();

            mesh.vertices.push(Vector3::new(
                ring * theta.cos(),
                ring * theta.sin(),
                radius * alpha.sin(),
            ));
        }
    }

    for i in 0..(2 * density) {
        for j in 0..density {
            let a = i * density + j;
            let b = i * density + (j + 1) % density;
            let c = (i + 1) * density + j;

            mesh.edges.push((a, b));
            mesh.edges.push((a, c));
        }
    }

    mesh
}

/// Platform disk: a rim polygon with cross spokes, extruded by `thickness`.
pub fn platform(width: f64, thickness: f64) -> Wireframe {
    let mut mesh = Wireframe::new();
    let sides = 16;
    let radius = 0.5 * width;

    for level in 0..2 {
        let z = -0.5 * thickness + level as f64 * thickness;
        for j in 0..sides {
            let theta = 2.0 * PI * j as f64 / sides as f64;
            mesh.vertices
                .push(Vector3::new(radius * theta.cos(), radius * theta.sin(), z));
        }
    }

    for level in 0..2 {
        let base = level * sides;
        for j in 0..sides {
            mesh.edges.push((base + j, base + (j + 1) % sides));
        }
    }
    // verticals and cross spokes
    for j in 0..sides {
        mesh.edges.push((j, sides + j));
    }
    mesh.edges.push((0, sides / 2));
    mesh.edges.push((sides / 4, 3 * sides / 4));

    mesh
}

/// Pendulum arm: a square-section rod hanging down `length` from the pivot.
pub fn pendulum(thickness: f64, length: f64) -> Wireframe {
    let mut mesh = Wireframe::new();
    let half = 0.5 * thickness;

    for level in 0..2 {
        let z = -(level as f64) * length;
        mesh.vertices.push(Vector3::new(-half, -half, z));
        mesh.vertices.push(Vector3::new(half, -half, z));
        mesh.vertices.push(Vector3::new(half, half, z));
        mesh.vertices.push(Vector3::new(-half, half, z));
    }

    for level in 0..2 {
        let base = level * 4;
        for j in 0..4 {
            mesh.edges.push((base + j, base + (j + 1) % 4));
        }
    }
    for j in 0..4 {
        mesh.edges.push((j, 4 + j));
    }

    mesh
}

/// Ground grid of `(2·extent)²` squares of side `square_size`.
pub fn ground(square_size: f64, extent: i64) -> Wireframe {
    let mut mesh = Wireframe::new();
    let span = 2 * extent + 1;

    for x in -extent..=extent {
        for y in -extent..=extent {
            mesh.vertices.push(Vector3::new(
                x as f64 * square_size,
                y as f64 * square_size,
                0.0,
            ));
        }
    }

    for i in 0..span {
        for j in 0..span {
            let a = (i * span + j) as usize;
            if j + 1 < span {
                mesh.edges.push((a, a + 1));
            }
            if i + 1 < span {
                mesh.edges.push((a, a + span as usize));
            }
        }
    }

    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Unit;

    #[test]
    fn sphere_vertices_sit_on_the_shell() {
        let mesh = sphere(1.5, 8);

        assert_eq!(mesh.vertices.len(), 17 * 8);
        for v in &mesh.vertices {
            assert_relative_eq!(v.norm(), 1.5, epsilon = 1e-9);
        }
    }

    #[test]
    fn sphere_edges_index_valid_vertices() {
        let mesh = sphere(1.0, 12);

        for &(a, b) in &mesh.edges {
            assert!(a < mesh.vertices.len());
            assert!(b < mesh.vertices.len());
            assert_ne!(a, b);
        }
    }

    #[test]
    fn ground_grid_is_flat() {
        let mesh = ground(2.0, 10);

        assert_eq!(mesh.vertices.len(), 21 * 21);
        assert!(mesh.vertices.iter().all(|v| v.z == 0.0));
    }

    #[test]
    fn placed_applies_rotation_then_translation() {
        let mesh = pendulum(0.1, 0.7);
        let flip = UnitQuaternion::from_axis_angle(&Unit::new_normalize(Vector3::x()), PI);
        let lift = Vector3::new(0.0, 0.0, 1.0);

        let placed = mesh.placed(&flip, lift);

        // The rod tip (-0.05, -0.05, -0.7) flips up above the pivot.
        assert_relative_eq!(placed[4].z, 1.7, epsilon = 1e-9);
        assert_relative_eq!(placed[0].z, 1.0, epsilon = 1e-9);
    }
}
