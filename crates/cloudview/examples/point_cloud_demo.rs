//! Two random point clouds side by side.
//!
//! Run with: cargo run --example point_cloud_demo [output.png]
//!
//! The left cloud is a noisy sphere, the right one a flat disc. Press `+` to
//! grow the points, `r` to reset the camera, and `q` to close. If an output
//! path is given, the last frame is written there when the window closes.

use cloudview::*;
use ndarray::Array2;
use rand::Rng;

fn sphere(rng: &mut impl Rng, n: usize, radius: f32) -> (Array2<f32>, Array2<u8>) {
    let mut points = Array2::zeros((n, 3));
    let mut colors = Array2::zeros((n, 3));
    for i in 0..n {
        let theta = rng.gen_range(0.0..std::f32::consts::TAU);
        let z: f32 = rng.gen_range(-1.0..1.0);
        let r = radius * (1.0 + rng.gen_range(-0.05..0.05));
        let s = (1.0 - z * z).sqrt();
        points[[i, 0]] = r * s * theta.cos();
        points[[i, 1]] = r * s * theta.sin();
        points[[i, 2]] = r * z;

        colors[[i, 0]] = (127.5 * (s * theta.cos() + 1.0)) as u8;
        colors[[i, 1]] = (127.5 * (s * theta.sin() + 1.0)) as u8;
        colors[[i, 2]] = (127.5 * (z + 1.0)) as u8;
    }
    (points, colors)
}

fn disc(rng: &mut impl Rng, n: usize, radius: f32) -> (Array2<f32>, Array2<u8>) {
    let mut points = Array2::zeros((n, 3));
    let mut colors = Array2::zeros((n, 3));
    for i in 0..n {
        let theta = rng.gen_range(0.0..std::f32::consts::TAU);
        let r = radius * rng.gen::<f32>().sqrt();
        points[[i, 0]] = r * theta.cos();
        points[[i, 2]] = r * theta.sin();

        let shade = (255.0 * r / radius) as u8;
        colors[[i, 0]] = shade;
        colors[[i, 1]] = 64;
        colors[[i, 2]] = 255 - shade;
    }
    (points, colors)
}

fn main() -> Result<()> {
    let mut rng = rand::thread_rng();
    let (sphere_points, sphere_colors) = sphere(&mut rng, 20_000, 3.0);
    let (disc_points, disc_colors) = disc(&mut rng, 20_000, 4.0);

    let mut options = DisplayOptions::default()
        .with_title("point cloud demo")
        .with_labels(["sphere", "disc"]);
    if let Some(path) = std::env::args().nth(1) {
        options = options.with_output_path(path);
    }

    show_point_clouds(
        &[sphere_points, disc_points],
        &[sphere_colors, disc_colors],
        &options,
    )
}
