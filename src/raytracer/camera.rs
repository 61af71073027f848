use std::sync::{Arc, Mutex};
use crate::matrix::Matrix;
use crate::tuple::Tuple;
use crate::raytracer::canvas::Canvas;
use indicatif::ProgressBar;
use rayon::iter::ParallelBridge;
use rayon::prelude::ParallelIterator;
use crate::raytracer::ray::Ray;
use crate::raytracer::scene::Scene;

/// Represents a camera in the raytracer scene.
///
/// The camera is defined by its horizontal size (`hsize`), vertical size (`vsize`),
/// field of view (`field_of_view`), and a transformation matrix (`transform`) that
/// positions and orients the camera in the scene. The `pixel_size`, `half_width`,
/// and `half_height` are calculated based on the camera's field of view and aspect ratio.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct Camera {
    pub hsize: usize,
    pub vsize: usize,
    pub field_of_view: f64,
    pub transform: Matrix,
    pub pixel_size: f64,
    pub half_width: f64,
    pub half_height: f64,
}

impl Camera {
    /// Constructs a new `Camera` with the given size and field of view.
    ///
    /// # Arguments
    ///
    /// * `hsize` - The horizontal size of the camera's view.
    /// * `vsize` - The vertical size of the camera's view.
    /// * `field_of_view` - The camera's field of view in radians.
    ///
    /// # Returns
    ///
    /// A new `Camera` instance.
    pub fn new(hsize: usize, vsize: usize, field_of_view: f64) -> Camera {
        let half_view = (field_of_view / 2.0).tan();
        let aspect = hsize as f64 / vsize as f64;
        let half_width;
        let half_height;
        if aspect >= 1.0 {
            half_width = half_view;
            half_height = half_view / aspect;
        } else {
            half_width = half_view * aspect;
            half_height = half_view;
        }
        let pixel_size = (half_width * 2.0) / hsize as f64;
        Camera {
            hsize,
            vsize,
            field_of_view,
            transform: Matrix::identity(4),
            pixel_size,
            half_width,
            half_height,
        }
    }

    /// Calculates the ray from the camera to a specific pixel on the canvas.
    ///
    /// # Arguments
    ///
    /// * `px` - The x-coordinate of the pixel on the canvas.
    /// * `py` - The y-coordinate of the pixel on the canvas.
    ///
    /// # Returns
    ///
    /// A `Ray` instance representing the ray from the camera to the specified pixel.
    pub fn ray_for_pixel(&self, px: usize, py: usize) -> Ray {
        // the offset from the edge of the canvas to the pixel's center
        let xoffset = (px as f64 + 0.5) * self.pixel_size;
        let yoffset = (py as f64 + 0.5) * self.pixel_size;

        // the untransformed coordinates of the pixel in world space
        // (remember that the camera looks toward -z, so +x is to the *left*)
        let world_x = self.half_width - xoffset;
        let world_y = self.half_height - yoffset;

        // using the camera matrix, transform the canvas point and the origin,
        // and then compute the ray's direction vector
        // (remember that the canvas is at z=-1)
        let inverse_transform = self.transform.inverse();
        let pixel = inverse_transform.multiply_tuple(&Tuple::point(world_x, world_y, -1.0));
        let origin = inverse_transform.multiply_tuple(&Tuple::point(0.0, 0.0, 0.0));
        let direction = pixel.subtract(&origin).normalize();
        Ray::new(origin, direction)
    }

    /// Renders the scene from the perspective of the camera.
    ///
    /// This method utilizes parallel processing to render the scene, improving performance
    /// for large images. It returns a `Canvas` that represents the rendered image.
    ///
    /// # Arguments
    ///
    /// * `scene` - A reference to the `Scene` that will be rendered.
    ///
    /// # Returns
    ///
    /// A `Canvas` instance representing the rendered image.
    pub fn render(&self, scene: &Scene) -> Canvas {
        let image = Arc::new(Mutex::new(Canvas::new(self.hsize, self.vsize)));
        let bar = ProgressBar::new((self.vsize * self.hsize) as u64);
        let iter = pixel_coordinates(self.vsize, self.hsize).par_bridge();
        iter.for_each(|(x, y)| {
            let ray = self.ray_for_pixel(x, y);
            let color = scene.color_at(&ray, 5);
            let mut image = image.lock().unwrap();
            image.write_pixel(x, y, color);
            drop(image); // unlock the mutex
            bar.inc(1);
        });
        bar.finish();
        Arc::try_unwrap(image).unwrap().into_inner().unwrap()
    }
}

/// Generates an iterator over the coordinates of each pixel in the canvas.
///
/// # Arguments
///
/// * `vsize` - The vertical size of the canvas.
/// * `hsize` - The horizontal size of the canvas.
///
/// # Returns
///
/// An iterator that yields tuples of (x, y) coordinates for each pixel.
pub fn pixel_coordinates(vsize: usize, hsize: usize) -> impl Iterator<Item = (usize, usize)> {
    (0..vsize).flat_map(move |y| (0..hsize).map(move |x| (x, y)))
}
