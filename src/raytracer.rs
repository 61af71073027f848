/// The `raytracer` module serves as the foundation for a ray tracing engine.
///
/// This module orchestrates the core components of a ray tracing engine:
/// objects, rays, intersections, materials, scenes, lighting, camera, and the
/// scene-language parser that builds a scene's object graph from a `.pov`
/// source file. It also includes a module for rendering scenes to a canvas.
///
/// Modules:
/// - `object`: Defines the geometric objects that can be rendered in the scene.
/// - `ray`: Represents rays that can intersect with objects in the scene.
/// - `intersection`: Handles the calculation and storage of intersections between rays and objects.
/// - `computations`: Provides utilities for calculating shading, lighting, and reflections.
/// - `material`: Defines the material properties of objects, such as color and reflectiveness.
/// - `scene`: Represents the collection of objects and lights that make up a scene to be rendered.
/// - `light`: Defines the light sources in the scene.
/// - `camera`: Manages the viewpoint from which the scene is rendered.
/// - `canvas`: A module for creating and manipulating the canvas on which scenes are rendered.
/// - `flags`: The primitive/CSG attribute bitset (spec §3's essential-attributes flags).
/// - `error`: The crate-wide parse/runtime error enum.
/// - `parser`: The scene-language lexer, symbol table, expression evaluator and
///   recursive-descent object grammar (spec §4.3) that builds the object graph
///   this module exposes to the renderer.

pub(crate) mod object;
pub(crate) mod ray;
pub(crate) mod intersection;
mod computations;
pub(crate) mod material;
pub(crate) mod scene;
pub(crate) mod light;
pub(crate) mod camera;
pub(crate) mod canvas;
pub mod flags;
pub mod error;
pub mod parser;