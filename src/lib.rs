//! Reads Quake-family `.map` files into an entity/brush/face tree and
//! rebuilds every brush as an explicit convex polytope.
//!
//! ```no_run
//! use brushmap::{qmap::ParseOptions, scene};
//!
//! let text = std::fs::read_to_string("level.map").unwrap();
//! let scene = scene::load(&text, &ParseOptions::default()).unwrap();
//!
//! if let Some(world) = scene.world() {
//!     for face in world.brushes.iter().flat_map(|b| &b.faces) {
//!         println!("{} {:?}", face.texture, face.vertices);
//!     }
//! }
//! ```

pub mod common;
pub mod geometry;
pub mod qmap;
pub mod scene;
