//! Reflection balls simulation library
//!
//! Bodies fall into a bounded region, bounce off its walls and exchange
//! momentum with each other. The same engine drives a 2D canvas of discs and a
//! 3D room of spheres that take damage and flash on impact.

pub mod body;
pub mod bounds;
pub mod collision;
pub mod config;
pub mod constants;
pub mod effect;
pub mod error;
pub mod graphics;
pub mod render;
pub mod rendering;
pub mod simulation;
pub mod spawn;
pub mod vector;
pub mod world;
