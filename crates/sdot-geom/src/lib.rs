//! # sdot-geom: Reference Laguerre-Diagram Builder
//!
//! A convex-domain `LaguerreDiagramBuilder` implementation built from
//! first-principles computational geometry: half-plane (Sutherland-Hodgman)
//! clipping of the domain boundary against every other seed's bisector,
//! fan triangulation of the resulting convex cells, and adjacency recovered
//! by hashing triangle edges on their merged vertex indices.
//!
//! This crate exists so the workspace has a working, dependency-light
//! builder to exercise `sdot-algo` end to end; a production deployment
//! would likely swap in a builder backed by a real computational-geometry
//! library for non-convex domains and degenerate configurations.
//!
//! ## Modules
//!
//! - [`clip`] — half-plane clipping and boundary-loop extraction.
//! - [`builder`] — [`builder::NaiveLaguerreBuilder`], the
//!   `LaguerreDiagramBuilder` implementation.

pub mod builder;
pub mod clip;

pub use builder::NaiveLaguerreBuilder;
