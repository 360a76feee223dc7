//! # sdot-core: Semi-Discrete Optimal Transport — Core Types
//!
//! Provides the data contracts shared by every other crate in this
//! workspace: the transport domain, seeds and target masses, the Laguerre
//! diagram adapter, mesh primitives, the persisted-state format, and the
//! error taxonomy.
//!
//! ## Design Philosophy
//!
//! The core treats Laguerre-diagram construction as an external
//! collaborator reached through the [`diagram::LaguerreDiagramBuilder`]
//! trait. Everything in this crate is pure data and pure functions: no
//! solving, no I/O beyond [`persist`], no global state.
//!
//! ## Modules
//!
//! - [`domain`] — the transport domain Ω.
//! - [`seeds`] — seed points and target masses.
//! - [`diagram`] — the diagram adapter (C4) and `LaguerreDiagramBuilder`.
//! - [`mesh`] — triangle area, edge length, the `NO_INDEX` sentinel.
//! - [`persist`] — the `{ψ, seeds, domain}` binary blob format.
//! - [`error`] — the `SdotError` taxonomy.

pub mod diagram;
pub mod domain;
pub mod error;
pub mod mesh;
pub mod persist;
pub mod seeds;

pub use diagram::{adapt, Diagram, LaguerreDiagramBuilder, RawDiagram};
pub use domain::Domain;
pub use error::{SdotError, SdotResult};
pub use persist::PersistedState;
pub use seeds::{Seeds, TargetMasses};
