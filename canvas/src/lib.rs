//! Detection-zone editor for camera stills.
//!
//! This crate is compiled to WebAssembly and runs in the browser. It owns the
//! full lifecycle of the zone canvas: translating raw DOM input events into
//! polygon edits, hit-testing vertices, and drawing the letterboxed camera
//! image with its zone overlay. The host layer is responsible only for wiring
//! DOM events to the engine and persisting the zone sets it receives through
//! [`engine::Action::ZonesChanged`].
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level engine and testable [`engine::EngineCore`] |
//! | [`doc`] | Zone types and the ordered [`doc::ZoneSet`] store |
//! | [`geom`] | Points, letterbox fitting, and polygon containment |
//! | [`input`] | Key events, selection references, and the editor mode machine |
//! | [`hit`] | Hit-testing against zone vertices and zone interiors |
//! | [`render`] | Scene rendering onto a 2D canvas context |
//! | [`consts`] | Shared numeric constants and palette |

pub mod consts;
pub mod doc;
pub mod engine;
pub mod geom;
pub mod hit;
pub mod input;
pub mod render;
