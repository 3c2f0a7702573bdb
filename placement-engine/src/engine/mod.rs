//! Core spatial model shared by every interaction mode.
//!
//! Everything here is renderer-agnostic. The tracker is reached through the
//! `TrackingSession` trait and the renderer only ever sees `SceneCommand`s.
//!
//! ## Coordinate Conventions
//!
//! - World space is the tracker's frame: metres, +Y up
//! - Screen space has its origin top-left, y grows downwards
//! - Plane anchors use local +Y as their normal; extent is measured in local XZ
//! - Flat node geometry (planes, labels) lies in local XY facing +Z
//!
//! ## Modules
//!
//! - `geometry`: distances, midpoints and the connector orientation used for
//!   every line the engine draws
//! - `camera` / `ray`: screen point to world ray, and the slab/plane tests
//! - `anchors`: plane, image and face anchors as reported by the tracker
//! - `raycast`: `RaycastAdapter::query` against surfaces, feature points or
//!   placed nodes, nearest hit first
//! - `scene_graph`: sole owner of placed nodes; enforces one primary node per
//!   kind and ties overlay lifetimes to their anchors
//! - `commands`: the outbound render queue
//! - `session`: tracker contract and run options
//! - `prerequisites`: one-shot capability and permission check
//!
//! ### Anchor Overlay Flow
//!
//! ```text
//! Tracker callback
//!   └─> PlacementEngine::on_anchor_*()
//!       ├─> AnchorTable::upsert()/remove()
//!       └─> SceneGraph::on_anchor_*()
//!           ├─> Plane: overlay resized every update
//!           ├─> Image: label + connector, static once created
//!           └─> Face: mesh replaced every update
//! ```

pub mod anchors;
pub mod camera;
pub mod commands;
pub mod geometry;
pub mod prerequisites;
pub mod ray;
pub mod raycast;
pub mod scene_graph;
pub mod session;
