//! Interaction modes built on the shared engine core.
//!
//! Every mode is a `ModeConfig` value consumed by one engine; there is no
//! per-mode controller. The config decides which gestures mean anything, what
//! a raycast may hit and which tracker features are switched on.
//!
//! ## Tool Manager Architecture
//!
//! `ToolManager` keeps exclusive mode activation:
//! - Only one mode is active at a time
//! - Entering a mode clears the scene, drops anchors and restarts tracking
//! - Switching to the active mode again is a no-op
//!
//! ### Gesture Flow
//!
//! ```text
//! GestureEvent
//!   └─> GestureInterpreter::interpret(event, mode config)
//!       └─> Intent
//!           └─> PlacementEngine dispatch
//!               ├─> RaycastAdapter::first()
//!               └─> ManipulationTarget / SceneGraph mutation
//! ```
//!
//! ## Available Modes
//!
//! ### Place Model (`Mode::PlaceModel`)
//! - Tap places the model on a detected plane, a later tap relocates it
//! - Pan drags it across surfaces, pinch scales, two-finger rotate turns it
//! - Missing model asset fails the tap and leaves the scene untouched
//!
//! ### Place Video (`Mode::PlaceVideo`)
//! - Tap places a 16:9 video plane flat on floors or upright on walls
//! - Tapping the video toggles playback; the clip loops
//!
//! ### Measure (`Mode::Measure`)
//! - Long press sets the start point, the end follows the finger each frame
//! - Release drops the end marker; the line stays until a tap clears it
//! - Distance is reported in centimetres
//!
//! ### Draw (`Mode::Draw`)
//! - Pan captures feature points into a stroke joined by thin segments
//! - Starting a new stroke wipes the previous drawing
//!
//! ### Grow (`Mode::Grow`)
//! - Every tap plants a small tree that grows to full size over three seconds
//!
//! ### Detect Images / Track Face
//! - No gestures; overlays follow image and face anchors
//!
//! ## Gesture Handling
//!
//! - Taps and pans starting inside the reserved top strip are ignored
//! - Pinch and rotate intents carry the change since the previous sample
//! - Pinch multipliers are clamped per update unless the config disables it

pub mod draw;
pub mod gesture;
pub mod manipulation;
pub mod measure;
pub mod placement;
pub mod sampler;
pub mod tool_manager;
