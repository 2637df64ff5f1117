// stridevr - VR locomotion and interaction gameplay layer
//
// Room-scale tracking reconciliation, arc teleportation, paired-hand
// climbing, and the comfort vignette, driven by a host runtime that owns
// rendering, physics, and input capture. The host hands an `InputContext`
// and its query engines to `LocomotionController::update` once per tick and
// reads the presentation state back out.

pub mod body;
pub mod config;
pub mod environment;
pub mod events;
pub mod hand_controller;
pub mod haptics;
pub mod input_context;
pub mod locomotion;
pub mod teleport;
pub mod time;
pub mod vignette;

pub use body::{CharacterBody, MovementMode};
pub use config::{ConfirmButton, LocomotionConfig, TeleportTuning, VignetteConfig};
pub use environment::{
    NavQueryEngine, StaticEnvironment, SurfaceFlags, SurfaceHit, SurfaceId, TraceQueryEngine,
};
pub use events::{LocomotionEvent, TeleportRejection};
pub use hand_controller::{ClimbState, HandController, HandRig};
pub use haptics::{HapticSink, NullHaptics};
pub use input_context::{Hand, Handedness, Head, InputContext};
pub use locomotion::LocomotionController;
pub use teleport::{DestinationMarker, PathSegment, TeleportPhase};
pub use time::Time;
pub use vignette::{ViewContext, VignetteParams};
