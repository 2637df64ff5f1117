// VR Teleport Locomotion
//
// Point-and-jump movement: simulate a ballistic arc from the aiming hand,
// validate the landing against the navigable surface, draw a smooth path and
// destination marker, then relocate through a short screen fade.

pub mod spline_path;
pub mod targeting;
pub mod trajectory;
pub mod transition;

pub use spline_path::{PathSegment, SplinePath};
pub use targeting::{DestinationMarker, TeleportTarget};
pub use trajectory::ArcTrajectory;
pub use transition::{TeleportPhase, TeleportTransition};
