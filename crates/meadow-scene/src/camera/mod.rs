//! Perspective camera and orbit controls.

mod orbit;
mod perspective;

pub use orbit::OrbitControls;
pub use perspective::PerspectiveCamera;

/// Camera controller advanced once per frame tick.
pub trait CameraControls {
    /// Applies pending input and damping to `camera`. Returns `true` if the
    /// camera moved.
    fn update(&mut self, camera: &mut PerspectiveCamera) -> bool;
}
