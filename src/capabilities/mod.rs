mod camera;
mod geolocation;

pub use self::camera::{Camera, CameraError, CameraOperation, ImageRef, ShotResult};
pub use self::geolocation::{
    Geolocation, GeolocationError, GeolocationOperation, Position, PositionResult,
};

// Crux's built-in Render capability covers view invalidation as-is.
pub use crux_core::render::Render;

use crate::{App, Event};

pub type AppRender = Render<Event>;
pub type AppGeolocation = Geolocation<Event>;
pub type AppCamera = Camera<Event>;

#[derive(crux_core::macros::Effect)]
#[effect(app = "App")]
pub struct Capabilities {
    pub render: Render<Event>,
    pub geolocation: Geolocation<Event>,
    pub camera: Camera<Event>,
}
