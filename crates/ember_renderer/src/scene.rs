//! Renderable scene: acceleration structure, camera and settings.

use crate::{BvhNode, Camera, Hittable, RenderError};
use ember_core::SceneSettings;
use log::info;

/// A validated scene ready to render.
///
/// Immutable once built and shared read-only by every render worker.
pub struct Scene {
    world: BvhNode,
    camera: Camera,
    settings: SceneSettings,
}

impl Scene {
    /// Validate `settings` and build the BVH over `objects`.
    ///
    /// Object boxes cover the camera's whole shutter interval.
    pub fn new(objects: Vec<Box<dyn Hittable>>, settings: SceneSettings) -> Result<Self, RenderError> {
        settings.validate()?;

        let camera = Camera::from_settings(
            &settings.camera,
            settings.render.image_width,
            settings.render.image_height(),
        );

        let count = objects.len();
        let world = BvhNode::new(objects, camera.shutter())?;
        info!("Scene ready: {} objects, BVH depth {}", count, world.depth());

        Ok(Self {
            world,
            camera,
            settings,
        })
    }

    pub fn world(&self) -> &BvhNode {
        &self.world
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn settings(&self) -> &SceneSettings {
        &self.settings
    }
}
