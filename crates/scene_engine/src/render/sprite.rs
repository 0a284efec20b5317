//! Textured quads
//!
//! [`Image`] is the stock rendered entity type. All images share one shader
//! and one quad vertex array owned by [`ImageProtocol`]; textures are created
//! on first use per label and released with the protocol.

use std::collections::HashMap;

use log::debug;

use super::dispatch::{RenderFrame, RenderProtocol, Renderable};
use super::graphics::{
    DrawCall, GraphicsContext, GraphicsError, GraphicsResult, ResourceHandle, ResourceKind, Viewport,
};
use crate::foundation::math::{Mat4, Vec2, Vec3};
use crate::scene::{EntityBehavior, EntityCore, Property, SceneResult};

const QUAD_VERTICES: u32 = 4;

/// Entity behavior drawing a textured rectangle
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    texture: String,
    size: Vec2,
}

impl Image {
    /// Create an image of `width` x `height` pixels showing `texture`
    pub fn new(texture: impl Into<String>, width: f32, height: f32) -> Self {
        Self {
            texture: texture.into(),
            size: Vec2::new(width, height),
        }
    }

    /// Texture label
    pub fn texture(&self) -> &str {
        &self.texture
    }

    /// Natural size in pixels
    pub fn size(&self) -> Vec2 {
        self.size
    }

    /// Change the natural size
    pub fn set_size(&mut self, width: f32, height: f32) {
        self.size = Vec2::new(width, height);
    }

    /// Size actually drawn: stretched axes take the viewport extent
    pub fn draw_size(&self, entity: &EntityCore, viewport: Viewport) -> Vec2 {
        let width = if entity.property(Property::StretchX) {
            viewport.width as f32
        } else {
            self.size.x
        };
        let height = if entity.property(Property::StretchY) {
            viewport.height as f32
        } else {
            self.size.y
        };
        Vec2::new(width, height)
    }
}

impl EntityBehavior for Image {
    fn render(&self, entity: &EntityCore, frame: &mut RenderFrame<'_>) -> SceneResult<()> {
        frame.submit(self, entity)?;
        Ok(())
    }
}

impl Renderable for Image {
    type Protocol = ImageProtocol;
}

/// Shared resources and draw logic for every [`Image`]
#[derive(Debug, Default)]
pub struct ImageProtocol {
    shader: Option<ResourceHandle>,
    quad: Option<ResourceHandle>,
    textures: HashMap<String, ResourceHandle>,
}

impl ImageProtocol {
    /// Shared shader, once initialized
    pub fn shader(&self) -> Option<ResourceHandle> {
        self.shader
    }

    /// Number of textures created so far
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    fn texture_for(&mut self, label: &str, gfx: &mut dyn GraphicsContext) -> GraphicsResult<ResourceHandle> {
        if let Some(&handle) = self.textures.get(label) {
            return Ok(handle);
        }
        let handle = gfx.create_resource(ResourceKind::Texture, label)?;
        self.textures.insert(label.to_string(), handle);
        Ok(handle)
    }
}

impl RenderProtocol for ImageProtocol {
    type Target = Image;

    fn init(&mut self, gfx: &mut dyn GraphicsContext) -> GraphicsResult<()> {
        self.shader = Some(gfx.create_resource(ResourceKind::Shader, "image")?);
        self.quad = Some(gfx.create_resource(ResourceKind::VertexArray, "image-quad")?);
        debug!("Image protocol initialized");
        Ok(())
    }

    fn render(&mut self, target: &Image, entity: &EntityCore, gfx: &mut dyn GraphicsContext) -> GraphicsResult<()> {
        let (Some(shader), Some(quad)) = (self.shader, self.quad) else {
            return Err(GraphicsError::NotInitialized);
        };
        let texture = self.texture_for(target.texture(), gfx)?;

        let size = target.draw_size(entity, gfx.viewport());
        let model = entity.world_matrix() * Mat4::new_nonuniform_scaling(&Vec3::new(size.x, size.y, 1.0));

        gfx.bind(shader)?;
        gfx.bind(texture)?;
        gfx.draw(DrawCall {
            shader,
            vertex_array: quad,
            texture: Some(texture),
            model,
            vertex_count: QUAD_VERTICES,
        })?;
        gfx.unbind(texture)?;
        gfx.unbind(shader)
    }

    fn destroy(&mut self, gfx: &mut dyn GraphicsContext) -> GraphicsResult<()> {
        let mut first_error = None;
        let handles = self
            .textures
            .drain()
            .map(|(_, handle)| handle)
            .chain(self.quad.take())
            .chain(self.shader.take());
        for handle in handles.collect::<Vec<_>>() {
            if let Err(err) = gfx.release(handle) {
                first_error = first_error.or(Some(err));
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{GraphicsCommand, HeadlessGraphics, RenderDispatch};
    use crate::scene::Scene;
    use approx::assert_relative_eq;

    fn setup() -> (Scene, RenderDispatch, HeadlessGraphics) {
        let mut gfx = HeadlessGraphics::new();
        gfx.init(800, 600).unwrap();
        (Scene::new(), RenderDispatch::new(), gfx)
    }

    fn render(scene: &Scene, root: crate::scene::EntityId, dispatch: &mut RenderDispatch, gfx: &mut HeadlessGraphics) {
        let mut frame = RenderFrame::new(dispatch, gfx);
        scene.render(root, &mut frame).unwrap();
        dispatch.render_frame(scene, gfx).unwrap();
    }

    #[test]
    fn test_images_share_protocol_resources() {
        let (mut scene, mut dispatch, mut gfx) = setup();
        let root = scene.spawn_group();
        let a = scene.spawn(Image::new("ship", 32.0, 16.0));
        let b = scene.spawn(Image::new("ship", 8.0, 8.0));
        scene.add_child(root, a).unwrap();
        scene.add_child(root, b).unwrap();
        scene.init(root).unwrap();

        render(&scene, root, &mut dispatch, &mut gfx);
        render(&scene, root, &mut dispatch, &mut gfx);

        let creates = gfx
            .commands()
            .iter()
            .filter(|command| matches!(command, GraphicsCommand::Create(..)))
            .count();
        assert_eq!(creates, 3, "one shader, one quad, one texture");
        assert_eq!(gfx.draws().len(), 4);
        assert_eq!(dispatch.protocol_count(), 1);
    }

    #[test]
    fn test_stretch_flags_use_viewport() {
        let (mut scene, mut dispatch, mut gfx) = setup();
        let image = scene.spawn(Image::new("bg", 10.0, 20.0));
        scene.set_property(image, Property::StretchX, true).unwrap();
        scene.init(image).unwrap();

        render(&scene, image, &mut dispatch, &mut gfx);

        let draw = gfx.draws()[0].clone();
        assert_relative_eq!(draw.model[(0, 0)], 800.0);
        assert_relative_eq!(draw.model[(1, 1)], 20.0);
    }

    #[test]
    fn test_destroy_releases_everything() {
        let (mut scene, mut dispatch, mut gfx) = setup();
        let image = scene.spawn(Image::new("tex", 1.0, 1.0));
        scene.init(image).unwrap();
        render(&scene, image, &mut dispatch, &mut gfx);
        assert_eq!(gfx.live_resources(), 3);

        dispatch.destroy(&mut gfx).unwrap();
        assert_eq!(gfx.live_resources(), 0);
    }

    #[test]
    fn test_texture_failure_surfaces_as_render_error() {
        let mut gfx = HeadlessGraphics::new().fail_resource("missing");
        gfx.init(10, 10).unwrap();
        let mut dispatch = RenderDispatch::new();
        let mut scene = Scene::new();
        let image = scene.spawn(Image::new("missing", 1.0, 1.0));
        scene.init(image).unwrap();

        let mut frame = RenderFrame::new(&mut dispatch, &mut gfx);
        scene.render(image, &mut frame).unwrap();
        let err = dispatch.render_frame(&scene, &mut gfx).unwrap_err();
        assert!(matches!(err, crate::render::RenderError::Graphics(_)));
        assert_eq!(dispatch.queued_len(), 0);
    }
}
