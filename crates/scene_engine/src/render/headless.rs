//! Headless graphics context
//!
//! Records every call as a [`GraphicsCommand`] instead of talking to a GPU.
//! Used by the demo binary and by tests that need to observe draw order.

use std::collections::HashMap;

use log::{debug, trace};

use super::graphics::{
    DrawCall, GraphicsContext, GraphicsError, GraphicsResult, ResourceHandle, ResourceKind, Viewport,
};

/// A recorded graphics call
#[derive(Debug, Clone, PartialEq)]
pub enum GraphicsCommand {
    /// `init(width, height)`
    Init(u32, u32),
    /// `begin_frame()`
    BeginFrame,
    /// `present()`
    Present,
    /// `resize(width, height)`
    Resize(u32, u32),
    /// `destroy()`
    Destroy,
    /// Resource created with its label
    Create(ResourceHandle, ResourceKind, String),
    /// `bind(handle)`
    Bind(ResourceHandle),
    /// `unbind(handle)`
    Unbind(ResourceHandle),
    /// `release(handle)`
    Release(ResourceHandle),
    /// `draw(call)`
    Draw(DrawCall),
}

#[derive(Debug, Clone)]
struct Resource {
    kind: ResourceKind,
    label: String,
}

/// Graphics context that records instead of drawing
#[derive(Debug, Default)]
pub struct HeadlessGraphics {
    initialized: bool,
    viewport: Viewport,
    next_handle: u64,
    resources: HashMap<ResourceHandle, Resource>,
    commands: Vec<GraphicsCommand>,
    frames_presented: u64,
    failing_labels: Vec<String>,
    fail_draws: bool,
}

impl HeadlessGraphics {
    /// Create an uninitialized context
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `create_resource` fail for resources with this label
    pub fn fail_resource(mut self, label: impl Into<String>) -> Self {
        self.failing_labels.push(label.into());
        self
    }

    /// Make every `draw` fail
    pub fn set_fail_draws(&mut self, fail: bool) {
        self.fail_draws = fail;
    }

    /// Every call recorded so far
    pub fn commands(&self) -> &[GraphicsCommand] {
        &self.commands
    }

    /// Recorded draws in submission order
    pub fn draws(&self) -> Vec<&DrawCall> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                GraphicsCommand::Draw(call) => Some(call),
                _ => None,
            })
            .collect()
    }

    /// Forget the recorded calls, keeping resources alive
    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    /// Number of live resources
    pub fn live_resources(&self) -> usize {
        self.resources.len()
    }

    /// Label a live resource was created with
    pub fn label_of(&self, handle: ResourceHandle) -> Option<&str> {
        self.resources.get(&handle).map(|resource| resource.label.as_str())
    }

    /// Number of `present` calls
    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    /// Whether `init` ran and `destroy` did not
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn ensure_initialized(&self) -> GraphicsResult<()> {
        if self.initialized {
            Ok(())
        } else {
            Err(GraphicsError::NotInitialized)
        }
    }

    fn resource(&self, handle: ResourceHandle) -> GraphicsResult<&Resource> {
        self.resources
            .get(&handle)
            .ok_or(GraphicsError::UnknownResource(handle))
    }

    fn expect_kind(&self, handle: ResourceHandle, expected: ResourceKind) -> GraphicsResult<()> {
        let actual = self.resource(handle)?.kind;
        if actual == expected {
            Ok(())
        } else {
            Err(GraphicsError::WrongResourceKind {
                handle,
                expected,
                actual,
            })
        }
    }
}

impl GraphicsContext for HeadlessGraphics {
    fn init(&mut self, width: u32, height: u32) -> GraphicsResult<()> {
        self.initialized = true;
        self.viewport = Viewport::new(width, height);
        self.commands.push(GraphicsCommand::Init(width, height));
        debug!("Headless graphics initialized at {width}x{height}");
        Ok(())
    }

    fn begin_frame(&mut self) -> GraphicsResult<()> {
        self.ensure_initialized()?;
        self.commands.push(GraphicsCommand::BeginFrame);
        Ok(())
    }

    fn present(&mut self) -> GraphicsResult<()> {
        self.ensure_initialized()?;
        self.frames_presented += 1;
        self.commands.push(GraphicsCommand::Present);
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) -> GraphicsResult<()> {
        self.ensure_initialized()?;
        self.viewport = Viewport::new(width, height);
        self.commands.push(GraphicsCommand::Resize(width, height));
        Ok(())
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn destroy(&mut self) -> GraphicsResult<()> {
        if !self.initialized {
            return Ok(());
        }
        if !self.resources.is_empty() {
            debug!("Dropping {} live resources with the context", self.resources.len());
        }
        self.resources.clear();
        self.initialized = false;
        self.commands.push(GraphicsCommand::Destroy);
        Ok(())
    }

    fn create_resource(&mut self, kind: ResourceKind, label: &str) -> GraphicsResult<ResourceHandle> {
        self.ensure_initialized()?;
        if self.failing_labels.iter().any(|failing| failing == label) {
            return Err(GraphicsError::ResourceCreationFailed {
                kind,
                label: label.to_string(),
                reason: "injected failure".to_string(),
            });
        }

        self.next_handle += 1;
        let handle = ResourceHandle(self.next_handle);
        self.resources.insert(
            handle,
            Resource {
                kind,
                label: label.to_string(),
            },
        );
        self.commands
            .push(GraphicsCommand::Create(handle, kind, label.to_string()));
        trace!("Created {kind:?} '{label}' as {handle:?}");
        Ok(handle)
    }

    fn bind(&mut self, handle: ResourceHandle) -> GraphicsResult<()> {
        self.resource(handle)?;
        self.commands.push(GraphicsCommand::Bind(handle));
        Ok(())
    }

    fn unbind(&mut self, handle: ResourceHandle) -> GraphicsResult<()> {
        self.resource(handle)?;
        self.commands.push(GraphicsCommand::Unbind(handle));
        Ok(())
    }

    fn release(&mut self, handle: ResourceHandle) -> GraphicsResult<()> {
        self.resources
            .remove(&handle)
            .ok_or(GraphicsError::UnknownResource(handle))?;
        self.commands.push(GraphicsCommand::Release(handle));
        Ok(())
    }

    fn draw(&mut self, call: DrawCall) -> GraphicsResult<()> {
        self.ensure_initialized()?;
        if self.fail_draws {
            return Err(GraphicsError::Backend("injected draw failure".to_string()));
        }
        self.expect_kind(call.shader, ResourceKind::Shader)?;
        self.expect_kind(call.vertex_array, ResourceKind::VertexArray)?;
        if let Some(texture) = call.texture {
            self.expect_kind(texture, ResourceKind::Texture)?;
        }
        self.commands.push(GraphicsCommand::Draw(call));
        Ok(())
    }
}
