//! Graphics context abstraction
//!
//! The scene core never talks to a GPU API directly. Render protocols issue
//! their work through [`GraphicsContext`], which hands out opaque
//! [`ResourceHandle`]s for shaders, vertex arrays and textures.

use thiserror::Error;

use crate::foundation::math::Mat4;
use crate::scene::AsAny;

/// Result type for graphics operations
pub type GraphicsResult<T> = Result<T, GraphicsError>;

/// Handle to a resource owned by the graphics context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceHandle(pub u64);

/// Kind of resource a handle refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// Linked shader program
    Shader,
    /// Vertex array with its buffers
    VertexArray,
    /// Sampled texture
    Texture,
}

/// Viewport size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Viewport {
    /// Create a viewport
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width over height, 1.0 for an empty viewport
    pub fn aspect_ratio(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

/// One draw submission
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    /// Shader program to draw with
    pub shader: ResourceHandle,
    /// Vertex array to draw from
    pub vertex_array: ResourceHandle,
    /// Texture bound for the draw, if any
    pub texture: Option<ResourceHandle>,
    /// Model matrix
    pub model: Mat4,
    /// Number of vertices
    pub vertex_count: u32,
}

/// Errors reported by a graphics context
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphicsError {
    /// The context was used before `init` or after `destroy`
    #[error("Graphics context is not initialized")]
    NotInitialized,

    /// Resource creation failed
    #[error("Failed to create {kind:?} resource '{label}': {reason}")]
    ResourceCreationFailed {
        /// Requested kind
        kind: ResourceKind,
        /// Label passed at creation
        label: String,
        /// Backend reason
        reason: String,
    },

    /// The handle does not name a live resource
    #[error("Unknown resource handle {0:?}")]
    UnknownResource(ResourceHandle),

    /// The handle names a resource of another kind
    #[error("Resource {handle:?} is a {actual:?}, expected {expected:?}")]
    WrongResourceKind {
        /// Offending handle
        handle: ResourceHandle,
        /// Kind the operation needs
        expected: ResourceKind,
        /// Kind the handle has
        actual: ResourceKind,
    },

    /// Any other backend failure
    #[error("Graphics backend error: {0}")]
    Backend(String),
}

/// Window and GPU collaborator driven by the engine
///
/// `init`, `begin_frame`, `present`, `resize` and `destroy` bracket the
/// per-frame scene traversal. The resource calls are what render protocols
/// use to draw.
pub trait GraphicsContext: AsAny {
    /// Create the context with an initial viewport
    fn init(&mut self, width: u32, height: u32) -> GraphicsResult<()>;

    /// Prepare a new frame
    fn begin_frame(&mut self) -> GraphicsResult<()>;

    /// Present the finished frame
    fn present(&mut self) -> GraphicsResult<()>;

    /// Resize the viewport
    fn resize(&mut self, width: u32, height: u32) -> GraphicsResult<()>;

    /// Current viewport
    fn viewport(&self) -> Viewport;

    /// Tear the context down; resources still alive are dropped with it
    fn destroy(&mut self) -> GraphicsResult<()>;

    /// Create a resource and return its handle
    fn create_resource(&mut self, kind: ResourceKind, label: &str) -> GraphicsResult<ResourceHandle>;

    /// Bind a resource for the following draws
    fn bind(&mut self, handle: ResourceHandle) -> GraphicsResult<()>;

    /// Unbind a resource
    fn unbind(&mut self, handle: ResourceHandle) -> GraphicsResult<()>;

    /// Release a resource; the handle is invalid afterwards
    fn release(&mut self, handle: ResourceHandle) -> GraphicsResult<()>;

    /// Issue a draw
    fn draw(&mut self, call: DrawCall) -> GraphicsResult<()>;
}
