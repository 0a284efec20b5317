//! Render dispatch
//!
//! One [`RenderProtocol`] instance exists per rendered entity type. Entities
//! queue themselves during the scene render pass, then
//! [`RenderDispatch::render_frame`] drains the queue in FIFO order and hands
//! each entry to its protocol.
//!
//! ## Protocol lifecycle
//!
//! ```text
//! Unregistered ──register──► Initialized ──destroy──► Destroyed
//! ```
//!
//! A protocol is initialized exactly once, on first registration of its
//! entity type, and never re-initialized after the registry shut down.

use std::any::{type_name, TypeId};
use std::collections::{HashMap, VecDeque};
use std::fmt;

use log::{debug, trace, warn};

use super::graphics::{GraphicsContext, GraphicsResult, Viewport};
use super::RenderError;
use crate::scene::{EntityBehavior, EntityCore, EntityId, Scene};

/// Per-type rendering strategy
///
/// Owns the GPU resources shared by every instance of [`Self::Target`] and
/// issues the draw calls for them.
pub trait RenderProtocol: 'static {
    /// Entity behavior type this protocol draws
    type Target: EntityBehavior;

    /// Create shared resources; called once on registration
    fn init(&mut self, gfx: &mut dyn GraphicsContext) -> GraphicsResult<()> {
        let _ = gfx;
        Ok(())
    }

    /// Draw one queued entity
    fn render(
        &mut self,
        target: &Self::Target,
        entity: &EntityCore,
        gfx: &mut dyn GraphicsContext,
    ) -> GraphicsResult<()>;

    /// Release shared resources; called once at shutdown
    fn destroy(&mut self, gfx: &mut dyn GraphicsContext) -> GraphicsResult<()> {
        let _ = gfx;
        Ok(())
    }
}

/// Entity behavior that is drawn by a registered protocol
pub trait Renderable: EntityBehavior + Sized {
    /// Protocol created the first time this type is submitted
    type Protocol: RenderProtocol<Target = Self> + Default;
}

/// Stable handle to a registered protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProtocolIndex(usize);

impl ProtocolIndex {
    /// Position in registration order
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ProtocolIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Object-safe view of a protocol with the target downcast built in
trait ErasedProtocol {
    fn init(&mut self, gfx: &mut dyn GraphicsContext) -> GraphicsResult<()>;

    fn render(
        &mut self,
        behavior: &dyn EntityBehavior,
        entity: &EntityCore,
        gfx: &mut dyn GraphicsContext,
    ) -> Result<(), RenderError>;

    fn destroy(&mut self, gfx: &mut dyn GraphicsContext) -> GraphicsResult<()>;

    fn target_name(&self) -> &'static str;
}

struct Erased<P>(P);

impl<P: RenderProtocol> ErasedProtocol for Erased<P> {
    fn init(&mut self, gfx: &mut dyn GraphicsContext) -> GraphicsResult<()> {
        self.0.init(gfx)
    }

    fn render(
        &mut self,
        behavior: &dyn EntityBehavior,
        entity: &EntityCore,
        gfx: &mut dyn GraphicsContext,
    ) -> Result<(), RenderError> {
        let target = behavior
            .as_any()
            .downcast_ref::<P::Target>()
            .ok_or_else(|| RenderError::TypeMismatch {
                expected: type_name::<P::Target>(),
                found: behavior.type_name(),
            })?;
        self.0.render(target, entity, gfx)?;
        Ok(())
    }

    fn destroy(&mut self, gfx: &mut dyn GraphicsContext) -> GraphicsResult<()> {
        self.0.destroy(gfx)
    }

    fn target_name(&self) -> &'static str {
        type_name::<P::Target>()
    }
}

/// Protocol registry plus the per-frame render queue
#[derive(Default)]
pub struct RenderDispatch {
    protocols: Vec<Box<dyn ErasedProtocol>>,
    by_target: HashMap<TypeId, ProtocolIndex>,
    queue: VecDeque<(EntityId, ProtocolIndex)>,
    shut_down: bool,
}

impl RenderDispatch {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the protocol for `T`, creating and initializing it on first use
    pub fn register_protocol<T: Renderable>(
        &mut self,
        gfx: &mut dyn GraphicsContext,
    ) -> Result<ProtocolIndex, RenderError> {
        if let Some(index) = self.lookup::<T>()? {
            return Ok(index);
        }
        self.register_with(T::Protocol::default(), gfx)
    }

    /// Register an explicit protocol instance for its target type
    ///
    /// If the target type already has a protocol, the existing index is
    /// returned and `protocol` is dropped without being initialized.
    pub fn register_with<P: RenderProtocol>(
        &mut self,
        protocol: P,
        gfx: &mut dyn GraphicsContext,
    ) -> Result<ProtocolIndex, RenderError> {
        if let Some(index) = self.lookup::<P::Target>()? {
            return Ok(index);
        }

        let mut erased: Box<dyn ErasedProtocol> = Box::new(Erased(protocol));
        erased.init(gfx)?;

        let index = ProtocolIndex(self.protocols.len());
        debug!("Registered render protocol {index} for {}", erased.target_name());
        self.protocols.push(erased);
        self.by_target.insert(TypeId::of::<P::Target>(), index);
        Ok(index)
    }

    fn lookup<T: 'static>(&self) -> Result<Option<ProtocolIndex>, RenderError> {
        if self.shut_down {
            return Err(RenderError::RegistryShutDown);
        }
        Ok(self.by_target.get(&TypeId::of::<T>()).copied())
    }

    /// Whether `T` already has a protocol
    pub fn is_registered<T: 'static>(&self) -> bool {
        self.by_target.contains_key(&TypeId::of::<T>())
    }

    /// Number of registered protocols
    pub fn protocol_count(&self) -> usize {
        self.protocols.len()
    }

    /// Number of entries waiting for the next drain
    pub fn queued_len(&self) -> usize {
        self.queue.len()
    }

    /// Whether `destroy` already ran
    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    /// Append an entity to the render queue
    pub fn queue(&mut self, entity: EntityId, index: ProtocolIndex) -> Result<(), RenderError> {
        if self.shut_down {
            return Err(RenderError::RegistryShutDown);
        }
        if index.0 >= self.protocols.len() {
            return Err(RenderError::UnknownProtocol(index));
        }
        self.queue.push_back((entity, index));
        trace!("Queued {entity:?} for protocol {index}");
        Ok(())
    }

    /// Drain the whole queue in FIFO order
    ///
    /// The queue is empty on return. On the first failing entry the
    /// remaining entries are dropped and the error is returned.
    pub fn render_frame(&mut self, scene: &Scene, gfx: &mut dyn GraphicsContext) -> Result<(), RenderError> {
        let mut pending = std::mem::take(&mut self.queue);
        let drained = pending.len();

        while let Some((entity, index)) = pending.pop_front() {
            if let Err(err) = self.dispatch(scene, entity, index, gfx) {
                if !pending.is_empty() {
                    warn!("Dropping {} queued entries after render failure", pending.len());
                }
                return Err(err);
            }
        }

        trace!("Rendered {drained} queued entities");
        Ok(())
    }

    fn dispatch(
        &mut self,
        scene: &Scene,
        entity: EntityId,
        index: ProtocolIndex,
        gfx: &mut dyn GraphicsContext,
    ) -> Result<(), RenderError> {
        let node = scene.node(entity).map_err(|_| RenderError::StaleEntity(entity))?;
        let behavior = node
            .behavior
            .as_deref()
            .ok_or(RenderError::MissingBehavior(entity))?;
        let protocol = self
            .protocols
            .get_mut(index.0)
            .ok_or(RenderError::UnknownProtocol(index))?;
        protocol.render(behavior, &node.core, gfx)
    }

    /// Tear down every protocol in reverse registration order
    ///
    /// Runs once; later calls do nothing and later registrations fail with
    /// [`RenderError::RegistryShutDown`]. Every protocol is destroyed even
    /// when one fails; the first failure is returned.
    pub fn destroy(&mut self, gfx: &mut dyn GraphicsContext) -> Result<(), RenderError> {
        if self.shut_down {
            return Ok(());
        }
        self.shut_down = true;
        self.queue.clear();
        self.by_target.clear();

        let mut first_error = None;
        for mut protocol in self.protocols.drain(..).rev() {
            if let Err(err) = protocol.destroy(gfx) {
                warn!("Destroying render protocol for {} failed: {err}", protocol.target_name());
                first_error = first_error.or(Some(err));
            }
        }
        debug!("Render dispatch shut down");

        first_error.map_or(Ok(()), |err| Err(err.into()))
    }
}

impl fmt::Debug for RenderDispatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderDispatch")
            .field(
                "protocols",
                &self.protocols.iter().map(|p| p.target_name()).collect::<Vec<_>>(),
            )
            .field("queued", &self.queue.len())
            .field("shut_down", &self.shut_down)
            .finish()
    }
}

/// Render-pass handle given to [`EntityBehavior::render`]
pub struct RenderFrame<'a> {
    dispatch: &'a mut RenderDispatch,
    graphics: &'a mut dyn GraphicsContext,
}

impl<'a> RenderFrame<'a> {
    /// Bundle the dispatch and graphics context for one render pass
    pub fn new(dispatch: &'a mut RenderDispatch, graphics: &'a mut dyn GraphicsContext) -> Self {
        Self { dispatch, graphics }
    }

    /// Queue `entity` with the protocol of `T`, registering it if needed
    pub fn submit<T: Renderable>(&mut self, target: &T, entity: &EntityCore) -> Result<ProtocolIndex, RenderError> {
        let _ = target;
        let index = self.dispatch.register_protocol::<T>(self.graphics)?;
        self.dispatch.queue(entity.id(), index)?;
        Ok(index)
    }

    /// Viewport of the graphics context
    pub fn viewport(&self) -> Viewport {
        self.graphics.viewport()
    }

    /// The dispatch being filled
    pub fn dispatch(&self) -> &RenderDispatch {
        self.dispatch
    }
}
