//! Headless scene demo
//!
//! Builds a small scene over the recording graphics context and runs it for a
//! fixed number of frames: a stretched background, a fleet of drifting ships
//! and a module that fires short-lived shots.
//!
//! Usage: `scene_demo [config.toml|config.ron] [frames]`

use scene_engine::foundation::logging;
use scene_engine::prelude::*;
use scene_engine::render::GraphicsCommand;
use scene_engine::scene::actions::FnAction;

const DEFAULT_FRAMES: u64 = 120;

/// Spins its entity around the Z axis
struct Spinner {
    speed: f32,
}

impl EntityBehavior for Spinner {
    fn update(&mut self, entity: &mut EntityCore, delta_time: f32) -> SceneResult<()> {
        entity.transform_mut().rotate_euler(0.0, 0.0, self.speed * delta_time);
        Ok(())
    }
}

/// Fires a shot from the root every `interval` frames
struct Gun {
    interval: u32,
    frames: u32,
    fired: u32,
}

impl EngineModule for Gun {
    fn name(&self) -> &str {
        "gun"
    }

    fn update(&mut self, scene: &mut Scene, root: EntityId, _delta_time: f32) -> SceneResult<()> {
        self.frames += 1;
        if self.frames % self.interval != 0 {
            return Ok(());
        }

        let shot = scene.spawn(Image::new("shot", 4.0, 4.0));
        scene.transform_mut(shot)?.translate(Vec3::new(0.0, -200.0, 0.0));
        scene.add_child(root, shot)?;
        scene.attach_action(shot, MoveBy::new(Vec3::new(0.0, 400.0, 0.0), 1.0))?;
        scene.attach_action(shot, Lifetime::new(1.0))?;
        self.fired += 1;
        Ok(())
    }

    fn shutdown(&mut self) {
        log::info!("Gun fired {} shots", self.fired);
    }
}

struct FleetDemo {
    fleet: Option<EntityId>,
}

impl Application for FleetDemo {
    fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError> {
        let background = engine.spawn(Image::new("starfield", 1.0, 1.0))?;
        let scene = engine.scene_mut();
        scene.set_property(background, Property::StretchX, true)?;
        scene.set_property(background, Property::StretchY, true)?;
        scene.set_property(background, Property::InheritTransform, false)?;

        let fleet = engine.spawn(Spinner { speed: 0.25 })?;
        let scene = engine.scene_mut();
        for index in 0..4u8 {
            let ship = scene.spawn(Image::new("ship", 32.0, 24.0));
            let offset = f32::from(index) * 48.0 - 72.0;
            scene.transform_mut(ship)?.translate(Vec3::new(offset, 0.0, 0.0));
            scene.add_child(fleet, ship)?;

            let bob = MoveBy::new(Vec3::new(0.0, 8.0, 0.0), 0.5);
            scene.attach_action(ship, Repeat::new(bob, 3))?;
        }

        // Last ship shrinks away over two seconds.
        let last = scene.children(fleet)?.last().copied();
        if let Some(last) = last {
            scene.attach_action(
                last,
                FnAction::new(|core: &mut EntityCore, _dt| {
                    core.transform_mut().scale *= 0.99;
                    ActionStatus::Continue
                }),
            )?;
            scene.attach_action(last, Lifetime::new(2.0))?;
        }

        engine.add_module(Box::new(Gun {
            interval: 15,
            frames: 0,
            fired: 0,
        }))?;
        self.fleet = Some(fleet);
        Ok(())
    }

    fn update(&mut self, engine: &mut Engine, _delta_time: f32) -> Result<(), AppError> {
        let frame = engine.frame_count();
        if frame > 0 && frame % 60 == 0 {
            log::info!(
                "Frame {frame}: {} entities, {} under root",
                engine.scene().len(),
                engine.scene().child_count(engine.root())?
            );
        }
        Ok(())
    }

    fn cleanup(&mut self, engine: &mut Engine) {
        if let Some(fleet) = self.fleet {
            match engine.scene().dump_ron(fleet) {
                Ok(dump) => log::debug!("Fleet at exit:\n{dump}"),
                Err(err) => log::warn!("Could not snapshot fleet: {err}"),
            }
        }
    }
}

fn load_config(path: Option<&str>) -> Result<EngineConfig, Box<dyn std::error::Error>> {
    let config = match path {
        Some(path) => EngineConfig::load_from_file(path)?,
        None => EngineConfig::default()
            .with_title("Scene Demo")
            .with_size(800, 600)
            .with_fixed_delta(1.0 / 60.0),
    };
    Ok(config)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = load_config(args.first().map(String::as_str))?;
    let frames = match args.get(1) {
        Some(text) => text.parse()?,
        None => DEFAULT_FRAMES,
    };

    logging::init_with_config(&config.logging);
    log::info!("Starting scene demo for {frames} frames");

    let mut engine = Engine::create(config, Box::new(HeadlessGraphics::new()))?;
    let mut app = FleetDemo { fleet: None };
    engine.run(&mut app, Some(frames))?;

    if let Some(gfx) = engine.graphics_as::<HeadlessGraphics>() {
        let draws = gfx
            .commands()
            .iter()
            .filter(|command| matches!(command, GraphicsCommand::Draw(_)))
            .count();
        log::info!(
            "Presented {} frames with {draws} draws",
            gfx.frames_presented()
        );
    }
    Ok(())
}
