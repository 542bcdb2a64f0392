pub mod animation;
pub mod app;
pub mod camera;
pub mod capability;
pub mod cli;
pub mod config;
pub mod core;
pub mod frame;
pub mod geometry;
pub mod math;
pub mod orbit;
pub mod renderer;
pub mod scene;
pub mod stats;
pub mod types;

pub use animation::{advance, FrameDriver, SceneRenderer};
pub use capability::{launch, CapabilityError, CapabilityProbe, Launch};
pub use scene::SceneState;
