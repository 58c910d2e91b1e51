#![forbid(unsafe_code)]

pub mod anim;
pub mod anim_ease;
pub mod assets;
pub mod background;
pub mod blur_cpu;
pub mod cell;
pub mod composite_cpu;
pub mod config;
pub mod controller;
pub mod foundation;
pub mod hover;
pub mod input;
pub mod layout;
pub mod render;
pub mod render_loop;
pub mod scene;
pub mod script;
pub mod stagger;

pub use anim::{Keyframes, Lerp, Tween};
pub use anim_ease::Ease;
pub use assets::{ImageSource, PreparedImage, load_image};
pub use cell::{Cell, CellStyle};
pub use config::{BaseCellSize, GridConfig};
pub use controller::{HostSurface, TileGrid};
pub use foundation::core::{Canvas, Fps, FrameIndex, Seconds};
pub use foundation::error::{TileGridError, TileGridResult};
pub use input::{InputEvent, InputRouter};
pub use layout::Grid;
pub use render::{CpuBackend, FrameRGBA, FramePlan, RenderBackend};
pub use render_loop::{LoopState, RenderLoop};
pub use scene::Scene;
pub use script::{EventScript, TimedEvent};
pub use stagger::{StaggerAnimator, StaggerState};
