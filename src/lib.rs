#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod filters;
pub mod history;
pub mod input;
pub mod overlay;
pub mod panels;
pub mod raster;
pub mod resources;
pub mod surface;

pub use app::SketchApp;
pub use config::{DrawMode, FilterMode, ToolConfig};
pub use engine::{ExportFormat, SketchEngine, ViewportConstraints, COMMIT_DEBOUNCE};
pub use error::{EngineError, EngineResult};
pub use event::{EngineEvent, EventBus, EventHandler};
pub use history::{HistoryEntry, HistoryManager, PngCodec, RasterCodec, HISTORY_MAX_LEN};
pub use input::{
    GestureEvent, GestureStateMachine, InputCollector, InputDevice, PointerInput,
    TOUCH_DISAMBIGUATION_WINDOW,
};
pub use overlay::{TextOverlay, TextPreview};
pub use surface::{Position, RasterSurface};
