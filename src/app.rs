use crate::config::ToolConfig;
use crate::engine::SketchEngine;
use crate::input::InputCollector;

/// We derive Deserialize/Serialize so we can persist the tool selection on
/// shutdown.
#[derive(serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct SketchApp {
    config: ToolConfig,
    #[serde(skip)]
    pub(crate) engine: SketchEngine,
    #[serde(skip)]
    pub(crate) texture: Option<egui::TextureHandle>,
    #[serde(skip)]
    pub(crate) collector: InputCollector,
}

impl Default for SketchApp {
    fn default() -> Self {
        Self {
            config: ToolConfig::default(),
            engine: SketchEngine::new(),
            texture: None,
            collector: InputCollector::new(),
        }
    }
}

impl SketchApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let mut app: SketchApp = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY))
            .unwrap_or_default();
        app.engine.apply_config(app.config.clone());
        app
    }

    pub fn engine(&self) -> &SketchEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut SketchEngine {
        &mut self.engine
    }
}

impl eframe::App for SketchApp {
    /// Called by the framework to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        self.config = self.engine.config().clone();
        eframe::set_value(storage, eframe::APP_KEY, self);
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        crate::panels::tools_panel(self, ctx);
        crate::panels::central_panel(self, ctx);
    }
}
