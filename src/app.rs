//! Application state: settings, editor and export wired together
//!
//! `App` is the one owned object a front end drives. Every edit goes through
//! the `SettingsStore`, so the in-memory record, the rendered block and the
//! persisted snapshot never diverge.

use crate::editor::{Editor, Key, KeyOutcome};
use crate::export::{DownloadSink, ExportOutcome, ExportPipeline};
use crate::highlight::{HighlightRequest, Highlighter};
use crate::languages::LANGUAGES;
use crate::rendering::Rasterizer;
use crate::settings::{SettingsRecord, SettingsStore, TabSize};
use crate::storage::Storage;
use crate::themes::ThemeRegistry;
use crate::{AppConfig, Result};
use std::sync::Arc;

pub struct App<S: Storage> {
    config: AppConfig,
    settings: SettingsStore<S>,
    editor: Editor,
    themes: ThemeRegistry,
    highlighter: Box<dyn Highlighter>,
    exporter: Arc<ExportPipeline>,
}

impl<S: Storage> App<S> {
    /// Start with the built-in highlighter and bitmap rasterizer.
    #[cfg(feature = "bitmap")]
    pub fn new(config: AppConfig, storage: S, sink: Arc<dyn DownloadSink>) -> Result<Self> {
        Self::with_parts(
            config,
            storage,
            Box::new(crate::highlight::HtmlHighlighter::new()),
            Box::new(crate::rendering::BitmapRasterizer::new()),
            sink,
        )
    }

    pub fn with_parts(
        config: AppConfig,
        storage: S,
        highlighter: Box<dyn Highlighter>,
        rasterizer: Box<dyn Rasterizer>,
        sink: Arc<dyn DownloadSink>,
    ) -> Result<Self> {
        let exporter = ExportPipeline::new(&config.target_selector, config.raster, rasterizer, sink)?;
        let settings = SettingsStore::open(config.storage_key.clone(), storage);
        let mut editor = Editor::new();
        editor.set_caret(&settings.record().code, usize::MAX);
        Ok(App {
            config,
            settings,
            editor,
            themes: ThemeRegistry::new(),
            highlighter,
            exporter: Arc::new(exporter),
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn record(&self) -> &SettingsRecord {
        self.settings.record()
    }

    pub fn settings(&self) -> &SettingsStore<S> {
        &self.settings
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    pub fn exporter(&self) -> &ExportPipeline {
        &self.exporter
    }

    pub fn theme_names(&self) -> impl Iterator<Item = &'static str> {
        self.themes.names()
    }

    pub fn languages(&self) -> &'static [&'static str] {
        LANGUAGES
    }

    pub fn set_theme(&mut self, name: &str) -> Result<bool> {
        self.settings.set_theme(name)
    }

    pub fn set_language(&mut self, name: &str) -> Result<bool> {
        self.settings.set_language(name)
    }

    pub fn set_tab_size(&mut self, tab: TabSize) -> bool {
        self.settings.set_tab_size(tab)
    }

    pub fn set_show_line_number(&mut self, show: bool) -> bool {
        self.settings.set_show_line_number(show)
    }

    pub fn reset(&mut self) -> bool {
        let changed = self.settings.reset();
        let code = self.settings.record().code.clone();
        self.editor.set_caret(&code, usize::MAX);
        changed
    }

    /// Replace the editor contents.
    pub fn type_text(&mut self, text: impl Into<String>) -> bool {
        let mut code = self.settings.record().code.clone();
        self.editor.input(&mut code, text);
        self.settings.set_code(code)
    }

    pub fn select(&mut self, start: usize, end: usize) {
        self.editor.select(&self.settings.record().code, start, end);
    }

    pub fn key_down(&mut self, key: Key) -> KeyOutcome {
        let record = self.settings.record();
        let (mut code, tab) = (record.code.clone(), record.tab_size);
        let outcome = self.editor.key_down(key, &mut code, tab);
        self.settings.set_code(code);
        outcome
    }

    /// The code block for the current settings.
    pub fn render_block(&self) -> String {
        let r = self.settings.record();
        self.highlighter.highlight(&HighlightRequest {
            code: &r.code,
            language: &r.language,
            theme: self.themes.resolve(&r.current_theme),
            show_line_numbers: r.show_line_number,
            tab_size: r.tab_size,
        })
    }

    pub fn render_document(&self) -> String {
        format!(
            "<!DOCTYPE html><html><head><title>codesnap</title></head><body>{}</body></html>",
            self.render_block()
        )
    }

    /// Export the current code block.
    pub fn snap(&self) -> ExportOutcome {
        self.exporter.export_html(&self.render_document())
    }

    pub async fn snap_async(&self) -> ExportOutcome {
        Arc::clone(&self.exporter).export_async(self.render_document()).await
    }
}
