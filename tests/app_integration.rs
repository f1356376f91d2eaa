#![cfg(feature = "bitmap")]

use codesnap::{App, AppConfig, ExportOutcome, FileStorage, Key, MemorySink, MemoryStorage, TabSize};
use std::sync::Arc;

#[test]
fn settings_persist_across_sessions() {
    let dir = tempfile::tempdir().unwrap();
    let sink = Arc::new(MemorySink::new());
    {
        let storage = FileStorage::open(dir.path()).unwrap();
        let mut app = App::new(AppConfig::default(), storage, sink.clone()).unwrap();
        app.set_theme("vs2015").unwrap();
        app.set_language("rust").unwrap();
        app.set_tab_size(TabSize::Two);
        app.type_text("fn main() {\n}");
        app.select(12, 12);
        app.key_down(Key::Tab);
    }

    let storage = FileStorage::open(dir.path()).unwrap();
    let app = App::new(AppConfig::default(), storage, sink).unwrap();
    let r = app.record();
    assert_eq!(r.current_theme, "vs2015");
    assert_eq!(r.language, "rust");
    assert_eq!(r.tab_size, TabSize::Two);
    assert_eq!(r.code, "fn main() {\n  }");
}

#[test]
fn snap_exports_a_png() {
    let sink = Arc::new(MemorySink::new());
    let mut app = App::new(AppConfig::default(), MemoryStorage::new(), sink.clone()).unwrap();
    app.type_text("const a = 1;\nconst b = \"two\";");

    let outcome = app.snap();
    let deliveries = sink.deliveries();
    assert_eq!(deliveries.len(), 1);
    assert_eq!(outcome, ExportOutcome::Downloaded { filename: deliveries[0].filename.clone() });
    assert!(deliveries[0].bytes.starts_with(&[0x89, b'P', b'N', b'G']));
    assert!(app.exporter().body().attached().is_empty());
}

#[test]
fn wrong_selector_exports_nothing() {
    let sink = Arc::new(MemorySink::new());
    let config = AppConfig { target_selector: "#missing".into(), ..Default::default() };
    let app = App::new(config, MemoryStorage::new(), sink.clone()).unwrap();
    assert_eq!(app.snap(), ExportOutcome::NoTarget);
    assert!(sink.deliveries().is_empty());
}

#[test]
fn invalid_settings_are_rejected() {
    let mut app = App::new(AppConfig::default(), MemoryStorage::new(), Arc::new(MemorySink::new())).unwrap();
    assert!(app.set_theme("nope").is_err());
    assert!(app.set_language("klingon").is_err());
    assert_eq!(app.record().current_theme, "anOldHope");
    assert!(app.theme_names().any(|n| n == "anOldHope"));
    assert!(app.languages().contains(&"javascript"));
}

#[tokio::test]
async fn snap_async_exports_a_png() {
    let sink = Arc::new(MemorySink::new());
    let app = App::new(AppConfig::default(), MemoryStorage::new(), sink.clone()).unwrap();
    assert!(matches!(app.snap_async().await, ExportOutcome::Downloaded { .. }));
    assert_eq!(sink.deliveries().len(), 1);
}

#[test]
fn absurd_scale_fails_export_instead_of_panicking() {
    let sink = Arc::new(MemorySink::new());
    let mut config = AppConfig::default();
    config.raster.scale = 100_000_000;
    let app = App::new(config, MemoryStorage::new(), sink.clone()).unwrap();
    assert_eq!(app.snap(), ExportOutcome::Failed);
    assert!(sink.deliveries().is_empty());
    assert!(!app.exporter().is_pending());
}
