#![cfg(feature = "bitmap")]

use codesnap::export::download::DownloadTrigger;
use codesnap::rendering::BitmapRasterizer;
use codesnap::{
    DataUri, DownloadSink, ExportOutcome, ExportPipeline, MemorySink, RasterOptions, Rasterizer,
    Screenshot,
};
use scraper::{ElementRef, Html};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Barrier, Mutex};

const BLOCK: &str = "<html><body><div class=\"code-box\" style=\"tab-size: 4\">\
    <pre style=\"background: #1c1d21; color: #c0c5ce\"><code>\
    <span class=\"line\">let x = 1;</span>\n</code></pre></div></body></html>";

fn pipeline_with(rasterizer: Box<dyn Rasterizer>, sink: Arc<MemorySink>) -> ExportPipeline {
    ExportPipeline::new(".code-box", RasterOptions::default(), rasterizer, sink).unwrap()
}

#[derive(Default)]
struct CountingSink(AtomicUsize);

impl DownloadSink for CountingSink {
    fn deliver(&self, _trigger: &DownloadTrigger) -> codesnap::Result<()> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[test]
fn missing_target_is_a_silent_no_op() {
    let sink = Arc::new(CountingSink::default());
    let p = ExportPipeline::new(".code-box", RasterOptions::default(), Box::new(BitmapRasterizer::new()), sink.clone())
        .unwrap();
    let doc = Html::parse_document("<html><body><p>nothing here</p></body></html>");
    assert_eq!(p.capture(&doc).unwrap(), None);
    assert_eq!(p.export(&doc), ExportOutcome::NoTarget);
    assert_eq!(sink.0.load(Ordering::SeqCst), 0);
}

#[test]
fn capture_produces_png_data_uri() {
    let p = pipeline_with(Box::new(BitmapRasterizer::new()), Arc::new(MemorySink::new()));
    let uri = p.capture(&Html::parse_document(BLOCK)).unwrap().expect("target present");
    assert!(uri.as_str().starts_with("data:image/png;base64,"));
    assert!(uri.decode().unwrap().starts_with(&[0x89, b'P', b'N', b'G']));
}

#[test]
fn download_names_file_by_timestamp_and_cleans_up() {
    let sink = Arc::new(MemorySink::new());
    let p = pipeline_with(Box::new(BitmapRasterizer::new()), sink.clone());
    let before = chrono::Utc::now().timestamp_millis();

    let name = p.download(&DataUri::encode("image/png", b"img")).unwrap();

    let stamp: i64 = name.parse().expect("decimal timestamp");
    assert!(stamp >= before);
    assert!(p.body().attached().is_empty());
    let deliveries = sink.deliveries();
    assert_eq!(deliveries.len(), 1);
    assert_eq!(deliveries[0].filename, name);
    assert_eq!(deliveries[0].bytes, b"img");
}

#[test]
fn export_downloads_the_rendered_block() {
    let sink = Arc::new(MemorySink::new());
    let p = pipeline_with(Box::new(BitmapRasterizer::new()), sink.clone());
    match p.export_html(BLOCK) {
        ExportOutcome::Downloaded { filename } => assert_eq!(sink.deliveries()[0].filename, filename),
        other => panic!("unexpected outcome {:?}", other),
    }
    assert!(!p.is_pending());
}

struct FailingRasterizer;

impl Rasterizer for FailingRasterizer {
    fn rasterize(&self, _node: ElementRef<'_>, _options: &RasterOptions) -> codesnap::Result<Screenshot> {
        Err(codesnap::Error::RenderError("SecurityError".into()))
    }
}

#[test]
fn rasterization_failure_downloads_nothing() {
    let sink = Arc::new(MemorySink::new());
    let p = pipeline_with(Box::new(FailingRasterizer), sink.clone());
    assert_eq!(p.export_html(BLOCK), ExportOutcome::Failed);
    assert!(sink.deliveries().is_empty());
    assert!(!p.is_pending());
}

#[test]
fn tainted_canvas_downloads_nothing() {
    let sink = Arc::new(MemorySink::new());
    let opts = RasterOptions { use_cors: false, allow_taint: true, scale: 1 };
    let p = ExportPipeline::new(".code-box", opts, Box::new(BitmapRasterizer::new()), sink.clone()).unwrap();
    let html = "<div class=\"code-box\"><img src=\"https://fonts.example/bg.png\"></div>";
    assert_eq!(p.export_html(html), ExportOutcome::Failed);
    assert!(sink.deliveries().is_empty());
}

/// Blocks inside `rasterize` until released
struct GatedRasterizer {
    entered: Arc<Barrier>,
    release: Mutex<Receiver<()>>,
}

impl Rasterizer for GatedRasterizer {
    fn rasterize(&self, node: ElementRef<'_>, options: &RasterOptions) -> codesnap::Result<Screenshot> {
        self.entered.wait();
        let _ = self.release.lock().unwrap().recv();
        BitmapRasterizer::new().rasterize(node, options)
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn overlapping_exports_are_rejected_while_pending() {
    let entered = Arc::new(Barrier::new(2));
    let (release, gate) = mpsc::channel();

    let sink = Arc::new(MemorySink::new());
    let p = Arc::new(pipeline_with(
        Box::new(GatedRasterizer { entered: entered.clone(), release: Mutex::new(gate) }),
        sink.clone(),
    ));

    let first = tokio::spawn(Arc::clone(&p).export_async(BLOCK.to_string()));
    tokio::task::block_in_place(|| entered.wait());

    assert!(p.is_pending());
    assert_eq!(Arc::clone(&p).export_async(BLOCK.to_string()).await, ExportOutcome::Busy);
    assert_eq!(p.export_html(BLOCK), ExportOutcome::Busy);

    release.send(()).unwrap();
    assert!(matches!(first.await.unwrap(), ExportOutcome::Downloaded { .. }));
    assert!(!p.is_pending());
    assert_eq!(sink.deliveries().len(), 1);
}
