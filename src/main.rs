use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use codesnap::{App, AppConfig, ExportOutcome, FileStorage, TabSize};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "codesnap", version, about = "Render code snippets to PNG snapshots")]
struct Cli {
    /// Directory holding persisted settings
    #[arg(long, global = true)]
    storage_dir: Option<PathBuf>,

    /// Storage key of the settings snapshot
    #[arg(long, global = true, default_value = codesnap::DEFAULT_STORAGE_KEY)]
    storage_key: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the current settings as JSON
    Show,
    /// Change one or more settings
    Set {
        #[arg(long)]
        theme: Option<String>,
        #[arg(long)]
        language: Option<String>,
        /// Indentation width: 2, 4 or 6
        #[arg(long)]
        tab_size: Option<usize>,
        #[arg(long)]
        line_numbers: Option<bool>,
        /// Read the code from a file ("-" for stdin)
        #[arg(long, conflicts_with = "code")]
        code_file: Option<PathBuf>,
        #[arg(long)]
        code: Option<String>,
    },
    /// List available themes
    Themes,
    /// List available languages
    Languages,
    /// Print the rendered HTML code block
    Render,
    /// Export the code block as a PNG
    Snap {
        /// Output directory
        #[arg(long, short)]
        out: Option<PathBuf>,
        /// Device pixels per CSS pixel
        #[arg(long, default_value_t = 1)]
        scale: u32,
        /// Do not treat cross-origin images as CORS-enabled
        #[arg(long)]
        no_cors: bool,
        /// Refuse to draw tainting cross-origin images
        #[arg(long)]
        no_taint: bool,
    },
    /// Restore default settings
    Reset,
}

fn read_code(path: &PathBuf) -> anyhow::Result<String> {
    if path.as_os_str() == "-" {
        let mut s = String::new();
        std::io::Read::read_to_string(&mut std::io::stdin(), &mut s)?;
        return Ok(s);
    }
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut config = AppConfig { storage_key: cli.storage_key, ..Default::default() };
    if let Command::Snap { out, scale, no_cors, no_taint } = &cli.command {
        config.download_dir = out.clone();
        config.raster.scale = *scale;
        config.raster.use_cors = !no_cors;
        config.raster.allow_taint = !no_taint;
    }

    let root = match cli.storage_dir {
        Some(dir) => dir,
        None => FileStorage::default_root()?,
    };
    let storage = FileStorage::open(root)?;
    let sink = Arc::new(config.download_sink());
    let mut app = App::new(config, storage, sink)?;

    match cli.command {
        Command::Show => println!("{}", serde_json::to_string_pretty(app.record())?),
        Command::Set { theme, language, tab_size, line_numbers, code_file, code } => {
            if let Some(t) = theme {
                app.set_theme(&t)?;
            }
            if let Some(l) = language {
                app.set_language(&l)?;
            }
            if let Some(w) = tab_size {
                app.set_tab_size(TabSize::try_from(w)?);
            }
            if let Some(show) = line_numbers {
                app.set_show_line_number(show);
            }
            if let Some(path) = code_file {
                app.type_text(read_code(&path)?);
            } else if let Some(c) = code {
                app.type_text(c);
            }
        }
        Command::Themes => app.theme_names().for_each(|n| println!("{}", n)),
        Command::Languages => app.languages().iter().for_each(|l| println!("{}", l)),
        Command::Render => println!("{}", app.render_block()),
        Command::Snap { .. } => match app.snap() {
            ExportOutcome::Downloaded { filename } => println!("{}.png", filename),
            ExportOutcome::NoTarget => bail!("nothing to export"),
            ExportOutcome::Failed => bail!("export failed, see log for details"),
            ExportOutcome::Busy => bail!("another export is in progress"),
        },
        Command::Reset => {
            app.reset();
        }
    }
    Ok(())
}
