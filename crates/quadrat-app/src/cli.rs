//! Command line interface.

use crate::catalog_dir::DirectoryCatalog;
use crate::clipboard::SystemClipboard;
use crate::config::load_config;
use crate::scene_file::{load_or_new, save_scene};
use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use kurbo::{Rect, Size};
use quadrat_core::layout::canvas_size;
use quadrat_core::{Canvas, CopyPreset, EditorConfig, GlyphCatalog, load_catalog};
use quadrat_render::{UsvgProbe, render_canvas_svg};
use std::path::{Path, PathBuf};

/// Glyph directory used when `--glyphs` is not given.
pub const DEFAULT_GLYPH_DIR: &str = "glyphs";

#[derive(Parser, Debug)]
#[command(name = "quadrat", version, about = "Compose glyph rows and exchange them through the clipboard")]
pub struct Cli {
    /// Editor configuration JSON; defaults apply when omitted.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory of glyph SVG files.
    ///
    /// A missing default directory loads as an empty catalog.
    #[arg(long = "glyphs", id = "glyph_dir", value_name = "GLYPHS", global = true, default_value = DEFAULT_GLYPH_DIR)]
    pub glyphs: PathBuf,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List catalog glyphs, optionally filtered.
    Catalog(CatalogArgs),
    /// Append glyphs to the active row of a scene.
    Insert(InsertArgs),
    /// Apply discrete transforms to instances of a scene.
    Transform(TransformArgs),
    /// Copy a scene, or matching instances, to the system clipboard.
    Copy(CopyArgs),
    /// Paste the system clipboard into a scene.
    Paste(SceneArgs),
    /// Render a scene as an SVG view.
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
pub struct CatalogArgs {
    /// Case-insensitive search over ids and names.
    #[arg(long)]
    pub search: Option<String>,
}

#[derive(Parser, Debug)]
pub struct SceneArgs {
    /// Scene JSON file; created when missing.
    #[arg(long)]
    pub scene: PathBuf,
}

#[derive(Parser, Debug)]
pub struct InsertArgs {
    #[command(flatten)]
    pub scene: SceneArgs,

    /// Start a new row before inserting.
    #[arg(long, default_value_t = false)]
    pub new_row: bool,

    /// Glyph ids to insert, in order.
    #[arg(required = true)]
    pub ids: Vec<String>,
}

#[derive(Parser, Debug)]
pub struct TransformArgs {
    #[command(flatten)]
    pub scene: SceneArgs,

    /// Only instances of these glyph ids; all instances when omitted.
    #[arg(long = "glyph")]
    pub glyphs: Vec<String>,

    /// Quarter turns clockwise.
    #[arg(long, default_value_t = 0)]
    pub rotate: u32,

    #[arg(long, default_value_t = false)]
    pub flip_x: bool,

    #[arg(long, default_value_t = false)]
    pub flip_y: bool,

    /// Uniform scale, clamped to the configured bounds.
    #[arg(long)]
    pub scale: Option<f64>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum PresetArg {
    Small,
    Large,
    Wysiwyg,
}

impl From<PresetArg> for CopyPreset {
    fn from(value: PresetArg) -> Self {
        match value {
            PresetArg::Small => CopyPreset::Small,
            PresetArg::Large => CopyPreset::Large,
            PresetArg::Wysiwyg => CopyPreset::Wysiwyg,
        }
    }
}

#[derive(Parser, Debug)]
pub struct CopyArgs {
    #[command(flatten)]
    pub scene: SceneArgs,

    /// Only instances of these glyph ids; the whole scene when omitted.
    #[arg(long = "glyph")]
    pub glyphs: Vec<String>,

    #[arg(long, value_enum, default_value_t = PresetArg::Large)]
    pub preset: PresetArg,

    /// Copy the built-in foreign SVG sample instead of the scene.
    #[arg(long, default_value_t = false)]
    pub sample: bool,
}

#[derive(Parser, Debug)]
pub struct RenderArgs {
    #[command(flatten)]
    pub scene: SceneArgs,

    /// Output SVG path.
    #[arg(long)]
    pub out: PathBuf,

    #[arg(long, default_value_t = 1200.0)]
    pub width: f64,

    #[arg(long, default_value_t = 800.0)]
    pub height: f64,
}

/// Run a parsed command line.
pub fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref())?;
    let required = cli.glyphs != Path::new(DEFAULT_GLYPH_DIR);
    let catalog = open_catalog(&cli.glyphs, required, &config)?;
    match cli.cmd {
        Command::Catalog(args) => cmd_catalog(&catalog, args),
        Command::Insert(args) => cmd_insert(open_canvas(&args.scene.scene, catalog, config)?, args),
        Command::Transform(args) => {
            cmd_transform(open_canvas(&args.scene.scene, catalog, config)?, args)
        }
        Command::Copy(args) => cmd_copy(&open_canvas(&args.scene.scene, catalog, config)?, args),
        Command::Paste(args) => cmd_paste(open_canvas(&args.scene, catalog, config)?, &args.scene),
        Command::Render(args) => cmd_render(open_canvas(&args.scene.scene, catalog, config)?, args),
    }
}

/// Load every glyph in `dir`, measuring content with `usvg`.
pub fn load_glyphs(dir: &Path, config: &EditorConfig) -> anyhow::Result<GlyphCatalog> {
    let source = DirectoryCatalog::new(dir);
    let probe = UsvgProbe::new();
    let catalog = pollster::block_on(load_catalog(&source, config.batch_size, &probe, |loaded, total| {
        log::info!("Loading glyphs {loaded}/{total}");
    }))
    .with_context(|| format!("load glyph catalog from '{}'", dir.display()))?;
    Ok(catalog)
}

/// Load the glyph catalog, tolerating a missing directory unless `required`.
pub fn open_catalog(dir: &Path, required: bool, config: &EditorConfig) -> anyhow::Result<GlyphCatalog> {
    if !required && !dir.exists() {
        log::warn!("Glyph directory '{}' not found, starting with an empty catalog", dir.display());
        return Ok(GlyphCatalog::default());
    }
    load_glyphs(dir, config)
}

fn open_canvas(scene: &Path, catalog: GlyphCatalog, config: EditorConfig) -> anyhow::Result<Canvas> {
    let document = load_or_new(scene)?;
    Ok(Canvas::with_document(document, catalog, config))
}

/// Select every instance whose glyph id is listed; all instances when the list is empty.
pub fn select_glyphs(canvas: &mut Canvas, glyphs: &[String]) {
    canvas.clear_selection();
    let ids: Vec<_> = canvas
        .document
        .instances()
        .filter(|instance| glyphs.is_empty() || glyphs.contains(&instance.glyph_id))
        .map(|instance| instance.id)
        .collect();
    for id in ids {
        canvas.toggle_selection(id);
    }
}

fn cmd_catalog(catalog: &GlyphCatalog, args: CatalogArgs) -> anyhow::Result<()> {
    let glyphs = match args.search.as_deref() {
        Some(term) => catalog.search(term),
        None => catalog.iter().collect(),
    };
    for glyph in glyphs {
        println!("{}\t{}", glyph.id, glyph.name);
    }
    Ok(())
}

fn cmd_insert(mut canvas: Canvas, args: InsertArgs) -> anyhow::Result<()> {
    if args.new_row {
        canvas.document.add_row();
    }
    let inserted = args
        .ids
        .iter()
        .filter(|id| canvas.insert_glyph(id).is_some())
        .count();
    save_scene(&args.scene.scene, &canvas.document)?;
    eprintln!("inserted {inserted} of {} glyphs", args.ids.len());
    Ok(())
}

fn cmd_transform(mut canvas: Canvas, args: TransformArgs) -> anyhow::Result<()> {
    select_glyphs(&mut canvas, &args.glyphs);
    if canvas.selection().is_empty() {
        eprintln!("no matching instances");
        return Ok(());
    }
    for _ in 0..args.rotate % 4 {
        canvas.rotate_selected_90();
    }
    if args.flip_x {
        canvas.flip_selected_horizontal();
    }
    if args.flip_y {
        canvas.flip_selected_vertical();
    }
    if let Some(scale) = args.scale {
        canvas.set_selected_scale(scale);
    }
    save_scene(&args.scene.scene, &canvas.document)?;
    eprintln!("transformed {} instances", canvas.selection().len());
    Ok(())
}

fn cmd_copy(canvas: &Canvas, args: CopyArgs) -> anyhow::Result<()> {
    let clipboard = SystemClipboard::new()?;
    if args.sample {
        pollster::block_on(canvas.copy_sample_svg(&clipboard))?;
        eprintln!("Copied sample SVG");
        return Ok(());
    }
    let mut canvas = canvas.clone();
    if !args.glyphs.is_empty() {
        select_glyphs(&mut canvas, &args.glyphs);
        if canvas.selection().is_empty() {
            eprintln!("Nothing to copy");
            return Ok(());
        }
    }
    let outcome = pollster::block_on(canvas.copy_selection(&clipboard, args.preset.into()))?;
    eprintln!("{}", outcome.status_message());
    Ok(())
}

fn cmd_paste(mut canvas: Canvas, scene: &Path) -> anyhow::Result<()> {
    let clipboard = SystemClipboard::new()?;
    let outcome = pollster::block_on(canvas.paste(&clipboard, &UsvgProbe::new()))?;
    save_scene(scene, &canvas.document)?;
    eprintln!("{}", outcome.status_message());
    Ok(())
}

fn cmd_render(mut canvas: Canvas, args: RenderArgs) -> anyhow::Result<()> {
    let viewport = Size::new(args.width, args.height);
    let metrics = canvas.metrics();
    let bounds = Rect::from_origin_size((0.0, 0.0), canvas_size(&canvas.document.rows, metrics.cell_step));
    canvas.camera.fit_to_bounds(bounds, viewport, 24.0);
    let svg = render_canvas_svg(&canvas, viewport)?;

    if let Some(parent) = args.out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&args.out, svg).with_context(|| format!("write svg '{}'", args.out.display()))?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}
