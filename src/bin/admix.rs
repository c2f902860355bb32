use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "admix", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Flatten a campaign snapshot into a PNG.
    Export(ExportArgs),
    /// Parse a campaign snapshot and report problems without rendering.
    Validate(ValidateArgs),
}

#[derive(Parser, Debug)]
struct ExportArgs {
    /// Input campaign snapshot JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Root directory for relative image sources. Defaults to the
    /// snapshot's directory.
    #[arg(long)]
    assets_root: Option<PathBuf>,

    /// Output edge length in pixels.
    #[arg(long, default_value_t = 1024)]
    size: u32,

    /// Font registration, repeatable: `family:weight=path/to/font.ttf`.
    #[arg(long = "font")]
    fonts: Vec<String>,
}

#[derive(Parser, Debug)]
struct ValidateArgs {
    /// Input campaign snapshot JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Export(args) => cmd_export(args),
        Command::Validate(args) => cmd_validate(args),
    }
}

fn read_campaign(path: &PathBuf) -> anyhow::Result<admix::Campaign> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("read snapshot '{}'", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("parse snapshot '{}'", path.display()))
}

fn parse_font_spec(spec: &str) -> anyhow::Result<(String, u16, PathBuf)> {
    let (name, path) = spec
        .split_once('=')
        .with_context(|| format!("font spec '{spec}' must look like family:weight=path"))?;
    let (family, weight) = name
        .split_once(':')
        .with_context(|| format!("font spec '{spec}' is missing ':weight'"))?;
    let weight = admix::render::text::parse_font_weight(weight)?;
    Ok((family.to_string(), weight, PathBuf::from(path)))
}

fn cmd_export(args: ExportArgs) -> anyhow::Result<()> {
    let campaign = read_campaign(&args.in_path)?;
    let assets_root = args.assets_root.clone().unwrap_or_else(|| {
        args.in_path
            .parent()
            .unwrap_or_else(|| std::path::Path::new("."))
            .to_path_buf()
    });

    let mut fonts = admix::FontLibrary::new();
    for spec in &args.fonts {
        let (family, weight, path) = parse_font_spec(spec)?;
        fonts.load_file(family, weight, path)?;
    }
    let needs_fonts = campaign
        .layers
        .iter()
        .any(|l| l.visible && l.content.text().is_some());
    if fonts.is_empty() && needs_fonts {
        anyhow::bail!("snapshot contains visible text layers but no --font was given");
    }

    let config = admix::RenderConfig::with_output(admix::CanvasSize::new(args.size)?);
    let mut rasterizer = admix::Rasterizer::new(config, fonts);
    let mut assets = admix::AssetStore::new(assets_root);
    let png = admix::export_png(&mut rasterizer, &campaign, &mut assets)?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&args.out, png)
        .with_context(|| format!("write png '{}'", args.out.display()))?;
    println!("exported {} -> {}", args.in_path.display(), args.out.display());
    Ok(())
}

fn cmd_validate(args: ValidateArgs) -> anyhow::Result<()> {
    let campaign = read_campaign(&args.in_path)?;
    for layer in &campaign.layers {
        layer.validate()?;
    }
    let visible = campaign.layers.iter().filter(|l| l.visible).count();
    println!(
        "campaign '{}': {} layers ({} visible), background '{}'",
        campaign.id,
        campaign.layers.len(),
        visible,
        campaign.background
    );
    Ok(())
}
