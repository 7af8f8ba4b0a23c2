use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use mecate::{CollageSpec, FontStack, Manifest, RenderWarning};

#[derive(Parser, Debug)]
#[command(name = "mecate", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the full collage as a PDF.
    Render(RenderArgs),
    /// Render a single page as a PNG.
    Page(PageArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input manifest JSON (photo paths resolve relative to it).
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PDF path.
    #[arg(long, default_value = mecate::DOWNLOAD_FILE_NAME)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct PageArgs {
    /// Input manifest JSON (photo paths resolve relative to it).
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Page index (0-based).
    #[arg(long)]
    page: usize,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Page(args) => cmd_page(args),
    }
}

fn read_manifest(path: &Path) -> anyhow::Result<(CollageSpec, FontStack, Vec<RenderWarning>)> {
    let f = File::open(path).with_context(|| format!("open manifest '{}'", path.display()))?;
    let r = BufReader::new(f);
    let manifest: Manifest = serde_json::from_reader(r).with_context(|| "parse manifest JSON")?;

    let assets_root = path.parent().unwrap_or_else(|| Path::new("."));
    let fonts = manifest.font_stack(assets_root);
    let (spec, warnings) = manifest.into_spec(assets_root)?;
    Ok((spec, fonts, warnings))
}

fn report_warnings(warnings: &[RenderWarning]) {
    for w in warnings {
        eprintln!("warning: {w}");
    }
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let (spec, fonts, input_warnings) = read_manifest(&args.in_path)?;
    report_warnings(&input_warnings);

    let output = mecate::render_collage(&spec, &fonts)?;
    report_warnings(&output.warnings);

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&args.out, &output.pdf)
        .with_context(|| format!("write pdf '{}'", args.out.display()))?;

    eprintln!(
        "wrote {} ({} page{})",
        args.out.display(),
        output.page_count,
        if output.page_count == 1 { "" } else { "s" }
    );
    Ok(())
}

fn cmd_page(args: PageArgs) -> anyhow::Result<()> {
    let (spec, fonts, input_warnings) = read_manifest(&args.in_path)?;
    report_warnings(&input_warnings);

    let rendered = mecate::render_pages(&spec, &fonts)?;
    report_warnings(&rendered.warnings);

    let page = rendered.pages.get(args.page).with_context(|| {
        format!(
            "page {} out of range (document has {})",
            args.page,
            rendered.pages.len()
        )
    })?;

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    image::save_buffer_with_format(
        &args.out,
        &page.data,
        page.width,
        page.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}
