use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "storyreel", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the playable length of a narration file.
    Probe(ProbeArgs),
    /// Lay out a story project and print its page segments.
    Timeline(TimelineArgs),
    /// Print the effect viewport of one page at a given progress.
    Sample(SampleArgs),
    /// Render the still shown at one output frame as a PNG.
    Frame(FrameArgs),
}

#[derive(Parser, Debug)]
struct ProbeArgs {
    /// Audio file to measure.
    #[arg(long)]
    audio: PathBuf,
}

#[derive(Parser, Debug)]
struct TimelineArgs {
    /// Input story project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Emit segments as JSON instead of text.
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Stop at the first page that fails.
    #[arg(long, default_value_t = false)]
    fail_fast: bool,
}

#[derive(Parser, Debug)]
struct SampleArgs {
    /// Input story project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Page index (0-based).
    #[arg(long)]
    page: usize,

    /// Effect progress in [0, 1].
    #[arg(long)]
    progress: f64,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input story project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output frame index (0-based).
    #[arg(long)]
    frame: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_env("STORYREEL_LOG"))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Probe(args) => cmd_probe(args),
        Command::Timeline(args) => cmd_timeline(args),
        Command::Sample(args) => cmd_sample(args),
        Command::Frame(args) => cmd_frame(args),
    }
}

fn load_project(path: &Path) -> anyhow::Result<(storyreel::StoryProject, PathBuf)> {
    let project = storyreel::StoryProject::from_path(path)
        .with_context(|| format!("load story project '{}'", path.display()))?;
    Ok((project, storyreel::assets_root_for(path)))
}

fn assemble(
    project: &storyreel::StoryProject,
    assets_root: &Path,
    cache: &storyreel::ImageCache,
    fail_fast: bool,
) -> anyhow::Result<storyreel::StoryTimeline> {
    let probe = project.duration_probe(assets_root);
    let assembler = storyreel::Assembler::new(storyreel::AssemblerOpts {
        fps: project.fps,
        fail_fast,
    });
    Ok(assembler.assemble(&project.pages, &probe, cache)?)
}

fn cmd_probe(args: ProbeArgs) -> anyhow::Result<()> {
    use storyreel::DurationProbe as _;

    let probe = storyreel::FsDurationProbe::new(".");
    let d = probe.probe(&args.audio)?;
    println!("{}\tsecs={}\tmillis={}", args.audio.display(), d.as_secs(), d.as_millis());
    Ok(())
}

fn cmd_timeline(args: TimelineArgs) -> anyhow::Result<()> {
    let (project, assets_root) = load_project(&args.in_path)?;
    let cache = project.image_cache(&assets_root)?;
    let timeline = assemble(&project, &assets_root, &cache, args.fail_fast)?;

    if args.json {
        let failures: Vec<serde_json::Value> = timeline
            .failures
            .iter()
            .map(|f| serde_json::json!({ "index": f.index, "error": f.error.to_string() }))
            .collect();
        let out = serde_json::json!({
            "fps": timeline.fps,
            "segments": timeline.segments,
            "failures": failures,
            "total_millis": timeline.total_duration().as_millis(),
            "total_frames": timeline.total_frames(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    for seg in &timeline.segments {
        println!(
            "page {:>3}  start={}  duration={}  frames={}..{}  image={} ({}x{})",
            seg.index,
            seg.start,
            seg.duration,
            seg.frames.start.0,
            seg.frames.end.0,
            seg.image_key,
            seg.image_width,
            seg.image_height,
        );
    }
    for failure in &timeline.failures {
        println!("page {:>3}  FAILED: {}", failure.index, failure.error);
    }
    println!(
        "total {} over {} frames",
        timeline.total_duration(),
        timeline.total_frames()
    );
    Ok(())
}

fn cmd_sample(args: SampleArgs) -> anyhow::Result<()> {
    let (project, _) = load_project(&args.in_path)?;
    let page = project.pages.get(args.page).with_context(|| {
        format!(
            "page {} out of range (project has {})",
            args.page,
            project.pages.len()
        )
    })?;
    let vp = page.effect().evaluate(args.progress.clamp(0.0, 1.0));
    println!("{} {} {} {}", vp.x0, vp.y0, vp.x1, vp.y1);
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let (project, assets_root) = load_project(&args.in_path)?;
    let cache = project.image_cache(&assets_root)?;
    let timeline = assemble(&project, &assets_root, &cache, false)?;

    let frame = storyreel::FrameIndex(args.frame);
    let seg = timeline
        .segment_at(frame)
        .with_context(|| format!("frame {} is past the end of the story", args.frame))?;
    let vp = timeline
        .viewport_at(frame)
        .context("frame has no viewport")?;

    let page = project
        .pages
        .get(seg.index)
        .context("segment refers to a missing page")?;
    let decoded = page.image(&cache)?;
    let visible = vp.intersect(decoded.bounds());
    if visible.width() <= 0.0 || visible.height() <= 0.0 {
        anyhow::bail!(
            "viewport {},{}..{},{} of page {} lies outside its {}x{} image",
            vp.x0,
            vp.y0,
            vp.x1,
            vp.y1,
            seg.index,
            decoded.width,
            decoded.height
        );
    }

    let src = image::RgbaImage::from_raw(decoded.width, decoded.height, decoded.to_straight_rgba8())
        .context("decoded image buffer has unexpected size")?;

    let x = visible.x0.floor() as u32;
    let y = visible.y0.floor() as u32;
    let w = ((visible.x1.ceil() as u32).min(decoded.width) - x).max(1);
    let h = ((visible.y1.ceil() as u32).min(decoded.height) - y).max(1);
    let cropped = image::imageops::crop_imm(&src, x, y, w, h).to_image();
    let still = image::imageops::resize(
        &cropped,
        project.canvas.width,
        project.canvas.height,
        image::imageops::FilterType::Triangle,
    );

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    still
        .save_with_format(&args.out, image::ImageFormat::Png)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}
