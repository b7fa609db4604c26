use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use newsreel::news::gateway::{DEFAULT_KEYWORD, DEFAULT_MAX_STORIES, DEFAULT_UPSTREAM_URL};
use newsreel::{
    CaptureEvent, CapturePipeline, CaptureSettings, Container, CpuSurface, DrawingSurface,
    FfmpegHost, FfmpegSinkOpts, FontConfig, FrameIndex, GatewayConfig, ImmediateClock,
    NewsGateway, PacedClock, SceneRenderer, SelectionState, Story,
};

#[derive(Parser, Debug)]
#[command(name = "newsreel", version, about = "AI tooling news briefings as short videos")]
struct Cli {
    #[command(flatten)]
    source: SourceArgs,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the curated stories.
    Stories(StoriesArgs),
    /// Render a single briefing frame as a PNG.
    Frame(FrameArgs),
    /// Record a full briefing video (requires `ffmpeg` on PATH).
    Render(RenderArgs),
    /// Serve `GET /api/news`.
    Serve(ServeArgs),
}

#[derive(Args, Debug)]
struct SourceArgs {
    /// Upstream search URL.
    #[arg(long, global = true, env = "NEWSREEL_UPSTREAM_URL", default_value = DEFAULT_UPSTREAM_URL)]
    upstream_url: String,

    /// Case-insensitive substring a headline must contain.
    #[arg(long, global = true, env = "NEWSREEL_KEYWORD", default_value = DEFAULT_KEYWORD)]
    keyword: String,

    /// Maximum stories kept per fetch.
    #[arg(long, global = true, env = "NEWSREEL_MAX_STORIES", default_value_t = DEFAULT_MAX_STORIES)]
    max_stories: usize,

    /// Upstream request timeout in seconds.
    #[arg(long, global = true, env = "NEWSREEL_TIMEOUT_SECS", default_value_t = 15)]
    timeout_secs: u64,
}

impl SourceArgs {
    fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig {
            upstream_url: self.upstream_url.clone(),
            keyword: self.keyword.clone(),
            max_stories: self.max_stories,
            timeout: Duration::from_secs(self.timeout_secs),
            ..Default::default()
        }
    }
}

#[derive(Args, Debug)]
struct FontArgs {
    /// Regular-weight font file. Defaults to a probed system font.
    #[arg(long, env = "NEWSREEL_FONT")]
    font: Option<PathBuf>,

    /// Bold font file. Defaults to a probed system font, then the regular font.
    #[arg(long, env = "NEWSREEL_FONT_BOLD")]
    font_bold: Option<PathBuf>,
}

impl FontArgs {
    fn config(&self) -> FontConfig {
        FontConfig {
            regular: self.font.clone(),
            bold: self.font_bold.clone(),
        }
    }
}

#[derive(Args, Debug)]
struct StoriesArgs {
    /// Print the stories as JSON instead of a table.
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct FrameArgs {
    /// Position of the story in the curated list (0-based).
    #[arg(long, default_value_t = 0)]
    story: usize,

    /// Frame index (0-based, at most the total frame count).
    #[arg(long)]
    frame: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    fonts: FontArgs,
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Position of the story in the curated list (0-based).
    #[arg(long, default_value_t = 0)]
    story: usize,

    /// Directory the video is written into, named after the story id.
    #[arg(long, env = "NEWSREEL_OUT_DIR", default_value = "out")]
    out_dir: PathBuf,

    /// Output container: webm (VP9 + Opus) or mp4 (H.264 + AAC).
    #[arg(long, default_value = "webm")]
    format: Container,

    /// Pace ticks at the capture frame rate instead of rendering as fast as possible.
    #[arg(long)]
    realtime: bool,

    #[command(flatten)]
    fonts: FontArgs,
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Address to listen on.
    #[arg(long, env = "NEWSREEL_BIND", default_value = "127.0.0.1:3000")]
    bind: SocketAddr,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("newsreel=info")),
        )
        .init();

    let cli = Cli::parse();
    let gateway_cfg = cli.source.gateway_config();
    match cli.cmd {
        Command::Stories(args) => cmd_stories(gateway_cfg, args).await,
        Command::Frame(args) => cmd_frame(gateway_cfg, args).await,
        Command::Render(args) => cmd_render(gateway_cfg, args).await,
        Command::Serve(args) => cmd_serve(gateway_cfg, args).await,
    }
}

async fn load_selection(cfg: GatewayConfig) -> anyhow::Result<SelectionState> {
    let gateway = NewsGateway::new(cfg).context("configure news gateway")?;
    let stories = gateway.fetch_stories().await.context("fetch stories")?;
    let mut selection = SelectionState::new();
    selection.load(stories);
    Ok(selection)
}

fn pick_story(selection: &mut SelectionState, position: usize) -> anyhow::Result<Story> {
    let story = selection.stories().get(position).cloned().with_context(|| {
        format!(
            "story {position} out of range ({} stories fetched)",
            selection.stories().len()
        )
    })?;
    selection.select(&story);
    Ok(story)
}

async fn cmd_stories(cfg: GatewayConfig, args: StoriesArgs) -> anyhow::Result<()> {
    let selection = load_selection(cfg).await?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(selection.stories())?);
        return Ok(());
    }
    if selection.is_empty() {
        eprintln!("no matching stories");
    }
    for (i, s) in selection.stories().iter().enumerate() {
        println!(
            "{i:>2}  {:<8}  {:>4} pts  {}  ({})",
            s.cadence.label(),
            s.points,
            s.title,
            s.source_domain().unwrap_or_else(|| "news.ycombinator.com".to_owned())
        );
    }
    Ok(())
}

async fn cmd_frame(cfg: GatewayConfig, args: FrameArgs) -> anyhow::Result<()> {
    let mut selection = load_selection(cfg).await?;
    let story = pick_story(&mut selection, args.story)?;

    let settings = CaptureSettings::default();
    let total = settings.total_frames();
    anyhow::ensure!(
        args.frame <= total,
        "frame {} out of range (0..={total})",
        args.frame
    );

    let fonts = args.fonts.config().load()?;
    let mut surface = CpuSurface::new(settings.canvas, &fonts)?;
    let cmds = SceneRenderer::new(settings.canvas).render_frame(
        &story,
        FrameIndex(args.frame),
        total,
        &mut surface,
    );
    surface.paint(&cmds)?;
    let frame = surface.frame();

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    let rgba = unpremultiply(&frame.data);
    image::save_buffer_with_format(
        &args.out,
        &rgba,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

async fn cmd_render(cfg: GatewayConfig, args: RenderArgs) -> anyhow::Result<()> {
    let mut selection = load_selection(cfg).await?;
    let story = pick_story(&mut selection, args.story)?;

    let mut sink_opts = FfmpegSinkOpts::new(&args.out_dir);
    sink_opts.container = args.format;
    let fonts = args.fonts.config();
    let realtime = args.realtime;

    let artifact = tokio::task::spawn_blocking(move || -> anyhow::Result<_> {
        let settings = CaptureSettings::default();
        let host = FfmpegHost::new(fonts, sink_opts);
        let mut pipeline = CapturePipeline::new(host, settings)?;
        pipeline.subscribe(|event| match event {
            CaptureEvent::State(status) => tracing::info!(%status, "capture state"),
            CaptureEvent::Progress(pct) if pct % 10 == 0 => {
                tracing::info!(progress = pct, "capture progress")
            }
            CaptureEvent::Progress(_) => {}
        });
        pipeline.generate(Some(&story))?;
        let artifact = if realtime {
            pipeline.run_to_completion(&mut PacedClock::new(settings.fps))?
        } else {
            pipeline.run_to_completion(&mut ImmediateClock)?
        }
        .clone();
        eprintln!("{}", pipeline.status_message());
        Ok(artifact)
    })
    .await
    .context("capture task panicked")??;

    println!("{}", artifact.url);
    Ok(())
}

async fn cmd_serve(cfg: GatewayConfig, args: ServeArgs) -> anyhow::Result<()> {
    let gateway = NewsGateway::new(cfg).context("configure news gateway")?;
    newsreel::server::serve(args.bind, newsreel::server::AppState::new(gateway)).await?;
    Ok(())
}

fn unpremultiply(premul: &[u8]) -> Vec<u8> {
    let mut out = premul.to_vec();
    for px in out.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 0 || a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
    out
}
