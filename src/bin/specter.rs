use std::{
    io::BufReader,
    path::PathBuf,
    sync::{Arc, atomic::Ordering, mpsc},
    time::Duration,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use specter::{
    Compositor, Config, DisplayState, DisplayTransport, DisplayUpdate, FrameLoop, Rgb,
    SharedDisplay, TogglePolicy,
    capture::{
        CaptureMachine, CommandDescriptionService, FeedbackSequence, ProcessLauncher,
        SystemLauncher, apply_mixer, open_indicator,
    },
    config::TransportConfig,
    display::{
        FramebufferTransport, MemoryTransport, play_boot_video, show_logo, spawn_gpio_button,
        spawn_line_button,
    },
    shutdown::StopSignal,
};

#[derive(Parser, Debug)]
#[command(name = "specter", version)]
struct Cli {
    /// More log output (repeat for trace). `RUST_LOG` wins when set.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Drive the panel and the capture button until SIGINT/SIGTERM.
    Run(RunArgs),
    /// Render a single panel frame as a PNG.
    Frame(FrameArgs),
}

#[derive(Parser, Debug)]
struct CommonArgs {
    /// JSON config file; every field is optional.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Text font (TrueType/OpenType).
    #[arg(long)]
    font: Option<PathBuf>,

    /// Emoji font.
    #[arg(long)]
    emoji_font: Option<PathBuf>,

    #[arg(long)]
    fps: Option<u32>,
}

#[derive(Parser, Debug)]
struct RunArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Image shown while recording.
    #[arg(long)]
    img1: Option<PathBuf>,

    /// Image shown during playback.
    #[arg(long)]
    img2: Option<PathBuf>,

    /// Sound played once at startup.
    #[arg(long)]
    boot_audio: Option<PathBuf>,

    /// `toggle` or `continuous`.
    #[arg(long)]
    policy: Option<TogglePolicy>,

    /// Render into memory instead of the framebuffer.
    #[arg(long)]
    headless: bool,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    #[arg(long)]
    status: Option<String>,

    #[arg(long)]
    glyph: Option<String>,

    /// Body text.
    #[arg(long)]
    text: Option<String>,

    /// Body scroll offset in pixels.
    #[arg(long, default_value_t = 0)]
    offset: u32,

    /// Battery level 0..=100.
    #[arg(long)]
    battery: Option<u8>,

    /// Battery fill color (`#rrggbb`).
    #[arg(long)]
    battery_color: Option<String>,

    /// Full-screen image instead of the header/body layout.
    #[arg(long)]
    image: Option<PathBuf>,

    /// Solid full-screen color (`#rrggbb`).
    #[arg(long)]
    fill: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    specter::logging::init(cli.verbose);
    match cli.cmd {
        Command::Run(args) => cmd_run(args),
        Command::Frame(args) => cmd_frame(args),
    }
}

fn load_config(args: &CommonArgs) -> anyhow::Result<Config> {
    let mut cfg = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(font) = &args.font {
        cfg.fonts.text = Some(font.clone());
    }
    if let Some(font) = &args.emoji_font {
        cfg.fonts.emoji = Some(font.clone());
    }
    if let Some(fps) = args.fps {
        cfg.fps = fps;
    }
    Ok(cfg)
}

fn cmd_run(args: RunArgs) -> anyhow::Result<()> {
    let mut cfg = load_config(&args.common)?;
    if let Some(img) = args.img1 {
        cfg.audio.recording_image = Some(img);
    }
    if let Some(img) = args.img2 {
        cfg.audio.playback_image = Some(img);
    }
    if let Some(sound) = args.boot_audio {
        cfg.audio.boot_audio = Some(sound);
    }
    if let Some(policy) = args.policy {
        cfg.audio.policy = policy;
    }
    if args.headless {
        cfg.transport = TransportConfig::Memory;
    }
    cfg.validate()?;

    let stop = StopSignal::install()?;
    let launcher: Arc<dyn ProcessLauncher> = Arc::new(SystemLauncher::default());
    apply_mixer(launcher.as_ref(), &cfg.mixer);

    match cfg.transport.clone() {
        TransportConfig::Framebuffer(fb) => {
            let transport = FramebufferTransport::open(cfg.panel, &fb)?;
            run_device(&cfg, transport, launcher, &stop)
        }
        TransportConfig::Memory => run_device(&cfg, MemoryTransport::new(cfg.panel), launcher, &stop),
    }
}

fn run_device<T: DisplayTransport>(
    cfg: &Config,
    mut transport: T,
    launcher: Arc<dyn ProcessLauncher>,
    stop: &StopSignal,
) -> anyhow::Result<()> {
    let fps = cfg.frame_rate()?;
    let flag = stop.flag();

    show_logo(
        &mut transport,
        cfg.boot.logo.as_deref(),
        Duration::from_millis(cfg.boot.logo_hold_ms),
        cfg.backlight,
    )?;
    if let Some(video) = &cfg.boot.video {
        match play_boot_video(&mut transport, &cfg.boot.ffmpeg, video, fps.frame_duration(), &flag) {
            Ok(frames) => tracing::info!(frames, "boot video finished"),
            Err(e) if !e.is_fatal() => tracing::warn!(error = %e, "boot video failed"),
            Err(e) => return Err(e.into()),
        }
    }

    let compositor = Compositor::new(cfg.panel, cfg.fonts.load()?, cfg.header, cfg.body)?;
    let display = SharedDisplay::new(DisplayState::default());

    let (events, presses) = mpsc::channel();
    if cfg.button.stdin {
        // Blocks on stdin; never joined.
        spawn_line_button(BufReader::new(std::io::stdin()), events.clone());
    }
    let gpio = cfg
        .button
        .gpio
        .clone()
        .map(|gpio| spawn_gpio_button(gpio, events.clone(), Arc::clone(&flag)));
    drop(events);

    let mut machine = CaptureMachine::new(
        cfg.audio.clone(),
        launcher,
        CommandDescriptionService::from_config(&cfg.describe),
        open_indicator(cfg.feedback.led.as_ref()),
        FeedbackSequence::new(&cfg.feedback),
        display.clone(),
    );
    let machine_stop = Arc::clone(&flag);
    let controller = std::thread::Builder::new()
        .name("capture".to_string())
        .spawn(move || {
            let result = match machine.start() {
                Ok(()) => machine.run(&presses, &machine_stop),
                Err(e) => {
                    machine.shutdown();
                    Err(e)
                }
            };
            if result.is_err() {
                machine_stop.store(true, Ordering::SeqCst);
            }
            result
        })
        .context("spawn capture thread")?;

    let mut frames = FrameLoop::new(compositor, transport, display, fps);
    let frame_result = frames.run(&flag);
    stop.raise();

    let controller_result = controller
        .join()
        .map_err(|_| anyhow::anyhow!("capture thread panicked"))?;
    if let Some(gpio) = gpio {
        let _ = gpio.join();
    }

    let mut transport = frames.into_transport();
    transport.release()?;
    let stats = frame_result?;
    controller_result?;
    tracing::info!(
        frames = stats.frames,
        unchanged = stats.unchanged,
        overruns = stats.overruns,
        "shut down"
    );
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let cfg = load_config(&args.common)?;
    cfg.validate()?;

    let mut update = DisplayUpdate::new();
    if let Some(status) = args.status {
        update = update.status(status);
    }
    if let Some(glyph) = args.glyph {
        update = update.glyph(glyph);
    }
    if let Some(text) = args.text {
        update = update.body_text(text);
    }
    if let Some(level) = args.battery {
        let color = match &args.battery_color {
            Some(hex) => Rgb::from_hex(hex)?,
            None => Rgb::new(0x55, 0xFF, 0x00),
        };
        update = update.battery(level, color);
    }
    if let Some(image) = args.image {
        update = update.image(image);
    }
    if let Some(fill) = &args.fill {
        update = update.fill(Rgb::from_hex(fill)?);
    }
    update = update.scroll_offset(args.offset);
    let state = DisplayState::default().apply(&update);

    let compositor = Compositor::new(cfg.panel, cfg.fonts.load()?, cfg.header, cfg.body)?;
    let mut frames = FrameLoop::new(
        compositor,
        MemoryTransport::new(cfg.panel),
        SharedDisplay::new(state),
        cfg.frame_rate()?,
    );
    frames.tick()?;
    if frames.stats().unchanged > 0 {
        anyhow::bail!("nothing rendered (image failed to decode?)");
    }
    let panel = frames.into_transport().to_image()?;

    if let Some(parent) = args.out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    panel
        .save_with_format(&args.out, image::ImageFormat::Png)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}
