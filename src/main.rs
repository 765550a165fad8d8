use std::path::PathBuf;
use std::time::Instant;

use anyhow::{anyhow, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use log::{info, warn, LevelFilter};
use sdl2::keyboard::Keycode;

use tileblit::display::{pack_abgr, Display, InputEvent, RenderTarget};
use tileblit::source::{ColorBars, FrameSource, Plasma};
use tileblit::util::FpsCounter;
use tileblit::{logger, FrameCompositor, PixelBuffer, TiledSurface, VideoConfig, Viewport};

/// Native resolution of the synthetic frame sources
const SOURCE_WIDTH: u32 = 320;
const SOURCE_HEIGHT: u32 = 240;

/// Command line options layered over the config file
struct Options {
    config: Option<PathBuf>,
    width: Option<u32>,
    height: Option<u32>,
    no_vsync: bool,
    fast_forward: bool,
    frames: Option<u64>,
    headless: bool,
    verbose: bool,
}

fn command_parser() -> Command {
    Command::new("tileblit")
        .about("Composes frames and presents them through a swizzled tiled framebuffer")
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .value_parser(value_parser!(PathBuf))
                .help("JSON video config"),
        )
        .arg(
            Arg::new("width")
                .long("width")
                .value_parser(value_parser!(u32))
                .help("Override the logical width"),
        )
        .arg(
            Arg::new("height")
                .long("height")
                .value_parser(value_parser!(u32))
                .help("Override the logical height"),
        )
        .arg(
            Arg::new("no-vsync")
                .long("no-vsync")
                .action(ArgAction::SetTrue)
                .help("Disable VSync for uncapped framerate"),
        )
        .arg(
            Arg::new("fast-forward")
                .long("fast-forward")
                .action(ArgAction::SetTrue)
                .help("Present only every 4th frame"),
        )
        .arg(
            Arg::new("frames")
                .long("frames")
                .value_parser(value_parser!(u64))
                .help("Stop after this many frames"),
        )
        .arg(
            Arg::new("headless")
                .long("headless")
                .action(ArgAction::SetTrue)
                .help("Run the blit path without opening a window"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .action(ArgAction::SetTrue)
                .help("Enable debug logging"),
        )
}

fn parse_arguments(matches: &ArgMatches) -> Options {
    Options {
        config: matches.get_one::<PathBuf>("config").cloned(),
        width: matches.get_one::<u32>("width").copied(),
        height: matches.get_one::<u32>("height").copied(),
        no_vsync: matches.get_flag("no-vsync"),
        fast_forward: matches.get_flag("fast-forward"),
        frames: matches.get_one::<u64>("frames").copied(),
        headless: matches.get_flag("headless"),
        verbose: matches.get_flag("verbose"),
    }
}

fn resolve_config(options: &Options) -> Result<VideoConfig> {
    let mut config = match &options.config {
        Some(path) => VideoConfig::load(path)?,
        None => VideoConfig::default(),
    };
    if let Some(w) = options.width {
        config.width = w;
    }
    if let Some(h) = options.height {
        config.height = h;
    }
    if options.no_vsync {
        config.vsync = false;
    }
    if options.fast_forward {
        config.fast_forward = true;
    }
    config.validate()?;
    Ok(config)
}

/// Keyed status strip along the bottom edge: a frame around a bar whose
/// length follows the average frame time against a 60 Hz budget
fn draw_status(overlay: &mut PixelBuffer, avg_ms: f32) {
    let w = overlay.width();
    let h = overlay.height();
    overlay.clear(0);
    if w < 16 || h < 24 {
        return;
    }
    let strip_w = w / 3;
    let y = h as i32 - 20;
    overlay.draw_rect(8, y, strip_w, 12, pack_abgr(255, 255, 255, 255));

    let budget_ms = 1000.0 / 60.0;
    let fill = ((avg_ms / budget_ms).min(1.0) * (strip_w - 4) as f32) as u32;
    let color = if avg_ms > budget_ms {
        pack_abgr(230, 40, 40, 255)
    } else {
        pack_abgr(40, 230, 80, 255)
    };
    overlay.fill_rect(10, y + 2, fill, 8, color);
}

/// Menu panel with transparent margins so the background shows through
fn build_menu() -> PixelBuffer {
    let mut menu = PixelBuffer::with_size(160, 90);
    menu.fill_rect(10, 10, 140, 70, pack_abgr(20, 20, 60, 255));
    menu.draw_rect(10, 10, 140, 70, pack_abgr(255, 255, 255, 255));
    for i in 0..4 {
        menu.fill_rect(20, 20 + i * 14, 120, 8, pack_abgr(90, 90, 160, 255));
    }
    menu
}

fn main() -> Result<()> {
    let options = parse_arguments(&command_parser().get_matches());
    logger::init(if options.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    });

    let config = resolve_config(&options)?;
    info!(
        "resolution {}x{}, vsync {}, fast-forward {}",
        config.width, config.height, config.vsync, config.fast_forward
    );
    info!(
        "tile layout: y mask {:#x}, tile {}x{}, padded width {}",
        config.layout.y_mask,
        config.layout.tile_width(),
        config.layout.tile_height,
        config.layout.padded_width
    );

    let mut sources: Vec<Box<dyn FrameSource>> = vec![
        Box::new(Plasma::new()),
        Box::new(ColorBars::new()),
    ];
    let mut current = 0;

    let mut compositor = FrameCompositor::new(config.width, config.height);
    compositor.set_viewport(Viewport::centered(
        config.width,
        config.height,
        SOURCE_WIDTH * 3,
        SOURCE_HEIGHT * 3,
    ));
    compositor.set_fast_forward(config.fast_forward);
    compositor.set_overlay(Some(PixelBuffer::with_size(config.width, config.height)));
    let menu = build_menu();

    let mut surface = TiledSurface::new(config.width, config.height, config.layout);
    let mut frame = PixelBuffer::with_size(SOURCE_WIDTH, SOURCE_HEIGHT);
    let mut fps = FpsCounter::new(120);
    let mut blit_time = FpsCounter::new(120);

    if options.headless {
        let frames = options.frames.unwrap_or(600);
        for frame_count in 0..frames {
            let (dt, _) = fps.tick();
            sources[current].update(dt);
            if !compositor.should_present(frame_count) {
                continue;
            }
            sources[current].render(&mut frame);
            compositor.submit_frame(&frame);

            let start = Instant::now();
            compositor.present(frame_count, &mut surface);
            blit_time.record(start.elapsed().as_secs_f32());
        }
        info!(
            "{} frames, blit avg {:.3}ms, worst {:.3}ms",
            frames,
            blit_time.avg_frame_time_ms(),
            blit_time.max_frame_time_ms()
        );
        return Ok(());
    }

    let (mut display, texture_creator) =
        Display::with_options("tileblit", config.width, config.height, config.vsync)
            .map_err(|e| anyhow!(e))?;
    let mut target = RenderTarget::with_size(&texture_creator, config.width, config.height)
        .map_err(|e| anyhow!(e))?;
    let mut readback = PixelBuffer::with_size(config.width, config.height);

    info!("Controls: Tab source, F fast-forward, M menu, Escape quit");

    let mut frame_count: u64 = 0;
    'main: loop {
        if options.frames.is_some_and(|n| frame_count >= n) {
            break;
        }
        let (dt, avg_fps) = fps.tick();

        for event in display.poll_events() {
            match event {
                InputEvent::Quit | InputEvent::KeyDown(Keycode::Escape) => break 'main,
                InputEvent::KeyDown(Keycode::Tab) => {
                    current = (current + 1) % sources.len();
                    info!("source: {}", sources[current].name());
                },
                InputEvent::KeyDown(Keycode::F) => {
                    let enabled = !compositor.fast_forward();
                    compositor.set_fast_forward(enabled);
                    info!("fast-forward {}", if enabled { "on" } else { "off" });
                },
                InputEvent::KeyDown(Keycode::M) => {
                    if compositor.menu_enabled() {
                        compositor.set_menu_texture(None);
                    } else {
                        compositor.set_background(&frame);
                        compositor.set_menu_texture(Some(&menu));
                    }
                },
                _ => {},
            }
        }

        sources[current].update(dt);
        if compositor.should_present(frame_count) {
            sources[current].render(&mut frame);
            compositor.submit_frame(&frame);
            if let Some(overlay) = compositor.overlay_mut() {
                draw_status(overlay, blit_time.avg_frame_time_ms());
            }

            let start = Instant::now();
            compositor.present(frame_count, &mut surface);
            blit_time.record(start.elapsed().as_secs_f32());
            surface.detile_into(&mut readback);
            display
                .present(&mut target, &readback)
                .map_err(|e| anyhow!(e))?;
        }

        if frame_count % 300 == 0 && frame_count > 0 {
            info!(
                "{:.1} fps, blit {:.3}ms avg",
                avg_fps,
                blit_time.avg_frame_time_ms()
            );
            if blit_time.avg_frame_time_ms() > 1000.0 / 60.0 {
                warn!("blit alone exceeds the 60 Hz frame budget");
            }
        }
        frame_count += 1;
    }

    Ok(())
}
