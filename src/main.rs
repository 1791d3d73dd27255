mod app;
mod clock;
mod config;
mod gfx;
mod input;
mod render;
mod roster;
mod timeline;

use anyhow::{Context, Result};
use app::App;
use calloop::channel::{self, Event as ChannelEvent};
use calloop::EventLoop;
use clock::Clock;
use config::Config;
use log::{error, info, warn};
use render::TerminalSink;
use roster::Roster;
use timeline::TimelineController;

fn main() -> Result<()> {
    env_logger::init();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            warn!("Ignoring config: {:#}", e);
            Config::default()
        }
    };
    info!("Loaded config: {:?}", config);

    let roster = match &config.roster_path {
        Some(path) => Roster::load(path)
            .with_context(|| format!("Failed to load roster from {}", path.display()))?,
        None => Roster::builtin()?,
    };
    let timeline = TimelineController::new(roster, config.speed_limits());
    info!("Roster has {} entities", timeline.roster().len());
    let sink = TerminalSink::new(std::io::stdout(), config.show_legend);
    let mut app = App::new(timeline, Box::new(sink));

    let mut event_loop: EventLoop<'static, App> = EventLoop::try_new()?;
    let handle = event_loop.handle();

    // Intents are parsed off-thread but applied here, on the loop thread.
    let (sender, intents) = channel::channel();
    handle
        .insert_source(intents, move |event, _, app: &mut App| match event {
            ChannelEvent::Msg(ev) => {
                if let Err(e) = app.handle_event(ev) {
                    error!("Render failed: {:#}", e);
                    app.running = false;
                }
            }
            ChannelEvent::Closed => {
                app.running = false;
            }
        })
        .map_err(|e| anyhow::anyhow!("Failed to listen for input: {}", e.error))?;
    input::spawn_stdin_reader(sender)?;

    println!("{}", input::HELP);
    app.render()?;

    let mut clock = Clock::new(config.tick_interval());
    clock.start(&handle)?;

    // Main loop
    while app.running {
        event_loop.dispatch(None, &mut app)?;
    }

    clock.stop(&handle);
    info!(
        "Stopped at t={:.3} speed={} playing={} after {} frames",
        app.timeline.time(),
        app.timeline.speed(),
        app.timeline.is_playing(),
        app.frames_rendered()
    );

    Ok(())
}
