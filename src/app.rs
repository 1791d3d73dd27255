use crate::render::RenderSink;
use crate::timeline::{SpeedDirection, TimelineController};
use anyhow::Result;
use log::{info, warn};

/// User intents coming from the control surface.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    TogglePlay,
    Faster,
    Slower,
    ScrubTo(f64),
    ToggleVisibility(String),
    Quit,
}

pub struct App {
    pub timeline: TimelineController,
    pub running: bool,
    sink: Box<dyn RenderSink>,
    frames_rendered: u64,
}

impl App {
    pub fn new(timeline: TimelineController, sink: Box<dyn RenderSink>) -> Self {
        Self {
            timeline,
            running: true,
            sink,
            frames_rendered: 0,
        }
    }

    pub fn handle_event(&mut self, event: UiEvent) -> Result<()> {
        match event {
            UiEvent::TogglePlay => {
                self.timeline.toggle_play();
            }
            UiEvent::Faster => {
                self.timeline.set_speed(SpeedDirection::Faster);
            }
            UiEvent::Slower => {
                self.timeline.set_speed(SpeedDirection::Slower);
            }
            UiEvent::ScrubTo(value) => {
                self.timeline.scrub_to(value);
            }
            UiEvent::ToggleVisibility(id) => {
                if self.timeline.toggle_visibility(&id).is_none() {
                    warn!("No entity with id '{}'", id);
                }
            }
            UiEvent::Quit => {
                info!("Quit requested");
                self.running = false;
                return Ok(());
            }
        }
        self.render()
    }

    /// Called by the clock.
    pub fn update(&mut self) -> Result<()> {
        self.timeline.tick();
        self.render()
    }

    pub fn render(&mut self) -> Result<()> {
        let frame = self.timeline.snapshot();
        let legend = self.timeline.legend();
        self.sink.present(&frame, &legend)?;
        self.frames_rendered += 1;
        Ok(())
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }
}
