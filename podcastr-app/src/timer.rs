//! Clock-driven stand-in for an audio engine.
//!
//! Each element runs a ticking task that advances a virtual position while
//! playing and reports through the same events a real player would.

use podcastr_core::{
    CoreError, DurationExt, Episode, MediaBackend, MediaElement, MediaEvent, MediaEventSender,
    PlaybackConfig,
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};
use tracing::debug;

const LOG_TARGET: &str = "podcastr::timer";

#[derive(Debug)]
struct Clock {
    position: f64,
    duration: f64,
    playing: bool,
}

/// Opens [`TimerElement`]s ticking at the configured rate
#[derive(Debug, Clone)]
pub struct TimerBackend {
    tick: Duration,
    speed: f64,
}

impl TimerBackend {
    #[must_use]
    pub const fn new(config: &PlaybackConfig) -> Self {
        Self {
            tick: config.tick_interval(),
            speed: config.speed,
        }
    }
}

impl MediaBackend for TimerBackend {
    type Element = TimerElement;

    fn open(&self, episode: &Episode, events: MediaEventSender) -> Result<TimerElement, CoreError> {
        #[allow(clippy::cast_precision_loss)]
        let duration = episode.duration as f64;
        let clock = Arc::new(Mutex::new(Clock {
            position: 0.0,
            duration,
            playing: false,
        }));

        debug!(
            target: LOG_TARGET,
            "Opening {} ({}, tick {}ms)",
            episode.url,
            episode.length().to_time_string(),
            self.tick.as_millis_u64()
        );
        let task = tokio::spawn(tick(
            clock.clone(),
            events.clone(),
            self.tick,
            self.tick.as_secs_f64() * self.speed,
            Duration::from_secs(episode.duration),
        ));

        Ok(TimerElement {
            clock,
            events,
            task,
        })
    }
}

async fn tick(
    clock: Arc<Mutex<Clock>>,
    events: MediaEventSender,
    period: Duration,
    step: f64,
    duration: Duration,
) {
    if events.send(MediaEvent::MetadataReady { duration }).is_err() {
        return;
    }

    let mut interval = interval_at(Instant::now() + period, period);
    loop {
        interval.tick().await;

        let mut reports = Vec::with_capacity(2);
        {
            let mut clock = lock(&clock);
            if !clock.playing {
                continue;
            }
            clock.position = (clock.position + step).min(clock.duration);
            reports.push(MediaEvent::TimeUpdate {
                current_time: clock.position,
            });
            if clock.position >= clock.duration {
                clock.playing = false;
                reports.push(MediaEvent::Ended);
            }
        }

        for event in reports {
            if events.send(event).is_err() {
                return;
            }
        }
    }
}

fn lock(clock: &Mutex<Clock>) -> MutexGuard<'_, Clock> {
    clock.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Simulated media element. Dropping it stops the clock.
#[derive(Debug)]
pub struct TimerElement {
    clock: Arc<Mutex<Clock>>,
    events: MediaEventSender,
    task: JoinHandle<()>,
}

impl TimerElement {
    fn report(&self, event: MediaEvent) -> Result<(), CoreError> {
        self.events.send(event).map_err(|_| CoreError::MediaFailed {
            reason: "player surface stopped listening".to_string(),
        })
    }
}

impl MediaElement for TimerElement {
    fn play(&mut self) -> Result<(), CoreError> {
        let started = {
            let mut clock = lock(&self.clock);
            if clock.position >= clock.duration {
                clock.position = 0.0;
            }
            !std::mem::replace(&mut clock.playing, true)
        };
        if started {
            self.report(MediaEvent::Played)?;
        }
        Ok(())
    }

    fn pause(&mut self) -> Result<(), CoreError> {
        let stopped = std::mem::replace(&mut lock(&self.clock).playing, false);
        if stopped {
            self.report(MediaEvent::Paused)?;
        }
        Ok(())
    }

    fn current_time(&self) -> f64 {
        lock(&self.clock).position
    }

    fn set_current_time(&mut self, seconds: f64) {
        let mut clock = lock(&self.clock);
        clock.position = seconds.clamp(0.0, clock.duration);
    }
}

impl Drop for TimerElement {
    fn drop(&mut self) {
        self.task.abort();
    }
}
