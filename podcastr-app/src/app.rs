use crate::commands::{Command, HELP};
use crate::render;
use crate::timer::TimerBackend;
use podcastr_core::{
    CoreError, HomeListing, PlayerContext, PlayerEvent, PlayerSurface, SurfaceInput,
};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Interactive session: listing, shared player state, and the player surface
pub struct App {
    listing: HomeListing,
    context: Arc<PlayerContext>,
    surface: PlayerSurface<TimerBackend>,
    cancel_token: CancellationToken,
}

impl App {
    #[must_use]
    pub fn new(
        listing: HomeListing,
        context: Arc<PlayerContext>,
        backend: TimerBackend,
        cancel_token: CancellationToken,
    ) -> Self {
        let surface = PlayerSurface::new(context.clone(), backend);
        Self {
            listing,
            context,
            surface,
            cancel_token,
        }
    }

    /// Read commands from stdin while driving the player, until quit, EOF,
    /// or cancellation
    pub async fn run(mut self) {
        println!("{}", render::listing(&self.listing));
        println!("{}", render::player(&self.surface.view().await));
        println!("Type \"help\" for commands.");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            tokio::select! {
                () = self.cancel_token.cancelled() => {
                    info!("Session cancelled");
                    break;
                }
                line = lines.next_line() => match line {
                    Ok(Some(line)) => {
                        if !self.on_line(&line).await {
                            break;
                        }
                    }
                    Ok(None) => {
                        info!("Input closed");
                        break;
                    }
                    Err(e) => {
                        error!("Failed to read input: {}", e);
                        break;
                    }
                },
                input = self.surface.next_input() => {
                    let announce = matches!(
                        input,
                        SurfaceInput::Player(
                            PlayerEvent::EpisodeChanged { .. } | PlayerEvent::Cleared
                        )
                    );
                    if !self.surface.handle(input).await {
                        break;
                    }
                    if announce {
                        println!("{}", render::player(&self.surface.view().await));
                    }
                }
            }
        }

        self.context.clear_player_state().await;
    }

    /// Returns `false` when the session should end
    async fn on_line(&mut self, line: &str) -> bool {
        match line.parse::<Command>() {
            Ok(Command::Quit) => false,
            Ok(command) => {
                if let Err(e) = self.execute(command).await {
                    warn!("{}", e);
                    println!("{e}");
                }
                true
            }
            Err(e) => {
                println!("{e}");
                true
            }
        }
    }

    async fn execute(&mut self, command: Command) -> Result<(), CoreError> {
        let controls = self.surface.view().await.controls;

        match command {
            Command::Play(number) => {
                let row = number - 1;
                let latest = self.listing.latest().len();
                if row < latest {
                    self.listing.play_latest(&self.context, row).await?;
                } else {
                    self.listing.play_remaining(&self.context, row - latest).await?;
                }
            }
            Command::Single(number) => {
                let queue = self.listing.queue();
                let episode = queue.get(number - 1).cloned().ok_or(
                    CoreError::QueueIndexOutOfRange {
                        index: number - 1,
                        len: queue.len(),
                    },
                )?;
                self.context.play_episode(episode).await;
            }
            Command::Toggle if controls.play => self.context.toggle_play().await,
            Command::Next if controls.next => {
                self.context.play_next().await;
            }
            Command::Previous if controls.previous => {
                self.context.play_previous().await;
            }
            Command::Shuffle if controls.shuffle => self.context.toggle_shuffle().await,
            Command::Loop if controls.repeat => self.context.toggle_loop().await,
            Command::Toggle
            | Command::Next
            | Command::Previous
            | Command::Shuffle
            | Command::Loop => println!("That control is disabled right now."),
            Command::Seek(seconds) => {
                self.surface.seek(seconds)?;
                println!("{}", render::player(&self.surface.view().await));
            }
            Command::Status => println!("{}", render::player(&self.surface.view().await)),
            Command::List => println!("{}", render::listing(&self.listing)),
            Command::Stop => self.context.clear_player_state().await,
            Command::Help => println!("{HELP}"),
            Command::Quit => {}
        }
        Ok(())
    }
}
