//! Plain-text rendering of the home listing and the player panel.

use podcastr_core::{ControlsState, Episode, HomeListing, PlayerView};
use std::fmt::Write;

const PROGRESS_WIDTH: usize = 30;

/// Render both listing sections with continuous 1-based row numbers
#[must_use]
pub fn listing(home: &HomeListing) -> String {
    let mut out = String::new();

    if home.is_empty() {
        out.push_str("No episodes available.\n");
        return out;
    }

    out.push_str("Latest releases\n");
    for (row, episode) in home.latest().iter().enumerate() {
        let _ = writeln!(out, "{}", listing_row(row + 1, episode));
    }

    if !home.remaining().is_empty() {
        out.push_str("\nAll episodes\n");
        let _ = writeln!(
            out,
            "     {:<40}  {:<24}  {:<10}  Duration",
            "Podcast", "Members", "Date"
        );
        for (row, episode) in home.remaining().iter().enumerate() {
            let number = home.remaining_queue_index(row) + 1;
            let _ = writeln!(out, "{}", listing_row(number, episode));
        }
    }

    out
}

fn listing_row(number: usize, episode: &Episode) -> String {
    format!(
        "{number:>3}. {:<40}  {:<24}  {:<10}  {}",
        truncate(&episode.title, 40),
        truncate(&episode.members, 24),
        episode.published_at,
        episode.duration_as_string
    )
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut shortened: String = text.chars().take(width.saturating_sub(1)).collect();
    shortened.push('…');
    shortened
}

/// Render the now-playing panel
#[must_use]
pub fn player(view: &PlayerView) -> String {
    let mut out = String::from("Now playing\n");

    match &view.episode {
        None => out.push_str("  Select a podcast to listen\n"),
        Some(episode) => {
            let _ = writeln!(out, "  {}", episode.title);
            let _ = writeln!(out, "  {}", episode.members);
        }
    }

    let _ = writeln!(
        out,
        "  {} {} {}",
        view.elapsed,
        progress_bar(view),
        view.duration
    );
    let _ = writeln!(out, "  {}", controls(view));
    out
}

fn progress_bar(view: &PlayerView) -> String {
    let filled = view.slider.map_or(0, |slider| {
        if slider.max == 0 {
            return 0;
        }
        let value = slider.value.min(slider.max);
        usize::try_from(value.saturating_mul(PROGRESS_WIDTH as u64) / slider.max)
            .unwrap_or(PROGRESS_WIDTH)
    });

    format!(
        "[{}{}]",
        "#".repeat(filled),
        "-".repeat(PROGRESS_WIDTH - filled)
    )
}

fn controls(view: &PlayerView) -> String {
    let ControlsState {
        shuffle,
        previous,
        play,
        next,
        repeat,
    } = view.controls;

    let shuffle_label = if view.is_shuffling { "shuffle:on" } else { "shuffle:off" };
    let play_label = if view.is_playing { "pause" } else { "play" };
    let repeat_label = if view.is_looping { "loop:on" } else { "loop:off" };

    [
        (shuffle, shuffle_label),
        (previous, "prev"),
        (play, play_label),
        (next, "next"),
        (repeat, repeat_label),
    ]
    .iter()
    .map(|(enabled, label)| {
        if *enabled {
            format!("[{label}]")
        } else {
            format!(" {label} ")
        }
    })
    .collect::<Vec<_>>()
    .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use podcastr_core::{PlaybackQueue, PlaybackSnapshot};

    fn episode(id: &str, duration: u64) -> Episode {
        Episode::new(
            id,
            format!("Episode {id}"),
            "Diego e Richard",
            "8 jan 21",
            "thumb",
            duration,
            "audio",
        )
    }

    #[test]
    fn test_listing_numbers_rows_across_sections() {
        let home = HomeListing::from_episodes(
            vec![episode("a", 60), episode("b", 60), episode("c", 3981)],
            2,
        );

        let text = listing(&home);

        assert!(text.starts_with("Latest releases\n"));
        assert!(text.contains("  1. Episode a"));
        assert!(text.contains("  2. Episode b"));
        assert!(text.contains("All episodes"));
        assert!(text.contains("  3. Episode c"));
        assert!(text.contains("01:06:21"));
    }

    #[test]
    fn test_empty_listing() {
        assert_eq!(listing(&HomeListing::default()), "No episodes available.\n");
    }

    #[test]
    fn test_empty_player() {
        let view = PlayerView::build(&PlaybackSnapshot::default(), 0);
        let text = player(&view);

        assert!(text.contains("Select a podcast to listen"));
        assert!(text.contains(&format!("00:00:00 [{}] 00:00:00", "-".repeat(PROGRESS_WIDTH))));
        assert!(text.contains(" play "));
    }

    #[test]
    fn test_loaded_player_halfway() {
        let mut queue = PlaybackQueue::new();
        queue
            .play_list(vec![episode("a", 100), episode("b", 100)], 0)
            .unwrap();
        let view = PlayerView::build(&PlaybackSnapshot::from(&queue), 50);

        let text = player(&view);

        assert!(text.contains("Episode a"));
        assert!(text.contains(&format!(
            "00:00:50 [{}{}] 00:01:40",
            "#".repeat(15),
            "-".repeat(15)
        )));
        assert!(text.contains("[shuffle:off]  prev  [pause] [next] [loop:off]"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
    }
}
