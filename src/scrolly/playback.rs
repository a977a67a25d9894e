use super::section::BackgroundKind;

/// What a section's video should do after its visibility or the scrub
/// mode changes
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlaybackCommand {
    Play,
    Pause,
    /// pause and seek, scroll drives the time from here on
    PauseAt(f64),
}

pub fn on_visibility(
    visible: bool,
    scrubbing: bool,
    kind: BackgroundKind,
    scrub_time: f64,
) -> PlaybackCommand {
    match (visible, kind) {
        (false, _) | (_, BackgroundKind::Image) => PlaybackCommand::Pause,
        _ if scrubbing => PlaybackCommand::PauseAt(scrub_time),
        _ => PlaybackCommand::Play,
    }
}

/// Free-running video loops, scrubbed video does not
pub fn loops(scrubbing: bool) -> bool {
    !scrubbing
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hidden_sections_pause() {
        for scrubbing in [false, true] {
            assert_eq!(
                on_visibility(false, scrubbing, BackgroundKind::Video, 2.0),
                PlaybackCommand::Pause
            );
        }
    }

    #[test]
    fn visible_video_plays_or_follows_scroll() {
        assert_eq!(
            on_visibility(true, false, BackgroundKind::Video, 2.0),
            PlaybackCommand::Play
        );
        assert_eq!(
            on_visibility(true, true, BackgroundKind::Video, 2.0),
            PlaybackCommand::PauseAt(2.0)
        );
    }

    #[test]
    fn image_backgrounds_keep_the_video_paused() {
        assert_eq!(
            on_visibility(true, false, BackgroundKind::Image, 0.0),
            PlaybackCommand::Pause
        );
    }

    #[test]
    fn scrubbing_turns_looping_off() {
        assert!(loops(false));
        assert!(!loops(true));
    }
}
