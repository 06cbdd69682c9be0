//! Property-based tests for the repeat controller
//!
//! Uses proptest to check the repeat and gap invariants across random
//! repeat counts, pause lengths, track lengths and user actions.

use drive_core::types::{PlaybackPreferences, Track};
use drive_playback::{ControllerState, PlaybackEvent, Player, SimulatedEngine};
use proptest::prelude::*;
use std::time::Duration;

const STEP: Duration = Duration::from_millis(100);
const MAX_TICKS: u32 = 10_000;

fn player(track_secs: u64, prefs: &PlaybackPreferences) -> Player<SimulatedEngine> {
    let mut player = Player::new(SimulatedEngine::new(Duration::from_secs(track_secs)), prefs);
    player.load(&Track::new("Prop", "mem://prop"));
    player
}

#[derive(Debug, Clone, Copy)]
enum Action {
    Play,
    Pause,
    Toggle,
    Reset,
    Tick(u8),
}

fn arbitrary_action() -> impl Strategy<Value = Action> {
    prop_oneof![
        Just(Action::Play),
        Just(Action::Pause),
        Just(Action::Toggle),
        Just(Action::Reset),
        (1u8..30).prop_map(Action::Tick),
    ]
}

proptest! {
    /// Property: N plays produce exactly N completions, then Stopped
    #[test]
    fn finite_repeat_count_is_honoured(
        repeat_count in 1u32..6,
        pause_tenths in 0u32..=15,
        track_secs in 1u64..4,
    ) {
        let prefs = PlaybackPreferences {
            repeat_count,
            inter_repeat_pause_seconds: pause_tenths as f32 / 10.0,
            ..Default::default()
        };
        let mut player = player(track_secs, &prefs);
        player.play().unwrap();

        let mut completions = 0;
        let mut saw_gap = false;
        let mut ticks = 0;
        while player.state() != ControllerState::Stopped {
            prop_assert!(ticks < MAX_TICKS);
            player.tick(STEP);
            ticks += 1;
            saw_gap |= player.state() == ControllerState::InterRepeatPause;
            completions += player
                .drain_events()
                .iter()
                .filter(|e| matches!(e, PlaybackEvent::RepeatCompleted { .. }))
                .count();
        }

        prop_assert_eq!(completions, repeat_count as usize);
        prop_assert_eq!(player.session().completed_repeats, repeat_count);
        if pause_tenths == 0 || repeat_count == 1 {
            prop_assert!(!saw_gap);
        } else {
            prop_assert!(saw_gap);
        }
    }

    /// Property: every gap lasts at least the configured pause
    #[test]
    fn every_gap_lasts_at_least_the_pause(
        pause_tenths in 1u32..=30,
        track_secs in 1u64..3,
    ) {
        let prefs = PlaybackPreferences {
            repeat_count: 4,
            inter_repeat_pause_seconds: pause_tenths as f32 / 10.0,
            ..Default::default()
        };
        let configured = prefs.inter_repeat_pause();
        let mut player = player(track_secs, &prefs);
        player.play().unwrap();

        let mut gaps = Vec::new();
        let mut current: Option<Duration> = None;
        let mut ticks = 0;
        while player.state() != ControllerState::Stopped {
            prop_assert!(ticks < MAX_TICKS);
            player.tick(STEP);
            ticks += 1;

            if player.state() == ControllerState::InterRepeatPause {
                *current.get_or_insert(Duration::ZERO) += STEP;
            } else if let Some(gap) = current.take() {
                gaps.push(gap);
            }
        }

        prop_assert_eq!(gaps.len(), 3);
        for gap in gaps {
            prop_assert!(gap >= configured, "gap {:?} shorter than {:?}", gap, configured);
            prop_assert!(gap <= configured + STEP * 2);
        }
    }

    /// Property: reset zeroes position and counter, never the play state
    #[test]
    fn reset_never_changes_play_state(
        actions in prop::collection::vec(arbitrary_action(), 1..40),
    ) {
        let prefs = PlaybackPreferences {
            repeat_count: 0,
            inter_repeat_pause_seconds: 1.0,
            ..Default::default()
        };
        let mut player = player(2, &prefs);
        player.tick(STEP);

        for action in actions {
            match action {
                Action::Play => player.play().unwrap(),
                Action::Pause => player.pause(),
                Action::Toggle => player.toggle().unwrap(),
                Action::Reset => {
                    let is_playing = player.session().is_playing;
                    let state = player.state();
                    player.reset();

                    prop_assert_eq!(player.session().is_playing, is_playing);
                    prop_assert_eq!(player.state(), state);
                    prop_assert_eq!(player.session().completed_repeats, 0);
                    prop_assert_eq!(player.session().current_time, Duration::ZERO);
                }
                Action::Tick(n) => {
                    for _ in 0..n {
                        player.tick(STEP);
                    }
                }
            }

            // Infinite repeat with a working engine never stops or fails
            prop_assert!(!matches!(
                player.state(),
                ControllerState::Stopped | ControllerState::Error
            ));
        }
    }

    /// Property: engine volume always stays within 0.0..=1.0
    #[test]
    fn engine_volume_stays_in_range(levels in prop::collection::vec(any::<u8>(), 1..20)) {
        let mut player = player(1, &PlaybackPreferences::default());
        for level in levels {
            player.set_volume(level);
            let volume = player.main().engine().volume();
            prop_assert!((0.0..=1.0).contains(&volume));
            prop_assert_eq!(player.main().volume(), level.min(100));
        }
    }
}
