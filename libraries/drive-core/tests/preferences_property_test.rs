//! Property-based tests for preference merging and clamping

use drive_core::types::{PlaybackPreferences, PreferencesUpdate, MAX_INTER_REPEAT_PAUSE_SECONDS};
use proptest::prelude::*;

fn arbitrary_update() -> impl Strategy<Value = PreferencesUpdate> {
    (
        proptest::option::of(any::<u8>()),
        proptest::option::of(0u32..1000),
        proptest::option::of(any::<bool>()),
        proptest::option::of(any::<bool>()),
        proptest::option::of(-100.0f32..100.0),
        proptest::option::of(any::<u8>()),
    )
        .prop_map(
            |(volume, repeat, auto_play, background, pause, background_volume)| PreferencesUpdate {
                volume_percent: volume,
                repeat_count: repeat,
                auto_play,
                background_music_enabled: background,
                inter_repeat_pause_seconds: pause,
                background_volume_percent: background_volume,
                ..Default::default()
            },
        )
}

proptest! {
    /// Property: Any sequence of updates keeps every field in range
    #[test]
    fn updates_always_stay_in_range(updates in prop::collection::vec(arbitrary_update(), 1..20)) {
        let mut prefs = PlaybackPreferences::default();
        for update in &updates {
            prefs.apply(update);
        }

        prop_assert!(prefs.volume_percent <= 100);
        prop_assert!(prefs.background_volume_percent <= 100);
        prop_assert!(prefs.inter_repeat_pause_seconds >= 0.0);
        prop_assert!(prefs.inter_repeat_pause_seconds <= MAX_INTER_REPEAT_PAUSE_SECONDS);
    }

    /// Property: Fields absent from an update are never touched
    #[test]
    fn unspecified_fields_unchanged(volume in 0u8..=100) {
        let before = PlaybackPreferences {
            repeat_count: 7,
            auto_play: true,
            inter_repeat_pause_seconds: 2.5,
            ..Default::default()
        };
        let mut after = before.clone();
        after.apply(&PreferencesUpdate {
            volume_percent: Some(volume),
            ..Default::default()
        });

        prop_assert_eq!(after.volume_percent, volume);
        prop_assert_eq!(after.repeat_count, before.repeat_count);
        prop_assert_eq!(after.auto_play, before.auto_play);
        prop_assert_eq!(after.inter_repeat_pause_seconds, before.inter_repeat_pause_seconds);
        prop_assert_eq!(after.show_progress, before.show_progress);
    }
}
