use rjudge::logic::score::ScoringMode;
use rjudge::models::engine::target::TargetPart;
use rjudge::models::replay::{autoplay_replay, rejudge_replay};
use rjudge::{
    Chart, EngineEvent, HitResult, InputEvent, JudgementEngine, NoteData, ReplayData, Ruleset,
    ScoreRank, Settings, Variant, generate_autoplay, simulate_replay,
};

fn tap_and_hold() -> Chart {
    Chart::new(
        4,
        vec![NoteData::tap(1000.0, 0), NoteData::hold(2000.0, 2, 1000.0)],
    )
    .unwrap()
}

#[test]
fn test_autoplay_session_through_engine() {
    let chart = tap_and_hold();
    let mut engine = JudgementEngine::new(&chart, Ruleset::default()).unwrap();
    let events = engine.subscribe();

    for input in generate_autoplay(&chart) {
        engine.handle_input(input);
    }
    let snapshot = engine.finish();

    assert_eq!(snapshot.combo, 3);
    assert_eq!(snapshot.max_combo, 3);
    assert_eq!(snapshot.stats.perfect, 3);
    assert_eq!(snapshot.stats.ignore_hit, 1);
    assert_eq!(snapshot.rank, ScoreRank::X);
    assert!((snapshot.total_score - ScoringMode::Mania.combine(1.0, 1.0, 0.0)).abs() < 1e-6);
    assert!((snapshot.total_score - 1_000_000.0).abs() < 1e-6);

    let parts: Vec<TargetPart> = engine.take_judgements().iter().map(|j| j.part).collect();
    assert_eq!(
        parts,
        vec![
            TargetPart::Note,
            TargetPart::Head,
            TargetPart::Body,
            TargetPart::Tail
        ]
    );

    let published: Vec<EngineEvent> = events.try_iter().collect();
    assert!(matches!(published.last(), Some(EngineEvent::Finished(_))));
}

#[test]
fn test_early_release_drops_the_hold() {
    let chart = tap_and_hold();
    let mut engine = JudgementEngine::new(&chart, Ruleset::default()).unwrap();

    engine.handle_input(InputEvent::press(1000.0, 0));
    engine.handle_input(InputEvent::release(1050.0, 0));
    engine.handle_input(InputEvent::press(2000.0, 2));
    engine.handle_input(InputEvent::release(2500.0, 2));
    let snapshot = engine.finish();

    assert_eq!(snapshot.stats.ignore_miss, 1);
    assert_eq!(snapshot.stats.miss, 1);
    assert_eq!(snapshot.combo, 0);
    assert_eq!(snapshot.max_combo, 2);
}

#[test]
fn test_replay_files_round_trip() {
    let chart = tap_and_hold();
    let ruleset = Ruleset::default();
    let replay = autoplay_replay(&chart, &ruleset);

    let dir = std::env::temp_dir();
    let pid = std::process::id();
    for name in [format!("rjudge-{pid}.json"), format!("rjudge-{pid}.rjr")] {
        let path = dir.join(name);
        replay.save(&path).unwrap();
        let loaded = ReplayData::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(loaded, replay);
        let result = simulate_replay(&loaded, &chart, &ruleset).unwrap();
        assert_eq!(result.hit_stats.perfect, 3);
    }
}

#[test]
fn test_rejudge_autoplay_under_every_preset() {
    let chart = tap_and_hold();
    let replay = autoplay_replay(&chart, &Ruleset::default());

    for variant in Variant::ALL {
        let ruleset = Ruleset::preset(variant, variant.default_difficulty());
        let result = rejudge_replay(&replay, &chart, &ruleset).unwrap();

        assert_eq!(result.hit_stats.miss, 0, "{variant}");
        assert_eq!(result.hit_stats.ignore_miss, 0, "{variant}");
        assert!(result.judgements.iter().all(|j| j.result != HitResult::Miss));
        assert_eq!(result.ruleset, variant.to_string());
    }
}

#[test]
fn test_settings_drive_the_session() {
    let settings = Settings::from_toml_str(
        r#"
        variant = "bms"
        "#,
    )
    .unwrap();
    let ruleset = settings.to_ruleset().unwrap();
    let chart = tap_and_hold();

    let mut replay = ReplayData::new(chart.hash(), ruleset.name.clone(), 1.0);
    replay.add_press(1_030_000, 0);
    replay.add_release(1_080_000, 0);
    replay.add_press(2_000_000, 2);
    replay.add_release(3_000_000, 2);

    let result = simulate_replay(&replay, &chart, &ruleset).unwrap();
    assert_eq!(result.hit_stats.great, 1);
    assert_eq!(result.max_combo, 3);
    assert!(result.total_score < 1_000_000.0);
}
