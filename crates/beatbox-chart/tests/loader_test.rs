use beatbox_chart::{ChartLoader, DirSource, Difficulty, MoveKind};

const SONGS: &str = "tests/fixtures/songs";

fn loader() -> ChartLoader {
    ChartLoader::from_source(DirSource::new(SONGS))
}

#[test]
fn test_load_expert_chart() {
    let chart = loader().load("neon", Difficulty::Expert);

    assert_eq!(chart.source_file.as_deref(), Some("chart.chart"));
    assert_eq!(chart.song.name.as_deref(), Some("Neon Jab"));
    assert_eq!(chart.song.charter.as_deref(), Some("Tester"));
    assert_eq!(chart.song.music_stream.as_deref(), Some("song.ogg"));
    assert_eq!(chart.difficulty, Difficulty::Expert);
    assert_eq!(chart.note_count(), 7);
}

#[test]
fn test_tempo_change_timing() {
    let chart = loader().load("neon", Difficulty::Expert);
    let times: Vec<f64> = chart.moves.iter().map(|m| m.ms).collect();

    let expected = [2000.0, 2500.0, 3000.0, 3500.0, 4000.0, 4125.0, 4250.0];
    assert_eq!(times.len(), expected.len());
    for (got, want) in times.iter().zip(expected) {
        assert!((got - want).abs() < 1e-6, "got {got}, want {want}");
    }
}

#[test]
fn test_lane_and_move_mapping() {
    let chart = loader().load("neon", Difficulty::Expert);
    let lanes: Vec<u8> = chart.moves.iter().map(|m| m.lane_index).collect();
    let kinds: Vec<MoveKind> = chart.moves.iter().map(|m| m.kind).collect();

    assert_eq!(lanes, vec![0, 1, 2, 0, 1, 0, 0]);
    assert_eq!(
        kinds,
        vec![
            MoveKind::Jab,
            MoveKind::Jab,
            MoveKind::Hook,
            MoveKind::Punch,
            MoveKind::Punch,
            MoveKind::Hook,
            MoveKind::Jab,
        ]
    );
}

#[test]
fn test_notes_are_sorted_by_time() {
    let chart = loader().load("neon", Difficulty::Expert);

    for pair in chart.moves.windows(2) {
        assert!(pair[0].ms <= pair[1].ms, "Moves should be sorted by ms");
    }
}

#[test]
fn test_requested_difficulty_section() {
    let chart = loader().load("neon", Difficulty::Easy);
    assert_eq!(chart.difficulty, Difficulty::Easy);
    assert_eq!(chart.note_count(), 2);
}

#[test]
fn test_missing_difficulty_falls_back() {
    let chart = loader().load("fallback", Difficulty::Expert);

    assert_eq!(chart.source_file.as_deref(), Some("waves.chart"));
    assert_eq!(chart.difficulty, Difficulty::Normal);
    assert_eq!(chart.note_count(), 2);
    // 0.5s offset plus one beat at 150 BPM
    assert!((chart.moves[0].ms - 900.0).abs() < 1e-6);
    assert!((chart.moves[1].ms - 1300.0).abs() < 1e-6);
}

#[test]
fn test_byte_order_mark_is_tolerated() {
    let chart = loader().load("bom", Difficulty::Expert);
    assert_eq!(chart.source_file.as_deref(), Some("notes.chart"));
    assert_eq!(chart.song.name.as_deref(), Some("Bom"));
    assert!((chart.moves[0].ms - 1000.0).abs() < 1e-6);
}

#[test]
fn test_missing_sync_track_degrades_to_empty() {
    let chart = loader().load("broken", Difficulty::Expert);
    assert!(chart.is_empty());
    assert_eq!(chart.note_count(), 0);
}

#[test]
fn test_unknown_song_degrades_to_empty() {
    let chart = loader().load("does-not-exist", Difficulty::Expert);
    assert!(chart.is_empty());
    assert!(chart.source_file.is_none());
}
