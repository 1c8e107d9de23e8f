use log::{debug, info, warn};

use crate::{ChartError, Difficulty, MoveKind, ParsedChart, RawMove, SongInfo, TempoMap};

pub const SONG_SECTION: &str = "Song";
pub const SYNC_TRACK_SECTION: &str = "SyncTrack";

/// Whether `text` carries both structural markers a playable chart needs.
pub fn has_required_sections(text: &str) -> bool {
    text.contains("[Song]") && text.contains("[SyncTrack]")
}

/// Lane index and move for a fret number, or `None` for frets that are
/// modifiers or unknown.
pub fn fret_to_move(fret: u8) -> Option<(u8, MoveKind)> {
    match fret {
        0 => Some((0, MoveKind::Jab)),
        1 => Some((1, MoveKind::Jab)),
        2 => Some((2, MoveKind::Hook)),
        3 => Some((0, MoveKind::Punch)),
        4 => Some((1, MoveKind::Punch)),
        7 => Some((0, MoveKind::Hook)),
        _ => None,
    }
}

struct Section<'a> {
    name: &'a str,
    lines: Vec<&'a str>,
}

fn split_sections(text: &str) -> Vec<Section<'_>> {
    let mut sections: Vec<Section<'_>> = Vec::new();

    for line in text.lines() {
        let line = line.trim().trim_start_matches('\u{feff}');
        if line.is_empty() || line == "{" || line == "}" {
            continue;
        }
        if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            sections.push(Section {
                name: name.trim(),
                lines: Vec::new(),
            });
            continue;
        }
        if let Some(current) = sections.last_mut() {
            current.lines.push(line);
        }
    }

    sections
}

fn find_section<'s, 'a>(sections: &'s [Section<'a>], name: &str) -> Option<&'s Section<'a>> {
    sections.iter().find(|s| s.name == name)
}

fn key_value(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    Some((key.trim(), value.trim()))
}

fn unquote(value: &str) -> String {
    value.trim_matches('"').to_string()
}

/// Song offset in seconds. Unparseable or non-finite values count as zero.
fn parse_offset(value: &str) -> f64 {
    match unquote(value).parse::<f64>() {
        Ok(offset) if offset.is_finite() => offset,
        _ => {
            warn!("Ignoring invalid song offset {value}");
            0.0
        }
    }
}

fn parse_song(section: &Section<'_>) -> Result<SongInfo, ChartError> {
    let mut song = SongInfo::default();

    for (key, value) in section.lines.iter().filter_map(|l| key_value(l)) {
        match key {
            "Name" => song.name = Some(unquote(value)),
            "Artist" => song.artist = Some(unquote(value)),
            "Charter" => song.charter = Some(unquote(value)),
            "MusicStream" => song.music_stream = Some(unquote(value)),
            "Offset" => song.offset_s = parse_offset(value),
            "Resolution" => {
                let resolution: u32 = unquote(value)
                    .parse()
                    .map_err(|_| ChartError::InvalidResolution(value.to_string()))?;
                if resolution == 0 {
                    return Err(ChartError::InvalidResolution(value.to_string()));
                }
                song.resolution = resolution;
            }
            _ => {}
        }
    }

    Ok(song)
}

fn parse_tempo_changes(section: &Section<'_>) -> Result<Vec<(u64, f64)>, ChartError> {
    let mut changes = Vec::new();

    for (key, value) in section.lines.iter().filter_map(|l| key_value(l)) {
        let Ok(tick) = key.parse::<u64>() else {
            continue;
        };
        let mut parts = value.split_whitespace();
        if parts.next() != Some("B") {
            continue;
        }
        let raw = parts.next().unwrap_or_default();
        let milli_bpm: u64 = raw.parse().map_err(|_| ChartError::InvalidTempo {
            tick,
            value: raw.to_string(),
        })?;
        if milli_bpm == 0 {
            return Err(ChartError::InvalidTempo {
                tick,
                value: raw.to_string(),
            });
        }
        changes.push((tick, milli_bpm as f64 / 1000.0));
    }

    Ok(changes)
}

enum NoteLine {
    Move { tick: u64, fret: u8 },
    Other,
    Malformed,
}

fn parse_note_line(line: &str) -> NoteLine {
    let Some((key, value)) = key_value(line) else {
        return NoteLine::Malformed;
    };
    let Ok(tick) = key.parse::<u64>() else {
        return NoteLine::Malformed;
    };

    let mut parts = value.split_whitespace();
    match parts.next() {
        Some("N") => match parts.next().and_then(|f| f.parse::<u8>().ok()) {
            Some(fret) => NoteLine::Move { tick, fret },
            None => NoteLine::Malformed,
        },
        Some(_) => NoteLine::Other,
        None => NoteLine::Malformed,
    }
}

/// Parse chart text into the moves of one difficulty.
///
/// Fails only on structural problems (missing `[Song]`/`[SyncTrack]`, bad
/// resolution or tempo). Unreadable note lines are skipped and counted.
pub fn parse_chart(text: &str, difficulty: Difficulty) -> Result<ParsedChart, ChartError> {
    let sections = split_sections(text);

    let song_section =
        find_section(&sections, SONG_SECTION).ok_or(ChartError::MissingSection(SONG_SECTION))?;
    let sync_section = find_section(&sections, SYNC_TRACK_SECTION)
        .ok_or(ChartError::MissingSection(SYNC_TRACK_SECTION))?;

    let song = parse_song(song_section)?;
    let tempo = TempoMap::new(song.resolution, song.offset_s, parse_tempo_changes(sync_section)?);

    let chosen = difficulty
        .fallback_order()
        .into_iter()
        .find_map(|d| find_section(&sections, d.section_name()).map(|s| (d, s)));

    let Some((used, notes_section)) = chosen else {
        info!("Chart has no note sections; playing without notes");
        return Ok(ParsedChart {
            song,
            difficulty,
            moves: Vec::new(),
            skipped_lines: 0,
        });
    };
    if used != difficulty {
        info!("Difficulty {difficulty} not charted, using {used}");
    }

    let mut moves = Vec::new();
    let mut skipped_lines = 0;

    for line in &notes_section.lines {
        match parse_note_line(line) {
            NoteLine::Move { tick, fret } => match fret_to_move(fret) {
                Some((lane_index, kind)) => moves.push(RawMove {
                    ms: tempo.tick_to_ms(tick),
                    lane_index,
                    kind,
                    raw_point: tick,
                }),
                None if matches!(fret, 5 | 6) => {}
                None => debug!("Ignoring unknown fret {fret} at tick {tick}"),
            },
            NoteLine::Other => {}
            NoteLine::Malformed => {
                skipped_lines += 1;
                debug!("Skipping malformed note line: {line}");
            }
        }
    }

    moves.sort_by(|a, b| a.ms.total_cmp(&b.ms));

    Ok(ParsedChart {
        song,
        difficulty: used,
        moves,
        skipped_lines,
    })
}
