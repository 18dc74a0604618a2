//! Tab-separated track catalog loader.
//!
//! The file starts with a header row, then one track per line:
//! `id <TAB> name <TAB> bpm <TAB> MM:SS <TAB> key`. Empty fields produced by
//! repeated tabs are ignored. Any malformed row fails the whole load.

use std::fs;
use std::path::{Path, PathBuf};

use crate::types::{HarmonicKey, Mode, Track};

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read catalog {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("line {line}: missing field `{field}`")]
    MissingField { line: usize, field: &'static str },
    #[error("line {line}: invalid track id {value:?}")]
    InvalidId { line: usize, value: String },
    #[error("line {line}: invalid tempo {value:?}")]
    InvalidTempo { line: usize, value: String },
    #[error("line {line}: tempo must be positive, got {bpm}")]
    NonPositiveTempo { line: usize, bpm: f64 },
    #[error("line {line}: invalid duration {value:?} (expected MM:SS)")]
    InvalidDuration { line: usize, value: String },
    #[error("line {line}: unknown key notation {value:?}")]
    UnknownKey { line: usize, value: String },
}

/// Standard key names and their Camelot positions.
const KEY_TABLE: &[(&str, u8, Mode)] = &[
    ("G#m", 1, Mode::A),
    ("Abm", 1, Mode::A),
    ("B", 1, Mode::B),
    ("D#m", 2, Mode::A),
    ("Ebm", 2, Mode::A),
    ("F#", 2, Mode::B),
    ("Gb", 2, Mode::B),
    ("A#m", 3, Mode::A),
    ("Bbm", 3, Mode::A),
    ("C#", 3, Mode::B),
    ("Db", 3, Mode::B),
    ("Fm", 4, Mode::A),
    ("G#", 4, Mode::B),
    ("Ab", 4, Mode::B),
    ("Cm", 5, Mode::A),
    ("D#", 5, Mode::B),
    ("Eb", 5, Mode::B),
    ("Gm", 6, Mode::A),
    ("A#", 6, Mode::B),
    ("Bb", 6, Mode::B),
    ("Dm", 7, Mode::A),
    ("F", 7, Mode::B),
    ("Am", 8, Mode::A),
    ("C", 8, Mode::B),
    ("Em", 9, Mode::A),
    ("G", 9, Mode::B),
    ("Bm", 10, Mode::A),
    ("D", 10, Mode::B),
    ("F#m", 11, Mode::A),
    ("Gbm", 11, Mode::A),
    ("A", 11, Mode::B),
    ("C#m", 12, Mode::A),
    ("Dbm", 12, Mode::A),
    ("E", 12, Mode::B),
];

/// Resolve a key written either in Camelot notation (`8A`) or as a standard
/// key name from [`KEY_TABLE`] (`Am`, `F#`, ...).
pub fn parse_key(raw: &str) -> Option<HarmonicKey> {
    let trimmed = raw.trim();
    parse_camelot_key(trimmed).or_else(|| {
        KEY_TABLE
            .iter()
            .find(|(name, _, _)| *name == trimmed)
            .and_then(|&(_, position, mode)| HarmonicKey::new(position, mode))
    })
}

fn parse_camelot_key(raw: &str) -> Option<HarmonicKey> {
    let upper = raw.to_ascii_uppercase();
    let letter = upper.chars().last()?;
    let number = &upper[..upper.len() - letter.len_utf8()];
    let mode = match letter {
        'A' => Mode::A,
        'B' => Mode::B,
        _ => return None,
    };
    let position: u8 = number.parse().ok()?;
    HarmonicKey::new(position, mode)
}

/// Parse `MM:SS` into seconds. Seconds must be below 60.
pub fn parse_duration(raw: &str) -> Option<u32> {
    let (minutes, seconds) = raw.trim().split_once(':')?;
    if minutes.is_empty() || seconds.len() != 2 {
        return None;
    }
    let minutes: u32 = minutes.parse().ok()?;
    let seconds: u32 = seconds.parse().ok()?;
    if seconds >= 60 {
        return None;
    }
    minutes.checked_mul(60)?.checked_add(seconds)
}

/// Parse a tempo, accepting a decimal comma.
fn parse_tempo(raw: &str) -> Option<f64> {
    raw.trim().replace(',', ".").parse().ok()
}

fn parse_row(line_number: usize, line: &str) -> Result<Track, CatalogError> {
    let mut fields = line.split('\t').map(str::trim).filter(|f| !f.is_empty());
    let mut next = |field: &'static str| {
        fields.next().ok_or(CatalogError::MissingField {
            line: line_number,
            field,
        })
    };

    let raw_id = next("id")?;
    let name = next("name")?;
    let raw_tempo = next("bpm")?;
    let raw_duration = next("length")?;
    let raw_key = next("key")?;

    let id = raw_id.parse().map_err(|_| CatalogError::InvalidId {
        line: line_number,
        value: raw_id.to_string(),
    })?;
    let tempo_bpm = parse_tempo(raw_tempo).ok_or_else(|| CatalogError::InvalidTempo {
        line: line_number,
        value: raw_tempo.to_string(),
    })?;
    let duration_seconds =
        parse_duration(raw_duration).ok_or_else(|| CatalogError::InvalidDuration {
            line: line_number,
            value: raw_duration.to_string(),
        })?;
    let key = parse_key(raw_key).ok_or_else(|| CatalogError::UnknownKey {
        line: line_number,
        value: raw_key.to_string(),
    })?;

    Track::new(id, name, tempo_bpm, duration_seconds, key).ok_or(CatalogError::NonPositiveTempo {
        line: line_number,
        bpm: tempo_bpm,
    })
}

/// Parse catalog text. The first line is a header and is skipped.
pub fn parse_catalog(contents: &str) -> Result<Vec<Track>, CatalogError> {
    contents
        .lines()
        .enumerate()
        .skip(1)
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| parse_row(idx + 1, line))
        .collect()
}

pub fn load_catalog(path: &Path) -> Result<Vec<Track>, CatalogError> {
    let contents = fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let tracks = parse_catalog(&contents)?;
    tracing::debug!(path = %path.display(), tracks = tracks.len(), "loaded catalog");
    Ok(tracks)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Id\tName\tBPM\tLength\tKey";

    #[test]
    fn parses_standard_and_camelot_keys() {
        assert_eq!(parse_key("Am"), HarmonicKey::new(8, Mode::A));
        assert_eq!(parse_key("C"), HarmonicKey::new(8, Mode::B));
        assert_eq!(parse_key("F#m"), HarmonicKey::new(11, Mode::A));
        assert_eq!(parse_key("Gbm"), HarmonicKey::new(11, Mode::A));
        assert_eq!(parse_key("Bbm"), HarmonicKey::new(3, Mode::A));
        assert_eq!(parse_key("8A"), HarmonicKey::new(8, Mode::A));
        assert_eq!(parse_key("12b"), HarmonicKey::new(12, Mode::B));
        assert_eq!(parse_key(" 1B "), HarmonicKey::new(1, Mode::B));
    }

    #[test]
    fn rejects_unknown_keys() {
        assert_eq!(parse_key("H"), None);
        assert_eq!(parse_key("13A"), None);
        assert_eq!(parse_key("0B"), None);
        assert_eq!(parse_key("8C"), None);
        assert_eq!(parse_key(""), None);
        assert_eq!(parse_key("A"), None);
        assert_eq!(parse_key("D\u{266D}"), None);
        assert_eq!(parse_key("\u{266D}"), None);
    }

    #[test]
    fn non_ascii_key_fails_the_row() {
        let text = format!("{HEADER}\n1\tFlat\t120\t03:00\tD\u{266D}\n");
        match parse_catalog(&text) {
            Err(CatalogError::UnknownKey { line, value }) => {
                assert_eq!(line, 2);
                assert_eq!(value, "D\u{266D}");
            }
            other => panic!("expected UnknownKey, got {other:?}"),
        }
    }

    #[test]
    fn key_table_covers_every_wheel_slot() {
        for position in 1..=12u8 {
            for mode in [Mode::A, Mode::B] {
                assert!(
                    KEY_TABLE
                        .iter()
                        .any(|&(_, p, m)| p == position && m == mode),
                    "no standard name maps to {position}{}",
                    mode.letter()
                );
            }
        }
    }

    #[test]
    fn parses_durations() {
        assert_eq!(parse_duration("04:05"), Some(245));
        assert_eq!(parse_duration("0:59"), Some(59));
        assert_eq!(parse_duration("12:00"), Some(720));
        assert_eq!(parse_duration("4:5"), None);
        assert_eq!(parse_duration("4:60"), None);
        assert_eq!(parse_duration("245"), None);
        assert_eq!(parse_duration(":30"), None);
        assert_eq!(parse_duration("99999999:00"), None);
        assert_eq!(parse_duration("71582788:15"), Some(4_294_967_295));
    }

    #[test]
    fn overlong_duration_fails_the_row() {
        let text = format!("{HEADER}\n1\tEndless\t120\t99999999:00\tAm\n");
        assert!(matches!(
            parse_catalog(&text),
            Err(CatalogError::InvalidDuration { line: 2, .. })
        ));
    }

    #[test]
    fn parses_rows_with_repeated_tabs_and_decimal_comma() {
        let text = format!("{HEADER}\n1\tOpening Track\t\t122,5\t05:30\tAm\n\n2\tSecond\t124\t06:01\t9A\n");
        let tracks = parse_catalog(&text).expect("catalog should parse");
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].id, 1);
        assert_eq!(tracks[0].name, "Opening Track");
        assert!((tracks[0].tempo_bpm - 122.5).abs() < f64::EPSILON);
        assert_eq!(tracks[0].duration_seconds, 330);
        assert_eq!(tracks[1].key, HarmonicKey::new(9, Mode::A).expect("key"));
    }

    #[test]
    fn header_only_catalog_is_empty() {
        assert!(parse_catalog(HEADER).expect("parse").is_empty());
    }

    #[test]
    fn reports_offending_line() {
        let text = format!("{HEADER}\n1\tOk\t120\t03:00\tAm\n2\tBad\t120\t03:00\tX#\n");
        match parse_catalog(&text) {
            Err(CatalogError::UnknownKey { line, value }) => {
                assert_eq!(line, 3);
                assert_eq!(value, "X#");
            }
            other => panic!("expected UnknownKey, got {other:?}"),
        }
    }

    #[test]
    fn rejects_zero_tempo_and_short_rows() {
        let zero = format!("{HEADER}\n1\tSilent\t0\t03:00\tAm\n");
        assert!(matches!(
            parse_catalog(&zero),
            Err(CatalogError::NonPositiveTempo { line: 2, .. })
        ));

        let short = format!("{HEADER}\n1\tNo Key\t120\t03:00\n");
        assert!(matches!(
            parse_catalog(&short),
            Err(CatalogError::MissingField {
                line: 2,
                field: "key"
            })
        ));

        let bad_id = format!("{HEADER}\nx\tName\t120\t03:00\tAm\n");
        assert!(matches!(
            parse_catalog(&bad_id),
            Err(CatalogError::InvalidId { line: 2, .. })
        ));
    }

    #[test]
    fn load_catalog_reads_file_and_reports_missing_path() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("crate.tsv");
        std::fs::write(&path, format!("{HEADER}\n7\tDeep Cut\t118\t07:12\tDm\n"))
            .expect("write catalog");

        let tracks = load_catalog(&path).expect("load catalog");
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].id, 7);

        let missing = dir.path().join("missing.tsv");
        assert!(matches!(
            load_catalog(&missing),
            Err(CatalogError::Io { .. })
        ));
    }
}
