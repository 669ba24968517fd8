use std::{cmp::Ordering, fmt, str::FromStr};

use chrono::NaiveDate;

use crate::engine::{error::EngineError, model::Track};

/// Pure total order over tracks.
pub type Comparator = fn(&Track, &Track) -> Ordering;

/// The sort options offered to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKey {
    Name,
    Artist,
    Album,
    ReleaseDate,
    Popularity,
}

impl SortKey {
    pub const ALL: [SortKey; 5] = [
        SortKey::Name,
        SortKey::Artist,
        SortKey::Album,
        SortKey::ReleaseDate,
        SortKey::Popularity,
    ];

    /// User-facing label.
    pub fn label(self) -> &'static str {
        match self {
            SortKey::Name => "Name",
            SortKey::Artist => "Artist",
            SortKey::Album => "Album",
            SortKey::ReleaseDate => "Release Date",
            SortKey::Popularity => "Popularity",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            SortKey::Name => "track title, case-sensitive",
            SortKey::Artist => "first listed artist, tracks without artist last",
            SortKey::Album => "album name",
            SortKey::ReleaseDate => "release date, oldest first, unknown dates last",
            SortKey::Popularity => "popularity, most popular first",
        }
    }

    /// Comparator for this key. Callers must use it with a stable sort.
    pub fn comparator(self) -> Comparator {
        match self {
            SortKey::Name => by_name,
            SortKey::Artist => by_artist,
            SortKey::Album => by_album,
            SortKey::ReleaseDate => by_release_date,
            SortKey::Popularity => by_popularity,
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SortKey {
    type Err = EngineError;

    /// Accepts the labels case-insensitively, ignoring spaces, `-` and `_`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .flat_map(char::to_lowercase)
            .collect();

        match normalized.as_str() {
            "name" => Ok(SortKey::Name),
            "artist" => Ok(SortKey::Artist),
            "album" => Ok(SortKey::Album),
            "releasedate" => Ok(SortKey::ReleaseDate),
            "popularity" => Ok(SortKey::Popularity),
            _ => Err(EngineError::UnknownSortKey(s.to_string())),
        }
    }
}

/// Resolves a sort-option name to its comparator.
pub fn comparator(name: &str) -> Result<Comparator, EngineError> {
    name.parse::<SortKey>().map(SortKey::comparator)
}

fn by_name(a: &Track, b: &Track) -> Ordering {
    a.title.cmp(&b.title)
}

fn by_artist(a: &Track, b: &Track) -> Ordering {
    match (&a.primary_artist, &b.primary_artist) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn by_album(a: &Track, b: &Track) -> Ordering {
    a.album.cmp(&b.album)
}

fn by_release_date(a: &Track, b: &Track) -> Ordering {
    let a = a.release_date.as_deref().and_then(ReleaseDate::parse);
    let b = b.release_date.as_deref().and_then(ReleaseDate::parse);
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn by_popularity(a: &Track, b: &Track) -> Ordering {
    b.popularity.cmp(&a.popularity)
}

/// A release date with `year`, `year-month` or `year-month-day` precision.
///
/// The derived order compares year, then month, then day, where a missing
/// component sorts before any present one. A partial date therefore comes
/// right before the full dates that share its prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct ReleaseDate {
    year: i32,
    month: Option<u32>,
    day: Option<u32>,
}

impl ReleaseDate {
    fn parse(raw: &str) -> Option<Self> {
        let parts: Vec<&str> = raw.trim().split('-').collect();
        if parts
            .iter()
            .any(|p| p.is_empty() || !p.bytes().all(|b| b.is_ascii_digit()))
        {
            return None;
        }

        let parsed = match parts.as_slice() {
            [year] if year.len() == 4 => Some(Self {
                year: year.parse().ok()?,
                month: None,
                day: None,
            }),
            [year, month] if year.len() == 4 && month.len() == 2 => {
                let year = year.parse().ok()?;
                let month = month.parse().ok()?;
                NaiveDate::from_ymd_opt(year, month, 1)?;
                Some(Self {
                    year,
                    month: Some(month),
                    day: None,
                })
            }
            [year, month, day] if year.len() == 4 && month.len() == 2 && day.len() == 2 => {
                let date = NaiveDate::from_ymd_opt(
                    year.parse().ok()?,
                    month.parse().ok()?,
                    day.parse().ok()?,
                )?;
                Some(Self::from(date))
            }
            _ => None,
        };

        // Spotify reports unknown dates as "0000".
        parsed.filter(|date| date.year > 0)
    }
}

impl From<NaiveDate> for ReleaseDate {
    fn from(date: NaiveDate) -> Self {
        use chrono::Datelike;
        Self {
            year: date.year(),
            month: Some(date.month()),
            day: Some(date.day()),
        }
    }
}
