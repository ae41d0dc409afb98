//! Resolving the playable link for a catalog record.
//!
//! A page hosting the player picks a source (movies) or a season/episode pair
//! (series). Any selection that does not land on a non-empty link resolves to
//! `None`; the player then renders disabled instead of failing.

use serde::{Deserialize, Serialize};

use crate::{Category, MovieRecord};

/// Indices chosen by the viewer. All default to the first entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSelection {
    /// Index into `movie_links` (movies).
    #[serde(default)]
    pub source: usize,
    /// Index into `seasons` (series).
    #[serde(default)]
    pub season: usize,
    /// Index into the selected season's `episodes` (series).
    #[serde(default)]
    pub episode: usize,
}

impl SourceSelection {
    /// Select a different season, resetting the episode to the first one.
    #[must_use]
    pub fn with_season(self, season: usize) -> Self {
        Self {
            season,
            episode: 0,
            ..self
        }
    }
}

/// A media URL ready to hand to a player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaSource {
    pub url: String,
    /// Human label, e.g. the source name or "S1E3 Secrets".
    pub label: String,
}

impl MediaSource {
    pub fn new(url: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            label: label.into(),
        }
    }
}

/// Pick the playable link for `selection`, or `None` when nothing resolves.
pub fn resolve_source(record: &MovieRecord, selection: &SourceSelection) -> Option<MediaSource> {
    let source = match record.category {
        Category::Movie => {
            let link = record.movie_links.get(selection.source)?;
            let label = if link.source.is_empty() {
                format!("Source {}", selection.source + 1)
            } else {
                link.source.clone()
            };
            MediaSource::new(link.link.clone(), label)
        }
        Category::Series => {
            let season = record.seasons.get(selection.season)?;
            let episode = season.episodes.get(selection.episode)?;
            let link = episode.video_links.first()?;
            let title = if episode.title.is_empty() {
                "Untitled"
            } else {
                episode.title.as_str()
            };
            MediaSource::new(
                link.link.clone(),
                format!(
                    "S{}E{} {}",
                    season.season_number, episode.episode_number, title
                ),
            )
        }
    };

    if source.url.trim().is_empty() {
        None
    } else {
        Some(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Episode, MovieDraft, MovieId, MovieLink, Season, VideoLink};
    use chrono::Utc;

    fn movie(links: Vec<(&str, &str)>) -> MovieRecord {
        MovieDraft {
            title: Some("Inception".into()),
            image: Some("poster.jpg".into()),
            description: Some("Dreams.".into()),
            genre: Some(vec![]),
            movie_links: Some(
                links
                    .into_iter()
                    .map(|(link, source)| MovieLink {
                        link: link.into(),
                        source: source.into(),
                    })
                    .collect(),
            ),
            ..Default::default()
        }
        .into_record(MovieId::new(), Utc::now())
        .unwrap()
    }

    fn series() -> MovieRecord {
        let mut record = movie(vec![]);
        record.category = Category::Series;
        record.seasons = vec![
            Season {
                season_number: 1,
                episodes: vec![
                    Episode {
                        episode_number: 1,
                        title: "Pilot".into(),
                        video_links: vec![VideoLink {
                            link: "https://cdn/s1e1.mp4".into(),
                        }],
                        duration: Some(50),
                    },
                    Episode {
                        episode_number: 2,
                        title: String::new(),
                        video_links: vec![],
                        duration: None,
                    },
                ],
            },
            Season {
                season_number: 2,
                episodes: vec![],
            },
        ];
        record
    }

    #[test]
    fn test_movie_selects_source_by_index() {
        let record = movie(vec![("https://a/1.mp4", "Server 1"), ("https://b/1.mp4", "")]);
        let first = resolve_source(&record, &SourceSelection::default()).unwrap();
        assert_eq!(first.url, "https://a/1.mp4");
        assert_eq!(first.label, "Server 1");

        let second = resolve_source(
            &record,
            &SourceSelection {
                source: 1,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(second.label, "Source 2");
    }

    #[test]
    fn test_movie_without_links_resolves_to_none() {
        let record = movie(vec![]);
        assert!(resolve_source(&record, &SourceSelection::default()).is_none());
    }

    #[test]
    fn test_blank_link_resolves_to_none() {
        let record = movie(vec![("  ", "Server 1")]);
        assert!(resolve_source(&record, &SourceSelection::default()).is_none());
    }

    #[test]
    fn test_series_episode_resolution() {
        let record = series();
        let src = resolve_source(&record, &SourceSelection::default()).unwrap();
        assert_eq!(src.url, "https://cdn/s1e1.mp4");
        assert_eq!(src.label, "S1E1 Pilot");
    }

    #[test]
    fn test_series_missing_pieces_resolve_to_none() {
        let record = series();
        // Episode without links
        let sel = SourceSelection {
            episode: 1,
            ..Default::default()
        };
        assert!(resolve_source(&record, &sel).is_none());
        // Season without episodes
        assert!(resolve_source(&record, &SourceSelection::default().with_season(1)).is_none());
        // Season out of range
        assert!(resolve_source(&record, &SourceSelection::default().with_season(9)).is_none());
    }

    #[test]
    fn test_with_season_resets_episode() {
        let sel = SourceSelection {
            source: 0,
            season: 0,
            episode: 4,
        }
        .with_season(2);
        assert_eq!(sel.season, 2);
        assert_eq!(sel.episode, 0);
    }
}
