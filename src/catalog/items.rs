// Copyright 2025 Cowboy AI, LLC.

//! Catalog items

use crate::entity::{normalize_name, CatalogEntity, CollectionKind, RelatedReferences};
use serde::{Deserialize, Serialize};

/// A book
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Book {
    /// Title
    pub title: String,
    /// Creator names as typed into the form
    pub creators: Vec<String>,
    /// Series name
    pub series: Option<String>,
    /// Position within the series
    pub series_index: Option<u32>,
    /// Publisher name
    pub publisher: Option<String>,
    /// Publication year
    pub year: Option<i32>,
    /// Hardcover, paperback, ebook, ...
    pub format: Option<String>,
}

impl Book {
    /// A book with only a title
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Place the book in a series
    pub fn in_series(mut self, series: impl Into<String>) -> Self {
        self.series = Some(series.into());
        self
    }

    /// Credit a creator
    pub fn by(mut self, creator: impl Into<String>) -> Self {
        self.creators.push(creator.into());
        self
    }

    /// Set the publisher
    pub fn published_by(mut self, publisher: impl Into<String>) -> Self {
        self.publisher = Some(publisher.into());
        self
    }
}

impl CatalogEntity for Book {
    const KIND: CollectionKind = CollectionKind::Books;

    conventional_tags!("BOOK", "BOOKS");

    fn series_key(&self) -> Option<String> {
        named(&self.series).map(normalize_name)
    }

    fn display_name(&self) -> Option<String> {
        Some(self.title.clone())
    }
}

/// A film or music disc
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Disc {
    /// Title
    pub title: String,
    /// DVD, Blu-ray, CD, ...
    pub format: Option<String>,
    /// Series name
    pub series: Option<String>,
    /// Studio or label name
    pub studio: Option<String>,
    /// Release year
    pub year: Option<i32>,
}

impl Disc {
    /// A disc with only a title
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Place the disc in a series
    pub fn in_series(mut self, series: impl Into<String>) -> Self {
        self.series = Some(series.into());
        self
    }
}

impl CatalogEntity for Disc {
    const KIND: CollectionKind = CollectionKind::Discs;

    conventional_tags!("DISC", "DISCS");

    fn series_key(&self) -> Option<String> {
        named(&self.series).map(normalize_name)
    }

    fn display_name(&self) -> Option<String> {
        Some(self.title.clone())
    }
}

/// A video or tabletop game
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Game {
    /// Title
    pub title: String,
    /// Platform the copy is for
    pub platform: Option<String>,
    /// Series name
    pub series: Option<String>,
    /// Developer name
    pub developer: Option<String>,
    /// Release year
    pub year: Option<i32>,
}

impl Game {
    /// A game with only a title
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Place the game in a series
    pub fn in_series(mut self, series: impl Into<String>) -> Self {
        self.series = Some(series.into());
        self
    }
}

impl CatalogEntity for Game {
    const KIND: CollectionKind = CollectionKind::Games;

    conventional_tags!("GAME", "GAMES");

    fn series_key(&self) -> Option<String> {
        named(&self.series).map(normalize_name)
    }

    fn display_name(&self) -> Option<String> {
        Some(self.title.clone())
    }
}

/// Non-blank reference text
fn named(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

impl RelatedReferences for Book {
    fn creator_references(&self) -> Vec<&str> {
        self.creators
            .iter()
            .map(String::as_str)
            .filter(|name| !name.trim().is_empty())
            .collect()
    }

    fn series_reference(&self) -> Option<&str> {
        named(&self.series)
    }

    fn company_reference(&self) -> Option<&str> {
        named(&self.publisher)
    }
}

impl RelatedReferences for Disc {
    fn series_reference(&self) -> Option<&str> {
        named(&self.series)
    }

    fn company_reference(&self) -> Option<&str> {
        named(&self.studio)
    }
}

impl RelatedReferences for Game {
    fn series_reference(&self) -> Option<&str> {
        named(&self.series)
    }

    fn company_reference(&self) -> Option<&str> {
        named(&self.developer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_series_is_not_a_key() {
        let book = Book::titled("Dune").in_series("");
        assert_eq!(book.series_key(), None);
        assert_eq!(Book::titled("Dune").in_series("   ").series_key(), None);
        assert_eq!(
            Book::titled("Dune").in_series("Dune").series_key().as_deref(),
            Some("Dune")
        );
    }

    #[test]
    fn series_key_collapses_whitespace() {
        let padded = Book::titled("Dune Messiah").in_series(" Dune  Chronicles ");
        assert_eq!(padded.series_key().as_deref(), Some("Dune Chronicles"));
        let disc = Disc::titled("Alien 3").in_series("Alien\t");
        assert_eq!(disc.series_key().as_deref(), Some("Alien"));
    }

    #[test]
    fn items_decode_sparse_documents() {
        let game: Game = serde_json::from_value(json!({ "title": "Halo", "series": "Halo" })).unwrap();
        assert_eq!(game.series_key().as_deref(), Some("Halo"));
        assert_eq!(game.platform, None);

        let book: Book =
            serde_json::from_value(json!({ "title": "Emma", "seriesIndex": 2 })).unwrap();
        assert_eq!(book.series_index, Some(2));
        assert!(book.creators.is_empty());
    }

    #[test]
    fn references_skip_blank_names() {
        let book = Book::titled("Dune")
            .by("Frank Herbert")
            .by("  ")
            .in_series("Dune")
            .published_by("");
        assert_eq!(book.creator_references(), vec!["Frank Herbert"]);
        assert_eq!(book.series_reference(), Some("Dune"));
        assert_eq!(book.company_reference(), None);

        let game = Game {
            developer: Some("Bungie".into()),
            ..Game::titled("Halo")
        };
        assert_eq!(game.company_reference(), Some("Bungie"));
        assert!(game.creator_references().is_empty());
    }
}
