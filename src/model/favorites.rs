use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::Error;

/// The kind of item a favorite bookmarks.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FavoriteKind {
    Event,
    Character,
    Year,
}

impl FavoriteKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Event => "event",
            Self::Character => "character",
            Self::Year => "year",
        }
    }
}

impl FromStr for FavoriteKind {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "event" => Ok(Self::Event),
            "character" => Ok(Self::Character),
            "year" => Ok(Self::Year),
            other => Err(Error::ValidationError(format!(
                "kind must be one of event, character, or year, got {other:?}"
            ))),
        }
    }
}

/// A user's favorites grouped by kind, exactly as served over HTTP.
///
/// Derived from favorite rows on refresh; the empty view doubles as the safe
/// default served on a cache miss while a background refresh is in flight.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FavoritesView {
    pub events: Vec<String>,
    pub characters: Vec<String>,
    pub years: Vec<String>,
}

impl FavoritesView {
    /// Groups favorite rows into the per-kind arrays. Rows with an
    /// unrecognized kind are skipped rather than failing the whole view.
    pub fn from_rows(rows: Vec<entity::favorite::Model>) -> Self {
        let mut view = Self::default();

        for row in rows {
            match FavoriteKind::from_str(&row.kind) {
                Ok(FavoriteKind::Event) => view.events.push(row.item_id),
                Ok(FavoriteKind::Character) => view.characters.push(row.item_id),
                Ok(FavoriteKind::Year) => view.years.push(row.item_id),
                Err(_) => {
                    tracing::warn!(
                        favorite_id = row.id,
                        kind = %row.kind,
                        "skipping favorite row with unrecognized kind"
                    );
                }
            }
        }

        view
    }
}

/// The outcome of a favorites mutation, reported distinctly so a client with
/// optimistic local state can decide whether to keep or roll it back.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FavoriteOutcome {
    Created,
    AlreadyFavorited,
    Removed,
}

impl FavoriteOutcome {
    pub fn as_status(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::AlreadyFavorited => "already_favorited",
            Self::Removed => "removed",
        }
    }
}
