//! Project board entities

use std::fmt;

use serde::{Deserialize, Serialize};

/// A repository project board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectBoard {
    pub id: u64,
    pub name: String,
}

/// A column (lane) on a project board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardColumn {
    pub id: u64,
    pub name: String,
}

/// A card created on a board column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: u64,
    /// API URL of the card
    pub url: String,
}

/// What a card links to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardContentType {
    PullRequest,
    Issue,
}

impl CardContentType {
    /// Value of the `content_type` field of the cards API
    pub fn as_str(&self) -> &'static str {
        match self {
            CardContentType::PullRequest => "PullRequest",
            CardContentType::Issue => "Issue",
        }
    }
}

impl fmt::Display for CardContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// First board with exactly this name
pub fn find_board<'a>(boards: &'a [ProjectBoard], name: &str) -> Option<&'a ProjectBoard> {
    boards.iter().find(|b| b.name == name)
}

/// First column with exactly this name
pub fn find_column<'a>(columns: &'a [BoardColumn], name: &str) -> Option<&'a BoardColumn> {
    columns.iter().find(|c| c.name == name)
}
