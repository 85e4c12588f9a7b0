// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Kanflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Kanflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::str::FromStr;

use super::ids::{BoardId, IdError, TeamId};

/// The board or team view a workflow session is opened for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    Board {
        board_id: BoardId,
    },
    Team {
        team_id: TeamId,
        /// The team's own board, when it has one.
        team_board_id: Option<BoardId>,
        /// The board of the project the team belongs to.
        project_board_id: Option<BoardId>,
    },
}

impl Scope {
    pub fn board(board_id: BoardId) -> Self {
        Self::Board { board_id }
    }

    pub fn team(team_id: TeamId) -> Self {
        Self::Team {
            team_id,
            team_board_id: None,
            project_board_id: None,
        }
    }

    /// The key the workflow is looked up by.
    ///
    /// A team whose own board differs from its project's board is keyed by that board.
    pub fn fetch_key(&self) -> FetchKey {
        match self {
            Self::Board { board_id } => FetchKey::Board(board_id.clone()),
            Self::Team {
                team_id,
                team_board_id,
                project_board_id,
            } => match team_board_id {
                Some(board_id) if project_board_id.as_ref() != Some(board_id) => {
                    FetchKey::Board(board_id.clone())
                }
                _ => FetchKey::Team(team_id.clone()),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FetchKey {
    Board(BoardId),
    Team(TeamId),
}

impl fmt::Display for FetchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Board(board_id) => write!(f, "board:{board_id}"),
            Self::Team(team_id) => write!(f, "team:{team_id}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseFetchKeyError {
    MissingPrefix { value: String },
    InvalidId { value: String, source: IdError },
}

impl fmt::Display for ParseFetchKeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingPrefix { value } => {
                write!(f, "fetch key {value:?} must start with 'board:' or 'team:'")
            }
            Self::InvalidId { value, source } => write!(f, "invalid fetch key {value:?}: {source}"),
        }
    }
}

impl std::error::Error for ParseFetchKeyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::MissingPrefix { .. } => None,
            Self::InvalidId { source, .. } => Some(source),
        }
    }
}

impl FromStr for FetchKey {
    type Err = ParseFetchKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |source| ParseFetchKeyError::InvalidId { value: s.to_owned(), source };
        if let Some(rest) = s.strip_prefix("board:") {
            return BoardId::new(rest).map(Self::Board).map_err(invalid);
        }
        if let Some(rest) = s.strip_prefix("team:") {
            return TeamId::new(rest).map(Self::Team).map_err(invalid);
        }
        Err(ParseFetchKeyError::MissingPrefix { value: s.to_owned() })
    }
}
