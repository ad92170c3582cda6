//! Game catalog: the registry of playable game kinds.
//!
//! Adding a new game variant is a new `GameKind` arm plus its catalog
//! entry; nothing elsewhere switches on raw name strings.

use serde::{Deserialize, Serialize};

/// Static catalog entry for a game kind.
///
/// `name` and `description` are copied into each Game record at creation
/// time, so a session keeps rendering even if the catalog changes later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub min_players: usize,
    pub max_players: usize,
}

/// The game kinds this client knows about.
///
/// Only tic-tac-toe ships a rule engine today; the other kinds can be
/// created and joined but render as "not implemented".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameKind {
    TicTacToe,
    Hangman,
    Trivia,
    RockPaperScissors,
}

impl GameKind {
    /// Every kind in the catalog, in display order.
    pub const ALL: [GameKind; 4] = [
        GameKind::TicTacToe,
        GameKind::Hangman,
        GameKind::Trivia,
        GameKind::RockPaperScissors,
    ];

    /// Catalog entry for this kind.
    pub fn spec(&self) -> GameSpec {
        match self {
            GameKind::TicTacToe => GameSpec {
                name: "Tic-Tac-Toe",
                description: "Classic 3x3 grid game",
                min_players: 2,
                max_players: 2,
            },
            GameKind::Hangman => GameSpec {
                name: "Hangman",
                description: "Guess the word before the man is hanged",
                min_players: 2,
                max_players: 10,
            },
            GameKind::Trivia => GameSpec {
                name: "Trivia Quiz",
                description: "Test your knowledge with fun trivia questions",
                min_players: 1,
                max_players: 20,
            },
            GameKind::RockPaperScissors => GameSpec {
                name: "Rock Paper Scissors",
                description: "Quick game of chance and strategy",
                min_players: 2,
                max_players: 2,
            },
        }
    }

    /// Stable machine-readable identifier (e.g. "tic-tac-toe").
    pub fn slug(&self) -> &'static str {
        match self {
            GameKind::TicTacToe => "tic-tac-toe",
            GameKind::Hangman => "hangman",
            GameKind::Trivia => "trivia",
            GameKind::RockPaperScissors => "rock-paper-scissors",
        }
    }

    /// Look up a kind by its slug.
    pub fn from_slug(slug: &str) -> Option<GameKind> {
        Self::ALL.iter().copied().find(|kind| kind.slug() == slug)
    }

    /// Look up a kind by the display name stored on a Game record.
    pub fn from_display_name(name: &str) -> Option<GameKind> {
        Self::ALL.iter().copied().find(|kind| kind.spec().name == name)
    }

    /// Whether a rule engine is implemented for this kind.
    pub fn has_rules(&self) -> bool {
        matches!(self, GameKind::TicTacToe)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_lookup_by_slug_and_name() {
        // テスト項目: slug と表示名の両方からカタログを引ける
        for kind in GameKind::ALL {
            assert_eq!(GameKind::from_slug(kind.slug()), Some(kind));
            assert_eq!(GameKind::from_display_name(kind.spec().name), Some(kind));
        }
        assert_eq!(GameKind::from_slug("chess"), None);
        assert_eq!(GameKind::from_display_name("Chess"), None);
    }

    #[test]
    fn test_player_bounds_are_sane() {
        // テスト項目: カタログの最少・最大人数が整合している
        for kind in GameKind::ALL {
            let spec = kind.spec();
            assert!(spec.min_players >= 1);
            assert!(spec.min_players <= spec.max_players);
        }
    }

    #[test]
    fn test_only_tictactoe_has_rules() {
        // テスト項目: ルールエンジンを持つのは三目並べのみ
        assert!(GameKind::TicTacToe.has_rules());
        assert!(!GameKind::Hangman.has_rules());
        assert!(!GameKind::Trivia.has_rules());
        assert!(!GameKind::RockPaperScissors.has_rules());
    }
}
