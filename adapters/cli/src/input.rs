//! Scripted player input.

use crawl_core::Direction;

/// Action requested for one idle frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Intent {
    Move(Direction),
    NewGame,
    /// Let one idle frame pass without acting.
    Idle,
}

/// A script symbol that maps to no intent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown input symbol {symbol:?} at position {position}")]
pub(crate) struct InputError {
    symbol: char,
    position: usize,
}

/// Parses `w a s d` moves, `n` for a new game and `.` for an idle frame.
///
/// Whitespace and commas are ignored; symbols are case-insensitive.
pub(crate) fn parse_script(script: &str) -> Result<Vec<Intent>, InputError> {
    script
        .chars()
        .enumerate()
        .filter(|(_, symbol)| !symbol.is_whitespace() && *symbol != ',')
        .map(|(position, symbol)| {
            let intent = match symbol.to_ascii_lowercase() {
                'w' => Intent::Move(Direction::North),
                'a' => Intent::Move(Direction::West),
                's' => Intent::Move(Direction::South),
                'd' => Intent::Move(Direction::East),
                'n' => Intent::NewGame,
                '.' => Intent::Idle,
                _ => return Err(InputError { symbol, position }),
            };
            Ok(intent)
        })
        .collect()
}
