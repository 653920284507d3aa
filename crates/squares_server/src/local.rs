//! Same-process mode: one `GameState` driven by text commands.
//!
//! Commands, one per line:
//!
//! - `<shape> <x> <y> [orientation]`: place for the active player
//! - `hint`: list a few legal placements for the active player
//! - `board`: print the board
//! - `quit`: stop

use squares_game::{Coord, GameState, Orientation, Placement, PlayerId, ShapeId};
use std::io::{BufRead, Write};
use tracing::{debug, instrument};

const HINT_LIMIT: usize = 5;

/// A parsed input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Commit a placement for the active player.
    Place(Placement),
    /// Show legal placements.
    Hint,
    /// Show the board.
    Board,
    /// Leave.
    Quit,
}

impl std::str::FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let words: Vec<&str> = line.split_whitespace().collect();
        match words.as_slice() {
            ["quit"] | ["q"] => Ok(Command::Quit),
            ["hint"] => Ok(Command::Hint),
            ["board"] => Ok(Command::Board),
            [shape, x, y, rest @ ..] if rest.len() <= 1 => {
                let shape: u8 = shape.parse().map_err(|_| format!("bad shape '{}'", shape))?;
                let shape = ShapeId::new(shape).ok_or_else(|| format!("no shape {}", shape))?;
                let x: i32 = x.parse().map_err(|_| format!("bad x '{}'", x))?;
                let y: i32 = y.parse().map_err(|_| format!("bad y '{}'", y))?;
                let orientation = match rest.first() {
                    Some(o) => o
                        .parse::<u32>()
                        .map_err(|_| format!("bad orientation '{}'", o))?,
                    None => 0,
                };
                Ok(Command::Place(Placement::new(
                    shape,
                    Orientation::new(orientation),
                    Coord::new(x, y),
                )))
            }
            _ => Err(format!("unrecognized command '{}'", line.trim())),
        }
    }
}

/// Runs a full match on one thread, reading commands from `input`.
///
/// Returns the final state, whether the game ended or the player quit.
#[instrument(skip_all)]
pub fn run_local<R, W>(input: R, mut output: W) -> std::io::Result<GameState>
where
    R: BufRead,
    W: Write,
{
    let mut game = GameState::new();
    let mut lines = input.lines();

    while let Some(active) = game.active_player() {
        write!(output, "{}> ", active)?;
        output.flush()?;
        let Some(line) = lines.next().transpose()? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }
        match line.parse::<Command>() {
            Ok(Command::Quit) => break,
            Ok(Command::Board) => write!(output, "{}", game.board().display())?,
            Ok(Command::Hint) => {
                let hints = game.legal_placements(active);
                writeln!(output, "{} legal placements", hints.len())?;
                for hint in hints.iter().take(HINT_LIMIT) {
                    writeln!(
                        output,
                        "  {} {} {} {}",
                        u8::from(hint.shape),
                        hint.origin.x,
                        hint.origin.y,
                        hint.orientation
                    )?;
                }
            }
            Ok(Command::Place(placement)) => match game.commit(active, placement) {
                Ok(report) => {
                    debug!(player = %active, placement = %placement, "Local move");
                    write!(output, "{}", game.board().display())?;
                    for (player, outcome) in report.newly_eliminated() {
                        writeln!(
                            output,
                            "{} is out ({}) with {} cells",
                            player,
                            outcome,
                            game.score(*player)
                        )?;
                    }
                }
                Err(e) => writeln!(output, "rejected: {}", e)?,
            },
            Err(e) => writeln!(output, "{}", e)?,
        }
    }

    if game.active_player().is_none() {
        writeln!(output, "game over")?;
        for player in PlayerId::ALL {
            writeln!(output, "{}: {} cells", player, game.score(player))?;
        }
    }
    Ok(game)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(script: &str) -> (GameState, String) {
        let mut out = Vec::new();
        let game = run_local(script.as_bytes(), &mut out).unwrap();
        (game, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!("quit".parse::<Command>(), Ok(Command::Quit));
        let Ok(Command::Place(p)) = "10 3 4 5".parse::<Command>() else {
            panic!("expected a placement");
        };
        assert_eq!(p.shape, ShapeId::new(10).unwrap());
        assert_eq!(p.origin, Coord::new(3, 4));
        assert_eq!(p.orientation, Orientation::new(5));
        assert!("21 0 0".parse::<Command>().is_err());
        assert!("1 2".parse::<Command>().is_err());
    }

    #[test]
    fn test_opening_round_script() {
        let (game, text) = run("0 0 0\n0 20 0\n0 20 20\n0 0 20\nquit\n");
        assert!(!game.first_round());
        assert_eq!(game.active_player(), PlayerId::new(0));
        assert!(text.starts_with("P0> "));
        assert!(text.contains("P3> "));
    }

    #[test]
    fn test_rejections_keep_turn() {
        let (game, text) = run("0 5 5\nnonsense\n0 0 0\n");
        assert!(text.contains("rejected: Illegal placement"));
        assert!(text.contains("unrecognized command 'nonsense'"));
        assert_eq!(game.active_player(), PlayerId::new(1));
    }

    #[test]
    fn test_extreme_coordinates_are_rejected() {
        let (game, text) = run("0 2147483647 0\n0 -2147483648 2147483647\n0 0 0\n");
        assert_eq!(text.matches("rejected: Illegal placement").count(), 2);
        assert_eq!(game.active_player(), PlayerId::new(1));
        assert_eq!(game.score(PlayerId::ALL[0]), 1);
    }

    #[test]
    fn test_hint_lists_moves() {
        let (_, text) = run("hint\n");
        assert!(text.contains("legal placements"));
    }
}
