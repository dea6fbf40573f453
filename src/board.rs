use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Number of rows on the board. Row 0 is the top row.
pub const ROWS: usize = 6;
/// Number of columns on the board.
pub const COLUMNS: usize = 7;

/// A single cell of the grid: empty, or holding a token.
pub type Cell = Option<Token>;

/// The two token identities. `X` always moves first.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash)]
pub enum Token {
    /// First player.
    X,
    /// Second player.
    O,
}

impl Token {
    /// Returns the other identity.
    pub const fn opponent(self) -> Self {
        match self {
            Token::X => Token::O,
            Token::O => Token::X,
        }
    }

    fn symbol(self) -> char {
        match self {
            Token::X => 'X',
            Token::O => 'O',
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Represents the possible outcomes of a position.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum GameOutcome {
    /// Nobody has four in a row and there is still room on the board.
    InProgress,
    /// The given token has four in a row.
    Won(Token),
    /// The board is full and nobody has won.
    Draw,
}

/// Reasons a token cannot be dropped into a column.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Error)]
pub enum MoveError {
    /// The top cell of the column is already occupied.
    #[error("column {0} is full")]
    ColumnFull(usize),
    /// The column index is 7 or more.
    #[error("column {0} is outside of 0..7")]
    ColumnOutOfRange(usize),
}

/// Errors produced when reading a board from its text form.
#[derive(Debug, PartialEq, Eq, Clone, Error)]
pub enum ParseBoardError {
    /// The text does not have exactly six non-empty lines.
    #[error("expected 6 rows, found {0}")]
    RowCount(usize),
    /// A line does not hold seven cells once spaces are removed.
    #[error("row {row} has {len} cells, expected 7")]
    RowLength { row: usize, len: usize },
    /// A cell is not `X`, `O` or `.`.
    #[error("unknown cell '{0}'")]
    UnknownCell(char),
    /// A token sits above an empty cell.
    #[error("token at row {row}, column {column} is floating above an empty cell")]
    Floating { row: usize, column: usize },
    /// `X` must have as many tokens as `O`, or exactly one more.
    #[error("{x} X tokens and {o} O tokens cannot occur in a game where X moves first")]
    TokenCounts { x: usize, o: usize },
}

/// A snapshot of the grid and the side to move.
///
/// Hypothetical moves are explored on clones; the only mutation is dropping a token
/// (and handing the turn over).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardState {
    grid: [[Cell; COLUMNS]; ROWS],
    turn: Token,
}

impl Default for BoardState {
    /// Creates an empty board with `X` to move.
    fn default() -> Self {
        BoardState::new(Token::X)
    }
}

impl BoardState {
    /// Creates an empty board with the given side to move.
    pub fn new(turn: Token) -> Self {
        Self {
            grid: [[None; COLUMNS]; ROWS],
            turn,
        }
    }

    /// Returns the same position with a different side to move.
    pub fn with_turn(mut self, turn: Token) -> Self {
        self.turn = turn;
        self
    }

    /// The token that will be placed by the next drop.
    pub fn turn(&self) -> Token {
        self.turn
    }

    /// Returns the content of a cell, `None` for empty or out-of-range cells.
    pub fn cell(&self, row: usize, column: usize) -> Cell {
        self.grid.get(row)?.get(column).copied().flatten()
    }

    /// Drops the current player's token into `column`.
    ///
    /// Returns `false` and leaves the board unchanged when the column is full or does not exist.
    pub fn drop_token(&mut self, column: usize) -> bool {
        self.try_drop(column).is_ok()
    }

    /// Drops the current player's token into `column` and returns the row it landed on.
    pub fn try_drop(&mut self, column: usize) -> Result<usize, MoveError> {
        if column >= COLUMNS {
            return Err(MoveError::ColumnOutOfRange(column));
        }
        let row = (0..ROWS)
            .rev()
            .find(|&row| self.grid[row][column].is_none())
            .ok_or(MoveError::ColumnFull(column))?;
        self.grid[row][column] = Some(self.turn);
        Ok(row)
    }

    /// Hands the move over to the other side.
    pub fn switch_turn(&mut self) {
        self.turn = self.turn.opponent();
    }

    /// Drops a token and hands the move over, the way a committed move is applied.
    pub fn play(&mut self, column: usize) -> bool {
        let placed = self.drop_token(column);
        if placed {
            self.switch_turn();
        }
        placed
    }

    /// True when the column's top cell is taken. Out-of-range columns count as full.
    pub fn is_column_full(&self, column: usize) -> bool {
        column >= COLUMNS || self.grid[0][column].is_some()
    }

    /// Columns that still accept a token, in ascending order.
    pub fn legal_columns(&self) -> Vec<usize> {
        (0..COLUMNS).filter(|&c| !self.is_column_full(c)).collect()
    }

    /// True when no column accepts a token.
    pub fn is_full(&self) -> bool {
        (0..COLUMNS).all(|c| self.is_column_full(c))
    }

    /// Number of tokens of the given identity on the board.
    pub fn token_count(&self, token: Token) -> usize {
        self.grid
            .iter()
            .flatten()
            .filter(|&&cell| cell == Some(token))
            .count()
    }

    /// Returns the identity holding four in a row, if any.
    pub fn winner(&self) -> Option<Token> {
        crate::evaluator::segments().find_map(|segment| {
            let first = self.cell(segment[0].0, segment[0].1)?;
            segment
                .iter()
                .all(|&(row, column)| self.cell(row, column) == Some(first))
                .then_some(first)
        })
    }

    /// Returns the current outcome of the game.
    pub fn outcome(&self) -> GameOutcome {
        match self.winner() {
            Some(token) => GameOutcome::Won(token),
            None if self.is_full() => GameOutcome::Draw,
            None => GameOutcome::InProgress,
        }
    }
}

impl fmt::Display for BoardState {
    /// Renders one row per line, top row first, e.g. `. . . X . . .`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.grid {
            let line: Vec<String> = row
                .iter()
                .map(|cell| cell.map_or('.', Token::symbol).to_string())
                .collect();
            writeln!(f, "{}", line.join(" "))?;
        }
        Ok(())
    }
}

impl FromStr for BoardState {
    type Err = ParseBoardError;

    /// Reads the text form produced by `Display`. Blank lines and whitespace between cells
    /// are ignored. `X` must have as many tokens as `O` or one more; the side to move is `X`
    /// when both counts are equal.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rows: Vec<Vec<char>> = s
            .lines()
            .map(|line| line.chars().filter(|c| !c.is_whitespace()).collect::<Vec<_>>())
            .filter(|row| !row.is_empty())
            .collect();
        if rows.len() != ROWS {
            return Err(ParseBoardError::RowCount(rows.len()));
        }

        let mut board = BoardState::default();
        for (row, chars) in rows.iter().enumerate() {
            if chars.len() != COLUMNS {
                return Err(ParseBoardError::RowLength {
                    row,
                    len: chars.len(),
                });
            }
            for (column, &ch) in chars.iter().enumerate() {
                board.grid[row][column] = match ch {
                    '.' => None,
                    'X' | 'x' => Some(Token::X),
                    'O' | 'o' => Some(Token::O),
                    other => return Err(ParseBoardError::UnknownCell(other)),
                };
            }
        }

        for row in 0..ROWS - 1 {
            for column in 0..COLUMNS {
                if board.grid[row][column].is_some() && board.grid[row + 1][column].is_none() {
                    return Err(ParseBoardError::Floating { row, column });
                }
            }
        }

        let (x, o) = (board.token_count(Token::X), board.token_count(Token::O));
        if x != o && x != o + 1 {
            return Err(ParseBoardError::TokenCounts { x, o });
        }
        if x != o {
            board.turn = Token::O;
        }
        Ok(board)
    }
}

#[cfg(test)]
mod tests {
    use crate::board::{BoardState, GameOutcome, MoveError, ParseBoardError, Token, COLUMNS, ROWS};

    #[test]
    fn tokens_settle_at_the_bottom() {
        let mut board = BoardState::default();
        assert_eq!(board.try_drop(3), Ok(ROWS - 1));
        board.switch_turn();
        assert_eq!(board.try_drop(3), Ok(ROWS - 2));
        assert_eq!(board.cell(5, 3), Some(Token::X));
        assert_eq!(board.cell(4, 3), Some(Token::O));
        assert_eq!(board.cell(3, 3), None);
    }

    #[test]
    fn dropping_into_full_column_leaves_board_untouched() {
        // arrange
        let mut board = BoardState::default();
        for _ in 0..ROWS {
            assert!(board.play(0));
        }
        let before = board.clone();

        // act
        let placed = board.drop_token(0);

        // assert
        assert!(!placed);
        assert_eq!(board, before);
        assert_eq!(board.try_drop(0), Err(MoveError::ColumnFull(0)));
        assert_eq!(board, before);
    }

    #[test]
    fn out_of_range_column_is_rejected() {
        let mut board = BoardState::default();
        assert!(!board.drop_token(COLUMNS));
        assert_eq!(board.try_drop(9), Err(MoveError::ColumnOutOfRange(9)));
        assert_eq!(board, BoardState::default());
    }

    #[test]
    fn play_switches_turn_only_on_success() {
        let mut board = BoardState::default();
        assert!(board.play(2));
        assert_eq!(board.turn(), Token::O);
        for _ in 0..ROWS - 1 {
            assert!(board.play(2));
        }
        let turn = board.turn();
        assert!(!board.play(2));
        assert_eq!(board.turn(), turn);
    }

    #[test]
    fn detects_winner_in_every_direction() {
        let horizontal: BoardState = "
            . . . . . . .
            . . . . . . .
            . . . . . . .
            . . . . . . .
            . O O O . . .
            X X X X . . .
        "
        .parse()
        .unwrap();
        assert_eq!(horizontal.outcome(), GameOutcome::Won(Token::X));

        let vertical: BoardState = "
            . . . . . . .
            . . . . . . .
            . . . . . . O
            . . X . . . O
            . . X . . . O
            . X X . . X O
        "
        .parse()
        .unwrap();
        assert_eq!(vertical.winner(), Some(Token::O));

        let rising: BoardState = "
            . . . . . . .
            . . . . . . .
            . . . X . . .
            . . X O . . .
            . X O O . . .
            X O O X X . .
        "
        .parse()
        .unwrap();
        assert_eq!(rising.winner(), Some(Token::X));

        let falling: BoardState = "
            . . . . . . .
            . . . . . . .
            O . . . . . .
            X O . . . . .
            X X O . . . .
            X X O O . . .
        "
        .parse()
        .unwrap();
        assert_eq!(falling.winner(), Some(Token::O));
    }

    #[test]
    fn full_board_without_line_is_a_draw() {
        let board: BoardState = "
            XOXOXOX
            XOXOXOX
            XOXOXOX
            OXOXOXO
            OXOXOXO
            OXOXOXO
        "
        .parse()
        .unwrap();
        assert!(board.is_full());
        assert!(board.legal_columns().is_empty());
        assert_eq!(board.outcome(), GameOutcome::Draw);
    }

    #[test]
    fn display_round_trips_through_parse() {
        let mut board = BoardState::default();
        for column in [3, 3, 4, 0, 6] {
            assert!(board.play(column));
        }
        let text = board.to_string();
        assert_eq!(text.lines().last(), Some("O . . X X . X"));
        assert_eq!(text.parse::<BoardState>(), Ok(board));
    }

    #[test]
    fn parse_rejects_malformed_boards() {
        assert_eq!(
            ".......".parse::<BoardState>(),
            Err(ParseBoardError::RowCount(1))
        );
        let short = "......\n.......\n.......\n.......\n.......\n.......";
        assert_eq!(
            short.parse::<BoardState>(),
            Err(ParseBoardError::RowLength { row: 0, len: 6 })
        );
        let unknown = ".......\n.......\n.......\n.......\n.......\n...Z...";
        assert_eq!(
            unknown.parse::<BoardState>(),
            Err(ParseBoardError::UnknownCell('Z'))
        );
        let floating = ".......\n.......\n.......\n...X...\n.......\n.......";
        assert_eq!(
            floating.parse::<BoardState>(),
            Err(ParseBoardError::Floating { row: 3, column: 3 })
        );
    }

    #[test]
    fn parse_rejects_impossible_token_counts() {
        let o_ahead = ".......\n.......\n.......\n.......\n.......\n...OX.O";
        assert_eq!(
            o_ahead.parse::<BoardState>(),
            Err(ParseBoardError::TokenCounts { x: 1, o: 2 })
        );
        let x_two_ahead = ".......\n.......\n.......\n.......\n.......\nXX.X..O";
        assert_eq!(
            x_two_ahead.parse::<BoardState>(),
            Err(ParseBoardError::TokenCounts { x: 3, o: 1 })
        );
        let x_one_ahead = ".......\n.......\n.......\n.......\n.......\nXX.O...";
        assert_eq!(x_one_ahead.parse::<BoardState>().map(|b| b.turn()), Ok(Token::O));
    }

    #[test]
    fn parse_infers_side_to_move() {
        let board: BoardState = ".......\n.......\n.......\n.......\n.......\n...X..."
            .parse()
            .unwrap();
        assert_eq!(board.turn(), Token::O);
        assert_eq!(board.with_turn(Token::X).turn(), Token::X);
    }
}
