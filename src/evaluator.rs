use crate::board::{BoardState, COLUMNS, ROWS, Token};

/// Score of a completed line of four.
pub const WIN_SCORE: i32 = 512;
/// Tempo bonus for the side whose turn it is by token count.
pub const MOVE_BONUS: i32 = 16;
/// Weight of an open segment holding 0, 1, 2 or 3 tokens of a single identity.
pub const SEGMENT_WEIGHTS: [i32; 4] = [0, 1, 10, 50];

/// Four contiguous cells, as `(row, column)` pairs.
pub type Segment = [(usize, usize); 4];

/// Horizontal, vertical, diagonal down-right and diagonal up-right.
const DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (-1, 1)];

/// Enumerates every length-4 segment of the board exactly once (69 in total).
pub fn segments() -> impl Iterator<Item = Segment> {
    DIRECTIONS.into_iter().flat_map(|(dr, dc)| {
        (0..ROWS).flat_map(move |row| {
            (0..COLUMNS).filter_map(move |column| segment_from(row, column, dr, dc))
        })
    })
}

fn segment_from(row: usize, column: usize, dr: isize, dc: isize) -> Option<Segment> {
    row.checked_add_signed(3 * dr).filter(|&r| r < ROWS)?;
    column.checked_add_signed(3 * dc).filter(|&c| c < COLUMNS)?;

    let cell = |k: isize| {
        (
            row.wrapping_add_signed(k * dr),
            column.wrapping_add_signed(k * dc),
        )
    };
    Some([cell(0), cell(1), cell(2), cell(3)])
}

/// Contribution of a single segment, from `X`'s point of view.
enum SegmentScore {
    Line(Token),
    Open(i32),
}

fn score_segment(board: &BoardState, segment: &Segment) -> SegmentScore {
    let (mut x, mut o) = (0usize, 0usize);
    for &(row, column) in segment {
        match board.cell(row, column) {
            Some(Token::X) => x += 1,
            Some(Token::O) => o += 1,
            None => {}
        }
    }

    match (x, o) {
        (4, _) => SegmentScore::Line(Token::X),
        (_, 4) => SegmentScore::Line(Token::O),
        (0, n) => SegmentScore::Open(-SEGMENT_WEIGHTS[n]),
        (n, 0) => SegmentScore::Open(SEGMENT_WEIGHTS[n]),
        _ => SegmentScore::Open(0),
    }
}

/// Scores `board` from the point of view of `perspective`; higher is better for it.
///
/// A line of four short-circuits to exactly `±WIN_SCORE`. Otherwise the result is the sum of
/// all open segment weights plus `±MOVE_BONUS`: the bonus goes to `X` when both sides have
/// placed the same number of tokens, to `O` otherwise.
pub fn evaluate(board: &BoardState, perspective: Token) -> i32 {
    let mut score = 0;
    for segment in segments() {
        match score_segment(board, &segment) {
            SegmentScore::Line(token) => {
                return if token == perspective {
                    WIN_SCORE
                } else {
                    -WIN_SCORE
                };
            }
            SegmentScore::Open(value) => score += value,
        }
    }

    score += if board.token_count(Token::X) == board.token_count(Token::O) {
        MOVE_BONUS
    } else {
        -MOVE_BONUS
    };

    match perspective {
        Token::X => score,
        Token::O => -score,
    }
}
