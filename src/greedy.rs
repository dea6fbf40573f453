use crate::board::{BoardState, COLUMNS};
use crate::evaluator::evaluate;

/// A column picked by the one-ply lookahead, with the score of the resulting position.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub struct GreedyMove {
    pub column: usize,
    pub score: i32,
}

/// Tries every column for the side to move and scores each resulting position from that
/// side's point of view. The first column with the highest score wins ties.
///
/// Returns `None` only when the board is full.
pub fn best_greedy_move(board: &BoardState) -> Option<GreedyMove> {
    let mover = board.turn();
    let mut best: Option<GreedyMove> = None;
    for column in 0..COLUMNS {
        let mut child = board.clone();
        if !child.drop_token(column) {
            continue;
        }

        let score = evaluate(&child, mover);
        if best.is_none_or(|b| score > b.score) {
            best = Some(GreedyMove { column, score });
        }
    }
    best
}

/// One-ply lookahead: the column whose resulting position evaluates best for the side to move.
pub fn choose_greedy_move(board: &BoardState) -> Option<usize> {
    best_greedy_move(board).map(|m| m.column)
}

#[cfg(test)]
mod tests {
    use crate::board::{BoardState, Token};
    use crate::evaluator::WIN_SCORE;
    use crate::greedy::{GreedyMove, best_greedy_move, choose_greedy_move};

    #[test]
    fn completes_open_three() {
        // arrange
        let board: BoardState = "
            . . . . . . .
            . . . . . . .
            . . . . . . .
            . . . . . . .
            . O O O . . .
            . X X X . . .
        "
        .parse()
        .unwrap();
        assert_eq!(board.turn(), Token::X);

        // act
        let best = best_greedy_move(&board);

        // assert
        assert_eq!(
            best,
            Some(GreedyMove {
                column: 0,
                score: WIN_SCORE
            })
        );
    }

    #[test]
    fn plays_for_the_side_to_move() {
        // three X tokens along the bottom row, O to reply
        let mut board = BoardState::default();
        for column in 1..4 {
            assert!(board.drop_token(column));
        }
        board.switch_turn();
        assert_eq!(board.turn(), Token::O);

        // capping the right end of the three scores best for O
        assert_eq!(choose_greedy_move(&board), Some(4));
    }

    #[test]
    fn prefers_the_centre_on_an_empty_board() {
        assert_eq!(choose_greedy_move(&BoardState::default()), Some(3));
    }

    #[test]
    fn finds_the_only_open_column() {
        let board: BoardState = "
            XOXOXO.
            XOXOXO.
            OXOXOX.
            OXOXOX.
            XOXOXO.
            XOXOXO.
        "
        .parse()
        .unwrap();
        assert_eq!(choose_greedy_move(&board), Some(6));
    }

    #[test]
    fn full_board_has_no_move() {
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
        assert_eq!(choose_greedy_move(&board), None);
        assert_eq!(best_greedy_move(&board), None);
    }

    #[test]
    fn never_returns_no_move_while_a_column_is_open() {
        let mut board = BoardState::default();
        while !board.is_full() && board.winner().is_none() {
            let column = choose_greedy_move(&board).unwrap();
            assert!(!board.is_column_full(column));
            assert!(board.play(column));
        }
    }
}
