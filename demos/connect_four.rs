extern crate connect_four_search;

use connect_four_search::board::{BoardState, GameOutcome, Token};
use connect_four_search::choose_greedy_move;
use connect_four_search::tree_search::TreeSearch;
use tracing::info;

const ITERATIONS: u32 = 10_000;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("connect_four_search=info".parse().unwrap()),
        )
        .init();

    // Greedy lookahead plays X, the tree search plays O
    let mut board = BoardState::default();
    loop {
        println!("{board}");
        match board.outcome() {
            GameOutcome::Won(token) => {
                println!("Player {token} wins!");
                break;
            }
            GameOutcome::Draw => {
                println!("It's a draw!");
                break;
            }
            GameOutcome::InProgress => {}
        }

        let column = match board.turn() {
            Token::X => choose_greedy_move(&board),
            Token::O => {
                let mut search = TreeSearch::builder(board.clone())
                    .with_iterations(ITERATIONS)
                    .build();
                search.run().ok().map(|result| result.column)
            }
        };
        let Some(column) = column else {
            println!("No legal move left.");
            break;
        };

        info!(player = %board.turn(), column, "move chosen");
        board.play(column);
    }
}
