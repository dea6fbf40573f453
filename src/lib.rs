//! Move selection for Connect Four.
//!
//! Given a 6×7 board and the side to move, the crate picks a column to drop a token into.
//! Two strategies are provided:
//!
//! * a one-ply heuristic lookahead ([`choose_greedy_move`]) that scores every legal reply
//!   with [`evaluate`] and keeps the best one;
//! * a best-first tree search ([`choose_tree_search_move`], [`tree_search::TreeSearch`])
//!   that repeats selection by UCT, expansion of one child, a heuristic rollout and
//!   backpropagation for a fixed number of iterations.
//!
//! # Example
//!
//! ```rust
//! use connect_four_search::board::BoardState;
//! use connect_four_search::random::SeededGenerator;
//! use connect_four_search::tree_search::TreeSearch;
//! use connect_four_search::{choose_greedy_move, evaluate};
//!
//! let mut board = BoardState::default();
//! board.play(3);
//!
//! // One-ply lookahead for the side to move
//! let greedy = choose_greedy_move(&board);
//! assert!(greedy.is_some());
//! println!("score after X in the centre: {}", evaluate(&board, board.turn().opponent()));
//!
//! // Reproducible tree search
//! let mut search = TreeSearch::builder(board)
//!     .with_random_generator(SeededGenerator::default())
//!     .with_iterations(1000)
//!     .build();
//! let result = search.run().unwrap();
//!
//! println!("The best move is: {}", result.column);
//! ```

/// Board representation, token identities and move legality.
pub mod board;
/// Tree search configuration.
pub mod config;
/// Line-segment heuristic used by both strategies.
pub mod evaluator;
/// One-ply heuristic lookahead.
pub mod greedy;
/// Traits and implementations for random number generation.
pub mod random;
/// Contains the `SearchNode` struct, which represents a node in the search tree.
pub mod search_node;
/// The tree search driver.
pub mod tree_search;

pub use evaluator::evaluate;
pub use greedy::choose_greedy_move;
pub use tree_search::choose_tree_search_move;
