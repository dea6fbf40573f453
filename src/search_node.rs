use crate::board::{BoardState, COLUMNS, GameOutcome};

/// Expansion progress of a node, derived from its number of children.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum ExpansionState {
    /// No children yet.
    Unexpanded,
    /// Between one and six children.
    PartiallyExpanded,
    /// Seven children. They need not be seven distinct or legal columns.
    FullyExpanded,
}

impl ExpansionState {
    /// Classifies a node by how many children it has.
    pub fn from_child_count(children: usize) -> Self {
        match children {
            0 => ExpansionState::Unexpanded,
            n if n < COLUMNS => ExpansionState::PartiallyExpanded,
            _ => ExpansionState::FullyExpanded,
        }
    }
}

/// Represents a single node in the search tree.
///
/// The parent and children links live in the tree arena that owns the node.
#[derive(Debug, Clone)]
pub struct SearchNode {
    /// The position after the move that created this node.
    pub state: BoardState,
    /// The column chosen when this node was expanded. `None` for the root.
    pub column: Option<usize>,
    /// Whether a token was actually placed in `column`.
    pub placed: bool,
    /// The depth of the node in the tree.
    pub depth: u32,
    /// The outcome of the game in `state`.
    pub outcome: GameOutcome,
    /// Number of backpropagation passes through this node.
    pub visits: u32,
    /// Accumulated result: -1 per rollout favouring `X`, +1 per rollout favouring `O`.
    pub score: i32,
}

impl SearchNode {
    /// Creates the root node of a search.
    pub fn root(state: BoardState) -> Self {
        let outcome = state.outcome();
        Self {
            state,
            column: None,
            placed: false,
            depth: 0,
            outcome,
            visits: 0,
            score: 0,
        }
    }

    /// Creates a child reached by trying `column` from a node at `parent_depth`.
    pub fn child(state: BoardState, column: usize, placed: bool, parent_depth: u32) -> Self {
        let outcome = state.outcome();
        Self {
            state,
            column: Some(column),
            placed,
            depth: parent_depth + 1,
            outcome,
            visits: 0,
            score: 0,
        }
    }

    /// A node is terminal when its position is won or drawn.
    pub fn is_terminal(&self) -> bool {
        self.outcome != GameOutcome::InProgress
    }

    /// Mean score per visit, 0 for an unvisited node.
    pub fn mean_score(&self) -> f64 {
        if self.visits == 0 {
            0.0
        } else {
            f64::from(self.score) / f64::from(self.visits)
        }
    }

    /// UCT value of this node among siblings that have `total_visits` visits between them.
    ///
    /// Unvisited nodes are worth `+inf`, so every child is tried once before any is revisited.
    pub fn uct_value(&self, total_visits: u32, exploration: f64) -> f64 {
        if self.visits == 0 {
            return f64::INFINITY;
        }
        let visits = f64::from(self.visits);
        self.mean_score() + exploration * (f64::from(total_visits).ln() / visits).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use crate::board::BoardState;
    use crate::search_node::{ExpansionState, SearchNode};

    #[test]
    fn unvisited_node_is_infinitely_attractive() {
        let node = SearchNode::root(BoardState::default());
        assert_eq!(node.uct_value(10, 1.0), f64::INFINITY);
    }

    #[test]
    fn uct_value_matches_formula() {
        // arrange
        let mut node = SearchNode::child(BoardState::default(), 3, true, 0);
        node.visits = 4;
        node.score = -2;

        // act
        let value = node.uct_value(20, 1.0);
        let wider = node.uct_value(20, 2.0);

        // assert
        let exploration = (20f64.ln() / 4.0).sqrt();
        assert!((value - (-0.5 + exploration)).abs() < 1e-12);
        assert!((wider - (-0.5 + 2.0 * exploration)).abs() < 1e-12);
        assert_eq!(node.depth, 1);
    }

    #[test]
    fn expansion_state_follows_child_count() {
        assert_eq!(ExpansionState::from_child_count(0), ExpansionState::Unexpanded);
        assert_eq!(
            ExpansionState::from_child_count(3),
            ExpansionState::PartiallyExpanded
        );
        assert_eq!(
            ExpansionState::from_child_count(7),
            ExpansionState::FullyExpanded
        );
    }

    #[test]
    fn won_position_is_terminal() {
        let board: BoardState = ".......\n.......\n.......\n.......\nOOO....\nXXXX..."
            .parse()
            .unwrap();
        assert!(SearchNode::root(board).is_terminal());
        assert!(!SearchNode::root(BoardState::default()).is_terminal());
    }
}
