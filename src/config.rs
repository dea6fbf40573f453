//! Tree search configuration.

/// Number of select/expand/rollout/backpropagate iterations per decision.
pub const DEFAULT_ITERATIONS: u32 = 10_000;
/// Exploration constant `c` of the UCT formula.
pub const DEFAULT_EXPLORATION: f64 = 1.0;

/// How a column is picked when a node is expanded.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Default)]
pub enum ExpansionPolicy {
    /// Uniform over all seven columns. A full column still produces a child: same grid,
    /// other side to move. As with `LegalOnly`, the child is made by dropping the
    /// parent's token and then switching turn, the reverse of a switch-then-drop expansion.
    AnyColumn,
    /// Uniform over the columns that still accept a token.
    #[default]
    LegalOnly,
}

/// How the column returned to the caller is chosen once the iterations are spent.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Default)]
pub enum MoveSelection {
    /// Column picked by the rollout of the final iteration.
    #[default]
    LastRollout,
    /// Column whose root children gathered the most visits, lowest column on ties.
    MostVisited,
}

/// Configuration for the tree search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    /// Number of iterations to run per search.
    pub iterations: u32,

    /// Exploration constant for UCT. Higher values favour rarely visited children.
    pub exploration: f64,

    /// Column choice during expansion.
    pub expansion: ExpansionPolicy,
    /// Column returned once the iterations are spent.
    pub selection: MoveSelection,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            exploration: DEFAULT_EXPLORATION,
            expansion: ExpansionPolicy::default(),
            selection: MoveSelection::default(),
        }
    }
}

impl SearchConfig {
    /// Create a fast config for testing.
    pub fn for_testing() -> Self {
        Self {
            iterations: 200,
            ..Self::default()
        }
    }

    /// Sets the iteration count.
    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    /// Sets the UCT exploration constant.
    pub fn with_exploration(mut self, c: f64) -> Self {
        self.exploration = c;
        self
    }

    /// Sets the expansion policy.
    pub fn with_expansion_policy(mut self, policy: ExpansionPolicy) -> Self {
        self.expansion = policy;
        self
    }

    /// Sets the move selection policy.
    pub fn with_move_selection(mut self, selection: MoveSelection) -> Self {
        self.selection = selection;
        self
    }
}
