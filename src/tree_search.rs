use crate::board::{BoardState, COLUMNS, GameOutcome, Token};
use crate::config::{ExpansionPolicy, MoveSelection, SearchConfig};
use crate::greedy::{best_greedy_move, choose_greedy_move};
use crate::random::{RandomGenerator, StandardRandomGenerator};
use crate::search_node::{ExpansionState, SearchNode};
use ego_tree::{NodeId, NodeRef, Tree};
use std::cmp::Ordering;
use thiserror::Error;
use tracing::{debug, trace, warn};

/// Errors that can occur during the tree search.
#[derive(Debug, PartialEq, Eq, Error)]
pub enum SearchError {
    /// The root position is full.
    #[error("No legal moves available")]
    NoLegalMoves,

    /// A node id did not resolve in the tree. Indicates a bug in the search.
    #[error("Node {0:?} is not part of the search tree")]
    MissingNode(NodeId),
}

/// Result of a single rollout: the column the one-ply lookahead picked and the identity
/// the position favours.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub struct Rollout {
    /// Best greedy reply for the node's side to move, `None` on a full board.
    pub column: Option<usize>,
    /// Identity the position favours, `None` when neutral.
    pub favored: Option<Token>,
}

/// Result of a completed search.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct SearchResult {
    /// Column to play from the root position.
    pub column: usize,
    /// Number of iterations performed.
    pub iterations: u32,
    /// Number of nodes in the tree when the search stopped.
    pub nodes: usize,
    /// Visits recorded at the root. Equals `iterations`.
    pub root_visits: u32,
}

/// The four phases of a search iteration.
#[derive(Debug, PartialEq, Clone)]
pub enum SearchAction {
    /// Descend from the root through fully expanded nodes by UCT value.
    Selection,
    /// Add one child to the selected `leaf`, if it can take one.
    Expansion { leaf: NodeId },
    /// Run the one-ply lookahead from `node`.
    Rollout { node: NodeId },
    /// Push the rollout result from `node` up to the root.
    Backpropagation { node: NodeId, rollout: Rollout },
}

impl SearchAction {
    /// Phase name, as logged.
    pub fn name(&self) -> &'static str {
        match self {
            SearchAction::Selection => "Selection",
            SearchAction::Expansion { .. } => "Expansion",
            SearchAction::Rollout { .. } => "Rollout",
            SearchAction::Backpropagation { .. } => "Backpropagation",
        }
    }
}

/// Best-first tree search over Connect Four positions.
///
/// Each iteration selects a node by UCT, expands one child, scores it with the greedy
/// one-ply lookahead and propagates the result back to the root. The tree lives only as
/// long as the search.
pub struct TreeSearch<K: RandomGenerator = StandardRandomGenerator> {
    tree: Tree<SearchNode>,
    root_id: NodeId,
    random: K,
    config: SearchConfig,
    next_action: SearchAction,
    last_rollout: Option<Rollout>,
    iterations: u32,
}

/// A builder for creating instances of `TreeSearch`.
pub struct TreeSearchBuilder<K: RandomGenerator> {
    board: BoardState,
    config: SearchConfig,
    random_generator: K,
}

impl TreeSearchBuilder<StandardRandomGenerator> {
    /// Creates a new builder with the given root position.
    pub fn new(board: BoardState) -> Self {
        Self {
            board,
            config: SearchConfig::default(),
            random_generator: StandardRandomGenerator,
        }
    }
}

impl<K: RandomGenerator> TreeSearchBuilder<K> {
    /// Sets the random number generator used during expansion.
    pub fn with_random_generator<R: RandomGenerator>(self, rg: R) -> TreeSearchBuilder<R> {
        TreeSearchBuilder {
            board: self.board,
            config: self.config,
            random_generator: rg,
        }
    }

    /// Replaces the whole configuration. Apply before the other `with_*` calls.
    pub fn with_config(mut self, config: SearchConfig) -> Self {
        self.config = config;
        self
    }

    /// Number of iterations `run` performs.
    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.config.iterations = iterations;
        self
    }

    /// Exploration constant of the UCT formula.
    pub fn with_exploration(mut self, c: f64) -> Self {
        self.config.exploration = c;
        self
    }

    /// How expansion picks the column of a new child.
    pub fn with_expansion_policy(mut self, policy: ExpansionPolicy) -> Self {
        self.config.expansion = policy;
        self
    }

    /// How `run` turns the finished tree into a column.
    pub fn with_move_selection(mut self, selection: MoveSelection) -> Self {
        self.config.selection = selection;
        self
    }

    /// Builds the search.
    pub fn build(self) -> TreeSearch<K> {
        TreeSearch::new(self.board, self.random_generator, self.config)
    }
}

impl TreeSearch<StandardRandomGenerator> {
    /// Returns a new builder for `TreeSearch`.
    pub fn builder(board: BoardState) -> TreeSearchBuilder<StandardRandomGenerator> {
        TreeSearchBuilder::new(board)
    }

    /// Search with the default configuration and an unseeded generator.
    pub fn from_board(board: BoardState) -> Self {
        TreeSearchBuilder::new(board).build()
    }
}

impl<K: RandomGenerator> TreeSearch<K> {
    /// Creates a search rooted at `board`. Prefer `TreeSearch::builder()`.
    pub fn new(board: BoardState, rg: K, config: SearchConfig) -> Self {
        let tree = Tree::new(SearchNode::root(board));
        let root_id = tree.root().id();
        Self {
            tree,
            root_id,
            random: rg,
            config,
            next_action: SearchAction::Selection,
            last_rollout: None,
            iterations: 0,
        }
    }

    /// Returns a reference to the search tree.
    pub fn get_tree(&self) -> &Tree<SearchNode> {
        &self.tree
    }

    /// Returns the root node.
    pub fn get_root(&self) -> NodeRef<'_, SearchNode> {
        self.tree.root()
    }

    /// Returns the configuration in use.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Returns the phase that the next call to `execute_action` will perform.
    pub fn get_next_action(&self) -> &SearchAction {
        &self.next_action
    }

    /// Result of the most recent rollout, `None` before the first one.
    pub fn last_rollout(&self) -> Option<Rollout> {
        self.last_rollout
    }

    /// Performs a single phase of the current iteration.
    ///
    /// Returns the nodes updated by backpropagation once an iteration completes, `None` for
    /// the other phases.
    pub fn execute_action(&mut self) -> Result<Option<Vec<NodeId>>, SearchError> {
        trace!(phase = self.next_action.name(), "executing search phase");
        match self.next_action.clone() {
            SearchAction::Selection => {
                let leaf = self.select_leaf()?;
                self.next_action = SearchAction::Expansion { leaf };
                Ok(None)
            }
            SearchAction::Expansion { leaf } => {
                let node = self.expand_node(leaf)?;
                self.next_action = SearchAction::Rollout { node };
                Ok(None)
            }
            SearchAction::Rollout { node } => {
                let rollout = self.rollout(node)?;
                self.last_rollout = Some(rollout);
                self.next_action = SearchAction::Backpropagation { node, rollout };
                Ok(None)
            }
            SearchAction::Backpropagation { node, rollout } => {
                let branch = self.backpropagate(node, rollout)?;
                self.next_action = SearchAction::Selection;
                self.iterations += 1;
                Ok(Some(branch))
            }
        }
    }

    /// Performs one full iteration and returns the nodes updated by backpropagation.
    pub fn do_iteration(&mut self) -> Result<Vec<NodeId>, SearchError> {
        loop {
            if let Some(branch) = self.execute_action()? {
                return Ok(branch);
            }
        }
    }

    /// Performs `n` full iterations.
    pub fn iterate_n_times(&mut self, n: u32) -> Result<(), SearchError> {
        for _ in 0..n {
            self.do_iteration()?;
        }
        Ok(())
    }

    /// Runs the configured number of iterations and picks a column for the root position.
    pub fn run(&mut self) -> Result<SearchResult, SearchError> {
        let root_state = self.get_root().value().state.clone();
        if root_state.is_full() {
            return Err(SearchError::NoLegalMoves);
        }

        self.iterate_n_times(self.config.iterations)?;

        let column = match self.config.selection {
            MoveSelection::LastRollout => self.last_rollout.and_then(|r| r.column),
            MoveSelection::MostVisited => self.most_visited_column(),
        };
        let column = column
            .or_else(|| choose_greedy_move(&root_state))
            .ok_or(SearchError::NoLegalMoves)?;

        let result = SearchResult {
            column,
            iterations: self.iterations,
            nodes: self.tree.nodes().count(),
            root_visits: self.get_root().value().visits,
        };
        debug!(
            column = result.column,
            iterations = result.iterations,
            nodes = result.nodes,
            root_score = self.get_root().value().score,
            "tree search finished"
        );
        Ok(result)
    }

    fn node(&self, id: NodeId) -> Result<NodeRef<'_, SearchNode>, SearchError> {
        self.tree.get(id).ok_or(SearchError::MissingNode(id))
    }

    /// Descends from the root while the current node is fully expanded and not terminal.
    fn select_leaf(&self) -> Result<NodeId, SearchError> {
        let mut node = self.node(self.root_id)?;
        while expansion_state(&node) == ExpansionState::FullyExpanded
            && !node.value().is_terminal()
        {
            match self.best_child(&node) {
                Some(child) => node = child,
                None => break,
            }
        }
        Ok(node.id())
    }

    /// Child with the highest UCT value, the first one on ties.
    fn best_child<'a>(&self, node: &NodeRef<'a, SearchNode>) -> Option<NodeRef<'a, SearchNode>> {
        let total_visits: u32 = node.children().map(|c| c.value().visits).sum();
        let mut best: Option<(NodeRef<'a, SearchNode>, f64)> = None;
        for child in node.children() {
            let value = child.value().uct_value(total_visits, self.config.exploration);
            if best.as_ref().is_none_or(|(_, max)| value > *max) {
                best = Some((child, value));
            }
        }
        best.map(|(child, _)| child)
    }

    /// Appends one child to `leaf` and returns it, or returns `leaf` itself when it is
    /// terminal or already fully expanded.
    fn expand_node(&mut self, leaf: NodeId) -> Result<NodeId, SearchError> {
        let (state, depth) = {
            let node = self.node(leaf)?;
            if node.value().is_terminal()
                || expansion_state(&node) == ExpansionState::FullyExpanded
            {
                return Ok(leaf);
            }
            (node.value().state.clone(), node.value().depth)
        };

        let column = match self.config.expansion {
            ExpansionPolicy::AnyColumn => self.random.next_below(COLUMNS),
            ExpansionPolicy::LegalOnly => match self.random.choose(&state.legal_columns()) {
                Some(&column) => column,
                None => return Ok(leaf),
            },
        };

        let mut child_state = state;
        let placed = child_state.drop_token(column);
        child_state.switch_turn();
        let child = SearchNode::child(child_state, column, placed, depth);

        let mut parent = self
            .tree
            .get_mut(leaf)
            .ok_or(SearchError::MissingNode(leaf))?;
        let child_id = parent.append(child).id();
        trace!(column, placed, depth = depth + 1, "expanded node");
        Ok(child_id)
    }

    /// One-ply lookahead from the node's side to move.
    fn rollout(&self, node_id: NodeId) -> Result<Rollout, SearchError> {
        let node = self.node(node_id)?;
        let value = node.value();
        let greedy = best_greedy_move(&value.state);
        let favored = match value.outcome {
            GameOutcome::Won(token) => Some(token),
            GameOutcome::Draw => None,
            GameOutcome::InProgress => {
                greedy.and_then(|m| favored_by(m.score, value.state.turn()))
            }
        };
        Ok(Rollout {
            column: greedy.map(|m| m.column),
            favored,
        })
    }

    /// Adds one visit to `node_id` and each of its ancestors and moves their score towards
    /// `O` (+1) or `X` (-1). Returns the updated nodes, leaf first.
    fn backpropagate(&mut self, node_id: NodeId, rollout: Rollout) -> Result<Vec<NodeId>, SearchError> {
        let delta = match rollout.favored {
            Some(Token::X) => -1,
            Some(Token::O) => 1,
            None => 0,
        };

        let mut branch = Vec::new();
        let mut current = Some(node_id);
        while let Some(id) = current {
            let parent = self.node(id)?.parent().map(|p| p.id());
            let mut node = self.tree.get_mut(id).ok_or(SearchError::MissingNode(id))?;
            let stats = node.value();
            stats.visits += 1;
            stats.score += delta;
            branch.push(id);
            current = parent;
        }
        Ok(branch)
    }

    /// Column whose root children (placed moves only) gathered the most visits.
    fn most_visited_column(&self) -> Option<usize> {
        let mut visits = [0u32; COLUMNS];
        for child in self.get_root().children() {
            let value = child.value();
            if let (Some(column), true) = (value.column, value.placed) {
                visits[column] += value.visits;
            }
        }

        let mut best: Option<usize> = None;
        for column in (0..COLUMNS).filter(|&c| visits[c] > 0) {
            if best.is_none_or(|b| visits[column] > visits[b]) {
                best = Some(column);
            }
        }
        best
    }
}

fn expansion_state(node: &NodeRef<'_, SearchNode>) -> ExpansionState {
    ExpansionState::from_child_count(node.children().count())
}

fn favored_by(score: i32, perspective: Token) -> Option<Token> {
    match score.cmp(&0) {
        Ordering::Greater => Some(perspective),
        Ordering::Less => Some(perspective.opponent()),
        Ordering::Equal => None,
    }
}

/// Runs a tree search of `iterations` iterations from `board` with the default configuration.
///
/// Returns `None` when the board is full.
pub fn choose_tree_search_move(board: &BoardState, iterations: u32) -> Option<usize> {
    let mut search = TreeSearch::builder(board.clone())
        .with_iterations(iterations)
        .build();
    match search.run() {
        Ok(result) => Some(result.column),
        Err(SearchError::NoLegalMoves) => None,
        Err(err) => {
            warn!(%err, "tree search failed, falling back to the greedy move");
            choose_greedy_move(board)
        }
    }
}
