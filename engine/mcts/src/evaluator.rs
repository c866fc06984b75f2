//! Evaluator trait for position evaluation.
//!
//! The evaluator provides a policy (move probabilities) and a value estimate
//! for a board. Guided search uses both; plain search only needs the value,
//! which [`RolloutEvaluator`] obtains from a random playout. A trained network
//! plugs in through [`ModelEvaluator`], which only ever sees the board's
//! [`Observation`].

use games_uttt::{random_rollout, Board, Observation, NUM_CELLS};
use rand_chacha::ChaCha20Rng;
use thiserror::Error;

/// Errors that can occur during evaluation.
#[derive(Debug, Error)]
pub enum EvaluatorError {
    #[error("Evaluation failed: {0}")]
    EvaluationFailed(String),

    #[error("Invalid policy: expected {expected} entries, got {actual}")]
    InvalidPolicy { expected: usize, actual: usize },
}

/// Result of evaluating a board.
#[derive(Debug, Clone)]
pub struct EvalResult {
    /// Probability distribution over the 81 cells, indexed by
    /// [`games_uttt::Move::index`]. Mass on illegal cells is ignored.
    pub policy: Vec<f32>,

    /// Expected outcome for the side to move, in [-1, 1].
    pub value: f32,
}

impl EvalResult {
    /// Uniform policy over every cell with a neutral value.
    pub fn uniform() -> Self {
        Self {
            policy: vec![1.0 / NUM_CELLS as f32; NUM_CELLS],
            value: 0.0,
        }
    }

    /// Check the shape of the policy and the range of the value.
    pub fn validate(&self) -> Result<(), EvaluatorError> {
        if self.policy.len() != NUM_CELLS {
            return Err(EvaluatorError::InvalidPolicy {
                expected: NUM_CELLS,
                actual: self.policy.len(),
            });
        }
        if !self.value.is_finite() || !(-1.0..=1.0).contains(&self.value) {
            return Err(EvaluatorError::EvaluationFailed(format!(
                "value {} outside [-1, 1]",
                self.value
            )));
        }
        Ok(())
    }
}

/// Trait for position evaluators.
///
/// Implementations:
/// - [`UniformEvaluator`]: uniform policy, neutral value (for testing)
/// - [`RolloutEvaluator`]: uniform policy, value from one random playout
/// - [`ModelEvaluator`]: any function of the board's observation, e.g. a
///   neural network
pub trait Evaluator: Send + Sync {
    /// Evaluate `board` from the view of its side to move. `rng` is the
    /// search's random source; deterministic evaluators ignore it.
    fn evaluate(&self, board: &Board, rng: &mut ChaCha20Rng) -> Result<EvalResult, EvaluatorError>;
}

/// Uniform evaluator that assigns equal probability to all legal moves.
/// Value is always 0.0 (neutral). Useful for testing MCTS without a model.
#[derive(Debug, Clone, Default)]
pub struct UniformEvaluator;

impl UniformEvaluator {
    pub fn new() -> Self {
        Self
    }
}

impl Evaluator for UniformEvaluator {
    fn evaluate(&self, board: &Board, _rng: &mut ChaCha20Rng) -> Result<EvalResult, EvaluatorError> {
        let mut policy = vec![0.0; NUM_CELLS];
        if board.is_game_over() {
            return Ok(EvalResult { policy, value: 0.0 });
        }

        let legal = board.legal_moves();
        let prob = 1.0 / legal.len() as f32;
        for mv in legal {
            policy[mv.index()] = prob;
        }

        Ok(EvalResult { policy, value: 0.0 })
    }
}

/// Random rollout evaluator: plays uniformly random moves to the end of the
/// game on a copy of the board and reports the result.
#[derive(Debug, Clone, Default)]
pub struct RolloutEvaluator;

impl RolloutEvaluator {
    pub fn new() -> Self {
        Self
    }
}

impl Evaluator for RolloutEvaluator {
    fn evaluate(&self, board: &Board, rng: &mut ChaCha20Rng) -> Result<EvalResult, EvaluatorError> {
        let outcome = random_rollout(board, rng);
        Ok(EvalResult {
            policy: UniformEvaluator.evaluate(board, rng)?.policy,
            value: outcome.score_for(board.side_to_move()),
        })
    }
}

/// Adapts a prediction function over [`Observation`]s into an [`Evaluator`].
///
/// The function's output is validated before it reaches the search.
pub struct ModelEvaluator<F> {
    predict: F,
}

impl<F> ModelEvaluator<F>
where
    F: Fn(&Observation) -> Result<EvalResult, EvaluatorError> + Send + Sync,
{
    pub fn new(predict: F) -> Self {
        Self { predict }
    }
}

impl<F> Evaluator for ModelEvaluator<F>
where
    F: Fn(&Observation) -> Result<EvalResult, EvaluatorError> + Send + Sync,
{
    fn evaluate(&self, board: &Board, _rng: &mut ChaCha20Rng) -> Result<EvalResult, EvaluatorError> {
        let result = (self.predict)(&board.observation())?;
        result.validate()?;
        Ok(result)
    }
}

impl<F> std::fmt::Debug for ModelEvaluator<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelEvaluator").finish_non_exhaustive()
    }
}
