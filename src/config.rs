/// Limits applied by an [`Interpreter`](crate::Interpreter).
///
/// Each line is parsed and evaluated on a worker thread with a
/// `stack_size` byte stack. The nesting and evaluation budgets are sized so
/// that neither the parser nor the evaluator can use it up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Maximum number of nested user-function calls before evaluation fails
    /// with a recursion error.
    pub max_call_depth: usize,
    /// Maximum parser recursion accepted on one line: parenthesis depth plus
    /// the length of every enclosing power chain.
    pub max_nesting: usize,
    /// Maximum number of nested expression nodes the evaluator may have open
    /// at once, across all active calls.
    pub max_eval_depth: usize,
    /// Stack size in bytes of the thread a line runs on.
    pub stack_size: usize,
}

impl Config {
    pub const DEFAULT_MAX_CALL_DEPTH: usize = 100;
    pub const DEFAULT_MAX_NESTING: usize = 100;
    pub const DEFAULT_MAX_EVAL_DEPTH: usize = 5_000;
    pub const DEFAULT_STACK_SIZE: usize = 64 * 1024 * 1024;
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_call_depth: Self::DEFAULT_MAX_CALL_DEPTH,
            max_nesting: Self::DEFAULT_MAX_NESTING,
            max_eval_depth: Self::DEFAULT_MAX_EVAL_DEPTH,
            stack_size: Self::DEFAULT_STACK_SIZE,
        }
    }
}
