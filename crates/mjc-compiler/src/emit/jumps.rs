//! Jump management for control flow.
//!
//! This module tracks the fix-up lists of the control constructs being
//! emitted (the false list and the statement-body list of each `if`/`for`
//! header) and the loop contexts that `break` and `continue` target.
//!
//! Each construct walks `HeaderOpened → ConditionsEmitted → BodyEmitted →
//! FixupsPatched → Closed`; any other order is an internal error.

use mjc_core::GenerationError;

use super::JumpLabel;

/// The control construct owning a set of fix-up lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstructKind {
    /// `if` / `if-else`
    If,
    /// `for`
    For,
}

/// Lifecycle of a construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstructState {
    /// Header opened; conditions are being emitted.
    HeaderOpened,
    /// Conditions done; the body-list targets are known.
    ConditionsEmitted,
    /// The body has been emitted.
    BodyEmitted,
    /// Every list has been drained.
    FixupsPatched,
    /// Popped off the stack.
    Closed,
}

impl ConstructState {
    /// Name used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            ConstructState::HeaderOpened => "HeaderOpened",
            ConstructState::ConditionsEmitted => "ConditionsEmitted",
            ConstructState::BodyEmitted => "BodyEmitted",
            ConstructState::FixupsPatched => "FixupsPatched",
            ConstructState::Closed => "Closed",
        }
    }
}

/// Fix-up lists of one construct.
#[derive(Debug)]
struct Construct {
    kind: ConstructKind,
    state: ConstructState,
    /// Jumps taken when the current term is false.
    false_list: Vec<JumpLabel>,
    /// Jumps into the statement body (OR short circuit, `for` header).
    body_list: Vec<JumpLabel>,
}

/// Context for a single loop.
#[derive(Debug)]
struct LoopContext {
    /// Target offset for continue statements (the update step)
    continue_target: usize,
    /// Jumps past the loop: breaks and the failed condition
    break_labels: Vec<JumpLabel>,
}

/// Manages jump targets for control flow.
///
/// Constructs and loops are kept on separate stacks: an `if` inside a loop
/// has its own false list, while its `break` lands on the loop's list.
#[derive(Debug, Default)]
pub struct JumpManager {
    /// Open constructs (innermost last)
    constructs: Vec<Construct>,
    /// Stack of loop contexts (innermost last)
    loops: Vec<LoopContext>,
}

fn imbalance(detail: impl Into<String>) -> GenerationError {
    GenerationError::FixupImbalance {
        detail: detail.into(),
    }
}

impl JumpManager {
    /// Create a new jump manager.
    pub fn new() -> Self {
        Self::default()
    }

    // ==========================================================================
    // Constructs
    // ==========================================================================

    /// Open the fix-up lists of a new construct.
    pub fn open_construct(&mut self, kind: ConstructKind) {
        self.constructs.push(Construct {
            kind,
            state: ConstructState::HeaderOpened,
            false_list: Vec::new(),
            body_list: Vec::new(),
        });
    }

    fn current(&mut self, action: &'static str) -> Result<&mut Construct, GenerationError> {
        self.constructs
            .last_mut()
            .ok_or_else(|| imbalance(format!("cannot {action}: no construct is open")))
    }

    fn transition(
        &mut self,
        from: ConstructState,
        to: ConstructState,
        action: &'static str,
    ) -> Result<(), GenerationError> {
        let construct = self.current(action)?;
        if construct.state != from {
            return Err(GenerationError::InvalidConstructState {
                state: construct.state.name(),
                action,
            });
        }
        construct.state = to;
        Ok(())
    }

    /// Record a jump taken when a condition factor is false.
    pub fn add_false(&mut self, label: JumpLabel) -> Result<(), GenerationError> {
        let construct = self.current("add a false jump")?;
        if construct.state != ConstructState::HeaderOpened {
            return Err(GenerationError::InvalidConstructState {
                state: construct.state.name(),
                action: "add a false jump",
            });
        }
        construct.false_list.push(label);
        Ok(())
    }

    /// Record a jump into the statement body.
    pub fn add_body(&mut self, label: JumpLabel) -> Result<(), GenerationError> {
        let construct = self.current("add a body jump")?;
        if construct.state != ConstructState::HeaderOpened {
            return Err(GenerationError::InvalidConstructState {
                state: construct.state.name(),
                action: "add a body jump",
            });
        }
        construct.body_list.push(label);
        Ok(())
    }

    /// Drain the false list.
    pub fn take_false(&mut self) -> Result<Vec<JumpLabel>, GenerationError> {
        Ok(std::mem::take(&mut self.current("take the false list")?.false_list))
    }

    /// Drain the body list.
    pub fn take_body(&mut self) -> Result<Vec<JumpLabel>, GenerationError> {
        Ok(std::mem::take(&mut self.current("take the body list")?.body_list))
    }

    /// `HeaderOpened → ConditionsEmitted`
    pub fn conditions_emitted(&mut self) -> Result<(), GenerationError> {
        self.transition(
            ConstructState::HeaderOpened,
            ConstructState::ConditionsEmitted,
            "finish its conditions",
        )
    }

    /// `ConditionsEmitted → BodyEmitted`
    pub fn body_emitted(&mut self) -> Result<(), GenerationError> {
        self.transition(
            ConstructState::ConditionsEmitted,
            ConstructState::BodyEmitted,
            "finish its body",
        )
    }

    /// `BodyEmitted → FixupsPatched`; every list must have been drained.
    pub fn fixups_patched(&mut self) -> Result<(), GenerationError> {
        let construct = self.current("finish patching")?;
        if !construct.false_list.is_empty() || !construct.body_list.is_empty() {
            return Err(imbalance(format!(
                "{:?} closed with {} false and {} body fix-ups pending",
                construct.kind,
                construct.false_list.len(),
                construct.body_list.len()
            )));
        }
        self.transition(
            ConstructState::BodyEmitted,
            ConstructState::FixupsPatched,
            "finish patching",
        )
    }

    /// `FixupsPatched → Closed`; pops the construct.
    pub fn close_construct(&mut self) -> Result<(), GenerationError> {
        self.transition(
            ConstructState::FixupsPatched,
            ConstructState::Closed,
            "close",
        )?;
        self.constructs.pop();
        Ok(())
    }

    // ==========================================================================
    // Loops
    // ==========================================================================

    /// Enter a new loop context.
    ///
    /// # Arguments
    /// * `continue_target` - The bytecode offset to jump to for continue statements
    pub fn enter_loop(&mut self, continue_target: usize) {
        self.loops.push(LoopContext {
            continue_target,
            break_labels: Vec::new(),
        });
    }

    /// Exit the current loop context.
    ///
    /// Returns the labels that need to be patched to jump past the loop.
    pub fn exit_loop(&mut self) -> Result<Vec<JumpLabel>, GenerationError> {
        self.loops
            .pop()
            .map(|ctx| ctx.break_labels)
            .ok_or_else(|| imbalance("loop exited twice"))
    }

    /// Check if we're currently inside a loop.
    pub fn in_loop(&self) -> bool {
        !self.loops.is_empty()
    }

    /// Add a label to be patched when the loop exits.
    pub fn add_break(&mut self, label: JumpLabel) -> Result<(), GenerationError> {
        self.loops
            .last_mut()
            .map(|ctx| ctx.break_labels.push(label))
            .ok_or_else(|| imbalance("break emitted outside a loop"))
    }

    /// Move the innermost construct's false list onto the loop's exit list.
    pub fn false_into_loop(&mut self) -> Result<usize, GenerationError> {
        let labels = self.take_false()?;
        let ctx = self
            .loops
            .last_mut()
            .ok_or_else(|| imbalance("loop condition emitted outside a loop"))?;
        let moved = labels.len();
        ctx.break_labels.extend(labels);
        Ok(moved)
    }

    /// Get the continue target for the current loop.
    pub fn continue_target(&self) -> Result<usize, GenerationError> {
        self.loops
            .last()
            .map(|ctx| ctx.continue_target)
            .ok_or_else(|| imbalance("continue emitted outside a loop"))
    }

    /// Get the current loop nesting depth.
    pub fn loop_depth(&self) -> usize {
        self.loops.len()
    }

    /// Whether every construct and loop has been closed.
    pub fn is_balanced(&self) -> bool {
        self.constructs.is_empty() && self.loops.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_manager_not_in_loop() {
        let manager = JumpManager::new();
        assert!(!manager.in_loop());
        assert_eq!(manager.loop_depth(), 0);
        assert!(manager.is_balanced());
    }

    #[test]
    fn nested_loops() {
        let mut manager = JumpManager::new();
        manager.enter_loop(10);
        manager.enter_loop(20);

        assert_eq!(manager.loop_depth(), 2);
        assert_eq!(manager.continue_target(), Ok(20));

        manager.exit_loop().unwrap();
        assert_eq!(manager.continue_target(), Ok(10));
    }

    #[test]
    fn exit_loop_returns_breaks() {
        let mut manager = JumpManager::new();
        manager.enter_loop(10);
        manager.add_break(JumpLabel(100)).unwrap();
        manager.add_break(JumpLabel(110)).unwrap();

        let breaks = manager.exit_loop().unwrap();
        assert_eq!(breaks.len(), 2);
        assert_eq!(breaks[0].0, 100);
        assert_eq!(breaks[1].0, 110);
    }

    #[test]
    fn outside_loop_is_imbalance() {
        let mut manager = JumpManager::new();
        assert!(manager.continue_target().is_err());
        assert!(manager.add_break(JumpLabel(1)).is_err());
        assert!(matches!(
            manager.exit_loop(),
            Err(GenerationError::FixupImbalance { .. })
        ));
    }

    #[test]
    fn construct_lifecycle() {
        let mut manager = JumpManager::new();
        manager.open_construct(ConstructKind::If);
        manager.add_false(JumpLabel(3)).unwrap();
        manager.conditions_emitted().unwrap();
        manager.body_emitted().unwrap();
        assert_eq!(manager.take_false().unwrap().len(), 1);
        manager.fixups_patched().unwrap();
        manager.close_construct().unwrap();
        assert!(manager.is_balanced());
    }

    #[test]
    fn undrained_list_is_imbalance() {
        let mut manager = JumpManager::new();
        manager.open_construct(ConstructKind::If);
        manager.add_false(JumpLabel(3)).unwrap();
        manager.conditions_emitted().unwrap();
        manager.body_emitted().unwrap();

        assert!(matches!(
            manager.fixups_patched(),
            Err(GenerationError::FixupImbalance { .. })
        ));
    }

    #[test]
    fn out_of_order_transition() {
        let mut manager = JumpManager::new();
        manager.open_construct(ConstructKind::For);

        let err = manager.body_emitted().unwrap_err();
        assert_eq!(
            err,
            GenerationError::InvalidConstructState {
                state: "HeaderOpened",
                action: "finish its body",
            }
        );

        manager.conditions_emitted().unwrap();
        assert!(manager.add_false(JumpLabel(0)).is_err());
    }

    #[test]
    fn loop_condition_joins_exit_list() {
        let mut manager = JumpManager::new();
        manager.open_construct(ConstructKind::For);
        manager.add_false(JumpLabel(5)).unwrap();
        manager.enter_loop(12);

        assert_eq!(manager.false_into_loop().unwrap(), 1);
        manager.add_break(JumpLabel(30)).unwrap();

        let exits = manager.exit_loop().unwrap();
        assert_eq!(exits.len(), 2);
        assert!(manager.take_false().unwrap().is_empty());
    }
}
