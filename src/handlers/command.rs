//! Ordered command sequences and their execution.

use super::executor::{CommandExecutor, CommandResult, SHELL_TOOL};
use super::node::{ComputeNode, NodeResult, NodeStatus};
use crate::context::ContextStore;
use crate::error::Result;
use serde_json::{Map, Value};
use std::time::Instant;
use tracing::debug;

/// Commands a handler wants run for one node, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandSpec {
    steps: Vec<String>,
}

impl CommandSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(command: impl Into<String>) -> Self {
        Self::new().then(command)
    }

    /// Append a step.
    pub fn then(mut self, command: impl Into<String>) -> Self {
        self.steps.push(command.into());
        self
    }

    pub fn steps(&self) -> &[String] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Run every step in order and return the result of the last one.
///
/// A step reporting `success: false` does not stop the sequence. An executor
/// error does, and is returned as-is. `tool_calls` counts each step the
/// executor actually ran, including those before an error.
pub fn run_sequence(
    executor: &dyn CommandExecutor,
    spec: &CommandSpec,
    tool_calls: &mut u32,
) -> Result<Option<CommandResult>> {
    let mut last = None;

    for step in spec.steps() {
        let result = executor.execute(SHELL_TOOL, step)?;
        *tool_calls += 1;
        if !result.success {
            debug!("step failed, continuing sequence: {}", step);
        }
        last = Some(result);
    }

    Ok(last)
}

/// Publish a finished node: write `output` into the context and build the result.
///
/// The node status mirrors the command's success flag; on failure the
/// executor's error message becomes the node error.
pub(crate) fn complete_node(
    node: &ComputeNode,
    ctx: &mut dyn ContextStore,
    output: Map<String, Value>,
    result: &CommandResult,
    started: Instant,
    tool_calls: u32,
) -> NodeResult {
    ctx.set(node.result_key(), Value::Object(output.clone()));

    let (status, error) = if result.success {
        (NodeStatus::Completed, None)
    } else {
        (
            NodeStatus::Failed,
            Some(
                result
                    .error
                    .clone()
                    .unwrap_or_else(|| "command reported failure".to_string()),
            ),
        )
    };

    NodeResult {
        node_id: node.id.clone(),
        status,
        output: Some(output),
        error,
        duration: started.elapsed(),
        tool_calls_used: tool_calls,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OpsError;
    use std::cell::RefCell;

    struct ScriptedExecutor {
        results: RefCell<Vec<Result<CommandResult>>>,
    }

    impl CommandExecutor for ScriptedExecutor {
        fn execute(&self, _tool: &str, _command: &str) -> Result<CommandResult> {
            self.results.borrow_mut().remove(0)
        }
    }

    #[test]
    fn failed_step_does_not_stop_sequence() {
        let executor = ScriptedExecutor {
            results: RefCell::new(vec![
                Ok(CommandResult::failed("", "no such workspace")),
                Ok(CommandResult::ok("planned")),
            ]),
        };
        let spec = CommandSpec::single("tf workspace select x").then("tf plan");
        let mut calls = 0;

        let last = run_sequence(&executor, &spec, &mut calls).unwrap().unwrap();

        assert_eq!(calls, 2);
        assert!(last.success);
        assert_eq!(last.output, "planned");
    }

    #[test]
    fn executor_error_stops_sequence_and_keeps_count() {
        let executor = ScriptedExecutor {
            results: RefCell::new(vec![
                Ok(CommandResult::ok("")),
                Err(OpsError::Execution("spawn failed".to_string())),
            ]),
        };
        let spec = CommandSpec::single("a").then("b");
        let mut calls = 0;

        let err = run_sequence(&executor, &spec, &mut calls).unwrap_err();

        assert_eq!(calls, 1);
        assert_eq!(err.to_string(), "spawn failed");
    }

    #[test]
    fn empty_spec_runs_nothing() {
        let executor = ScriptedExecutor {
            results: RefCell::new(Vec::new()),
        };
        let mut calls = 0;

        let last = run_sequence(&executor, &CommandSpec::new(), &mut calls).unwrap();

        assert!(last.is_none());
        assert_eq!(calls, 0);
    }
}
