//! Arithmetic tools: `add` and `multiply`.

use async_trait::async_trait;
use serde_json::{json, Value};

use super::base::{require_f64, ParamType, ParameterSpec, Tool, ToolArgs};
use super::context::ToolContext;

#[derive(Clone, Copy, Debug)]
enum Op {
    Add,
    Multiply,
}

/// A binary operation over two numbers `a` and `b`.
pub struct ArithmeticTool {
    op: Op,
}

impl ArithmeticTool {
    pub fn add() -> Self {
        Self { op: Op::Add }
    }

    pub fn multiply() -> Self {
        Self { op: Op::Multiply }
    }
}

#[async_trait]
impl Tool for ArithmeticTool {
    fn name(&self) -> &str {
        match self.op {
            Op::Add => "add",
            Op::Multiply => "multiply",
        }
    }

    fn description(&self) -> &str {
        match self.op {
            Op::Add => "Add two numbers together and return the sum.",
            Op::Multiply => "Multiply two numbers together and return the product.",
        }
    }

    fn parameters(&self) -> Vec<ParameterSpec> {
        vec![
            ParameterSpec::required("a", ParamType::Number, "The first number"),
            ParameterSpec::required("b", ParamType::Number, "The second number"),
        ]
    }

    async fn execute(&self, args: &ToolArgs, _ctx: &mut ToolContext) -> anyhow::Result<Value> {
        let a = require_f64(args, "a")?;
        let b = require_f64(args, "b")?;
        let result = match self.op {
            Op::Add => a + b,
            Op::Multiply => a * b,
        };
        Ok(json!(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn run(tool: ArithmeticTool, args: Value) -> anyhow::Result<Value> {
        let args = args.as_object().cloned().unwrap();
        tool.execute(&args, &mut ToolContext::default()).await
    }

    #[tokio::test]
    async fn test_add() {
        assert_eq!(run(ArithmeticTool::add(), json!({"a": 2, "b": 3.5})).await.unwrap(), json!(5.5));
    }

    #[tokio::test]
    async fn test_multiply() {
        assert_eq!(
            run(ArithmeticTool::multiply(), json!({"a": 4, "b": 2.5})).await.unwrap(),
            json!(10.0)
        );
    }

    #[tokio::test]
    async fn test_non_numeric_fails() {
        let err = run(ArithmeticTool::add(), json!({"a": "x", "b": 1})).await.unwrap_err();
        assert!(err.to_string().contains("'a'"));
    }

    #[test]
    fn test_names() {
        assert_eq!(ArithmeticTool::add().name(), "add");
        assert_eq!(ArithmeticTool::multiply().name(), "multiply");
    }
}
