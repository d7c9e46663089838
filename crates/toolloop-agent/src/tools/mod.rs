//! Tool modules for the toolloop agent.

pub mod base;
pub mod calculator;
pub mod context;
pub mod preferences;
pub mod registry;
pub mod weather;

use std::sync::Arc;

pub use base::{
    json_schema, optional_str, require_f64, require_str, ParamType, ParameterSpec, Tool, ToolArgs,
};
pub use context::ToolContext;
pub use registry::{ToolOutput, ToolRegistry};

use calculator::ArithmeticTool;
use preferences::{GetPreferencesTool, ListPreferencesTool, UpdatePreferenceTool};
use weather::WeatherTool;

/// Every built-in tool, in registration order.
pub fn builtin_tools() -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(WeatherTool),
        Arc::new(ArithmeticTool::add()),
        Arc::new(ArithmeticTool::multiply()),
        Arc::new(GetPreferencesTool),
        Arc::new(UpdatePreferenceTool),
        Arc::new(ListPreferencesTool),
    ]
}

/// The weather assistant's tool set.
pub fn weather_tools() -> Vec<Arc<dyn Tool>> {
    vec![Arc::new(WeatherTool)]
}
