//! Weather lookup backed by a fixed table of simulated readings.

use async_trait::async_trait;
use serde_json::{json, Value};

use super::base::{optional_str, require_str, ParamType, ParameterSpec, Tool, ToolArgs};
use super::context::ToolContext;
use crate::error::ToolError;

struct Reading {
    city: &'static str,
    temp_c: i64,
    condition: &'static str,
    humidity: u32,
}

const READINGS: &[Reading] = &[
    Reading { city: "new york", temp_c: 22, condition: "Partly cloudy", humidity: 65 },
    Reading { city: "london", temp_c: 15, condition: "Rainy", humidity: 80 },
    Reading { city: "tokyo", temp_c: 28, condition: "Sunny", humidity: 55 },
    Reading { city: "paris", temp_c: 18, condition: "Overcast", humidity: 70 },
];

/// `get_weather(city, unit?)`.
///
/// An unknown city is not a failure: the tool answers with an `error` field
/// and the list of cities it knows, so the model can recover.
pub struct WeatherTool;

#[async_trait]
impl Tool for WeatherTool {
    fn name(&self) -> &str {
        "get_weather"
    }

    fn description(&self) -> &str {
        "Retrieves current weather information for a specified city. Use this when users \
         ask about weather conditions, temperature, or forecasts."
    }

    fn parameters(&self) -> Vec<ParameterSpec> {
        vec![
            ParameterSpec::required(
                "city",
                ParamType::String,
                "The city name (e.g., 'New York', 'London', 'Tokyo')",
            ),
            ParameterSpec::optional("unit", ParamType::String, "Temperature unit preference")
                .with_enum(&["celsius", "fahrenheit"]),
        ]
    }

    async fn execute(&self, args: &ToolArgs, _ctx: &mut ToolContext) -> anyhow::Result<Value> {
        let city = require_str(args, "city")?;
        let unit = optional_str(args, "unit").unwrap_or("celsius");
        if unit != "celsius" && unit != "fahrenheit" {
            return Err(ToolError::InvalidArgument {
                name: "unit".into(),
                reason: format!("expected 'celsius' or 'fahrenheit', got '{unit}'"),
            }
            .into());
        }

        let key = city.trim().to_lowercase();
        let Some(reading) = READINGS.iter().find(|r| r.city == key) else {
            return Ok(json!({
                "error": format!("Weather data not available for {city}"),
                "available_cities": READINGS.iter().map(|r| r.city).collect::<Vec<_>>(),
            }));
        };

        let temperature = if unit == "fahrenheit" {
            let f = reading.temp_c as f64 * 9.0 / 5.0 + 32.0;
            json!((f * 10.0).round() / 10.0)
        } else {
            json!(reading.temp_c)
        };

        Ok(json!({
            "city": city,
            "temperature": temperature,
            "unit": unit,
            "condition": reading.condition,
            "humidity": reading.humidity,
        }))
    }
}
