//! Forecast tool: a canned weather sentence for a city.

use serde::Deserialize;
use sundial_types::{Tool, ToolDefinition, ToolError, ToolOutput};

const TOOL_NAME: &str = "get_forecast";

/// Returns a fixed forecast sentence for the requested city.
pub struct ForecastTool;

#[derive(Deserialize)]
struct ForecastInput {
    city: String,
}

impl Tool for ForecastTool {
    fn name(&self) -> &str {
        TOOL_NAME
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: TOOL_NAME.to_string(),
            description: "Get weather forecast for a city.".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "required": ["city"],
                "properties": {
                    "city": {
                        "type": "string",
                        "description": "The name of the city"
                    }
                }
            }),
        }
    }

    fn execute(
        &self,
        input: serde_json::Value,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<ToolOutput, ToolError>> + Send + '_>>
    {
        Box::pin(async move {
            let input: ForecastInput =
                serde_json::from_value(input).map_err(|e| ToolError::InvalidInput {
                    tool: TOOL_NAME.into(),
                    message: e.to_string(),
                })?;

            Ok(ToolOutput::text(format!(
                "The weather in {} will be warm and sunny",
                input.city
            )))
        })
    }
}
