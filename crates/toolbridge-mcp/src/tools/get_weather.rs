//! Tool: get_weather: canned weather reply for a city.

use serde::Deserialize;
use serde_json::{json, Value};

use crate::types::{ToolCallResult, ToolDefinition, ToolError};

use super::Tool;

#[derive(Debug, Deserialize)]
struct WeatherParams {
    city: String,
}

pub struct GetWeatherTool;

#[async_trait::async_trait]
impl Tool for GetWeatherTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "get_weather".to_string(),
            description: Some("Get current weather".to_string()),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "city": { "type": "string" }
                },
                "required": ["city"]
            }),
        }
    }

    async fn call(&self, args: Value) -> Result<ToolCallResult, ToolError> {
        let params: WeatherParams =
            serde_json::from_value(args).map_err(|e| ToolError::Failed(e.to_string()))?;

        Ok(ToolCallResult::text(toolbridge::weather_report(&params.city)))
    }
}
