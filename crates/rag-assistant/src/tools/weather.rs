//! Weather Tool
//!
//! Wraps the weather client as an agent tool. Every lookup outcome,
//! error kinds included, comes back as a displayable string: the result
//! is the tool's output either way and is never stored.

use std::sync::Arc;

use agent_core::{Result as CoreResult, Tool};
use async_trait::async_trait;

use crate::weather::WeatherClient;

/// Tool for current-weather queries by city name
pub struct WeatherTool {
    client: Arc<WeatherClient>,
}

impl WeatherTool {
    pub fn new(client: Arc<WeatherClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for WeatherTool {
    fn name(&self) -> &str {
        "Consultar_Clima"
    }

    fn description(&self) -> &str {
        "Usa esta herramienta para consultar el clima actual de cualquier ciudad del mundo. \
         Entrada: nombre de la ciudad (ej: 'Madrid', 'Bogotá', 'Ciudad de México')"
    }

    async fn call(&self, input: &str) -> CoreResult<String> {
        if input.trim().is_empty() {
            return Ok("Indica el nombre de una ciudad, por ejemplo 'Madrid'.".into());
        }

        Ok(match self.client.current(input).await {
            Ok(report) => report,
            Err(e) => e.to_string(),
        })
    }
}
