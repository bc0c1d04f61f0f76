/// Random Number Tool
///
/// Exposes the weather-seeded generator as the `get_random_number` tool. The
/// tool takes no arguments and answers with the value as text.
///
/// A missing value and a value of exactly zero are both reported with the
/// `UNAVAILABLE` message instead of a number. Zero is a value the generator
/// can legitimately produce; clients have always seen the message for it.

use std::sync::Arc;

use futures_util::future::BoxFuture;
use serde_json::Value;

use crate::core::server::{MCPTool, ToolHandler, ToolRegistry};
use crate::generator::RandomSource;

pub const TOOL_NAME: &str = "get_random_number";
pub const TOOL_DESCRIPTION: &str = "Get a Random Number between 0 and 1.";

/// Text returned when no usable value is available.
pub const UNAVAILABLE: &str = "Unable to fetch random numbers.";

/// Register the random number tool with the tool registry.
///
/// Called once during server initialization. The handler keeps a handle to
/// `source`, so every call through any transport draws from the same
/// generator.
///
/// # Arguments
/// * `registry` - Mutable reference to the tool registry where the tool will be registered
/// * `source` - Shared producer of random values, usually the process-wide generator
pub fn register(registry: &mut ToolRegistry, source: Arc<dyn RandomSource>) {
    let tool = MCPTool {
        name: TOOL_NAME.to_string(),
        description: TOOL_DESCRIPTION.to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {}
        }),
    };

    // Define the tool handler function
    // Arguments are ignored; the tool has no parameters
    let handler: ToolHandler = Box::new(move |_args: Value| -> BoxFuture<'static, Result<String, String>> {
        // Each call gets its own handle so the future can outlive this closure
        let source = source.clone();
        // The tool always answers with text, so the handler itself never errors
        Box::pin(async move { Ok(get_random_number(source.as_ref()).await) })
    });

    registry.register(tool, handler);
}

/// Draw one value from `source` and render it for the client.
///
/// # Arguments
/// * `source` - Producer to draw the value from
///
/// # Returns
/// The value as text (see [`format_value`]), or [`UNAVAILABLE`] when the
/// source has no value or the value is exactly zero.
pub async fn get_random_number(source: &dyn RandomSource) -> String {
    // Zero and "no value" are both reported as unavailable
    match source.next_f64().await {
        Some(value) if value != 0.0 => {
            tracing::info!(value, "generated random number");
            format_value(value)
        }
        Some(_) => {
            tracing::warn!("generated random number is 0");
            UNAVAILABLE.to_string()
        }
        None => {
            tracing::warn!("no random number available");
            UNAVAILABLE.to_string()
        }
    }
}

/// Render a value as a float literal: shortest round-trip digits, always with
/// a decimal point (`0.42`, `1.0`).
pub fn format_value(value: f64) -> String {
    format!("{:?}", value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Yields queued values in order and counts calls.
    struct QueuedSource {
        values: Mutex<VecDeque<Option<f64>>>,
        calls: AtomicUsize,
    }

    impl QueuedSource {
        fn new(values: Vec<Option<f64>>) -> Arc<Self> {
            Arc::new(Self {
                values: Mutex::new(values.into()),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl RandomSource for QueuedSource {
        async fn next_f64(&self) -> Option<f64> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.values.lock().unwrap().pop_front().flatten()
        }
    }

    struct SlowSource;

    #[async_trait]
    impl RandomSource for SlowSource {
        async fn next_f64(&self) -> Option<f64> {
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            Some(0.5)
        }
    }

    #[tokio::test]
    async fn test_value_is_rendered() {
        let source = QueuedSource::new(vec![Some(0.42)]);
        assert_eq!(get_random_number(source.as_ref()).await, "0.42");
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_zero_returns_sentinel() {
        let source = QueuedSource::new(vec![Some(0.0)]);
        assert_eq!(get_random_number(source.as_ref()).await, UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_negative_zero_returns_sentinel() {
        let source = QueuedSource::new(vec![Some(-0.0)]);
        assert_eq!(get_random_number(source.as_ref()).await, UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_missing_value_returns_sentinel() {
        let source = QueuedSource::new(vec![None]);
        assert_eq!(get_random_number(source.as_ref()).await, UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_one_keeps_decimal_point() {
        let source = QueuedSource::new(vec![Some(1.0)]);
        assert_eq!(get_random_number(source.as_ref()).await, "1.0");
    }

    #[tokio::test]
    async fn test_sequence_of_calls() {
        let source = QueuedSource::new(vec![Some(0.123), Some(0.456), Some(0.789)]);
        let mut results = Vec::new();
        for _ in 0..3 {
            results.push(get_random_number(source.as_ref()).await);
        }
        assert_eq!(results, vec!["0.123", "0.456", "0.789"]);
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_value_then_missing() {
        let source = QueuedSource::new(vec![Some(0.123), None]);
        assert_eq!(get_random_number(source.as_ref()).await, "0.123");
        assert_eq!(get_random_number(source.as_ref()).await, UNAVAILABLE);
    }

    #[test]
    fn test_format_precision() {
        assert_eq!(format_value(0.123456789), "0.123456789");
        assert_eq!(format_value(0.1), "0.1");
        assert_eq!(format_value(0.0001), "0.0001");
        assert_eq!(format_value(0.999999), "0.999999");
        assert_eq!(format_value(1343387.0 / 6700417.0), "0.20049304394039952");
    }

    #[tokio::test]
    async fn test_registered_handler() {
        let mut registry = ToolRegistry::new();
        register(&mut registry, QueuedSource::new(vec![Some(0.42)]));

        assert_eq!(registry.tools.len(), 1);
        assert_eq!(registry.tools[0].name, TOOL_NAME);
        assert_eq!(registry.tools[0].input_schema["properties"], serde_json::json!({}));

        let handler = registry.handlers.get(TOOL_NAME).unwrap();
        assert_eq!(handler(serde_json::json!({})).await, Ok("0.42".to_string()));
    }

    #[tokio::test]
    async fn test_concurrent_calls() {
        let mut registry = ToolRegistry::new();
        register(&mut registry, Arc::new(SlowSource));
        let handler = registry.handlers.get(TOOL_NAME).unwrap();

        let calls = (0..5).map(|_| handler(serde_json::json!({})));
        let results = futures_util::future::join_all(calls).await;

        assert_eq!(results.len(), 5);
        assert!(results.iter().all(|r| r.as_deref() == Ok("0.5")));
    }
}
