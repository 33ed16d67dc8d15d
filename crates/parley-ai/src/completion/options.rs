//! Per-request completion options.

/// Sampling and mode options for one completion request.
///
/// `model` falls back to the client's default when `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionOptions {
    pub model: Option<String>,
    pub temperature: f64,
    pub top_p: f64,
    pub max_tokens: Option<u32>,
    pub stream: bool,
    /// Function definitions passed through to the provider verbatim.
    pub functions: Option<Vec<serde_json::Value>>,
    /// `"auto"`, `"none"` or `{"name": ...}`, passed through verbatim.
    pub function_call: Option<serde_json::Value>,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            model: None,
            temperature: 0.6,
            top_p: 0.7,
            max_tokens: None,
            stream: false,
            functions: None,
            function_call: None,
        }
    }
}

impl CompletionOptions {
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_top_p(mut self, top_p: f64) -> Self {
        self.top_p = top_p;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    pub fn with_functions(
        mut self,
        functions: Vec<serde_json::Value>,
        function_call: Option<serde_json::Value>,
    ) -> Self {
        self.functions = Some(functions);
        self.function_call = function_call;
        self
    }
}
