use crate::connection::VariableContext;
use crate::error::TransformError;
use ahash::AHashMap;
use serde_json::Value;

/// User-authored transform functions addressed by id. Each receives the full
/// source payload and every connection variable.
pub trait TransformRegistry: Send + Sync {
    fn invoke(
        &self,
        function_id: &str,
        source: &Value,
        variables: &VariableContext,
    ) -> Result<Value, TransformError>;
}

type TransformFn = Box<dyn Fn(&Value, &VariableContext) -> Result<Value, String> + Send + Sync>;

/// A registry of plain Rust closures.
#[derive(Default)]
pub struct FnTransforms {
    functions: AHashMap<String, TransformFn>,
}

impl FnTransforms {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<F>(mut self, function_id: &str, function: F) -> Self
    where
        F: Fn(&Value, &VariableContext) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.functions
            .insert(function_id.to_string(), Box::new(function));
        self
    }
}

impl TransformRegistry for FnTransforms {
    fn invoke(
        &self,
        function_id: &str,
        source: &Value,
        variables: &VariableContext,
    ) -> Result<Value, TransformError> {
        let function = self
            .functions
            .get(function_id)
            .ok_or_else(|| TransformError::NotFound(function_id.to_string()))?;
        function(source, variables).map_err(|message| TransformError::Failed {
            function_id: function_id.to_string(),
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_invoke_and_failures() {
        let transforms = FnTransforms::new()
            .with("upper", |source, _| {
                source["name"]
                    .as_str()
                    .map(|s| json!(s.to_uppercase()))
                    .ok_or_else(|| "name missing".to_string())
            });
        let vars = VariableContext::new();

        assert_eq!(transforms.invoke("upper", &json!({"name": "ann"}), &vars), Ok(json!("ANN")));
        assert_eq!(
            transforms.invoke("upper", &json!({}), &vars),
            Err(TransformError::Failed { function_id: "upper".into(), message: "name missing".into() })
        );
        assert_eq!(
            transforms.invoke("lower", &json!({}), &vars),
            Err(TransformError::NotFound("lower".into()))
        );
    }
}
