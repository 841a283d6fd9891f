use serde::Serialize;

/// Uniform result envelope returned by every lookup and conversion tool.
///
/// Serializes with a `status` tag of `success`, `not_found`, or `error`,
/// with the success payload flattened next to the tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ToolReply<T> {
    Success {
        #[serde(flatten)]
        payload: T,
    },
    NotFound {
        message: String,
        available: Vec<String>,
    },
    Error {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        valid_options: Option<Vec<String>>,
    },
}

impl<T> ToolReply<T> {
    pub fn success(payload: T) -> Self {
        ToolReply::Success { payload }
    }

    pub fn not_found(message: impl Into<String>, available: Vec<String>) -> Self {
        ToolReply::NotFound {
            message: message.into(),
            available,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        ToolReply::Error {
            message: message.into(),
            valid_options: None,
        }
    }

    pub fn error_with_options(message: impl Into<String>, valid_options: Vec<String>) -> Self {
        ToolReply::Error {
            message: message.into(),
            valid_options: Some(valid_options),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ToolReply::Success { .. })
    }

    /// Returns the success payload, if any.
    pub fn payload(&self) -> Option<&T> {
        match self {
            ToolReply::Success { payload } => Some(payload),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize)]
    struct Sample {
        value: u32,
    }

    #[test]
    fn success_flattens_payload_next_to_status() {
        let reply = ToolReply::success(Sample { value: 7 });
        let encoded = serde_json::to_value(&reply).unwrap();
        assert_eq!(encoded, json!({"status": "success", "value": 7}));
    }

    #[test]
    fn not_found_carries_message_and_available_keys() {
        let reply: ToolReply<Sample> =
            ToolReply::not_found("missing", vec!["a".into(), "b".into()]);
        let encoded = serde_json::to_value(&reply).unwrap();
        assert_eq!(
            encoded,
            json!({"status": "not_found", "message": "missing", "available": ["a", "b"]})
        );
    }

    #[test]
    fn error_omits_options_when_absent() {
        let reply: ToolReply<Sample> = ToolReply::error("bad input");
        let encoded = serde_json::to_value(&reply).unwrap();
        assert_eq!(encoded, json!({"status": "error", "message": "bad input"}));

        let reply: ToolReply<Sample> =
            ToolReply::error_with_options("bad input", vec!["x".into()]);
        let encoded = serde_json::to_value(&reply).unwrap();
        assert_eq!(
            encoded,
            json!({"status": "error", "message": "bad input", "valid_options": ["x"]})
        );
    }
}
