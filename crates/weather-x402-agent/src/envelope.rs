use serde::{Deserialize, Serialize};

/// Reply text used whenever the agent could not produce a real answer.
pub const APOLOGY: &str = "Sorry, I encountered an error processing your message.";

/// Wire body of `POST /submit`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatEnvelope {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    /// Echoed back unchanged so the caller can pair reply and request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    /// Who is asking; `anonymous` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
}

impl ChatEnvelope {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            user_address: None,
            conversation_id: None,
            correlation_id: None,
            sender: None,
        }
    }
}

/// Wire body of the agent's answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentReply {
    pub response: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
}

impl AgentReply {
    pub fn ok(response: String, correlation_id: Option<String>) -> Self {
        Self {
            response,
            success: true,
            error: None,
            correlation_id,
        }
    }

    pub fn failure(error: String, correlation_id: Option<String>) -> Self {
        Self {
            response: APOLOGY.to_string(),
            success: false,
            error: Some(error),
            correlation_id,
        }
    }
}

/// A message as the actor sees it: who sent it, what it says, what kind it is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentEnvelope {
    pub sender: String,
    pub message: String,
    pub message_type: MessageType,
    pub user_address: Option<String>,
    pub conversation_id: Option<String>,
    pub correlation_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Text,
}

impl From<ChatEnvelope> for AgentEnvelope {
    fn from(env: ChatEnvelope) -> Self {
        Self {
            sender: env.sender.unwrap_or_else(|| "anonymous".to_string()),
            message: env.message,
            message_type: MessageType::Text,
            user_address: env.user_address,
            conversation_id: env.conversation_id,
            correlation_id: env.correlation_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_envelope_parses() {
        let env: ChatEnvelope = serde_json::from_str(r#"{"message":"hi"}"#).unwrap();
        assert_eq!(env, ChatEnvelope::new("hi"));

        let actor_env = AgentEnvelope::from(env);
        assert_eq!(actor_env.sender, "anonymous");
        assert_eq!(actor_env.message_type, MessageType::Text);
    }

    #[test]
    fn failure_reply_shape() {
        let reply = AgentReply::failure("boom".to_string(), Some("c-1".to_string()));
        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["response"], APOLOGY);
        assert_eq!(json["error"], "boom");
        assert_eq!(json["correlation_id"], "c-1");
    }
}
