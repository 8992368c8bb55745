use serde::{Deserialize, Serialize};
// ============================================================================
// A2A Agent Card and Discovery Types
// ============================================================================

/// Defines optional capabilities supported by an agent.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct AgentCapabilities {
    /// Indicates if the agent supports Server-Sent Events (SSE) for streaming responses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub streaming: Option<bool>,
    /// Indicates if the agent supports sending push notifications for asynchronous task updates.
    #[serde(skip_serializing_if = "Option::is_none", rename = "pushNotifications")]
    pub push_notifications: Option<bool>,
    /// Indicates if the agent provides a history of state transitions for a task.
    #[serde(
        skip_serializing_if = "Option::is_none",
        rename = "stateTransitionHistory"
    )]
    pub state_transition_history: Option<bool>,
}

/// Represents the service provider of an agent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AgentProvider {
    /// The name of the agent provider's organization.
    #[serde(default)]
    pub organization: String,
    /// A URL for the agent provider's website or relevant documentation.
    #[serde(default)]
    pub url: String,
}

/// Represents a distinct capability or function that an agent can perform.
///
/// Every field defaults when absent so that a sloppy card still deserializes
/// and the problem is reported by validation instead of the fetch.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct AgentSkill {
    /// A unique identifier for the agent's skill.
    #[serde(default)]
    pub id: String,
    /// A human-readable name for the skill.
    #[serde(default)]
    pub name: String,
    /// A detailed description of the skill.
    #[serde(default)]
    pub description: String,
    /// A set of keywords describing the skill's capabilities.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub tags: Vec<String>,
    /// Example prompts or scenarios that this skill can handle.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub examples: Vec<String>,
}

/// The AgentCard is a self-describing manifest for an agent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AgentCard {
    /// A human-readable name for the agent.
    #[serde(default)]
    pub name: String,
    /// A human-readable description of the agent.
    #[serde(default)]
    pub description: String,
    /// The agent's own version number.
    #[serde(default)]
    pub version: String,
    /// The version of the A2A protocol this agent supports.
    #[serde(rename = "protocolVersion", default = "default_protocol_version")]
    pub protocol_version: String,
    /// The preferred endpoint URL for interacting with the agent.
    #[serde(default)]
    pub url: String,
    /// A declaration of optional capabilities supported by the agent.
    #[serde(default)]
    pub capabilities: AgentCapabilities,
    /// Default set of supported input MIME types for all skills.
    #[serde(rename = "defaultInputModes", default)]
    pub default_input_modes: Vec<String>,
    /// Default set of supported output MIME types for all skills.
    #[serde(rename = "defaultOutputModes", default)]
    pub default_output_modes: Vec<String>,
    /// The set of skills that the agent can perform.
    #[serde(default)]
    pub skills: Vec<AgentSkill>,
    /// Information about the agent's service provider.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<AgentProvider>,
    /// An optional URL to the agent's documentation.
    #[serde(skip_serializing_if = "Option::is_none", rename = "documentationUrl")]
    pub documentation_url: Option<String>,
    /// An optional URL to an icon for the agent.
    #[serde(skip_serializing_if = "Option::is_none", rename = "iconUrl")]
    pub icon_url: Option<String>,
}

fn default_protocol_version() -> String {
    crate::PROTOCOL_VERSION.to_string()
}

impl AgentCard {
    /// Create a new AgentCard with minimal required fields
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        version: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            version: version.into(),
            protocol_version: default_protocol_version(),
            url: url.into(),
            capabilities: AgentCapabilities::default(),
            default_input_modes: vec!["text/plain".to_string()],
            default_output_modes: vec!["text/plain".to_string()],
            skills: Vec::new(),
            provider: None,
            documentation_url: None,
            icon_url: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Set the agent's URL endpoint
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Enable or disable streaming support
    pub fn with_streaming(mut self, enabled: bool) -> Self {
        self.capabilities.streaming = Some(enabled);
        self
    }

    /// Enable or disable push notification support
    pub fn with_push_notifications(mut self, enabled: bool) -> Self {
        self.capabilities.push_notifications = Some(enabled);
        self
    }

    pub fn with_state_transition_history(mut self, enabled: bool) -> Self {
        self.capabilities.state_transition_history = Some(enabled);
        self
    }

    pub fn add_output_mode(mut self, mode: impl Into<String>) -> Self {
        self.default_output_modes.push(mode.into());
        self
    }

    pub fn add_skill(mut self, skill: AgentSkill) -> Self {
        self.skills.push(skill);
        self
    }

    /// Add a skill configured through a closure
    pub fn add_skill_with<F>(mut self, id: impl Into<String>, name: impl Into<String>, f: F) -> Self
    where
        F: FnOnce(AgentSkill) -> AgentSkill,
    {
        let skill = f(AgentSkill::new(id, name));
        self.skills.push(skill);
        self
    }

    pub fn with_provider(
        mut self,
        organization: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        self.provider = Some(AgentProvider {
            organization: organization.into(),
            url: url.into(),
        });
        self
    }

    pub fn with_documentation_url(mut self, url: impl Into<String>) -> Self {
        self.documentation_url = Some(url.into());
        self
    }
}

impl AgentSkill {
    /// Create a new skill with an id and name
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn add_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn add_example(mut self, example: impl Into<String>) -> Self {
        self.examples.push(example.into());
        self
    }
}
