//! Ordered keyword classification.
//!
//! Rules are evaluated in fixed priority order and the first rule with a
//! keyword contained in the lowercased message wins. Anything unmatched gets
//! the capability menu, which echoes the message back.

use crate::error::AgentError;

/// Turns a user message into the agent's reply.
///
/// The keyword classifier is the only implementation today; an inference
/// backend can replace it without the gateway noticing.
pub trait Responder: Send + Sync + 'static {
    fn classify(&self, message: &str) -> Result<String, AgentError>;
}

/// Which rule matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Weather,
    Payment,
    Image,
    Greeting,
    Help,
    Fallback,
}

/// One `(keywords, template)` pair.
#[derive(Debug, Clone)]
pub struct Rule {
    pub intent: Intent,
    pub keywords: &'static [&'static str],
    pub template: &'static str,
}

impl Rule {
    fn matches(&self, lowered: &str) -> bool {
        self.keywords.iter().any(|k| lowered.contains(k))
    }
}

pub const WEATHER_REPLY: &str = "🌤️ **Weather in New Delhi:**
• Temperature: 28°C (82°F)
• Conditions: Partly Cloudy ☁️
• Humidity: 65%
• Wind: 12 km/h (7 mph)
• Feels like: 30°C
• UV Index: 6 (Moderate)

📊 **Today's Forecast:**
• Morning: 24°C, Clear
• Afternoon: 30°C, Partly Cloudy
• Evening: 26°C, Light Breeze

💡 *This is a sample weather report. For real-time data, please check your local weather service.*";

pub const PAYMENT_REPLY: &str = "💳 **Payment System Status**
✅ Payment processed successfully!
💰 Your balance: 100,000,000,000,000,000 WAT

🛠️ **What I can help you with:**
• Weather information
• Payment processing
• General assistance

💡 *Your payment has been verified and the service is now unlocked!*";

pub const IMAGE_REPLY: &str = "🎨 **Image Creation Service**
I can help you create images! Here are some options:

🖼️ **Available Styles:**
• Realistic photography
• Digital art
• Abstract designs
• Logo creation
• Infographics

💡 *Just describe what you'd like me to create, and I'll generate it for you!*";

pub const GREETING_REPLY: &str = "👋 Hello! I'm your Smart Agent powered by ASI!

🤖 **What I can do:**
• Provide weather information
• Process payments
• Create images
• Answer questions
• Help with various tasks

💡 *Just ask me anything - I'm here to help make your day better!*";

pub const HELP_REPLY: &str = "🆘 **How can I help you?**

🌤️ **Weather Information** - Ask about current conditions and forecasts
💳 **Payment Processing** - Handle payments and transactions
🎨 **Image Creation** - Generate images and artwork
💬 **General Chat** - Have conversations and get assistance

**Example queries:**
• \"What's the weather like?\"
• \"Check my balance\"
• \"Create an image of a sunset\"
• \"Help me with a task\"

💡 *I'm here to assist you with whatever you need!*";

/// Default rule table, highest priority first.
pub const DEFAULT_RULES: &[Rule] = &[
    Rule {
        intent: Intent::Weather,
        keywords: &["weather", "temperature", "forecast", "climate"],
        template: WEATHER_REPLY,
    },
    Rule {
        intent: Intent::Payment,
        keywords: &["payment", "pay", "balance", "transaction"],
        template: PAYMENT_REPLY,
    },
    Rule {
        intent: Intent::Image,
        keywords: &["create", "generate", "image", "picture", "art"],
        template: IMAGE_REPLY,
    },
    Rule {
        intent: Intent::Greeting,
        keywords: &["hello", "hi", "hey", "greetings"],
        template: GREETING_REPLY,
    },
    Rule {
        intent: Intent::Help,
        keywords: &["help", "assist", "support"],
        template: HELP_REPLY,
    },
];

/// Stateless first-match keyword classifier.
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    rules: Vec<Rule>,
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_RULES.to_vec())
    }
}

impl KeywordClassifier {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// First rule whose keyword appears in the lowercased message.
    fn matched(&self, message: &str) -> Option<&Rule> {
        let lowered = message.to_lowercase();
        self.rules.iter().find(|r| r.matches(&lowered))
    }

    pub fn reply(&self, message: &str) -> String {
        match self.matched(message) {
            Some(rule) => rule.template.to_string(),
            None => fallback_reply(message),
        }
    }
}

impl Responder for KeywordClassifier {
    fn classify(&self, message: &str) -> Result<String, AgentError> {
        Ok(self.reply(message))
    }
}

fn fallback_reply(message: &str) -> String {
    format!(
        "🤖 **Smart Agent Response**

I received your message: *\"{message}\"*

🛠️ **Here's what I can help you with:**
🌤️ **Weather Information** - Get current conditions and forecasts
💳 **Payment Processing** - Handle payments and transactions
🎨 **Image Creation** - Generate images and artwork
💬 **General Chat** - Have conversations and get assistance

💡 *Just ask me anything - I'm here to help make your day better!*"
    )
}
