//! Keyword-based model routing
//!
//! Routes a prompt to a model and assistant persona by scanning an
//! ordered rule table. The first rule with any keyword contained in the
//! lower-cased prompt wins; otherwise a default pair is returned.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

use crate::config::RoutingConfig;

/// A keyword set bound to a model and persona
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingRule {
    pub keywords: Vec<String>,
    pub model: String,
    pub role: String,
    /// Short role summary for the help table
    #[serde(default)]
    pub description: String,
    /// Example prompt for the help table
    #[serde(default)]
    pub example: String,
}

impl RoutingRule {
    pub fn new(keywords: &[&str], model: &str, role: &str) -> Self {
        Self {
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            model: model.to_string(),
            role: role.to_string(),
            description: String::new(),
            example: String::new(),
        }
    }

    pub fn with_help(mut self, description: &str, example: &str) -> Self {
        self.description = description.to_string();
        self.example = example.to_string();
        self
    }

    /// True if any keyword occurs in the already lower-cased prompt
    fn matches(&self, normalized: &str) -> bool {
        self.keywords
            .iter()
            .any(|k| !k.is_empty() && normalized.contains(&k.to_lowercase()))
    }
}

/// Model and persona chosen for one prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingDecision {
    pub model: String,
    pub role: String,
}

impl RoutingDecision {
    pub fn new(model: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            role: role.into(),
        }
    }
}

/// Pure first-match routing over `rules`
pub fn select(prompt: &str, rules: &[RoutingRule], fallback: &RoutingDecision) -> RoutingDecision {
    let normalized = prompt.to_lowercase();

    rules
        .iter()
        .find(|rule| rule.matches(&normalized))
        .map(|rule| RoutingDecision::new(&rule.model, &rule.role))
        .unwrap_or_else(|| fallback.clone())
}

/// Bounded memo of routing decisions keyed by the exact prompt text.
///
/// Prompts that differ only in case or punctuation get separate entries
/// even when they route identically. Oldest entries are evicted first.
struct PromptCache {
    capacity: usize,
    entries: HashMap<String, RoutingDecision>,
    order: VecDeque<String>,
}

impl PromptCache {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    fn get(&self, prompt: &str) -> Option<&RoutingDecision> {
        self.entries.get(prompt)
    }

    fn insert(&mut self, prompt: &str, decision: RoutingDecision) {
        if self.capacity == 0 || self.entries.contains_key(prompt) {
            return;
        }

        while self.entries.len() >= self.capacity {
            match self.order.pop_front() {
                Some(oldest) => {
                    self.entries.remove(&oldest);
                }
                None => break,
            }
        }

        self.order.push_back(prompt.to_string());
        self.entries.insert(prompt.to_string(), decision);
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Router - owns an immutable rule table plus its decision cache.
///
/// A different rule table means a new `Router`, so cached decisions can
/// never outlive the rules they were computed from.
pub struct Router {
    rules: Vec<RoutingRule>,
    fallback: RoutingDecision,
    cache: PromptCache,
}

impl Router {
    pub fn new(rules: Vec<RoutingRule>, fallback: RoutingDecision, cache_capacity: usize) -> Self {
        Self {
            rules,
            fallback,
            cache: PromptCache::new(cache_capacity),
        }
    }

    pub fn from_config(config: &RoutingConfig) -> Self {
        Self::new(
            config.rules.clone(),
            RoutingDecision::new(&config.default_model, &config.default_role),
            config.cache_capacity,
        )
    }

    /// Route a prompt, consulting the cache first
    pub fn route(&mut self, prompt: &str) -> RoutingDecision {
        if let Some(hit) = self.cache.get(prompt) {
            tracing::trace!("Routing cache hit for {:?}", prompt);
            return hit.clone();
        }

        let decision = select(prompt, &self.rules, &self.fallback);
        tracing::debug!("Routed to {} ({} cached)", decision.model, self.cache.len());
        self.cache.insert(prompt, decision.clone());
        decision
    }

    pub fn rules(&self) -> &[RoutingRule] {
        &self.rules
    }

    pub fn fallback(&self) -> &RoutingDecision {
        &self.fallback
    }

    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }
}

/// Why a model was picked, for display after a reply.
///
/// `default_model` is the router's fallback, the only model that can be
/// reached without a keyword match.
pub fn explain_model(model: &str, default_model: &str) -> &'static str {
    match model {
        "gpt-3.5-turbo" => "The 'GPT-3.5-Turbo' model was chosen because it is optimized for generating application code and storytelling.",
        "gpt-4" => "The 'GPT-4' model was chosen because it excels at writing well-structured and grammatically correct text, and creating engaging and creative content for social media.",
        m if m == default_model => "This model was chosen as the general-purpose default because no routing keyword matched the prompt.",
        _ => "This model was selected by the routing rules for this prompt.",
    }
}
