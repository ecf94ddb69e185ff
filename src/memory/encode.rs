//! Rendering a memory into one compact string for the generation oracle

use super::types::{Memory, MemoryComponent};

const ELLIPSIS: &str = "...";
const SEPARATOR: &str = " | ";

/// How a memory is rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodingConfig {
    /// Summaries longer than this many characters keep only their tail
    pub summary_budget: usize,
    /// Components in output order; components not listed are left out
    pub order: Vec<MemoryComponent>,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            summary_budget: 200,
            order: MemoryComponent::ALL.to_vec(),
        }
    }
}

/// Render `memory`, skipping empty components.
///
/// Mappings render as compact JSON with non-ASCII kept literal, strings as
/// `label:[content]`. Parts join with `" | "`.
pub fn encode_memory(memory: &Memory, config: &EncodingConfig) -> String {
    let mut parts = Vec::with_capacity(config.order.len());

    for component in &config.order {
        let part = match component {
            MemoryComponent::EntityMapping => {
                if memory.entity_mapping.is_empty() {
                    continue;
                }
                match serde_json::to_string(&memory.entity_mapping) {
                    Ok(json) => format!("{}:{}", component.label(), json),
                    Err(_) => continue,
                }
            }
            MemoryComponent::DiscourseConnective => {
                let connective = memory.discourse_connective.trim();
                if connective.is_empty() {
                    continue;
                }
                format!("{}:[{}]", component.label(), connective)
            }
            MemoryComponent::ContextSummary => {
                let summary = memory.context_summary.trim();
                if summary.is_empty() {
                    continue;
                }
                format!(
                    "{}:[{}]",
                    component.label(),
                    keep_tail(summary, config.summary_budget)
                )
            }
        };
        parts.push(part);
    }

    parts.join(SEPARATOR)
}

/// The trailing `budget` characters of `text`, marked with an ellipsis when cut.
fn keep_tail(text: &str, budget: usize) -> String {
    let len = text.chars().count();
    if len <= budget {
        return text.to_string();
    }
    let tail: String = text.chars().skip(len - budget).collect();
    format!("{ELLIPSIS}{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(memory: &Memory) -> String {
        encode_memory(memory, &EncodingConfig::default())
    }

    #[test]
    fn empty_memory_encodes_to_empty_string() {
        assert_eq!(encode(&Memory::default()), "");
    }

    #[test]
    fn summary_only_has_no_separator() {
        let m = Memory {
            context_summary: "The council met.".into(),
            ..Memory::default()
        };
        let encoded = encode(&m);
        assert_eq!(encoded, "Context summary:[The council met.]");
        assert!(!encoded.contains(" | "));
    }

    #[test]
    fn all_components_in_fixed_order() {
        let m = Memory {
            entity_mapping: [("Straße".to_string(), "street".to_string())].into(),
            discourse_connective: "however".into(),
            context_summary: "A walk.".into(),
        };
        assert_eq!(
            encode(&m),
            "Entity mappings:{\"Straße\":\"street\"} | Discourse connectives:[however] | Context summary:[A walk.]"
        );
    }

    #[test]
    fn non_ascii_is_not_escaped() {
        let m = Memory {
            entity_mapping: [("東京".to_string(), "Tokyo".to_string())].into(),
            ..Memory::default()
        };
        let encoded = encode(&m);
        assert!(encoded.contains("東京"));
        assert!(!encoded.contains("\\u"));
    }

    #[test]
    fn long_summary_keeps_most_recent_tail() {
        let m = Memory {
            context_summary: format!("{}{}", "a".repeat(10), "b".repeat(200)),
            ..Memory::default()
        };
        let encoded = encode(&m);
        assert_eq!(encoded, format!("Context summary:[...{}]", "b".repeat(200)));
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let config = EncodingConfig {
            summary_budget: 3,
            ..EncodingConfig::default()
        };
        let m = Memory {
            context_summary: "äöüß".into(),
            ..Memory::default()
        };
        assert_eq!(encode_memory(&m, &config), "Context summary:[...öüß]");
    }

    #[test]
    fn custom_order_controls_output() {
        let config = EncodingConfig {
            order: vec![MemoryComponent::ContextSummary, MemoryComponent::DiscourseConnective],
            ..EncodingConfig::default()
        };
        let m = Memory {
            entity_mapping: [("x".to_string(), "y".to_string())].into(),
            discourse_connective: "so".into(),
            context_summary: "s".into(),
        };
        assert_eq!(
            encode_memory(&m, &config),
            "Context summary:[s] | Discourse connectives:[so]"
        );
    }

    #[test]
    fn placeholder_summary_is_encoded() {
        assert_eq!(encode(&Memory::placeholder()), "Context summary:[(none)]");
    }
}
