use std::collections::BTreeMap;

use crate::crd::routing_config::{NodeSelector, SelectorOperator};

/// Returns true when the node labels satisfy the selector. An absent or
/// empty selector matches every node. `match_labels` and every
/// `match_expressions` entry must all hold.
pub fn matches(selector: Option<&NodeSelector>, labels: &BTreeMap<String, String>) -> bool {
    let Some(selector) = selector else {
        return true;
    };
    if let Some(match_labels) = &selector.match_labels {
        for (key, value) in match_labels.iter() {
            if labels.get(key) != Some(value) {
                return false;
            }
        }
    }
    if let Some(expressions) = &selector.match_expressions {
        for expression in expressions.iter() {
            let values = expression.values.as_deref().unwrap_or_default();
            let matched = match expression.operator {
                SelectorOperator::In => labels
                    .get(&expression.key)
                    .map(|v| values.contains(v))
                    .unwrap_or(false),
                // an absent key satisfies NotIn
                SelectorOperator::NotIn => labels
                    .get(&expression.key)
                    .map(|v| !values.contains(v))
                    .unwrap_or(true),
                SelectorOperator::Exists => labels.contains_key(&expression.key),
                SelectorOperator::DoesNotExist => !labels.contains_key(&expression.key),
            };
            if !matched {
                return false;
            }
        }
    }
    true
}
