//! Name-based filtering of result trees.
//!
//! Rules are evaluated in order, first match wins: `+pattern` keeps matching
//! layers, `-pattern` drops them. A rule without a prefix is an include rule.
//! Layers matched by no rule are kept unless the spec contains include rules.
//! Ancestors of surviving layers always survive, so the pruned tree stays
//! connected.

use regex::Regex;
use solink_error::{Result, SolinkError, TraversalErrorKind};

use crate::descriptor::LayerDescriptor;

#[derive(Debug, Clone)]
pub struct FilterRule {
    pub include: bool,
    pub pattern: Regex,
}

impl FilterRule {
    pub fn parse(text: &str) -> Result<Self> {
        let (include, body) = match text.as_bytes().first() {
            Some(b'+') => (true, &text[1..]),
            Some(b'-') => (false, &text[1..]),
            _ => (true, text),
        };
        let pattern = Regex::new(body).map_err(|e| {
            SolinkError::traversal(
                format!("invalid filter rule {text:?}: {e}"),
                TraversalErrorKind::InvalidFilter,
            )
        })?;
        Ok(Self { include, pattern })
    }
}

/// An ordered set of filter rules.
#[derive(Debug, Clone, Default)]
pub struct FilterSpec {
    pub rules: Vec<FilterRule>,
}

impl FilterSpec {
    pub fn parse<S: AsRef<str>>(rules: &[S]) -> Result<Self> {
        let rules = rules
            .iter()
            .map(|rule| FilterRule::parse(rule.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    fn keeps_name(&self, name: &str) -> bool {
        for rule in &self.rules {
            if rule.pattern.is_match(name) {
                return rule.include;
            }
        }
        !self.rules.iter().any(|rule| rule.include)
    }

    /// Prune a result tree. A node survives if its name passes the rules or
    /// any of its descendants survive.
    pub fn apply(&self, layers: Vec<LayerDescriptor>) -> Vec<LayerDescriptor> {
        if self.is_empty() {
            return layers;
        }
        layers
            .into_iter()
            .filter_map(|layer| self.apply_node(layer))
            .collect()
    }

    fn apply_node(&self, mut layer: LayerDescriptor) -> Option<LayerDescriptor> {
        let mut has_children = false;
        if let Some(children) = layer.children_mut() {
            *children = std::mem::take(children)
                .into_iter()
                .filter_map(|child| self.apply_node(child))
                .collect();
            has_children = !children.is_empty();
        }
        if has_children || self.keeps_name(&layer.name) {
            Some(layer)
        } else {
            None
        }
    }
}
