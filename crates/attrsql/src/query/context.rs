//! Per-statement resolution state.
//!
//! A context is built fresh on every `generate` call: FROM/JOIN targets
//! register their classes here, flattening every mapped attribute into one
//! lookup table, and later clauses resolve attribute references against it.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::OrmResult;
use crate::mapping::{AttributeMapper, EntityMapping};

/// One registered statement target.
pub(crate) struct ResolvedClass {
    /// Entity name as given.
    pub name: String,
    /// Prefix used in qualified attribute references: the alias when one was
    /// given, else the entity name.
    pub label: String,
    /// Prefix used on the SQL side: the alias when one was given, else the
    /// table.
    pub qualifier: String,
    pub mapping: Arc<EntityMapping>,
}

pub(crate) struct QueryContext<'a> {
    mapper: &'a dyn AttributeMapper,
    classes: Vec<ResolvedClass>,
    /// Flattened attribute lookup: bare `attr` keys (last registered class
    /// wins) and qualified `label.attr` keys.
    fields: HashMap<String, String>,
}

impl<'a> QueryContext<'a> {
    pub fn new(mapper: &'a dyn AttributeMapper) -> Self {
        Self {
            mapper,
            classes: Vec::new(),
            fields: HashMap::new(),
        }
    }

    /// Register a statement target given as `"Class"` or `"Class AS alias"`
    /// and return its rendered SQL form (`table` or `table AS alias`).
    ///
    /// Registering the same target twice is a no-op apart from the returned
    /// rendering.
    pub fn add_class(&mut self, spec: &str) -> OrmResult<String> {
        let (name, alias) = match spec.split_once(" AS ") {
            Some((name, alias)) => (name.trim(), Some(alias.trim())),
            None => (spec.trim(), None),
        };

        if let Some(existing) = self
            .classes
            .iter()
            .find(|c| c.name == name && alias.map_or(c.label == c.name, |a| c.label == a))
        {
            return Ok(render_target(existing, alias.is_some()));
        }

        let mapping = self.mapper.resolve(name)?;
        let label = alias.unwrap_or(name).to_string();
        let qualifier = alias.unwrap_or(mapping.table()).to_string();

        for (attr, col) in mapping.columns() {
            self.fields.insert(attr.clone(), col.clone());
            self.fields
                .insert(format!("{label}.{attr}"), format!("{qualifier}.{col}"));
        }

        let class = ResolvedClass {
            name: name.to_string(),
            label,
            qualifier,
            mapping,
        };
        let rendered = render_target(&class, alias.is_some());
        self.classes.push(class);
        Ok(rendered)
    }

    pub fn classes(&self) -> &[ResolvedClass] {
        &self.classes
    }

    /// Exact lookup of one attribute (bare or qualified).
    pub fn field_for(&self, attribute: &str) -> Option<&str> {
        self.fields.get(attribute).map(String::as_str)
    }

    /// Substitute attribute references in a free-form SQL fragment.
    ///
    /// The fragment is tokenized: single-quoted literals pass through
    /// untouched, identifier tokens (optionally dot-qualified, with the
    /// qualified form tried first) are replaced when they name a mapped
    /// attribute, and everything else is copied verbatim.
    pub fn resolve_attrs(&self, text: &str) -> String {
        let bytes = text.as_bytes();
        let mut out = String::with_capacity(text.len());
        let mut i = 0;
        while i < bytes.len() {
            let b = bytes[i];
            if b == b'\'' {
                let start = i;
                i += 1;
                while i < bytes.len() && bytes[i] != b'\'' {
                    i += 1;
                }
                if i < bytes.len() {
                    i += 1;
                }
                out.push_str(&text[start..i]);
            } else if b.is_ascii_alphabetic() || b == b'_' {
                let start = i;
                while i < bytes.len() && is_ident(bytes[i]) {
                    i += 1;
                }
                let ident = &text[start..i];
                let qualified_start = i + 1 < bytes.len()
                    && bytes[i] == b'.'
                    && (bytes[i + 1].is_ascii_alphabetic() || bytes[i + 1] == b'_');
                if qualified_start {
                    let mut j = i + 1;
                    while j < bytes.len() && is_ident(bytes[j]) {
                        j += 1;
                    }
                    if let Some(col) = self.fields.get(&text[start..j]) {
                        out.push_str(col);
                    } else {
                        let second = &text[i + 1..j];
                        out.push_str(self.field_for(ident).unwrap_or(ident));
                        out.push('.');
                        out.push_str(self.field_for(second).unwrap_or(second));
                    }
                    i = j;
                } else {
                    out.push_str(self.field_for(ident).unwrap_or(ident));
                }
            } else {
                let ch = text[i..].chars().next().unwrap_or('\0');
                out.push(ch);
                i += ch.len_utf8();
            }
        }
        out
    }

    /// Expand `*` into the full aliased column list of every registered
    /// class. With a single class the aliases are bare attribute names; with
    /// several they are qualified so result columns stay unambiguous.
    pub fn expand_star(&self) -> String {
        let mut items = Vec::new();
        if self.classes.len() == 1 {
            let class = &self.classes[0];
            for (attr, col) in class.mapping.columns() {
                items.push(format!("{col} AS \"{attr}\""));
            }
        } else {
            for class in &self.classes {
                for (attr, col) in class.mapping.columns() {
                    items.push(format!(
                        "{}.{col} AS \"{}.{attr}\"",
                        class.qualifier, class.label
                    ));
                }
            }
        }
        items.join(", ")
    }
}

fn is_ident(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn render_target(class: &ResolvedClass, aliased: bool) -> String {
    if aliased {
        format!("{} AS {}", class.mapping.table(), class.qualifier)
    } else {
        class.mapping.table().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::fixtures::StaticMapper;

    #[test]
    fn substitution_is_token_aware() {
        let mapper = StaticMapper::new();
        let mut ctx = QueryContext::new(&mapper);
        ctx.add_class("Order").unwrap();

        // "total" inside a literal and inside a longer identifier must not
        // be rewritten.
        assert_eq!(
            ctx.resolve_attrs("total > ? AND name = 'total' AND subtotal = 1"),
            "order_total > ? AND name = 'total' AND subtotal = 1"
        );
    }

    #[test]
    fn qualified_references_win_over_bare_ones() {
        let mapper = StaticMapper::new();
        let mut ctx = QueryContext::new(&mapper);
        ctx.add_class("Order AS o").unwrap();
        ctx.add_class("Customer AS c").unwrap();

        assert_eq!(
            ctx.resolve_attrs("o.customerId = c.id"),
            "o.order_customer_id = c.customer_id"
        );
    }

    #[test]
    fn registering_a_class_twice_is_a_no_op() {
        let mapper = StaticMapper::new();
        let mut ctx = QueryContext::new(&mapper);
        assert_eq!(ctx.add_class("Order").unwrap(), "order");
        assert_eq!(ctx.add_class("Order").unwrap(), "order");
        assert_eq!(ctx.classes().len(), 1);
    }
}
