//! Clause fragment builders.
//!
//! Each clause accumulates raw text plus its own argument subset; rendering
//! happens only inside a statement's `generate`, against a context built for
//! that call. Statement builders concatenate the argument subsets in the
//! clause order of the final SQL, so argument position always matches
//! placeholder position no matter how the caller interleaved the calls.

use crate::error::OrmResult;
use crate::value::Value;

use super::context::QueryContext;
use super::ValueArg;

/// FROM targets (also the target list of UPDATE/DELETE).
#[derive(Default)]
pub(crate) struct FromClause {
    classes: Vec<String>,
}

impl FromClause {
    pub fn push(&mut self, spec: &str) {
        self.classes.push(spec.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Resolve every target into the context and render them comma-joined.
    pub fn targets(&self, ctx: &mut QueryContext<'_>) -> OrmResult<String> {
        let mut rendered = Vec::with_capacity(self.classes.len());
        for spec in &self.classes {
            rendered.push(ctx.add_class(spec)?);
        }
        Ok(rendered.join(", "))
    }
}

pub(crate) enum JoinPart {
    Join {
        keyword: &'static str,
        class: String,
    },
    Cond {
        prefix: &'static str,
        text: String,
    },
    Using(String),
}

#[derive(Default)]
pub(crate) struct JoinClause {
    parts: Vec<JoinPart>,
    args: Vec<Value>,
}

impl JoinClause {
    pub fn push_join(&mut self, keyword: &'static str, class: &str) {
        self.parts.push(JoinPart::Join {
            keyword,
            class: class.to_string(),
        });
    }

    pub fn push_cond(&mut self, prefix: &'static str, cond: &str, args: Vec<Value>) {
        self.parts.push(JoinPart::Cond {
            prefix,
            text: cond.to_string(),
        });
        self.args.extend(args);
    }

    pub fn push_using(&mut self, columns: &str) {
        self.parts.push(JoinPart::Using(columns.to_string()));
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// Render the joined tables and conditions; joined classes register into
    /// the context as they render.
    pub fn generate(&self, ctx: &mut QueryContext<'_>) -> OrmResult<String> {
        let mut out = String::new();
        for part in &self.parts {
            match part {
                JoinPart::Join { keyword, class } => {
                    out.push(' ');
                    out.push_str(keyword);
                    out.push(' ');
                    out.push_str(&ctx.add_class(class)?);
                }
                JoinPart::Cond { prefix, text } => {
                    out.push_str(prefix);
                    out.push_str(&ctx.resolve_attrs(text));
                }
                JoinPart::Using(columns) => {
                    out.push_str(" USING (");
                    out.push_str(&ctx.resolve_attrs(columns));
                    out.push(')');
                }
            }
        }
        Ok(out)
    }
}

#[derive(Default)]
pub(crate) struct WhereClause {
    text: String,
    args: Vec<Value>,
}

impl WhereClause {
    /// Append a condition. `connector` is the raw prefix (`""`, `" AND "`,
    /// `" OR "`); a connector on the very first condition is stripped at
    /// render time.
    pub fn push(&mut self, connector: &str, cond: &str, args: Vec<Value>) {
        self.text.push_str(connector);
        self.text.push_str(cond);
        self.args.extend(args);
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }

    pub fn generate(&self, ctx: &QueryContext<'_>) -> Option<String> {
        if self.text.is_empty() {
            return None;
        }
        let text = self
            .text
            .strip_prefix(" AND ")
            .or_else(|| self.text.strip_prefix(" OR "))
            .unwrap_or(&self.text);
        Some(format!(" WHERE {}", ctx.resolve_attrs(text)))
    }
}

#[derive(Default)]
pub(crate) struct OrderByClause {
    text: String,
}

impl OrderByClause {
    pub fn push(&mut self, attribute: &str, direction: &str) {
        self.text.push_str(attribute);
        self.text.push(' ');
        self.text.push_str(direction);
        self.text.push_str(", ");
    }

    pub fn generate(&self, ctx: &QueryContext<'_>) -> Option<String> {
        if self.text.is_empty() {
            return None;
        }
        let text = self.text.strip_suffix(", ").unwrap_or(&self.text);
        Some(format!(" ORDER BY {}", ctx.resolve_attrs(text)))
    }
}

#[derive(Default)]
pub(crate) struct LimitClause {
    rendered: Option<String>,
}

impl LimitClause {
    /// Later calls overwrite earlier ones.
    pub fn set(&mut self, count: i64, start: i64) {
        self.rendered = Some(if start != 0 {
            format!(" LIMIT {start}, {count}")
        } else {
            format!(" LIMIT {count}")
        });
    }

    pub fn generate(&self) -> Option<String> {
        self.rendered.clone()
    }
}

#[derive(Default)]
pub(crate) struct SetClause {
    text: String,
    args: Vec<Value>,
}

impl SetClause {
    pub fn push(&mut self, attribute: &str, rule: &str, value: Value) {
        self.text.push_str(attribute);
        self.text.push_str(" = ");
        self.text.push_str(rule);
        self.text.push_str(", ");
        self.args.push(value);
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }

    pub fn generate(&self, ctx: &QueryContext<'_>) -> Option<String> {
        if self.text.is_empty() {
            return None;
        }
        let text = self.text.strip_suffix(", ").unwrap_or(&self.text);
        Some(format!(" SET {}", ctx.resolve_attrs(text)))
    }
}

#[derive(Default)]
pub(crate) struct ValuesClause {
    groups: Vec<String>,
    args: Vec<Value>,
}

impl ValuesClause {
    /// One call renders one parenthesized group; plain items bind behind a
    /// `?`, expression items override the placeholder while still binding
    /// their value.
    pub fn push_group(&mut self, items: Vec<ValueArg>) {
        let mut cells = Vec::with_capacity(items.len());
        for item in items {
            match item {
                ValueArg::Plain(value) => {
                    cells.push("?".to_string());
                    self.args.push(value);
                }
                ValueArg::Expr(rule, value) => {
                    cells.push(rule);
                    self.args.push(value);
                }
            }
        }
        self.groups.push(format!("({})", cells.join(", ")));
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }

    pub fn generate(&self) -> String {
        format!(" VALUES {}", self.groups.join(", "))
    }
}
