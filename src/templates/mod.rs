//! Message Templates
//!
//! Per-client message templates with `{variable}` placeholders, the built-in
//! seed set, and placeholder substitution for live previews.

use jiff::Timestamp;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::{
    clients::ClientId,
    ids::{IdGenerator, TypedId},
    timestamps,
};

mod seeds;

/// Template identifier.
pub type TemplateId = TypedId<MessageTemplate>;

/// Delivery channel of a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    /// WhatsApp message.
    Whatsapp,

    /// Email; the only kind with a subject.
    Email,

    /// SMS text.
    Sms,
}

/// A message template owned by one client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageTemplate {
    /// Template identifier.
    pub id: TemplateId,

    /// Owning client.
    #[serde(alias = "clientId")]
    pub client_id: ClientId,

    /// Display name.
    pub name: String,

    /// Delivery channel.
    #[serde(rename = "type")]
    pub kind: TemplateKind,

    /// Email subject.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,

    /// Body with `{variable}` placeholders.
    pub content: String,

    /// Declared variables.
    #[serde(default)]
    pub variables: Vec<String>,

    /// Inactive templates are kept but not offered.
    #[serde(default = "active_by_default", alias = "isActive")]
    pub is_active: bool,

    /// Creation time, when known.
    #[serde(default, with = "timestamps::lenient")]
    pub created_at: Option<Timestamp>,

    /// Last update time, when known.
    #[serde(default, with = "timestamps::lenient")]
    pub updated_at: Option<Timestamp>,
}

const fn active_by_default() -> bool {
    true
}

/// Data for a template that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTemplate {
    /// Display name.
    pub name: String,

    /// Delivery channel.
    pub kind: TemplateKind,

    /// Email subject; dropped for other kinds.
    pub subject: Option<String>,

    /// Body.
    pub content: String,

    /// Declared variables; derived from the placeholders when empty.
    pub variables: Vec<String>,
}

impl MessageTemplate {
    /// Build a template owned by `client`.
    #[must_use]
    pub fn new(client: ClientId, template: NewTemplate, ids: &dyn IdGenerator, now: Timestamp) -> Self {
        let subject = match template.kind {
            TemplateKind::Email => template.subject,
            TemplateKind::Whatsapp | TemplateKind::Sms => None,
        };

        let variables = if template.variables.is_empty() {
            subject
                .iter()
                .chain(std::iter::once(&template.content))
                .flat_map(|text| placeholders(text))
                .fold(Vec::new(), |mut names, name| {
                    if !names.contains(&name) {
                        names.push(name);
                    }

                    names
                })
        } else {
            template.variables
        };

        Self {
            id: TemplateId::generate(ids),
            client_id: client,
            name: template.name,
            kind: template.kind,
            subject,
            content: template.content,
            variables,
            is_active: true,
            created_at: Some(now),
            updated_at: Some(now),
        }
    }

    /// Placeholders used in the subject or content that are not declared.
    #[must_use]
    pub fn undeclared_variables(&self) -> SmallVec<[String; 4]> {
        let mut undeclared = SmallVec::new();

        for name in self
            .subject
            .iter()
            .chain(std::iter::once(&self.content))
            .flat_map(|text| placeholders(text))
        {
            if !self.variables.contains(&name) && !undeclared.contains(&name) {
                undeclared.push(name);
            }
        }

        undeclared
    }
}

/// Fresh copies of the built-in templates for `client`.
///
/// Every call mints new ids, so importing twice yields two independent copies.
#[must_use]
pub fn import_defaults(client: &ClientId, ids: &dyn IdGenerator, now: Timestamp) -> Vec<MessageTemplate> {
    seeds::SEEDS
        .iter()
        .map(|seed| MessageTemplate::new(client.clone(), seed.to_new_template(), ids, now))
        .collect()
}

/// A piece of template text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment<'a> {
    Text(&'a str),
    Braced(&'a str),
}

/// Split `text` into literal runs and `{...}` groups without nested braces.
fn scan<'a>(text: &'a str, mut on_segment: impl FnMut(Segment<'a>)) {
    let mut rest = text;

    while let Some((before, after_open)) = rest.split_once('{') {
        on_segment(Segment::Text(before));

        let end = after_open.find(['{', '}']);

        match end.map(|at| after_open.split_at(at)) {
            Some((inner, tail)) if tail.starts_with('}') => {
                on_segment(Segment::Braced(inner));
                rest = tail.strip_prefix('}').unwrap_or(tail);
            }
            _ => {
                on_segment(Segment::Text("{"));
                rest = after_open;
            }
        }
    }

    on_segment(Segment::Text(rest));
}

fn is_identifier(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Distinct `{identifier}` names in first-seen order, where an identifier is
/// ASCII letters, digits and underscores.
#[must_use]
pub fn placeholders(text: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();

    scan(text, |segment| {
        if let Segment::Braced(name) = segment
            && is_identifier(name)
            && !names.iter().any(|existing| existing == name)
        {
            names.push(name.to_string());
        }
    });

    names
}

/// Substitute `{key}` for every key in `values`, leaving every other brace
/// group verbatim. Keys are matched literally and substituted values are not
/// scanned again. Never fails, so it is safe for previews with partial values.
#[must_use]
pub fn render_text(text: &str, values: &FxHashMap<String, String>) -> String {
    let mut rendered = String::with_capacity(text.len());

    scan(text, |segment| match segment {
        Segment::Text(literal) => rendered.push_str(literal),
        Segment::Braced(key) => match values.get(key) {
            Some(value) => rendered.push_str(value),
            None => {
                rendered.push('{');
                rendered.push_str(key);
                rendered.push('}');
            }
        },
    });

    rendered
}

/// Render a template's content.
#[must_use]
pub fn render(template: &MessageTemplate, values: &FxHashMap<String, String>) -> String {
    render_text(&template.content, values)
}

/// Render a template's subject, if it has one.
#[must_use]
pub fn render_subject(template: &MessageTemplate, values: &FxHashMap<String, String>) -> Option<String> {
    template
        .subject
        .as_deref()
        .map(|subject| render_text(subject, values))
}
