//! Built-in template seed set.

use crate::templates::{NewTemplate, TemplateKind};

pub(super) struct Seed {
    name: &'static str,
    kind: TemplateKind,
    subject: Option<&'static str>,
    content: &'static str,
    variables: &'static [&'static str],
}

impl Seed {
    pub(super) fn to_new_template(&self) -> NewTemplate {
        NewTemplate {
            name: self.name.to_string(),
            kind: self.kind,
            subject: self.subject.map(str::to_string),
            content: self.content.to_string(),
            variables: self.variables.iter().map(|v| (*v).to_string()).collect(),
        }
    }
}

pub(super) const SEEDS: [Seed; 4] = [
    Seed {
        name: "Welcome",
        kind: TemplateKind::Whatsapp,
        subject: None,
        content: "Hi {name}, thanks for your interest in {company}! We'll be in touch shortly.",
        variables: &["name", "company"],
    },
    Seed {
        name: "Follow Up",
        kind: TemplateKind::Email,
        subject: Some("Following up, {name}"),
        content: "Hello {name},\n\nJust checking in on our last conversation. \
                  Let us know if you have any questions.\n\nBest regards,\n{company}",
        variables: &["name", "company"],
    },
    Seed {
        name: "Payment Reminder",
        kind: TemplateKind::Sms,
        subject: None,
        content: "Hi {name}, a payment of {amount} is due on {due_date}. Thank you, {company}.",
        variables: &["name", "amount", "due_date", "company"],
    },
    Seed {
        name: "Appointment Confirmation",
        kind: TemplateKind::Whatsapp,
        subject: None,
        content: "Hi {name}, your appointment with {company} is confirmed for {date} at {time}.",
        variables: &["name", "company", "date", "time"],
    },
];
