use std::io;

use clap::{Args, Subcommand};
use rustc_hash::FxHashMap;

use atrium::templates::{self, MessageTemplate, NewTemplate};

use crate::{
    cli::{TemplateKindArg, active, connect, output, signed_in},
    config::AppConfig,
};

#[derive(Debug, Args)]
pub(crate) struct TemplateCommand {
    #[command(subcommand)]
    command: TemplateSubcommand,
}

#[derive(Debug, Subcommand)]
enum TemplateSubcommand {
    /// List templates of the active client
    List,
    /// Append the built-in templates
    ImportDefaults,
    /// Add a template
    Add(AddTemplateArgs),
    /// Remove a template
    Remove(TemplateIdArgs),
    /// Render a template with sample values
    Preview(PreviewArgs),
}

#[derive(Debug, Args)]
struct TemplateIdArgs {
    /// Template id
    id: String,
}

#[derive(Debug, Args)]
struct AddTemplateArgs {
    /// Display name
    #[arg(long)]
    name: String,

    /// Delivery channel
    #[arg(long, value_enum)]
    kind: TemplateKindArg,

    /// Email subject
    #[arg(long)]
    subject: Option<String>,

    /// Body with `{variable}` placeholders
    #[arg(long)]
    content: String,

    /// Declared variables; taken from the placeholders when omitted
    #[arg(long = "variable")]
    variables: Vec<String>,
}

#[derive(Debug, Args)]
struct PreviewArgs {
    /// Template id
    id: String,

    /// Sample value as `name=value`; repeatable
    #[arg(long = "var", value_parser = parse_value)]
    values: Vec<(String, String)>,
}

pub(crate) async fn run(
    command: TemplateCommand,
    config: &AppConfig,
    out: &mut impl io::Write,
) -> Result<(), String> {
    let repository = connect(config).await;

    match command.command {
        TemplateSubcommand::List => {
            let client = active(&repository)?;

            if client.templates().is_empty() {
                return output::emit(out, "no templates");
            }

            output::emit(out, template_table(client.templates()))
        }
        TemplateSubcommand::ImportDefaults => {
            let ids = signed_in(repository.import_default_templates().await)?;

            output::emit(out, format!("imported {} templates", ids.len()))
        }
        TemplateSubcommand::Add(args) => {
            let id = signed_in(
                repository
                    .add_template(NewTemplate {
                        name: args.name,
                        kind: args.kind.into(),
                        subject: args.subject,
                        content: args.content,
                        variables: args.variables,
                    })
                    .await,
            )?;

            output::emit(out, format!("added template {id}"))
        }
        TemplateSubcommand::Remove(args) => {
            let template = signed_in(repository.remove_template(&args.id).await)?;

            output::emit(out, format!("removed template {}", template.name))
        }
        TemplateSubcommand::Preview(args) => {
            let client = active(&repository)?;

            let template = client
                .templates()
                .iter()
                .find(|template| template.id.as_str() == args.id)
                .ok_or_else(|| format!("unknown template {}", args.id))?;

            let values: FxHashMap<String, String> = args.values.into_iter().collect();

            output::emit(out, preview(template, &values))
        }
    }
}

fn parse_value(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(name, value)| (name.trim().to_string(), value.to_string()))
        .filter(|(name, _)| !name.is_empty())
        .ok_or_else(|| format!("expected name=value, got {raw}"))
}

fn template_table(templates: &[MessageTemplate]) -> String {
    output::table(
        ["Id", "Name", "Kind", "Active", "Variables"],
        templates.iter().map(|template| {
            [
                template.id.to_string(),
                template.name.clone(),
                format!("{:?}", template.kind).to_lowercase(),
                output::flag(template.is_active),
                template.variables.join(", "),
            ]
        }),
    )
}

fn preview(template: &MessageTemplate, values: &FxHashMap<String, String>) -> String {
    let body = templates::render(template, values);

    match templates::render_subject(template, values) {
        Some(subject) => format!("Subject: {subject}\n\n{body}"),
        None => body,
    }
}
