use std::{collections::BTreeSet, io};

use clap::{Args, Subcommand};

use atrium::{
    statuses::{NewStatus, Status, StatusCollection, StatusId, StatusKind, StatusPatch},
    workflow::{self, FinalStateIssue, WorkflowReport},
};

use crate::{
    cli::{KindArg, active, connect, output, signed_in},
    config::AppConfig,
};

#[derive(Debug, Args)]
pub(crate) struct StatusCommand {
    #[command(subcommand)]
    command: StatusSubcommand,
}

#[derive(Debug, Subcommand)]
enum StatusSubcommand {
    /// List a status collection in display order
    List(KindArgs),
    /// Add a status
    Add(AddStatusArgs),
    /// Patch a status
    Update(UpdateStatusArgs),
    /// Remove a status
    Remove(StatusIdArgs),
    /// Reorder a collection; unlisted statuses follow the listed ones
    Reorder(ReorderArgs),
    /// Report dangling transitions and terminal-state problems
    Check(KindArgs),
    /// Check whether one status may move to another
    Transition(TransitionArgs),
}

#[derive(Debug, Args)]
struct KindArgs {
    /// Status collection
    #[arg(value_enum)]
    kind: KindArg,
}

#[derive(Debug, Args)]
struct StatusIdArgs {
    /// Status collection
    #[arg(value_enum)]
    kind: KindArg,

    /// Status id
    id: String,
}

#[derive(Debug, Args)]
struct AddStatusArgs {
    /// Status collection
    #[arg(value_enum)]
    kind: KindArg,

    /// Display name
    #[arg(long)]
    name: String,

    /// Display color
    #[arg(long)]
    color: Option<String>,

    /// Start new records in this status
    #[arg(long)]
    default: bool,

    /// Terminal status
    #[arg(long = "final")]
    is_final: bool,

    /// Allowed targets; unrestricted when omitted
    #[arg(long, value_delimiter = ',')]
    transitions: Option<Vec<String>>,
}

#[derive(Debug, Args)]
struct UpdateStatusArgs {
    /// Status collection
    #[arg(value_enum)]
    kind: KindArg,

    /// Status id
    id: String,

    /// New display name
    #[arg(long)]
    name: Option<String>,

    /// New display color
    #[arg(long)]
    color: Option<String>,

    /// New default marker
    #[arg(long)]
    default: Option<bool>,

    /// New terminal marker
    #[arg(long = "final")]
    is_final: Option<bool>,

    /// Replacement allowed targets
    #[arg(long, value_delimiter = ',', conflicts_with = "unrestricted")]
    transitions: Option<Vec<String>>,

    /// Drop the transition restriction
    #[arg(long)]
    unrestricted: bool,
}

#[derive(Debug, Args)]
struct ReorderArgs {
    /// Status collection
    #[arg(value_enum)]
    kind: KindArg,

    /// Status ids in their new order
    #[arg(required = true)]
    ids: Vec<String>,
}

#[derive(Debug, Args)]
struct TransitionArgs {
    /// Status collection
    #[arg(value_enum)]
    kind: KindArg,

    /// Current status id
    from: String,

    /// Target status id
    to: String,
}

pub(crate) async fn run(
    command: StatusCommand,
    config: &AppConfig,
    out: &mut impl io::Write,
) -> Result<(), String> {
    let repository = connect(config).await;

    match command.command {
        StatusSubcommand::List(args) => {
            let client = active(&repository)?;

            output::emit(out, status_table(client.statuses(args.kind.into())))
        }
        StatusSubcommand::Add(args) => {
            let status = NewStatus {
                name: args.name,
                color: args.color,
                is_default: args.default,
                is_final: args.is_final,
                allowed_transitions: args.transitions.map(transition_set),
            };

            let id = signed_in(repository.add_status(args.kind.into(), status).await)?;

            output::emit(out, format!("added status {id}"))
        }
        StatusSubcommand::Update(args) => {
            let allowed_transitions = if args.unrestricted {
                Some(None)
            } else {
                args.transitions.map(|targets| Some(transition_set(targets)))
            };

            let patch = StatusPatch {
                name: args.name,
                color: args.color,
                is_default: args.default,
                is_final: args.is_final,
                allowed_transitions,
                ..StatusPatch::default()
            };

            let status = signed_in(
                repository
                    .update_status(args.kind.into(), &args.id, patch)
                    .await,
            )?;

            output::emit(out, format!("updated status {} ({})", status.id, status.name))
        }
        StatusSubcommand::Remove(args) => {
            let status = signed_in(repository.remove_status(args.kind.into(), &args.id).await)?;

            output::emit(out, format!("removed status {} ({})", status.id, status.name))
        }
        StatusSubcommand::Reorder(args) => {
            let ids: Vec<StatusId> = args.ids.into_iter().map(StatusId::new).collect();

            signed_in(repository.reorder_statuses(args.kind.into(), &ids).await)?;

            output::emit(out, "statuses reordered")
        }
        StatusSubcommand::Check(args) => {
            let report = repository
                .workflow_report(args.kind.into())
                .map_err(|error| error.user_message())?;

            output::emit(out, describe_report(&report))
        }
        StatusSubcommand::Transition(args) => {
            let client = active(&repository)?;
            let kind: StatusKind = args.kind.into();

            let target = workflow::transition(client.statuses(kind), &args.from, &args.to)
                .map_err(|error| error.to_string())?;

            output::emit(out, format!("{} -> {} is allowed", args.from, target.name))
        }
    }
}

fn transition_set(targets: Vec<String>) -> BTreeSet<StatusId> {
    targets
        .into_iter()
        .map(|target| target.trim().to_string())
        .filter(|target| !target.is_empty())
        .map(StatusId::new)
        .collect()
}

fn join_ids<'a>(ids: impl IntoIterator<Item = &'a StatusId>) -> String {
    ids.into_iter()
        .map(StatusId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

fn transitions_cell(status: &Status) -> String {
    status
        .allowed_transitions
        .as_ref()
        .map_or_else(|| "any".to_string(), join_ids)
}

pub(crate) fn status_table(collection: &StatusCollection) -> String {
    output::table(
        ["Order", "Id", "Name", "Color", "Default", "Final", "Transitions"],
        collection.list().iter().map(|status| {
            [
                status.order.to_string(),
                status.id.to_string(),
                status.name.clone(),
                status.color.clone(),
                output::flag(status.is_default),
                output::flag(status.is_final),
                transitions_cell(status),
            ]
        }),
    )
}

pub(crate) fn describe_report(report: &WorkflowReport) -> String {
    if report.is_clean() {
        return "no problems found".to_string();
    }

    let dangling = report.dangling.iter().map(|reference| {
        [
            "dangling transition".to_string(),
            format!("{} -> {}", reference.status_id, reference.missing_target),
        ]
    });

    let finals = report.final_issues.iter().map(|issue| match issue {
        FinalStateIssue::MissingFinal => ["no final status".to_string(), String::new()],
        FinalStateIssue::DefaultIsFinal(id) => ["default is final".to_string(), id.to_string()],
        FinalStateIssue::FinalHasTransitions(id) => {
            ["final status has exits".to_string(), id.to_string()]
        }
    });

    let defaults = (!report.conflicting_defaults.is_empty()).then(|| {
        [
            "conflicting defaults".to_string(),
            join_ids(&report.conflicting_defaults),
        ]
    });

    output::table(["Problem", "Statuses"], dangling.chain(finals).chain(defaults))
}
