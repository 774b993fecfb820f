use std::{io, path::PathBuf};

use clap::{Args, Subcommand};
use jiff::Timestamp;

use atrium::{
    clients::ClientConfiguration,
    features::FeatureCatalog,
    fixtures,
    ids::SequentialIdGenerator,
    statuses::StatusKind,
    workflow,
};

use crate::cli::{client, feature, output, status};

const KINDS: [StatusKind; 4] = [
    StatusKind::Lead,
    StatusKind::Task,
    StatusKind::Customer,
    StatusKind::Payment,
];

#[derive(Debug, Args)]
pub(crate) struct FixtureCommand {
    #[command(subcommand)]
    command: FixtureSubcommand,
}

#[derive(Debug, Subcommand)]
enum FixtureSubcommand {
    /// Resolve a fixture and print its configuration
    Show(FixturePathArgs),
    /// Fail when any status collection of a fixture has workflow problems
    Check(FixturePathArgs),
}

#[derive(Debug, Args)]
struct FixturePathArgs {
    /// Path to a client fixture YAML file
    path: PathBuf,
}

pub(crate) fn run(command: FixtureCommand, out: &mut impl io::Write) -> Result<(), String> {
    match command.command {
        FixtureSubcommand::Show(args) => {
            let client = resolve(&args)?;

            output::emit(out, client::describe(&client))?;
            output::emit(out, feature::feature_table(&client.features))?;

            for kind in KINDS {
                output::emit(out, format!("{kind:?} statuses"))?;
                output::emit(out, status::status_table(client.statuses(kind)))?;
                output::emit(out, status::describe_report(&workflow::report(client.statuses(kind))))?;
            }

            Ok(())
        }
        FixtureSubcommand::Check(args) => {
            let client = resolve(&args)?;
            let failing = failing_kinds(&client);

            if failing.is_empty() {
                return output::emit(out, format!("{}: no problems found", args.path.display()));
            }

            for kind in &failing {
                output::emit(out, format!("{kind:?} statuses"))?;
                output::emit(out, status::describe_report(&workflow::report(client.statuses(*kind))))?;
            }

            Err(format!("{} collections have workflow problems", failing.len()))
        }
    }
}

fn resolve(args: &FixturePathArgs) -> Result<ClientConfiguration, String> {
    let fixture = fixtures::load(&args.path)
        .map_err(|error| format!("failed to load {}: {error}", args.path.display()))?;

    Ok(fixture.resolve(
        &SequentialIdGenerator::new("fixture"),
        Timestamp::now(),
        &FeatureCatalog::standard(),
    ))
}

fn failing_kinds(client: &ClientConfiguration) -> Vec<StatusKind> {
    KINDS
        .into_iter()
        .filter(|kind| !workflow::report(client.statuses(*kind)).is_clean())
        .collect()
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn fixture(name: &str) -> FixturePathArgs {
        FixturePathArgs {
            path: PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/../../fixtures/clients"))
                .join(format!("{name}.yml")),
        }
    }

    #[test]
    fn broken_fixture_fails_only_its_lead_pipeline() -> TestResult {
        let client = resolve(&fixture("broken"))?;

        assert_eq!(failing_kinds(&client), vec![StatusKind::Lead]);

        Ok(())
    }

    #[test]
    fn check_reports_broken_fixtures() {
        let mut out = Vec::new();

        let result = run(
            FixtureCommand {
                command: FixtureSubcommand::Check(fixture("broken")),
            },
            &mut out,
        );

        assert!(result.is_err(), "expected a failing check");
        assert!(
            String::from_utf8_lossy(&out).contains("ghost"),
            "expected the dangling target in the output"
        );
    }

    #[test]
    fn missing_fixture_is_reported() {
        let result = resolve(&fixture("does-not-exist"));

        assert!(result.is_err(), "expected a load error, got {result:?}");
    }
}
