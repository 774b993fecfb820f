use std::io;

use clap::{Parser, Subcommand, ValueEnum};

use atrium::{clients::ClientConfiguration, statuses::StatusKind, templates::TemplateKind};
use atrium_app::repository::{ConfigRepository, RepositoryError};

use crate::config::AppConfig;

mod client;
mod feature;
mod fixture;
mod output;
mod status;
mod template;

#[derive(Debug, Parser)]
#[command(name = "atrium", about = "Atrium tenant configuration CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    pub(crate) config: AppConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Manage clients and the active client
    Client(client::ClientCommand),
    /// Edit status collections of the active client
    Status(status::StatusCommand),
    /// Toggle features of the active client
    Feature(feature::FeatureCommand),
    /// Manage message templates of the active client
    Template(template::TemplateCommand),
    /// Inspect client fixture files offline
    Fixture(fixture::FixtureCommand),
}

impl Cli {
    /// Parse arguments after loading `.env`.
    pub(crate) fn load() -> Result<Self, clap::Error> {
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    pub(crate) async fn run(self) -> Result<(), String> {
        let mut out = io::stdout().lock();

        match self.command {
            Commands::Client(command) => client::run(command, &self.config, &mut out).await,
            Commands::Status(command) => status::run(command, &self.config, &mut out).await,
            Commands::Feature(command) => feature::run(command, &self.config, &mut out).await,
            Commands::Template(command) => template::run(command, &self.config, &mut out).await,
            Commands::Fixture(command) => fixture::run(command, &mut out),
        }
    }
}

/// Build the repository and load the cache and remote clients.
pub(crate) async fn connect(config: &AppConfig) -> ConfigRepository {
    let repository = config.repository();

    repository.initialize().await;

    repository
}

/// Status collection selector.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub(crate) enum KindArg {
    Lead,
    Task,
    Customer,
    Payment,
}

impl From<KindArg> for StatusKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Lead => Self::Lead,
            KindArg::Task => Self::Task,
            KindArg::Customer => Self::Customer,
            KindArg::Payment => Self::Payment,
        }
    }
}

/// Template channel selector.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub(crate) enum TemplateKindArg {
    Whatsapp,
    Email,
    Sms,
}

impl From<TemplateKindArg> for TemplateKind {
    fn from(kind: TemplateKindArg) -> Self {
        match kind {
            TemplateKindArg::Whatsapp => Self::Whatsapp,
            TemplateKindArg::Email => Self::Email,
            TemplateKindArg::Sms => Self::Sms,
        }
    }
}

/// Unwrap a repository result, turning a skipped call into an error.
pub(crate) fn signed_in<T>(result: Result<Option<T>, RepositoryError>) -> Result<T, String> {
    result
        .map_err(|error| error.user_message())?
        .ok_or_else(|| "not signed in: set ATRIUM_ACCESS_TOKEN and ATRIUM_CLIENT_TOKEN".to_string())
}

/// The active client, or an error telling the user to pick one.
pub(crate) fn active(repository: &ConfigRepository) -> Result<ClientConfiguration, String> {
    repository
        .active_client()
        .ok_or_else(|| RepositoryError::NoActiveClient.user_message())
}
