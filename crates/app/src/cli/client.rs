use std::io;

use clap::{Args, Subcommand};

use atrium::clients::{ClientConfiguration, ClientId, ClientUpdate, NewClient};

use crate::{
    cli::{active, connect, output, signed_in},
    config::AppConfig,
};

#[derive(Debug, Args)]
pub(crate) struct ClientCommand {
    #[command(subcommand)]
    command: ClientSubcommand,
}

#[derive(Debug, Subcommand)]
enum ClientSubcommand {
    /// List clients, marking the active one
    List,
    /// Show the active client
    Show,
    /// Make a client active
    Use(ClientIdArgs),
    /// Deselect the active client
    Clear,
    /// Create a client
    Create(CreateClientArgs),
    /// Rename a client
    Update(UpdateClientArgs),
    /// Delete a client
    Delete(ClientIdArgs),
    /// Mark a client active
    Activate(ClientIdArgs),
    /// Mark a client inactive
    Deactivate(ClientIdArgs),
}

#[derive(Debug, Args)]
struct ClientIdArgs {
    /// Client id
    id: String,
}

#[derive(Debug, Args)]
struct CreateClientArgs {
    /// Display name
    #[arg(long)]
    name: String,

    /// Legal company name; defaults to the display name
    #[arg(long)]
    company_name: Option<String>,
}

#[derive(Debug, Args)]
struct UpdateClientArgs {
    /// Client id
    id: String,

    /// New display name
    #[arg(long)]
    name: Option<String>,

    /// New company name
    #[arg(long)]
    company_name: Option<String>,
}

pub(crate) async fn run(
    command: ClientCommand,
    config: &AppConfig,
    out: &mut impl io::Write,
) -> Result<(), String> {
    let repository = connect(config).await;

    match command.command {
        ClientSubcommand::List => {
            let snapshot = repository.snapshot();

            if snapshot.clients.is_empty() {
                return output::emit(out, "no clients");
            }

            output::emit(
                out,
                client_table(&snapshot.clients, snapshot.active_client_id.as_ref()),
            )
        }
        ClientSubcommand::Show => output::emit(out, describe(&active(&repository)?)),
        ClientSubcommand::Use(args) => {
            if !repository.set_active_client(&args.id) {
                return Err(format!("unknown client {}", args.id));
            }

            output::emit(out, format!("active client: {}", args.id))
        }
        ClientSubcommand::Clear => {
            repository.clear_active_client();

            output::emit(out, "active client cleared")
        }
        ClientSubcommand::Create(args) => {
            let client = signed_in(
                repository
                    .create_client(NewClient {
                        name: args.name,
                        company_name: args.company_name,
                        branding: None,
                        settings: None,
                    })
                    .await,
            )?;

            output::emit(out, format!("created client {} ({})", client.name, client.id))
        }
        ClientSubcommand::Update(args) => {
            let update = ClientUpdate {
                name: args.name,
                company_name: args.company_name,
                ..ClientUpdate::default()
            };

            if update.is_empty() {
                return Err("nothing to update".to_string());
            }

            let client = signed_in(
                repository
                    .update_client(&ClientId::new(args.id), update)
                    .await,
            )?;

            output::emit(out, format!("updated client {}", client.id))
        }
        ClientSubcommand::Delete(args) => {
            signed_in(repository.delete_client(&ClientId::new(&*args.id)).await)?;

            output::emit(out, format!("deleted client {}", args.id))
        }
        ClientSubcommand::Activate(args) => {
            signed_in(repository.activate_client(&ClientId::new(&*args.id)).await)?;

            output::emit(out, format!("activated client {}", args.id))
        }
        ClientSubcommand::Deactivate(args) => {
            signed_in(repository.deactivate_client(&ClientId::new(&*args.id)).await)?;

            output::emit(out, format!("deactivated client {}", args.id))
        }
    }
}

fn client_table(clients: &[ClientConfiguration], active: Option<&ClientId>) -> String {
    output::table(
        ["", "Id", "Name", "Company", "Active", "Currency"],
        clients.iter().map(|client| {
            [
                if active == Some(&client.id) { "*" } else { "" }.to_string(),
                client.id.to_string(),
                client.name.clone(),
                client.company_name.clone(),
                output::flag(client.is_active),
                client.settings.currency.clone(),
            ]
        }),
    )
}

pub(crate) fn describe(client: &ClientConfiguration) -> String {
    let rows = [
        ["Id".to_string(), client.id.to_string()],
        ["Name".to_string(), client.name.clone()],
        ["Company".to_string(), client.company_name.clone()],
        ["Active".to_string(), output::flag(client.is_active)],
        ["Primary color".to_string(), client.branding.primary_color.clone()],
        ["Date format".to_string(), client.settings.date_format.clone()],
        ["Time format".to_string(), client.settings.time_format.clone()],
        ["Currency".to_string(), client.settings.currency.clone()],
        ["Timezone".to_string(), client.settings.timezone.clone()],
        ["Lead sources".to_string(), client.lead_sources.len().to_string()],
        ["Custom fields".to_string(), client.custom_fields.len().to_string()],
        ["Templates".to_string(), client.workflow.message_templates.len().to_string()],
    ];

    output::table(["Setting", "Value"], rows)
}
