use crate::cli::main_types::{OutputFormat, QueryArgs};
use crate::display::export::{render_csv, render_json};
use crate::display::{InstanceResult, TableDisplay};
use labkey_core::error::{AppError, CliError};
use labkey_core::utils::retry::query_with_relogin;
use labkey_core::{FilterSpec, InstanceRegistry, LabKeyClient};

#[derive(Default)]
pub struct ServersHandler;

impl ServersHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn handle(&self, registry: &InstanceRegistry) -> Result<(), AppError> {
        if registry.is_empty() {
            println!("No servers configured.");
            return Ok(());
        }

        println!("{}", TableDisplay::new().render_servers(registry));
        Ok(())
    }
}

#[derive(Default)]
pub struct QueryHandler;

impl QueryHandler {
    pub fn new() -> Self {
        Self
    }

    pub async fn handle(
        &self,
        args: QueryArgs,
        registry: InstanceRegistry,
    ) -> Result<(), AppError> {
        let filters = build_filters(&args.filter)?;
        let clients = select_clients(registry, args.server)?;

        let password = if args.ask_password && !args.no_login {
            Some(prompt_password()?)
        } else {
            None
        };

        let mut results = Vec::with_capacity(clients.len());
        for mut client in clients {
            if !args.no_login {
                client
                    .login(args.email.as_deref(), password.as_deref())
                    .await?;
                log::info!("Logged in to {}", client.host());
            }

            let table = if args.relogin {
                query_with_relogin(&mut client, &filters).await?
            } else {
                client.query(&filters).await?
            };

            results.push(InstanceResult {
                host: client.host().to_string(),
                table,
            });
        }

        print_results(&results, args.format)
    }
}

fn build_filters(pairs: &[String]) -> Result<FilterSpec, AppError> {
    let mut filters = FilterSpec::new();
    for pair in pairs {
        filters.insert_pair(pair)?;
    }
    Ok(filters)
}

fn select_clients(
    registry: InstanceRegistry,
    server: Option<usize>,
) -> Result<Vec<LabKeyClient>, AppError> {
    let available = registry.len();
    let mut clients = registry.into_clients()?;

    match server {
        None => Ok(clients),
        Some(index) if index < available => Ok(vec![clients.swap_remove(index)]),
        Some(index) => Err(AppError::Cli(CliError::UnknownServer { index, available })),
    }
}

fn prompt_password() -> Result<String, AppError> {
    rpassword::prompt_password("Password: ").map_err(|e| {
        AppError::Cli(CliError::InvalidArguments(format!(
            "Failed to read password: {}",
            e
        )))
    })
}

fn print_results(results: &[InstanceResult], format: OutputFormat) -> Result<(), AppError> {
    match format {
        OutputFormat::Table => {
            let display = TableDisplay::new();
            for result in results {
                println!("{}\n", display.render_result(result));
            }
        }
        OutputFormat::Json => {
            let rendered = render_json(results).map_err(|e| {
                AppError::Cli(CliError::InvalidArguments(format!(
                    "Failed to serialize results: {}",
                    e
                )))
            })?;
            println!("{}", rendered);
        }
        OutputFormat::Csv => print!("{}", render_csv(results)),
    }
    Ok(())
}
