use std::{path::PathBuf, sync::Arc};

use admin_core::{
    Confirmation, ControllerState, DeleteOutcome, EntityForm, EntityListController, PhysicianForm,
    RestGateway, SaveOutcome, SpecialtyForm,
};
use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use reqwest::Client;
use shared::domain::{Physician, PhysicianId, RecordStatus, Resource, Specialty, SpecialtyId};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod routes;
mod terminal;

use config::{load_settings, resource_url, Settings, DEFAULT_CONFIG_PATH};
use routes::Route;
use terminal::{
    render_page_bar, render_physicians, render_specialties, AssumeYes, PromptConfirmation,
    TerminalModals,
};

#[derive(Parser, Debug)]
#[command(name = "clinic-admin", about = "Manage specialties and physicians over the clinic REST API")]
struct Cli {
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    /// Overrides api_base_url from the config file and environment.
    #[arg(long)]
    api_base_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(subcommand)]
    Specialties(SpecialtyCommand),
    #[command(subcommand)]
    Physicians(PhysicianCommand),
    /// Render the view a path routes to.
    Open {
        #[arg(default_value = "")]
        path: String,
    },
}

#[derive(Subcommand, Debug)]
enum SpecialtyCommand {
    List,
    Show {
        id: i64,
    },
    Create {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "ACTIVE")]
        status: RecordStatus,
    },
    Edit {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        status: Option<RecordStatus>,
    },
    Delete {
        id: i64,
        /// Skip the interactive confirmation.
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
enum PhysicianCommand {
    List {
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    Show {
        id: i64,
    },
    Create {
        #[arg(long)]
        license_code: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        specialty_id: i64,
        #[arg(long, default_value = "ACTIVE")]
        status: RecordStatus,
    },
    Edit {
        id: i64,
        #[arg(long)]
        license_code: Option<String>,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        specialty_id: Option<i64>,
        #[arg(long)]
        status: Option<RecordStatus>,
    },
    Delete {
        id: i64,
        #[arg(long)]
        yes: bool,
    },
}

struct App {
    settings: Settings,
    http: Client,
}

impl App {
    fn specialties(
        &self,
        confirmation: Arc<dyn Confirmation>,
    ) -> Result<EntityListController<SpecialtyForm>> {
        Ok(EntityListController::<SpecialtyForm>::new(
            Arc::new(self.specialty_gateway()?),
            Arc::new(TerminalModals),
            confirmation,
        ))
    }

    fn physicians(
        &self,
        confirmation: Arc<dyn Confirmation>,
    ) -> Result<EntityListController<PhysicianForm>> {
        let url = resource_url(&self.settings.api_base_url, &self.settings.physicians_path)?;
        Ok(EntityListController::<PhysicianForm>::new(
            Arc::new(RestGateway::<Physician>::new(self.http.clone(), url)),
            Arc::new(TerminalModals),
            confirmation,
        )
        .with_pagination(self.settings.page_size)
        .with_lookup(Arc::new(self.specialty_gateway()?)))
    }

    fn specialty_gateway(&self) -> Result<RestGateway<Specialty>> {
        let url = resource_url(&self.settings.api_base_url, &self.settings.specialties_path)?;
        Ok(RestGateway::new(self.http.clone(), url))
    }

    async fn run_specialties(&self, command: SpecialtyCommand) -> Result<()> {
        match command {
            SpecialtyCommand::List => {
                let mut controller = self.specialties(Arc::new(PromptConfirmation))?;
                controller.init().await?;
                render_specialties(controller.visible());
            }
            SpecialtyCommand::Show { id } => {
                let mut controller = self.specialties(Arc::new(PromptConfirmation))?;
                let record = controller.fetch(SpecialtyId(id)).await?;
                render_specialties(std::slice::from_ref(&record));
            }
            SpecialtyCommand::Create { name, status } => {
                let mut controller = self.specialties(Arc::new(PromptConfirmation))?;
                controller.init().await?;
                controller.open_create();
                *controller.form_mut().values_mut() = SpecialtyForm { name, status };
                let saved = submit(&mut controller).await?;
                println!("Saved specialty {}.", display_saved_id(&saved));
                render_specialties(controller.visible());
            }
            SpecialtyCommand::Edit { id, name, status } => {
                let mut controller = self.specialties(Arc::new(PromptConfirmation))?;
                controller.init().await?;
                let record = load_for_edit(&mut controller, SpecialtyId(id)).await?;
                controller.open_edit(&record);
                let values = controller.form_mut().values_mut();
                if let Some(name) = name {
                    values.name = name;
                }
                if let Some(status) = status {
                    values.status = status;
                }
                let saved = submit(&mut controller).await?;
                println!("Saved specialty {}.", display_saved_id(&saved));
                render_specialties(controller.visible());
            }
            SpecialtyCommand::Delete { id, yes } => {
                let mut controller = self.specialties(confirmation_for(yes))?;
                let outcome = controller.delete(SpecialtyId(id)).await?;
                report_delete(&controller, outcome, id);
            }
        }
        Ok(())
    }

    async fn run_physicians(&self, command: PhysicianCommand) -> Result<()> {
        match command {
            PhysicianCommand::List { page } => {
                let mut controller = self.physicians(Arc::new(PromptConfirmation))?;
                controller.init().await?;
                show_physician_page(&mut controller, page);
            }
            PhysicianCommand::Show { id } => {
                let mut controller = self.physicians(Arc::new(PromptConfirmation))?;
                controller.refresh_lookup().await?;
                let record = controller.fetch(PhysicianId(id)).await?;
                render_physicians(std::slice::from_ref(&record), controller.lookup());
            }
            PhysicianCommand::Create {
                license_code,
                first_name,
                last_name,
                specialty_id,
                status,
            } => {
                let mut controller = self.physicians(Arc::new(PromptConfirmation))?;
                controller.init().await?;
                controller.open_create();
                *controller.form_mut().values_mut() = PhysicianForm {
                    first_name,
                    last_name,
                    license_code,
                    specialty_id: Some(SpecialtyId(specialty_id)),
                    status,
                };
                let saved = submit(&mut controller).await?;
                println!("Saved physician {}.", display_saved_id(&saved));
                show_physician_page(&mut controller, 1);
            }
            PhysicianCommand::Edit {
                id,
                license_code,
                first_name,
                last_name,
                specialty_id,
                status,
            } => {
                let mut controller = self.physicians(Arc::new(PromptConfirmation))?;
                controller.init().await?;
                let record = load_for_edit(&mut controller, PhysicianId(id)).await?;
                controller.open_edit(&record);
                let values = controller.form_mut().values_mut();
                if let Some(license_code) = license_code {
                    values.license_code = license_code;
                }
                if let Some(first_name) = first_name {
                    values.first_name = first_name;
                }
                if let Some(last_name) = last_name {
                    values.last_name = last_name;
                }
                if let Some(specialty_id) = specialty_id {
                    values.specialty_id = Some(SpecialtyId(specialty_id));
                }
                if let Some(status) = status {
                    values.status = status;
                }
                let saved = submit(&mut controller).await?;
                println!("Saved physician {}.", display_saved_id(&saved));
                show_physician_page(&mut controller, 1);
            }
            PhysicianCommand::Delete { id, yes } => {
                let mut controller = self.physicians(confirmation_for(yes))?;
                let outcome = controller.delete(PhysicianId(id)).await?;
                report_delete(&controller, outcome, id);
            }
        }
        Ok(())
    }

    async fn open(&self, path: &str) -> Result<()> {
        let route = Route::resolve(path);
        info!(path, route = route.path(), "resolved route");
        match route {
            Route::Home => {
                println!("Clinic administration");
                for route in Route::all() {
                    println!("  {:<14} {}", route.path(), route.title());
                }
                Ok(())
            }
            Route::Specialties => self.run_specialties(SpecialtyCommand::List).await,
            Route::Physicians => {
                self.run_physicians(PhysicianCommand::List { page: 1 })
                    .await
            }
        }
    }
}

fn confirmation_for(assume_yes: bool) -> Arc<dyn Confirmation> {
    if assume_yes {
        Arc::new(AssumeYes)
    } else {
        Arc::new(PromptConfirmation)
    }
}

async fn load_for_edit<F: EntityForm>(
    controller: &mut EntityListController<F>,
    id: <F::Record as Resource>::Id,
) -> Result<F::Record> {
    if let Some(record) = controller.find(id) {
        return Ok(record.clone());
    }
    Ok(controller.fetch(id).await?)
}

async fn submit<F: EntityForm>(controller: &mut EntityListController<F>) -> Result<F::Record> {
    let saved = match controller.save().await? {
        SaveOutcome::Saved(record) => record,
        SaveOutcome::Invalid(errors) => {
            for violation in errors.violations() {
                eprintln!("  {} {}", violation.field, violation.rule);
            }
            bail!("the form is invalid; nothing was sent");
        }
        SaveOutcome::FormClosed => bail!("no form is open"),
    };
    if controller.state() == ControllerState::Error {
        if let Some(notice) = controller.notice() {
            eprintln!("warning: saved, but the list could not be refreshed: {}", notice.message());
        }
    }
    Ok(saved)
}

fn show_physician_page(controller: &mut EntityListController<PhysicianForm>, page: usize) {
    if page != 1 && !controller.go_to_page(page) {
        eprintln!("page {page} does not exist; showing page 1");
    }
    render_physicians(controller.visible(), controller.lookup());
    if let Some(window) = controller.page_window() {
        render_page_bar(&window, controller.records().len());
    }
}

fn report_delete<F: EntityForm>(controller: &EntityListController<F>, outcome: DeleteOutcome, id: i64) {
    let entity = F::Record::NAME;
    match outcome {
        DeleteOutcome::Deleted => println!("Deleted {entity} {id}."),
        DeleteOutcome::Declined => println!("Kept {entity} {id}."),
    }
    if controller.state() == ControllerState::Error {
        if let Some(notice) = controller.notice() {
            eprintln!("warning: deleted, but the list could not be refreshed: {}", notice.message());
        }
    }
}

fn display_saved_id<R: Resource>(record: &R) -> String {
    record
        .id()
        .map(|id| id.to_string())
        .unwrap_or_else(|| "(no id returned)".to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings(&cli.config)?;
    if let Some(api_base_url) = cli.api_base_url {
        settings.api_base_url = api_base_url;
    }
    info!(api_base_url = %settings.api_base_url, page_size = settings.page_size.get(), "loaded settings");

    let app = App {
        settings,
        http: Client::new(),
    };

    match cli.command {
        Command::Specialties(command) => app.run_specialties(command).await,
        Command::Physicians(command) => app.run_physicians(command).await,
        Command::Open { path } => app.open(&path).await,
    }
}
