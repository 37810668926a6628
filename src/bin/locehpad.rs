//! LocEHPAD terminal client

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use locehpad::{
    client::{
        pages::{self, CartPage, CategoriesPage, FilterPage, InventoryPage, LocationsPage, RequestsPage, UsersPage},
        ApiClient, AuthState, ClientError, FileTokenStore, Session,
    },
    models::{
        dates::parse_timestamp,
        enums::{RequestStatus, RequestType},
        localisation::CreateLocalisation,
        materiel::{CreateMateriel, MaterielFilter},
        request::RequestDraft,
        user::CreateUser,
    },
};

#[derive(Debug, Parser)]
#[command(name = "locehpad", version)]
#[command(about = "Medical equipment loan tracking for nursing homes")]
struct Cli {
    /// API base URL
    #[arg(long, env = "LOCEHPAD_API_URL", default_value = "http://localhost:8000", global = true)]
    base_url: String,

    /// File holding the bearer token between runs
    #[arg(long, env = "LOCEHPAD_TOKEN_FILE", default_value = ".locehpad_token", global = true)]
    token_file: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Log in and keep the token
    Login {
        #[arg(long)]
        username: String,
        /// Read from stdin when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Forget the stored token
    Logout,
    /// Show the current session
    Whoami,
    /// Equipment registry
    #[command(subcommand)]
    Materiels(MaterielCommands),
    /// Facility, room and resident locations
    #[command(subcommand)]
    Localisations(LocalisationCommands),
    /// Equipment categories
    #[command(subcommand)]
    Types(TypeCommands),
    /// User accounts (administrators)
    #[command(subcommand)]
    Users(UserCommands),
    /// Request drafts awaiting submission
    #[command(subcommand)]
    Cart(CartCommands),
    /// Service requests
    #[command(subcommand)]
    Requests(RequestCommands),
    /// Create a request immediately, bypassing the cart (administrators)
    Direct(DraftArgs),
}

#[derive(Debug, Subcommand)]
enum MaterielCommands {
    /// List equipment, optionally filtered
    List(FilterArgs),
    Add(MaterielArgs),
    Update {
        id: i32,
        #[command(flatten)]
        fields: MaterielArgs,
    },
    Delete { id: i32 },
}

#[derive(Debug, Args)]
struct FilterArgs {
    /// Category, reference, resident or sector
    #[arg(long)]
    search: Option<String>,
    #[arg(long = "type")]
    material_type_id: Option<i32>,
    /// Delivered on or after (YYYY-MM-DD)
    #[arg(long)]
    from: Option<NaiveDate>,
    /// Delivered on or before (YYYY-MM-DD)
    #[arg(long)]
    to: Option<NaiveDate>,
    /// Returned on or after (YYYY-MM-DD)
    #[arg(long)]
    from_reprise: Option<NaiveDate>,
    /// Returned on or before (YYYY-MM-DD)
    #[arg(long)]
    to_reprise: Option<NaiveDate>,
}

impl From<FilterArgs> for MaterielFilter {
    fn from(args: FilterArgs) -> Self {
        MaterielFilter {
            search_query: args.search,
            material_type_id: args.material_type_id,
            start_date: args.from,
            end_date: args.to,
            start_date_reprise: args.from_reprise,
            end_date_reprise: args.to_reprise,
        }
    }
}

#[derive(Debug, Args)]
struct MaterielArgs {
    #[arg(long = "type")]
    material_type_id: Option<i32>,
    #[arg(long)]
    reference: Option<String>,
    #[arg(long)]
    localisation: Option<i32>,
    /// Delivery date (YYYY-MM-DD or RFC 3339)
    #[arg(long)]
    livraison: Option<String>,
    /// Return date (YYYY-MM-DD or RFC 3339)
    #[arg(long)]
    reprise: Option<String>,
    /// Owner (administrators only)
    #[arg(long)]
    owner: Option<i32>,
}

impl MaterielArgs {
    fn into_input(self) -> anyhow::Result<CreateMateriel> {
        let date = |value: Option<String>| -> anyhow::Result<_> {
            match value {
                Some(v) => parse_timestamp(&v)
                    .map(Some)
                    .with_context(|| format!("Invalid date: {}", v)),
                None => Ok(None),
            }
        };
        Ok(CreateMateriel {
            material_type_id: self.material_type_id,
            reference_interne: self.reference,
            localisation_id: self.localisation,
            date_livraison: date(self.livraison)?,
            date_reprise: date(self.reprise)?,
            owner_id: self.owner,
        })
    }
}

#[derive(Debug, Subcommand)]
enum LocalisationCommands {
    List {
        #[arg(long)]
        search: Option<String>,
    },
    Add(LocalisationArgs),
    Update {
        id: i32,
        #[command(flatten)]
        fields: LocalisationArgs,
    },
    Delete { id: i32 },
}

#[derive(Debug, Args)]
struct LocalisationArgs {
    #[arg(long)]
    etablissement: String,
    #[arg(long)]
    secteur: String,
    #[arg(long)]
    chambre: String,
    #[arg(long)]
    resident: String,
    /// Owner (administrators only)
    #[arg(long)]
    owner: Option<i32>,
}

impl From<LocalisationArgs> for CreateLocalisation {
    fn from(args: LocalisationArgs) -> Self {
        CreateLocalisation {
            nom_etablissement: args.etablissement,
            secteur: args.secteur,
            numero_chambre: args.chambre,
            nom_complet_resident: args.resident,
            owner_id: args.owner,
        }
    }
}

#[derive(Debug, Subcommand)]
enum TypeCommands {
    List,
    Add { name: String },
    Rename { id: i32, name: String },
    Delete { id: i32 },
}

#[derive(Debug, Subcommand)]
enum UserCommands {
    List,
    Add {
        username: String,
        #[arg(long)]
        admin: bool,
        /// Read from stdin when omitted
        #[arg(long)]
        password: Option<String>,
    },
    Delete { id: i32 },
}

#[derive(Debug, Subcommand)]
enum CartCommands {
    Show,
    Add(DraftArgs),
    Remove { item_id: i32 },
    Submit,
}

#[derive(Debug, Args)]
struct DraftArgs {
    materiel_id: i32,
    /// LIVRAISON, REPRISE or DEPANNAGE
    request_type: RequestType,
    #[arg(long)]
    description: Option<String>,
}

impl From<DraftArgs> for RequestDraft {
    fn from(args: DraftArgs) -> Self {
        RequestDraft {
            materiel_id: args.materiel_id,
            request_type: args.request_type,
            description: args.description.filter(|d| !d.trim().is_empty()),
        }
    }
}

#[derive(Debug, Subcommand)]
enum RequestCommands {
    List,
    /// Set a status (administrators)
    Status { id: i32, status: RequestStatus },
    /// Delete a request (administrators)
    Delete {
        id: i32,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "locehpad=warn".into());
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let session = Arc::new(Session::restore(FileTokenStore::new(&cli.token_file)));
    let client = ApiClient::new(&cli.base_url, session)?;

    match run(&client, cli.command).await {
        Err(e) if matches!(e.downcast_ref::<ClientError>(), Some(ClientError::Unauthorized)) => {
            bail!("Session expirée ou absente, veuillez vous connecter (locehpad login)")
        }
        other => other,
    }
}

async fn run(client: &ApiClient, command: Commands) -> anyhow::Result<()> {
    let caps = client.session().capabilities();

    match command {
        Commands::Login { username, password } => {
            let password = match password {
                Some(p) => p,
                None => read_line("Mot de passe : ")?,
            };
            match client.login(&username, &password).await? {
                AuthState::LoggedIn { username, is_admin } => {
                    println!("Connecté en tant que {}{}", username, if is_admin { " (admin)" } else { "" });
                }
                AuthState::LoggedOut => bail!("Login failed"),
            }
        }

        Commands::Logout => {
            client.logout()?;
            println!("Déconnecté");
        }

        Commands::Whoami => match client.session().state() {
            AuthState::LoggedIn { username, is_admin } => {
                println!("{}{}", username, if is_admin { " (admin)" } else { "" })
            }
            AuthState::LoggedOut => println!("Non connecté"),
        },

        Commands::Materiels(cmd) => match cmd {
            MaterielCommands::List(args) => {
                let filter = MaterielFilter::from(args).normalized();
                if filter.is_empty() {
                    print!("{}", InventoryPage::open(client).await?.table());
                } else {
                    let mut page = FilterPage::new(client);
                    page.apply(filter).await?;
                    print!("{}", page.table());
                }
            }
            MaterielCommands::Add(fields) => {
                let mut input = fields.into_input()?;
                if !caps.choose_owner {
                    input.owner_id = None;
                }
                let mut page = InventoryPage::open(client).await?;
                let created = page.create(&input).await?;
                println!("Matériel {} ajouté", created.id);
                print!("{}", page.table());
            }
            MaterielCommands::Update { id, fields } => {
                let mut input = fields.into_input()?;
                if !caps.choose_owner {
                    input.owner_id = None;
                }
                let mut page = InventoryPage::open(client).await?;
                page.update(id, &input).await?;
                print!("{}", page.table());
            }
            MaterielCommands::Delete { id } => {
                let mut page = InventoryPage::open(client).await?;
                page.delete(id).await?;
                print!("{}", page.table());
            }
        },

        Commands::Localisations(cmd) => match cmd {
            LocalisationCommands::List { search } => {
                print!("{}", LocationsPage::open(client, search).await?.table());
            }
            LocalisationCommands::Add(fields) => {
                let mut input = CreateLocalisation::from(fields);
                if !caps.choose_owner {
                    input.owner_id = None;
                }
                let mut page = LocationsPage::open(client, None).await?;
                page.create(&input).await?;
                print!("{}", page.table());
            }
            LocalisationCommands::Update { id, fields } => {
                let mut input = CreateLocalisation::from(fields);
                if !caps.choose_owner {
                    input.owner_id = None;
                }
                let mut page = LocationsPage::open(client, None).await?;
                page.update(id, &input).await?;
                print!("{}", page.table());
            }
            LocalisationCommands::Delete { id } => {
                let mut page = LocationsPage::open(client, None).await?;
                page.delete(id).await?;
                print!("{}", page.table());
                print!("{}", page.inventory.table());
            }
        },

        Commands::Types(cmd) => {
            let mut page = CategoriesPage::open(client).await?;
            match cmd {
                TypeCommands::List => {}
                TypeCommands::Add { name } => {
                    require(caps.manage_material_types)?;
                    page.create(&name).await?;
                }
                TypeCommands::Rename { id, name } => {
                    require(caps.manage_material_types)?;
                    page.rename(id, &name).await?;
                }
                TypeCommands::Delete { id } => {
                    require(caps.manage_material_types)?;
                    page.delete(id).await?;
                }
            }
            print!("{}", page.table());
        }

        Commands::Users(cmd) => {
            require(caps.manage_users)?;
            let mut page = UsersPage::open(client).await?;
            match cmd {
                UserCommands::List => {}
                UserCommands::Add { username, admin, password } => {
                    let password = match password {
                        Some(p) => p,
                        None => read_line("Mot de passe : ")?,
                    };
                    page.create(&CreateUser {
                        username,
                        password,
                        is_admin: admin,
                    })
                    .await?;
                }
                UserCommands::Delete { id } => page.delete(id).await?,
            }
            print!("{}", page.table());
        }

        Commands::Cart(cmd) => {
            let mut page = CartPage::open(client).await?;
            match cmd {
                CartCommands::Show => {}
                CartCommands::Add(args) => {
                    let draft = RequestDraft::from(args);
                    page.add(draft.materiel_id, draft.request_type, draft.description).await?;
                }
                CartCommands::Remove { item_id } => page.remove(item_id).await?,
                CartCommands::Submit => {
                    let response = page.submit().await?;
                    println!("{} (lot {})", response.message, response.batch_id);
                }
            }
            print!("{}", page.table());
        }

        Commands::Requests(cmd) => {
            let mut page = RequestsPage::open(client).await?;
            match cmd {
                RequestCommands::List => {}
                RequestCommands::Status { id, status } => {
                    require(caps.change_request_status)?;
                    page.set_status(id, status).await?;
                }
                RequestCommands::Delete { id, yes } => {
                    require(caps.delete_requests)?;
                    let deleted = page.delete(id, |prompt| yes || confirm(prompt)).await?;
                    if !deleted {
                        println!("Suppression annulée");
                    }
                }
            }
            print!("{}", page.table());
        }

        Commands::Direct(args) => {
            require(caps.direct_request)?;
            if let Some(request) = pages::direct_request(client, &RequestDraft::from(args)).await {
                println!("{} (demande {})", pages::DIRECT_REQUEST_CREATED, request.id);
            }
        }
    }

    Ok(())
}

fn require(allowed: bool) -> anyhow::Result<()> {
    if !allowed {
        bail!("Action réservée aux administrateurs");
    }
    Ok(())
}

fn read_line(label: &str) -> anyhow::Result<String> {
    eprint!("{}", label);
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn confirm(prompt: &str) -> bool {
    matches!(
        read_line(&format!("{} [o/N] ", prompt)).map(|a| a.trim().to_lowercase()),
        Ok(answer) if answer == "o" || answer == "oui" || answer == "y"
    )
}
