use std::{path::PathBuf, process::ExitCode, sync::Arc};

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use client_core::{
    ApiClient, Courses, CreateFlow, DetailController, Events, ListController, ListState, News,
    Notice, NoticeLevel, Notifier, Orders, Outcome, RemoteResource, Resource, Users,
};
use serde::de::DeserializeOwned;
use shared::{
    domain::{EventLocation, EventType, OrderStatus, UserRole},
    protocol::{
        CreateCourseRequest, CreateEventRequest, CreateNewsRequest, CreateUserRequest, LoginForm,
        UpdateCourseRequest, UpdateEventRequest, UpdateNewsRequest, UpdateOrderRequest,
        UpdateUserRequest, DEFAULT_PAGE,
    },
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod config;
mod render;

use config::{load_settings, Overrides};
use render::TableRow;

#[derive(Parser, Debug)]
#[command(name = "console", about = "Back-office console for the admin API")]
struct Cli {
    /// Settings file; `console.toml` in the working directory is used when present.
    #[arg(long, env = "CONSOLE_CONFIG")]
    config: Option<PathBuf>,
    #[arg(long)]
    api_url: Option<String>,
    #[arg(long)]
    token: Option<String>,
    #[arg(long)]
    page_size: Option<u32>,
    #[arg(long)]
    timeout_secs: Option<u64>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Exchange staff credentials for an access token.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    #[command(subcommand)]
    Users(UserCommand),
    #[command(subcommand)]
    Events(EventCommand),
    #[command(subcommand)]
    News(NewsCommand),
    #[command(subcommand)]
    Courses(CourseCommand),
    #[command(subcommand)]
    Orders(OrderCommand),
}

#[derive(Args, Debug)]
struct PageArgs {
    #[arg(long)]
    page: Option<u32>,
    #[arg(long)]
    take: Option<u32>,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    List(PageArgs),
    Show {
        id: String,
    },
    Create {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        nickname: String,
        #[arg(long, value_parser = parse_wire::<UserRole>)]
        role: Option<UserRole>,
    },
    Update {
        id: String,
        #[arg(long)]
        nickname: String,
        #[arg(long)]
        trading_view_email: Option<String>,
        #[arg(long)]
        discord_id: Option<String>,
        #[arg(long)]
        country_code: Option<String>,
        #[arg(long)]
        tel: Option<String>,
    },
    Delete {
        id: String,
    },
}

#[derive(Subcommand, Debug)]
enum EventCommand {
    List(PageArgs),
    Show {
        id: String,
    },
    Create {
        #[arg(long)]
        cover_id: String,
        #[arg(long)]
        title: String,
        #[arg(long = "type", value_parser = parse_wire::<EventType>)]
        kind: EventType,
        #[arg(long, value_parser = parse_wire::<EventLocation>)]
        location: EventLocation,
        #[arg(long)]
        start_date: DateTime<Utc>,
        #[arg(long)]
        content: String,
        #[arg(long)]
        speaker: String,
        #[arg(long, default_value = "")]
        speaker_description: String,
        #[arg(long)]
        speaker_avatar_id: String,
    },
    Update {
        id: String,
        #[arg(long)]
        cover_id: Option<String>,
        #[arg(long)]
        title: Option<String>,
        #[arg(long = "type", value_parser = parse_wire::<EventType>)]
        kind: Option<EventType>,
        #[arg(long, value_parser = parse_wire::<EventLocation>)]
        location: Option<EventLocation>,
        #[arg(long)]
        start_date: Option<DateTime<Utc>>,
        #[arg(long)]
        content: Option<String>,
        #[arg(long)]
        speaker: Option<String>,
        #[arg(long)]
        speaker_description: Option<String>,
        #[arg(long)]
        speaker_avatar_id: Option<String>,
    },
    Delete {
        id: String,
    },
}

#[derive(Subcommand, Debug)]
enum NewsCommand {
    List(PageArgs),
    Show {
        id: String,
    },
    Create {
        #[arg(long)]
        cover_id: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
    },
    Update {
        id: String,
        #[arg(long)]
        cover_id: Option<String>,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
    },
    Delete {
        id: String,
    },
}

#[derive(Subcommand, Debug)]
enum CourseCommand {
    List(PageArgs),
    Show {
        id: String,
    },
    Create {
        #[arg(long)]
        cover_id: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        price: u32,
        #[arg(long, default_value = "")]
        description: String,
    },
    Update {
        id: String,
        #[arg(long)]
        cover_id: Option<String>,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        price: Option<u32>,
        #[arg(long)]
        description: Option<String>,
    },
    Delete {
        id: String,
    },
}

#[derive(Subcommand, Debug)]
enum OrderCommand {
    List(PageArgs),
    Show {
        id: String,
    },
    SetStatus {
        id: String,
        #[arg(value_parser = parse_wire::<OrderStatus>)]
        status: OrderStatus,
    },
}

/// Parses a flag value using the same spelling the API uses on the wire.
fn parse_wire<T: DeserializeOwned>(raw: &str) -> Result<T, String> {
    serde_json::from_value(serde_json::Value::String(raw.to_string()))
        .map_err(|_| format!("unrecognised value '{raw}'"))
}

/// Shared wiring for one command invocation.
struct Console {
    client: Arc<ApiClient>,
    notifier: Notifier,
    page_size: u32,
}

impl Console {
    fn remote<R: Resource>(&self) -> Arc<dyn RemoteResource<R>> {
        self.client.clone()
    }

    fn list_controller<R: Resource>(&self) -> ListController<R> {
        ListController::new(self.remote(), self.notifier.clone()).with_page_size(self.page_size)
    }

    fn detail_controller<R: Resource>(&self, id: String) -> DetailController<R>
    where
        R::Id: From<String>,
    {
        DetailController::new(self.remote(), self.notifier.clone(), Some(R::Id::from(id)))
    }

    async fn list<R: Resource>(&self, args: PageArgs) -> anyhow::Result<Outcome>
    where
        R::Item: TableRow,
    {
        let list = self.list_controller::<R>();
        let outcome = match (args.page, args.take) {
            (None, None) => list.activate().await,
            (page, take) => {
                list.on_page_change(page.unwrap_or(DEFAULT_PAGE), take.unwrap_or(self.page_size))
                    .await
            }
        };
        print_list(&list.state().await);
        Ok(outcome)
    }

    async fn show<R: Resource>(&self, id: String) -> anyhow::Result<Outcome>
    where
        R::Id: From<String>,
    {
        let detail = self.detail_controller::<R>(id);
        let outcome = detail.load().await;
        if let Some(snapshot) = detail.state().await.snapshot {
            println!("{}", render::detail(&snapshot)?);
        }
        Ok(outcome)
    }

    /// Loads first so the merged snapshot can be printed afterwards.
    async fn update<R: Resource>(&self, id: String, payload: R::Update) -> anyhow::Result<Outcome>
    where
        R::Id: From<String>,
    {
        let detail = self.detail_controller::<R>(id);
        if detail.load().await == Outcome::Failed {
            return Ok(Outcome::Failed);
        }
        let outcome = detail.update(payload).await;
        if let Some(snapshot) = detail.state().await.snapshot {
            println!("{}", render::detail(&snapshot)?);
        }
        Ok(outcome)
    }

    async fn delete<R: Resource>(&self, id: String) -> anyhow::Result<Outcome>
    where
        R::Id: From<String>,
    {
        Ok(self.detail_controller::<R>(id).remove().await)
    }

    async fn create<R: Resource>(&self, payload: R::Create) -> anyhow::Result<Outcome>
    where
        R::Item: TableRow,
    {
        let list = Arc::new(self.list_controller::<R>());
        let flow = CreateFlow::new(self.remote(), self.notifier.clone(), list.clone());
        match flow.submit(payload).await {
            Ok(created) => {
                println!("{}", render::detail(&created)?);
                print_list(&list.state().await);
                Ok(Outcome::Succeeded)
            }
            Err(err) => {
                for (field, message) in err.field_messages() {
                    eprintln!("{field}: {message}");
                }
                Ok(Outcome::Failed)
            }
        }
    }

    async fn login(&self, form: LoginForm) -> anyhow::Result<Outcome> {
        match client_core::login(&self.client, &self.notifier, &form).await {
            Ok(session) => {
                println!("logged in as {}", session.user.email);
                println!("access token: {}", session.access_token);
                Ok(Outcome::Succeeded)
            }
            Err(err) => {
                for (field, message) in err.field_messages() {
                    eprintln!("{field}: {message}");
                }
                Ok(Outcome::Failed)
            }
        }
    }
}

fn print_list<T: TableRow>(state: &ListState<T>) {
    if state.error.is_some() {
        return;
    }
    print!("{}", render::table(&state.items));
    println!("{}", render::pagination_footer(&state.pagination));
}

fn print_notice(notice: &Notice) {
    match notice.level {
        NoticeLevel::Success => println!("{}", notice.message),
        NoticeLevel::Error => eprintln!("error: {}", notice.message),
    }
}

async fn dispatch(console: &Console, command: Command) -> anyhow::Result<Outcome> {
    match command {
        Command::Login { email, password } => console.login(LoginForm { email, password }).await,
        Command::Users(command) => match command {
            UserCommand::List(args) => console.list::<Users>(args).await,
            UserCommand::Show { id } => console.show::<Users>(id).await,
            UserCommand::Create {
                email,
                password,
                nickname,
                role,
            } => {
                console
                    .create::<Users>(CreateUserRequest {
                        email,
                        password,
                        nickname,
                        role,
                    })
                    .await
            }
            UserCommand::Update {
                id,
                nickname,
                trading_view_email,
                discord_id,
                country_code,
                tel,
            } => {
                let payload = UpdateUserRequest {
                    nickname,
                    trading_view_email,
                    discord_id,
                    country_code,
                    tel,
                };
                console.update::<Users>(id, payload).await
            }
            UserCommand::Delete { id } => console.delete::<Users>(id).await,
        },
        Command::Events(command) => match command {
            EventCommand::List(args) => console.list::<Events>(args).await,
            EventCommand::Show { id } => console.show::<Events>(id).await,
            EventCommand::Create {
                cover_id,
                title,
                kind,
                location,
                start_date,
                content,
                speaker,
                speaker_description,
                speaker_avatar_id,
            } => {
                let payload = CreateEventRequest {
                    cover_id,
                    title,
                    kind,
                    location,
                    start_date,
                    content,
                    speaker,
                    speaker_description,
                    speaker_avatar_id,
                };
                console.create::<Events>(payload).await
            }
            EventCommand::Update {
                id,
                cover_id,
                title,
                kind,
                location,
                start_date,
                content,
                speaker,
                speaker_description,
                speaker_avatar_id,
            } => {
                let payload = UpdateEventRequest {
                    cover_id,
                    title,
                    kind,
                    location,
                    start_date,
                    content,
                    speaker,
                    speaker_description,
                    speaker_avatar_id,
                };
                console.update::<Events>(id, payload).await
            }
            EventCommand::Delete { id } => console.delete::<Events>(id).await,
        },
        Command::News(command) => match command {
            NewsCommand::List(args) => console.list::<News>(args).await,
            NewsCommand::Show { id } => console.show::<News>(id).await,
            NewsCommand::Create {
                cover_id,
                title,
                content,
            } => {
                let payload = CreateNewsRequest {
                    cover_id,
                    title,
                    content,
                };
                console.create::<News>(payload).await
            }
            NewsCommand::Update {
                id,
                cover_id,
                title,
                content,
            } => {
                let payload = UpdateNewsRequest {
                    cover_id,
                    title,
                    content,
                };
                console.update::<News>(id, payload).await
            }
            NewsCommand::Delete { id } => console.delete::<News>(id).await,
        },
        Command::Courses(command) => match command {
            CourseCommand::List(args) => console.list::<Courses>(args).await,
            CourseCommand::Show { id } => console.show::<Courses>(id).await,
            CourseCommand::Create {
                cover_id,
                title,
                price,
                description,
            } => {
                let payload = CreateCourseRequest {
                    cover_id,
                    title,
                    price,
                    description,
                };
                console.create::<Courses>(payload).await
            }
            CourseCommand::Update {
                id,
                cover_id,
                title,
                price,
                description,
            } => {
                let payload = UpdateCourseRequest {
                    cover_id,
                    title,
                    price,
                    description,
                };
                console.update::<Courses>(id, payload).await
            }
            CourseCommand::Delete { id } => console.delete::<Courses>(id).await,
        },
        Command::Orders(command) => match command {
            OrderCommand::List(args) => console.list::<Orders>(args).await,
            OrderCommand::Show { id } => console.show::<Orders>(id).await,
            OrderCommand::SetStatus { id, status } => {
                console
                    .update::<Orders>(id, UpdateOrderRequest { status })
                    .await
            }
        },
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut settings = load_settings(cli.config.as_deref())?;
    settings.apply_overrides(Overrides {
        api_base_url: cli.api_url,
        access_token: cli.token,
        page_size: cli.page_size,
        request_timeout_secs: cli.timeout_secs,
    });
    debug!(api = %settings.api_base_url, page_size = settings.page_size, "settings loaded");

    let mut client = ApiClient::with_timeout(&settings.api_base_url, settings.request_timeout())
        .context("failed to build api client")?;
    if let Some(token) = settings.access_token.clone() {
        client = client.with_access_token(token);
    }

    let notifier = Notifier::new();
    let mut notices = notifier.subscribe();
    let console = Console {
        client: Arc::new(client),
        notifier,
        page_size: settings.page_size,
    };

    let outcome = dispatch(&console, cli.command).await?;
    while let Ok(notice) = notices.try_recv() {
        print_notice(&notice);
    }

    Ok(match outcome {
        Outcome::Failed => ExitCode::FAILURE,
        _ => ExitCode::SUCCESS,
    })
}
