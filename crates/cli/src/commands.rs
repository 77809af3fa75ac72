use anyhow::{Result, bail};
use clap::{Subcommand, ValueEnum};
use jobboard_frontend_common::auth::error_messages::user_message;
use jobboard_frontend_common::{
    ApiExecutor, AuthConfig, ClientSettings, FileStorage, SessionError, SessionStore,
    create_session,
};
use jobboard_http::types::{
    ApplicationRequest, JobFilters, LoginRequest, RegisterRequest, UserType, UserUpdate,
};
use jobboard_http::ClientError;
use serde::Serialize;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in and store the session
    Login {
        #[arg(short, long)]
        username: String,

        /// Password (prefer the environment variable over the flag)
        #[arg(long, env = "JOBBOARD_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account and log in with it
    Register {
        #[arg(long)]
        username: String,
        #[arg(long, env = "JOBBOARD_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        full_name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        city: String,
        #[arg(long, value_enum)]
        role: Role,
    },
    /// Forget the stored session
    Logout,
    /// Show the logged in user
    Whoami,
    /// Profile management
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },
    /// Browse job postings
    Jobs {
        #[command(subcommand)]
        command: JobCommands,
    },
    /// Apply for a job
    Apply {
        job_id: i64,

        #[arg(short, long, default_value = "")]
        message: String,
    },
    /// List applications
    Applications {
        /// Applications received for your job postings
        #[arg(long)]
        employer: bool,
    },
    /// List skills
    Skills {
        /// Show the full skill catalog instead of your own skills
        #[arg(long)]
        catalog: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ProfileCommands {
    /// Change profile fields; omitted fields keep their current value
    Update {
        #[arg(long)]
        full_name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        city: Option<String>,
        #[arg(long)]
        bio: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum JobCommands {
    /// List open jobs
    List {
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        size: Option<u32>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long = "type")]
        job_type: Option<String>,
        #[arg(long)]
        location: Option<String>,
    },
    /// Show a single job
    Show { id: i64 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Role {
    Employer,
    Freelancer,
}

impl From<Role> for UserType {
    fn from(role: Role) -> Self {
        match role {
            Role::Employer => UserType::Employer,
            Role::Freelancer => UserType::Freelancer,
        }
    }
}

impl Commands {
    pub async fn execute(self, settings: &ClientSettings, json: bool) -> Result<()> {
        let ctx = Context::open(settings, json)?;

        match self {
            Commands::Login { username, password } => {
                let profile = ctx
                    .store
                    .login(&LoginRequest { username, password })
                    .await
                    .map_err(|e| describe(e, "Login failed"))?;
                println!("Logged in as {} ({})", profile.username, profile.user_type);
                Ok(())
            }
            Commands::Register {
                username,
                password,
                full_name,
                email,
                phone,
                city,
                role,
            } => {
                let request = RegisterRequest {
                    username,
                    password,
                    full_name,
                    email,
                    phone,
                    city,
                    user_type: role.into(),
                };
                let profile = ctx
                    .store
                    .register(&request)
                    .await
                    .map_err(|e| describe(e, "Registration failed"))?;
                println!("Registered and logged in as {}", profile.username);
                Ok(())
            }
            Commands::Logout => {
                ctx.store.logout();
                println!("Logged out");
                Ok(())
            }
            Commands::Whoami => ctx.whoami().await,
            Commands::Profile { command } => command.execute(&ctx).await,
            Commands::Jobs { command } => command.execute(&ctx).await,
            Commands::Apply { job_id, message } => ctx.apply(job_id, message).await,
            Commands::Applications { employer } => {
                ctx.require_session().await?;
                let client = ctx.store.client();
                let applications = if employer {
                    ctx.call(client.employer_applications(), client.employer_applications())
                        .await?
                } else {
                    ctx.call(client.my_applications(), client.my_applications())
                        .await?
                };
                ctx.print(&applications, |items| {
                    if items.is_empty() {
                        println!("No applications");
                    }
                    for app in items {
                        println!(
                            "#{} {} - {} [{}]",
                            app.job_id, app.job_title, app.user_full_name, app.status
                        );
                    }
                })
            }
            Commands::Skills { catalog } => {
                let client = ctx.store.client();
                if catalog {
                    let skills = ctx.call(client.list_skills(), client.list_skills()).await?;
                    ctx.print(&skills, |items| {
                        for skill in items {
                            match &skill.category {
                                Some(category) => println!(
                                    "{:>4}  {} ({})",
                                    skill.id, skill.title, category.title
                                ),
                                None => println!("{:>4}  {}", skill.id, skill.title),
                            }
                        }
                    })
                } else {
                    ctx.require_session().await?;
                    let skills = ctx.call(client.my_skills(), client.my_skills()).await?;
                    ctx.print(&skills, |items| {
                        for skill in items {
                            let level = skill.proficiency_level.as_deref().unwrap_or("-");
                            println!("{:>4}  {} [{}]", skill.id, skill.title, level);
                        }
                    })
                }
            }
        }
    }
}

impl ProfileCommands {
    async fn execute(self, ctx: &Context) -> Result<()> {
        match self {
            ProfileCommands::Update {
                full_name,
                email,
                phone,
                city,
                bio,
            } => {
                let Some(current) = ctx.require_session().await? else {
                    bail!("No profile loaded; run `jobboard whoami` first");
                };
                let mut update = UserUpdate::from(&current);
                if let Some(full_name) = full_name {
                    update.full_name = full_name;
                }
                if let Some(email) = email {
                    update.email = email;
                }
                if let Some(phone) = phone {
                    update.phone = phone;
                }
                if let Some(city) = city {
                    update.city = city;
                }
                if bio.is_some() {
                    update.bio = bio;
                }

                let client = ctx.store.client();
                let profile = ctx
                    .call(client.update_profile(&update), client.update_profile(&update))
                    .await?;
                ctx.store.update_profile(profile.clone())?;
                ctx.print(&profile, |p| println!("Profile updated for {}", p.username))
            }
        }
    }
}

impl JobCommands {
    async fn execute(self, ctx: &Context) -> Result<()> {
        let client = ctx.store.client();
        match self {
            JobCommands::List {
                page,
                size,
                search,
                job_type,
                location,
            } => {
                let filters = JobFilters {
                    page,
                    size,
                    search,
                    job_type,
                    location,
                };
                let jobs = ctx
                    .call(client.list_jobs(&filters), client.list_jobs(&filters))
                    .await?;
                ctx.print(&jobs, |page| {
                    for job in &page.content {
                        let id = job.id.map_or_else(|| "-".to_string(), |id| id.to_string());
                        let urgent = if job.urgent != 0 { " (urgent)" } else { "" };
                        println!(
                            "{id:>5}  {}{urgent} | {} | {:.2}",
                            job.title, job.location, job.payment_amount
                        );
                    }
                    println!(
                        "page {} of {} ({} jobs)",
                        page.current_page + 1,
                        page.total_pages.max(1),
                        page.total_elements
                    );
                })
            }
            JobCommands::Show { id } => {
                let job = ctx.call(client.get_job(id), client.get_job(id)).await?;
                ctx.print(&job, |job| {
                    println!("{}", job.title);
                    println!("  location: {}", job.location);
                    println!("  dates:    {} - {}", job.date_from, job.date_to);
                    println!("  payment:  {:.2}", job.payment_amount);
                    if let Some(payment_type) = &job.payment_type {
                        println!("  type:     {payment_type}");
                    }
                    if let Some(owner) = &job.created_by_name {
                        println!("  posted by {owner}");
                    }
                    if !job.categories.is_empty() {
                        println!("  categories: {}", job.categories.join(", "));
                    }
                    println!();
                    println!("{}", job.description);
                })
            }
        }
    }
}

/// A session-backed command context
struct Context {
    store: SessionStore,
    json: bool,
}

impl Context {
    fn open(settings: &ClientSettings, json: bool) -> Result<Self> {
        let data_dir = settings.resolved_data_dir();
        debug!(data_dir = %data_dir.display(), "Opening session storage");
        let storage = Arc::new(FileStorage::in_dir(data_dir));
        let store = create_session(settings, storage)?;
        Ok(Self { store, json })
    }

    /// Restore the stored session, failing when nobody is logged in
    async fn require_session(&self) -> Result<Option<jobboard_http::types::UserProfile>> {
        if !self.store.initialize().await {
            bail!("Not logged in; run `jobboard login` first");
        }
        Ok(self.store.user())
    }

    async fn whoami(&self) -> Result<()> {
        self.require_session().await?;
        let client = self.store.client();
        let profile = self
            .call(client.get_profile(), client.get_profile())
            .await?;
        self.store.update_profile(profile.clone())?;
        self.print(&profile, |p| {
            println!("{} ({})", p.username, p.user_type);
            println!("  name:  {}", p.full_name);
            println!("  email: {}", p.email);
            println!("  phone: {}", p.phone);
            println!("  city:  {}", p.city);
            if let Some(bio) = &p.bio {
                println!("  bio:   {bio}");
            }
        })
    }

    async fn apply(&self, job_id: i64, message: String) -> Result<()> {
        self.require_session().await?;
        let client = self.store.client();

        if self
            .call(
                client.has_applied_for_job(job_id),
                client.has_applied_for_job(job_id),
            )
            .await?
        {
            bail!("You have already applied for job {job_id}");
        }

        let request = ApplicationRequest { job_id, message };
        let application = self
            .call(client.apply_for_job(&request), client.apply_for_job(&request))
            .await?;
        info!(job_id, "Application submitted");
        self.print(&application, |app| {
            println!("Applied for {} [{}]", app.job_title, app.status)
        })
    }

    /// Run a request through the executor, turning its outcome into a `Result`
    async fn call<T, Op, Retry>(&self, operation: Op, retry: Retry) -> Result<T>
    where
        Op: Future<Output = Result<T, ClientError>>,
        Retry: Future<Output = Result<T, ClientError>>,
    {
        let expired = Arc::new(AtomicBool::new(false));
        let flag = expired.clone();
        let executor = ApiExecutor::new(Arc::new(self.store.clone())).on_login_required(move || {
            flag.store(true, Ordering::SeqCst);
        });

        match executor.execute_with_retry(operation, retry).await {
            Some(value) => Ok(value),
            None if expired.load(Ordering::SeqCst) => {
                bail!("Your session has expired; run `jobboard login` to sign in again")
            }
            None => {
                let message = executor.error();
                if message.is_empty() {
                    bail!(AuthConfig::REQUEST_FAILED)
                }
                bail!(message)
            }
        }
    }

    fn print<T: Serialize>(&self, value: &T, human: impl FnOnce(&T)) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            human(value);
        }
        Ok(())
    }
}

fn describe(error: SessionError, fallback: &str) -> anyhow::Error {
    match error {
        SessionError::Api(e) => anyhow::anyhow!(user_message(&e, fallback)),
        other => other.into(),
    }
}
