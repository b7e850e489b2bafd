//! Terminal front-end state: config, session and API client wired to one
//! credential store.

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use matchmate_core::api::ApiClient;
use matchmate_core::models::{MemberUpdate, NewProfile};
use matchmate_core::storage::FileCookieJar;
use matchmate_core::{ApiError, Config, CredentialStore, MemberStatus, Navigation, Role, Session};

use crate::format::{format_date, format_expiry, member_header, member_row};

pub struct App {
    config: Config,
    session: Session,
    api: ApiClient,
    navigation: mpsc::UnboundedReceiver<Navigation>,
}

impl App {
    pub fn new() -> Result<Self> {
        let config = match Config::load() {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Failed to load config, using defaults");
                Config::default()
            }
        };

        let cache_dir = config.cache_dir()?;
        let jar = Arc::new(FileCookieJar::open(&cache_dir));
        let store = CredentialStore::new(jar);

        let base_url = config.api_base_url();
        debug!(base_url = %base_url, "Backend configured");
        let api = ApiClient::new(&base_url, store.clone()).context("Failed to create API client")?;

        let (session, navigation) = Session::new(store);

        Ok(Self {
            config,
            session,
            api,
            navigation,
        })
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    pub async fn login(&mut self, email: Option<String>, remember: bool) -> Result<()> {
        let email = match email.or_else(|| self.config.last_email.clone()) {
            Some(email) => email,
            None => Self::prompt("Email: ")?,
        };
        if email.is_empty() {
            anyhow::bail!("Email is required");
        }
        let password = rpassword::prompt_password("Password: ")?;
        let auto_login = auto_login_for(remember, self.session.credentials());

        let login = self
            .api
            .authenticate(&email, &password)
            .await
            .map_err(|e| anyhow::anyhow!(e.user_message()))?;

        self.session.login(&login.access_token, login.user, auto_login);

        self.config.last_email = Some(email);
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save config");
        }

        self.follow_navigation();
        Ok(())
    }

    pub fn oauth_callback(&mut self, redirect_url: &str, remember: bool) -> Result<()> {
        let user = self.session.complete_oauth(redirect_url, remember)?;
        info!(user_id = %user.id, "OAuth login completed");
        self.follow_navigation();
        Ok(())
    }

    pub fn logout(&mut self) {
        self.session.logout();
        self.follow_navigation();
    }

    pub fn whoami(&self) {
        match self.session.current_user() {
            Some(user) => {
                println!("User:    {}", user.id);
                println!("Role:    {}", user.role);
                println!("Status:  {}", user.status);
                if let Some(expires_at) = self.session.credentials().expires_at() {
                    println!("Expires: {}", format_expiry(expires_at, Utc::now()));
                }
                println!(
                    "Stay signed in: {}",
                    if self.session.credentials().auto_login() { "yes" } else { "no" }
                );
            }
            None => println!("Not logged in."),
        }
    }

    // =========================================================================
    // Members
    // =========================================================================

    pub async fn list_members(&mut self) -> Result<()> {
        self.require_login()?;
        let members = self.api.list_users().await;
        let mut members = self.check(members)?;
        members.sort_by(|a, b| a.display_name().to_lowercase().cmp(&b.display_name().to_lowercase()));

        println!("{}", member_header());
        for member in &members {
            println!("{}", member_row(member));
        }
        let pending = members.iter().filter(|m| m.is_pending()).count();
        println!("\n{} members, {} pending approval", members.len(), pending);
        Ok(())
    }

    pub async fn show_member(&mut self, id: &str) -> Result<()> {
        self.require_login()?;
        let member = self.api.fetch_member(id).await;
        let member = self.check(member)?;

        println!("ID:      {}", member.id);
        println!("Name:    {}", member.display_name());
        println!("Email:   {}", member.email);
        println!("Role:    {}", member.role);
        println!("Status:  {}", member.status);
        if let Some(ref created) = member.created_at {
            println!("Joined:  {}", format_date(created));
        }
        Ok(())
    }

    pub async fn create_profile(&mut self, email: String, name: String, bio: Option<String>) -> Result<()> {
        self.require_login()?;
        let profile = NewProfile { email, name, bio };
        let created = self.api.create_profile(&profile).await;
        let created = self.check(created)?;
        println!("Created profile {} ({})", created.id, created.status);
        Ok(())
    }

    pub async fn set_status(&mut self, id: &str, status: MemberStatus) -> Result<()> {
        self.update_member(id, MemberUpdate::status(status)).await
    }

    pub async fn set_role(&mut self, id: &str, role: Role) -> Result<()> {
        self.update_member(id, MemberUpdate::role(role)).await
    }

    async fn update_member(&mut self, id: &str, update: MemberUpdate) -> Result<()> {
        self.require_admin()?;
        let updated = self.api.update_member(id, &update).await;
        let updated = self.check(updated)?;
        println!("{}", member_row(&updated));
        Ok(())
    }

    pub async fn delete_member(&mut self, id: &str) -> Result<()> {
        self.require_admin()?;
        let deleted = self.api.delete_member(id).await;
        self.check(deleted)?;
        println!("Deleted member {}", id);
        Ok(())
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn require_login(&self) -> Result<()> {
        if !self.session.is_authenticated() {
            anyhow::bail!("Not logged in. Run `matchmate login` first.");
        }
        Ok(())
    }

    fn require_admin(&self) -> Result<()> {
        self.require_login()?;
        match self.session.current_user() {
            Some(user) if user.role.is_admin() => Ok(()),
            _ => anyhow::bail!("Admin access required"),
        }
    }

    /// Turn an API failure into a displayable error, sending the user back to
    /// the login screen when the session expired.
    fn check<T>(&mut self, result: Result<T, ApiError>) -> Result<T> {
        match result {
            Ok(value) => Ok(value),
            Err(e) => {
                if e.is_session_expired() {
                    self.show(Navigation::Login);
                }
                Err(anyhow::anyhow!(e.user_message()))
            }
        }
    }

    fn follow_navigation(&mut self) {
        while let Ok(to) = self.navigation.try_recv() {
            self.show(to);
        }
    }

    fn show(&self, to: Navigation) {
        match to {
            Navigation::Home => match self.session.current_user() {
                Some(user) => println!("Logged in as {} ({}, {}).", user.id, user.role, user.status),
                None => println!("Logged in."),
            },
            Navigation::Login => println!("Logged out. Run `matchmate login` to sign in."),
        }
    }

    fn prompt(label: &str) -> Result<String> {
        print!("{}", label);
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        Ok(input.trim().to_string())
    }
}

/// `--remember`, or the preference of a session that has not been logged out.
fn auto_login_for(remember: bool, store: &CredentialStore) -> bool {
    remember || store.auto_login()
}
