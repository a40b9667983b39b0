//! Line-oriented terminal front end
//!
//! The shell owns the page on screen. Every navigation goes through the
//! router, so session gates are re-evaluated each time; replacing the page
//! drops the previous one, which unmounts it.

use crate::{error::AppResult, services::Services};

use super::{
    pages::{Outcome, Page},
    render,
    router::{Resolution, Route, Router},
};

pub const HELP: &str = "\
Commands:
  go <path>            open a page, e.g. go /books/42
  home | back          open the catalog
  set <field> <value>  fill a form field (empty value clears it)
  submit               submit the form on screen
  edit | delete        act on the book on screen
  logout               end the session
  show                 redraw the page
  help                 show this text
  quit                 leave
";

/// Text to print after a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub quit: bool,
}

impl Reply {
    fn show(text: String) -> Self {
        Self { text, quit: false }
    }
}

pub struct Shell {
    services: Services,
    router: Router,
    route: Route,
    page: Page,
    notice: Option<String>,
}

impl Shell {
    /// Open the shell on `path`
    pub async fn start(services: Services, path: &str) -> AppResult<Self> {
        let router = Router::new(services.session.clone());
        let mut shell = Self {
            services,
            router,
            route: Route::Home,
            page: Page::NotFound(String::new()),
            notice: None,
        };
        shell.navigate(path).await?;
        Ok(shell)
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub async fn navigate(&mut self, path: &str) -> AppResult<()> {
        let resolution = self.router.resolve(path);
        let route = resolution.route().clone();
        tracing::info!("Navigating to {}", route);

        self.notice = match &resolution {
            Resolution::Redirect { from, to } => Some(format!("Redirected from {} to {}", from, to)),
            Resolution::Render(_) => None,
        };
        self.page = Page::for_route(&route, &self.services);
        self.route = route;
        self.page.load().await
    }

    async fn follow(&mut self, outcome: Outcome) -> AppResult<()> {
        match outcome {
            Outcome::Stay => Ok(()),
            Outcome::Navigate(route) => self.navigate(&route.path()).await,
        }
    }

    pub fn render(&self) -> String {
        let auth = self.router.auth_state();
        let mut out = render::navbar(auth);
        if let Some(session) = self.services.session.current() {
            let name = session.display_name().unwrap_or("member");
            out.push_str(&format!("Signed in as {}\n", name));
        }
        if let Some(notice) = &self.notice {
            out.push_str(&format!("({})\n", notice));
        }
        out.push('\n');
        out.push_str(&self.page.render(auth));
        out
    }

    /// Run one command line
    pub async fn handle(&mut self, line: &str) -> AppResult<Reply> {
        let line = line.trim();
        let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();

        match command {
            "" | "show" => {}
            "help" => return Ok(Reply::show(HELP.to_string())),
            "quit" | "exit" => {
                return Ok(Reply {
                    text: "Bye.\n".to_string(),
                    quit: true,
                })
            }
            "go" if !rest.is_empty() => self.navigate(rest).await?,
            "home" | "back" => self.navigate("/").await?,
            "login" | "signup" => self.navigate(&format!("/{}", command)).await?,
            "set" if self.page.has_form() => {
                let (field, value) = rest.split_once(' ').unwrap_or((rest, ""));
                if let Err(e) = self.page.set_field(field, value) {
                    return Ok(Reply::show(format!("Cannot set {}: {}\n", field, e)));
                }
            }
            "set" => return Ok(Reply::show("There is no form on this page.\n".to_string())),
            "submit" => {
                let outcome = self.page.submit().await?;
                self.follow(outcome).await?;
            }
            "delete" => {
                let outcome = self.page.delete().await?;
                self.follow(outcome).await?;
            }
            "edit" => {
                let outcome = self.page.edit();
                self.follow(outcome).await?;
            }
            "logout" => {
                if let Err(e) = self.services.auth.logout() {
                    tracing::error!("Failed to remove stored session: {}", e);
                }
                let path = self.route.path();
                self.navigate(&path).await?;
            }
            _ => {
                return Ok(Reply::show(format!(
                    "Unknown command: {}. Type 'help' for the list.\n",
                    line
                )))
            }
        }

        Ok(Reply::show(self.render()))
    }
}
