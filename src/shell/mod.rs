//! Terminal rendition of the portal.
//!
//! A stack of `Menu`s: the shell resolves the root route on every turn
//! and enters the sign-in menu or the dashboard for the active role.
//! Network work runs on the tokio runtime through `block_on`; prompts
//! are plain blocking `inquire` calls on the main thread.

mod doctor;
mod patient;
mod record;
mod sign_in;

use std::sync::Arc;

use anyhow::Result;
use chrono::Local;
use inquire::{Confirm, InquireError};
use tokio::runtime::Handle;

use crate::config::PortalConfig;
use crate::dashboard::{clock_date, clock_time, greeting_line, resolve_route, Screen, ROOT_ROUTE};
use crate::session::{Navigator, SessionStore};
use crate::views::{Prompter, ViewContext};

type MenuExit = Option<()>;
const MENU_EXIT: MenuExit = None;
const MENU_LOOP: MenuExit = Some(());

/// A text menu. `enter` runs one round and says whether to run again.
trait Menu {
    fn enter(&mut self) -> Result<MenuExit>;

    /// Run until the menu exits. Errors are printed and the menu shown
    /// again; Esc backs out, Ctrl-C quits the menu.
    fn enter_loop(&mut self) {
        while let Some(result) = self.enter().transpose() {
            match result {
                Ok(()) => {}
                Err(e) => match e.downcast_ref::<InquireError>() {
                    Some(InquireError::OperationCanceled) => continue,
                    Some(InquireError::OperationInterrupted) => break,
                    _ => eprintln!("Error: {e}"),
                },
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Terminal adapters
// ═══════════════════════════════════════════════════════════

pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn confirm(&self, message: &str) -> bool {
        Confirm::new(message)
            .with_default(false)
            .prompt()
            .unwrap_or(false)
    }

    fn alert(&self, message: &str) {
        println!("\n  {message}\n");
    }
}

pub struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn redirect(&self, url: &str) {
        println!("Signed out. The portal is available at {url}");
    }
}

// ═══════════════════════════════════════════════════════════
// Shell
// ═══════════════════════════════════════════════════════════

/// Everything a menu needs: the runtime to drive requests on, the
/// session, and the view context built from it.
#[derive(Clone)]
struct Env {
    rt: Handle,
    config: PortalConfig,
    ctx: ViewContext,
}

impl Env {
    fn session(&self) -> &SessionStore {
        self.ctx.session()
    }

    fn print_header(&self, name: &str) {
        let now = Local::now();
        println!();
        println!("{}", greeting_line(&now, name));
        println!("{}  {}", clock_date(&now), clock_time(&now));
    }

    /// `false` once the session is gone (logout or rejected token).
    fn still_signed_in(&self) -> bool {
        if self.session().is_signed_in() {
            return true;
        }
        println!("Your session has ended. Please sign in again.");
        false
    }
}

pub struct Shell {
    env: Env,
}

impl Shell {
    pub fn new(rt: Handle, config: PortalConfig, session: Arc<SessionStore>) -> Self {
        let ctx = ViewContext::new(session, Arc::new(TerminalPrompter));
        Self {
            env: Env { rt, config, ctx },
        }
    }

    pub fn start(&mut self) {
        self.enter_loop();
    }
}

impl Menu for Shell {
    fn enter(&mut self) -> Result<MenuExit> {
        let identity = self.env.session().identity();
        match resolve_route(ROOT_ROUTE, identity.as_ref()) {
            Screen::SignIn => sign_in::SignInMenu::new(self.env.clone()).enter(),
            Screen::DoctorDashboard => {
                doctor::DoctorMenu::new(self.env.clone()).enter_loop();
                Ok(MENU_LOOP)
            }
            Screen::PatientDashboard => {
                patient::PatientMenu::new(self.env.clone()).enter_loop();
                Ok(MENU_LOOP)
            }
        }
    }
}
