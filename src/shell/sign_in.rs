use anyhow::Result;
use inquire::{Password, PasswordDisplayMode, Select, Text};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};
use zeroize::Zeroizing;

use super::{Env, MenuExit, MENU_EXIT, MENU_LOOP};
use crate::dashboard::WELCOME_TITLE;
use crate::models::Role;
use crate::session::LoginOutcome;

pub(super) struct SignInMenu {
    env: Env,
}

impl SignInMenu {
    pub(super) fn new(env: Env) -> Self {
        Self { env }
    }

    pub(super) fn enter(&mut self) -> Result<MenuExit> {
        #[derive(EnumIter, Display)]
        enum Choice {
            #[strum(serialize = "Sign in")]
            SignIn,
            #[strum(serialize = "Quit")]
            Quit,
        }

        println!("\n{WELCOME_TITLE}");
        println!("Backend: {}", self.env.config.api_base_url);

        match Select::new("What would you like to do?", Choice::iter().collect()).prompt()? {
            Choice::SignIn => {
                let role = Select::new("Sign in as:", Role::ALL.to_vec()).prompt()?;
                let email = Text::new("Email:").prompt()?;
                let password = Zeroizing::new(
                    Password::new("Password:")
                        .without_confirmation()
                        .with_display_mode(PasswordDisplayMode::Masked)
                        .prompt()?,
                );

                let outcome = self
                    .env
                    .rt
                    .block_on(self.env.session().login(email.trim(), password.as_str(), role));
                match outcome {
                    LoginOutcome::Success(response) => {
                        println!("Welcome, {}.", response.user.name());
                    }
                    LoginOutcome::Failure { message } => {
                        println!("{message}");
                    }
                }
                Ok(MENU_LOOP)
            }
            Choice::Quit => Ok(MENU_EXIT),
        }
    }
}
