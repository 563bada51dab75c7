use anyhow::Result;
use inquire::{Select, Text};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

use super::record::RecordMenu;
use super::{Env, Menu, MenuExit, MENU_EXIT, MENU_LOOP};
use crate::views::{PatientSearch, SearchState};

pub(super) struct DoctorMenu {
    env: Env,
    search: PatientSearch,
}

impl DoctorMenu {
    pub(super) fn new(env: Env) -> Self {
        let search = PatientSearch::new(
            env.ctx.clone(),
            env.config.search_debounce,
            env.rt.clone(),
        );
        if let Some(doctor) = env.session().doctor() {
            env.print_header(&doctor.name);
            println!(
                "{} | {} years of experience",
                doctor.specialty, doctor.experience
            );
        }
        Self { env, search }
    }

    fn search_patients(&mut self) -> Result<()> {
        let term = Text::new("Search patients (name or id):")
            .with_initial_value(&self.search.term())
            .prompt()?;
        self.search.input(&term);
        self.env.rt.block_on(self.search.settle());

        let state = self.search.state();
        if let Some(message) = state.message() {
            println!("{message}");
        }
        let SearchState::Results(rows) = state else {
            return Ok(());
        };
        if rows.is_empty() {
            return Ok(());
        }

        let mut labels: Vec<String> = rows
            .iter()
            .map(|p| {
                format!(
                    "{:<24} {:<10} last seen {}",
                    p.full_name(),
                    p.status_label(),
                    p.last_seen_label()
                )
            })
            .collect();
        labels.push("Back".to_string());

        let picked = Select::new("Open a patient:", labels).raw_prompt()?;
        if let Some(patient) = rows.get(picked.index) {
            RecordMenu::new(self.env.clone(), &patient.id).enter_loop();
        }
        Ok(())
    }
}

impl Menu for DoctorMenu {
    fn enter(&mut self) -> Result<MenuExit> {
        #[derive(EnumIter, Display)]
        enum Choice {
            #[strum(serialize = "Search patients")]
            Search,
            #[strum(serialize = "Open patient by id")]
            Open,
            #[strum(serialize = "Log out")]
            Logout,
        }

        if self.env.session().doctor().is_none() {
            return Ok(MENU_EXIT);
        }

        match Select::new("Doctor dashboard", Choice::iter().collect()).prompt()? {
            Choice::Search => self.search_patients()?,
            Choice::Open => {
                let id = Text::new("Patient id:").prompt()?;
                let id = id.trim();
                if !id.is_empty() {
                    RecordMenu::new(self.env.clone(), id).enter_loop();
                }
            }
            Choice::Logout => {
                self.env.session().logout();
                return Ok(MENU_EXIT);
            }
        }

        if !self.env.still_signed_in() {
            return Ok(MENU_EXIT);
        }
        Ok(MENU_LOOP)
    }
}
