use anyhow::Result;
use inquire::{Select, Text};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

use super::record::{history_line, print_error, show_details, show_vitals};
use super::{Env, Menu, MenuExit, MENU_EXIT, MENU_LOOP};
use crate::models::VitalsForm;
use crate::views::{DiagnosisCard, HistoriesView, PatientDetailsView, VitalsView};

pub(super) struct PatientMenu {
    env: Env,
    details: PatientDetailsView,
    histories: HistoriesView,
    vitals: VitalsView,
}

impl PatientMenu {
    pub(super) fn new(env: Env) -> Self {
        let (id, name) = env
            .session()
            .patient()
            .map(|p| (p.id, p.name))
            .unwrap_or_default();
        env.print_header(&name);

        let ctx = env.ctx.clone();
        Self {
            details: PatientDetailsView::new(ctx.clone(), &id),
            histories: HistoriesView::new(ctx.clone(), &id),
            vitals: VitalsView::new(ctx, &id),
            env,
        }
    }

    fn current_diagnosis(&mut self) {
        self.env.rt.block_on(self.details.load());
        match self.details.record() {
            Some(record) => {
                for line in DiagnosisCard::from_record(record).lines() {
                    println!("  {line}");
                }
            }
            None => print_error(self.details.remote().error()),
        }
    }

    fn medical_history(&mut self) {
        self.env.rt.block_on(self.histories.load());
        if let Some(message) = self.histories.remote().error() {
            println!("{message}");
            return;
        }
        if self.histories.items().is_empty() {
            println!("No medical history recorded.");
        }
        for item in self.histories.items() {
            println!("  - {}", history_line(item));
        }
    }

    fn submit_vitals(&mut self) -> Result<()> {
        let form = VitalsForm {
            systolic: Text::new("Systolic (mmHg):").prompt()?,
            diastolic: Text::new("Diastolic (mmHg):").prompt()?,
            sugar: Text::new("Blood sugar (mg/dL):").prompt()?,
        };
        self.env.rt.block_on(self.vitals.submit(&form));
        Ok(())
    }
}

impl Menu for PatientMenu {
    fn enter(&mut self) -> Result<MenuExit> {
        #[derive(EnumIter, Display)]
        enum Choice {
            #[strum(serialize = "Personal information")]
            Personal,
            #[strum(serialize = "Current diagnosis")]
            Diagnosis,
            #[strum(serialize = "Medical history")]
            History,
            #[strum(serialize = "Health metrics")]
            Metrics,
            #[strum(serialize = "Submit health metrics")]
            SubmitVitals,
            #[strum(serialize = "Log out")]
            Logout,
        }

        if self.env.session().patient().is_none() {
            return Ok(MENU_EXIT);
        }

        match Select::new("Patient dashboard", Choice::iter().collect()).prompt()? {
            Choice::Personal => {
                self.env.rt.block_on(self.details.load());
                show_details(&self.details);
            }
            Choice::Diagnosis => self.current_diagnosis(),
            Choice::History => self.medical_history(),
            Choice::Metrics => {
                self.env.rt.block_on(self.vitals.load());
                show_vitals(&self.vitals);
            }
            Choice::SubmitVitals => self.submit_vitals()?,
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
