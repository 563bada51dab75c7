//! One patient's record, as the doctor sees it: six tabs.

use anyhow::Result;
use inquire::{Select, Text};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

use super::{Env, Menu, MenuExit, MENU_EXIT, MENU_LOOP};
use crate::api::PatientCollection;
use crate::models::{
    Allergy, AllergySeverity, DemographicsForm, HistoryItem, Keyed, MealTiming, NewAllergy,
    NewHistoryItem, NewPrescription, Prescription,
};
use crate::views::{
    AllergiesView, CollectionView, HistoriesView, PatientDetailsView, PrescriptionsView,
    VitalsView,
};

pub(super) struct RecordMenu {
    env: Env,
    details: PatientDetailsView,
    prescriptions: PrescriptionsView,
    vitals: VitalsView,
    histories: HistoriesView,
    allergies: AllergiesView,
}

impl RecordMenu {
    pub(super) fn new(env: Env, patient_id: &str) -> Self {
        let ctx = env.ctx.clone();
        Self {
            details: PatientDetailsView::new(ctx.clone(), patient_id),
            prescriptions: PrescriptionsView::new(ctx.clone(), patient_id),
            vitals: VitalsView::new(ctx.clone(), patient_id),
            histories: HistoriesView::new(ctx.clone(), patient_id),
            allergies: AllergiesView::new(ctx, patient_id),
            env,
        }
    }

    fn personal_tab(&mut self) -> Result<()> {
        self.env.rt.block_on(self.details.load());
        if !show_details(&self.details) {
            return Ok(());
        }

        let edit = Select::new("", vec!["Edit", "Back"]).prompt()?;
        if edit == "Edit" {
            let current = self.details.demographics_form();
            let form = DemographicsForm {
                age: Text::new("Age:").with_initial_value(&current.age).prompt()?,
                gender: Text::new("Gender:").with_initial_value(&current.gender).prompt()?,
                blood_group: Text::new("Blood group:")
                    .with_initial_value(&current.blood_group)
                    .prompt()?,
                primary_contact: Text::new("Contact number:")
                    .with_initial_value(&current.primary_contact)
                    .prompt()?,
                emergency_contact: Text::new("Emergency contact:")
                    .with_initial_value(&current.emergency_contact)
                    .prompt()?,
            };
            self.env.rt.block_on(self.details.update_demographics(&form));
        }
        Ok(())
    }

    fn treatment_tab(&mut self) -> Result<()> {
        self.env.rt.block_on(self.details.load());
        let Some(record) = self.details.record() else {
            print_error(self.details.remote().error());
            return Ok(());
        };

        let treatment = record.treatment();
        let current = if treatment.current_diagnosis.is_empty() {
            "Not set".to_string()
        } else {
            treatment.current_diagnosis.clone()
        };
        println!("Current diagnosis: {current}");
        if let Some(ts) = treatment.last_updated {
            println!("Last updated: {}", ts.format("%B %-d, %Y %H:%M"));
        }

        if Select::new("", vec!["Update diagnosis", "Back"]).prompt()? == "Update diagnosis" {
            let diagnosis = Text::new("Current diagnosis:")
                .with_initial_value(&treatment.current_diagnosis)
                .prompt()?;
            self.env.rt.block_on(self.details.update_treatment(&diagnosis));
        }
        Ok(())
    }
}

impl Menu for RecordMenu {
    fn enter(&mut self) -> Result<MenuExit> {
        #[derive(EnumIter, Display)]
        enum Tab {
            #[strum(serialize = "Personal information")]
            Personal,
            Prescriptions,
            Vitals,
            Treatment,
            #[strum(serialize = "Medical history")]
            Histories,
            Allergies,
            Back,
        }

        if !self.env.still_signed_in() {
            return Ok(MENU_EXIT);
        }

        let tab = Select::new(
            &format!("Patient {}", self.details.patient_id()),
            Tab::iter().collect(),
        )
        .prompt()?;

        match tab {
            Tab::Personal => self.personal_tab()?,
            Tab::Prescriptions => {
                collection_tab(&self.env, &mut self.prescriptions, prescription_line, prescription_draft)?
            }
            Tab::Vitals => {
                self.env.rt.block_on(self.vitals.load());
                show_vitals(&self.vitals);
            }
            Tab::Treatment => self.treatment_tab()?,
            Tab::Histories => {
                collection_tab(&self.env, &mut self.histories, history_line, history_draft)?
            }
            Tab::Allergies => {
                collection_tab(&self.env, &mut self.allergies, allergy_line, allergy_draft)?
            }
            Tab::Back => return Ok(MENU_EXIT),
        }
        Ok(MENU_LOOP)
    }
}

// ═══════════════════════════════════════════════════════════
// Shared rendering (also used by the patient dashboard)
// ═══════════════════════════════════════════════════════════

pub(super) fn print_error(error: Option<&str>) {
    if let Some(message) = error {
        println!("{message}");
    }
}

/// Print the demographic rows; `false` if there is nothing to show.
pub(super) fn show_details(view: &PatientDetailsView) -> bool {
    let Some(record) = view.record() else {
        print_error(view.remote().error());
        return false;
    };
    for (label, value) in record.demographic_rows() {
        println!("  {label:<18} {value}");
    }
    true
}

pub(super) fn show_vitals(view: &VitalsView) {
    if view.remote().error().is_some() {
        print_error(view.remote().error());
        return;
    }
    let recent = view.recent();
    if recent.is_empty() {
        println!("No vitals recorded yet.");
    }
    for metric in &recent {
        let when = metric
            .recorded_at
            .map(|ts| ts.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        println!("  {when:<12} BP {:<16} Sugar {} mg/dL", metric.blood_pressure, metric.sugar);
    }
    println!("Last updated: {}", view.last_updated());
}

pub(super) fn history_line(item: &HistoryItem) -> String {
    match &item.year {
        Some(year) => format!("{} ({year})", item.condition),
        None => item.condition.clone(),
    }
}

fn prescription_line(rx: &Prescription) -> String {
    let mut line = format!("{} {} | {}", rx.medicine, rx.dosage, rx.schedule_label());
    if !rx.times.is_empty() {
        line.push_str(&format!(" at {}", rx.times.join(", ")));
    }
    if let Some(instructions) = rx.instructions.as_deref().filter(|i| !i.is_empty()) {
        line.push_str(&format!(" | {instructions}"));
    }
    line
}

fn allergy_line(allergy: &Allergy) -> String {
    format!("{} [{}]", allergy.name, allergy.severity)
}

// ═══════════════════════════════════════════════════════════
// Collection tabs
// ═══════════════════════════════════════════════════════════

fn collection_tab<C: PatientCollection>(
    env: &Env,
    view: &mut CollectionView<C>,
    line: fn(&C::Item) -> String,
    draft: fn() -> Result<C::Draft>,
) -> Result<()> {
    env.rt.block_on(view.load());
    if let Some(message) = view.remote().error() {
        println!("{message}");
        return Ok(());
    }

    if view.items().is_empty() {
        println!("No {} recorded.", C::NOUN);
    }
    for item in view.items() {
        println!("  - {}", line(item));
    }

    let add = format!("Add {}", C::NOUN);
    let delete = format!("Delete {}", C::NOUN);
    let mut actions = vec![add.clone()];
    if !view.items().is_empty() {
        actions.push(delete.clone());
    }
    actions.push("Back".to_string());

    let action = Select::new("", actions).prompt()?;
    if action == add {
        let draft = draft()?;
        env.rt.block_on(view.add(&draft));
    } else if action == delete {
        let labels: Vec<String> = view.items().iter().map(line).collect();
        let picked = Select::new("Which one?", labels).raw_prompt()?;
        let key = view.items()[picked.index].key().to_string();
        env.rt.block_on(view.delete(&key));
    }
    Ok(())
}

fn prescription_draft() -> Result<NewPrescription> {
    let mut draft = NewPrescription {
        medicine: Text::new("Medicine:").prompt()?,
        dosage: Text::new("Dosage:").prompt()?,
        timing: Select::new("Timing:", MealTiming::ALL.to_vec())
            .with_starting_cursor(1)
            .prompt()?,
        frequency: Text::new("Times per day:")
            .with_default("1")
            .prompt()?
            .trim()
            .parse()
            .unwrap_or(0),
        instructions: Text::new("Instructions (optional):").prompt()?,
        ..NewPrescription::default()
    };

    let times = Text::new("Administration times (HH:MM, comma separated):").prompt()?;
    let slots = times.split(',').map(str::trim).filter(|t| !t.is_empty());
    for (index, time) in slots.enumerate() {
        if index > 0 {
            draft.add_time();
        }
        draft.set_time(index, time);
    }
    Ok(draft)
}

fn history_draft() -> Result<NewHistoryItem> {
    let condition = Text::new("Condition:").prompt()?;
    let year = Text::new("Year (optional):").prompt()?;
    Ok(NewHistoryItem {
        condition,
        year: Some(year.trim().to_string()).filter(|y| !y.is_empty()),
    })
}

fn allergy_draft() -> Result<NewAllergy> {
    Ok(NewAllergy {
        name: Text::new("Allergy:").prompt()?,
        severity: Select::new("Severity:", AllergySeverity::ALL.to_vec()).prompt()?,
    })
}
