//! Prescriptions, medical history and allergies tabs.
//!
//! The three tabs behave identically apart from their route and
//! wording, so one generic view serves all of them.

use std::marker::PhantomData;

use crate::api::{Allergies, Histories, PatientCollection, Prescriptions};
use crate::models::Keyed;
use crate::remote::RemoteCollection;
use crate::validation::Validate;

use super::ViewContext;

pub struct CollectionView<C: PatientCollection> {
    ctx: ViewContext,
    patient_id: String,
    items: RemoteCollection<C::Item>,
    _collection: PhantomData<C>,
}

pub type PrescriptionsView = CollectionView<Prescriptions>;
pub type HistoriesView = CollectionView<Histories>;
pub type AllergiesView = CollectionView<Allergies>;

impl<C: PatientCollection> CollectionView<C> {
    pub fn new(ctx: ViewContext, patient_id: &str) -> Self {
        Self {
            ctx,
            patient_id: patient_id.to_string(),
            items: RemoteCollection::new(),
            _collection: PhantomData,
        }
    }

    pub fn patient_id(&self) -> &str {
        &self.patient_id
    }

    pub fn remote(&self) -> &RemoteCollection<C::Item> {
        &self.items
    }

    /// Items to display; empty while loading or after a failed read.
    pub fn items(&self) -> &[C::Item] {
        self.items.items()
    }

    /// Point the view at another patient and reload.
    pub async fn set_patient(&mut self, patient_id: &str) {
        if self.patient_id != patient_id {
            self.patient_id = patient_id.to_string();
            self.load().await;
        }
    }

    pub async fn load(&mut self) {
        let ticket = self.items.begin_reload(&self.patient_id);
        let result = self.ctx.client().list::<C>(ticket.owner()).await;
        if let Err(e) = &result {
            self.ctx.notice(e);
        }
        self.items.complete_reload(ticket, result, C::FETCH_ERROR);
    }

    /// Validate and submit `draft`; on success the created item is
    /// appended locally. Returns whether it was added.
    pub async fn add(&mut self, draft: &C::Draft) -> bool {
        if let Err(e) = draft.validate() {
            self.ctx.fail(&e, "");
            return false;
        }

        match self.ctx.client().create::<C>(&self.patient_id, draft).await {
            Ok(item) => {
                tracing::info!(patient_id = %self.patient_id, collection = C::SEGMENT, id = %item.key(), "Item added");
                self.items.push(item);
                self.ctx.alert(&format!("{} added successfully.", C::TITLE));
                true
            }
            Err(e) => {
                self.ctx.fail(&e, &format!("Failed to add {}.", C::NOUN));
                false
            }
        }
    }

    /// Ask for confirmation, then delete `item_id` and drop exactly that
    /// item from the local list.
    pub async fn delete(&mut self, item_id: &str) -> bool {
        if !self
            .ctx
            .confirm(&format!("Are you sure you want to delete this {}?", C::NOUN))
        {
            return false;
        }

        match self.ctx.client().remove::<C>(&self.patient_id, item_id).await {
            Ok(()) => {
                tracing::info!(patient_id = %self.patient_id, collection = C::SEGMENT, id = %item_id, "Item deleted");
                self.items.remove(item_id);
                self.ctx.alert(&format!("{} deleted successfully.", C::TITLE));
                true
            }
            Err(e) => {
                self.ctx.fail(&e, &format!("Failed to delete {}.", C::NOUN));
                false
            }
        }
    }
}
