use std::{num::NonZeroUsize, sync::Arc};

use shared::domain::Resource;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::{
    form::{EntityForm, FormModel, ValidationErrors},
    gateway::{EntityGateway, GatewayError},
    notice::{Notice, NoticeContext},
    paginator::{ListPaginator, PageWindow},
    surface::{Confirmation, ModalFactory, ModalSurface},
};

type RecordId<F> = <<F as EntityForm>::Record as Resource>::Id;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    Loading,
    FormOpenCreate,
    FormOpenEdit,
    Saving,
    Error,
}

impl ControllerState {
    pub fn is_form_open(self) -> bool {
        matches!(self, Self::FormOpenCreate | Self::FormOpenEdit)
    }
}

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("failed to load {entity} list: {source}")]
    List {
        entity: &'static str,
        #[source]
        source: GatewayError,
    },
    #[error("failed to load {entity} lookup: {source}")]
    Lookup {
        entity: &'static str,
        #[source]
        source: GatewayError,
    },
    #[error("failed to fetch {entity} {id}: {source}")]
    Fetch {
        entity: &'static str,
        id: String,
        #[source]
        source: GatewayError,
    },
    #[error("{message}")]
    Save {
        message: String,
        #[source]
        source: GatewayError,
    },
    #[error("failed to delete {entity} {id}: {source}")]
    Delete {
        entity: &'static str,
        id: String,
        #[source]
        source: GatewayError,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome<R> {
    Saved(R),
    /// Rule violations blocked submission; nothing was sent.
    Invalid(ValidationErrors),
    /// No create/edit form was open.
    FormClosed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Declined,
}

/// List/create/edit/delete workflow for one entity type.
///
/// The controller owns the full collection and replaces it wholesale after
/// every successful mutation. Responses are applied in the order they
/// resolve.
pub struct EntityListController<F: EntityForm> {
    gateway: Arc<dyn EntityGateway<F::Record>>,
    lookup_gateway: Option<Arc<dyn EntityGateway<F::Lookup>>>,
    modals: Arc<dyn ModalFactory>,
    confirmation: Arc<dyn Confirmation>,
    state: ControllerState,
    records: Vec<F::Record>,
    lookup: Vec<F::Lookup>,
    paginator: Option<ListPaginator>,
    form: FormModel<F>,
    edit_id: Option<RecordId<F>>,
    modal: Option<Box<dyn ModalSurface>>,
    notice: Option<Notice>,
}

impl<F: EntityForm> EntityListController<F> {
    pub fn new(
        gateway: Arc<dyn EntityGateway<F::Record>>,
        modals: Arc<dyn ModalFactory>,
        confirmation: Arc<dyn Confirmation>,
    ) -> Self {
        Self {
            gateway,
            lookup_gateway: None,
            modals,
            confirmation,
            state: ControllerState::Loading,
            records: Vec::new(),
            lookup: Vec::new(),
            paginator: None,
            form: FormModel::default(),
            edit_id: None,
            modal: None,
            notice: None,
        }
    }

    pub fn with_pagination(mut self, page_size: NonZeroUsize) -> Self {
        self.paginator = Some(ListPaginator::new(page_size));
        self
    }

    pub fn with_lookup(mut self, gateway: Arc<dyn EntityGateway<F::Lookup>>) -> Self {
        self.lookup_gateway = Some(gateway);
        self
    }

    /// Initial load: the collection, then the lookup used by the form.
    pub async fn init(&mut self) -> Result<(), ControllerError> {
        self.list().await?;
        self.refresh_lookup().await
    }

    pub async fn list(&mut self) -> Result<(), ControllerError> {
        self.state = ControllerState::Loading;
        match self.gateway.list().await {
            Ok(records) => {
                info!(entity = F::Record::NAME, count = records.len(), "loaded list");
                self.records = records;
                if let Some(paginator) = self.paginator.as_mut() {
                    paginator.refresh(self.records.len());
                }
                self.state = ControllerState::Idle;
                Ok(())
            }
            Err(source) => {
                error!(entity = F::Record::NAME, error = %source, "list failed; keeping previous data");
                self.notice = Some(Notice::from_api_error(
                    NoticeContext::List,
                    &source.to_api_error(),
                ));
                self.state = ControllerState::Error;
                Err(ControllerError::List {
                    entity: F::Record::NAME,
                    source,
                })
            }
        }
    }

    pub async fn refresh_lookup(&mut self) -> Result<(), ControllerError> {
        let Some(gateway) = self.lookup_gateway.clone() else {
            return Ok(());
        };
        match gateway.list().await {
            Ok(lookup) => {
                debug!(entity = F::Lookup::NAME, count = lookup.len(), "loaded lookup");
                self.lookup = lookup;
                Ok(())
            }
            Err(source) => {
                warn!(entity = F::Lookup::NAME, error = %source, "lookup refresh failed; keeping previous lookup");
                self.notice = Some(Notice::from_api_error(
                    NoticeContext::Lookup,
                    &source.to_api_error(),
                ));
                Err(ControllerError::Lookup {
                    entity: F::Lookup::NAME,
                    source,
                })
            }
        }
    }

    pub async fn fetch(&mut self, id: RecordId<F>) -> Result<F::Record, ControllerError> {
        self.gateway.get(id).await.map_err(|source| {
            self.notice = Some(Notice::from_api_error(
                NoticeContext::Fetch,
                &source.to_api_error(),
            ));
            ControllerError::Fetch {
                entity: F::Record::NAME,
                id: id.to_string(),
                source,
            }
        })
    }

    pub fn open_create(&mut self) {
        self.form.reset();
        self.edit_id = None;
        self.state = ControllerState::FormOpenCreate;
        self.show_modal(F::CREATE_TITLE);
    }

    /// Records without a server id cannot be updated and are ignored.
    pub fn open_edit(&mut self, record: &F::Record) {
        let Some(id) = record.id() else {
            warn!(entity = F::Record::NAME, "ignoring edit of a record without an id");
            return;
        };
        self.form.patch(record);
        self.edit_id = Some(id);
        self.state = ControllerState::FormOpenEdit;
        self.show_modal(F::EDIT_TITLE);
    }

    pub async fn save(&mut self) -> Result<SaveOutcome<F::Record>, ControllerError> {
        let form_state = self.state;
        if !form_state.is_form_open() {
            return Ok(SaveOutcome::FormClosed);
        }
        let errors = self.form.validate();
        if !errors.is_empty() {
            debug!(entity = F::Record::NAME, %errors, "form invalid; not submitting");
            return Ok(SaveOutcome::Invalid(errors));
        }

        self.state = ControllerState::Saving;
        let dto = self.form.values().build_dto(self.edit_id, &self.lookup);
        let result = match self.edit_id {
            Some(id) => self.gateway.update(id, &dto).await,
            None => self.gateway.create(&dto).await,
        };

        match result {
            Ok(saved) => {
                info!(entity = F::Record::NAME, id = ?saved.id(), "saved");
                self.hide_modal();
                self.notice = None;
                // A failed re-list is recorded on the controller; the save stands.
                let _ = self.list().await;
                Ok(SaveOutcome::Saved(saved))
            }
            Err(source) => {
                error!(entity = F::Record::NAME, error = %source, "save failed");
                let message = format!("{} ({source})", F::SAVE_FAILURE);
                self.notice = Some(Notice::new(NoticeContext::Save, source.code(), &message));
                self.state = form_state;
                Err(ControllerError::Save {
                    message: F::SAVE_FAILURE.to_string(),
                    source,
                })
            }
        }
    }

    /// Asks for confirmation, then deletes. The id is not checked against the
    /// loaded collection.
    pub async fn delete(&mut self, id: RecordId<F>) -> Result<DeleteOutcome, ControllerError> {
        if !self.confirmation.confirm(F::DELETE_PROMPT).await {
            debug!(entity = F::Record::NAME, %id, "delete declined");
            return Ok(DeleteOutcome::Declined);
        }

        if let Err(source) = self.gateway.delete(id).await {
            error!(entity = F::Record::NAME, %id, error = %source, "delete failed");
            self.notice = Some(Notice::from_api_error(
                NoticeContext::Delete,
                &source.to_api_error(),
            ));
            return Err(ControllerError::Delete {
                entity: F::Record::NAME,
                id: id.to_string(),
                source,
            });
        }

        info!(entity = F::Record::NAME, %id, "deleted");
        // As with save, a failed re-list is recorded on the controller.
        let _ = self.list().await;
        Ok(DeleteOutcome::Deleted)
    }

    pub fn go_to_page(&mut self, page: usize) -> bool {
        self.paginator
            .as_mut()
            .is_some_and(|paginator| paginator.go_to_page(page))
    }

    pub fn next_page(&mut self) -> bool {
        self.paginator.as_mut().is_some_and(ListPaginator::next)
    }

    pub fn previous_page(&mut self) -> bool {
        self.paginator.as_mut().is_some_and(ListPaginator::previous)
    }

    /// The current page, or the full collection when the list is unpaginated.
    pub fn visible(&self) -> &[F::Record] {
        match &self.paginator {
            Some(paginator) => paginator.visible(&self.records),
            None => &self.records,
        }
    }

    pub fn page_window(&self) -> Option<PageWindow> {
        self.paginator.as_ref().map(ListPaginator::window)
    }

    pub fn records(&self) -> &[F::Record] {
        &self.records
    }

    pub fn find(&self, id: RecordId<F>) -> Option<&F::Record> {
        self.records.iter().find(|record| record.id() == Some(id))
    }

    pub fn lookup(&self) -> &[F::Lookup] {
        &self.lookup
    }

    pub fn form(&self) -> &FormModel<F> {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut FormModel<F> {
        &mut self.form
    }

    pub fn edit_id(&self) -> Option<RecordId<F>> {
        self.edit_id
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn is_modal_open(&self) -> bool {
        self.modal.is_some()
    }

    fn show_modal(&mut self, title: &str) {
        self.hide_modal();
        let mut surface = self.modals.build();
        surface.show(title);
        self.modal = Some(surface);
    }

    fn hide_modal(&mut self) {
        if let Some(mut surface) = self.modal.take() {
            surface.hide();
        }
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
