//! Core of the clinic administration front-end: paginated entity lists, form
//! state and validation, and the create/edit/delete orchestration that sits
//! between a REST backend and whatever surface renders it.

pub mod controller;
pub mod form;
pub mod gateway;
pub mod notice;
pub mod paginator;
pub mod surface;

pub use controller::{
    ControllerError, ControllerState, DeleteOutcome, EntityListController, SaveOutcome,
};
pub use form::{
    EntityForm, Field, FieldRule, FieldValue, FieldViolation, FormModel, PhysicianForm, SpecialtyForm,
    ValidationErrors,
};
pub use gateway::{EntityGateway, GatewayError, RestGateway};
pub use notice::{Notice, NoticeCategory, NoticeContext};
pub use paginator::{ListPaginator, PageWindow};
pub use surface::{Confirmation, ModalFactory, ModalSurface};

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;
