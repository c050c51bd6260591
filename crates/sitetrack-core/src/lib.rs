pub mod building;
pub mod design_form;
pub mod error;
pub mod location;
pub mod project;
pub mod session;
pub mod step;

pub use building::{Building, Level};
pub use design_form::{CreateDesignForm, DesignForm, FormImage, UpdateDesignForm};
pub use error::CoreError;
pub use location::LocationSnapshot;
pub use project::Project;
pub use session::SessionValidity;
pub use step::{StepDescriptor, StepKind};
