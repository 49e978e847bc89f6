pub mod config;
pub mod driver;
pub mod element;
pub mod error;
pub mod page;
pub mod pipeline;
pub mod record;
pub mod registry;
pub mod report;
pub mod session;

pub use config::{SessionConfig, SessionConfigBuilder};
pub use driver::FormDriver;
pub use error::{Error, Result};
pub use pipeline::{fill_form, FillPipeline};
pub use record::{FieldValue, FormRecord};
pub use registry::{FieldKind, FieldMapping, FieldRegistry};
pub use report::{FieldOutcome, FieldStatus, FillReport};
pub use session::{Session, SessionManager};
