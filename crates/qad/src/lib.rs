//! Letti QA service crate: orchestration, CLI reporting and setup.

pub mod logging;
pub mod report;
pub mod service;
pub mod setup;

pub use logging::*;
pub use service::*;
pub use setup::*;

#[cfg(test)]
mod tests {
    use super::{
        init_logging, needs_first_run, probe_setup, AddOutcome, CheckReport, GeneratedSuite,
        QaService, ServiceError, SetupReport, TestFile,
    };
    use std::any::TypeId;

    #[test]
    fn crate_root_reexports_types() {
        let _ = TypeId::of::<QaService>();
        let _ = TypeId::of::<ServiceError>();
        let _ = TypeId::of::<AddOutcome>();
        let _ = TypeId::of::<GeneratedSuite>();
        let _ = TypeId::of::<CheckReport>();
        let _ = TypeId::of::<TestFile>();
        let _ = TypeId::of::<SetupReport>();
    }

    #[test]
    fn crate_root_reexports_helpers() {
        let _init = init_logging;
        let _probe = probe_setup;
        let _first_run = needs_first_run;
    }
}
