use qa_core::config::QaConfig;
use qad::{QaService, ServiceError};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Clone)]
pub struct WebState {
    service: Arc<QaService>,
    public_dir: PathBuf,
}

impl WebState {
    pub fn new(service: QaService, public_dir: impl Into<PathBuf>) -> Self {
        Self {
            service: Arc::new(service),
            public_dir: public_dir.into(),
        }
    }

    pub fn from_config(config: &QaConfig) -> Result<Self, ServiceError> {
        Ok(Self::new(
            QaService::from_config(config)?,
            &config.web.public_dir,
        ))
    }

    pub fn service(&self) -> &QaService {
        &self.service
    }

    pub fn public_dir(&self) -> &Path {
        &self.public_dir
    }
}
