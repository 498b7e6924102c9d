use crate::cli::command_handlers::{QueryHandler, ServersHandler};
use crate::cli::main_types::Commands;
use labkey_core::error::AppError;
use labkey_core::storage::config::ConfigDocument;
use labkey_core::InstanceRegistry;
use std::path::PathBuf;

pub struct Dispatcher {
    config_path: Option<PathBuf>,
}

impl Dispatcher {
    pub fn new(config_path: Option<String>) -> Self {
        Self {
            config_path: config_path.filter(|p| !p.is_empty()).map(PathBuf::from),
        }
    }

    fn load_registry(&self) -> Result<InstanceRegistry, AppError> {
        let document = ConfigDocument::load(self.config_path.clone())?;
        log::debug!(
            "Loaded config with {} server entries",
            document.servers.len()
        );
        InstanceRegistry::from_document(&document)
    }

    pub async fn dispatch(&self, command: Commands) -> Result<(), AppError> {
        let registry = self.load_registry()?;

        match command {
            Commands::Servers => ServersHandler::new().handle(&registry),
            Commands::Query(args) => QueryHandler::new().handle(args, registry).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_path_falls_back_to_default() {
        assert!(Dispatcher::new(Some(String::new())).config_path.is_none());
        assert_eq!(
            Dispatcher::new(Some("/tmp/c.yml".to_string())).config_path,
            Some(PathBuf::from("/tmp/c.yml"))
        );
    }

    #[tokio::test]
    async fn test_missing_config_file_is_storage_error() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = temp_dir.path().join("missing.yml");
        let dispatcher = Dispatcher::new(Some(path.to_string_lossy().to_string()));

        let result = dispatcher.dispatch(Commands::Servers).await;
        assert!(matches!(result, Err(AppError::Storage(_))));
    }
}
