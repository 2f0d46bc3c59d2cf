use async_trait::async_trait;

use crate::application::errors::BotError;
use crate::domain::entities::CommandData;

/// RestApi trait - the platform's REST surface used by the application
#[async_trait]
pub trait RestApi: Send + Sync {
    /// Replace every global command of the application in one call
    async fn bulk_overwrite_global_commands(
        &self,
        token: &str,
        application_id: &str,
        commands: &[CommandData],
    ) -> Result<(), BotError>;
}
