//! Category commands.

use esther_core::drafts::CategoryDraft;
use esther_core::{CategoryId, Gender};
use esther_storefront::admin::AdminService;

use super::CliError;

pub async fn add(admin: &AdminService, name: String, gender: Gender) -> Result<(), CliError> {
    let category = admin.add_category(CategoryDraft { name, gender }).await?;
    tracing::info!("Created category {} ({})", category.name, category.id);
    Ok(())
}

/// Products keep pointing at the deleted id until edited.
pub async fn delete(admin: &AdminService, id: &str) -> Result<(), CliError> {
    admin.delete_category(&CategoryId::new(id)).await?;
    Ok(())
}
