//! Account store backed by SeaORM, with soft delete support.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, Set,
};

use super::entities::account::{self, permission_columns, ActiveModel, Entity as AccountEntity};
use super::insert_error;
use portal_domain::{
    AccountData, AccountId, AccountStore, DomainError, DomainResult, NewAccount, Password,
    PermissionInfo,
};

/// Concrete implementation of AccountStore.
///
/// Query methods exclude soft-deleted rows. Updates are single statements
/// keyed by primary key.
pub struct DbAccountStore {
    db: DatabaseConnection,
}

impl DbAccountStore {
    /// Create new store instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn live() -> Condition {
        Condition::all().add(account::Column::DeletedAt.is_null())
    }
}

#[async_trait]
impl AccountStore for DbAccountStore {
    async fn load_by_id(&self, id: AccountId) -> DomainResult<AccountData> {
        AccountEntity::find_by_id(id.0)
            .filter(Self::live())
            .one(&self.db)
            .await
            .map_err(DomainError::persistence)?
            .map(AccountData::from)
            .ok_or_else(|| DomainError::not_found(format!("account {}", id)))
    }

    async fn load_by_name(&self, name: &str) -> DomainResult<AccountData> {
        AccountEntity::find()
            .filter(account::Column::Name.eq(name))
            .filter(Self::live())
            .one(&self.db)
            .await
            .map_err(DomainError::persistence)?
            .map(AccountData::from)
            .ok_or_else(|| DomainError::not_found(format!("account {}", name)))
    }

    async fn list(&self) -> DomainResult<Vec<AccountData>> {
        let models = AccountEntity::find()
            .filter(Self::live())
            .all(&self.db)
            .await
            .map_err(DomainError::persistence)?;

        Ok(models.into_iter().map(AccountData::from).collect())
    }

    async fn create(&self, new: NewAccount) -> DomainResult<AccountData> {
        // Names and uuids stay reserved after soft delete
        let taken = AccountEntity::find()
            .filter(
                Condition::any()
                    .add(account::Column::Name.eq(new.name.as_str()))
                    .add(account::Column::Uuid.eq(new.uuid.as_str())),
            )
            .one(&self.db)
            .await
            .map_err(DomainError::persistence)?;
        if let Some(existing) = taken {
            return Err(DomainError::duplicate(format!(
                "account {} / {}",
                existing.name, existing.uuid
            )));
        }

        let identifier = format!("account {}", new.name);
        let (site_portal, fate_board, notebook) = permission_columns(&new.permissions);
        let now = Utc::now();
        let active_model = ActiveModel {
            uuid: Set(new.uuid),
            name: Set(new.name),
            password_hash: Set(new.credential.into_string()),
            site_portal_access: Set(site_portal),
            fate_board_access: Set(fate_board),
            notebook_access: Set(notebook),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
            ..Default::default()
        };

        let model = active_model
            .insert(&self.db)
            .await
            .map_err(|e| insert_error(e, identifier))?;
        tracing::debug!(account_id = model.id, "Account row inserted");
        Ok(AccountData::from(model))
    }

    async fn update_permissions_by_id(
        &self,
        id: AccountId,
        info: &PermissionInfo,
    ) -> DomainResult<()> {
        let (site_portal, fate_board, notebook) = permission_columns(info);
        let result = AccountEntity::update_many()
            .col_expr(account::Column::SitePortalAccess, Expr::value(site_portal))
            .col_expr(account::Column::FateBoardAccess, Expr::value(fate_board))
            .col_expr(account::Column::NotebookAccess, Expr::value(notebook))
            .col_expr(account::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(account::Column::Id.eq(id.0))
            .filter(Self::live())
            .exec(&self.db)
            .await
            .map_err(DomainError::persistence)?;

        if result.rows_affected == 0 {
            return Err(DomainError::persistence(format!("account {} has no live row", id)));
        }
        tracing::debug!(account_id = %id, "Account permissions written");
        Ok(())
    }

    async fn update_password_by_id(
        &self,
        id: AccountId,
        credential: &Password,
    ) -> DomainResult<()> {
        let result = AccountEntity::update_many()
            .col_expr(account::Column::PasswordHash, Expr::value(credential.as_str()))
            .col_expr(account::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(account::Column::Id.eq(id.0))
            .filter(Self::live())
            .exec(&self.db)
            .await
            .map_err(DomainError::persistence)?;

        if result.rows_affected == 0 {
            return Err(DomainError::persistence(format!("account {} has no live row", id)));
        }
        tracing::debug!(account_id = %id, "Account password written");
        Ok(())
    }
}
