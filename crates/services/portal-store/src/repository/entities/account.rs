//! Account database entity for SeaORM.

use sea_orm::entity::prelude::*;

use portal_domain::{AccountData, AccountId, Capability, Password, PermissionInfo};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub uuid: String,
    #[sea_orm(unique)]
    pub name: String,
    pub password_hash: String,
    pub site_portal_access: bool,
    pub fate_board_access: bool,
    pub notebook_access: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    /// Soft delete timestamp (NULL = active, set = deleted)
    pub deleted_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Permission columns in table order: site portal, FATE board, notebook.
pub(crate) fn permission_columns(info: &PermissionInfo) -> (bool, bool, bool) {
    (
        info.is_granted(Capability::SitePortal),
        info.is_granted(Capability::FateBoard),
        info.is_granted(Capability::Notebook),
    )
}

/// Convert database model to domain data
impl From<Model> for AccountData {
    fn from(model: Model) -> Self {
        AccountData {
            id: AccountId(model.id),
            uuid: model.uuid,
            name: model.name,
            credential: Password::from_hash(model.password_hash),
            permissions: PermissionInfo::from_grants([
                (Capability::SitePortal, model.site_portal_access),
                (Capability::FateBoard, model.fate_board_access),
                (Capability::Notebook, model.notebook_access),
            ]),
            created_at: model.created_at,
            updated_at: model.updated_at,
            deleted_at: model.deleted_at,
        }
    }
}
