//! Federation store backed by SeaORM.

use std::marker::PhantomData;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use super::entities::federation::{self, ActiveModel, Entity as FederationEntity, Model};
use super::insert_error;
use portal_domain::{DomainError, DomainResult, FederationDescriptor, FederationRepository};

/// Stores one federation kind `D` in the shared `federations` table.
///
/// Rows of other kinds are invisible through this store. Delete is soft.
pub struct DbFederationStore<D> {
    db: DatabaseConnection,
    _kind: PhantomData<fn() -> D>,
}

impl<D: FederationDescriptor> DbFederationStore<D> {
    /// Create new store instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            _kind: PhantomData,
        }
    }

    fn decode(model: Model) -> DomainResult<D> {
        serde_json::from_str(&model.payload).map_err(|e| {
            DomainError::persistence(format!("federation {} payload unreadable: {}", model.uuid, e))
        })
    }

    fn not_found(uuid: &str) -> DomainError {
        DomainError::not_found(format!("{} federation {}", D::KIND, uuid))
    }
}

#[async_trait]
impl<D: FederationDescriptor> FederationRepository<D> for DbFederationStore<D> {
    async fn create(&self, descriptor: &D) -> DomainResult<()> {
        let uuid = descriptor.identifier();

        // Soft-deleted rows still hold their identifier
        let existing = FederationEntity::find()
            .filter(federation::Column::Uuid.eq(uuid))
            .one(&self.db)
            .await
            .map_err(DomainError::persistence)?;
        if existing.is_some() {
            return Err(DomainError::duplicate(format!("federation {}", uuid)));
        }

        let payload = serde_json::to_string(descriptor).map_err(DomainError::persistence)?;
        let info = descriptor.info();
        let active_model = ActiveModel {
            uuid: Set(uuid.to_string()),
            kind: Set(D::KIND.as_str().to_string()),
            name: Set(info.name.clone()),
            payload: Set(payload),
            created_at: Set(info.created_at),
            updated_at: Set(info.updated_at),
            deleted_at: Set(None),
            ..Default::default()
        };

        active_model
            .insert(&self.db)
            .await
            .map_err(|e| insert_error(e, format!("federation {}", uuid)))?;
        tracing::debug!(kind = %D::KIND, uuid = %uuid, "Federation row inserted");
        Ok(())
    }

    async fn list(&self) -> DomainResult<Vec<D>> {
        FederationEntity::find()
            .filter(federation::Column::Kind.eq(D::KIND.as_str()))
            .filter(federation::Column::DeletedAt.is_null())
            .all(&self.db)
            .await
            .map_err(DomainError::persistence)?
            .into_iter()
            .map(Self::decode)
            .collect()
    }

    async fn delete_by_uuid(&self, uuid: &str) -> DomainResult<()> {
        let now = Utc::now();
        let result = FederationEntity::update_many()
            .col_expr(federation::Column::DeletedAt, Expr::value(Some(now)))
            .col_expr(federation::Column::UpdatedAt, Expr::value(now))
            .filter(federation::Column::Uuid.eq(uuid))
            .filter(federation::Column::Kind.eq(D::KIND.as_str()))
            .filter(federation::Column::DeletedAt.is_null())
            .exec(&self.db)
            .await
            .map_err(DomainError::persistence)?;

        if result.rows_affected == 0 {
            return Err(Self::not_found(uuid));
        }
        tracing::debug!(kind = %D::KIND, uuid = %uuid, "Federation soft deleted");
        Ok(())
    }

    async fn get_by_uuid(&self, uuid: &str) -> DomainResult<D> {
        let model = FederationEntity::find()
            .filter(federation::Column::Uuid.eq(uuid))
            .filter(federation::Column::Kind.eq(D::KIND.as_str()))
            .filter(federation::Column::DeletedAt.is_null())
            .one(&self.db)
            .await
            .map_err(DomainError::persistence)?
            .ok_or_else(|| Self::not_found(uuid))?;

        Self::decode(model)
    }
}
