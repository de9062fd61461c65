use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
    QueryTrait, Set, TransactionTrait,
};
use serde_json::{json, Value};
use tracing::{error, info, instrument, warn};

use crate::entity::issue::{self, Entity as IssueEntity};
use crate::entity::issue_partner::{self, Entity as IssuePartnerEntity};
use crate::entity::partner_project::{self, Entity as PartnerProjectEntity};
use crate::entity::project::Entity as ProjectEntity;
use crate::entity::user::{self, Entity as UserEntity};
use crate::history;
use crate::model::partner::{IssuePartner, PartnerDetails, PartnerSelection, PartnerSummary};

use super::backend::{Access, Feature, IssueSection, PartnerBackend};
use super::error::PartnerError;
use super::registry::PartnerRegistry;

const PARTNER_ADDED_SUMMARY: &str = "Partner '{partner}' added to issue by {user}";
const PARTNER_REMOVED_SUMMARY: &str = "Partner '{partner}' removed from issue by {user}";

/// 파트너와 프로젝트/이슈 연결을 관리하고 이슈 이벤트를 파트너 백엔드로 전달한다.
///
/// 조회 실패는 빈 결과로 처리하고 에러 로그를 남긴다. 변경 작업은 하나의 트랜잭션으로 묶는다.
#[derive(Clone)]
pub struct PartnerService {
    db: DatabaseConnection,
    registry: Arc<PartnerRegistry>,
}

impl PartnerService {
    pub fn new(db: DatabaseConnection, registry: Arc<PartnerRegistry>) -> Self {
        Self { db, registry }
    }

    pub fn registry(&self) -> &PartnerRegistry {
        &self.registry
    }

    pub fn backend_list(&self) -> Vec<String> {
        self.registry.backend_list()
    }

    pub fn name(&self, par_code: &str) -> Result<String, PartnerError> {
        Ok(self.registry.backend(par_code)?.name().to_string())
    }

    pub async fn issue_message(&self, par_code: &str, issue_id: i32) -> Result<Option<String>, PartnerError> {
        Ok(self.registry.backend(par_code)?.issue_message(issue_id).await)
    }

    pub async fn details(&self, par_code: &str) -> Result<PartnerDetails, PartnerError> {
        Ok(PartnerDetails {
            code: par_code.to_string(),
            name: self.name(par_code)?,
            projects: self.projects_for_partner(par_code).await,
        })
    }

    pub async fn list(&self) -> Result<Vec<PartnerDetails>, PartnerError> {
        let mut partners = Vec::new();
        for par_code in self.backend_list() {
            partners.push(self.details(&par_code).await?);
        }
        Ok(partners)
    }

    pub async fn assoc_list(&self) -> Result<BTreeMap<String, String>, PartnerError> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .map(|partner| (partner.code, partner.name))
            .collect())
    }

    pub async fn partners_by_project(&self, project_id: i32) -> Result<BTreeMap<String, PartnerSummary>, PartnerError> {
        let codes = PartnerProjectEntity::find()
            .select_only()
            .column(partner_project::Column::ParCode)
            .filter(partner_project::Column::ProjectId.eq(project_id))
            .order_by_asc(partner_project::Column::ParCode)
            .into_tuple::<String>()
            .all(&self.db)
            .await
            .unwrap_or_else(|err| {
                error!(project_id, error = %err, "프로젝트 파트너 조회 실패");
                Vec::new()
            });

        let mut partners = BTreeMap::new();
        for par_code in codes {
            let name = self.name(&par_code)?;
            partners.insert(par_code, PartnerSummary { name });
        }
        Ok(partners)
    }

    pub async fn projects_for_partner(&self, par_code: &str) -> BTreeMap<i32, String> {
        let rows = PartnerProjectEntity::find()
            .filter(partner_project::Column::ParCode.eq(par_code))
            .find_also_related(ProjectEntity)
            .all(&self.db)
            .await;

        match rows {
            Ok(rows) => rows
                .into_iter()
                .filter_map(|(link, project)| project.map(|project| (link.project_id, project.name)))
                .collect(),
            Err(err) => {
                error!(par_code, error = %err, "파트너 프로젝트 조회 실패");
                BTreeMap::new()
            }
        }
    }

    /// 파트너의 프로젝트 목록을 `project_ids` 로 통째로 교체한다.
    #[instrument(skip(self))]
    pub async fn update(&self, par_code: &str, project_ids: &[i32]) -> Result<(), PartnerError> {
        let project_ids: BTreeSet<i32> = project_ids.iter().copied().collect();
        let txn = self.db.begin().await?;

        let result = async {
            PartnerProjectEntity::delete_many()
                .filter(partner_project::Column::ParCode.eq(par_code))
                .exec(&txn)
                .await?;

            if !project_ids.is_empty() {
                let links = project_ids.iter().map(|project_id| partner_project::ActiveModel {
                    par_code: Set(par_code.to_string()),
                    project_id: Set(*project_id),
                });
                PartnerProjectEntity::insert_many(links).exec_without_returning(&txn).await?;
            }
            Ok::<_, DbErr>(())
        }
        .await;

        match result {
            Ok(()) => txn.commit().await?,
            Err(err) => {
                error!(par_code, error = %err, "파트너 프로젝트 변경 실패, 롤백");
                txn.rollback().await.ok();
                return Err(err.into());
            }
        }

        info!(par_code, projects = ?project_ids, "파트너 프로젝트 변경 완료");
        Ok(())
    }

    pub async fn partner_codes_by_issue(&self, issue_id: i32) -> Vec<String> {
        partner_codes_by_issue(&self.db, issue_id).await.unwrap_or_else(|err| {
            error!(issue_id, error = %err, "이슈 파트너 조회 실패");
            Vec::new()
        })
    }

    pub async fn partners_by_issue(&self, issue_id: i32) -> Result<BTreeMap<String, IssuePartner>, PartnerError> {
        let mut partners = BTreeMap::new();
        for par_code in self.partner_codes_by_issue(issue_id).await {
            let backend = self.registry.backend(&par_code)?;
            let partner = IssuePartner {
                name: backend.name().to_string(),
                message: backend.issue_message(issue_id).await,
            };
            partners.insert(par_code, partner);
        }
        Ok(partners)
    }

    pub async fn is_partner_enabled_for_issue(&self, par_code: &str, issue_id: i32) -> bool {
        self.partner_codes_by_issue(issue_id)
            .await
            .iter()
            .any(|code| code == par_code)
    }

    /// 이미 연결되어 있으면 아무 것도 하지 않는다.
    #[instrument(skip(self))]
    pub async fn add_partner_to_issue(&self, issue_id: i32, par_code: &str, actor: i32) -> Result<(), PartnerError> {
        let txn = self.db.begin().await?;

        match self.add_in(&txn, issue_id, par_code, actor).await {
            Ok(added) => {
                txn.commit().await?;
                if added {
                    info!(issue_id, par_code, actor, "이슈에 파트너 추가");
                }
                Ok(())
            }
            Err(err) => {
                warn!(issue_id, par_code, error = %err, "이슈 파트너 추가 실패, 롤백");
                txn.rollback().await.ok();
                Err(err)
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn remove_partner_from_issue(&self, issue_id: i32, par_code: &str, actor: i32) -> Result<(), PartnerError> {
        let txn = self.db.begin().await?;

        match self.remove_in(&txn, issue_id, par_code, actor).await {
            Ok(()) => {
                txn.commit().await?;
                info!(issue_id, par_code, actor, "이슈에서 파트너 제거");
                Ok(())
            }
            Err(err) => {
                warn!(issue_id, par_code, error = %err, "이슈 파트너 제거 실패, 롤백");
                txn.rollback().await.ok();
                Err(err)
            }
        }
    }

    /// 이슈의 파트너 집합을 정확히 `desired` 로 맞춘다. 추가를 먼저, 제거를 나중에 한다.
    #[instrument(skip(self))]
    pub async fn select_partners_for_issue(
        &self,
        issue_id: i32,
        desired: &[String],
        actor: i32,
    ) -> Result<PartnerSelection, PartnerError> {
        let txn = self.db.begin().await?;

        let result = async {
            let current = partner_codes_by_issue(&txn, issue_id).await?;

            let mut wanted: Vec<&str> = Vec::new();
            for code in desired {
                if !wanted.contains(&code.as_str()) {
                    wanted.push(code.as_str());
                }
            }

            let mut selection = PartnerSelection::default();
            for code in &wanted {
                if self.add_in(&txn, issue_id, code, actor).await? {
                    selection.added.push(code.to_string());
                }
            }
            for code in current.iter().filter(|code| !wanted.contains(&code.as_str())) {
                self.remove_in(&txn, issue_id, code, actor).await?;
                selection.removed.push(code.clone());
            }
            Ok::<_, PartnerError>(selection)
        }
        .await;

        match result {
            Ok(selection) => {
                txn.commit().await?;
                info!(issue_id, added = ?selection.added, removed = ?selection.removed, "이슈 파트너 재지정");
                Ok(selection)
            }
            Err(err) => {
                warn!(issue_id, error = %err, "이슈 파트너 재지정 실패, 롤백");
                txn.rollback().await.ok();
                Err(err)
            }
        }
    }

    pub async fn handle_new_email(&self, issue_id: i32, email_id: i32) -> Result<(), PartnerError> {
        for (par_code, backend) in self.backends_by_issue(issue_id).await? {
            backend
                .handle_new_email(issue_id, email_id)
                .await
                .map_err(|err| hook_failed(&par_code, issue_id, err))?;
        }
        Ok(())
    }

    pub async fn handle_new_note(&self, issue_id: i32, note_id: i32) -> Result<(), PartnerError> {
        for (par_code, backend) in self.backends_by_issue(issue_id).await? {
            backend
                .handle_new_note(issue_id, note_id)
                .await
                .map_err(|err| hook_failed(&par_code, issue_id, err))?;
        }
        Ok(())
    }

    pub async fn handle_issue_change(
        &self,
        issue_id: i32,
        user_id: i32,
        old_details: &Value,
        changes: &Value,
    ) -> Result<(), PartnerError> {
        for (par_code, backend) in self.backends_by_issue(issue_id).await? {
            backend
                .handle_issue_change(issue_id, user_id, old_details, changes)
                .await
                .map_err(|err| hook_failed(&par_code, issue_id, err))?;
        }
        Ok(())
    }

    /// 파트너 계정이 아니면 `NotApplicable`.
    pub async fn can_user_access_feature(&self, user_id: i32, feature: Feature) -> Result<Access, PartnerError> {
        Ok(match self.bound_backend(user_id).await? {
            Some(backend) => backend.can_user_access_feature(user_id, feature).await,
            None => Access::NotApplicable,
        })
    }

    pub async fn can_user_access_issue_section(
        &self,
        user_id: i32,
        section: IssueSection,
    ) -> Result<Access, PartnerError> {
        Ok(match self.bound_backend(user_id).await? {
            Some(backend) => backend.can_user_access_issue_section(user_id, section).await,
            None => Access::NotApplicable,
        })
    }

    pub async fn can_update_issue(&self, issue_id: i32, user_id: i32) -> Result<Access, PartnerError> {
        Ok(match self.bound_backend(user_id).await? {
            Some(backend) => backend.can_update_issue(issue_id, user_id).await,
            None => Access::NotApplicable,
        })
    }

    async fn bound_backend(&self, user_id: i32) -> Result<Option<Arc<dyn PartnerBackend>>, PartnerError> {
        let par_code = UserEntity::find_by_id(user_id)
            .select_only()
            .column(user::Column::ParCode)
            .into_tuple::<Option<String>>()
            .one(&self.db)
            .await?
            .flatten()
            .filter(|code| !code.is_empty());

        match par_code {
            Some(par_code) => Ok(Some(self.registry.backend(&par_code)?)),
            None => Ok(None),
        }
    }

    async fn backends_by_issue(&self, issue_id: i32) -> Result<Vec<(String, Arc<dyn PartnerBackend>)>, PartnerError> {
        self.partner_codes_by_issue(issue_id)
            .await
            .into_iter()
            .map(|par_code| {
                let backend = self.registry.backend(&par_code)?;
                Ok((par_code, backend))
            })
            .collect()
    }

    /// 새로 연결했으면 true.
    async fn add_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        issue_id: i32,
        par_code: &str,
        actor: i32,
    ) -> Result<bool, PartnerError> {
        let existing = IssuePartnerEntity::find_by_id((issue_id, par_code.to_string()))
            .one(conn)
            .await?;
        if existing.is_some() {
            return Ok(false);
        }

        let backend = self.registry.backend(par_code)?;

        IssuePartnerEntity::insert(issue_partner::ActiveModel {
            issue_id: Set(issue_id),
            par_code: Set(par_code.to_string()),
            created_at: Set(Utc::now()),
        })
        .exec_without_returning(conn)
        .await?;

        let user = actor_name(conn, actor).await?;
        history::add(
            conn,
            issue_id,
            actor,
            history::PARTNER_ADDED,
            PARTNER_ADDED_SUMMARY,
            json!({ "partner": backend.name(), "user": user }),
        )
        .await?;

        backend
            .issue_added(issue_id)
            .await
            .map_err(|err| hook_failed(par_code, issue_id, err))?;

        Ok(true)
    }

    async fn remove_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        issue_id: i32,
        par_code: &str,
        actor: i32,
    ) -> Result<(), PartnerError> {
        let backend = self.registry.backend(par_code)?;

        IssuePartnerEntity::delete_many()
            .filter(issue_partner::Column::IssueId.eq(issue_id))
            .filter(issue_partner::Column::ParCode.eq(par_code))
            .exec(conn)
            .await?;

        let user = actor_name(conn, actor).await?;
        history::add(
            conn,
            issue_id,
            actor,
            history::PARTNER_REMOVED,
            PARTNER_REMOVED_SUMMARY,
            json!({ "partner": backend.name(), "user": user }),
        )
        .await?;

        backend
            .issue_removed(issue_id)
            .await
            .map_err(|err| hook_failed(par_code, issue_id, err))
    }
}

/// 이슈에 연결되어 있고 이슈의 프로젝트에서도 활성화된 파트너 코드.
async fn partner_codes_by_issue<C: ConnectionTrait>(conn: &C, issue_id: i32) -> Result<Vec<String>, DbErr> {
    let project_id = IssueEntity::find_by_id(issue_id)
        .select_only()
        .column(issue::Column::ProjectId)
        .into_tuple::<i32>()
        .one(conn)
        .await?;

    let Some(project_id) = project_id else {
        return Ok(Vec::new());
    };

    let enabled = PartnerProjectEntity::find()
        .select_only()
        .column(partner_project::Column::ParCode)
        .filter(partner_project::Column::ProjectId.eq(project_id))
        .into_query();

    IssuePartnerEntity::find()
        .select_only()
        .column(issue_partner::Column::ParCode)
        .filter(issue_partner::Column::IssueId.eq(issue_id))
        .filter(issue_partner::Column::ParCode.in_subquery(enabled))
        .order_by_asc(issue_partner::Column::CreatedAt)
        .order_by_asc(issue_partner::Column::ParCode)
        .into_tuple::<String>()
        .all(conn)
        .await
}

async fn actor_name<C: ConnectionTrait>(conn: &C, user_id: i32) -> Result<String, DbErr> {
    let full_name = UserEntity::find_by_id(user_id)
        .select_only()
        .column(user::Column::FullName)
        .into_tuple::<String>()
        .one(conn)
        .await?;

    Ok(full_name.unwrap_or_else(|| format!("#{}", user_id)))
}

fn hook_failed(par_code: &str, issue_id: i32, err: anyhow::Error) -> PartnerError {
    error!(par_code, issue_id, error = %err, "파트너 백엔드 훅 실패");
    PartnerError::backend(par_code, err)
}
