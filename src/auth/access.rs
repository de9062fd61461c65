use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use sea_query::Condition;
use tracing::warn;

use crate::entity::project_member::Role;
use crate::entity::{issue, project_member, user};
use crate::model::global_error::{AppError, ErrorCode};
use crate::partner::{IssueSection, PartnerService};

/// 이슈 접근이 허용된 사용자의 정보
#[derive(Debug, Clone)]
pub struct IssueAccess {
    pub user: user::Model,
    pub issue: issue::Model,
    pub role: Role,
}

/// 사용자가 이슈를 볼 수 있는지 확인한다.
///
/// 프로젝트 멤버여야 하고, Reporter 는 본인이 등록한 이슈만,
/// 파트너 소속 사용자는 해당 파트너가 연결된 이슈만 볼 수 있다.
pub async fn check_issue_access(
    db: &DatabaseConnection,
    partners: &PartnerService,
    issue_id: i32,
    user_id: i32,
) -> Result<IssueAccess, AppError> {
    let user = user::Entity::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::not_found(ErrorCode::MemberNotFound))?;

    let issue = issue::Entity::find_by_id(issue_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::not_found(ErrorCode::IssueNotFound))?;

    let role = check_project_member(db, issue.project_id, user_id).await.inspect_err(|_| {
        warn!(user_id, issue_id, "프로젝트 멤버가 아닌 사용자의 이슈 접근");
    })?;

    if role == Role::Reporter && issue.reported_by != Some(user_id) {
        return Err(AppError::forbidden(ErrorCode::NotEnoughPermission));
    }

    if let Some(par_code) = user.partner_code() {
        if !partners.is_partner_enabled_for_issue(par_code, issue_id).await {
            warn!(user_id, issue_id, par_code, "파트너에 연결되지 않은 이슈 접근");
            return Err(AppError::forbidden(ErrorCode::NotEnoughPermission));
        }
    }

    Ok(IssueAccess { user, issue, role })
}

/// 프로젝트 멤버면 역할을 돌려준다.
pub async fn check_project_member(
    db: &DatabaseConnection,
    project_id: i32,
    user_id: i32,
) -> Result<Role, AppError> {
    project_member::Entity::find()
        .filter(
            Condition::all()
                .add(project_member::Column::ProjectId.eq(project_id))
                .add(project_member::Column::UserId.eq(user_id))
        )
        .one(db)
        .await?
        .map(|member| member.role)
        .ok_or_else(|| AppError::forbidden(ErrorCode::NotEnoughPermission))
}

pub fn require_role(access: &IssueAccess, minimum: Role) -> Result<(), AppError> {
    if access.role < minimum {
        return Err(AppError::forbidden(ErrorCode::NotEnoughPermission));
    }
    Ok(())
}

/// 파트너 백엔드가 이슈 화면의 해당 영역을 막았는지 확인한다.
pub async fn require_section(
    partners: &PartnerService,
    access: &IssueAccess,
    section: IssueSection,
) -> Result<(), AppError> {
    if partners.can_user_access_issue_section(access.user.id, section).await?.is_denied() {
        return Err(AppError::forbidden(ErrorCode::NotEnoughPermission));
    }
    Ok(())
}

/// 이슈 수정 권한: Standard 이상이면서 파트너 백엔드가 거부하지 않아야 한다.
pub async fn require_issue_update(partners: &PartnerService, access: &IssueAccess) -> Result<(), AppError> {
    require_role(access, Role::Standard)?;

    if partners.can_update_issue(access.issue.id, access.user.id).await?.is_denied() {
        return Err(AppError::forbidden(ErrorCode::NotEnoughPermission));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partner::Access;
    use crate::test_support::{
        add_member, create_issue, create_project, create_user, enable_partner, partner_service, setup_db,
        RecordingBackend,
    };

    fn code(result: Result<IssueAccess, AppError>) -> ErrorCode {
        result.unwrap_err().code()
    }

    #[tokio::test]
    async fn member_can_access_issue() {
        let db = setup_db().await;
        create_project(&db, 7, "Helpdesk").await;
        create_user(&db, 1, "Kim Minsu", None).await;
        add_member(&db, 7, 1, Role::Developer).await;
        create_issue(&db, 42, 7, None).await;
        let service = partner_service(&db, &[]);

        let access = check_issue_access(&db, &service, 42, 1).await.unwrap();

        assert_eq!(access.role, Role::Developer);
        assert_eq!(access.issue.project_id, 7);
        assert!(require_role(&access, Role::Standard).is_ok());
        assert!(require_role(&access, Role::Manager).is_err());
    }

    #[tokio::test]
    async fn missing_user_and_issue_are_not_found() {
        let db = setup_db().await;
        create_project(&db, 7, "Helpdesk").await;
        create_user(&db, 1, "Kim Minsu", None).await;
        let service = partner_service(&db, &[]);

        assert_eq!(code(check_issue_access(&db, &service, 42, 99).await), ErrorCode::MemberNotFound);
        assert_eq!(code(check_issue_access(&db, &service, 42, 1).await), ErrorCode::IssueNotFound);
    }

    #[tokio::test]
    async fn non_member_is_forbidden() {
        let db = setup_db().await;
        create_project(&db, 7, "Helpdesk").await;
        create_user(&db, 1, "Kim Minsu", None).await;
        create_issue(&db, 42, 7, None).await;
        let service = partner_service(&db, &[]);

        assert_eq!(code(check_issue_access(&db, &service, 42, 1).await), ErrorCode::NotEnoughPermission);
    }

    #[tokio::test]
    async fn reporter_only_sees_own_issues() {
        let db = setup_db().await;
        create_project(&db, 7, "Helpdesk").await;
        create_user(&db, 1, "Kim Minsu", None).await;
        create_user(&db, 2, "Lee Jiwon", None).await;
        add_member(&db, 7, 1, Role::Reporter).await;
        create_issue(&db, 42, 7, Some(1)).await;
        create_issue(&db, 43, 7, Some(2)).await;
        let service = partner_service(&db, &[]);

        assert!(check_issue_access(&db, &service, 42, 1).await.is_ok());
        assert_eq!(code(check_issue_access(&db, &service, 43, 1).await), ErrorCode::NotEnoughPermission);
    }

    #[tokio::test]
    async fn partner_user_needs_partner_on_issue() {
        let db = setup_db().await;
        create_project(&db, 7, "Helpdesk").await;
        create_user(&db, 1, "Kim Minsu", None).await;
        create_user(&db, 5, "Acme Agent", Some("acme")).await;
        add_member(&db, 7, 5, Role::Standard).await;
        create_issue(&db, 42, 7, None).await;
        enable_partner(&db, "acme", 7).await;
        let service = partner_service(&db, &[("acme", RecordingBackend::new("Acme"))]);

        assert_eq!(code(check_issue_access(&db, &service, 42, 5).await), ErrorCode::NotEnoughPermission);

        service.add_partner_to_issue(42, "acme", 1).await.unwrap();

        assert!(check_issue_access(&db, &service, 42, 5).await.is_ok());
    }

    #[tokio::test]
    async fn denied_section_and_update_are_forbidden() {
        let db = setup_db().await;
        create_project(&db, 7, "Helpdesk").await;
        create_user(&db, 1, "Kim Minsu", None).await;
        create_user(&db, 5, "Acme Agent", Some("acme")).await;
        add_member(&db, 7, 5, Role::Developer).await;
        create_issue(&db, 42, 7, None).await;
        enable_partner(&db, "acme", 7).await;
        let service = partner_service(&db, &[("acme", RecordingBackend::with_access("Acme", Access::Deny))]);
        service.add_partner_to_issue(42, "acme", 1).await.unwrap();

        let access = check_issue_access(&db, &service, 42, 5).await.unwrap();

        assert!(require_section(&service, &access, IssueSection::Phone).await.is_err());
        assert!(require_issue_update(&service, &access).await.is_err());
    }

    #[tokio::test]
    async fn unbound_user_is_not_restricted_by_partners() {
        let db = setup_db().await;
        create_project(&db, 7, "Helpdesk").await;
        create_user(&db, 1, "Kim Minsu", None).await;
        add_member(&db, 7, 1, Role::Standard).await;
        create_issue(&db, 42, 7, None).await;
        let service = partner_service(&db, &[]);

        let access = check_issue_access(&db, &service, 42, 1).await.unwrap();

        assert!(require_section(&service, &access, IssueSection::Phone).await.is_ok());
        assert!(require_issue_update(&service, &access).await.is_ok());
    }
}
