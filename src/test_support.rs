use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};
use sea_orm_migration::{MigratorTrait, SchemaManager};
use serde_json::Value;

use crate::entity::project_member::Role;
use crate::entity::{issue, partner_project, phone_category, project, project_member, user};
use crate::migration::Migrator;
use crate::partner::backend::{Access, Feature, IssueSection, PartnerBackend};
use crate::partner::registry::PartnerRegistry;
use crate::partner::service::PartnerService;

pub async fn setup_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let db = Database::connect(options).await.unwrap();
    let manager = SchemaManager::new(&db);
    for migration in Migrator::migrations() {
        migration.up(&manager).await.unwrap();
    }
    db
}

pub async fn create_user(db: &DatabaseConnection, id: i32, full_name: &str, par_code: Option<&str>) -> user::Model {
    user::ActiveModel {
        id: Set(id),
        username: Set(format!("user{}", id)),
        email: Set(format!("user{}@example.com", id)),
        full_name: Set(full_name.to_string()),
        role: Set("user".to_string()),
        par_code: Set(par_code.map(str::to_string)),
        created_at: Set(Utc::now()),
        updated_at: Set(None),
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn create_admin(db: &DatabaseConnection, id: i32, full_name: &str) -> user::Model {
    let admin = create_user(db, id, full_name, None).await;
    let mut model: user::ActiveModel = admin.into();
    model.role = Set(user::ROLE_ADMIN.to_string());
    model.update(db).await.unwrap()
}

pub async fn create_project(db: &DatabaseConnection, id: i32, name: &str) -> project::Model {
    project::ActiveModel {
        id: Set(id),
        name: Set(name.to_string()),
        description: Set(None),
        created_at: Set(Utc::now()),
        updated_at: Set(None),
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn add_member(db: &DatabaseConnection, project_id: i32, user_id: i32, role: Role) {
    project_member::ActiveModel {
        user_id: Set(user_id),
        project_id: Set(project_id),
        role: Set(role),
        joined_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .unwrap();
}

pub async fn create_issue(db: &DatabaseConnection, id: i32, project_id: i32, reported_by: Option<i32>) -> issue::Model {
    issue::ActiveModel {
        id: Set(id),
        project_id: Set(project_id),
        title: Set(format!("이슈 {}", id)),
        status: Set("open".to_string()),
        reported_by: Set(reported_by),
        assigned_to: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn enable_partner(db: &DatabaseConnection, par_code: &str, project_id: i32) {
    partner_project::ActiveModel {
        par_code: Set(par_code.to_string()),
        project_id: Set(project_id),
    }
    .insert(db)
    .await
    .unwrap();
}

pub async fn create_phone_category(db: &DatabaseConnection, id: i32, project_id: i32, title: &str) -> phone_category::Model {
    phone_category::ActiveModel {
        id: Set(id),
        project_id: Set(project_id),
        title: Set(title.to_string()),
    }
    .insert(db)
    .await
    .unwrap()
}

/// 호출된 훅을 기록하는 테스트용 백엔드.
pub struct RecordingBackend {
    name: String,
    access: Access,
    fail_on: Option<&'static str>,
    calls: Mutex<Vec<String>>,
}

impl RecordingBackend {
    pub fn new(name: &str) -> Arc<Self> {
        Self::build(name, Access::Allow, None)
    }

    pub fn with_access(name: &str, access: Access) -> Arc<Self> {
        Self::build(name, access, None)
    }

    pub fn failing_on(name: &str, hook: &'static str) -> Arc<Self> {
        Self::build(name, Access::Allow, Some(hook))
    }

    fn build(name: &str, access: Access, fail_on: Option<&'static str>) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            access,
            fail_on,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, hook: &'static str, call: String) -> anyhow::Result<()> {
        self.calls.lock().unwrap().push(call);
        if self.fail_on == Some(hook) {
            anyhow::bail!("{} 훅 실패", hook);
        }
        Ok(())
    }
}

#[async_trait]
impl PartnerBackend for RecordingBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn issue_added(&self, issue_id: i32) -> anyhow::Result<()> {
        self.record("issue_added", format!("issue_added:{}", issue_id))
    }

    async fn issue_removed(&self, issue_id: i32) -> anyhow::Result<()> {
        self.record("issue_removed", format!("issue_removed:{}", issue_id))
    }

    async fn handle_new_email(&self, issue_id: i32, email_id: i32) -> anyhow::Result<()> {
        self.record("new_email", format!("new_email:{}:{}", issue_id, email_id))
    }

    async fn handle_new_note(&self, issue_id: i32, note_id: i32) -> anyhow::Result<()> {
        self.record("new_note", format!("new_note:{}:{}", issue_id, note_id))
    }

    async fn handle_issue_change(&self, issue_id: i32, user_id: i32, _old_details: &Value, changes: &Value) -> anyhow::Result<()> {
        self.record("issue_change", format!("issue_change:{}:{}:{}", issue_id, user_id, changes))
    }

    async fn can_user_access_feature(&self, _user_id: i32, _feature: Feature) -> Access {
        self.access
    }

    async fn can_user_access_issue_section(&self, _user_id: i32, _section: IssueSection) -> Access {
        self.access
    }

    async fn can_update_issue(&self, _issue_id: i32, _user_id: i32) -> Access {
        self.access
    }

    async fn issue_message(&self, issue_id: i32) -> Option<String> {
        Some(format!("{} watches #{}", self.name, issue_id))
    }
}

pub fn registry_with(backends: &[(&str, Arc<RecordingBackend>)]) -> Arc<PartnerRegistry> {
    let mut registry = PartnerRegistry::new();
    for (code, backend) in backends {
        let backend = backend.clone();
        registry
            .register_builtin(code, move || backend.clone() as Arc<dyn PartnerBackend>)
            .unwrap();
    }
    Arc::new(registry)
}

pub fn partner_service(db: &DatabaseConnection, backends: &[(&str, Arc<RecordingBackend>)]) -> PartnerService {
    PartnerService::new(db.clone(), registry_with(backends))
}
