use std::sync::Arc;

use actix_cors::Cors;
use actix_web::http::header;
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use dotenv::dotenv;
use sea_orm_migration::MigratorTrait;
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use rusty_tracker::api::{self, ApiDoc};
use rusty_tracker::auth::JwtUtils;
use rusty_tracker::configuration::Settings;
use rusty_tracker::db::init_db;
use rusty_tracker::migration::Migrator;
use rusty_tracker::partner::backends::register_builtin_backends;
use rusty_tracker::partner::{PartnerRegistry, PartnerService};
use rusty_tracker::telemetry::{get_subscriber, init_subscriber};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = get_subscriber(
        "rusty_tracker".into(),
        "info,sqlx=warn".into(),
        std::io::stdout
    );
    init_subscriber(subscriber)?;

    info!("애플리케이션 시작 중...");

    dotenv().ok();
    let settings = Settings::from_env()?;
    info!("환경 변수 로드 완료");

    let db = init_db(&settings.database_url).await?;
    info!("데이터베이스 마이그레이션 실행 중...");
    Migrator::up(&db, None).await?;
    info!("마이그레이션 완료");

    let mut registry = PartnerRegistry::new();
    register_builtin_backends(&mut registry, &settings)?;
    info!(partners = ?registry.backend_list(), "파트너 백엔드 등록 완료");

    let partners = Data::new(PartnerService::new(db.clone(), Arc::new(registry)));
    let jwt = Data::new(JwtUtils::new(&settings.jwt_secret));
    let db_data = Data::new(db);
    let openapi = ApiDoc::openapi();

    info!("서버 시작 중: http://{}:{}", settings.host, settings.port);
    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![header::CONTENT_TYPE, header::AUTHORIZATION])
            .max_age(3600);

        App::new()
            .wrap(cors)
            .app_data(db_data.clone())
            .app_data(partners.clone())
            .app_data(jwt.clone())
            .service(SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi.clone()))
            .configure(api::configure)
    })
        .bind((settings.host.as_str(), settings.port))?
        .run()
        .await?;

    Ok(())
}
