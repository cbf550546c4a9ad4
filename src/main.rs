use std::sync::Arc;
use std::time::Duration;

use actix_web::web;
use dotenvy::dotenv;
use log::{info, warn};
use storefront_service::application::catalog_service::CatalogService;
use storefront_service::application::notification_queue::{NotificationQueue, NotificationWorker};
use storefront_service::application::notifier::Notifier;
use storefront_service::application::order_service::OrderService;
use storefront_service::application::otp_service::{OtpService, OtpStore};
use storefront_service::application::relay_service::RelayService;
use storefront_service::application::user_service::UserService;
use storefront_service::config::AppConfig;
use storefront_service::domain::ports::{Mailer, MessagingClient};
use storefront_service::infrastructure::mailer::{ConsoleMailer, SmtpMailer};
use storefront_service::infrastructure::messaging::{
    http_client, DisabledMessenger, Msg91Gateway, TwilioWhatsApp,
};
use storefront_service::infrastructure::order_repo::DieselOrderRepository;
use storefront_service::infrastructure::product_repo::DieselProductRepository;
use storefront_service::infrastructure::user_repo::DieselUserRepository;
use storefront_service::state::AppState;
use storefront_service::{build_server, create_pool, run_migrations};

const OTP_PURGE_INTERVAL: Duration = Duration::from_secs(60);

type StartupError = Box<dyn std::error::Error + Send + Sync>;

#[actix_web::main]
async fn main() -> Result<(), StartupError> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url)?;
    run_migrations(&pool)?;

    let http = http_client(config.http_timeout)?;

    let mailer: Arc<dyn Mailer> = match &config.smtp {
        Some(smtp) => {
            info!("Sending email through {}:{}", smtp.host, smtp.port);
            Arc::new(SmtpMailer::new(smtp, &config.store.name)?)
        }
        None => {
            warn!("SMTP_HOST not set; emails will only be logged");
            Arc::new(ConsoleMailer)
        }
    };
    let messenger: Arc<dyn MessagingClient> = match &config.twilio {
        Some(twilio) => Arc::new(TwilioWhatsApp::new(http.clone(), twilio.clone())),
        None => {
            warn!("Twilio settings incomplete; WhatsApp notifications are disabled");
            Arc::new(DisabledMessenger)
        }
    };

    let worker = NotificationWorker::new(mailer.clone(), messenger, config.retry);
    let (queue, _worker) = NotificationQueue::start(worker);
    let notifier = Notifier::new(queue, config.store.clone());

    let otp_store = Arc::new(OtpStore::new(config.otp_ttl));
    if config.otp_ttl.is_some() {
        spawn_otp_purge(otp_store.clone());
    }

    let state = web::Data::new(AppState {
        orders: OrderService::new(
            Arc::new(DieselOrderRepository::new(pool.clone())),
            notifier.clone(),
        ),
        users: UserService::new(
            Arc::new(DieselUserRepository::new(pool.clone())),
            notifier.clone(),
        ),
        otp: OtpService::new(otp_store, mailer, config.store.clone()),
        catalog: CatalogService::new(Arc::new(DieselProductRepository::new(pool))),
        relay: RelayService::new(
            Arc::new(Msg91Gateway::new(http, config.text_gateway.clone())),
            notifier,
        ),
    });

    info!("Starting server at http://{}:{}", config.host, config.port);

    build_server(state, &config.host, config.port)?.await?;
    Ok(())
}

fn spawn_otp_purge(store: Arc<OtpStore>) {
    actix_web::rt::spawn(async move {
        let mut ticker = tokio::time::interval(OTP_PURGE_INTERVAL);
        loop {
            ticker.tick().await;
            let removed = store.purge_expired();
            if removed > 0 {
                info!("Purged {} expired OTP(s)", removed);
            }
        }
    });
}
