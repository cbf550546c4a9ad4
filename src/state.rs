use crate::application::catalog_service::CatalogService;
use crate::application::order_service::OrderService;
use crate::application::otp_service::OtpService;
use crate::application::relay_service::RelayService;
use crate::application::user_service::UserService;

/// Services shared by every actix worker through `web::Data`.
pub struct AppState {
    pub orders: OrderService,
    pub users: UserService,
    pub otp: OtpService,
    pub catalog: CatalogService,
    pub relay: RelayService,
}
