pub mod app_config;
pub mod database;
pub mod reservation_repo;
pub mod stripe;

pub use database::DbClient;
pub use reservation_repo::PgReservationRepository;
pub use stripe::StripeClient;
