use std::sync::Arc;

use crate::config::Config;
use crate::domain::ports::{
    BookingRepository, CalendarService, CommunicationRepository, CustomerRepository, EmailService,
    EventRepository, PaymentGateway, VoucherRepository,
};
use crate::domain::services::{
    booking_service::BookingService, communication_service::CommunicationService,
    confirmation::ConfirmationService, notifications::NotificationService,
    voucher_service::VoucherService,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub event_repo: Arc<dyn EventRepository>,
    pub customer_repo: Arc<dyn CustomerRepository>,
    pub booking_repo: Arc<dyn BookingRepository>,
    pub voucher_repo: Arc<dyn VoucherRepository>,
    pub communication_repo: Arc<dyn CommunicationRepository>,
    pub email_service: Arc<dyn EmailService>,
    pub payment_gateway: Arc<dyn PaymentGateway>,
    pub calendar_service: Arc<dyn CalendarService>,
    pub communication_service: Arc<CommunicationService>,
    pub booking_service: Arc<BookingService>,
    pub confirmation_service: Arc<ConfirmationService>,
    pub voucher_service: Arc<VoucherService>,
    pub notification_service: Arc<NotificationService>,
}

impl AppState {
    /// Wires the service graph over a set of repositories and outbound
    /// adapters. Shared by the factory and the test harness so both run the
    /// same wiring.
    pub fn new(
        config: Config,
        event_repo: Arc<dyn EventRepository>,
        customer_repo: Arc<dyn CustomerRepository>,
        booking_repo: Arc<dyn BookingRepository>,
        voucher_repo: Arc<dyn VoucherRepository>,
        communication_repo: Arc<dyn CommunicationRepository>,
        email_service: Arc<dyn EmailService>,
        payment_gateway: Arc<dyn PaymentGateway>,
        calendar_service: Arc<dyn CalendarService>,
    ) -> Self {
        let communication_service = Arc::new(CommunicationService::new(
            communication_repo.clone(),
            email_service.clone(),
        ));
        let voucher_service = Arc::new(VoucherService::new(
            voucher_repo.clone(),
            booking_repo.clone(),
            payment_gateway.clone(),
            communication_service.clone(),
        ));
        let confirmation_service = Arc::new(ConfirmationService::new(
            booking_repo.clone(),
            event_repo.clone(),
            customer_repo.clone(),
            calendar_service.clone(),
            communication_service.clone(),
        ));
        let booking_service = Arc::new(BookingService::new(
            event_repo.clone(),
            customer_repo.clone(),
            booking_repo.clone(),
            payment_gateway.clone(),
            voucher_service.clone(),
            confirmation_service.clone(),
        ));
        let notification_service = Arc::new(NotificationService::new(
            booking_repo.clone(),
            event_repo.clone(),
            customer_repo.clone(),
            voucher_repo.clone(),
            voucher_service.clone(),
            communication_service.clone(),
            config.ops_alert_email.clone(),
        ));

        Self {
            config,
            event_repo,
            customer_repo,
            booking_repo,
            voucher_repo,
            communication_repo,
            email_service,
            payment_gateway,
            calendar_service,
            communication_service,
            booking_service,
            confirmation_service,
            voucher_service,
            notification_service,
        }
    }
}
