use std::{sync::Arc, time::Duration};

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use cms_tools::CmsApi;
use futures::FutureExt;
use gateway_tools::GatewayApi;
use log::info;
use recon_engine::{events::SettledHook, CheckoutApi, ReconcileApi};

use crate::{
    config::{ServerConfig, WebhookOptions},
    errors::ServerError,
    integrations::{CmsBackend, SnapGateway},
    routes::{health, payment_callback, payment_notification, CheckoutRoute, PaymentDebugRoute},
    worker::{start_reconciliation_worker, NotificationQueue},
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let cms_api = CmsApi::new(config.cms.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let gateway_api = GatewayApi::new(config.gateway.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let backend = CmsBackend::new(cms_api);
    let gateway = SnapGateway::new(gateway_api, &config.storefront_url);

    let (queue, receiver) = NotificationQueue::new(config.queue_depth);
    let recon_api = ReconcileApi::new(backend.clone(), gateway.clone()).with_settled_hook(order_settled_hook());
    // The worker exits on its own once the server (and with it the last queue sender) is dropped.
    let _worker = start_reconciliation_worker(recon_api, receiver);

    let srv = create_server_instance(config, backend, gateway, queue)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(
    config: ServerConfig,
    backend: CmsBackend,
    gateway: SnapGateway,
    queue: NotificationQueue,
) -> Result<Server, ServerError> {
    let options = WebhookOptions::from_config(&config);
    let srv = HttpServer::new(move || {
        let checkout_api = CheckoutApi::new(backend.clone(), gateway.clone());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("spr::access_log"))
            .app_data(web::Data::new(queue.clone()))
            .app_data(web::Data::new(options.clone()))
            .app_data(web::Data::new(checkout_api))
            .app_data(web::Data::new(backend.clone()))
            .service(health)
            .service(payment_notification)
            .service(payment_callback)
            .service(PaymentDebugRoute::<CmsBackend>::new())
            .service(CheckoutRoute::<CmsBackend, SnapGateway>::new())
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}

fn order_settled_hook() -> SettledHook {
    Arc::new(|event| {
        async move {
            info!(
                "🔔️ Order {} has been paid and settled (transaction {})",
                event.order.order_id,
                event.transaction_id.as_deref().unwrap_or("unknown")
            );
        }
        .boxed()
    })
}
