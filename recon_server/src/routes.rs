//! Request handler definitions
//!
//! Define each route and it handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! Webhook handlers answer from the queue and configuration only; they never wait on the CMS or the gateway.
//! Anything slow belongs in the background worker.

use actix_web::{get, http::header, post, web, HttpRequest, HttpResponse, Responder};
use gateway_tools::helpers::verify_signature;
use log::*;
use recon_engine::{
    traits::{PaymentGateway, StorefrontDatabase},
    types::{IncomingNotification, OrderId},
    CheckoutApi,
    CheckoutError,
};
use serde_json::Value;

use crate::{
    config::WebhookOptions,
    data_objects::{
        new_order_from_checkout,
        CallbackParams,
        CheckoutRequest,
        CheckoutResponse,
        DebugParams,
        DebugResponse,
        JsonResponse,
    },
    errors::ServerError,
    worker::NotificationQueue,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Webhook  ----------------------------------------------------
/// The payment gateway's server-to-server notification endpoint.
///
/// The handler validates and, in production mode, authenticates the notification, then queues it and returns.
/// Reconciliation happens in the background; its outcome never changes this response. Anything other than a 400
/// or 403 is acknowledged with a 200 so the gateway does not hammer us with retries for problems a retry cannot
/// fix.
#[post("/payment/notification")]
pub async fn payment_notification(
    req: HttpRequest,
    body: web::Json<Value>,
    queue: web::Data<NotificationQueue>,
    options: web::Data<WebhookOptions>,
) -> HttpResponse {
    trace!("💸️ Received payment notification: {}", req.uri());
    let raw = body.into_inner();
    let (order_id, transaction_status) = match (string_field(&raw, "order_id"), string_field(&raw, "transaction_status")) {
        (Some(id), Some(status)) => (id, status),
        _ => {
            warn!("💸️ Rejecting notification without order_id or transaction_status");
            return HttpResponse::BadRequest()
                .json(JsonResponse::failure("order_id and transaction_status are required"));
        },
    };
    debug!("💸️ Notification for order {order_id}: '{transaction_status}'");

    if options.signature_checks {
        let fields =
            (string_field(&raw, "status_code"), string_field(&raw, "gross_amount"), string_field(&raw, "signature_key"));
        let valid = match &fields {
            (Some(status_code), Some(gross_amount), Some(signature_key)) => {
                verify_signature(signature_key, &order_id, status_code, gross_amount, options.server_key.reveal())
            },
            _ => false,
        };
        if !valid {
            warn!("💸️ Rejecting notification for order {order_id} with a missing or invalid signature");
            return HttpResponse::Forbidden().json(JsonResponse::failure("Invalid signature"));
        }
    }

    let notification = IncomingNotification {
        order_id: order_id.clone().into(),
        transaction_id: string_field(&raw, "transaction_id"),
        raw,
    };
    if let Err(e) = queue.enqueue(notification) {
        // Still a 200. The gateway's redelivery is the recovery path for a saturated queue.
        error!("💸️ Could not queue notification for order {order_id}. {e}");
    }
    HttpResponse::Ok().json(JsonResponse::success("Notification received"))
}

/// Reads a notification field as text. The gateway sends `gross_amount` and `status_code` as strings or as
/// bare JSON numbers depending on the channel; numbers take their JSON rendering (`247000` -> "247000",
/// `247000.5` -> "247000.5"), which is also the form the signature digest is computed over.
fn string_field(value: &Value, field: &str) -> Option<String> {
    match value.get(field)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

//----------------------------------------------   Callback  ----------------------------------------------------
/// The browser-facing "finish" hop. The gateway redirects the customer here after payment; we bounce them to
/// the storefront, echoing the gateway's query parameters. No state is read or written.
#[get("/payment/callback")]
pub async fn payment_callback(query: web::Query<CallbackParams>, options: web::Data<WebhookOptions>) -> HttpResponse {
    let params = query.into_inner();
    let location = match &params.order_id {
        Some(order_id) => {
            debug!("↩️️ Payment callback for order {order_id}");
            format!(
                "{}/order/finish?order_id={order_id}&transaction_status={}&status_code={}",
                options.storefront_url,
                params.transaction_status.as_deref().unwrap_or(""),
                params.status_code.as_deref().unwrap_or("")
            )
        },
        None => {
            debug!("↩️️ Payment callback without an order id");
            format!("{}/order/error", options.storefront_url)
        },
    };
    HttpResponse::Found().insert_header((header::LOCATION, location)).finish()
}

//----------------------------------------------   Debug  -------------------------------------------------------
route!(payment_debug => Get "/payment/debug" impl StorefrontDatabase);
/// Operator lookup for a single order. Reports whether the storefront backend knows the order and what state it
/// is in, which doubles as a check that the CMS is reachable with the configured credentials.
pub async fn payment_debug<BStore>(
    query: web::Query<DebugParams>,
    store: web::Data<BStore>,
    options: web::Data<WebhookOptions>,
) -> Result<HttpResponse, ServerError>
where
    BStore: StorefrontDatabase,
{
    let Some(order_id) = query.into_inner().order_id else {
        return Err(ServerError::InvalidRequestBody("order_id is required".to_string()));
    };
    debug!("⚖️️ Debug lookup for order {order_id}");
    let order = store
        .fetch_order_by_order_id(&OrderId(order_id))
        .await
        .map_err(|e| ServerError::BackendError(e.to_string()))?;
    Ok(HttpResponse::Ok().json(DebugResponse::new(order, options.signature_checks)))
}

//----------------------------------------------   Checkout  ----------------------------------------------------
route!(checkout => Post "/checkout" impl StorefrontDatabase, PaymentGateway);
/// Records a pending order and opens a hosted-payment session for it.
pub async fn checkout<BStore, GPay>(
    body: web::Json<CheckoutRequest>,
    api: web::Data<CheckoutApi<BStore, GPay>>,
) -> Result<HttpResponse, ServerError>
where
    BStore: StorefrontDatabase,
    GPay: PaymentGateway,
{
    let request = body.into_inner();
    let new_order = new_order_from_checkout(request).map_err(ServerError::InvalidRequestBody)?;
    let order_id = new_order.order_id.clone();
    debug!("🧾️ Checkout request for order {order_id} ({} items)", new_order.items.len());
    match api.process_checkout(new_order).await {
        Ok(session) => Ok(HttpResponse::Ok().json(CheckoutResponse {
            order_id: order_id.0,
            token: session.token,
            redirect_url: session.redirect_url,
        })),
        Err(e @ CheckoutError::ProductNotFound(_)) | Err(e @ CheckoutError::InsufficientStock { .. }) => {
            info!("🧾️ Rejecting checkout for order {order_id}. {e}");
            Ok(HttpResponse::Conflict().json(JsonResponse::failure(e)))
        },
        Err(CheckoutError::Gateway(e)) => {
            warn!("🧾️ Payment session for order {order_id} could not be created. {e}");
            Err(ServerError::PaymentGatewayError(e.to_string()))
        },
        Err(CheckoutError::Store(e)) => {
            warn!("🧾️ Checkout for order {order_id} failed on the backend. {e}");
            Err(ServerError::BackendError(e.to_string()))
        },
    }
}
