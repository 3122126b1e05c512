//! Shared harness: the full router over in-memory adapters.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;

use nextlevel_portal::adapters::auth::JwtSessionCodec;
use nextlevel_portal::adapters::email::RecordingEmailSender;
use nextlevel_portal::adapters::http::{app_router, AppState, HttpSettings, SessionCookie};
use nextlevel_portal::adapters::memory::{
    InMemoryLeadRepository, InMemoryMagicLinkRepository, InMemoryProcessedEventStore,
    InMemorySubscriberRepository,
};
use nextlevel_portal::adapters::rate_limiter::InMemoryRateLimiter;
use nextlevel_portal::adapters::stripe::MockPaymentProvider;
use nextlevel_portal::application::CheckoutSettings;
use nextlevel_portal::domain::auth::{SessionClaims, UnsubscribeSigner};
use nextlevel_portal::domain::foundation::{EmailAddress, Timestamp};
use nextlevel_portal::domain::lead::{Lead, Package};
use nextlevel_portal::ports::{PaymentProvider, SessionCodec};

pub const SESSION_SECRET: &str = "integration-session-secret-0123456789";
pub const UNSUBSCRIBE_SECRET: &str = "integration-unsubscribe-secret";
pub const WEBHOOK_SECRET: &str = "whsec_integration";
pub const CRON_SECRET: &str = "cron-secret";
pub const ADMIN_EMAIL: &str = "owner@nextlevelweb.ie";
pub const CUSTOMER_EMAIL: &str = "ann@example.com";

pub struct TestApp {
    pub state: AppState,
    pub leads: Arc<InMemoryLeadRepository>,
    pub links: Arc<InMemoryMagicLinkRepository>,
    pub events: Arc<InMemoryProcessedEventStore>,
    pub subscribers: Arc<InMemorySubscriberRepository>,
    pub email: RecordingEmailSender,
    pub provider: Arc<MockPaymentProvider>,
    pub codec: Arc<JwtSessionCodec>,
    pub lead: Lead,
}

impl TestApp {
    pub fn new() -> Self {
        let lead = Lead::new(
            "Ann Murphy",
            email(CUSTOMER_EMAIL),
            Some(Package::Growth),
            Timestamp::now(),
        );
        let leads = Arc::new(InMemoryLeadRepository::with_leads([lead.clone()]));
        let links = Arc::new(InMemoryMagicLinkRepository::new());
        let events = Arc::new(InMemoryProcessedEventStore::new());
        let subscribers = Arc::new(InMemorySubscriberRepository::new());
        let email_sender = RecordingEmailSender::new();
        let provider = Arc::new(MockPaymentProvider::new(WEBHOOK_SECRET));
        let codec = Arc::new(JwtSessionCodec::new(SecretString::new(
            SESSION_SECRET.to_string(),
        )));

        let settings = HttpSettings {
            base_url: "https://site.test".to_string(),
            admin_email: Some(email(ADMIN_EMAIL)),
            operator_email: Some(email(ADMIN_EMAIL)),
            cron_secret: Some(SecretString::new(CRON_SECRET.to_string())),
            cookie: SessionCookie::new(true, None),
            checkout: CheckoutSettings {
                base_url: "https://site.test".to_string(),
                currency: "eur".to_string(),
                deposit_price_ids: [(Package::Growth, "price_growth".to_string())].into(),
            },
        };

        let payment_provider: Arc<dyn PaymentProvider> = provider.clone();
        let state = AppState {
            magic_links: links.clone(),
            leads: leads.clone(),
            processed_events: events.clone(),
            subscribers: subscribers.clone(),
            payment_provider: Some(payment_provider),
            email_sender: Arc::new(email_sender.clone()),
            session_codec: codec.clone(),
            unsubscribe_signer: Arc::new(UnsubscribeSigner::new(SecretString::new(
                UNSUBSCRIBE_SECRET.to_string(),
            ))),
            rate_limiter: Arc::new(InMemoryRateLimiter::with_defaults()),
            settings: Arc::new(settings),
        };

        Self {
            state,
            leads,
            links,
            events,
            subscribers,
            email: email_sender,
            provider,
            codec,
            lead,
        }
    }

    pub fn router(&self) -> Router {
        app_router(self.state.clone())
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router().oneshot(request).await.unwrap()
    }

    /// `Cookie` header value for a signed session.
    pub fn session_cookie(&self, claims: &SessionClaims) -> String {
        format!("nextlevel_session={}", self.codec.issue(claims).unwrap())
    }

    pub fn customer_cookie(&self) -> String {
        self.session_cookie(&SessionClaims::customer(
            self.lead.email.clone(),
            Some(self.lead.id),
            Timestamp::now(),
        ))
    }

    pub fn admin_cookie(&self) -> String {
        self.session_cookie(&SessionClaims::admin(email(ADMIN_EMAIL), Timestamp::now()))
    }

    /// Token from the most recent login email sent to `to`.
    pub fn login_token_for(&self, to: &str) -> String {
        let sent = self.email.sent_to(to);
        let html = &sent.last().expect("no login email sent").html;
        let start = html.find("token=").expect("no token in email") + "token=".len();
        let end = start + html[start..].find('"').expect("unterminated link");
        html[start..end].to_string()
    }
}

pub fn email(raw: &str) -> EmailAddress {
    EmailAddress::parse(raw).unwrap()
}

pub fn json_post(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

pub fn get_with_cookie(uri: &str, cookie: &str) -> Request<Body> {
    Request::get(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

/// `name=value` part of the session `Set-Cookie` header.
pub fn set_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("nextlevel_session="))
        .map(|v| v.split(';').next().unwrap_or_default().to_string())
}

pub fn is_redirect(status: StatusCode) -> bool {
    status.is_redirection()
}
