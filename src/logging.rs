use std::{
    fmt::{Display, Formatter},
    sync::atomic::{AtomicUsize, Ordering},
};

use rocket::{
    fairing::{Fairing, Info, Kind},
    http::{ContentType, StatusClass},
    Data, Orbit, Request, Response, Rocket,
};

use crate::model::api::auth::{AUTH_TOKEN_COOKIE, VOTER_COOKIE};

/// Pairs up the request and response lines of one exchange.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd)]
pub struct RequestId(pub usize);

impl Display for RequestId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl RequestId {
    /// Wraps around to zero on overflow.
    pub fn next() -> RequestId {
        static REQUEST_ID_COUNTER: AtomicUsize = AtomicUsize::new(0);
        RequestId(REQUEST_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// Who a request claims to come from, judged only by which session cookies it
/// carries. The guards on each route do the actual checking.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Caller {
    Admin,
    Voter,
    Anonymous,
}

impl Caller {
    pub fn of(req: &Request<'_>) -> Self {
        let cookies = req.cookies();
        if cookies.get(AUTH_TOKEN_COOKIE).is_some() {
            Self::Admin
        } else if cookies.get_private(VOTER_COOKIE).is_some() {
            Self::Voter
        } else {
            Self::Anonymous
        }
    }
}

impl Display for Caller {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Admin => "admin",
            Self::Voter => "voter",
            Self::Anonymous => "anon",
        })
    }
}

/// Logs launch and shutdown, plus one line per request and per response.
/// Event streams stay open long after their response line, so those are
/// flagged.
#[derive(Debug, Copy, Clone)]
pub struct LoggerFairing;

#[rocket::async_trait]
impl Fairing for LoggerFairing {
    fn info(&self) -> Info {
        Info {
            name: "Logger",
            kind: Kind::Liftoff | Kind::Request | Kind::Response | Kind::Shutdown,
        }
    }

    async fn on_liftoff(&self, rocket: &Rocket<Orbit>) {
        let config = rocket.config();
        let scheme = if config.tls_enabled() { "https" } else { "http" };
        let streams = rocket
            .routes()
            .filter(|route| route.uri.to_string().starts_with("/events"))
            .count();
        info!(
            "Election server up on {scheme}://{}:{} ({} routes, {streams} event streams)",
            config.address,
            config.port,
            rocket.routes().count(),
        );
    }

    async fn on_request(&self, req: &mut Request<'_>, _data: &mut Data<'_>) {
        let id = req.local_cache(RequestId::next);
        let caller = Caller::of(req);
        info!("->req{id} [{caller}] {} {}", req.method(), req.uri());
    }

    async fn on_response<'r>(&self, req: &'r Request<'_>, res: &mut Response<'r>) {
        let id = req.local_cache(RequestId::next);
        let code = res.status();
        let route = req
            .route()
            .and_then(|route| route.name.as_deref())
            .unwrap_or("no route");
        if res.content_type() == Some(ContentType::EventStream) {
            info!("<-rsp{id} {code} {route}: event stream opened");
            return;
        }
        let line = format!("<-rsp{id} {code} {route}");
        match code.class() {
            StatusClass::ServerError => error!("{line}"),
            StatusClass::ClientError => warn!("{line}"),
            _ => info!("{line}"),
        }
    }

    async fn on_shutdown(&self, _rocket: &Rocket<Orbit>) {
        warn!("Shutting down: closing event streams and draining requests");
    }
}
