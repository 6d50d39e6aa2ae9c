//! Host-based dispatch.
//!
//! Every request is mapped to one [`Site`] by an explicit table built from
//! configuration. The middleware resolves the site once, stores it in the
//! request extensions and on the request's root span, and the route scopes
//! are guarded on it.

use std::collections::HashMap;
use std::fmt;
use std::future::{Future, Ready, ready};
use std::pin::Pin;
use std::rc::Rc;
use std::str::FromStr;

use actix_web::{
    Error, HttpMessage, ResponseError,
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    guard::{Guard, GuardContext},
    http::header,
};
use tracing_actix_web::RootSpan;

use crate::config::HostConfig;
use crate::middleware::error::AppError;

/// Sub-application selected by the request host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Site {
    Api,
    Admin,
    Www,
}

impl Site {
    pub fn as_str(self) -> &'static str {
        match self {
            Site::Api => "api",
            Site::Admin => "admin",
            Site::Www => "www",
        }
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Site {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "api" => Ok(Site::Api),
            "admin" => Ok(Site::Admin),
            "www" => Ok(Site::Www),
            _ => Err(()),
        }
    }
}

/// Host name to site lookup with an explicit fallback policy.
#[derive(Debug, Clone)]
pub struct HostTable {
    entries: HashMap<String, Site>,
    allowed: Vec<String>,
    default_site: Site,
    strict: bool,
}

impl HostTable {
    pub fn new(config: &HostConfig) -> Self {
        let domain = normalize_host(&config.domain);
        let entries = HashMap::from([
            (format!("api.{domain}"), Site::Api),
            (format!("admin.{domain}"), Site::Admin),
            (format!("www.{domain}"), Site::Www),
            (domain, Site::Www),
        ]);

        Self {
            entries,
            allowed: config.allowed_hosts.iter().map(|h| normalize_host(h)).collect(),
            default_site: config.default_site,
            strict: config.strict,
        }
    }

    /// Site for a raw `Host` value. `Err` carries the rejected host.
    pub fn resolve(&self, host: Option<&str>) -> Result<Site, String> {
        let host = host.map(normalize_host).unwrap_or_default();

        if let Some(site) = self.entries.get(&host) {
            return Ok(*site);
        }

        if self.is_allowed(&host) || !self.strict {
            return Ok(self.default_site);
        }

        Err(host)
    }

    /// `*` allows everything; a leading dot allows a domain and its subdomains.
    fn is_allowed(&self, host: &str) -> bool {
        if host.is_empty() {
            return false;
        }
        self.allowed.iter().any(|pattern| {
            if pattern == "*" {
                true
            } else if let Some(suffix) = pattern.strip_prefix('.') {
                host == suffix || host.ends_with(pattern.as_str())
            } else {
                host == pattern
            }
        })
    }
}

/// Lowercases and strips the port (`Admin.Example.com:8000` -> `admin.example.com`).
fn normalize_host(raw: &str) -> String {
    let raw = raw.trim();
    let host = if raw.starts_with('[') {
        // IPv6 literal
        match raw.find(']') {
            Some(end) => &raw[..=end],
            None => raw,
        }
    } else {
        raw.rsplit_once(':').map_or(raw, |(host, _port)| host)
    };
    host.trim_end_matches('.').to_ascii_lowercase()
}

/// Middleware that resolves the [`Site`] for every request.
pub struct HostRouting {
    table: Rc<HostTable>,
}

impl HostRouting {
    pub fn new(table: HostTable) -> Self {
        Self {
            table: Rc::new(table),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for HostRouting
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = HostRoutingService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(HostRoutingService {
            service,
            table: self.table.clone(),
        }))
    }
}

pub struct HostRoutingService<S> {
    service: S,
    table: Rc<HostTable>,
}

impl<S, B> Service<ServiceRequest> for HostRoutingService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // HTTP/2 carries the host in the URI authority instead of a header.
        let host = req
            .headers()
            .get(header::HOST)
            .and_then(|v| v.to_str().ok())
            .map(String::from)
            .or_else(|| req.uri().authority().map(|a| a.to_string()));

        let site = match self.table.resolve(host.as_deref()) {
            Ok(site) => site,
            Err(rejected) => {
                tracing::warn!(host = %rejected, "Rejected request for unknown host");

                let response = AppError::InvalidHost(rejected).error_response();
                let (http_req, _payload) = req.into_parts();
                let srv_response = ServiceResponse::new(http_req, response);

                return Box::pin(async move { Ok(srv_response.map_into_right_body()) });
            }
        };

        if let Some(root_span) = req.extensions().get::<RootSpan>() {
            root_span.record("site", site.as_str());
        }
        req.extensions_mut().insert(site);

        let fut = self.service.call(req);

        Box::pin(async move {
            let res = fut.await?;
            Ok(res.map_into_left_body())
        })
    }
}

/// Route guard matching requests resolved to one site.
pub struct SiteGuard(pub Site);

impl Guard for SiteGuard {
    fn check(&self, ctx: &GuardContext<'_>) -> bool {
        ctx.req_data().get::<Site>() == Some(&self.0)
    }
}
