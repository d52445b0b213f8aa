use std::{
    future::{ready, Ready},
    net::IpAddr,
    str::FromStr,
};

use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use log::{debug, trace};
use regex::Regex;
use seatwise_engine::{
    db_types::{Account, AccountStatus},
    traits::AccountManagement,
};

use crate::{
    config::{ServerOptions, DEFAULT_USERNAME_HEADER},
    errors::ServerError,
};

/// Get the remote IP address from the request. It uses 3 sources to determine the IP address, in decreasing order
/// of preference:
/// 1. The `X-Forwarded-For` header, iif `use_x_forwarded_for` is set to true in the configuration.
/// 2. The `Forwarded` header, iif `use_forwarded` is set to true in the configuration.
/// 3. The peer address from the connection info.
pub fn get_remote_ip(req: &HttpRequest, use_x_forwarded_for: bool, use_forwarded: bool) -> Option<IpAddr> {
    let mut result = None;
    if use_x_forwarded_for {
        trace!("Checking X-Forwarded-For header");
        result = req
            .headers()
            .get("X-Forwarded-For")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.split(',').next())
            .and_then(|s| IpAddr::from_str(s.trim()).ok());
        if let Some(ip) = result {
            debug!("Using X-Forwarded-For header for remote address: {ip}");
        }
    }
    if use_forwarded && result.is_none() {
        trace!("Checking Forwarded header");
        result = req.headers().get("Forwarded").and_then(|v| v.to_str().ok()).and_then(forwarded_for);
        if let Some(ip) = result {
            debug!("Using Forwarded header for remote address: {ip}");
        }
    }
    result.or_else(|| {
        let peer_addr = req.connection_info().peer_addr().map(|a| a.to_string());
        trace!("Using Peer address for remote address: {:?}", peer_addr);
        peer_addr.and_then(|s| IpAddr::from_str(&s).ok())
    })
}

fn forwarded_for(header: &str) -> Option<IpAddr> {
    let re = Regex::new(r#"for="?(?P<ip>[^;,"]+)"#).ok()?;
    let caps = re.captures(header)?;
    IpAddr::from_str(caps.name("ip")?.as_str()).ok()
}

/// The username of the caller, as asserted by the upstream identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerName(pub String);

impl FromRequest for CallerName {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let header = req
            .app_data::<web::Data<ServerOptions>>()
            .map(|o| o.username_header.clone())
            .unwrap_or_else(|| DEFAULT_USERNAME_HEADER.to_string());
        let caller = req
            .headers()
            .get(header.as_str())
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| CallerName(s.to_string()))
            .ok_or_else(|| ServerError::Unauthenticated(format!("The {header} header is missing")));
        ready(caller)
    }
}

/// Resolves the caller's account. Unknown and blacklisted accounts are refused.
pub async fn resolve_caller<B: AccountManagement>(caller: &CallerName, db: &B) -> Result<Account, ServerError> {
    let account = db
        .fetch_account_by_username(&caller.0)
        .await?
        .ok_or_else(|| ServerError::Unauthenticated(format!("Unknown user {}", caller.0)))?;
    if account.status == AccountStatus::Blacklisted {
        debug!("💻️ Refusing request from blacklisted account {}", account.username);
        return Err(ServerError::Forbidden("Your account has been blocked".to_string()));
    }
    Ok(account)
}

#[cfg(test)]
mod test {
    use actix_web::test::TestRequest;

    use super::*;

    #[test]
    fn remote_ip_sources() {
        let req = TestRequest::default()
            .insert_header(("X-Forwarded-For", "10.1.1.1, 10.2.2.2"))
            .insert_header(("Forwarded", "for=192.168.0.7;proto=https"))
            .peer_addr("127.0.0.9:4000".parse().unwrap())
            .to_http_request();
        assert_eq!(get_remote_ip(&req, true, true), Some("10.1.1.1".parse().unwrap()));
        assert_eq!(get_remote_ip(&req, false, true), Some("192.168.0.7".parse().unwrap()));
        assert_eq!(get_remote_ip(&req, false, false), Some("127.0.0.9".parse().unwrap()));
    }
}
