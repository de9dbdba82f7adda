//! Client identification from proxy headers.

use crate::rate_limit::ClientId;
use http::HeaderMap;
use std::net::IpAddr;

const FORWARDED_FOR: &str = "x-forwarded-for";
const REAL_IP: &str = "x-real-ip";
const CF_CONNECTING_IP: &str = "cf-connecting-ip";

const UNKNOWN: &str = "unknown";

/// Derive the rate-limit bucket for a request.
///
/// Priority: first entry of `X-Forwarded-For`, then `X-Real-IP`, then
/// `CF-Connecting-IP`. Missing addresses and loopback addresses collapse into
/// [`ClientId::DEVELOPMENT`] so local traffic shares one bucket.
pub fn identify(headers: &HeaderMap) -> ClientId {
    let forwarded = header(headers, FORWARDED_FOR)
        .and_then(|list| list.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty());

    let ip = forwarded
        .or_else(|| header(headers, REAL_IP))
        .or_else(|| header(headers, CF_CONNECTING_IP))
        .unwrap_or(UNKNOWN);

    if ip == UNKNOWN || is_loopback(ip) {
        return ClientId::development();
    }
    ClientId::new(ip)
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn is_loopback(ip: &str) -> bool {
    ip.parse::<IpAddr>().map(|addr| addr.to_canonical().is_loopback()).unwrap_or(false)
}
