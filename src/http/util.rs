use actix_web::HttpRequest;

/// Resolves the client network address the same way the edge proxies hand
/// it over: first `X-Forwarded-For` entry, then `X-Real-IP`, then the
/// peer address. `None` means the fingerprint falls back to its sentinel.
pub fn client_ip(req: &HttpRequest) -> Option<String> {
    let forwarded = req
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    if let Some(ip) = forwarded {
        return Some(ip.to_owned());
    }

    let real_ip = req
        .headers()
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    if let Some(ip) = real_ip {
        return Some(ip.to_owned());
    }

    req.peer_addr().map(|addr| addr.ip().to_string())
}
