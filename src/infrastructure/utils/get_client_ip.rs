use actix_web::HttpRequest;

/// Extract the client's IP address from the request.
/// `trust_forwarded_headers`: whether to honour X-Forwarded-For and X-Real-IP,
/// only safe behind a proxy that overwrites them.
pub fn get_client_ip(req: &HttpRequest, trust_forwarded_headers: bool) -> String {
    if trust_forwarded_headers {
        let forwarded = header_value(req, "x-forwarded-for")
            .and_then(|s| s.split(',').next().map(|ip| ip.trim().to_string()))
            .filter(|ip| !ip.is_empty());
        if let Some(ip) = forwarded {
            return ip;
        }

        if let Some(ip) = header_value(req, "x-real-ip").map(|s| s.trim().to_string()).filter(|ip| !ip.is_empty()) {
            return ip;
        }
    }
    req.peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn header_value<'a>(req: &'a HttpRequest, name: &str) -> Option<&'a str> {
    req.headers().get(name).and_then(|v| v.to_str().ok())
}
